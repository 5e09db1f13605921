//! Session domain model

use chrono::{DateTime, Utc};

use super::record::UserRecord;

/// The client's single authenticated-or-not state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        record: UserRecord,
        synced_at: DateTime<Utc>,
    },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    /// The held record, if authenticated
    pub fn record(&self) -> Option<&UserRecord> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { record, .. } => Some(record),
        }
    }

    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { synced_at, .. } => Some(*synced_at),
        }
    }
}
