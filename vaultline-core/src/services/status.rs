//! Status service - record store reachability summary

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ports::RecordStore;

/// Status service for store checks
pub struct StatusService {
    store: Arc<dyn RecordStore>,
}

impl StatusService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Fetch the collection once and summarize it
    ///
    /// A failed fetch is reported in the summary rather than as an error.
    pub async fn get_status(&self) -> StoreStatus {
        let checked_at = Utc::now();
        match self.store.fetch_all().await {
            Ok(records) => {
                let mut identity_keys: Vec<String> =
                    records.iter().map(|r| r.identity_key.clone()).collect();
                let total_records = identity_keys.len();
                identity_keys.sort();
                identity_keys.dedup();
                StoreStatus {
                    store: self.store.name().to_string(),
                    reachable: true,
                    total_records,
                    duplicate_identities: total_records - identity_keys.len(),
                    records_without_secret: records.iter().filter(|r| r.secret().is_none()).count(),
                    error: None,
                    checked_at,
                }
            }
            Err(e) => StoreStatus {
                store: self.store.name().to_string(),
                reachable: false,
                total_records: 0,
                duplicate_identities: 0,
                records_without_secret: 0,
                error: Some(e.to_string()),
                checked_at,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoreStatus {
    pub store: String,
    pub reachable: bool,
    pub total_records: usize,
    /// Records shadowed by an earlier record with the same identity key
    pub duplicate_identities: usize,
    pub records_without_secret: usize,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryRecordStore;
    use crate::domain::UserRecord;

    #[tokio::test]
    async fn test_status_counts() {
        let store = Arc::new(MemoryRecordStore::new(vec![
            UserRecord::new("alice", "1"),
            UserRecord::new("bob", "2").without_secret(),
            UserRecord::new("alice", "3"),
        ]));
        let status = StatusService::new(store).get_status().await;

        assert!(status.reachable);
        assert_eq!(status.store, "memory");
        assert_eq!(status.total_records, 3);
        assert_eq!(status.duplicate_identities, 1);
        assert_eq!(status.records_without_secret, 1);
        assert!(status.error.is_none());
    }

    #[tokio::test]
    async fn test_status_reports_failure() {
        let store = Arc::new(MemoryRecordStore::default());
        store.set_unavailable("connection refused");
        let status = StatusService::new(store).get_status().await;

        assert!(!status.reachable);
        assert!(status.error.unwrap().contains("connection refused"));
    }
}
