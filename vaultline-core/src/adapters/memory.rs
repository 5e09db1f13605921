//! In-process record store
//!
//! Holds a record collection in memory. Hosts use it when no remote store is
//! configured, and tests use it to change server-side data, simulate outages
//! and count fetches.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::result::{Error, Result};
use crate::domain::{RecordCollection, UserRecord};
use crate::ports::RecordStore;

#[derive(Debug, Default)]
struct MemoryState {
    records: RecordCollection,
    outage: Option<String>,
    malformed: bool,
    latency: Option<Duration>,
}

/// Record store backed by a `Vec` in memory
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    state: Mutex<MemoryState>,
    fetches: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn new(records: RecordCollection) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                records,
                ..MemoryState::default()
            }),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Replace the whole collection
    pub fn set_records(&self, records: RecordCollection) {
        self.state.lock().records = records;
    }

    /// Replace the first record with the same identity key, or append it
    pub fn upsert(&self, record: UserRecord) {
        let mut state = self.state.lock();
        match state
            .records
            .iter_mut()
            .find(|existing| existing.identity_key == record.identity_key)
        {
            Some(existing) => *existing = record,
            None => state.records.push(record),
        }
    }

    /// Remove every record with the given identity key
    pub fn remove(&self, identity_key: &str) {
        self.state
            .lock()
            .records
            .retain(|record| record.identity_key != identity_key);
    }

    /// Make every fetch fail with a transport error until `restore` is called
    pub fn set_unavailable(&self, reason: impl Into<String>) {
        self.state.lock().outage = Some(reason.into());
    }

    /// Make every fetch fail as if the body had no collection field
    pub fn set_malformed(&self, malformed: bool) {
        self.state.lock().malformed = malformed;
    }

    /// Clear any simulated outage or malformed response
    pub fn restore(&self) {
        let mut state = self.state.lock();
        state.outage = None;
        state.malformed = false;
    }

    /// Delay every fetch by the given duration
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state.lock().latency = latency;
    }

    /// Number of `fetch_all` calls made so far, failed ones included
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_all(&self) -> Result<RecordCollection> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let latency = self.state.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let state = self.state.lock();
        if let Some(reason) = &state.outage {
            return Err(Error::transport(reason.clone()));
        }
        if state.malformed {
            return Err(Error::malformed("field 'users' is missing"));
        }
        Ok(state.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_returns_records_in_order() {
        let store = MemoryRecordStore::new(vec![
            UserRecord::new("alice", "1"),
            UserRecord::new("bob", "2"),
        ]);

        let records = store.fetch_all().await.unwrap();
        let keys: Vec<_> = records.iter().map(|r| r.identity_key.as_str()).collect();
        assert_eq!(keys, vec!["alice", "bob"]);
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_upsert_and_remove() {
        let store = MemoryRecordStore::default();
        store.upsert(UserRecord::new("alice", "1"));
        store.upsert(UserRecord::new("alice", "1").with_status("Frozen"));
        store.upsert(UserRecord::new("bob", "2"));

        let records = store.fetch_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, "Frozen");

        store.remove("alice");
        let records = store.fetch_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identity_key, "bob");
    }

    #[tokio::test]
    async fn test_outage_and_restore() {
        let store = MemoryRecordStore::new(vec![UserRecord::new("alice", "1")]);

        store.set_unavailable("connection refused");
        let err = store.fetch_all().await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));

        store.restore();
        store.set_malformed(true);
        let err = store.fetch_all().await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));

        store.restore();
        assert!(store.fetch_all().await.is_ok());
        assert_eq!(store.fetch_count(), 3);
    }
}
