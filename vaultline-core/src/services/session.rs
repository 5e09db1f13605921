//! Session service - login, logout and the held user record
//!
//! `SessionManager` is the only owner of the `Session` value. Other
//! components read it through the accessors here and change it only through
//! `attempt_login`, `replace_record` and `reset`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::{info, warn};

use crate::domain::result::{AuthError, Error, Result};
use crate::domain::{Credentials, Session, UserRecord};
use crate::ports::{RecordStore, Severity, ViewRenderer};
use crate::services::verifier;

/// Owns the process-wide session state
pub struct SessionManager {
    store: Arc<dyn RecordStore>,
    renderer: Arc<dyn ViewRenderer>,
    session: RwLock<Session>,
    login_in_flight: AtomicBool,
}

/// Clears the in-flight flag when a login attempt ends, even if its future is dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SessionManager {
    /// Create a manager in the `Anonymous` state
    pub fn new(store: Arc<dyn RecordStore>, renderer: Arc<dyn ViewRenderer>) -> Self {
        Self {
            store,
            renderer,
            session: RwLock::new(Session::Anonymous),
            login_in_flight: AtomicBool::new(false),
        }
    }

    /// Fetch the record collection and log in with the given credentials
    ///
    /// The session changes only on success, and then in one step: record and
    /// sync time are set together. A call made while another attempt is still
    /// waiting on the store is rejected with `AuthError::AlreadyInProgress`.
    pub async fn attempt_login(
        &self,
        credentials: &Credentials,
    ) -> std::result::Result<UserRecord, AuthError> {
        let _in_flight =
            InFlightGuard::acquire(&self.login_in_flight).ok_or(AuthError::AlreadyInProgress)?;

        self.renderer.set_loading(true);
        let outcome = self.login(credentials).await;
        self.renderer.set_loading(false);

        match &outcome {
            Ok(record) => self.renderer.render(record),
            Err(e) => self.renderer.show_error(e.user_message(), Severity::Blocking),
        }

        outcome
    }

    async fn login(&self, credentials: &Credentials) -> std::result::Result<UserRecord, AuthError> {
        let identity_key = credentials.identity_key().trim();

        let records = self.store.fetch_all().await.map_err(|e| {
            warn!(store = self.store.name(), error = %e, "Login failed: record store unavailable");
            AuthError::VaultUnavailable(e.to_string())
        })?;

        let record = verifier::verify(&records, credentials).ok_or_else(|| {
            info!(identity_key, "Login rejected: invalid credentials");
            AuthError::InvalidCredentials
        })?;

        *self.session.write() = Session::Authenticated {
            record: record.clone(),
            synced_at: Utc::now(),
        };
        info!(identity_key, "Login succeeded");

        Ok(record)
    }

    /// The held record, if authenticated
    pub fn current_record(&self) -> Option<UserRecord> {
        self.session.read().record().cloned()
    }

    /// Identity key of the held record, if authenticated
    pub fn identity_key(&self) -> Option<String> {
        self.session
            .read()
            .record()
            .map(|record| record.identity_key.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_authenticated()
    }

    /// When the held record was last set from the store
    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.session.read().synced_at()
    }

    /// A copy of the whole session value
    pub fn snapshot(&self) -> Session {
        self.session.read().clone()
    }

    /// Log out: return to `Anonymous`, discarding the held record
    pub fn reset(&self) {
        let previous = std::mem::take(&mut *self.session.write());
        if let Some(record) = previous.record() {
            info!(identity_key = %record.identity_key, "Session reset");
        }
    }

    /// Overwrite the held record with a fresher copy from the store
    ///
    /// Returns whether the record differed from the held one. Fails with
    /// `Error::IllegalState` when the session is anonymous, or when the new
    /// record belongs to a different identity than the held one.
    pub fn replace_record(&self, new_record: UserRecord) -> Result<bool> {
        let mut session = self.session.write();
        Self::swap_record(&mut session, new_record)
    }

    /// Replace the held record and render it before a logout can intervene
    ///
    /// The render happens under a read lock, so a concurrent `reset` waits
    /// for it and the renderer never shows a record for a closed session.
    pub fn refresh_record(&self, new_record: UserRecord) -> Result<bool> {
        let mut session = self.session.write();
        let changed = Self::swap_record(&mut session, new_record)?;

        let session = RwLockWriteGuard::downgrade(session);
        if let Some(record) = session.record() {
            self.renderer.render(record);
        }
        Ok(changed)
    }

    fn swap_record(session: &mut Session, new_record: UserRecord) -> Result<bool> {
        match session {
            Session::Anonymous => Err(Error::illegal_state(
                "cannot replace record: session is anonymous",
            )),
            Session::Authenticated { record, synced_at } => {
                if record.identity_key != new_record.identity_key {
                    return Err(Error::illegal_state(format!(
                        "cannot replace record for '{}' with record for '{}'",
                        record.identity_key, new_record.identity_key
                    )));
                }
                let changed = *record != new_record;
                *record = new_record;
                *synced_at = Utc::now();
                Ok(changed)
            }
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn renderer(&self) -> &Arc<dyn ViewRenderer> {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use rust_decimal::Decimal;

    use crate::adapters::memory::MemoryRecordStore;
    use crate::ports::NullRenderer;

    fn alice() -> UserRecord {
        UserRecord::new("alice", "1234")
            .with_display_name("Alice A")
            .with_balance(Decimal::new(500, 0), "USD")
    }

    fn manager_with(store: Arc<MemoryRecordStore>) -> SessionManager {
        SessionManager::new(store, Arc::new(NullRenderer))
    }

    #[tokio::test]
    async fn test_login_success_authenticates() {
        let store = Arc::new(MemoryRecordStore::new(vec![alice()]));
        let manager = manager_with(store);

        let record = manager
            .attempt_login(&Credentials::new("alice", "1234"))
            .await
            .unwrap();

        assert_eq!(record, alice());
        assert!(manager.is_authenticated());
        assert_eq!(manager.current_record(), Some(alice()));
        assert_eq!(manager.identity_key().as_deref(), Some("alice"));
        assert!(manager.last_synced_at().is_some());
    }

    #[tokio::test]
    async fn test_wrong_secret_stays_anonymous() {
        let store = Arc::new(MemoryRecordStore::new(vec![alice()]));
        let manager = manager_with(store);

        let err = manager
            .attempt_login(&Credentials::new("alice", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(!manager.is_authenticated());
        assert_eq!(manager.current_record(), None);
    }

    #[tokio::test]
    async fn test_store_failure_is_vault_unavailable() {
        let store = Arc::new(MemoryRecordStore::new(vec![alice()]));
        store.set_unavailable("connection refused");
        let manager = manager_with(store.clone());

        let err = manager
            .attempt_login(&Credentials::new("alice", "1234"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::VaultUnavailable(_)));
        assert_eq!(manager.snapshot(), Session::Anonymous);

        store.restore();
        store.set_malformed(true);
        let err = manager
            .attempt_login(&Credentials::new("alice", "1234"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::VaultUnavailable(_)));
        assert_eq!(manager.snapshot(), Session::Anonymous);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let bob = UserRecord::new("bob", "pw");
        let store = Arc::new(MemoryRecordStore::new(vec![alice(), bob]));
        let manager = manager_with(store);

        manager
            .attempt_login(&Credentials::new("alice", "1234"))
            .await
            .unwrap();
        let before = manager.snapshot();

        let err = manager
            .attempt_login(&Credentials::new("bob", "nope"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(manager.snapshot(), before);
    }

    #[tokio::test]
    async fn test_second_successful_login_wins() {
        let bob = UserRecord::new("bob", "pw");
        let store = Arc::new(MemoryRecordStore::new(vec![alice(), bob.clone()]));
        let manager = manager_with(store);

        manager
            .attempt_login(&Credentials::new("alice", "1234"))
            .await
            .unwrap();
        manager
            .attempt_login(&Credentials::new("bob", "pw"))
            .await
            .unwrap();

        assert_eq!(manager.current_record(), Some(bob));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_login_is_rejected() {
        let store = Arc::new(MemoryRecordStore::new(vec![alice()]));
        store.set_latency(Some(Duration::from_secs(2)));
        let manager = manager_with(store.clone());
        let credentials = Credentials::new("alice", "1234");

        let (first, second) = tokio::join!(
            manager.attempt_login(&credentials),
            manager.attempt_login(&credentials),
        );

        assert_eq!(first.unwrap(), alice());
        assert_eq!(second.unwrap_err(), AuthError::AlreadyInProgress);
        assert_eq!(store.fetch_count(), 1);

        // The guard is released once the first attempt completes
        assert!(manager.attempt_login(&credentials).await.is_ok());
    }

    #[tokio::test]
    async fn test_reset_returns_to_anonymous() {
        let store = Arc::new(MemoryRecordStore::new(vec![alice()]));
        let manager = manager_with(store);

        manager.reset();
        assert_eq!(manager.current_record(), None);

        manager
            .attempt_login(&Credentials::new("alice", "1234"))
            .await
            .unwrap();
        manager.reset();
        assert_eq!(manager.current_record(), None);
        assert!(manager.last_synced_at().is_none());
    }

    #[tokio::test]
    async fn test_replace_record() {
        let store = Arc::new(MemoryRecordStore::new(vec![alice()]));
        let manager = manager_with(store);

        let err = manager.replace_record(alice()).unwrap_err();
        assert!(matches!(err, Error::IllegalState(_)));

        manager
            .attempt_login(&Credentials::new("alice", "1234"))
            .await
            .unwrap();
        let first_sync = manager.last_synced_at().unwrap();

        assert!(!manager.replace_record(alice()).unwrap());

        let updated = alice().with_balance(Decimal::new(750, 0), "USD");
        assert!(manager.replace_record(updated.clone()).unwrap());
        assert_eq!(manager.current_record(), Some(updated));
        assert!(manager.last_synced_at().unwrap() >= first_sync);
    }

    #[tokio::test]
    async fn test_replace_record_rejects_other_identity() {
        let store = Arc::new(MemoryRecordStore::new(vec![alice()]));
        let manager = manager_with(store);
        manager
            .attempt_login(&Credentials::new("alice", "1234"))
            .await
            .unwrap();

        let err = manager
            .replace_record(UserRecord::new("bob", "pw"))
            .unwrap_err();
        assert!(matches!(err, Error::IllegalState(_)));
        assert_eq!(manager.current_record(), Some(alice()));
    }

    /// Renderer that signals when a render starts and then dawdles
    #[derive(Default)]
    struct SlowRenderer {
        started: parking_lot::Mutex<Option<std::sync::mpsc::Sender<()>>>,
        events: parking_lot::Mutex<Vec<&'static str>>,
    }

    impl ViewRenderer for SlowRenderer {
        fn render(&self, _record: &UserRecord) {
            if let Some(started) = self.started.lock().take() {
                let _ = started.send(());
                std::thread::sleep(Duration::from_millis(50));
            }
            self.events.lock().push("render");
        }

        fn show_error(&self, _message: &str, _severity: Severity) {}

        fn set_loading(&self, _is_loading: bool) {}
    }

    #[tokio::test]
    async fn test_reset_waits_for_refresh_render() {
        let store = Arc::new(MemoryRecordStore::new(vec![alice()]));
        let renderer = Arc::new(SlowRenderer::default());
        let manager = SessionManager::new(store, renderer.clone());
        manager
            .attempt_login(&Credentials::new("alice", "1234"))
            .await
            .unwrap();
        renderer.events.lock().clear();

        let (tx, rx) = std::sync::mpsc::channel();
        *renderer.started.lock() = Some(tx);
        let updated = alice().with_status("Frozen");

        std::thread::scope(|scope| {
            let refresh = scope.spawn(|| manager.refresh_record(updated.clone()));
            rx.recv().unwrap();
            manager.reset();
            renderer.events.lock().push("reset");
            assert!(refresh.join().unwrap().unwrap());
        });

        assert_eq!(*renderer.events.lock(), vec!["render", "reset"]);
        assert_eq!(manager.current_record(), None);
    }

    #[tokio::test]
    async fn test_refresh_record_on_anonymous_session_does_not_render() {
        let store = Arc::new(MemoryRecordStore::new(vec![alice()]));
        let renderer = Arc::new(SlowRenderer::default());
        let manager = SessionManager::new(store, renderer.clone());

        let err = manager.refresh_record(alice()).unwrap_err();
        assert!(matches!(err, Error::IllegalState(_)));
        assert!(renderer.events.lock().is_empty());
    }
}
