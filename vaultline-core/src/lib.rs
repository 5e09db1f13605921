//! Vaultline Core - session-synchronized gateway to a remote account vault
//!
//! This crate implements the core logic following hexagonal architecture:
//!
//! - **domain**: Core entities (UserRecord, Credentials, Session)
//! - **ports**: Trait definitions for external dependencies (RecordStore, ViewRenderer)
//! - **services**: Credential verification, session management, reconciliation
//! - **adapters**: Concrete implementations (HTTP store, in-memory store, demo data)
//!
//! Credentials are compared as plain strings, exactly as the record store
//! holds them. This is not a credential-security design.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::sync::Arc;

use adapters::http_store::HttpRecordStore;
use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{AuthError, Error, Result};
pub use domain::{Credentials, RecordCollection, RecordDefaults, Session, UserRecord};
pub use ports::{NullRenderer, RecordStore, Severity, ViewRenderer};

/// Main context for Vaultline operations
///
/// Wires one record store, one session manager and one reconciler together.
/// Hosts create a single context per process and share it by reference.
pub struct VaultlineContext {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    pub session: Arc<SessionManager>,
    pub reconciler: Arc<Reconciler>,
    pub status_service: StatusService,
}

impl VaultlineContext {
    /// Create a context that reads from the configured HTTP endpoint
    pub fn new(config: Config, renderer: Arc<dyn ViewRenderer>) -> Result<Self> {
        let store = Arc::new(HttpRecordStore::from_config(&config)?);
        Ok(Self::with_store(config, store, renderer))
    }

    /// Create a context around any record store implementation
    pub fn with_store(
        config: Config,
        store: Arc<dyn RecordStore>,
        renderer: Arc<dyn ViewRenderer>,
    ) -> Self {
        let session = Arc::new(SessionManager::new(Arc::clone(&store), renderer));
        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&session),
            config.poll_interval(),
        ));
        let status_service = StatusService::new(Arc::clone(&store));

        Self {
            config,
            store,
            session,
            reconciler,
            status_service,
        }
    }

    /// Log in and start the reconciliation loop
    pub async fn login_and_watch(
        &self,
        credentials: &Credentials,
    ) -> std::result::Result<(UserRecord, ReconcileHandle), AuthError> {
        let record = self.session.attempt_login(credentials).await?;
        let handle = Arc::clone(&self.reconciler).spawn();
        Ok((record, handle))
    }

    /// Log out; the reconciliation loop goes idle until the next login
    pub fn logout(&self) {
        self.session.reset();
    }
}
