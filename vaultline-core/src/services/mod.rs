//! Service layer - login, reconciliation and store checks
//!
//! Services drive the ports on behalf of a host. `SessionManager` is the only
//! writer of the session; `Reconciler` goes through it to refresh the record.

pub mod logging;
mod reconcile;
mod session;
mod status;
pub mod verifier;

pub use reconcile::{ReconcileHandle, Reconciler, TickOutcome};
pub use session::SessionManager;
pub use status::{StatusService, StoreStatus};
pub use verifier::{find_by_identity, verify};
