//! View renderer port - presentation surfaces owned by the host

use serde::Serialize;

use crate::domain::UserRecord;

/// How prominently an error should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be acknowledged before the user continues (failed login)
    Blocking,
    /// Informational, may be dismissed or ignored
    Warning,
}

/// Projects session data onto the host's presentation surfaces
///
/// The core calls these after a login, after each reconciliation that
/// replaced the held record, and when a login fails. Implementations must
/// not block for long; they are called from async tasks. A refresh render
/// runs while the session is read-locked, so `render` must not call back
/// into `SessionManager`.
pub trait ViewRenderer: Send + Sync {
    /// Show the given record
    fn render(&self, record: &UserRecord);

    /// Present an error message
    fn show_error(&self, message: &str, severity: Severity);

    /// Toggle the loading indicator
    fn set_loading(&self, is_loading: bool);
}

/// Renderer for headless use; discards every call
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl ViewRenderer for NullRenderer {
    fn render(&self, _record: &UserRecord) {}

    fn show_error(&self, _message: &str, _severity: Severity) {}

    fn set_loading(&self, _is_loading: bool) {}
}
