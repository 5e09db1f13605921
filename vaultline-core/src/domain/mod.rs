//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O or external dependencies.

mod record;
mod session;
pub mod result;

pub use record::{split_transactions, Credentials, RecordCollection, RecordDefaults, UserRecord};
pub use session::Session;
