//! Port definitions (hexagonal architecture)
//!
//! The record store and the view renderer are the two things the core talks
//! to. Hosts and tests plug in their own implementations.

mod record_store;
mod renderer;

pub use record_store::RecordStore;
pub use renderer::{NullRenderer, Severity, ViewRenderer};
