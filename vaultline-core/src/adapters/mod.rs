//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the RecordStore port
//! - In-memory record store for embedding and tests
//! - Demo record store for trying the client without a server

pub mod demo;
pub mod http_store;
pub mod memory;

#[cfg(test)]
pub mod store_mock;
