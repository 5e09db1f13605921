//! Record store port - read access to the remote user-record collection

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::RecordCollection;

/// Remote user-record store
///
/// Implementations perform one read per call and never retry; retry policy
/// belongs to the caller.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store name for logs (e.g., "http", "memory")
    fn name(&self) -> &str;

    /// Fetch the full record collection
    ///
    /// Fails with `Error::Transport` when the store cannot be reached or
    /// answers with a non-success status, and `Error::MalformedResponse`
    /// when the body does not contain a record collection.
    async fn fetch_all(&self) -> Result<RecordCollection>;
}
