//! Remote content source
//!
//! The sync engine only sees these traits: a `Connector` hands out an
//! authenticated `RemoteStore` once per cycle, and the store lists a folder
//! and fetches item content.

pub mod errors;
#[cfg(test)]
pub mod fake;

use std::sync::Arc;

use async_trait::async_trait;

pub use errors::RemoteError;

/// One entry of a remote folder listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    /// Remote identifier used to fetch the content
    pub id: String,
    /// Display name, the source of the cached file's extension
    pub name: String,
    /// Content checksum; `None` for entries with no binary content
    pub checksum: Option<String>,
}

/// Listing and download operations against the remote store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List the direct children of a folder
    async fn list(&self, folder_id: &str) -> Result<Vec<RemoteItem>, RemoteError>;

    /// Download the full content of one item
    async fn fetch(&self, id: &str) -> Result<Vec<u8>, RemoteError>;
}

/// Produces an authenticated remote store
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn RemoteStore>, RemoteError>;
}
