//! Sync Engine
//!
//! Reconciles the remote folder listing against the checksum index of the
//! local cache and downloads the selected items. One failing item never stops
//! the others; only connect, listing and index failures abort a cycle.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::report::{ItemStatus, SkipReason, SyncReport};
use crate::cache::{split_file_name, CacheError, CacheIndex, CacheStore};
use crate::remote::{Connector, RemoteError, RemoteItem, RemoteStore};

/// Which remote items get downloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilePolicy {
    /// Download items whose checksum is not cached yet
    #[default]
    FetchMissing,
    /// Re-download items whose checksum is already cached; new items are skipped
    RefetchPresent,
}

impl ReconcilePolicy {
    /// Whether an item with this cache presence is transferred
    fn selects(self, cached: bool) -> bool {
        match self {
            ReconcilePolicy::FetchMissing => !cached,
            ReconcilePolicy::RefetchPresent => cached,
        }
    }

    fn skip_reason(self) -> SkipReason {
        match self {
            ReconcilePolicy::FetchMissing => SkipReason::Cached,
            ReconcilePolicy::RefetchPresent => SkipReason::NotCached,
        }
    }
}

impl FromStr for ReconcilePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "missing" | "fetch-missing" => Ok(ReconcilePolicy::FetchMissing),
            "present" | "refetch-present" => Ok(ReconcilePolicy::RefetchPresent),
            other => Err(format!(
                "unknown reconcile policy {:?} (expected \"missing\" or \"present\")",
                other
            )),
        }
    }
}

impl fmt::Display for ReconcilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcilePolicy::FetchMissing => f.write_str("missing"),
            ReconcilePolicy::RefetchPresent => f.write_str("present"),
        }
    }
}

/// Errors that abort a whole sync cycle
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Failed to connect to remote store: {0}")]
    Connect(#[source] RemoteError),

    #[error("Failed to list remote folder {folder}: {source}")]
    Listing {
        folder: String,
        #[source]
        source: RemoteError,
    },

    #[error("Failed to index cache: {0}")]
    Index(#[from] CacheError),
}

/// Brings the cache into agreement with one remote folder
pub struct SyncEngine {
    connector: Arc<dyn Connector>,
    cache: CacheStore,
    folder_id: String,
    policy: ReconcilePolicy,
}

impl SyncEngine {
    pub fn new(
        connector: Arc<dyn Connector>,
        cache: CacheStore,
        folder_id: impl Into<String>,
        policy: ReconcilePolicy,
    ) -> Self {
        Self {
            connector,
            cache,
            folder_id: folder_id.into(),
            policy,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Run one full cycle: connect, list, index, transfer
    pub async fn run_cycle(&self) -> Result<SyncReport, SyncError> {
        let remote = self.connector.connect().await.map_err(SyncError::Connect)?;

        let items = remote
            .list(&self.folder_id)
            .await
            .map_err(|source| SyncError::Listing {
                folder: self.folder_id.clone(),
                source,
            })?;

        // Rebuilt from disk every cycle
        let index = self.cache.list_index()?;

        info!(
            folder = %self.folder_id,
            remote = items.len(),
            cached = index.len(),
            policy = %self.policy,
            "Starting sync cycle"
        );

        let mut report = SyncReport::default();
        let mut done: HashSet<String> = HashSet::new();

        for item in items {
            let status = self.process_item(remote.as_ref(), &index, &mut done, &item).await;
            report.record(item, status);
        }

        info!(
            transferred = report.transferred(),
            skipped = report.skipped(),
            failed = report.failed(),
            bytes = report.bytes_transferred(),
            "Sync cycle complete"
        );
        Ok(report)
    }

    async fn process_item(
        &self,
        remote: &dyn RemoteStore,
        index: &CacheIndex,
        done: &mut HashSet<String>,
        item: &RemoteItem,
    ) -> ItemStatus {
        let Some(checksum) = item.checksum.as_deref() else {
            debug!(id = %item.id, name = %item.name, "No checksum, skipping");
            return ItemStatus::Skipped(SkipReason::NoChecksum);
        };

        if !self.policy.selects(index.contains(checksum)) {
            return ItemStatus::Skipped(self.policy.skip_reason());
        }
        if done.contains(checksum) {
            return ItemStatus::Skipped(SkipReason::Duplicate);
        }

        if let Some(previous) = index.extension(checksum) {
            debug!(checksum, extension = previous, "Re-fetching cached entry");
        }

        // Reject unusable entry names before downloading
        let extension = remote_extension(&item.name);
        let entry_name = match CacheStore::entry_name(checksum, extension) {
            Ok(entry_name) => entry_name,
            Err(e) => {
                warn!(id = %item.id, name = %item.name, error = %e, "Item cannot be cached, not fetching");
                return ItemStatus::Failed(e.to_string());
            }
        };
        debug!(id = %item.id, local = %entry_name, "Fetching item");

        let data = match remote.fetch(&item.id).await {
            Ok(data) => data,
            Err(e) => {
                warn!(id = %item.id, name = %item.name, error = %e, "Failed to fetch item");
                return ItemStatus::Failed(e.to_string());
            }
        };

        match self.cache.write(checksum, extension, &data) {
            Ok(path) => {
                done.insert(checksum.to_string());
                info!(name = %item.name, local = %path.display(), size = data.len(), "Cached item");
                ItemStatus::Transferred {
                    path,
                    bytes: data.len(),
                }
            }
            Err(e) => {
                warn!(id = %item.id, name = %item.name, error = %e, "Failed to write item to cache");
                ItemStatus::Failed(e.to_string())
            }
        }
    }
}

/// Extension of a remote name, taken from its last path component
fn remote_extension(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    split_file_name(base).1
}
