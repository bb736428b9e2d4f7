//! Per-item outcomes of a sync cycle

use std::fmt;
use std::path::PathBuf;

use crate::remote::RemoteItem;

/// Why an item was not transferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Checksum already cached (fill-the-gap policy)
    Cached,
    /// Checksum not cached yet (refetch-present policy)
    NotCached,
    /// Remote entry carries no checksum (folders, native documents)
    NoChecksum,
    /// Same checksum already transferred earlier in this cycle
    Duplicate,
}

/// Result for a single remote item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Transferred { path: PathBuf, bytes: usize },
    Skipped(SkipReason),
    /// Fetch or write failed; the item is reconsidered next cycle
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ItemOutcome {
    pub item: RemoteItem,
    pub status: ItemStatus,
}

/// Everything that happened to the listed items during one cycle
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl SyncReport {
    pub fn record(&mut self, item: RemoteItem, status: ItemStatus) {
        self.outcomes.push(ItemOutcome { item, status });
    }

    pub fn listed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn transferred(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Transferred { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Failed(_)))
    }

    /// Total bytes written to the cache
    pub fn bytes_transferred(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                ItemStatus::Transferred { bytes, .. } => bytes,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, pred: impl Fn(&ItemStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            let status = match &outcome.status {
                ItemStatus::Transferred { path, bytes } => {
                    format!("fetched {} bytes -> {}", bytes, path.display())
                }
                ItemStatus::Skipped(reason) => format!("skipped ({:?})", reason),
                ItemStatus::Failed(err) => format!("FAILED: {}", err),
            };
            writeln!(f, "  {} [{}] {}", outcome.item.name, outcome.item.id, status)?;
        }
        write!(
            f,
            "{} listed, {} transferred, {} skipped, {} failed",
            self.listed(),
            self.transferred(),
            self.skipped(),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> RemoteItem {
        RemoteItem {
            id: id.to_string(),
            name: format!("{}.jpg", id),
            checksum: Some(id.to_string()),
        }
    }

    #[test]
    fn test_counters() {
        let mut report = SyncReport::default();
        report.record(
            item("a"),
            ItemStatus::Transferred {
                path: PathBuf::from("/c/a.jpg"),
                bytes: 10,
            },
        );
        report.record(item("b"), ItemStatus::Skipped(SkipReason::Cached));
        report.record(item("c"), ItemStatus::Failed("boom".to_string()));
        report.record(
            item("d"),
            ItemStatus::Transferred {
                path: PathBuf::from("/c/d.jpg"),
                bytes: 5,
            },
        );

        assert_eq!(report.listed(), 4);
        assert_eq!(report.transferred(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.bytes_transferred(), 15);
        assert!(report
            .to_string()
            .ends_with("4 listed, 2 transferred, 1 skipped, 1 failed"));
    }
}
