//! Remote-to-cache synchronization

pub mod engine;
pub mod report;

pub use engine::{ReconcilePolicy, SyncEngine, SyncError};
pub use report::SyncReport;
