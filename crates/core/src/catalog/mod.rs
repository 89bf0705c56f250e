//! Video catalog - the durable list of downloaded videos.
//!
//! The per-item metadata files the external fetch tool writes are the
//! source of truth; the consolidated catalog file is a derived cache,
//! rewritten after every reload.

mod json_store;
mod types;

pub use json_store::JsonCatalogStore;
pub use types::*;

use async_trait::async_trait;
use std::path::Path;

/// Trait for catalog persistence and directory reconciliation.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Scan a directory for per-item metadata files and build one record
    /// per parseable file.
    ///
    /// Per-file parse failures are reported in the returned
    /// [`ScanReport::skipped`] list, never abort the scan.
    async fn scan_dir(&self, path: &Path) -> Result<ScanReport, CatalogError>;

    /// Overwrite the consolidated catalog file with the given records.
    ///
    /// The write goes to a temp file in the same directory first and is
    /// renamed over the target, so a concurrent reader sees either the old
    /// or the new content.
    async fn persist(&self, records: &[VideoRecord]) -> Result<(), CatalogError>;

    /// Reconcile: scan the save directory, then rewrite the consolidated
    /// file from the result.
    async fn load(&self) -> Result<ScanReport, CatalogError>;
}
