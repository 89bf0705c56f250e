//! Types for the catalog controller.

use thiserror::Error;

use crate::catalog::{CatalogError, VideoRecord};
use crate::fetcher::FetchError;

/// Change notification broadcast to subscribers on every catalog mutation.
#[derive(Debug, Clone)]
pub enum CatalogEvent {
    /// A download was accepted and the fetch pipeline started.
    DownloadStarted { url: String },
    /// A fetch completed and its record was appended to the catalog.
    DownloadCompleted { record: VideoRecord },
    /// A fetch failed; the catalog is unchanged.
    DownloadFailed { url: String, error: String },
    /// The catalog was rebuilt from a directory scan.
    Reloaded { count: usize, skipped: usize },
    /// Records were removed from the catalog (files stay on disk).
    Removed { ids: Vec<String> },
}

/// Errors surfaced by controller operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// A fetch is already in flight. Only one download runs at a time:
    /// concurrent fetches would race on the same save directory.
    #[error("A download is already in progress")]
    Busy,

    /// Index passed to remove() does not exist.
    #[error("Index {index} out of range (catalog has {len} records)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
