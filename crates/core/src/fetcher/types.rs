//! Types for the fetcher module.

use crate::catalog::VideoRecord;

/// Result of one completed fetch operation.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Identifier for this fetch, for logs and events.
    pub job_id: String,
    /// Record built from the freshly-written metadata file.
    pub record: VideoRecord,
    /// Combined stdout/stderr of the external pipeline. Diagnostics only,
    /// never parsed for control flow.
    pub output: String,
    /// Wall-clock duration of the whole operation.
    pub duration_ms: u64,
}
