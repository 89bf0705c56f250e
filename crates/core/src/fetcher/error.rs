//! Error types for the fetcher module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while driving an external fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL was empty or whitespace-only. No process was spawned.
    #[error("Invalid input: URL is empty")]
    InvalidInput,

    /// The external tool could not be launched.
    #[error("Failed to spawn {tool:?}: {reason}")]
    SpawnFailed { tool: PathBuf, reason: String },

    /// The pipeline exited non-zero, or its result metadata file is
    /// missing or unparseable. Carries the captured combined output.
    #[error("Fetch failed: {reason}")]
    Failed { reason: String, output: String },

    /// The pipeline did not finish within the configured timeout.
    #[error("Fetch timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error outside the external process itself.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Creates a failed error with captured process output.
    pub fn failed(reason: impl Into<String>, output: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            output: output.into(),
        }
    }

    /// Captured diagnostics, if this error carries any.
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Failed { output, .. } => Some(output),
            _ => None,
        }
    }
}
