//! Testing utilities and mock implementations.
//!
//! Provides a mock fetcher so controller behavior can be tested without
//! spawning real external processes.

mod mock_fetcher;

pub use mock_fetcher::{MockFetcher, ScriptedFetch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::catalog::VideoRecord;

    /// Create a test record with reasonable defaults, backed by
    /// `<save_dir>/<title>.info.json`.
    pub fn video_record(save_dir: &Path, title: &str, views: u64) -> VideoRecord {
        let metadata_path = save_dir.join(format!("{}.info.json", title));
        let doc = serde_json::json!({
            "title": title,
            "uploader": "test-uploader",
            "uploader_id": "test-channel",
            "view_count": views,
        });
        VideoRecord::from_metadata(save_dir, &metadata_path, &doc)
    }

    /// Write a per-item metadata file the way the external tool would.
    pub fn write_metadata_file(save_dir: &Path, title: &str, views: u64) -> std::path::PathBuf {
        let path = save_dir.join(format!("{}.info.json", title));
        let doc = serde_json::json!({
            "title": title,
            "uploader": "test-uploader",
            "uploader_id": "test-channel",
            "view_count": views,
        });
        std::fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();
        path
    }
}
