//! Types for the video catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default for string fields absent from a per-item metadata file.
pub const UNKNOWN: &str = "Unknown";

/// One cataloged video.
///
/// Built either from the per-item metadata file a fetch just produced, or
/// from a directory reconciliation scan. Records are never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Stable identifier: derived from the backing metadata file path, so
    /// the same file yields the same id on every reload.
    pub id: String,
    /// Video title. Display text, and the stem the external tool names
    /// output files after.
    pub title: String,
    /// Uploader display name.
    pub uploader: String,
    /// Channel identifier.
    pub channel: String,
    /// View count.
    pub views: u64,
    /// Expected path of the transcodable media file. Derived from the
    /// title, never verified to exist.
    pub file_path: PathBuf,
    /// The per-item metadata file this record was built from.
    pub metadata_path: PathBuf,
    /// When the backing metadata file was written (best effort).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloaded_at: Option<DateTime<Utc>>,
}

impl VideoRecord {
    /// Builds a record from a parsed per-item metadata document.
    ///
    /// Missing or wrongly-typed keys fall back to defaults: strings to
    /// `"Unknown"`, the view count to 0. The channel comes from
    /// `uploader_id`, falling back to `channel_id`.
    pub fn from_metadata(save_dir: &Path, metadata_path: &Path, doc: &Value) -> Self {
        let title = string_field(doc, "title");
        let uploader = string_field(doc, "uploader");
        let channel = match doc.get("uploader_id").and_then(Value::as_str) {
            Some(s) => s.to_string(),
            None => string_field(doc, "channel_id"),
        };
        let views = doc
            .get("view_count")
            .and_then(Value::as_u64)
            .unwrap_or(0);

        let file_path = save_dir.join(format!("{}.mp4", title));

        Self {
            id: record_id(metadata_path),
            title,
            uploader,
            channel,
            views,
            file_path,
            metadata_path: metadata_path.to_path_buf(),
            downloaded_at: None,
        }
    }

    /// Sets the download timestamp, consuming and returning the record.
    pub fn with_downloaded_at(mut self, at: DateTime<Utc>) -> Self {
        self.downloaded_at = Some(at);
        self
    }
}

fn string_field(doc: &Value, key: &str) -> String {
    doc.get(key)
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Deterministic record id: first 16 hex chars of SHA-256 over the backing
/// metadata file path.
///
/// The path is canonicalized first so the id does not depend on how the
/// path was spelled (relative vs absolute, `.` components); a fetch and a
/// later directory scan must agree on the id for the same file. Paths that
/// do not resolve are hashed as given.
pub fn record_id(metadata_path: &Path) -> String {
    let resolved = metadata_path
        .canonicalize()
        .unwrap_or_else(|_| metadata_path.to_path_buf());
    let digest = Sha256::digest(resolved.as_os_str().as_encoded_bytes());
    let hex = format!("{:x}", digest);
    hex[..16].to_string()
}

/// A per-item metadata file that could not be parsed during a scan.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a directory reconciliation scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// One record per parseable metadata file, in directory-listing order.
    pub records: Vec<VideoRecord>,
    /// Files that failed to parse and were skipped.
    pub skipped: Vec<SkippedFile>,
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read save directory {path}: {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to persist catalog to {path}: {reason}")]
    Persistence { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_metadata_full_document() {
        let doc = json!({
            "title": "A",
            "uploader": "u1",
            "uploader_id": "c1",
            "view_count": 42
        });

        let record = VideoRecord::from_metadata(
            Path::new("/videos"),
            Path::new("/videos/A.info.json"),
            &doc,
        );

        assert_eq!(record.title, "A");
        assert_eq!(record.uploader, "u1");
        assert_eq!(record.channel, "c1");
        assert_eq!(record.views, 42);
        assert_eq!(record.file_path, PathBuf::from("/videos/A.mp4"));
    }

    #[test]
    fn test_from_metadata_missing_keys_default() {
        let doc = json!({});
        let record = VideoRecord::from_metadata(
            Path::new("/videos"),
            Path::new("/videos/x.json"),
            &doc,
        );

        assert_eq!(record.title, UNKNOWN);
        assert_eq!(record.uploader, UNKNOWN);
        assert_eq!(record.channel, UNKNOWN);
        assert_eq!(record.views, 0);
        assert_eq!(record.file_path, PathBuf::from("/videos/Unknown.mp4"));
    }

    #[test]
    fn test_from_metadata_channel_id_fallback() {
        let doc = json!({ "title": "B", "channel_id": "UC123" });
        let record = VideoRecord::from_metadata(
            Path::new("/videos"),
            Path::new("/videos/B.info.json"),
            &doc,
        );
        assert_eq!(record.channel, "UC123");
    }

    #[test]
    fn test_from_metadata_negative_views_default() {
        let doc = json!({ "view_count": -5 });
        let record = VideoRecord::from_metadata(
            Path::new("/videos"),
            Path::new("/videos/x.json"),
            &doc,
        );
        assert_eq!(record.views, 0);
    }

    #[test]
    fn test_record_id_deterministic() {
        let a = record_id(Path::new("/videos/A.info.json"));
        let b = record_id(Path::new("/videos/A.info.json"));
        let c = record_id(Path::new("/videos/C.info.json"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_record_id_ignores_path_spelling() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("A.info.json");
        std::fs::write(&path, "{}").unwrap();

        let dotted = temp.path().join(".").join("A.info.json");
        assert_eq!(record_id(&path), record_id(&dotted));
    }

    #[test]
    fn test_record_serialization_roundtrip() {
        let doc = json!({ "title": "A", "uploader": "u1", "view_count": 7 });
        let record = VideoRecord::from_metadata(
            Path::new("/videos"),
            Path::new("/videos/A.info.json"),
            &doc,
        )
        .with_downloaded_at(Utc::now());

        let json = serde_json::to_string(&record).unwrap();
        let parsed: VideoRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, record.id);
        assert_eq!(parsed.title, "A");
        assert_eq!(parsed.views, 7);
        assert_eq!(parsed.metadata_path, record.metadata_path);
    }
}
