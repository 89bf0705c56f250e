//! JSON-file-backed catalog store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::StorageConfig;

use super::types::{CatalogError, ScanReport, SkippedFile, VideoRecord};
use super::CatalogStore;

/// Catalog store over a directory of `*.json` sidecar files plus one
/// consolidated catalog file.
pub struct JsonCatalogStore {
    save_dir: PathBuf,
    catalog_path: PathBuf,
}

impl JsonCatalogStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            save_dir: config.save_dir.clone(),
            catalog_path: config.catalog_path(),
        }
    }

    /// Path of the consolidated catalog file.
    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    /// Parses one per-item metadata file into a record.
    async fn read_record(&self, path: &Path) -> Result<VideoRecord, String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("read failed: {}", e))?;

        let doc: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| format!("invalid JSON: {}", e))?;

        if !doc.is_object() {
            return Err("document is not a JSON object".to_string());
        }

        let downloaded_at = tokio::fs::metadata(path)
            .await
            .ok()
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Utc>::from);

        let mut record = VideoRecord::from_metadata(&self.save_dir, path, &doc);
        record.downloaded_at = downloaded_at;
        Ok(record)
    }
}

#[async_trait]
impl CatalogStore for JsonCatalogStore {
    async fn scan_dir(&self, path: &Path) -> Result<ScanReport, CatalogError> {
        let mut entries =
            tokio::fs::read_dir(path)
                .await
                .map_err(|source| CatalogError::ScanFailed {
                    path: path.to_path_buf(),
                    source,
                })?;

        let mut report = ScanReport::default();

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    return Err(CatalogError::ScanFailed {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            };

            let file_path = entry.path();
            if file_path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            // The consolidated file lives in the same directory and has the
            // same extension; it is not a per-item metadata file.
            if file_path == self.catalog_path {
                continue;
            }
            if !entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            match self.read_record(&file_path).await {
                Ok(record) => {
                    debug!("Scanned metadata file {:?}: {}", file_path, record.title);
                    report.records.push(record);
                }
                Err(reason) => {
                    warn!("Skipping metadata file {:?}: {}", file_path, reason);
                    report.skipped.push(SkippedFile {
                        path: file_path,
                        reason,
                    });
                }
            }
        }

        Ok(report)
    }

    async fn persist(&self, records: &[VideoRecord]) -> Result<(), CatalogError> {
        let json = serde_json::to_vec_pretty(records).map_err(|e| CatalogError::Persistence {
            path: self.catalog_path.clone(),
            reason: e.to_string(),
        })?;

        // Write-to-temp-then-rename so a concurrent reader never sees a
        // partial catalog.
        let tmp_path = self.catalog_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &json)
            .await
            .map_err(|e| CatalogError::Persistence {
                path: self.catalog_path.clone(),
                reason: format!("write to {:?} failed: {}", tmp_path, e),
            })?;

        tokio::fs::rename(&tmp_path, &self.catalog_path)
            .await
            .map_err(|e| CatalogError::Persistence {
                path: self.catalog_path.clone(),
                reason: format!("rename from {:?} failed: {}", tmp_path, e),
            })?;

        debug!(
            "Persisted {} record(s) to {:?}",
            records.len(),
            self.catalog_path
        );
        Ok(())
    }

    async fn load(&self) -> Result<ScanReport, CatalogError> {
        let report = self.scan_dir(&self.save_dir).await?;

        // The consolidated file is a derived cache: rewrite it from the
        // scan so it always mirrors the per-item files.
        self.persist(&report.records).await?;

        Ok(report)
    }
}
