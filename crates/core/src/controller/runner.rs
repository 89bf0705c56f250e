//! Catalog controller implementation.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogStore, ScanReport, VideoRecord};
use crate::fetcher::{FetchError, Fetcher};

use super::config::ControllerConfig;
use super::types::{CatalogEvent, ControllerError};

/// The catalog controller - owns the in-memory record list and serializes
/// all mutations (download-completion append, remove, reload) through its
/// record lock.
pub struct CatalogController<F: Fetcher> {
    config: ControllerConfig,
    fetcher: F,
    store: Arc<dyn CatalogStore>,
    records: Mutex<Vec<VideoRecord>>,
    // Held for the whole duration of a fetch; a second download attempt
    // fails fast with Busy instead of racing on the save directory.
    download_gate: Mutex<()>,
    events: broadcast::Sender<CatalogEvent>,
    // Back-reference handed to the scheduled reload task, so it never
    // keeps a torn-down controller alive.
    weak_self: Weak<CatalogController<F>>,
}

impl<F: Fetcher + 'static> CatalogController<F> {
    /// Creates a controller with an empty catalog. Call [`reload`] to
    /// populate it from disk.
    ///
    /// [`reload`]: CatalogController::reload
    pub fn new(config: ControllerConfig, fetcher: F, store: Arc<dyn CatalogStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(config.event_capacity);
        Arc::new_cyclic(|weak| Self {
            config,
            fetcher,
            store,
            records: Mutex::new(Vec::new()),
            download_gate: Mutex::new(()),
            events,
            weak_self: weak.clone(),
        })
    }

    /// Subscribes to catalog change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the current catalog.
    pub async fn records(&self) -> Vec<VideoRecord> {
        self.records.lock().await.clone()
    }

    /// Downloads one URL and appends the resulting record to the catalog.
    ///
    /// Blocks until the external pipeline exits. On success the record is
    /// appended (unless a record with the same id is already present),
    /// the catalog is persisted, and a reconciliation reload is scheduled
    /// after the settle delay. On failure the catalog is left unchanged.
    pub async fn request_download(&self, url: &str) -> Result<VideoRecord, ControllerError> {
        // Rejected before any event: subscribers must never see a
        // Started/Failed pair for input that starts nothing.
        let trimmed = url.trim().to_string();
        if trimmed.is_empty() {
            return Err(FetchError::InvalidInput.into());
        }

        let _gate = self
            .download_gate
            .try_lock()
            .map_err(|_| ControllerError::Busy)?;

        let _ = self.events.send(CatalogEvent::DownloadStarted {
            url: trimmed.clone(),
        });

        let outcome = match self.fetcher.fetch(url).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let _ = self.events.send(CatalogEvent::DownloadFailed {
                    url: trimmed,
                    error: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let record = outcome.record;
        {
            let mut records = self.records.lock().await;
            if records.iter().any(|r| r.id == record.id) {
                debug!(id = %record.id, "Record already cataloged, skipping append");
            } else {
                records.push(record.clone());
            }

            // Best-effort durable mirror: the in-memory list stands even
            // if the write fails.
            if let Err(e) = self.store.persist(&records).await {
                warn!("Failed to persist catalog after download: {}", e);
            }
        }

        let _ = self.events.send(CatalogEvent::DownloadCompleted {
            record: record.clone(),
        });

        self.schedule_reload();

        info!(
            id = %record.id,
            title = %record.title,
            job_id = %outcome.job_id,
            "Download cataloged"
        );
        Ok(record)
    }

    /// Rebuilds the catalog from a directory scan, replacing the in-memory
    /// list. The consolidated file is rewritten from the scan result.
    pub async fn reload(&self) -> Result<ScanReport, ControllerError> {
        let mut records = self.records.lock().await;
        let report = self.store.load().await?;
        *records = report.records.clone();

        let _ = self.events.send(CatalogEvent::Reloaded {
            count: report.records.len(),
            skipped: report.skipped.len(),
        });

        info!(
            count = report.records.len(),
            skipped = report.skipped.len(),
            "Catalog reloaded"
        );
        Ok(report)
    }

    /// Removes the records at the given positions and persists the
    /// remaining list. The backing metadata and media files stay on disk,
    /// so a later reload resurrects the entries.
    pub async fn remove(&self, indices: &[usize]) -> Result<Vec<VideoRecord>, ControllerError> {
        let mut records = self.records.lock().await;

        for &index in indices {
            if index >= records.len() {
                return Err(ControllerError::IndexOutOfRange {
                    index,
                    len: records.len(),
                });
            }
        }

        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut removed = Vec::with_capacity(sorted.len());
        for &index in sorted.iter().rev() {
            removed.push(records.remove(index));
        }
        removed.reverse();

        if let Err(e) = self.store.persist(&records).await {
            warn!("Failed to persist catalog after remove: {}", e);
        }

        let ids: Vec<String> = removed.iter().map(|r| r.id.clone()).collect();
        info!(?ids, "Removed {} record(s)", removed.len());
        let _ = self.events.send(CatalogEvent::Removed { ids });

        Ok(removed)
    }

    /// Schedules the post-download reconciliation reload.
    ///
    /// The task holds only a weak back-reference: if the controller is
    /// dropped before the settle delay elapses it no-ops.
    fn schedule_reload(&self) {
        let weak = self.weak_self.clone();
        let delay = Duration::from_millis(self.config.settle_delay_ms);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(controller) = weak.upgrade() else {
                debug!("Controller gone before settle delay elapsed, skipping reload");
                return;
            };
            if let Err(e) = controller.reload().await {
                warn!("Post-download reload failed: {}", e);
            }
        });
    }
}
