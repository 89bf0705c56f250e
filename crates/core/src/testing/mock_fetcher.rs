//! Mock fetcher for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::VideoRecord;
use crate::fetcher::{FetchError, FetchOutcome, Fetcher};

/// Scripted behavior for one mock fetch invocation.
#[derive(Debug, Clone)]
pub enum ScriptedFetch {
    /// Succeed with the given record.
    Succeed(VideoRecord),
    /// Fail with `FetchError::Failed` carrying the given output.
    Fail { reason: String, output: String },
    /// Fail with `FetchError::SpawnFailed`.
    FailSpawn,
}

/// Mock implementation of the Fetcher trait.
///
/// Behaves like the real one at the contract level (blank URLs are
/// rejected before counting as an invocation) and otherwise plays back
/// scripted results in order, optionally delaying each fetch so tests can
/// exercise in-flight behavior.
#[derive(Clone)]
pub struct MockFetcher {
    /// URLs fetched, post-validation. One entry per external invocation.
    calls: Arc<RwLock<Vec<String>>>,
    /// Scripted results, consumed front-to-back.
    script: Arc<RwLock<VecDeque<ScriptedFetch>>>,
    /// Artificial fetch duration.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            script: Arc::new(RwLock::new(VecDeque::new())),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    /// Queue a scripted result for the next fetch.
    pub async fn push_result(&self, result: ScriptedFetch) {
        self.script.write().await.push_back(result);
    }

    /// Make every fetch take this long before resolving.
    pub async fn set_fetch_duration(&self, duration: Duration) {
        *self.delay.write().await = Some(duration);
    }

    /// URLs fetched so far (external invocations only).
    pub async fn recorded_calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    /// Number of external invocations issued.
    pub async fn invocation_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FetchError::InvalidInput);
        }

        self.calls.write().await.push(url.to_string());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.script.write().await.pop_front();
        match scripted {
            Some(ScriptedFetch::Succeed(record)) => Ok(FetchOutcome {
                job_id: Uuid::new_v4().to_string(),
                record,
                output: "mock output".to_string(),
                duration_ms: 0,
            }),
            Some(ScriptedFetch::Fail { reason, output }) => {
                Err(FetchError::failed(reason, output))
            }
            Some(ScriptedFetch::FailSpawn) => Err(FetchError::SpawnFailed {
                tool: PathBuf::from("yt-dlp"),
                reason: "No such file or directory".to_string(),
            }),
            None => Err(FetchError::failed("no scripted result", String::new())),
        }
    }
}
