//! Fetcher module - drives the external download-and-transcode pipeline.
//!
//! The pipeline is two external tools run to completion per URL: a media
//! fetch tool (yt-dlp) that downloads the best available quality, remuxes
//! to mp4 and writes a per-item metadata document, then a transcode tool
//! (ffmpeg) that re-encodes to an h264/aac profile with a `-qt` suffix.
//! Exit status and combined stdout/stderr are the only observable contract.

mod config;
mod error;
mod types;
mod ytdlp;

pub use config::FetcherConfig;
pub use error::FetchError;
pub use types::FetchOutcome;
pub use ytdlp::YtdlpFetcher;

use async_trait::async_trait;

/// Trait for driving one external fetch operation to completion.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Fetch one URL, blocking the calling operation until the external
    /// pipeline exits.
    ///
    /// Empty or whitespace-only URLs fail with [`FetchError::InvalidInput`]
    /// before any process is spawned. Surrounding whitespace is trimmed.
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError>;
}
