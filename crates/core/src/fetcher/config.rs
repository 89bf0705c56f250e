//! Configuration for the fetcher module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the yt-dlp based fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Shell used to run the download command line.
    #[serde(default = "default_shell_path")]
    pub shell_path: PathBuf,

    /// Path to the yt-dlp binary.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,

    /// Path to the ffmpeg binary used for the transcode pass.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Whether to run the h264/aac transcode pass after the download.
    #[serde(default = "default_transcode")]
    pub transcode: bool,

    /// Timeout for the whole fetch operation in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Additional yt-dlp arguments appended to the fixed template.
    #[serde(default)]
    pub extra_ytdlp_args: Vec<String>,
}

fn default_shell_path() -> PathBuf {
    PathBuf::from("/bin/bash")
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_transcode() -> bool {
    true
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            shell_path: default_shell_path(),
            ytdlp_path: default_ytdlp_path(),
            ffmpeg_path: default_ffmpeg_path(),
            transcode: default_transcode(),
            timeout_secs: default_timeout(),
            extra_ytdlp_args: Vec::new(),
        }
    }
}

impl FetcherConfig {
    /// Creates a config with custom tool paths.
    pub fn with_paths(ytdlp_path: PathBuf, ffmpeg_path: PathBuf) -> Self {
        Self {
            ytdlp_path,
            ffmpeg_path,
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Disables the transcode pass.
    pub fn without_transcode(mut self) -> Self {
        self.transcode = false;
        self
    }
}
