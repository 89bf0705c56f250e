//! yt-dlp based fetcher implementation.

use async_trait::async_trait;
use chrono::Utc;
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Instant, SystemTime};
use tokio::io::{AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::VideoRecord;

use super::config::FetcherConfig;
use super::error::FetchError;
use super::types::FetchOutcome;
use super::Fetcher;

/// Fetcher that drives yt-dlp (download, remux, metadata sidecar) and an
/// ffmpeg transcode pass, both in the configured save directory.
pub struct YtdlpFetcher {
    config: FetcherConfig,
    save_dir: PathBuf,
}

impl YtdlpFetcher {
    pub fn new(config: FetcherConfig, save_dir: PathBuf) -> Self {
        Self { config, save_dir }
    }

    /// Builds the shell command line for the download step.
    ///
    /// Output files are named from the video title; the sidecar metadata
    /// document lands next to the media file as `<title>.info.json`.
    fn build_download_command(&self, url: &str) -> String {
        let output_template = self.save_dir.join("%(title)s.%(ext)s");

        let mut parts = vec![
            shell_quote(&self.config.ytdlp_path.to_string_lossy()),
            "-f".to_string(),
            "best".to_string(),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
            "--write-info-json".to_string(),
            "-o".to_string(),
            shell_quote(&output_template.to_string_lossy()),
        ];

        for arg in &self.config.extra_ytdlp_args {
            parts.push(shell_quote(arg));
        }

        parts.push(shell_quote(url));
        parts.join(" ")
    }

    /// Builds ffmpeg arguments for the transcode pass: h264/aac with
    /// faststart, written as `<title>-qt.mp4`.
    fn build_transcode_args(&self, title: &str) -> Vec<String> {
        let input = self.save_dir.join(format!("{}.mp4", title));
        let output = self.save_dir.join(format!("{}-qt.mp4", title));

        vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vcodec".to_string(),
            "h264".to_string(),
            "-acodec".to_string(),
            "aac".to_string(),
            "-strict".to_string(),
            "-2".to_string(),
            "-movflags".to_string(),
            "faststart".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    /// Extracts the metadata sidecar path from captured yt-dlp output.
    fn metadata_path_from_output(output: &str) -> Option<PathBuf> {
        let re = Regex::new(r"Writing video metadata as JSON to:\s*(.+)").ok()?;
        re.captures_iter(output)
            .filter_map(|caps| caps.get(1))
            .map(|m| PathBuf::from(m.as_str().trim()))
            .last()
    }

    /// Fallback location of the result metadata file: the most recently
    /// modified `*.info.json` in the save directory written after the
    /// fetch started.
    async fn newest_metadata_since(&self, since: SystemTime) -> Option<PathBuf> {
        let mut entries = tokio::fs::read_dir(&self.save_dir).await.ok()?;
        let mut newest: Option<(SystemTime, PathBuf)> = None;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            if !name.ends_with(".info.json") {
                continue;
            }
            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(_) => continue,
            };
            if modified < since {
                continue;
            }
            if newest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
                newest = Some((modified, path));
            }
        }

        newest.map(|(_, path)| path)
    }

    /// Runs a command to completion, capturing combined stdout/stderr.
    /// Kills the child if it overruns the configured timeout.
    async fn run_captured(
        &self,
        mut cmd: Command,
        tool: &Path,
    ) -> Result<(ExitStatus, String), FetchError> {
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Reaps the pipeline if the timeout drops the wait future.
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::SpawnFailed {
                        tool: tool.to_path_buf(),
                        reason: e.to_string(),
                    }
                } else {
                    FetchError::Io(e)
                }
            })?;

        let stdout = child.stdout.take().expect("stdout should be piped");
        let stderr = child.stderr.take().expect("stderr should be piped");

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            // Drain stderr concurrently so neither pipe can fill up and
            // stall the child.
            let stderr_task = tokio::spawn(async move {
                let mut buf = String::new();
                let _ = BufReader::new(stderr).read_to_string(&mut buf).await;
                buf
            });

            let mut output = String::new();
            let _ = BufReader::new(stdout).read_to_string(&mut output).await;

            let status = child.wait().await?;

            if let Ok(err_output) = stderr_task.await {
                output.push_str(&err_output);
            }

            Ok::<(ExitStatus, String), std::io::Error>((status, output))
        })
        .await;

        match result {
            Ok(Ok(ok)) => Ok(ok),
            Ok(Err(e)) => Err(FetchError::Io(e)),
            Err(_) => Err(FetchError::Timeout {
                timeout_secs: self.config.timeout_secs,
            }),
        }
    }
}

#[async_trait]
impl Fetcher for YtdlpFetcher {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FetchError::InvalidInput);
        }

        let job_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        let started_at = SystemTime::now();

        info!(job_id = %job_id, url = %url, "Starting fetch");

        tokio::fs::create_dir_all(&self.save_dir).await?;

        // Download step: yt-dlp fetches best quality, remuxes to mp4 and
        // writes the metadata sidecar, as one shell command.
        let command_line = self.build_download_command(url);
        debug!(job_id = %job_id, command = %command_line, "Running download command");

        let mut cmd = Command::new(&self.config.shell_path);
        cmd.arg("-c").arg(&command_line);
        let (status, mut output) = self.run_captured(cmd, &self.config.shell_path).await?;

        if !status.success() {
            // The shell reports an unlaunchable command with exit 127.
            if status.code() == Some(127) {
                return Err(FetchError::SpawnFailed {
                    tool: self.config.ytdlp_path.clone(),
                    reason: output.trim().to_string(),
                });
            }
            return Err(FetchError::failed(
                format!(
                    "download pipeline exited with code {:?}",
                    status.code()
                ),
                output,
            ));
        }

        // Locate the freshly-written metadata file: by the yt-dlp output
        // line first, else by modification time. The margin absorbs coarse
        // file-system timestamp granularity.
        let since = started_at - Duration::from_secs(2);
        let metadata_path = match Self::metadata_path_from_output(&output) {
            Some(path) => Some(path),
            None => self.newest_metadata_since(since).await,
        };
        let metadata_path = match metadata_path {
            Some(path) => path,
            None => {
                return Err(FetchError::failed(
                    "no result metadata file found in save directory",
                    output,
                ))
            }
        };

        let doc: serde_json::Value = match tokio::fs::read(&metadata_path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(doc) => doc,
                Err(e) => {
                    return Err(FetchError::failed(
                        format!("unparseable result metadata {:?}: {}", metadata_path, e),
                        output,
                    ))
                }
            },
            Err(e) => {
                return Err(FetchError::failed(
                    format!("unreadable result metadata {:?}: {}", metadata_path, e),
                    output,
                ))
            }
        };

        let record = VideoRecord::from_metadata(&self.save_dir, &metadata_path, &doc)
            .with_downloaded_at(Utc::now());

        // Transcode step. The input file name is only known once the title
        // is, so this runs after the metadata is parsed.
        if self.config.transcode {
            let args = self.build_transcode_args(&record.title);
            debug!(job_id = %job_id, "Running transcode pass");

            let mut cmd = Command::new(&self.config.ffmpeg_path);
            cmd.args(&args);
            let (status, ffmpeg_output) =
                self.run_captured(cmd, &self.config.ffmpeg_path).await?;
            output.push_str(&ffmpeg_output);
            if !status.success() {
                return Err(FetchError::failed(
                    format!("transcode exited with code {:?}", status.code()),
                    output,
                ));
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            job_id = %job_id,
            title = %record.title,
            duration_ms,
            "Fetch completed"
        );
        if !output.is_empty() {
            debug!(job_id = %job_id, "Pipeline output:\n{}", output);
        }

        Ok(FetchOutcome {
            job_id,
            record,
            output,
            duration_ms,
        })
    }
}

/// Single-quotes a string for POSIX shells.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> YtdlpFetcher {
        YtdlpFetcher::new(FetcherConfig::default(), PathBuf::from("/videos"))
    }

    #[test]
    fn test_build_download_command() {
        let command = fetcher().build_download_command("https://example.com/watch?v=x");

        assert!(command.starts_with("'yt-dlp'"));
        assert!(command.contains("-f best"));
        assert!(command.contains("--merge-output-format mp4"));
        assert!(command.contains("--write-info-json"));
        assert!(command.contains("'/videos/%(title)s.%(ext)s'"));
        assert!(command.ends_with("'https://example.com/watch?v=x'"));
    }

    #[test]
    fn test_build_download_command_extra_args() {
        let config = FetcherConfig {
            extra_ytdlp_args: vec!["--no-playlist".to_string()],
            ..Default::default()
        };
        let fetcher = YtdlpFetcher::new(config, PathBuf::from("/videos"));
        let command = fetcher.build_download_command("https://example.com");
        assert!(command.contains("'--no-playlist'"));
    }

    #[test]
    fn test_build_transcode_args() {
        let args = fetcher().build_transcode_args("My Video");

        assert_eq!(args[0], "-y");
        assert!(args.contains(&"/videos/My Video.mp4".to_string()));
        assert!(args.contains(&"-vcodec".to_string()));
        assert!(args.contains(&"h264".to_string()));
        assert!(args.contains(&"-acodec".to_string()));
        assert!(args.contains(&"aac".to_string()));
        assert!(args.contains(&"faststart".to_string()));
        assert_eq!(args.last().unwrap(), "/videos/My Video-qt.mp4");
    }

    #[test]
    fn test_metadata_path_from_output() {
        let output = "\
[youtube] Extracting URL\n\
[info] Writing video metadata as JSON to: /videos/A.info.json\n\
[download] Destination: /videos/A.mp4\n";

        let path = YtdlpFetcher::metadata_path_from_output(output);
        assert_eq!(path, Some(PathBuf::from("/videos/A.info.json")));
    }

    #[test]
    fn test_metadata_path_from_output_takes_last_match() {
        let output = "\
[info] Writing video metadata as JSON to: /videos/A.info.json\n\
[info] Writing video metadata as JSON to: /videos/B.info.json\n";

        let path = YtdlpFetcher::metadata_path_from_output(output);
        assert_eq!(path, Some(PathBuf::from("/videos/B.info.json")));
    }

    #[test]
    fn test_metadata_path_from_output_absent() {
        assert_eq!(
            YtdlpFetcher::metadata_path_from_output("[download] 100%"),
            None
        );
    }

    #[test]
    fn test_shell_quote_plain() {
        assert_eq!(shell_quote("abc"), "'abc'");
    }

    #[test]
    fn test_shell_quote_embedded_quote() {
        assert_eq!(shell_quote("a'b"), r"'a'\''b'");
    }

    #[tokio::test]
    async fn test_fetch_blank_url_rejected_before_spawn() {
        // Shell path that cannot exist: a spawn attempt would surface as
        // SpawnFailed, not InvalidInput.
        let config = FetcherConfig {
            shell_path: PathBuf::from("/nonexistent/shell"),
            ..Default::default()
        };
        let fetcher = YtdlpFetcher::new(config, PathBuf::from("/videos"));

        for url in ["", "   ", "\t\n"] {
            let err = fetcher.fetch(url).await.unwrap_err();
            assert!(matches!(err, FetchError::InvalidInput), "url {:?}", url);
        }
    }
}
