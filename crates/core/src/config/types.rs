use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::controller::ControllerConfig;
use crate::fetcher::FetcherConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
}

/// Storage configuration: where media, per-item metadata files and the
/// consolidated catalog file live.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory all media and metadata files are written to.
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// File name of the consolidated catalog file inside `save_dir`.
    #[serde(default = "default_catalog_filename")]
    pub catalog_filename: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            catalog_filename: default_catalog_filename(),
        }
    }
}

impl StorageConfig {
    /// Absolute path of the consolidated catalog file.
    pub fn catalog_path(&self) -> PathBuf {
        self.save_dir.join(&self.catalog_filename)
    }
}

fn default_save_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join("Movies/YoutubeDownloads"),
        None => PathBuf::from("."),
    }
}

fn default_catalog_filename() -> String {
    "video_list.json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_path_joins_save_dir() {
        let config = StorageConfig {
            save_dir: PathBuf::from("/tmp/videos"),
            catalog_filename: "video_list.json".to_string(),
        };
        assert_eq!(
            config.catalog_path(),
            PathBuf::from("/tmp/videos/video_list.json")
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.storage.catalog_filename, "video_list.json");
    }
}
