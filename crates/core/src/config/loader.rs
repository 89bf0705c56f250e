use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides.
///
/// The file is optional: a missing file yields defaults, and `TUBESHELF_`
/// prefixed environment variables override either way
/// (e.g. `TUBESHELF_STORAGE__SAVE_DIR`, double underscore between levels
/// since field names contain single underscores).
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if path.exists() {
        figment = figment.merge(Toml::file(path));
    }

    figment
        .merge(Env::prefixed("TUBESHELF_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[storage]
save_dir = "/data/videos"

[fetcher]
timeout_secs = 600
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.storage.save_dir, PathBuf::from("/data/videos"));
        assert_eq!(config.fetcher.timeout_secs, 600);
    }

    #[test]
    fn test_load_config_from_str_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.storage.catalog_filename, "video_list.json");
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.storage.catalog_filename, "video_list.json");
    }

    #[test]
    fn test_env_override_beats_file_value() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[storage]
save_dir = "/from/file"
"#,
            )?;
            jail.set_env("TUBESHELF_STORAGE__SAVE_DIR", "/from/env");

            let config = load_config(Path::new("config.toml")).unwrap();
            assert_eq!(config.storage.save_dir, PathBuf::from("/from/env"));
            Ok(())
        });
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[storage]
save_dir = "/srv/media"
catalog_filename = "catalog.json"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.storage.save_dir, PathBuf::from("/srv/media"));
        assert_eq!(config.storage.catalog_filename, "catalog.json");
    }
}
