pub mod catalog;
pub mod config;
pub mod controller;
pub mod fetcher;
pub mod testing;

pub use catalog::{
    CatalogError, CatalogStore, JsonCatalogStore, ScanReport, SkippedFile, VideoRecord,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, StorageConfig,
};
pub use controller::{CatalogController, CatalogEvent, ControllerConfig, ControllerError};
pub use fetcher::{FetchError, FetchOutcome, Fetcher, FetcherConfig, YtdlpFetcher};
