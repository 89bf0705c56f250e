//! Headless surface for the download-and-catalog orchestrator.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubeshelf_core::{
    load_config, validate_config, CatalogController, CatalogStore, ControllerError, FetchError,
    JsonCatalogStore, VideoRecord, YtdlpFetcher,
};

#[derive(Parser)]
#[command(name = "tubeshelf", version, about = "Download videos and keep a local catalog")]
struct Cli {
    /// Path to the configuration file (also via TUBESHELF_CONFIG).
    /// Missing file falls back to defaults.
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download a video URL and catalog it
    Download {
        /// Video URL to fetch
        url: String,
    },
    /// List the catalog
    List {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove catalog entries by index (as printed by `list`).
    /// The underlying files stay on disk.
    Remove {
        /// Zero-based indices to remove
        #[arg(required = true)]
        indices: Vec<usize>,
    },
    /// Rebuild the catalog from the save directory
    Reload,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(|| std::env::var("TUBESHELF_CONFIG").map(PathBuf::from).ok())
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Save directory: {:?}", config.storage.save_dir);

    let store: Arc<dyn CatalogStore> = Arc::new(JsonCatalogStore::new(&config.storage));
    let fetcher = YtdlpFetcher::new(config.fetcher.clone(), config.storage.save_dir.clone());
    let controller = CatalogController::new(config.controller.clone(), fetcher, store);

    match cli.command {
        Command::Download { url } => {
            controller
                .reload()
                .await
                .context("Failed to load catalog")?;

            match controller.request_download(&url).await {
                Ok(record) => {
                    // The settle-delay reload will not outlive this
                    // process; reconcile before exiting instead.
                    controller
                        .reload()
                        .await
                        .context("Post-download reload failed")?;
                    println!(
                        "Downloaded: {} by {} ({} views)",
                        record.title, record.uploader, record.views
                    );
                    println!("  {}", record.file_path.display());
                    Ok(())
                }
                Err(e) => {
                    if let ControllerError::Fetch(FetchError::Failed { ref output, .. }) = e {
                        eprintln!("--- captured pipeline output ---");
                        eprintln!("{}", output);
                    }
                    Err(e).context("Download failed")
                }
            }
        }
        Command::List { json } => {
            controller
                .reload()
                .await
                .context("Failed to load catalog")?;
            let records = controller.records().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_records(&records);
            }
            Ok(())
        }
        Command::Remove { indices } => {
            controller
                .reload()
                .await
                .context("Failed to load catalog")?;
            let removed = controller
                .remove(&indices)
                .await
                .context("Remove failed")?;
            for record in &removed {
                println!("Removed: {}", record.title);
            }
            Ok(())
        }
        Command::Reload => {
            let report = controller.reload().await.context("Reload failed")?;
            println!(
                "Reloaded {} record(s), skipped {} file(s)",
                report.records.len(),
                report.skipped.len()
            );
            for skipped in &report.skipped {
                eprintln!("  skipped {:?}: {}", skipped.path, skipped.reason);
            }
            Ok(())
        }
    }
}

fn print_records(records: &[VideoRecord]) {
    if records.is_empty() {
        println!("Catalog is empty");
        return;
    }
    for (index, record) in records.iter().enumerate() {
        println!(
            "[{}] {} by {} ({}), {} views\n    {}",
            index,
            record.title,
            record.uploader,
            record.channel,
            record.views,
            record.file_path.display()
        );
    }
}
