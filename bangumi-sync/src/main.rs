//! bangumi-sync - fetch the latest Bangumi archive dump
//!
//! Downloads and extracts a new dump into the raw-data folder when the
//! release manifest names a version other than the installed one.

use anyhow::{Context, Result};
use bangumi_common::config::{
    resolve_path, TomlConfig, DEFAULT_DATA_FOLDER, DEFAULT_MANIFEST, ENV_DATA_FOLDER,
};
use bangumi_sync::{sync_archive, ReleaseManifest, SyncOutcome};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const ENV_MANIFEST: &str = "BANGUMI_ARCHIVE_MANIFEST";

#[derive(Parser, Debug)]
#[command(name = "bangumi-sync")]
#[command(about = "Download the latest Bangumi archive dump")]
#[command(version)]
struct Args {
    /// Release manifest: local JSON file or http(s) URL
    #[arg(long, env = ENV_MANIFEST)]
    manifest: Option<String>,

    /// Folder the dump is extracted into
    #[arg(long)]
    raw_data: Option<PathBuf>,

    /// Where the zip is kept while extracting (default: system temp dir)
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Bootstrap config file (default: search standard locations)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, config_source) = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load config file")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting bangumi-sync v{}", env!("CARGO_PKG_VERSION"));
    config_source.log();

    let manifest_location = args
        .manifest
        .or_else(|| toml_config.archive.manifest.clone())
        .unwrap_or_else(|| DEFAULT_MANIFEST.to_string());
    let raw_data = resolve_path(
        args.raw_data.as_deref(),
        ENV_DATA_FOLDER,
        toml_config.data_folder.as_deref(),
        DEFAULT_DATA_FOLDER,
    );
    let download_dir = args
        .download_dir
        .or_else(|| toml_config.archive.download_folder.clone())
        .unwrap_or_else(std::env::temp_dir);

    let manifest = ReleaseManifest::load(&manifest_location)
        .await
        .with_context(|| format!("Failed to load release manifest {}", manifest_location))?;

    match sync_archive(&manifest, &raw_data, &download_dir)
        .await
        .context("Archive sync failed")?
    {
        SyncOutcome::UpToDate { version } => {
            info!("{} already holds {}", raw_data.display(), version);
        }
        SyncOutcome::Updated { previous, version } => {
            info!(
                "{} updated: {} -> {}",
                raw_data.display(),
                previous.as_deref().unwrap_or("none"),
                version
            );
        }
    }

    Ok(())
}
