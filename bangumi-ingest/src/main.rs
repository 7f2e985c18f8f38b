//! bangumi-ingest - Bangumi archive → property graph loader
//!
//! Rebuilds the graph database from scratch out of an extracted archive dump
//! (`raw_data/`) and a checkout of the `bangumi/common` taxonomy tables.
//!
//! Exit status is non-zero when the run aborts.

use anyhow::{Context, Result};
use bangumi_common::config::{RecordLimits, TomlConfig};
use bangumi_common::taxonomy::Taxonomy;
use bangumi_ingest::db::{init_database_pool, GraphStore, NodeLabel, SqliteGraphStore};
use bangumi_ingest::{CliOverrides, IngestOrchestrator, IngestSettings, RuntimeConfig};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for bangumi-ingest
#[derive(Parser, Debug)]
#[command(name = "bangumi-ingest")]
#[command(about = "Load a Bangumi archive dump into a property graph")]
#[command(version)]
struct Args {
    /// Folder holding the extracted `.jsonlines` files
    #[arg(long)]
    data_folder: Option<PathBuf>,

    /// Folder holding subject_relations.yml, subject_staffs.yml, subject_platforms.yml
    #[arg(long)]
    common_folder: Option<PathBuf>,

    /// Graph database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Bootstrap config file (default: search standard locations)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_name = "N")]
    limit_subjects: Option<usize>,

    #[arg(long, value_name = "N")]
    limit_persons: Option<usize>,

    #[arg(long, value_name = "N")]
    limit_characters: Option<usize>,

    #[arg(long, value_name = "N")]
    limit_subject_relations: Option<usize>,

    #[arg(long, value_name = "N")]
    limit_subject_persons: Option<usize>,

    #[arg(long, value_name = "N")]
    limit_subject_characters: Option<usize>,

    #[arg(long, value_name = "N")]
    limit_person_characters: Option<usize>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            data_folder: self.data_folder.clone(),
            common_folder: self.common_folder.clone(),
            database_path: self.database.clone(),
            limits: RecordLimits {
                subjects: self.limit_subjects,
                persons: self.limit_persons,
                characters: self.limit_characters,
                subject_relations: self.limit_subject_relations,
                subject_persons: self.limit_subject_persons,
                subject_characters: self.limit_subject_characters,
                person_characters: self.limit_person_characters,
            },
        }
    }
}

/// RUST_LOG wins over the configured level
fn init_tracing(toml_config: &TomlConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level));

    match &toml_config.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first: it decides the log level and destination. How it was
    // obtained is logged once tracing is up.
    let (toml_config, config_source) = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load config file")?;
    init_tracing(&toml_config)?;

    info!("Starting bangumi-ingest {}", bangumi_ingest::build_info());
    config_source.log();

    let config = RuntimeConfig::resolve(&args.overrides(), &toml_config);

    let taxonomy = Taxonomy::load(&config.common_folder).with_context(|| {
        format!(
            "Failed to load taxonomy tables from {}",
            config.common_folder.display()
        )
    })?;

    let pool = init_database_pool(&config.database_path)
        .await
        .context("Failed to open graph database")?;
    let store = Arc::new(SqliteGraphStore::new(pool.clone()));

    let orchestrator = IngestOrchestrator::new(
        store.clone(),
        taxonomy,
        IngestSettings {
            data_folder: config.data_folder.clone(),
            limits: config.limits,
        },
    );

    let report = orchestrator.run().await.context("Ingestion aborted")?;

    for stage in &report.stages {
        info!("{:<28} {}", stage.stage.as_str(), stage.display_string());
    }
    for label in [
        NodeLabel::Platform,
        NodeLabel::Subject,
        NodeLabel::Person,
        NodeLabel::Character,
        NodeLabel::Role,
    ] {
        info!("{:<10} {} nodes", label.as_str(), store.count_nodes(label).await?);
    }
    info!(
        run_id = %report.run_id,
        duration_ms = report.duration_ms(),
        failed_records = report.total_failed(),
        "Graph written to {}",
        config.database_path.display()
    );

    pool.close().await;
    Ok(())
}
