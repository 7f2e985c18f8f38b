//! Runtime configuration resolution for bangumi-ingest
//!
//! Combines command-line overrides, environment variables and the bootstrap
//! TOML into the concrete paths and caps of one run.
//!
//! **Priority:** CLI → ENV → TOML → compiled default (caps: CLI → TOML)

use bangumi_common::config::{
    resolve_path, RecordLimits, TomlConfig, DEFAULT_COMMON_FOLDER, DEFAULT_DATABASE,
    DEFAULT_DATA_FOLDER, ENV_COMMON_FOLDER, ENV_DATABASE, ENV_DATA_FOLDER,
};
use std::path::PathBuf;
use tracing::info;

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub data_folder: Option<PathBuf>,
    pub common_folder: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub limits: RecordLimits,
}

/// Fully resolved run configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub data_folder: PathBuf,
    pub common_folder: PathBuf,
    pub database_path: PathBuf,
    pub limits: RecordLimits,
}

impl RuntimeConfig {
    pub fn resolve(cli: &CliOverrides, toml_config: &TomlConfig) -> Self {
        let config = Self {
            data_folder: resolve_path(
                cli.data_folder.as_deref(),
                ENV_DATA_FOLDER,
                toml_config.data_folder.as_deref(),
                DEFAULT_DATA_FOLDER,
            ),
            common_folder: resolve_path(
                cli.common_folder.as_deref(),
                ENV_COMMON_FOLDER,
                toml_config.common_folder.as_deref(),
                DEFAULT_COMMON_FOLDER,
            ),
            database_path: resolve_path(
                cli.database_path.as_deref(),
                ENV_DATABASE,
                toml_config.database_path.as_deref(),
                DEFAULT_DATABASE,
            ),
            limits: toml_config.limits.merged_with(cli.limits),
        };

        info!(
            data_folder = %config.data_folder.display(),
            common_folder = %config.common_folder.display(),
            database = %config.database_path.display(),
            "Configuration resolved"
        );

        config
    }
}
