//! Configuration loading and folder resolution
//!
//! Bootstrap configuration is read from an optional TOML file. A missing or
//! broken default config file never stops a run: a warning is logged and the
//! compiled defaults are used.
//!
//! Folder resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::records::RecordKind;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Config file name searched in the config directories
pub const CONFIG_FILE_NAME: &str = "bangumi-ingest.toml";

pub const ENV_DATA_FOLDER: &str = "BANGUMI_DATA_FOLDER";
pub const ENV_COMMON_FOLDER: &str = "BANGUMI_COMMON_FOLDER";
pub const ENV_DATABASE: &str = "BANGUMI_DATABASE";

/// Compiled defaults, relative to the working directory
pub const DEFAULT_DATA_FOLDER: &str = "raw_data";
pub const DEFAULT_COMMON_FOLDER: &str = "bangumi_common";
pub const DEFAULT_DATABASE: &str = "bangumi_graph.db";
pub const DEFAULT_MANIFEST: &str = "bangumi_archive/aux/latest.json";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the extracted `.jsonlines` dump
    #[serde(default)]
    pub data_folder: Option<PathBuf>,

    /// Checkout of `bangumi/common` holding the taxonomy YAML files
    #[serde(default)]
    pub common_folder: Option<PathBuf>,

    /// SQLite file backing the graph store
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub limits: RecordLimits,

    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Optional per-kind record caps
///
/// A cap counts records read from the file, including records the loader
/// drops afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLimits {
    #[serde(default)]
    pub subjects: Option<usize>,
    #[serde(default)]
    pub persons: Option<usize>,
    #[serde(default)]
    pub characters: Option<usize>,
    #[serde(default)]
    pub subject_relations: Option<usize>,
    #[serde(default)]
    pub subject_persons: Option<usize>,
    #[serde(default)]
    pub subject_characters: Option<usize>,
    #[serde(default)]
    pub person_characters: Option<usize>,
}

impl RecordLimits {
    pub fn for_kind(&self, kind: RecordKind) -> Option<usize> {
        match kind {
            RecordKind::Subject => self.subjects,
            RecordKind::Person => self.persons,
            RecordKind::Character => self.characters,
            RecordKind::SubjectRelation => self.subject_relations,
            RecordKind::SubjectPerson => self.subject_persons,
            RecordKind::SubjectCharacter => self.subject_characters,
            RecordKind::PersonCharacter => self.person_characters,
        }
    }

    /// Overlay: every cap set in `other` replaces the one in `self`
    pub fn merged_with(self, other: RecordLimits) -> RecordLimits {
        RecordLimits {
            subjects: other.subjects.or(self.subjects),
            persons: other.persons.or(self.persons),
            characters: other.characters.or(self.characters),
            subject_relations: other.subject_relations.or(self.subject_relations),
            subject_persons: other.subject_persons.or(self.subject_persons),
            subject_characters: other.subject_characters.or(self.subject_characters),
            person_characters: other.person_characters.or(self.person_characters),
        }
    }
}

/// Archive sync configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Release manifest: a local JSON file or an http(s) URL
    #[serde(default)]
    pub manifest: Option<String>,

    /// Where the downloaded zip is stored before extraction
    #[serde(default)]
    pub download_folder: Option<PathBuf>,
}

impl TomlConfig {
    /// Load a config file, failing on any read or parse error
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the bootstrap config
    ///
    /// An explicitly given path must load. Otherwise the default locations are
    /// searched and any problem degrades to defaults. Nothing is logged here:
    /// the config decides how logging is set up, so callers report the
    /// returned [`ConfigSource`] once tracing is running.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            let config = Self::load(path)?;
            return Ok((config, ConfigSource::File(path.to_path_buf())));
        }

        match locate_config_file() {
            Some(path) => match Self::load(&path) {
                Ok(config) => Ok((config, ConfigSource::File(path))),
                Err(e) => Ok((
                    Self::default(),
                    ConfigSource::Degraded {
                        path,
                        reason: e.to_string(),
                    },
                )),
            },
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }
}

/// Where the bootstrap config came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No config file in the default locations
    Defaults,
    /// A default-location file exists but failed to load
    Degraded { path: PathBuf, reason: String },
}

impl ConfigSource {
    /// Log how the config was obtained; a degraded load is a warning
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config file: {}", path.display()),
            ConfigSource::Defaults => info!("No config file found, using compiled defaults"),
            ConfigSource::Degraded { path, reason } => warn!(
                config_file = %path.display(),
                "{}; using compiled defaults",
                reason
            ),
        }
    }
}

/// Search the default config file locations
///
/// `$XDG_CONFIG_HOME/bangumi/bangumi-ingest.toml`, then
/// `/etc/bangumi/bangumi-ingest.toml` on Linux.
fn locate_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("bangumi").join(CONFIG_FILE_NAME));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/bangumi").join(CONFIG_FILE_NAME);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve a path setting following the CLI → ENV → TOML → default order
pub fn resolve_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_value: Option<&Path>,
    default: &str,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = toml_value {
        return path.to_path_buf();
    }

    // Priority 4: Compiled default
    PathBuf::from(default)
}
