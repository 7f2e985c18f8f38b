//! bangumi-ingest library interface
//!
//! Loads a Bangumi archive dump into a property graph. Exposed as a library
//! for the binary and for integration testing.

pub mod config;
pub mod db;
pub mod models;
pub mod services;

pub use crate::config::{CliOverrides, RuntimeConfig};
pub use crate::models::{IngestReport, IngestState};
pub use crate::services::{IngestFailure, IngestOrchestrator, IngestSettings};

/// Build identification captured by `build.rs`
pub fn build_info() -> String {
    format!(
        "{} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    )
}
