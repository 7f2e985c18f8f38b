//! bangumi-sync library
//!
//! Keeps a local `raw_data/` folder in step with the latest Bangumi archive
//! release: read the release manifest, compare against `version.txt`, and
//! download plus extract when a newer dump is published.

pub mod archive;
pub mod error;
pub mod manifest;

pub use archive::{install_archive, read_installed_version, sync_archive, SyncOutcome, VERSION_FILE};
pub use error::{Result, SyncError};
pub use manifest::ReleaseManifest;
