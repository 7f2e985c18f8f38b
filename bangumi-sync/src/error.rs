//! Archive sync errors

use thiserror::Error;

/// Errors raised while syncing the archive
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Download endpoint answered with something other than 200
    #[error("Download of {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid release manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Invalid archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
