//! Release manifest (`aux/latest.json` of the archive repository)

use crate::error::{Result, SyncError};
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("bangumi-sync/", env!("CARGO_PKG_VERSION"));

/// Latest published dump
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseManifest {
    /// Release name, also written to `version.txt`
    pub name: String,
    pub browser_download_url: String,
}

impl ReleaseManifest {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load from a local file or an `http(s)` URL
    pub async fn load(location: &str) -> Result<Self> {
        if is_remote(location) {
            tracing::debug!(url = %location, "Fetching release manifest");
            let response = http_client()?.get(location).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SyncError::Status {
                    url: location.to_string(),
                    status: status.as_u16(),
                });
            }
            Self::from_json(&response.text().await?)
        } else {
            tracing::debug!(path = %location, "Reading release manifest");
            let text = tokio::fs::read_to_string(location).await?;
            Self::from_json(&text)
        }
    }

    /// File name for the downloaded zip
    pub fn archive_file_name(&self) -> String {
        let stem: String = self
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        format!("{}.zip", stem)
    }
}

pub(crate) fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

pub(crate) fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(30))
        .build()?)
}
