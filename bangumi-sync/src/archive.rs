//! Versioned download and extraction of the archive dump
//!
//! `<raw_data>/version.txt` holds the release name of the installed dump. A
//! sync is a no-op while it matches the manifest; otherwise the zip is
//! downloaded, the old folder replaced by its contents, and the zip removed.

use crate::error::{Result, SyncError};
use crate::manifest::{http_client, ReleaseManifest};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub const VERSION_FILE: &str = "version.txt";

/// Result of one sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// `version.txt` already names the latest release
    UpToDate { version: String },
    /// A new dump was installed
    Updated {
        previous: Option<String>,
        version: String,
    },
}

/// Release name recorded in `raw_data`, if any
pub async fn read_installed_version(raw_data: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(raw_data.join(VERSION_FILE)).await {
        Ok(text) => Ok(Some(text.trim().to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Bring `raw_data` up to the release described by `manifest`
pub async fn sync_archive(
    manifest: &ReleaseManifest,
    raw_data: &Path,
    download_dir: &Path,
) -> Result<SyncOutcome> {
    let installed = read_installed_version(raw_data).await?;
    if installed.as_deref() == Some(manifest.name.as_str()) {
        tracing::info!(version = %manifest.name, "Archive is up to date");
        return Ok(SyncOutcome::UpToDate {
            version: manifest.name.clone(),
        });
    }

    tracing::info!(
        installed = installed.as_deref().unwrap_or("none"),
        latest = %manifest.name,
        "Newer archive available"
    );

    tokio::fs::create_dir_all(download_dir).await?;
    let zip_path = download_dir.join(manifest.archive_file_name());
    download(&manifest.browser_download_url, &zip_path).await?;

    install_archive(&zip_path, raw_data, &manifest.name).await?;

    tokio::fs::remove_file(&zip_path).await?;
    tracing::debug!(path = %zip_path.display(), "Removed downloaded zip");

    Ok(SyncOutcome::Updated {
        previous: installed,
        version: manifest.name.clone(),
    })
}

/// Stream `url` into `dest`
async fn download(url: &str, dest: &Path) -> Result<u64> {
    tracing::info!(url = %url, dest = %dest.display(), "Downloading archive");

    let mut response = http_client()?.get(url).send().await?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(SyncError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut written: u64 = 0;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    tracing::info!(bytes = written, "Download complete");
    Ok(written)
}

/// Replace `raw_data` with the contents of `zip_path` and stamp `version`
///
/// The zip itself is left in place.
pub async fn install_archive(zip_path: &Path, raw_data: &Path, version: &str) -> Result<()> {
    if tokio::fs::try_exists(raw_data).await? {
        tracing::info!(path = %raw_data.display(), "Removing previous dump");
        tokio::fs::remove_dir_all(raw_data).await?;
    }
    tokio::fs::create_dir_all(raw_data).await?;

    let zip_path: PathBuf = zip_path.to_path_buf();
    let target: PathBuf = raw_data.to_path_buf();
    let entries = tokio::task::spawn_blocking(move || -> Result<usize> {
        let file = std::fs::File::open(&zip_path)?;
        let mut archive = zip::ZipArchive::new(file)?;
        let entries = archive.len();
        archive.extract(&target)?;
        Ok(entries)
    })
    .await??;

    tokio::fs::write(raw_data.join(VERSION_FILE), version).await?;
    tracing::info!(entries, version, path = %raw_data.display(), "Archive extracted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_installed_version_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let version = read_installed_version(&dir.path().join("raw_data")).await.unwrap();
        assert_eq!(version, None);
    }

    #[tokio::test]
    async fn test_installed_version_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(VERSION_FILE), "dump-1\n").unwrap();
        let version = read_installed_version(dir.path()).await.unwrap();
        assert_eq!(version.as_deref(), Some("dump-1"));
    }

    #[tokio::test]
    async fn test_corrupt_zip_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("broken.zip");
        std::fs::write(&zip_path, b"not a zip").unwrap();

        let err = install_archive(&zip_path, &dir.path().join("raw_data"), "dump-1")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Zip(_)));
        assert!(!dir.path().join("raw_data").join(VERSION_FILE).exists());
    }
}
