//! Download-on-first-use provisioning of the database file

use std::path::Path;

use tokio::fs;

use crate::error::{Error, Result};

/// Where the Chinook sample database is hosted.
pub const DEFAULT_DB_URL: &str =
    "https://storage.googleapis.com/benchmarks-artifacts/chinook/Chinook.db";

/// Default local path for the database file.
pub const DEFAULT_DB_PATH: &str = "Chinook.db";

/// Ensure the database file exists at `path`, fetching it from `url`
/// if absent. Returns `true` if a download was performed.
///
/// Idempotent: a second call observes the file and skips the fetch.
/// The response body is written verbatim; there is no checksum, retry,
/// or resume.
pub async fn ensure_database(path: &Path, url: &str) -> Result<bool> {
    if path.exists() {
        tracing::debug!(path = %path.display(), "database file already present");
        return Ok(false);
    }

    tracing::info!(url, path = %path.display(), "downloading database");
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::DownloadStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.bytes().await?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, &body).await?;

    tracing::info!(bytes = body.len(), "database downloaded");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_existing_file_skips_fetch() {
        // A bogus URL proves no network activity happens: if the fetch
        // ran, the call would fail.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Chinook.db");
        std::fs::write(&path, b"already here").unwrap();

        let fetched = ensure_database(&path, "http://127.0.0.1:1/never")
            .await
            .unwrap();
        assert!(!fetched);
        assert_eq!(std::fs::read(&path).unwrap(), b"already here");
    }

    #[tokio::test]
    async fn test_repeated_calls_stay_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Chinook.db");
        std::fs::write(&path, b"x").unwrap();

        for _ in 0..3 {
            let fetched = ensure_database(&path, "http://127.0.0.1:1/never")
                .await
                .unwrap();
            assert!(!fetched);
        }
    }

    #[tokio::test]
    async fn test_missing_file_with_unreachable_host_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Chinook.db");

        let err = ensure_database(&path, "http://127.0.0.1:1/never").await;
        assert!(err.is_err());
        assert!(!path.exists(), "no partial file on failure");
    }
}
