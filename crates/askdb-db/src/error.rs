//! Error types for askdb-db

use thiserror::Error;

/// Result type alias using askdb-db Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from provisioning or querying the database
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem failure while persisting the database file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Download request failed
    #[error("Download error: {0}")]
    Http(#[from] reqwest::Error),

    /// Download returned a non-success status
    #[error("Download failed with status {status} for {url}")]
    DownloadStatus { status: u16, url: String },

    /// SQLite failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// SQL rejected by the read-only guardrail
    #[error("Rejected SQL: {0}")]
    Guardrail(String),
}
