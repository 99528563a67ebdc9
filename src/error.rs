//! Error types for survey ingestion and watchlist management.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the watchlist pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// The survey database could not be opened or queried
    #[error("database error in {path}: {source}")]
    Database {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// One device row did not hold a JSON object. Recovered by the reader.
    #[error("row {row}: cannot decode device JSON ({source}): {preview}...")]
    RecordParse {
        row: usize,
        preview: String,
        #[source]
        source: serde_json::Error,
    },

    /// Nothing usable came out of an input (no rows, or no classifiable devices)
    #[error("no device data in {path}")]
    EmptyInput { path: PathBuf },

    /// None of the search directories holds the host alert config
    #[error("no Kismet configuration directory found (checked: {})", display_paths(.checked))]
    NoTargetDirectory { checked: Vec<PathBuf> },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The write-access precondition for system config failed
    #[error("permission denied writing {path} (re-run with elevated privileges, e.g. sudo)")]
    PermissionDenied { path: PathBuf },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            Error::PermissionDenied { path }
        } else {
            Error::Io { path, source }
        }
    }

    pub(crate) fn database(path: impl Into<PathBuf>, source: rusqlite::Error) -> Self {
        Error::Database {
            path: path.into(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for watchlist operations.
pub type Result<T> = std::result::Result<T, Error>;
