//! Error types for the store layer.
//!
//! All errors are propagated via [`StoreError`], which carries the path of
//! the file that failed so cycle logs point straight at it.

use std::path::PathBuf;

/// Errors that can occur while reading or writing store files.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading, writing, or creating a store file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A store value could not be serialized.
    #[error("Serialization error for {path}: {source}")]
    Serialization {
        /// The file being written.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
