//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The atomic replace could not move the temporary file into place.
    #[error("failed to replace {target} with {temp}: {source}")]
    Replace {
        /// The temporary file that holds the new image.
        temp: PathBuf,
        /// The file that should have been replaced.
        target: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The temp file suffix would not name a sibling of the target.
    #[error("invalid temp file suffix: {suffix:?}")]
    InvalidTempSuffix {
        /// The rejected suffix.
        suffix: String,
    },
}
