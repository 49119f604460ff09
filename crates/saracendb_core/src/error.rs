//! Error types for SaracenDB core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in SaracenDB core operations.
///
/// [`IndexOutOfRange`](CoreError::IndexOutOfRange) and
/// [`CollectionNotFound`](CoreError::CollectionNotFound) are soft: the
/// operation left the database untouched and a caller running a batch can
/// carry on. Everything else means the store cannot be read or written.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] saracendb_storage::StorageError),

    /// CBOR codec error.
    #[error("codec error: {0}")]
    Codec(#[from] saracendb_codec::CodecError),

    /// The store file exists but does not hold a valid store.
    #[error("corrupt store: {message}")]
    CorruptStore {
        /// Description of the corruption.
        message: String,
    },

    /// No document at the requested position.
    #[error("no document at index {index} in collection {collection} (length {len})")]
    IndexOutOfRange {
        /// The collection searched.
        collection: String,
        /// The requested index.
        index: usize,
        /// Length of the collection at the time of the call.
        len: usize,
    },

    /// Collection not found.
    #[error("collection not found: {name}")]
    CollectionNotFound {
        /// Name of the collection.
        name: String,
    },
}

impl CoreError {
    /// Creates a corrupt store error.
    pub fn corrupt_store(message: impl Into<String>) -> Self {
        Self::CorruptStore {
            message: message.into(),
        }
    }

    /// Creates an index out of range error.
    pub fn index_out_of_range(collection: impl Into<String>, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            collection: collection.into(),
            index,
            len,
        }
    }

    /// Creates a collection not found error.
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::CollectionNotFound { name: name.into() }
    }

    /// Returns true if the failed operation left the database unchanged and
    /// the caller may continue with further operations.
    #[must_use]
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfRange { .. } | Self::CollectionNotFound { .. }
        )
    }
}
