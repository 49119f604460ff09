//! Storage backend trait definition.

use crate::error::StorageResult;
use std::path::Path;

/// A whole-image storage backend for SaracenDB.
///
/// Backends are **opaque byte stores**. Each one holds at most one image,
/// which is always read and written in full.
///
/// # Invariants
///
/// - `load` returns exactly the bytes of the most recent successful write
/// - `load` returns `None` until the first write
/// - a failed `store_atomic` leaves the previous image intact
///
/// # Implementors
///
/// - [`super::FileBackend`] - For persistent storage
/// - [`super::InMemoryBackend`] - For testing
pub trait StorageBackend: Send {
    /// Reads the stored image.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the image exists but cannot be read.
    fn load(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Overwrites the stored image in place.
    ///
    /// An interruption during this call may leave a partially written image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be opened for writing or written.
    fn store(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Replaces the stored image atomically.
    ///
    /// Readers observe either the old image or the new one, never a mix.
    ///
    /// # Errors
    ///
    /// Returns an error if the new image cannot be written or moved into place.
    fn store_atomic(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Returns the location of the image on disk, if it has one.
    fn path(&self) -> Option<&Path> {
        None
    }
}
