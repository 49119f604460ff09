//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Image {
    data: Option<Vec<u8>>,
    fail_writes: bool,
    writes: usize,
    atomic_writes: usize,
}

/// An in-memory storage backend.
///
/// Clones share the same image, so a test can hand one clone to a database,
/// keep another, and reopen the "file" later or inspect what was written.
///
/// # Example
///
/// ```rust
/// use saracendb_storage::{StorageBackend, InMemoryBackend};
///
/// let shared = InMemoryBackend::new();
/// let mut writer = shared.clone();
/// writer.store(b"test data").unwrap();
/// assert_eq!(shared.data().as_deref(), Some(&b"test data"[..]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    image: Arc<Mutex<Image>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with a pre-existing image.
    ///
    /// Useful for testing recovery from damaged stores.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        let backend = Self::default();
        backend.image.lock().data = Some(data);
        backend
    }

    /// Returns a copy of the current image.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.image.lock().data.clone()
    }

    /// Makes every following write fail with an I/O error.
    pub fn fail_writes(&self, fail: bool) {
        self.image.lock().fail_writes = fail;
    }

    /// Number of successful in-place writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.image.lock().writes
    }

    /// Number of successful atomic replaces.
    #[must_use]
    pub fn atomic_write_count(&self) -> usize {
        self.image.lock().atomic_writes
    }

    fn write(&self, data: &[u8], atomic: bool) -> StorageResult<()> {
        let mut image = self.image.lock();
        if image.fail_writes {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "in-memory backend is failing writes",
            )));
        }
        image.data = Some(data.to_vec());
        if atomic {
            image.atomic_writes += 1;
        } else {
            image.writes += 1;
        }
        Ok(())
    }
}

impl StorageBackend for InMemoryBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data())
    }

    fn store(&mut self, data: &[u8]) -> StorageResult<()> {
        self.write(data, false)
    }

    fn store_atomic(&mut self, data: &[u8]) -> StorageResult<()> {
        self.write(data, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_backend_loads_none() {
        let backend = InMemoryBackend::new();
        assert!(backend.load().unwrap().is_none());
        assert!(backend.path().is_none());
    }

    #[test]
    fn with_data_is_loaded() {
        let backend = InMemoryBackend::with_data(vec![1, 2, 3]);
        assert_eq!(backend.load().unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn clones_share_the_image() {
        let observer = InMemoryBackend::new();
        let mut writer = observer.clone();

        writer.store(b"first").unwrap();
        writer.store_atomic(b"second").unwrap();

        assert_eq!(observer.data(), Some(b"second".to_vec()));
        assert_eq!(observer.write_count(), 1);
        assert_eq!(observer.atomic_write_count(), 1);
    }

    #[test]
    fn failed_writes_keep_previous_image() {
        let mut backend = InMemoryBackend::with_data(b"kept".to_vec());
        backend.fail_writes(true);

        assert!(matches!(backend.store(b"lost"), Err(StorageError::Io(_))));
        assert!(backend.store_atomic(b"lost").is_err());
        assert_eq!(backend.data(), Some(b"kept".to_vec()));
        assert_eq!(backend.write_count(), 0);

        backend.fail_writes(false);
        backend.store(b"now").unwrap();
        assert_eq!(backend.data(), Some(b"now".to_vec()));
    }
}
