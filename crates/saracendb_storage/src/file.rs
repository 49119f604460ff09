//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Suffix appended to the store path to name the compaction temp file.
pub const DEFAULT_TEMP_SUFFIX: &str = ".tmp";

/// A file-based storage backend.
///
/// The image lives in a single file. Nothing touches the disk until the
/// first write, so opening a path that does not exist is free.
///
/// # Durability
///
/// - `store()` truncates and rewrites the file in place
/// - `store_atomic()` writes `<path><suffix>` next to the file, then renames
///   it over the target
/// - with `sync` enabled both modes call `File::sync_all()`, and the atomic
///   replace also syncs the parent directory so the rename survives a crash
///
/// # Example
///
/// ```no_run
/// use saracendb_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::new(Path::new("data.db"));
/// backend.store_atomic(b"persistent data").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    temp_path: PathBuf,
    sync: bool,
    create_dirs: bool,
}

impl FileBackend {
    /// Creates a backend for the file at `path`.
    ///
    /// Syncing is enabled and parent directories are not created.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            temp_path: Self::temp_path_for(path, DEFAULT_TEMP_SUFFIX),
            sync: true,
            create_dirs: false,
        }
    }

    /// Sets whether writes are synced to disk before returning.
    #[must_use]
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Sets whether missing parent directories are created on write.
    #[must_use]
    pub fn with_create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }

    /// Sets the suffix used to name the temporary file of an atomic replace.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTempSuffix` if `suffix` is empty, which would make the
    /// temp file the target itself, or contains a path separator, which
    /// would move it out of the target's directory.
    pub fn with_temp_suffix(mut self, suffix: &str) -> StorageResult<Self> {
        if suffix.is_empty() || suffix.chars().any(std::path::is_separator) {
            return Err(StorageError::InvalidTempSuffix {
                suffix: suffix.to_string(),
            });
        }
        self.temp_path = Self::temp_path_for(&self.path, suffix);
        Ok(self)
    }

    /// Returns the path of the temporary file used by `store_atomic`.
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    fn temp_path_for(path: &Path, suffix: &str) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    fn prepare_parent(&self) -> StorageResult<()> {
        if !self.create_dirs {
            return Ok(());
        }
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let mut file = File::create(path)?;
        file.write_all(data)?;
        file.flush()?;
        if self.sync {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Syncs the parent directory so a rename inside it is durable.
    ///
    /// Windows NTFS journals metadata updates and has no directory fsync,
    /// so this is a no-op there.
    #[cfg(unix)]
    fn sync_parent(&self) -> StorageResult<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        File::open(parent)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_parent(&self) -> StorageResult<()> {
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&mut self, data: &[u8]) -> StorageResult<()> {
        self.prepare_parent()?;
        self.write_file(&self.path, data)
    }

    fn store_atomic(&mut self, data: &[u8]) -> StorageResult<()> {
        self.prepare_parent()?;

        if let Err(e) = self.write_file(&self.temp_path, data) {
            let _ = fs::remove_file(&self.temp_path);
            return Err(e);
        }

        if let Err(source) = fs::rename(&self.temp_path, &self.path) {
            let _ = fs::remove_file(&self.temp_path);
            return Err(StorageError::Replace {
                temp: self.temp_path.clone(),
                target: self.path.clone(),
                source,
            });
        }

        if self.sync {
            self.sync_parent()?;
        }
        Ok(())
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
