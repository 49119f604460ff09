//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and common test scenarios.

use saracendb_core::{Config, Database, InMemoryBackend};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Where a [`TestDatabase`] keeps its bytes.
enum Store {
    Memory(InMemoryBackend),
    File(TempDir),
}

/// A test database with automatic cleanup.
///
/// Reopening reads back whatever the last flush wrote, so a test can check
/// what actually reached storage.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    store: Store,
}

impl TestDatabase {
    /// File name used inside the temporary directory.
    pub const FILE_NAME: &'static str = "test.db";

    /// Creates a new in-memory test database.
    pub fn memory() -> Self {
        let backend = InMemoryBackend::new();
        let db = Database::open_with_backend(Box::new(backend.clone()), Config::default())
            .expect("Failed to open in-memory database");
        Self {
            db,
            store: Store::Memory(backend),
        }
    }

    /// Creates a new file-based test database in a fresh temp directory.
    ///
    /// The file does not exist until the first flush.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = Config::new().sync_on_write(false);
        let db = Database::open_with_config(&temp_dir.path().join(Self::FILE_NAME), config)
            .expect("Failed to open file database");
        Self {
            db,
            store: Store::File(temp_dir),
        }
    }

    /// Returns the database path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        match &self.store {
            Store::Memory(_) => None,
            Store::File(dir) => Some(dir.path().join(Self::FILE_NAME)),
        }
    }

    /// Returns the in-memory backend, if this database has one.
    pub fn backend(&self) -> Option<&InMemoryBackend> {
        match &self.store {
            Store::Memory(backend) => Some(backend),
            Store::File(_) => None,
        }
    }

    /// Returns the bytes last written to storage.
    pub fn stored_bytes(&self) -> Option<Vec<u8>> {
        match &self.store {
            Store::Memory(backend) => backend.data(),
            Store::File(dir) => std::fs::read(dir.path().join(Self::FILE_NAME)).ok(),
        }
    }

    /// Opens a second handle on the same storage.
    ///
    /// Unflushed changes of `self.db` are not visible to it.
    pub fn reopen(&self) -> Database {
        let config = self.db.config().clone();
        let reopened = match &self.store {
            Store::Memory(backend) => Database::open_with_backend(Box::new(backend.clone()), config),
            Store::File(dir) => Database::open_with_config(&dir.path().join(Self::FILE_NAME), config),
        };
        reopened.expect("Failed to reopen database")
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

impl std::ops::DerefMut for TestDatabase {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.db
    }
}

/// Routes database logs to the test harness output.
///
/// The filter comes from `RUST_LOG` and defaults to `debug`. Safe to call
/// from every test; only the first call installs the subscriber.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Runs a test with a temporary in-memory database.
///
/// # Example
///
/// ```rust
/// use saracendb_testkit::with_temp_db;
///
/// let len = with_temp_db(|db| {
///     db.put("name", "alice").unwrap();
///     db.len()
/// });
/// assert_eq!(len, 1);
/// ```
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&mut Database) -> R,
{
    let mut test_db = TestDatabase::memory();
    f(&mut test_db.db)
}

/// Runs a test with a temporary file-based database.
///
/// The closure also receives the store path, which is removed with the
/// temp directory afterwards.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&mut Database, &Path) -> R,
{
    let mut test_db = TestDatabase::file();
    let path = test_db.path().expect("File database should have a path");
    f(&mut test_db.db, &path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a database whose `"default"` collection holds
    /// `{"index": 0}` through `{"index": count - 1}`.
    pub fn populated_database(count: usize) -> TestDatabase {
        let mut test_db = TestDatabase::memory();
        for i in 0..count {
            let index = i64::try_from(i).expect("count fits in i64");
            test_db.put("index", index).expect("Failed to put document");
        }
        test_db
    }

    /// Creates a database with `collection_0` .. `collection_{n-1}`, one
    /// document each, and the default collection selected again.
    pub fn multi_collection_database(collection_count: usize) -> (TestDatabase, Vec<String>) {
        let mut test_db = TestDatabase::memory();
        let mut names = Vec::with_capacity(collection_count);

        for i in 0..collection_count {
            let name = format!("collection_{i}");
            test_db.select_collection(name.as_str());
            test_db
                .put("collection", name.as_str())
                .expect("Failed to put document");
            names.push(name);
        }
        test_db.select_collection(saracendb_core::DEFAULT_COLLECTION);

        (test_db, names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saracendb_core::Value;

    #[test]
    fn test_memory_database() {
        let test_db = TestDatabase::memory();
        assert!(test_db.path().is_none());
        assert!(test_db.backend().is_some());
        assert!(test_db.stored_bytes().is_none());
    }

    #[test]
    fn test_file_database_reopen() {
        init_test_logging();
        let mut test_db = TestDatabase::file();
        test_db.put("name", "alice").unwrap();
        assert!(test_db.reopen().is_empty());

        test_db.flush().unwrap();
        assert!(test_db.path().unwrap().exists());
        let reopened = test_db.reopen();
        assert_eq!(reopened.documents(), test_db.documents());
    }

    #[test]
    fn test_with_temp_db() {
        with_temp_db(|db| {
            db.put("k", 1i64).unwrap();
            assert_eq!(db.get(0).unwrap().value(), &Value::Integer(1));
        });
    }

    #[test]
    fn test_with_file_db() {
        with_file_db(|db, path| {
            assert_eq!(db.path(), Some(path));
            db.flush().unwrap();
            assert!(path.exists());
        });
    }

    #[test]
    fn test_populated_scenario() {
        let test_db = scenarios::populated_database(10);
        assert_eq!(test_db.len(), 10);
        assert_eq!(test_db.get(9).unwrap().value(), &Value::Integer(9));
    }

    #[test]
    fn test_multi_collection_scenario() {
        let (test_db, names) = scenarios::multi_collection_database(3);
        assert_eq!(names.len(), 3);
        assert_eq!(test_db.active_collection(), "default");
        assert_eq!(test_db.collections().len(), 4);
        assert_eq!(test_db.collections().document_count(), 3);
    }
}
