//! Database configuration.

use saracendb_storage::DEFAULT_TEMP_SUFFIX;

/// Name of the collection selected when none is configured.
pub const DEFAULT_COLLECTION: &str = "default";

/// Configuration for opening a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Collection selected at open time. It always exists after open.
    pub collection: String,

    /// Whether to fsync the file (and, on compaction, its directory) after
    /// every write.
    pub sync_on_write: bool,

    /// Whether to create missing parent directories on the first write.
    pub create_dirs: bool,

    /// Suffix appended to the store path to name the compaction temp file.
    pub temp_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            sync_on_write: true,
            create_dirs: false,
            temp_suffix: DEFAULT_TEMP_SUFFIX.to_string(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the collection selected at open time.
    #[must_use]
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = name.into();
        self
    }

    /// Sets whether writes are synced to disk.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets whether parent directories are created on first write.
    #[must_use]
    pub const fn create_dirs(mut self, value: bool) -> Self {
        self.create_dirs = value;
        self
    }

    /// Sets the compaction temp file suffix.
    ///
    /// Must be non-empty and free of path separators, so the temp file sits
    /// beside the store; opening fails otherwise.
    #[must_use]
    pub fn temp_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.temp_suffix = suffix.into();
        self
    }
}
