//! Database handle: load, mutate, flush and compact.

use crate::collections::Collections;
use crate::config::Config;
use crate::document::Document;
use crate::error::{CoreError, CoreResult};
use saracendb_codec::{Decode, Encode, Value};
use saracendb_storage::{FileBackend, InMemoryBackend, StorageBackend};
use std::path::Path;
use tracing::{debug, warn};

/// The main database handle.
///
/// `Database` owns the whole store in memory. Every document operation
/// targets the *active collection*, a selector held on the handle and
/// changed with [`select_collection`](Self::select_collection).
///
/// Mutations stay in memory until [`flush`](Self::flush). Dropping the
/// handle without flushing discards them.
///
/// # Opening a Database
///
/// ```rust,no_run
/// use saracendb_core::Database;
/// use std::path::Path;
///
/// let mut db = Database::open(Path::new("people.db"))?;
/// db.put("name", "alice")?;
/// db.put("name", "bob")?;
/// assert_eq!(db.query("name", &"bob".into()).len(), 1);
/// db.flush()?;
/// # Ok::<(), saracendb_core::CoreError>(())
/// ```
///
/// # Indices
///
/// Documents are addressed by position. Removing index `i` shifts every
/// later document down by one, so an index is only valid until the next
/// removal in the same collection.
///
/// # Compaction
///
/// Removals set a dirty flag. The next `flush` then finishes with an atomic
/// replace of the file (temp file plus rename) and clears the flag.
pub struct Database {
    /// Configuration.
    config: Config,
    /// Where the encoded store lives.
    backend: Box<dyn StorageBackend>,
    /// Selector for document operations.
    active: String,
    /// Full in-memory state.
    collections: Collections,
    /// Set by removals, cleared by a successful compaction.
    dirty: bool,
}

impl Database {
    /// Opens the store at `path` with the `"default"` collection selected.
    ///
    /// A missing file is not an error; it is created on the first flush.
    ///
    /// # Errors
    ///
    /// Returns `CorruptStore` if the file exists but cannot be decoded, or a
    /// storage error if it cannot be read.
    pub fn open(path: &Path) -> CoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens the store at `path` with custom configuration.
    ///
    /// # Errors
    ///
    /// As [`open`](Self::open), plus a storage error if
    /// `config.temp_suffix` is empty or contains a path separator.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use saracendb_core::{Config, Database};
    /// use std::path::Path;
    ///
    /// let config = Config::new().collection("users").sync_on_write(false);
    /// let db = Database::open_with_config(Path::new("app.db"), config)?;
    /// assert_eq!(db.active_collection(), "users");
    /// # Ok::<(), saracendb_core::CoreError>(())
    /// ```
    pub fn open_with_config(path: &Path, config: Config) -> CoreResult<Self> {
        let backend = FileBackend::new(path)
            .with_sync(config.sync_on_write)
            .with_create_dirs(config.create_dirs)
            .with_temp_suffix(&config.temp_suffix)?;
        Self::open_with_backend(Box::new(backend), config)
    }

    /// Opens an empty store that lives only in memory.
    pub fn open_in_memory() -> CoreResult<Self> {
        Self::open_with_backend(Box::new(InMemoryBackend::new()), Config::default())
    }

    /// Opens a store on an arbitrary backend.
    pub fn open_with_backend(backend: Box<dyn StorageBackend>, config: Config) -> CoreResult<Self> {
        let mut collections = match backend.load()? {
            None => {
                debug!("No store at {:?}, starting empty", backend.path());
                Collections::new()
            }
            Some(bytes) if bytes.is_empty() => {
                warn!("Store at {:?} is empty, starting empty", backend.path());
                Collections::new()
            }
            Some(bytes) => Collections::decode(&bytes).map_err(|e| {
                CoreError::corrupt_store(format!("{e} ({} bytes)", bytes.len()))
            })?,
        };

        collections.materialize(&config.collection);
        debug!(
            "Opened store at {:?}: {} collections, {} documents",
            backend.path(),
            collections.len(),
            collections.document_count()
        );

        Ok(Self {
            active: config.collection.clone(),
            config,
            backend,
            collections,
            dirty: false,
        })
    }

    /// Returns the configuration the database was opened with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the path of the backing file, if the store is file-based.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.backend.path()
    }

    /// Returns the full in-memory state, every collection included.
    #[must_use]
    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    /// Returns true if a removal happened since the last compaction.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    /// Points document operations at the collection `name`.
    ///
    /// Nothing is created or checked. Reads on a collection that was never
    /// written behave as if it were empty; the first `put` creates it.
    pub fn select_collection(&mut self, name: impl Into<String>) {
        self.active = name.into();
    }

    /// Returns the name of the active collection.
    #[must_use]
    pub fn active_collection(&self) -> &str {
        &self.active
    }

    /// Iterates over the names of existing collections.
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.names()
    }

    /// Returns true if a collection called `name` exists.
    #[must_use]
    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains(name)
    }

    /// Removes the active collection and all of its documents.
    ///
    /// The selector keeps pointing at the removed name; later writes
    /// recreate it.
    ///
    /// # Errors
    ///
    /// Returns `CollectionNotFound` if the active collection does not exist.
    /// Nothing changes in that case.
    pub fn remove_collection(&mut self) -> CoreResult<()> {
        match self.collections.remove(&self.active) {
            Some(docs) => {
                debug!(
                    "Removed collection {} ({} documents)",
                    self.active,
                    docs.len()
                );
                self.dirty = true;
                Ok(())
            }
            None => {
                warn!("No collection found for name: {}", self.active);
                Err(CoreError::collection_not_found(&self.active))
            }
        }
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// Returns the documents of the active collection in order.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        self.collections.get(&self.active).unwrap_or(&[])
    }

    /// Number of documents in the active collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents().len()
    }

    /// Returns true if the active collection has no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents().is_empty()
    }

    /// Returns every document of the active collection whose field is
    /// exactly `(key, value)`, in collection order.
    ///
    /// This is a linear scan. Documents with a different key never match.
    ///
    /// Equality is typed, with no numeric coercion: `Integer(1)` does not
    /// match `Float(1.0)`, unlike a dynamic-language `==`. Nested maps
    /// compare after canonical key ordering.
    #[must_use]
    pub fn query(&self, key: &str, value: &Value) -> Vec<&Document> {
        let needle = value.clone().into_canonical();
        self.documents()
            .iter()
            .filter(|doc| doc.matches(key, &needle))
            .collect()
    }

    /// Returns the document at `index` in the active collection.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if there is no such document.
    pub fn get(&self, index: usize) -> CoreResult<&Document> {
        let docs = self.documents();
        docs.get(index)
            .ok_or_else(|| self.out_of_range(index, docs.len()))
    }

    /// Appends `{key: value}` to the active collection, creating the
    /// collection if needed.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the document could not be read back after a
    /// flush: a NaN float, or nesting or sizes beyond the codec limits.
    /// Nothing is inserted in that case.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) -> CoreResult<()> {
        let doc = Document::new(key, value);
        doc.validate()?;
        self.collections.materialize(&self.active).push(doc);
        Ok(())
    }

    /// Replaces the document at `index` with `{key: value}`.
    ///
    /// The old document is replaced whole, not merged.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if there is no document at `index`, or the
    /// codec error [`put`](Self::put) would return. Nothing changes in
    /// either case.
    pub fn put_at(
        &mut self,
        index: usize,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> CoreResult<()> {
        let doc = Document::new(key, value);
        doc.validate()?;

        let len = self.len();
        if index >= len {
            return Err(self.out_of_range(index, len));
        }
        self.collections.materialize(&self.active)[index] = doc;
        Ok(())
    }

    /// Removes and returns the document at `index`, shifting later
    /// documents down by one.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if there is no document at `index`.
    /// Nothing changes in that case.
    pub fn remove(&mut self, index: usize) -> CoreResult<Document> {
        let len = self.len();
        if index >= len {
            return Err(self.out_of_range(index, len));
        }
        let doc = self.collections.materialize(&self.active).remove(index);
        self.dirty = true;
        Ok(doc)
    }

    fn out_of_range(&self, index: usize, len: usize) -> CoreError {
        warn!(
            "No entry found at index: {} in collection: {}",
            index, self.active
        );
        CoreError::index_out_of_range(&self.active, index, len)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Writes the entire store, every collection, to the backing file.
    ///
    /// If anything was removed since the last compaction, the write is
    /// followed by [`compact`](Self::compact).
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be written. The dirty flag
    /// is kept so the next flush compacts again.
    pub fn flush(&mut self) -> CoreResult<()> {
        let bytes = self.collections.encode()?;
        self.backend.store(&bytes)?;
        debug!("Flushed {} bytes to {:?}", bytes.len(), self.backend.path());

        if self.dirty {
            self.replace(&bytes)?;
        }
        Ok(())
    }

    /// Rewrites the backing file through an atomic replace.
    ///
    /// The encoded store goes to a temporary file next to the target, which
    /// is then renamed over it. The encoding is canonical, so compacting an
    /// unchanged store twice yields byte-identical files.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the temporary file cannot be written or
    /// renamed. The previous file is left intact.
    pub fn compact(&mut self) -> CoreResult<()> {
        let bytes = self.collections.encode()?;
        self.replace(&bytes)
    }

    fn replace(&mut self, bytes: &[u8]) -> CoreResult<()> {
        self.backend.store_atomic(bytes)?;
        self.dirty = false;
        debug!("Compacted {:?} to {} bytes", self.backend.path(), bytes.len());
        Ok(())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.backend.path())
            .field("active", &self.active)
            .field("collections", &self.collections.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}
