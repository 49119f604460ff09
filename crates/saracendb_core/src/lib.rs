//! # SaracenDB Core
//!
//! A minimal embedded document store. One file holds named collections,
//! each an ordered list of single-field documents, encoded as canonical
//! CBOR.
//!
//! This crate provides:
//! - [`Database`], the handle every operation goes through
//! - Lazy collections selected by name
//! - Positional document access, exact-match queries
//! - Explicit flush, with an atomic compaction after removals
//!
//! ## Example
//!
//! ```rust
//! use saracendb_core::{Database, Value};
//!
//! let mut db = Database::open_in_memory()?;
//! db.put("name", "alice")?;
//! db.put("name", "bob")?;
//!
//! let bobs = db.query("name", &Value::from("bob"));
//! assert_eq!(bobs.len(), 1);
//!
//! db.remove(0)?;
//! assert_eq!(db.get(0)?.value(), &Value::from("bob"));
//! db.flush()?;
//! # Ok::<(), saracendb_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collections;
mod config;
mod database;
mod document;
mod error;

pub use collections::Collections;
pub use config::{Config, DEFAULT_COLLECTION};
pub use database::Database;
pub use document::Document;
pub use error::{CoreError, CoreResult};

pub use saracendb_codec::Value;
pub use saracendb_storage::{FileBackend, InMemoryBackend, StorageBackend, StorageError};
