//! # SaracenDB Storage
//!
//! Storage backends for SaracenDB.
//!
//! A backend holds one opaque byte image, the whole encoded store. It never
//! interprets the bytes; the core crate owns the format.
//!
//! ## Design Principles
//!
//! - Whole-image reads and writes, no partial access
//! - Two write modes: in place, and atomic replace for compaction
//! - A missing image is not an error, it reads as `None`
//!
//! ## Available Backends
//!
//! - [`FileBackend`] - A single file on disk
//! - [`InMemoryBackend`] - Shared buffer for tests and ephemeral stores
//!
//! ## Example
//!
//! ```rust
//! use saracendb_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! assert!(backend.load().unwrap().is_none());
//!
//! backend.store(b"hello world").unwrap();
//! assert_eq!(backend.load().unwrap().as_deref(), Some(&b"hello world"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::{FileBackend, DEFAULT_TEMP_SUFFIX};
pub use memory::InMemoryBackend;
