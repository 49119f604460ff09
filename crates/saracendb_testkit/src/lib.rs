//! # SaracenDB Testkit
//!
//! Test utilities for SaracenDB.
//!
//! This crate provides:
//! - Test fixtures and database helpers
//! - Property-based test generators using proptest
//! - A reference model for checking operation sequences
//!
//! ## Usage
//!
//! ```rust
//! use saracendb_testkit::prelude::*;
//!
//! let mut test_db = TestDatabase::memory();
//! test_db.put("name", "alice").unwrap();
//! test_db.flush().unwrap();
//! assert_eq!(test_db.reopen().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
