//! Storage layer
//!
//! A minimal key-value abstraction with two backends:
//!
//! - **MemoryStore**: in-process map, used by tests
//! - **FileStore**: one JSON file per key under the data directory
//!
//! Drafts and branding settings are each a single blob under a single key;
//! there is no partial access.

pub mod backend;
pub mod error;
pub mod file;

pub use backend::{KeyValueStore, MemoryStore};
pub use error::{StorageError, StorageResult};
pub use file::FileStore;
