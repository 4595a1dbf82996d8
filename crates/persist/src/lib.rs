//! Key/value persistence for small client-side preference values.
//!
//! Values are stored as JSON under string keys. Two stores are provided:
//!
//! * [`MemoryStore`]: process-local, used in tests and ephemeral sessions.
//! * [`JsonFileStore`]: one JSON object file, replaced atomically on every write.
//!
//! [`PersistentValue`] layers a typed view with a default over any store.

#![warn(missing_docs)]

pub mod error;
pub mod file;
pub mod store;
pub mod value;

pub use error::{Error, Result};
pub use file::{JsonFileStore, default_store_path};
pub use store::{KeyValueStore, MemoryStore};
pub use value::PersistentValue;
