//! Store abstraction and the in-memory implementation.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use crate::Result;

/// A string-keyed store of JSON values that outlives a single view.
///
/// Implementations must be cheap to call from synchronous code: writes happen
/// from drop handlers.
pub trait KeyValueStore: Send + Sync {
	/// Returns the stored value, or `None` when the key was never written.
	fn get(&self, key: &str) -> Result<Option<Value>>;

	/// Stores a value, replacing any previous one.
	fn set(&self, key: &str, value: Value) -> Result<()>;

	/// Removes a value. Removing a missing key is not an error.
	fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
	values: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of stored keys.
	pub fn len(&self) -> usize {
		self.values.read().len()
	}

	/// Returns true if nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.values.read().is_empty()
	}
}

impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<Value>> {
		Ok(self.values.read().get(key).cloned())
	}

	fn set(&self, key: &str, value: Value) -> Result<()> {
		self.values.write().insert(key.to_owned(), value);
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.values.write().remove(key);
		Ok(())
	}
}
