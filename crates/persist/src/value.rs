//! Typed values with defaults over a [`KeyValueStore`].

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::store::KeyValueStore;
use crate::{Error, Result};

/// A typed value persisted under a fixed key.
///
/// Reads fall back to the default when the key was never written or holds a
/// value of the wrong shape.
pub struct PersistentValue<T> {
	store: Arc<dyn KeyValueStore>,
	key: String,
	default: T,
}

impl<T> std::fmt::Debug for PersistentValue<T>
where
	T: std::fmt::Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PersistentValue")
			.field("key", &self.key)
			.field("default", &self.default)
			.finish_non_exhaustive()
	}
}

impl<T> PersistentValue<T>
where
	T: Serialize + DeserializeOwned + Clone,
{
	/// Binds `key` in `store` with a default.
	pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, default: T) -> Self {
		Self {
			store,
			key: key.into(),
			default,
		}
	}

	/// The key this value is stored under.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Reads the current value.
	pub fn get(&self) -> Result<T> {
		let Some(raw) = self.store.get(&self.key)? else {
			return Ok(self.default.clone());
		};
		match serde_json::from_value(raw) {
			Ok(value) => Ok(value),
			Err(e) => {
				warn!(key = %self.key, error = %e, "persist.value.decode_failed");
				Ok(self.default.clone())
			}
		}
	}

	/// Writes a new value.
	pub fn set(&self, value: &T) -> Result<()> {
		let raw = serde_json::to_value(value).map_err(|error| Error::Encode {
			key: self.key.clone(),
			error,
		})?;
		self.store.set(&self.key, raw)
	}

	/// Removes the stored value so reads return the default again.
	pub fn reset(&self) -> Result<()> {
		self.store.remove(&self.key)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::MemoryStore;

	#[test]
	fn reads_default_until_written() {
		let store = Arc::new(MemoryStore::new());
		let value = PersistentValue::new(store.clone(), "FLAG", true);

		assert!(value.get().unwrap());
		value.set(&false).unwrap();
		assert!(!value.get().unwrap());
		assert_eq!(store.get("FLAG").unwrap(), Some(json!(false)));

		value.reset().unwrap();
		assert!(value.get().unwrap());
	}

	#[test]
	fn wrong_shape_falls_back_to_default() {
		let store = Arc::new(MemoryStore::new());
		store.set("FLAG", json!("yes")).unwrap();

		let value = PersistentValue::new(store, "FLAG", true);
		assert!(value.get().unwrap());
	}
}
