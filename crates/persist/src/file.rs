//! JSON file backed store.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::store::KeyValueStore;
use crate::{Error, Result};

const STORE_FILE: &str = "preferences.json";

/// Returns the default preference file under the user state directory.
///
/// # Resolution Order
///
/// 1. `FEEDKIT_PREFERENCES` environment variable.
/// 2. `$XDG_STATE_HOME/feedkit/preferences.json` (or the platform equivalent).
/// 3. `~/.local/state/feedkit/preferences.json`.
pub fn default_store_path() -> Result<PathBuf> {
	if let Ok(p) = std::env::var("FEEDKIT_PREFERENCES") {
		return Ok(PathBuf::from(p));
	}

	let state_dir = dirs::state_dir()
		.or_else(|| dirs::home_dir().map(|home| home.join(".local/state")))
		.ok_or(Error::MissingStateDir)?;
	Ok(state_dir.join("feedkit").join(STORE_FILE))
}

/// Store holding every key in a single JSON object file.
///
/// The whole object is kept in memory and the file is rewritten through a
/// sibling temp file and a rename, so readers never observe a torn write.
#[derive(Debug)]
pub struct JsonFileStore {
	path: PathBuf,
	values: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
	/// Opens the store at `path`. A missing or empty file yields an empty store.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
		let path = path.into();
		let values = match std::fs::read(&path) {
			Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Map::new(),
			Ok(bytes) => serde_json::from_slice(&bytes).map_err(|error| Error::Corrupt { path: path.clone(), error })?,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
			Err(error) => return Err(Error::Io { path, error }),
		};
		debug!(path = %path.display(), keys = values.len(), "persist.open");
		Ok(Self {
			path,
			values: Mutex::new(values),
		})
	}

	/// Opens the store at [`default_store_path`].
	pub fn open_default() -> Result<Self> {
		Self::open(default_store_path()?)
	}

	/// Path of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn flush(&self, values: &Map<String, Value>) -> Result<()> {
		let io_err = |error| Error::Io {
			path: self.path.clone(),
			error,
		};

		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent).map_err(io_err)?;
		}

		let bytes = encode(&self.path, values)?;
		let tmp = self.path.with_extension("json.tmp");
		std::fs::write(&tmp, bytes).map_err(io_err)?;
		std::fs::rename(&tmp, &self.path).map_err(io_err)?;
		trace!(path = %self.path.display(), keys = values.len(), "persist.flush");
		Ok(())
	}
}

fn encode<T: serde::Serialize + ?Sized>(path: &Path, values: &T) -> Result<Vec<u8>> {
	serde_json::to_vec_pretty(values).map_err(|error| Error::Serialize {
		path: path.to_path_buf(),
		error,
	})
}

impl KeyValueStore for JsonFileStore {
	fn get(&self, key: &str) -> Result<Option<Value>> {
		Ok(self.values.lock().get(key).cloned())
	}

	fn set(&self, key: &str, value: Value) -> Result<()> {
		let mut values = self.values.lock();
		let previous = values.insert(key.to_owned(), value);
		if let Err(e) = self.flush(&values) {
			match previous {
				Some(previous) => values.insert(key.to_owned(), previous),
				None => values.remove(key),
			};
			return Err(e);
		}
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<()> {
		let mut values = self.values.lock();
		let Some(previous) = values.remove(key) else {
			return Ok(());
		};
		if let Err(e) = self.flush(&values) {
			values.insert(key.to_owned(), previous);
			return Err(e);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Unserializable;

	impl serde::Serialize for Unserializable {
		fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
			Err(serde::ser::Error::custom("not representable"))
		}
	}

	#[test]
	fn serialization_failure_is_not_reported_as_corruption() {
		let err = encode(Path::new("prefs.json"), &Unserializable).unwrap_err();
		assert!(matches!(&err, Error::Serialize { path, .. } if path == Path::new("prefs.json")));
		assert_eq!(
			err.to_string(),
			"failed to serialize store prefs.json: not representable"
		);
	}
}
