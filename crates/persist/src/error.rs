//! Error types for preference persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by key/value stores.
#[derive(Debug, Error)]
pub enum Error {
	/// Reading or writing the backing file failed.
	#[error("I/O error on {path}: {error}")]
	Io {
		/// Path of the file being accessed.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The backing file does not hold a JSON object.
	#[error("invalid store contents in {path}: {error}")]
	Corrupt {
		/// Path of the file being parsed.
		path: PathBuf,
		/// The underlying JSON error.
		error: serde_json::Error,
	},

	/// The store contents could not be serialized for writing.
	#[error("failed to serialize store {path}: {error}")]
	Serialize {
		/// Path of the file being written.
		path: PathBuf,
		/// The underlying JSON error.
		error: serde_json::Error,
	},

	/// A value could not be encoded to JSON.
	#[error("failed to encode value for {key}: {error}")]
	Encode {
		/// Key being written.
		key: String,
		/// The underlying JSON error.
		error: serde_json::Error,
	},

	/// Neither a state directory nor a home directory is available.
	#[error("no state directory available for the preference store")]
	MissingStateDir,
}

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, Error>;
