//! Errors raised while configuring and wiring the client.

use std::path::PathBuf;

use thiserror::Error;

/// Client setup errors.
///
/// Data access operations report [`feedkit_graphql::Error`] directly; this
/// type only wraps it where setup and data access meet.
#[derive(Debug, Error)]
pub enum Error {
	/// Reading a configuration file failed.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// File that could not be read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Configuration is not valid TOML or has the wrong shape.
	#[error("invalid configuration: {0}")]
	Parse(#[from] toml::de::Error),

	/// An environment override holds an invalid URL.
	#[error("invalid URL in {var}: {error}")]
	InvalidUrl {
		/// Environment variable that was read.
		var: &'static str,
		/// The parse failure.
		error: url::ParseError,
	},

	/// Building the transport failed.
	#[error(transparent)]
	Transport(#[from] feedkit_graphql::Error),

	/// Opening the preference store failed.
	#[error(transparent)]
	Persist(#[from] feedkit_persist::Error),
}

/// Result type for client setup.
pub type Result<T> = std::result::Result<T, Error>;
