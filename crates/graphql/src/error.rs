//! Transport error types.

use std::fmt;

use thiserror::Error;

use crate::request::GraphqlErrorEntry;

/// Errors produced while executing a GraphQL operation.
#[derive(Debug, Error)]
pub enum Error {
	/// The HTTP request could not be sent or its body could not be read.
	#[error("http error: {0}")]
	Http(#[from] reqwest::Error),

	/// The server answered with a non-success status.
	#[error("unexpected status {status}: {body}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body, possibly empty.
		body: String,
	},

	/// The server returned a non-empty `errors` array.
	#[error("{0}")]
	Graphql(GraphqlErrors),

	/// The response carried neither `data` nor `errors`.
	#[error("response contained no data")]
	MissingData,

	/// Variables could not be encoded.
	#[error("failed to encode variables: {0}")]
	Encode(serde_json::Error),

	/// `data` did not match the expected response shape.
	#[error("failed to decode response: {0}")]
	Decode(serde_json::Error),

	/// Invalid transport configuration.
	#[error("invalid transport configuration: {0}")]
	Config(String),
}

/// Non-empty list of GraphQL errors from one response.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphqlErrors(pub Vec<GraphqlErrorEntry>);

impl GraphqlErrors {
	/// Returns the first error's message.
	pub fn first_message(&self) -> Option<&str> {
		self.0.first().map(|e| e.message.as_str())
	}

	/// Returns the first `extensions.code`, when present.
	pub fn code(&self) -> Option<&str> {
		self.0.iter().find_map(GraphqlErrorEntry::code)
	}
}

impl fmt::Display for GraphqlErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("graphql error")?;
		for (i, entry) in self.0.iter().enumerate() {
			f.write_str(if i == 0 { ": " } else { "; " })?;
			f.write_str(&entry.message)?;
		}
		Ok(())
	}
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, Error>;
