//! Request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GraphqlErrors;
use crate::{Error, Result};

/// One GraphQL operation ready to be sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
	/// Operation document.
	pub query: &'static str,
	/// Variables object; `null` when the operation takes none.
	pub variables: Value,
	/// Name of the operation to run, taken from the document.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub operation_name: Option<&'static str>,
}

impl GraphqlRequest {
	/// Builds a request, encoding `variables` to JSON.
	pub fn new(query: &'static str, variables: impl Serialize) -> Result<Self> {
		let variables = serde_json::to_value(variables).map_err(Error::Encode)?;
		Ok(Self {
			query,
			variables,
			operation_name: operation_name(query),
		})
	}
}

/// Extracts the first operation name from a document.
///
/// Returns `None` for anonymous operations and shorthand `{ ... }` queries.
pub fn operation_name(document: &str) -> Option<&str> {
	let document = document.trim_start();
	let rest = ["query", "mutation", "subscription"].iter().find_map(|kw| document.strip_prefix(kw))?.trim_start();
	let end = rest.find(|c: char| !(c.is_alphanumeric() || c == '_')).unwrap_or(rest.len());
	(end > 0).then(|| &rest[..end])
}

/// Raw response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphqlResponse {
	/// The `data` object, absent on request-level failures.
	#[serde(default)]
	pub data: Option<Value>,
	/// Errors reported by the server.
	#[serde(default)]
	pub errors: Vec<GraphqlErrorEntry>,
}

impl GraphqlResponse {
	/// Returns `data`, or the reported errors when any are present.
	///
	/// Partial data alongside errors is treated as a failure.
	pub fn into_data(self) -> Result<Value> {
		if !self.errors.is_empty() {
			return Err(Error::Graphql(GraphqlErrors(self.errors)));
		}
		match self.data {
			Some(Value::Null) | None => Err(Error::MissingData),
			Some(data) => Ok(data),
		}
	}
}

/// One entry of a response's `errors` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphqlErrorEntry {
	/// Human readable message.
	pub message: String,
	/// Response path the error is attached to.
	#[serde(default)]
	pub path: Vec<Value>,
	/// Server-specific metadata.
	#[serde(default)]
	pub extensions: Option<Value>,
}

impl GraphqlErrorEntry {
	/// The `extensions.code` value, when present.
	pub fn code(&self) -> Option<&str> {
		self.extensions.as_ref()?.get("code")?.as_str()
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn operation_names() {
		assert_eq!(operation_name("query SourceMembers($id: ID!) { x }"), Some("SourceMembers"));
		assert_eq!(operation_name("\n  mutation UpdateUserAlerts($data: X!) {"), Some("UpdateUserAlerts"));
		assert_eq!(operation_name("query{ me { id } }"), None);
		assert_eq!(operation_name("{ me { id } }"), None);
	}

	#[test]
	fn request_serializes_camel_case() {
		let req = GraphqlRequest::new("query Me { me { id } }", json!({ "id": "1" })).unwrap();
		assert_eq!(
			serde_json::to_value(&req).unwrap(),
			json!({
				"query": "query Me { me { id } }",
				"variables": { "id": "1" },
				"operationName": "Me",
			})
		);
	}

	#[test]
	fn errors_take_precedence_over_data() {
		let resp: GraphqlResponse = serde_json::from_value(json!({
			"data": { "updateMemberRole": null },
			"errors": [{ "message": "Forbidden", "extensions": { "code": "FORBIDDEN" } }],
		}))
		.unwrap();

		let Err(Error::Graphql(errors)) = resp.into_data() else {
			panic!("expected graphql error");
		};
		assert_eq!(errors.first_message(), Some("Forbidden"));
		assert_eq!(errors.code(), Some("FORBIDDEN"));
		assert_eq!(errors.to_string(), "graphql error: Forbidden");
	}

	#[test]
	fn null_data_is_missing() {
		let resp: GraphqlResponse = serde_json::from_value(json!({ "data": null })).unwrap();
		assert!(matches!(resp.into_data(), Err(Error::MissingData)));
	}
}
