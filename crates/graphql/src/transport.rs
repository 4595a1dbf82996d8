//! Transport abstraction.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::request::GraphqlRequest;
use crate::{Error, Result};

/// Executes GraphQL operations against a backend.
///
/// Implementations return the response `data` object. Failures of any kind are
/// reported through [`Error`] and are not retried.
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
	/// Sends one operation and returns its `data`.
	async fn execute(&self, request: GraphqlRequest) -> Result<Value>;
}

/// Sends `document` with `variables` and decodes `data` into `T`.
pub async fn request<T>(transport: &dyn GraphqlTransport, document: &'static str, variables: impl Serialize) -> Result<T>
where
	T: DeserializeOwned,
{
	let request = GraphqlRequest::new(document, variables)?;
	let operation = request.operation_name.unwrap_or("anonymous");
	tracing::trace!(operation, "graphql.request");
	let data = transport.execute(request).await?;
	serde_json::from_value(data).map_err(|e| {
		tracing::debug!(operation, error = %e, "graphql.decode_failed");
		Error::Decode(e)
	})
}
