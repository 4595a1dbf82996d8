//! HTTP transport backed by `reqwest`.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use crate::config::TransportConfig;
use crate::request::{GraphqlRequest, GraphqlResponse};
use crate::transport::GraphqlTransport;
use crate::{Error, Result};

/// Sends operations as JSON `POST` requests to a single endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: Client,
	endpoint: Url,
}

impl HttpTransport {
	/// Builds a transport from configuration.
	pub fn new(config: &TransportConfig) -> Result<Self> {
		if !matches!(config.graphql_url.scheme(), "http" | "https") {
			return Err(Error::Config(format!("unsupported scheme in {}", config.graphql_url)));
		}
		let client = Client::builder().timeout(config.timeout()).build()?;
		Ok(Self::with_client(client, config.graphql_url.clone()))
	}

	/// Wraps an existing client, for sharing connection pools and cookies.
	pub fn with_client(client: Client, endpoint: Url) -> Self {
		Self { client, endpoint }
	}

	/// Configured endpoint.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}
}

#[async_trait]
impl GraphqlTransport for HttpTransport {
	async fn execute(&self, request: GraphqlRequest) -> Result<Value> {
		let operation = request.operation_name.unwrap_or("anonymous");
		tracing::debug!(operation, endpoint = %self.endpoint, "graphql.http.send");

		let response = self
			.client
			.post(self.endpoint.clone())
			.header(CONTENT_TYPE, "application/json")
			.header(ACCEPT, "application/json")
			.json(&request)
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			// Servers commonly answer 400 with a regular `errors` envelope.
			if let Ok(envelope) = serde_json::from_str::<GraphqlResponse>(&body)
				&& !envelope.errors.is_empty()
			{
				return envelope.into_data();
			}
			tracing::warn!(operation, status = status.as_u16(), "graphql.http.status");
			return Err(Error::Status {
				status: status.as_u16(),
				body,
			});
		}

		let envelope: GraphqlResponse = response.json().await?;
		envelope.into_data()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_non_http_endpoints() {
		let config = TransportConfig {
			graphql_url: Url::parse("ftp://example.com/graphql").unwrap(),
			..TransportConfig::default()
		};
		assert!(matches!(HttpTransport::new(&config), Err(Error::Config(_))));
	}

	#[test]
	fn builds_from_default_config() {
		let transport = HttpTransport::new(&TransportConfig::default()).unwrap();
		assert_eq!(transport.endpoint().as_str(), "https://api.daily.dev/graphql");
	}
}
