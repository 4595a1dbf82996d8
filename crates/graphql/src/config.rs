//! Transport configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Endpoint used when nothing else is configured.
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.daily.dev/graphql";

/// Settings for [`HttpTransport`](crate::HttpTransport).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransportConfig {
	/// GraphQL endpoint.
	#[serde(default = "default_graphql_url")]
	pub graphql_url: Url,
	/// Per-request timeout in seconds.
	#[serde(default = "default_timeout")]
	pub timeout_secs: u64,
}

fn default_graphql_url() -> Url {
	Url::parse(DEFAULT_GRAPHQL_URL).expect("default GraphQL URL is valid")
}

/// Returns the default request timeout in seconds.
fn default_timeout() -> u64 {
	30
}

impl Default for TransportConfig {
	fn default() -> Self {
		Self {
			graphql_url: default_graphql_url(),
			timeout_secs: default_timeout(),
		}
	}
}

impl TransportConfig {
	/// Per-request timeout.
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}
}
