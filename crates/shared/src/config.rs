//! Client configuration.
//!
//! ```toml
//! page-size = 20
//!
//! [transport]
//! graphql-url = "https://api.daily.dev/graphql"
//! timeout-secs = 30
//!
//! [cache]
//! capacity = 256
//! ```
//!
//! Every key is optional. `FEEDKIT_GRAPHQL_URL` overrides the endpoint.

use std::path::Path;

use feedkit_graphql::TransportConfig;
use feedkit_query::CacheConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{Error, Result};

/// Environment variable overriding [`TransportConfig::graphql_url`].
pub const GRAPHQL_URL_ENV: &str = "FEEDKIT_GRAPHQL_URL";

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Top-level client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
	/// Endpoint and timeout.
	#[serde(default)]
	pub transport: TransportConfig,
	/// Query cache bounds.
	#[serde(default)]
	pub cache: CacheConfig,
	/// Edges requested per page.
	#[serde(default = "default_page_size")]
	pub page_size: u32,
}

fn default_page_size() -> u32 {
	DEFAULT_PAGE_SIZE
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			transport: TransportConfig::default(),
			cache: CacheConfig::default(),
			page_size: default_page_size(),
		}
	}
}

impl ClientConfig {
	/// Parses a TOML document. Environment overrides are not applied.
	pub fn from_toml(source: &str) -> Result<Self> {
		Ok(toml::from_str(source)?)
	}

	/// Reads `path` and applies environment overrides.
	///
	/// A missing file yields the defaults.
	pub fn load(path: &Path) -> Result<Self> {
		let config = match std::fs::read_to_string(path) {
			Ok(source) => Self::from_toml(&source)?,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				debug!(path = %path.display(), "config.missing");
				Self::default()
			}
			Err(error) => {
				return Err(Error::Io {
					path: path.to_path_buf(),
					error,
				});
			}
		};
		config.with_env_overrides()
	}

	/// Applies `FEEDKIT_GRAPHQL_URL` when set.
	pub fn with_env_overrides(self) -> Result<Self> {
		let value = std::env::var(GRAPHQL_URL_ENV).ok();
		self.with_graphql_url(value.as_deref())
	}

	/// Replaces the endpoint with `raw` when it is present and non-empty.
	pub fn with_graphql_url(mut self, raw: Option<&str>) -> Result<Self> {
		let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
			return Ok(self);
		};
		self.transport.graphql_url = Url::parse(raw).map_err(|error| Error::InvalidUrl {
			var: GRAPHQL_URL_ENV,
			error,
		})?;
		debug!(url = %self.transport.graphql_url, "config.graphql_url.override");
		Ok(self)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_document_uses_defaults() {
		let config = ClientConfig::from_toml("").unwrap();
		assert_eq!(config, ClientConfig::default());
		assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
		assert_eq!(config.transport.graphql_url.as_str(), feedkit_graphql::config::DEFAULT_GRAPHQL_URL);
	}

	#[test]
	fn partial_sections_keep_other_defaults() {
		let config = ClientConfig::from_toml(
			r#"
page-size = 5

[transport]
timeout-secs = 3
"#,
		)
		.unwrap();
		assert_eq!(config.page_size, 5);
		assert_eq!(config.transport.timeout_secs, 3);
		assert_eq!(config.transport.graphql_url, TransportConfig::default().graphql_url);
		assert_eq!(config.cache, CacheConfig::default());
	}

	#[test]
	fn wrong_types_are_rejected() {
		let err = ClientConfig::from_toml("page-size = \"many\"").unwrap_err();
		assert!(matches!(err, Error::Parse(_)));
	}

	#[test]
	fn url_override_applies_only_when_set() {
		let base = ClientConfig::default();
		assert_eq!(base.clone().with_graphql_url(None).unwrap(), base);
		assert_eq!(base.clone().with_graphql_url(Some("  ")).unwrap(), base);

		let local = base.clone().with_graphql_url(Some("http://localhost:5000/graphql")).unwrap();
		assert_eq!(local.transport.graphql_url.as_str(), "http://localhost:5000/graphql");

		let err = base.with_graphql_url(Some("not a url")).unwrap_err();
		assert!(matches!(err, Error::InvalidUrl { var: GRAPHQL_URL_ENV, .. }));
	}
}
