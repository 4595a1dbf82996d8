//! Shared client state.

use std::sync::Arc;

use feedkit_graphql::{GraphqlTransport, HttpTransport};
use feedkit_persist::{JsonFileStore, KeyValueStore};
use feedkit_query::QueryCache;
use tracing::info;

use crate::Result;
use crate::config::ClientConfig;

/// Everything data access needs: configuration, the query cache, the GraphQL
/// transport and the preference store.
///
/// Cloning is cheap and every clone shares the same cache.
#[derive(Clone)]
pub struct AppContext {
	config: Arc<ClientConfig>,
	cache: QueryCache,
	transport: Arc<dyn GraphqlTransport>,
	preferences: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for AppContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppContext")
			.field("config", &self.config)
			.field("cache", &self.cache)
			.finish_non_exhaustive()
	}
}

impl AppContext {
	/// Assembles a context from explicit collaborators.
	pub fn new(config: ClientConfig, transport: Arc<dyn GraphqlTransport>, preferences: Arc<dyn KeyValueStore>) -> Self {
		let cache = QueryCache::new(&config.cache);
		Self {
			config: Arc::new(config),
			cache,
			transport,
			preferences,
		}
	}

	/// Connects over HTTP and opens the preference file at its default path.
	pub fn connect(config: ClientConfig) -> Result<Self> {
		let transport = HttpTransport::new(&config.transport)?;
		let preferences = JsonFileStore::open_default()?;
		info!(endpoint = %transport.endpoint(), preferences = %preferences.path().display(), "client.connect");
		Ok(Self::new(config, Arc::new(transport), Arc::new(preferences)))
	}

	/// Active configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Shared query cache.
	pub fn cache(&self) -> &QueryCache {
		&self.cache
	}

	/// GraphQL transport.
	pub fn transport(&self) -> &Arc<dyn GraphqlTransport> {
		&self.transport
	}

	/// Preference store.
	pub fn preferences(&self) -> &Arc<dyn KeyValueStore> {
		&self.preferences
	}
}
