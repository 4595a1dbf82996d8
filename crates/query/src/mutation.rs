//! Writes that invalidate the collection they affect.

use async_trait::async_trait;
use tracing::debug;

use crate::cache::QueryCache;
use crate::key::QueryKey;

/// A backend write and the collection it makes stale.
#[async_trait]
pub trait Mutation: Send + Sync {
	/// Domain command, e.g. "set member X's role to moderator".
	type Command: Send + Sync;
	/// Value returned by a successful write.
	type Output: Send;
	/// Failure type, handed back to callers unchanged.
	type Error: std::error::Error + Send + Sync + 'static;

	/// Performs the write.
	async fn execute(&self, command: &Self::Command) -> Result<Self::Output, Self::Error>;

	/// The one collection a successful `command` affects.
	fn invalidates(&self, command: &Self::Command) -> QueryKey;
}

/// Runs a [`Mutation`] and invalidates its key on success.
///
/// The cache is never patched with the write's result; readers pick up the
/// change through the refetch that invalidation triggers. Nothing is retried.
#[derive(Debug, Clone)]
pub struct MutationExecutor<M> {
	cache: QueryCache,
	mutation: M,
}

impl<M: Mutation> MutationExecutor<M> {
	/// Binds `mutation` to `cache`.
	pub fn new(cache: QueryCache, mutation: M) -> Self {
		Self { cache, mutation }
	}

	/// The wrapped mutation.
	pub fn mutation(&self) -> &M {
		&self.mutation
	}

	/// Executes `command`. On success exactly one key is invalidated; on
	/// failure the cache is left untouched and the error is returned as-is.
	pub async fn mutate(&self, command: M::Command) -> Result<M::Output, M::Error> {
		let key = self.mutation.invalidates(&command);
		match self.mutation.execute(&command).await {
			Ok(output) => {
				self.cache.invalidate(&key);
				Ok(output)
			}
			Err(e) => {
				debug!(query.key = %key, error = %e, "mutation.failed");
				Err(e)
			}
		}
	}
}
