use async_trait::async_trait;

use crate::key::{QueryKind, ScopeId};
use crate::page::{Page, PageRequest};

/// Loads one page of a collection from the backend.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
	/// Domain entity carried by each edge.
	type Node: Clone + Send + Sync + 'static;
	/// Failure type, handed back to callers unchanged.
	type Error: std::error::Error + Send + Sync + 'static;

	/// Collection kind this fetcher serves.
	fn kind(&self) -> QueryKind;

	/// Fetches the page described by `request` for `scope`.
	async fn fetch_page(&self, scope: &ScopeId, request: &PageRequest) -> Result<Page<Self::Node>, Self::Error>;
}
