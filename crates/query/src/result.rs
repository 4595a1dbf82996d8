//! Collection data and status snapshots.

use std::sync::Arc;
use std::time::Instant;

use crate::page::{Page, PageRequest};
use crate::projection::{Projected, project};

/// Pages of one collection, in fetch order.
#[derive(Debug)]
pub struct InfiniteData<N> {
	pages: Vec<Arc<Page<N>>>,
}

impl<N> Clone for InfiniteData<N> {
	fn clone(&self) -> Self {
		Self { pages: self.pages.clone() }
	}
}

impl<N> InfiniteData<N> {
	pub(crate) fn from_pages(pages: Vec<Arc<Page<N>>>) -> Self {
		Self { pages }
	}

	/// Returns a copy with `page` appended.
	pub(crate) fn with_page(&self, page: Page<N>) -> Self {
		let mut pages = self.pages.clone();
		pages.push(Arc::new(page));
		Self { pages }
	}

	/// Fetched pages.
	pub fn pages(&self) -> &[Arc<Page<N>>] {
		&self.pages
	}

	/// Number of fetched pages.
	pub fn page_count(&self) -> usize {
		self.pages.len()
	}

	/// Total number of edges across all pages.
	pub fn edge_count(&self) -> usize {
		self.pages.iter().map(|p| p.len()).sum()
	}

	/// Request for the page after the last fetched one.
	pub fn next_request(&self) -> Option<PageRequest> {
		self.pages.last()?.next_request()
	}

	/// Whether the last fetched page allows continuing.
	pub fn has_next_page(&self) -> bool {
		self.next_request().is_some()
	}
}

impl<N: Clone> InfiniteData<N> {
	/// Flattened nodes, see [`project`].
	pub fn project(&self) -> Vec<Projected<N>> {
		project(&self.pages)
	}
}

/// Lifecycle state of a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryStatus {
	/// Nothing fetched and nothing in flight.
	#[default]
	Idle,
	/// First fetch in flight.
	Loading,
	/// Data available.
	Success,
	/// Most recent fetch failed. Earlier data, if any, is kept.
	Error,
}

/// What a collection is currently fetching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchActivity {
	/// No fetch in flight.
	#[default]
	Idle,
	/// Fetching the first page.
	FetchingFirstPage,
	/// Fetching a page after the last one.
	FetchingNextPage,
	/// Re-fetching already loaded pages.
	Refetching,
}

impl FetchActivity {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::FetchingFirstPage => "first_page",
			Self::FetchingNextPage => "next_page",
			Self::Refetching => "refetch",
		}
	}
}

/// Point-in-time view of a collection, for status checks and rendering.
#[derive(Debug)]
pub struct QueryResult<N> {
	/// Lifecycle state.
	pub status: QueryStatus,
	/// Fetch in flight, if any.
	pub activity: FetchActivity,
	/// Whether the data was invalidated since it was fetched.
	pub is_stale: bool,
	/// Message of the most recent failure, cleared by the next success.
	pub error: Option<Arc<str>>,
	/// Fetched pages.
	pub data: Option<Arc<InfiniteData<N>>>,
	/// When data was last stored.
	pub updated_at: Option<Instant>,
}

impl<N> Clone for QueryResult<N> {
	fn clone(&self) -> Self {
		Self {
			status: self.status,
			activity: self.activity,
			is_stale: self.is_stale,
			error: self.error.clone(),
			data: self.data.clone(),
			updated_at: self.updated_at,
		}
	}
}

impl<N> Default for QueryResult<N> {
	fn default() -> Self {
		Self {
			status: QueryStatus::Idle,
			activity: FetchActivity::Idle,
			is_stale: false,
			error: None,
			data: None,
			updated_at: None,
		}
	}
}

impl<N> QueryResult<N> {
	/// First page in flight and nothing to show yet.
	pub fn is_loading(&self) -> bool {
		self.status == QueryStatus::Loading
	}

	/// Any fetch in flight.
	pub fn is_fetching(&self) -> bool {
		self.activity != FetchActivity::Idle
	}

	/// Next-page fetch in flight.
	pub fn is_fetching_next_page(&self) -> bool {
		self.activity == FetchActivity::FetchingNextPage
	}

	/// Most recent fetch failed.
	pub fn is_error(&self) -> bool {
		self.status == QueryStatus::Error
	}

	/// Whether another page can be requested.
	pub fn has_next_page(&self) -> bool {
		self.data.as_ref().is_some_and(|d| d.has_next_page())
	}
}
