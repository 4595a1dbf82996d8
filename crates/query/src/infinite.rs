//! Incrementally loaded, cursor-paginated collections.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, trace};

use crate::cache::{CacheEvent, Entry, QueryCache};
use crate::fetcher::PageFetcher;
use crate::key::{QueryKey, ScopeId};
use crate::page::PageRequest;
use crate::projection::Projected;
use crate::result::{FetchActivity, InfiniteData, QueryResult};

/// Caller options for an [`InfiniteQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
	/// Caller intent to fetch. Combined with the presence of a scoping id.
	pub enabled: bool,
}

impl Default for QueryOptions {
	fn default() -> Self {
		Self { enabled: true }
	}
}

/// Result of [`InfiniteQuery::load`] and [`InfiniteQuery::refetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
	/// Disabled or unscoped; nothing was fetched.
	Disabled,
	/// Cached data is fresh; nothing was fetched.
	Fresh,
	/// The first page was fetched.
	Fetched,
	/// Loaded pages were fetched again.
	Refetched,
}

/// Result of [`InfiniteQuery::fetch_next_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchNext {
	/// Disabled or unscoped; nothing was fetched.
	Disabled,
	/// No data was cached yet, so the first page was fetched.
	FetchedFirst,
	/// One more page was appended.
	Fetched,
	/// The last page reports no successor; nothing was fetched.
	Exhausted,
}

/// Read model over one collection.
///
/// The collection is addressed by the fetcher's kind and the scoping id. Data
/// lives in the shared [`QueryCache`], so every query built for the same key
/// sees the same pages, and fetches for one key never overlap. Clones share
/// the enabled flag with each other and with background refetch tasks.
pub struct InfiniteQuery<F> {
	cache: QueryCache,
	fetcher: Arc<F>,
	key: Option<QueryKey>,
	enabled: Arc<AtomicBool>,
}

impl<F> Clone for InfiniteQuery<F> {
	fn clone(&self) -> Self {
		Self {
			cache: self.cache.clone(),
			fetcher: Arc::clone(&self.fetcher),
			key: self.key.clone(),
			enabled: Arc::clone(&self.enabled),
		}
	}
}

impl<F> std::fmt::Debug for InfiniteQuery<F> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("InfiniteQuery")
			.field("key", &self.key)
			.field("enabled", &self.enabled.load(Ordering::Acquire))
			.finish_non_exhaustive()
	}
}

impl<F: PageFetcher> InfiniteQuery<F> {
	/// Builds the read model. Nothing is fetched until [`Self::load`] or
	/// [`Self::fetch_next_page`] is called.
	pub fn new(cache: QueryCache, fetcher: Arc<F>, scope: Option<ScopeId>, options: QueryOptions) -> Self {
		let key = scope.map(|scope| QueryKey::new(fetcher.kind(), scope));
		Self {
			cache,
			fetcher,
			key,
			enabled: Arc::new(AtomicBool::new(options.enabled)),
		}
	}

	/// Cache address, absent without a scoping id.
	pub fn key(&self) -> Option<&QueryKey> {
		self.key.as_ref()
	}

	/// Whether fetching is allowed: enabled by the caller and scoped.
	pub fn is_enabled(&self) -> bool {
		self.active_key().is_some()
	}

	fn active_key(&self) -> Option<&QueryKey> {
		if self.enabled.load(Ordering::Acquire) {
			self.key.as_ref()
		} else {
			None
		}
	}

	/// Updates caller intent.
	///
	/// When this enables a previously disabled query the collection is loaded
	/// and the load outcome is returned; otherwise nothing is fetched. A
	/// running background refetch task observes the change immediately.
	pub async fn set_enabled(&mut self, enabled: bool) -> Result<Option<LoadOutcome>, F::Error> {
		let was_enabled = self.enabled.swap(enabled, Ordering::AcqRel);
		if !was_enabled && self.is_enabled() {
			return self.load().await.map(Some);
		}
		Ok(None)
	}

	/// Ensures data is present and fresh.
	///
	/// Fetches the first page when nothing is cached and refetches the loaded
	/// pages when the cached data is stale.
	pub async fn load(&self) -> Result<LoadOutcome, F::Error> {
		let Some(key) = self.active_key() else {
			return Ok(LoadOutcome::Disabled);
		};
		let entry = self.cache.entry(key);
		let _gate = entry.lock_fetch().await;

		match entry.data::<F::Node>() {
			Some(data) if entry.is_stale() => {
				self.refetch_locked(key, &entry, data.page_count()).await?;
				Ok(LoadOutcome::Refetched)
			}
			Some(_) => Ok(LoadOutcome::Fresh),
			None => {
				self.fetch_first_locked(key, &entry).await?;
				Ok(LoadOutcome::Fetched)
			}
		}
	}

	/// Fetches the page after the last loaded one.
	///
	/// Uses the last page's end cursor. Stale pages are refetched first so the
	/// cursor chain is current. Once a page reports no successor this returns
	/// [`FetchNext::Exhausted`] without contacting the backend.
	pub async fn fetch_next_page(&self) -> Result<FetchNext, F::Error> {
		let Some(key) = self.active_key() else {
			return Ok(FetchNext::Disabled);
		};
		let entry = self.cache.entry(key);
		let _gate = entry.lock_fetch().await;

		// Read after acquiring the gate: a concurrent caller may have appended.
		let Some(mut data) = entry.data::<F::Node>() else {
			self.fetch_first_locked(key, &entry).await?;
			return Ok(FetchNext::FetchedFirst);
		};
		if entry.is_stale() {
			self.refetch_locked(key, &entry, data.page_count()).await?;
			data = entry.data::<F::Node>().unwrap_or(data);
		}
		let Some(request) = data.next_request() else {
			trace!(query.key = %key, query.pages = data.page_count(), "query.fetch_next.exhausted");
			return Ok(FetchNext::Exhausted);
		};

		let ticket = self.cache.begin_fetch(&entry, FetchActivity::FetchingNextPage);
		match self.fetcher.fetch_page(key.scope(), &request).await {
			Ok(page) => {
				ticket.succeed(data.with_page(page));
				Ok(FetchNext::Fetched)
			}
			Err(e) => {
				ticket.fail(&e);
				Err(e)
			}
		}
	}

	/// Fetches every loaded page again, or the first page if none is loaded.
	pub async fn refetch(&self) -> Result<LoadOutcome, F::Error> {
		let Some(key) = self.active_key() else {
			return Ok(LoadOutcome::Disabled);
		};
		let entry = self.cache.entry(key);
		let _gate = entry.lock_fetch().await;

		match entry.data::<F::Node>() {
			Some(data) => {
				self.refetch_locked(key, &entry, data.page_count()).await?;
				Ok(LoadOutcome::Refetched)
			}
			None => {
				self.fetch_first_locked(key, &entry).await?;
				Ok(LoadOutcome::Fetched)
			}
		}
	}

	/// Refetches only if data is loaded and stale.
	async fn refresh_stale(&self) -> Result<LoadOutcome, F::Error> {
		let Some(key) = self.active_key() else {
			return Ok(LoadOutcome::Disabled);
		};
		let entry = self.cache.entry(key);
		let _gate = entry.lock_fetch().await;

		match entry.data::<F::Node>() {
			Some(data) if entry.is_stale() => {
				self.refetch_locked(key, &entry, data.page_count()).await?;
				Ok(LoadOutcome::Refetched)
			}
			_ => Ok(LoadOutcome::Fresh),
		}
	}

	async fn fetch_first_locked(&self, key: &QueryKey, entry: &Arc<Entry>) -> Result<(), F::Error> {
		let ticket = self.cache.begin_fetch(entry, FetchActivity::FetchingFirstPage);
		match self.fetcher.fetch_page(key.scope(), &PageRequest::first()).await {
			Ok(page) => {
				ticket.succeed(InfiniteData::from_pages(vec![Arc::new(page)]));
				Ok(())
			}
			Err(e) => {
				ticket.fail(&e);
				Err(e)
			}
		}
	}

	/// Re-walks the collection from the first page with fresh cursors, up to
	/// `pages` pages. Data is replaced only when every page succeeds.
	async fn refetch_locked(&self, key: &QueryKey, entry: &Arc<Entry>, pages: usize) -> Result<(), F::Error> {
		let ticket = self.cache.begin_fetch(entry, FetchActivity::Refetching);
		let mut fetched = Vec::with_capacity(pages.max(1));
		let mut request = PageRequest::first();
		loop {
			let page = match self.fetcher.fetch_page(key.scope(), &request).await {
				Ok(page) => Arc::new(page),
				Err(e) => {
					ticket.fail(&e);
					return Err(e);
				}
			};
			let next = page.next_request();
			fetched.push(page);
			match next {
				Some(next) if fetched.len() < pages => request = next,
				_ => break,
			}
		}
		ticket.succeed(InfiniteData::from_pages(fetched));
		Ok(())
	}

	/// Status snapshot with the cached pages.
	///
	/// Without a scoping id this is always the idle, empty result.
	pub fn result(&self) -> QueryResult<F::Node> {
		match &self.key {
			Some(key) => self.cache.result(key),
			None => QueryResult::default(),
		}
	}

	/// Flattened nodes of all loaded pages, in fetch order.
	pub fn items(&self) -> Vec<Projected<F::Node>> {
		self.result().data.map(|d| d.project()).unwrap_or_default()
	}

	/// Whether another page can be requested.
	pub fn has_next_page(&self) -> bool {
		self.result().has_next_page()
	}

	/// Refetches in the background whenever this collection is invalidated.
	///
	/// The task stops when the returned guard is dropped; a refetch in flight
	/// at that point is abandoned without touching the cache. Returns `None`
	/// when the query has no scoping id. Must be called within a tokio runtime.
	pub fn spawn_background_refetch(&self) -> Option<RefetchGuard> {
		let key = self.key.clone()?;
		let mut events = self.cache.subscribe();
		let cancel = CancellationToken::new();
		let stop = cancel.clone();
		let query = self.clone();

		let handle = tokio::spawn(async move {
			loop {
				let relevant = tokio::select! {
					biased;
					() = stop.cancelled() => break,
					event = events.recv() => match event {
						Ok(CacheEvent::Invalidated(k)) => k == key,
						Ok(_) => false,
						// Missed events may include ours.
						Err(RecvError::Lagged(_)) => true,
						Err(RecvError::Closed) => break,
					},
				};
				if !relevant {
					continue;
				}

				tokio::select! {
					biased;
					() = stop.cancelled() => break,
					outcome = query.refresh_stale() => match outcome {
						Ok(outcome) => trace!(query.key = %key, ?outcome, "query.background_refetch"),
						Err(e) => debug!(query.key = %key, error = %e, "query.background_refetch.failed"),
					},
				}
			}
		});

		Some(RefetchGuard {
			cancel: cancel.drop_guard(),
			handle,
		})
	}
}

/// Keeps a background refetch task alive. Dropping it stops the task.
#[derive(Debug)]
pub struct RefetchGuard {
	cancel: DropGuard,
	handle: JoinHandle<()>,
}

impl RefetchGuard {
	/// Whether the task has stopped.
	pub fn is_finished(&self) -> bool {
		self.handle.is_finished()
	}

	/// Stops the task and waits for it to exit.
	pub async fn stop(self) {
		let Self { cancel, handle } = self;
		drop(cancel);
		let _ = handle.await;
	}
}
