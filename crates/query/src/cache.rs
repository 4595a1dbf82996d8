//! Explicit key/value store of collection data.
//!
//! Every [`QueryKey`] maps to one entry holding the fetched pages (type-erased,
//! since collections differ in node type), the fetch status, and a stale flag.
//!
//! # Invariants
//!
//! - Entries are only written by the fetch that holds the entry's async gate.
//! - Invalidation never deletes data. It sets the stale flag and bumps the
//!   entry epoch; a fetch that started before the bump stores its result as
//!   stale.
//! - Eviction is the only way data disappears besides [`QueryCache::remove`].

use std::any::Any;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use crate::key::QueryKey;
use crate::result::{FetchActivity, InfiniteData, QueryResult, QueryStatus};

/// Entry count used when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 256;

const EVENT_BUFFER: usize = 64;

type Payload = Arc<dyn Any + Send + Sync>;

/// Cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CacheConfig {
	/// Maximum number of collections kept; the least recently used is evicted.
	#[serde(default = "default_capacity")]
	pub capacity: usize,
}

fn default_capacity() -> usize {
	DEFAULT_CAPACITY
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			capacity: default_capacity(),
		}
	}
}

/// Change notification broadcast to [`QueryCache::subscribe`] receivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
	/// New data was stored.
	Updated(QueryKey),
	/// The key was marked stale.
	Invalidated(QueryKey),
	/// The entry was dropped to make room for another.
	Evicted(QueryKey),
	/// The entry was removed explicitly.
	Removed(QueryKey),
}

impl CacheEvent {
	/// Key the event refers to.
	pub fn key(&self) -> &QueryKey {
		match self {
			Self::Updated(k) | Self::Invalidated(k) | Self::Evicted(k) | Self::Removed(k) => k,
		}
	}
}

#[derive(Default)]
struct EntryState {
	data: Option<Payload>,
	status: QueryStatus,
	activity: FetchActivity,
	error: Option<Arc<str>>,
	stale: bool,
	epoch: u64,
	updated_at: Option<Instant>,
}

/// One collection's slot.
pub(crate) struct Entry {
	key: QueryKey,
	state: RwLock<EntryState>,
	gate: tokio::sync::Mutex<()>,
}

impl Entry {
	fn new(key: QueryKey) -> Self {
		Self {
			key,
			state: RwLock::new(EntryState::default()),
			gate: tokio::sync::Mutex::new(()),
		}
	}

	/// Waits until no other fetch for this key is in flight.
	pub(crate) async fn lock_fetch(&self) -> tokio::sync::MutexGuard<'_, ()> {
		self.gate.lock().await
	}

	pub(crate) fn data<N>(&self) -> Option<Arc<InfiniteData<N>>>
	where
		N: Send + Sync + 'static,
	{
		let payload = self.state.read().data.clone()?;
		match payload.downcast::<InfiniteData<N>>() {
			Ok(data) => Some(data),
			Err(_) => {
				warn!(query.key = %self.key, "query.cache.type_mismatch");
				None
			}
		}
	}

	pub(crate) fn is_stale(&self) -> bool {
		self.state.read().stale
	}

	fn mark_stale(&self) {
		let mut state = self.state.write();
		state.stale = true;
		state.epoch = state.epoch.wrapping_add(1);
	}

	fn snapshot<N>(&self) -> QueryResult<N>
	where
		N: Send + Sync + 'static,
	{
		let data = self.data::<N>();
		let state = self.state.read();
		QueryResult {
			status: state.status,
			activity: state.activity,
			is_stale: state.stale,
			error: state.error.clone(),
			data,
			updated_at: state.updated_at,
		}
	}
}

/// Shared handle to the collection store. Clones refer to the same store.
#[derive(Clone)]
pub struct QueryCache {
	inner: Arc<Inner>,
}

struct Inner {
	entries: Mutex<LruCache<QueryKey, Arc<Entry>>>,
	events: broadcast::Sender<CacheEvent>,
}

impl fmt::Debug for QueryCache {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let entries = self.inner.entries.lock();
		f.debug_struct("QueryCache")
			.field("len", &entries.len())
			.field("capacity", &entries.cap())
			.finish_non_exhaustive()
	}
}

impl Default for QueryCache {
	fn default() -> Self {
		Self::new(&CacheConfig::default())
	}
}

impl QueryCache {
	/// Creates an empty cache. A zero capacity is treated as one.
	pub fn new(config: &CacheConfig) -> Self {
		let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
		let (events, _) = broadcast::channel(EVENT_BUFFER);
		Self {
			inner: Arc::new(Inner {
				entries: Mutex::new(LruCache::new(capacity)),
				events,
			}),
		}
	}

	/// Returns the entry for `key`, creating it when absent.
	pub(crate) fn entry(&self, key: &QueryKey) -> Arc<Entry> {
		let mut entries = self.inner.entries.lock();
		if let Some(entry) = entries.get(key) {
			return Arc::clone(entry);
		}

		let entry = Arc::new(Entry::new(key.clone()));
		let evicted = entries.push(key.clone(), Arc::clone(&entry));
		drop(entries);

		if let Some((evicted, _)) = evicted {
			debug!(query.key = %evicted, "query.cache.evict");
			self.emit(CacheEvent::Evicted(evicted));
		}
		entry
	}

	fn peek(&self, key: &QueryKey) -> Option<Arc<Entry>> {
		self.inner.entries.lock().peek(key).cloned()
	}

	/// Marks `key` stale and notifies subscribers.
	///
	/// Idempotent: invalidating an already stale or never fetched key only
	/// repeats the notification. Returns whether an entry existed.
	pub fn invalidate(&self, key: &QueryKey) -> bool {
		let existed = match self.peek(key) {
			Some(entry) => {
				entry.mark_stale();
				true
			}
			None => false,
		};
		debug!(query.key = %key, existed, "query.invalidate");
		self.emit(CacheEvent::Invalidated(key.clone()));
		existed
	}

	/// Whether `key` holds data invalidated since it was fetched.
	pub fn is_stale(&self, key: &QueryKey) -> bool {
		self.peek(key).is_some_and(|e| e.is_stale())
	}

	/// Whether an entry exists for `key`.
	pub fn contains(&self, key: &QueryKey) -> bool {
		self.inner.entries.lock().contains(key)
	}

	/// Drops the entry for `key`. Returns whether it existed.
	pub fn remove(&self, key: &QueryKey) -> bool {
		let removed = self.inner.entries.lock().pop(key).is_some();
		if removed {
			self.emit(CacheEvent::Removed(key.clone()));
		}
		removed
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.inner.entries.lock().len()
	}

	/// Returns true if the cache holds no entries.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Keys from most to least recently used.
	pub fn keys(&self) -> Vec<QueryKey> {
		self.inner.entries.lock().iter().map(|(k, _)| k.clone()).collect()
	}

	/// Subscribes to change notifications.
	pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
		self.inner.events.subscribe()
	}

	/// Fetched pages stored under `key`.
	pub fn data<N>(&self, key: &QueryKey) -> Option<Arc<InfiniteData<N>>>
	where
		N: Send + Sync + 'static,
	{
		self.peek(key)?.data()
	}

	/// Status snapshot for `key`; idle and empty when nothing is cached.
	pub fn result<N>(&self, key: &QueryKey) -> QueryResult<N>
	where
		N: Send + Sync + 'static,
	{
		self.peek(key).map(|e| e.snapshot()).unwrap_or_default()
	}

	/// Marks `entry` as fetching and returns the ticket that records the outcome.
	pub(crate) fn begin_fetch(&self, entry: &Arc<Entry>, activity: FetchActivity) -> FetchTicket {
		let (epoch, was_stale) = {
			let mut state = entry.state.write();
			state.activity = activity;
			if state.data.is_none() {
				state.status = QueryStatus::Loading;
			}
			(state.epoch, state.stale)
		};
		// Appending a page leaves the loaded pages as they were.
		let keep_stale = was_stale && activity == FetchActivity::FetchingNextPage;
		trace!(query.key = %entry.key, activity = activity.as_str(), "query.fetch.begin");
		FetchTicket {
			entry: Arc::clone(entry),
			events: self.inner.events.clone(),
			epoch,
			keep_stale,
			settled: false,
		}
	}

	fn emit(&self, event: CacheEvent) {
		// No receivers is fine.
		let _ = self.inner.events.send(event);
	}
}

/// Outcome recorder for one in-flight fetch.
///
/// Dropping an unsettled ticket (the fetch future was dropped) restores the
/// idle activity without touching data.
pub(crate) struct FetchTicket {
	entry: Arc<Entry>,
	events: broadcast::Sender<CacheEvent>,
	epoch: u64,
	keep_stale: bool,
	settled: bool,
}

impl FetchTicket {
	/// Stores `data`. It stays stale if the key was invalidated meanwhile, or
	/// if an appended page was fetched on top of stale pages.
	pub(crate) fn succeed<N>(mut self, data: InfiniteData<N>)
	where
		N: Send + Sync + 'static,
	{
		let pages = data.page_count();
		let stale = {
			let mut state = self.entry.state.write();
			state.data = Some(Arc::new(data));
			state.status = QueryStatus::Success;
			state.activity = FetchActivity::Idle;
			state.error = None;
			state.stale = self.keep_stale || state.epoch != self.epoch;
			state.updated_at = Some(Instant::now());
			state.stale
		};
		self.settled = true;
		debug!(query.key = %self.entry.key, query.pages = pages, stale, "query.fetch.done");
		let _ = self.events.send(CacheEvent::Updated(self.entry.key.clone()));
	}

	/// Records a failure; existing data is kept.
	pub(crate) fn fail(mut self, error: &(dyn std::error::Error + 'static)) {
		{
			let mut state = self.entry.state.write();
			state.status = QueryStatus::Error;
			state.activity = FetchActivity::Idle;
			state.error = Some(Arc::from(error.to_string()));
		}
		self.settled = true;
		debug!(query.key = %self.entry.key, error = %error, "query.fetch.failed");
	}
}

impl Drop for FetchTicket {
	fn drop(&mut self) {
		if self.settled {
			return;
		}
		let mut state = self.entry.state.write();
		state.activity = FetchActivity::Idle;
		if state.status == QueryStatus::Loading {
			state.status = QueryStatus::Idle;
		}
		trace!(query.key = %self.entry.key, "query.fetch.abandoned");
	}
}
