//! Typed client-side query cache.
//!
//! Collections are addressed by a [`QueryKey`] (a [`QueryKind`] tag plus a
//! [`ScopeId`]) and loaded page by page through a [`PageFetcher`]:
//!
//! * [`InfiniteQuery`]: read model with explicit "fetch next page".
//! * [`MutationExecutor`]: runs a write, then invalidates exactly one key.
//! * [`QueryCache`]: the shared store; invalidation marks data stale without
//!   deleting it, eviction follows an LRU capacity bound.
//!
//! Fetch and mutation errors are returned unchanged; nothing here retries.

#![warn(missing_docs)]

pub mod cache;
mod fetcher;
pub mod infinite;
pub mod key;
pub mod mutation;
pub mod page;
pub mod projection;
pub mod result;

pub use cache::{CacheConfig, CacheEvent, QueryCache};
pub use fetcher::PageFetcher;
pub use infinite::{FetchNext, InfiniteQuery, LoadOutcome, QueryOptions, RefetchGuard};
pub use key::{QueryKey, QueryKind, ScopeId};
pub use mutation::{Mutation, MutationExecutor};
pub use page::{Cursor, Edge, Page, PageInfo, PageRequest};
pub use projection::{Projected, project};
pub use result::{FetchActivity, InfiniteData, QueryResult, QueryStatus};
