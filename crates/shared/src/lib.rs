//! Feed client data access: squads, notifications and user alerts.
//!
//! Everything here runs on the shared [`QueryCache`](feedkit_query::QueryCache)
//! held by an [`AppContext`]. Collections are loaded through
//! [`InfiniteQuery`](feedkit_query::InfiniteQuery) and writes go through
//! [`MutationExecutor`](feedkit_query::MutationExecutor), so a successful
//! write marks exactly one collection stale.
//!
//! Transport errors are [`feedkit_graphql::Error`] and reach callers
//! unchanged. Missing ids disable loading instead of failing.

#![warn(missing_docs)]

#[macro_use]
mod wire;

pub mod alerts;
pub mod comment;
pub mod config;
pub mod context;
pub mod error;
pub mod notifications;
pub mod squads;
pub mod views;

pub use config::ClientConfig;
pub use context::AppContext;
pub use error::{Error, Result};
