//! Cursor pagination vocabulary.
//!
//! Shapes follow the Relay connection layout so they deserialize straight from
//! GraphQL responses: `{ pageInfo { hasNextPage endCursor } edges { node } }`.

use serde::{Deserialize, Serialize};

/// Opaque position marker issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
	/// Wraps a raw cursor value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// The raw cursor value.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

/// Pagination metadata for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
	/// Whether another page follows this one.
	#[serde(default)]
	pub has_next_page: bool,
	/// Cursor of the last edge of this page.
	#[serde(default)]
	pub end_cursor: Option<Cursor>,
}

impl PageInfo {
	/// Cursor to continue from, if continuing is allowed.
	pub fn next_cursor(&self) -> Option<&Cursor> {
		if self.has_next_page { self.end_cursor.as_ref() } else { None }
	}
}

/// A node with its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge<N> {
	/// The domain entity.
	pub node: N,
	/// Position of this edge, when the operation selects it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cursor: Option<Cursor>,
}

impl<N> Edge<N> {
	/// Builds an edge without a cursor.
	pub fn new(node: N) -> Self {
		Self { node, cursor: None }
	}
}

/// One fetched page: ordered edges plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<N> {
	/// Pagination metadata.
	#[serde(default)]
	pub page_info: PageInfo,
	/// Edges in server order.
	#[serde(default = "Vec::new")]
	pub edges: Vec<Edge<N>>,
}

impl<N> Page<N> {
	/// Builds a page from nodes.
	pub fn new(nodes: impl IntoIterator<Item = N>, page_info: PageInfo) -> Self {
		Self {
			page_info,
			edges: nodes.into_iter().map(Edge::new).collect(),
		}
	}

	/// Number of edges.
	pub fn len(&self) -> usize {
		self.edges.len()
	}

	/// Returns true if the page has no edges.
	pub fn is_empty(&self) -> bool {
		self.edges.is_empty()
	}

	/// Request for the page that follows this one.
	///
	/// `None` when the backend reports no next page, or reports one without an
	/// end cursor to continue from.
	pub fn next_request(&self) -> Option<PageRequest> {
		self.page_info.next_cursor().map(|cursor| PageRequest {
			after: Some(cursor.clone()),
		})
	}
}

/// Which page to fetch.
///
/// Only the first page can be requested directly; every other request comes
/// from [`Page::next_request`], so pages cannot be skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
	after: Option<Cursor>,
}

impl PageRequest {
	/// The first page of a collection.
	pub const fn first() -> Self {
		Self { after: None }
	}

	/// Cursor to continue after; `None` for the first page.
	pub fn after(&self) -> Option<&Cursor> {
		self.after.as_ref()
	}

	/// Returns true for the first-page request.
	pub const fn is_first(&self) -> bool {
		self.after.is_none()
	}
}
