//! Flattening fetched pages into one ordered sequence.

use std::ops::Deref;
use std::sync::Arc;

use crate::page::Page;

/// A node together with the page it was fetched in.
#[derive(Debug, Clone)]
pub struct Projected<N> {
	/// The domain entity.
	pub node: N,
	/// Page the node came from.
	pub page: Arc<Page<N>>,
}

impl<N> Deref for Projected<N> {
	type Target = N;

	fn deref(&self) -> &N {
		&self.node
	}
}

/// Concatenates the nodes of `pages` in fetch order, preserving server order
/// within each page.
pub fn project<N: Clone>(pages: &[Arc<Page<N>>]) -> Vec<Projected<N>> {
	let total = pages.iter().map(|p| p.len()).sum();
	let mut out = Vec::with_capacity(total);
	for page in pages {
		out.extend(page.edges.iter().map(|edge| Projected {
			node: edge.node.clone(),
			page: Arc::clone(page),
		}));
	}
	out
}
