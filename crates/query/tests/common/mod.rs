//! Scripted page fetcher shared by the query integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use feedkit_query::{Cursor, Page, PageFetcher, PageInfo, PageRequest, QueryKind, ScopeId};
use parking_lot::Mutex;
use tokio::sync::Notify;

pub const ITEMS: QueryKind = QueryKind::new("items");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item(pub &'static str);

/// Pauses the next fetch until released.
#[derive(Clone, Default)]
pub struct Hold {
	pub entered: Arc<Notify>,
	pub release: Arc<Notify>,
}

/// Serves pages keyed by the cursor they are requested after.
#[derive(Default)]
pub struct ScriptedFetcher {
	pages: Mutex<HashMap<Option<String>, Page<Item>>>,
	requests: Mutex<Vec<(String, Option<String>)>>,
	fail_next: Mutex<Option<&'static str>>,
	hold: Mutex<Option<Hold>>,
}

impl ScriptedFetcher {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Scripts the page served after `after` (`None` = first page). A `next`
	/// cursor means another page follows.
	pub fn page(&self, after: Option<&str>, nodes: &[&'static str], next: Option<&str>) -> &Self {
		let info = PageInfo {
			has_next_page: next.is_some(),
			end_cursor: next.map(Cursor::new),
		};
		let page = Page::new(nodes.iter().map(|&n| Item(n)), info);
		self.pages.lock().insert(after.map(str::to_owned), page);
		self
	}

	/// Drops every scripted page.
	pub fn clear(&self) -> &Self {
		self.pages.lock().clear();
		self
	}

	pub fn fail_next(&self, message: &'static str) {
		*self.fail_next.lock() = Some(message);
	}

	/// Pauses the next fetch; the returned handles observe and release it.
	pub fn hold_next(&self) -> Hold {
		let hold = Hold::default();
		*self.hold.lock() = Some(hold.clone());
		hold
	}

	pub fn calls(&self) -> usize {
		self.requests.lock().len()
	}

	/// Cursors requested so far, in order.
	pub fn cursors(&self) -> Vec<Option<String>> {
		self.requests.lock().iter().map(|(_, after)| after.clone()).collect()
	}

	pub fn scopes(&self) -> Vec<String> {
		self.requests.lock().iter().map(|(scope, _)| scope.clone()).collect()
	}
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
	type Node = Item;
	type Error = std::io::Error;

	fn kind(&self) -> QueryKind {
		ITEMS
	}

	async fn fetch_page(&self, scope: &ScopeId, request: &PageRequest) -> Result<Page<Item>, std::io::Error> {
		let after = request.after().map(|c| c.as_str().to_owned());
		self.requests.lock().push((scope.to_string(), after.clone()));

		let hold = self.hold.lock().take();
		if let Some(hold) = hold {
			hold.entered.notify_one();
			hold.release.notified().await;
		}

		if let Some(message) = self.fail_next.lock().take() {
			return Err(std::io::Error::other(message));
		}
		self.pages
			.lock()
			.get(&after)
			.cloned()
			.ok_or_else(|| std::io::Error::other(format!("no page scripted after {after:?}")))
	}
}

pub fn scope(id: &str) -> Option<ScopeId> {
	ScopeId::new(id)
}

pub fn names(items: &[feedkit_query::Projected<Item>]) -> Vec<&'static str> {
	items.iter().map(|p| p.node.0).collect()
}

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
