//! In-memory GraphQL backend for the data access tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use feedkit_graphql::{Error, GraphqlRequest, GraphqlResponse, GraphqlTransport};
use feedkit_persist::MemoryStore;
use feedkit_shared::{AppContext, ClientConfig};
use parking_lot::Mutex;
use serde_json::Value;

/// Replays queued response envelopes in order and records every request.
#[derive(Default)]
pub struct MockTransport {
	responses: Mutex<VecDeque<Value>>,
	seen: Mutex<Vec<GraphqlRequest>>,
}

impl MockTransport {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Queues a full `{ data, errors }` envelope.
	pub fn reply(&self, envelope: Value) -> &Self {
		self.responses.lock().push_back(envelope);
		self
	}

	pub fn requests(&self) -> Vec<GraphqlRequest> {
		self.seen.lock().clone()
	}

	pub fn calls(&self) -> usize {
		self.seen.lock().len()
	}
}

#[async_trait]
impl GraphqlTransport for MockTransport {
	async fn execute(&self, request: GraphqlRequest) -> feedkit_graphql::Result<Value> {
		let operation = request.operation_name;
		self.seen.lock().push(request);
		let envelope = self
			.responses
			.lock()
			.pop_front()
			.unwrap_or_else(|| panic!("no response queued for {operation:?}"));
		serde_json::from_value::<GraphqlResponse>(envelope).map_err(Error::Decode)?.into_data()
	}
}

/// Context over `transport` with an in-memory preference store.
pub fn context(transport: &Arc<MockTransport>, page_size: u32) -> AppContext {
	let config = ClientConfig {
		page_size,
		..ClientConfig::default()
	};
	AppContext::new(config, transport.clone(), Arc::new(MemoryStore::new()))
}

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
