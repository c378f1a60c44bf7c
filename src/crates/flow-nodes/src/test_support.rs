//! Test-only helpers for constructing a [`NodeContext`] without a live run.

use std::collections::HashMap;
use std::sync::Arc;

use flow_core::node::NodeContext;
use flow_core::EventBus;

pub fn blank_ctx(thread_id: &str, node_id: &str) -> NodeContext {
    NodeContext {
        thread_id: thread_id.to_string(),
        node_id: node_id.to_string(),
        sudo_password: None,
        system_fingerprint: "test-host".to_string(),
        events: Arc::new(EventBus::new(16)),
        prior_results: Arc::new(HashMap::new()),
        cancel: tokio_util::sync::CancellationToken::new(),
    }
}
