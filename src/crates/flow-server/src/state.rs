//! Shared application state: the node registry, run store, event bus, and
//! the active-run registry that makes cancel/resume possible.
//!
//! Grounded on the teacher's `AppState` (`api/routes.rs`), generalized from a
//! database-connection-plus-broadcast pair to the set of handles this
//! system's executor actually needs.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use flow_core::{EventBus, GraphExecutor, NodeRegistry};
use flow_store::RunStore;
use flow_toolkit::config::RunSettings;

/// Everything a handler needs to build an executor or manage a run in
/// flight, cloned cheaply (every field is an `Arc`) into each request.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<NodeRegistry>,
    pub store: Arc<dyn RunStore>,
    pub events: Arc<EventBus>,
    pub settings: Arc<RunSettings>,
    pub system_fingerprint: String,
    active_runs: Arc<Mutex<HashMap<String, CancellationToken>>>,
}

impl AppState {
    pub fn new(
        registry: Arc<NodeRegistry>,
        store: Arc<dyn RunStore>,
        events: Arc<EventBus>,
        settings: Arc<RunSettings>,
        system_fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            store,
            events,
            settings,
            system_fingerprint: system_fingerprint.into(),
            active_runs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Build a fresh executor instance for one run. Executors hold no state
    /// across runs, so there is nothing to pool.
    pub fn executor(&self) -> GraphExecutor {
        GraphExecutor::new(
            self.registry.clone(),
            self.store.clone(),
            self.events.clone(),
            self.settings.max_workflow_restarts,
            self.system_fingerprint.clone(),
        )
    }

    /// Register a cancellation handle for a newly started run.
    pub fn register_run(&self, thread_id: impl Into<String>, token: CancellationToken) {
        self.active_runs.lock().insert(thread_id.into(), token);
    }

    /// Remove a run's cancellation handle once it has reached a terminal
    /// state; safe to call even if it was never registered.
    pub fn remove_run(&self, thread_id: &str) {
        self.active_runs.lock().remove(thread_id);
    }

    /// Cancel a run in flight. Returns whether a matching handle was found —
    /// cancelling a thread that isn't running is a no-op, not an error, so
    /// the `/cancel` endpoint can stay idempotent.
    pub fn cancel_run(&self, thread_id: &str) -> bool {
        match self.active_runs.lock().get(thread_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn blank_state() -> AppState {
        AppState::new(
            Arc::new(NodeRegistry::new()),
            Arc::new(flow_store::InMemoryRunStore::new(Duration::from_secs(86_400))),
            Arc::new(EventBus::new(16)),
            Arc::new(RunSettings::default()),
            "test-host",
        )
    }

    #[test]
    fn cancel_unregistered_run_is_a_noop() {
        let state = blank_state();
        assert!(!state.cancel_run("nonexistent"));
    }

    #[test]
    fn registered_run_can_be_cancelled() {
        let state = blank_state();
        let token = CancellationToken::new();
        state.register_run("t1", token.clone());
        assert!(state.cancel_run("t1"));
        assert!(token.is_cancelled());
    }

    #[test]
    fn removed_run_is_no_longer_cancellable() {
        let state = blank_state();
        state.register_run("t1", CancellationToken::new());
        state.remove_run("t1");
        assert!(!state.cancel_run("t1"));
    }
}
