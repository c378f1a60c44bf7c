//! Extensible run-store trait for custom backend implementations
//!
//! This module defines **[`RunStore`]** — the abstraction the executor uses to persist
//! workflow definitions, per-run node results, and ReAct agent memory. It exists so the
//! in-memory implementation shipped in [`crate::memory`] can later be swapped for a
//! networked document store (Postgres, Redis, MongoDB, ...) without the executor caring
//! which backend is behind it.
//!
//! # Three Collections
//!
//! - **workflows** — graph definitions, queried by `id`.
//! - **runs** — one document per `thread_id`, whose `results` map `node_id -> NodeResult`.
//! - **memories** — ReAct agent context, keyed by `(thread_id, node_id)`, with a TTL on
//!   the `last_updated` field.
//!
//! # Write semantics
//!
//! Writes issued by the executor during a live run are fire-and-forget: the executor
//! does not await store success before proceeding to the next node, and a store error
//! must never abort execution. Implementations should log and swallow write failures
//! rather than propagate them onto the hot path — the trait still returns a `Result`
//! so callers that *do* care (e.g. the HTTP surface's `POST /workflows`) can observe it.
//!
//! # Resume semantics
//!
//! [`RunStore::read_run`] returns every recorded result for a thread, but the executor's
//! resume path only trusts entries whose [`StoredStatus::is_resumable`] is true — a
//! previously failed node is deliberately retried rather than replayed.
//!
//! # Example: custom backend
//!
//! ```rust,ignore
//! use flow_store::{RunStore, WorkflowRecord, NodeResult, MemoryRecord};
//! use async_trait::async_trait;
//!
//! struct PostgresRunStore {
//!     pool: sqlx::PgPool,
//! }
//!
//! #[async_trait]
//! impl RunStore for PostgresRunStore {
//!     async fn put_workflow(&self, record: WorkflowRecord) -> flow_store::Result<()> {
//!         // INSERT ... ON CONFLICT (id) DO UPDATE ...
//!         Ok(())
//!     }
//!     // ... remaining methods ...
//! #   async fn get_workflow(&self, _id: &str) -> flow_store::Result<Option<WorkflowRecord>> { unimplemented!() }
//! #   async fn list_workflows(&self) -> flow_store::Result<Vec<flow_store::WorkflowSummary>> { unimplemented!() }
//! #   async fn delete_workflow(&self, _id: &str) -> flow_store::Result<bool> { unimplemented!() }
//! #   async fn put_node_result(&self, _thread_id: &str, _node_id: &str, _result: NodeResult) -> flow_store::Result<()> { unimplemented!() }
//! #   async fn read_run(&self, _thread_id: &str) -> flow_store::Result<Option<flow_store::RunRecord>> { unimplemented!() }
//! #   async fn read_memory(&self, _thread_id: &str, _node_id: &str, _limit: usize) -> flow_store::Result<Vec<serde_json::Value>> { unimplemented!() }
//! #   async fn append_memory(&self, _thread_id: &str, _node_id: &str, _entry: serde_json::Value) -> flow_store::Result<()> { unimplemented!() }
//! }
//! ```

use crate::error::Result;
use crate::record::{MemoryRecord, NodeResult, RunRecord, WorkflowRecord, WorkflowSummary};
use async_trait::async_trait;
use serde_json::Value;

/// Core trait implemented by every run-store backend.
///
/// All methods are `Send + Sync` and take `&self`, so a backend wraps its own
/// interior mutability (a `RwLock`-guarded map for the in-memory case, a
/// connection pool for a networked one).
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Insert a new workflow or overwrite the existing one with the same `id`.
    async fn put_workflow(&self, record: WorkflowRecord) -> Result<()>;

    /// Fetch a single workflow by id.
    async fn get_workflow(&self, id: &str) -> Result<Option<WorkflowRecord>>;

    /// List every stored workflow as a lightweight summary.
    async fn list_workflows(&self) -> Result<Vec<WorkflowSummary>>;

    /// Remove a workflow by id. Returns whether anything was deleted.
    async fn delete_workflow(&self, id: &str) -> Result<bool>;

    /// Record one node's result for a run. Fire-and-forget from the executor's
    /// point of view: callers on the hot path should not treat an `Err` here
    /// as fatal to the run itself.
    async fn put_node_result(&self, thread_id: &str, node_id: &str, result: NodeResult)
        -> Result<()>;

    /// Read back everything recorded for a run, for resume or inspection.
    async fn read_run(&self, thread_id: &str) -> Result<Option<RunRecord>>;

    /// Read the most recent `limit` memory entries for a `(thread_id, node_id)`
    /// pair, oldest first. Entries past the store's configured TTL are treated
    /// as absent. Returns an empty vec, never an error, when nothing is stored.
    async fn read_memory(&self, thread_id: &str, node_id: &str, limit: usize) -> Result<Vec<Value>>;

    /// Append one entry to a `(thread_id, node_id)` memory slice, refreshing
    /// its `last_updated` timestamp.
    async fn append_memory(&self, thread_id: &str, node_id: &str, entry: Value) -> Result<()>;
}

/// Test-only helper so implementors' unit tests can construct a bare record
/// without reaching into [`crate::record`] directly.
#[cfg(test)]
pub(crate) fn sample_memory_record(thread_id: &str, node_id: &str) -> MemoryRecord {
    MemoryRecord {
        thread_id: thread_id.to_string(),
        node_id: node_id.to_string(),
        entries: Vec::new(),
        last_updated: std::time::SystemTime::now(),
    }
}
