//! # flow-store - Run Store Adapter
//!
//! Persists the three things the workflow executor needs to survive a crash or
//! serve a resume request: **workflow definitions**, **per-run node results**,
//! and **ReAct agent memory**. This crate provides the [`RunStore`] trait plus
//! [`InMemoryRunStore`], a reference implementation good enough for a
//! single-process deployment.
//!
//! ## Why a trait
//!
//! `flow-core`'s executor never talks to a concrete backend; it only ever
//! calls through [`RunStore`]. Swapping the in-memory table for a networked
//! document store (Postgres, Redis, MongoDB, ...) means writing one new
//! `impl RunStore for YourBackend` — the executor, the HTTP surface, and the
//! built-in nodes are all unaffected.
//!
//! ## Write semantics
//!
//! Node-result writes happen on the hot path of a run, so they are
//! fire-and-forget from the executor's perspective: an `Err` from
//! [`RunStore::put_node_result`] is logged, never allowed to fail the node it
//! describes. Workflow CRUD through the HTTP surface, by contrast, does
//! propagate errors — a workflow must actually be stored before `POST
//! /workflows` reports success.
//!
//! ## Resume semantics
//!
//! A resumed run rehydrates from [`RunStore::read_run`], but only entries
//! whose [`StoredStatus::is_resumable`] holds are treated as already done;
//! failed nodes are retried rather than replayed verbatim.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use flow_store::{InMemoryRunStore, RunStore, WorkflowRecord};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryRunStore::new(Duration::from_secs(86_400));
//!
//!     store
//!         .put_workflow(WorkflowRecord {
//!             id: "wf-1".into(),
//!             name: "example".into(),
//!             definition: serde_json::json!({"nodes": []}),
//!         })
//!         .await?;
//!
//!     let fetched = store.get_workflow("wf-1").await?;
//!     assert!(fetched.is_some());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;
pub mod record;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryRunStore;
pub use record::{
    MemoryRecord, NodeResult, RunRecord, StoredStatus, WorkflowRecord, WorkflowSummary,
};
pub use store::RunStore;
