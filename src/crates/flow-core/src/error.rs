//! Error types for graph construction, validation, and execution
//!
//! All errors implement `std::error::Error` via `thiserror`. The split between
//! [`GraphError`] (construction/validation time) and runtime node failures
//! (carried as data inside a run's `errors` list, not as a Rust error) mirrors
//! the distinction the executor itself draws: a malformed graph is a program
//! bug and gets a `Result::Err`; a node that fails at runtime is expected
//! behavior and gets recorded as a result, not a panic or a propagated error.
//!
//! # Examples
//!
//! ```rust
//! use flow_core::error::{GraphError, Result};
//!
//! fn require_start_node(found: bool) -> Result<()> {
//!     if !found {
//!         return Err(GraphError::Validation("no valid start node found".into()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Convenience result type using [`GraphError`].
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur while building, validating, or running a graph.
#[derive(Error, Debug)]
pub enum GraphError {
    /// The graph structure itself is invalid (unreachable references, no
    /// start node, conflicting ids, ...).
    #[error("graph validation failed: {0}")]
    Validation(String),

    /// A registry lookup for a node type key came back empty.
    #[error("no node type registered for '{0}'")]
    UnknownNodeType(String),

    /// The restart cap (`MAX_WORKFLOW_RESTARTS`) was exceeded.
    #[error("restart limit reached")]
    RestartLimitReached,

    /// The run was cancelled before it reached a terminal state.
    #[error("run cancelled")]
    Cancelled,

    /// Failed to persist or read back run state.
    #[error("run store error: {0}")]
    Store(#[from] flow_store::StoreError),

    /// Failed to (de)serialize a graph, payload, or event.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other execution failure that doesn't fit the above.
    #[error("{0}")]
    Custom(String),
}
