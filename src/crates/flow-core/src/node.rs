//! The node capability interface every built-in and plugin-provided node type
//! implements.
//!
//! Grounded on the registry/protocol contract the original push-based runner
//! exposes to its node implementations (`validate`/`execute`/execution-mode
//! metadata/wait strategy), expressed here as a Rust async trait instead of a
//! duck-typed Python base class.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::events::EventBus;
use crate::model::NodeDef;

/// Severity of a single validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationLevel {
    Critical,
    Warning,
}

/// One validation finding against a node's configuration.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ValidationIssue {
    pub node_id: String,
    pub message: String,
    pub level: ValidationLevel,
}

/// Result of validating a single node's `data`.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn critical(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![ValidationIssue {
                node_id: node_id.into(),
                message: message.into(),
                level: ValidationLevel::Critical,
            }],
        }
    }
}

/// Join semantics a node requests from the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitStrategy {
    /// AND-join: ready once every incoming edge has delivered (payload or skip).
    #[default]
    All,
    /// OR-merge/discriminator: ready as soon as any non-skip payload arrives,
    /// or once every incoming edge has delivered skip.
    Any,
}

/// Advisory execution-mode metadata a node can report; currently consumed by
/// the HTTP surface to decide whether a run needs an interactive terminal
/// socket attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionMode {
    pub requires_pty: bool,
    pub is_interactive: bool,
}

/// Everything a node's `execute` needs beyond its own data: run identity, the
/// event sink, the sudo credential if one was supplied for this run, a host
/// fingerprint string, and a read-only view of prior results (used by e.g.
/// the ReAct agent to recall a sibling node's output).
pub struct NodeContext {
    pub thread_id: String,
    pub node_id: String,
    pub sudo_password: Option<String>,
    pub system_fingerprint: String,
    pub events: Arc<EventBus>,
    pub prior_results: Arc<HashMap<String, Value>>,
    /// The run's cancellation token, so long-suspended node bodies (PTY
    /// reads above all) can observe cancellation at their own poll loop
    /// rather than only at the executor's outer `join_set.shutdown()`.
    pub cancel: CancellationToken,
}

impl NodeContext {
    pub async fn emit_log(&self, log: impl Into<String>, is_stderr: bool) {
        self.events
            .emit_node_log(&self.thread_id, &self.node_id, log.into(), is_stderr)
            .await;
    }
}

/// The full input a node execution receives: its own `data` plus the
/// non-skip payloads delivered by its parents, keyed by parent node id.
#[derive(Debug, Clone, Default)]
pub struct NodePayload {
    pub data: Value,
    pub inputs: HashMap<String, Value>,
}

/// Capability interface implemented by every node type.
///
/// Implementations are constructed fresh per execution by the
/// [`crate::registry::NodeRegistry`] from a [`NodeDef`]; they hold no state
/// across runs.
#[async_trait]
pub trait Node: Send + Sync {
    /// Validate this node's configuration in isolation. Pure: must not
    /// perform I/O or depend on run state.
    fn validate(&self, node: &NodeDef) -> ValidationOutcome {
        let _ = node;
        ValidationOutcome::ok()
    }

    /// Run the node to completion, returning its result payload. The
    /// returned value's `status` field drives edge routing and run-store
    /// status classification; node implementations should set it to
    /// `"success"`, `"failed"`, or `"error"`.
    async fn execute(&self, ctx: &NodeContext, payload: NodePayload) -> Result<Value>;

    /// Advisory metadata about how this node executes.
    fn get_execution_mode(&self) -> ExecutionMode {
        ExecutionMode::default()
    }

    /// Join semantics this node wants from the scheduler.
    fn get_wait_strategy(&self) -> WaitStrategy {
        WaitStrategy::All
    }
}

/// Constructs a [`Node`] instance from a [`NodeDef`]; registered per type key
/// in the [`crate::registry::NodeRegistry`].
pub type NodeConstructor = Arc<dyn Fn(&NodeDef) -> Arc<dyn Node> + Send + Sync>;
