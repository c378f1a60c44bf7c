//! Graph data model: the wire shape of a run input and the run-local state the
//! executor tracks while driving it.
//!
//! A graph is nothing more than an ordered list of [`NodeDef`] and [`EdgeDef`]
//! plus an optional secrets bag; all the behavior lives in the executor and in
//! the [`crate::node::Node`] implementations the registry constructs from
//! `NodeDef::node_type`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A node as authored in the graph editor: an id, a registered type key, and
/// a free-form configuration map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDef {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub data: Value,
}

/// How an edge gates delivery based on its source node's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeBehavior {
    /// Passes iff the source completed with `status == "success"`.
    Conditional,
    /// Passes iff the source completed with `status != "success"`.
    Failure,
    /// Passes regardless of the source's status.
    Always,
}

impl EdgeBehavior {
    /// Parse an explicit `edge.data.behavior` string, recognizing `"force"`
    /// as a synonym for [`EdgeBehavior::Always`].
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "conditional" => Some(Self::Conditional),
            "failure" => Some(Self::Failure),
            "always" | "force" => Some(Self::Always),
            _ => None,
        }
    }

    /// Infer behavior from a handle name when no explicit behavior is set,
    /// per the closed heuristic set: `"fail"`/`"error"` substrings mean
    /// failure routing, `"always"`/`"force"`/`"fallback"` mean always
    /// routing, anything else defaults to conditional.
    pub fn from_handle_name(handle: &str) -> Self {
        let lower = handle.to_lowercase();
        if lower.contains("fail") || lower.contains("error") {
            Self::Failure
        } else if lower.contains("always") || lower.contains("force") || lower.contains("fallback")
        {
            Self::Always
        } else {
            Self::Conditional
        }
    }

    /// Whether a payload with the given success flag (and not itself
    /// skipped) passes through an edge with this behavior.
    pub fn passes(self, parent_succeeded: bool) -> bool {
        match self {
            EdgeBehavior::Conditional => parent_succeeded,
            EdgeBehavior::Failure => !parent_succeeded,
            EdgeBehavior::Always => true,
        }
    }
}

/// An edge as authored in the graph editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDef {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, rename = "sourceHandle")]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub data: EdgeData,
}

/// `data` payload of an edge; only `behavior` is meaningful to the executor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeData {
    pub behavior: Option<String>,
}

impl EdgeDef {
    /// Resolve this edge's effective [`EdgeBehavior`] using the priority
    /// order: explicit recognized `data.behavior`, then handle-name
    /// heuristic, then `conditional`.
    pub fn effective_behavior(&self) -> EdgeBehavior {
        if let Some(raw) = &self.data.behavior {
            if let Some(behavior) = EdgeBehavior::parse(raw) {
                return behavior;
            }
        }
        if let Some(handle) = &self.source_handle {
            return EdgeBehavior::from_handle_name(handle);
        }
        EdgeBehavior::Conditional
    }
}

/// A complete run input: the graph plus whatever secrets the run needs
/// (currently just an optional sudo password for Command nodes).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDefinition {
    pub nodes: Vec<NodeDef>,
    pub edges: Vec<EdgeDef>,
    #[serde(default)]
    pub secrets: Secrets,
}

/// Secrets carried alongside a run request. Never logged verbatim — see
/// `flow_toolkit::logging::sanitize_for_logging`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Secrets {
    pub sudo_password: Option<String>,
}

/// Node type keys the executor treats as trigger nodes: nodes with zero
/// incoming edges of these types are seeded at run start without waiting on
/// any inbox.
pub const TRIGGER_NODE_TYPES: &[&str] = &["start", "webhook", "cron"];

/// Node type keys filtered out before execution: they exist only as editor
/// state describing static capability wiring (e.g. Vault nodes).
pub const CONFIG_NODE_TYPES: &[&str] = &["vault"];

/// Edge `sourceHandle` values filtered out before execution for the same
/// reason as [`CONFIG_NODE_TYPES`].
pub const CONFIG_HANDLES: &[&str] = &["tool", "capability"];

/// Per-run lifecycle state of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Pending,
    Running,
    Completed,
    Skipped,
    Failed,
}

/// What a parent delivered to a child's inbox: either a payload or the
/// distinguished `SKIP` sentinel, which is not itself a payload value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Delivery {
    Payload(Value),
    Skip,
}

impl Delivery {
    pub fn is_skip(&self) -> bool {
        matches!(self, Delivery::Skip)
    }

    /// The delivered payload, or `None` for `Skip`.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Delivery::Payload(v) => Some(v),
            Delivery::Skip => None,
        }
    }

    /// Whether the delivering parent reported `status == "success"`.
    pub fn parent_succeeded(&self) -> bool {
        match self {
            Delivery::Payload(v) => v.get("status").and_then(Value::as_str) == Some("success"),
            Delivery::Skip => false,
        }
    }
}

/// `node_id -> Delivery` inbox for a single target node.
pub type Inbox = HashMap<String, Delivery>;

/// One recorded execution failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    pub node_id: String,
    pub error: String,
}

/// Terminal status of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Failed,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behavior_parses_force_as_always() {
        assert_eq!(EdgeBehavior::parse("force"), Some(EdgeBehavior::Always));
        assert_eq!(EdgeBehavior::parse("bogus"), None);
    }

    #[test]
    fn handle_heuristic_matches_closed_set() {
        assert_eq!(EdgeBehavior::from_handle_name("onFail"), EdgeBehavior::Failure);
        assert_eq!(EdgeBehavior::from_handle_name("onError"), EdgeBehavior::Failure);
        assert_eq!(EdgeBehavior::from_handle_name("alwaysRun"), EdgeBehavior::Always);
        assert_eq!(EdgeBehavior::from_handle_name("fallbackPath"), EdgeBehavior::Always);
        assert_eq!(EdgeBehavior::from_handle_name("default"), EdgeBehavior::Conditional);
    }

    #[test]
    fn conditional_passes_only_on_success() {
        assert!(EdgeBehavior::Conditional.passes(true));
        assert!(!EdgeBehavior::Conditional.passes(false));
        assert!(!EdgeBehavior::Failure.passes(true));
        assert!(EdgeBehavior::Failure.passes(false));
        assert!(EdgeBehavior::Always.passes(true));
        assert!(EdgeBehavior::Always.passes(false));
    }

    #[test]
    fn skip_delivery_never_passes_as_succeeded() {
        let skip = Delivery::Skip;
        assert!(!skip.parent_succeeded());
        assert!(skip.is_skip());
    }
}
