//! Two-tier graph validation.
//!
//! Grounded directly on the original's `validator.py`, which exposes both a
//! lenient map-returning check used by the editor's pre-flight endpoint and a
//! strict wrapper used as the execution gatekeeper. Both tiers only consider
//! nodes reachable by BFS from the unique start node; an unreachable node is
//! simply absent from the result rather than treated as an error.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{GraphError, Result};
use crate::model::{EdgeDef, GraphDefinition, NodeDef, TRIGGER_NODE_TYPES};
use crate::node::{ValidationIssue, ValidationLevel};
use crate::registry::NodeRegistry;

/// Per-node validation outcome as surfaced to `/workflow/validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeValidationState {
    Ready,
    ValidationFailed,
}

/// Result of the lenient reachability-scoped validation pass.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct GraphValidation {
    pub validation_map: HashMap<String, NodeValidationState>,
    pub errors: Vec<ValidationIssue>,
}

fn reachable_from_start(graph: &GraphDefinition) -> Result<(String, HashSet<String>)> {
    let start = graph
        .nodes
        .iter()
        .find(|n| TRIGGER_NODE_TYPES.contains(&n.node_type.as_str()))
        .ok_or_else(|| GraphError::Validation("no valid start node found".into()))?;

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &graph.edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start.id.clone());
    queue.push_back(start.id.as_str());
    while let Some(current) = queue.pop_front() {
        if let Some(children) = adjacency.get(current) {
            for &child in children {
                if visited.insert(child.to_string()) {
                    queue.push_back(child);
                }
            }
        }
    }

    Ok((start.id.clone(), visited))
}

/// Lenient validation: never raises. Computes `{validation_map, errors}` over
/// every node reachable from the unique start node; unreachable nodes are
/// simply omitted from the map.
pub fn validate_graph(graph: &GraphDefinition, registry: &NodeRegistry) -> GraphValidation {
    let (_, reachable) = match reachable_from_start(graph) {
        Ok(pair) => pair,
        Err(GraphError::Validation(msg)) => {
            return GraphValidation {
                validation_map: HashMap::new(),
                errors: vec![ValidationIssue {
                    node_id: String::new(),
                    message: msg,
                    level: ValidationLevel::Critical,
                }],
            };
        }
        Err(_) => unreachable!("reachable_from_start only produces Validation errors"),
    };

    let mut validation_map = HashMap::new();
    let mut errors = Vec::new();

    for node in &graph.nodes {
        if !reachable.contains(&node.id) {
            continue;
        }
        let outcome = match registry.build(node) {
            Ok(instance) => instance.validate(node),
            Err(_) => crate::node::ValidationOutcome::critical(
                &node.id,
                format!("no node type registered for '{}'", node.node_type),
            ),
        };
        let state = if outcome.valid {
            NodeValidationState::Ready
        } else {
            NodeValidationState::ValidationFailed
        };
        validation_map.insert(node.id.clone(), state);
        errors.extend(outcome.errors);
    }

    GraphValidation { validation_map, errors }
}

/// Strict validation: the execution gatekeeper. Raises on the first CRITICAL
/// error found among reachable nodes.
pub fn validate_workflow(graph: &GraphDefinition, registry: &NodeRegistry) -> Result<()> {
    let validation = validate_graph(graph, registry);
    if let Some(issue) = validation
        .errors
        .iter()
        .find(|e| e.level == ValidationLevel::Critical)
    {
        return Err(GraphError::Validation(format!(
            "{}: {}",
            issue.node_id, issue.message
        )));
    }
    Ok(())
}

/// Remove configuration-only nodes and edges before execution, per the
/// filtering invariant: edges whose `sourceHandle` is in the configuration
/// handle set, and nodes whose `type` is in the configuration node set, carry
/// only static capability wiring and never participate in execution flow.
pub fn filter_executable(graph: &GraphDefinition) -> (Vec<NodeDef>, Vec<EdgeDef>) {
    use crate::model::{CONFIG_HANDLES, CONFIG_NODE_TYPES};

    let nodes: Vec<NodeDef> = graph
        .nodes
        .iter()
        .filter(|n| !CONFIG_NODE_TYPES.contains(&n.node_type.as_str()))
        .cloned()
        .collect();
    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let edges: Vec<EdgeDef> = graph
        .edges
        .iter()
        .filter(|e| {
            let handle_is_config = e
                .source_handle
                .as_deref()
                .map(|h| CONFIG_HANDLES.contains(&h))
                .unwrap_or(false);
            !handle_is_config && node_ids.contains(e.source.as_str()) && node_ids.contains(e.target.as_str())
        })
        .cloned()
        .collect();

    (nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn simple_graph() -> GraphDefinition {
        GraphDefinition {
            nodes: vec![
                NodeDef { id: "start".into(), node_type: "start".into(), data: json!({}) },
                NodeDef { id: "cmd".into(), node_type: "command".into(), data: json!({"command": "echo hi"}) },
                NodeDef { id: "orphan".into(), node_type: "command".into(), data: json!({}) },
            ],
            edges: vec![EdgeDef {
                id: "e1".into(),
                source: "start".into(),
                target: "cmd".into(),
                source_handle: None,
                data: Default::default(),
            }],
            secrets: Default::default(),
        }
    }

    #[test]
    fn unreachable_node_is_omitted_not_failed() {
        let registry = NodeRegistry::new();
        let validation = validate_graph(&simple_graph(), &registry);
        assert!(validation.validation_map.contains_key("start"));
        assert!(validation.validation_map.contains_key("cmd"));
        assert!(!validation.validation_map.contains_key("orphan"));
    }

    #[test]
    fn missing_start_node_reports_one_error() {
        let graph = GraphDefinition {
            nodes: vec![NodeDef { id: "cmd".into(), node_type: "command".into(), data: json!({}) }],
            edges: vec![],
            secrets: Default::default(),
        };
        let registry = NodeRegistry::new();
        let validation = validate_graph(&graph, &registry);
        assert_eq!(validation.errors.len(), 1);
        assert!(validation.validation_map.is_empty());
    }

    #[test]
    fn strict_validation_raises_on_unregistered_type() {
        let registry = NodeRegistry::new();
        let err = validate_workflow(&simple_graph(), &registry).unwrap_err();
        assert!(matches!(err, GraphError::Validation(_)));
    }

    #[test]
    fn filter_executable_drops_vault_nodes() {
        let mut graph = simple_graph();
        graph.nodes.push(NodeDef { id: "v1".into(), node_type: "vault".into(), data: json!({}) });
        let (nodes, _edges) = filter_executable(&graph);
        assert!(!nodes.iter().any(|n| n.node_type == "vault"));
    }
}
