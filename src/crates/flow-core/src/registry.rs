//! Process-wide mapping from node type key to node constructor, plus plugin
//! manifest discovery.
//!
//! Grounded on the original runner's `registry.py`: a directory of plugin
//! subfolders, each with a `manifest.json` declaring `{id, backend_class}`;
//! importing the named class registers it under `id`. Here the "class" is a
//! [`crate::node::NodeConstructor`] closure supplied by `flow-nodes` at
//! startup instead of a dynamically imported Python class, since Rust has no
//! runtime class loading — the manifest format and directory convention are
//! kept so the same plugin layout documented for operators still applies.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{GraphError, Result};
use crate::model::NodeDef;
use crate::node::{Node, NodeConstructor};

/// One entry of a plugin's `manifest.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginManifest {
    pub id: String,
    pub backend_class: String,
}

/// Summary returned by [`NodeRegistry::list_nodes`], consumed by the
/// `/system-info` handler.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RegisteredNodeInfo {
    pub type_key: String,
}

/// Type-key to constructor mapping used by the executor to instantiate a
/// [`Node`] for every [`NodeDef`] in a graph.
#[derive(Clone, Default)]
pub struct NodeRegistry {
    constructors: HashMap<String, NodeConstructor>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `type_key`, overwriting any previous
    /// registration for the same key.
    pub fn register(&mut self, type_key: impl Into<String>, constructor: NodeConstructor) {
        self.constructors.insert(type_key.into(), constructor);
    }

    /// Construct the node implementation for a given [`NodeDef`].
    pub fn build(&self, node: &NodeDef) -> Result<Arc<dyn Node>> {
        let constructor = self
            .constructors
            .get(&node.node_type)
            .ok_or_else(|| GraphError::UnknownNodeType(node.node_type.clone()))?;
        Ok(constructor(node))
    }

    pub fn is_registered(&self, type_key: &str) -> bool {
        self.constructors.contains_key(type_key)
    }

    /// List every registered type key, for `/system-info` and tests.
    pub fn list_nodes(&self) -> Vec<RegisteredNodeInfo> {
        let mut keys: Vec<_> = self.constructors.keys().cloned().collect();
        keys.sort();
        keys.into_iter()
            .map(|type_key| RegisteredNodeInfo { type_key })
            .collect()
    }

    /// Scan `plugin_dir` for subdirectories containing a `manifest.json` and
    /// return the parsed manifests. Registration itself is left to the
    /// caller (`flow-nodes` maps `backend_class` names to constructors it
    /// knows how to build, since Rust has no reflection-based class lookup).
    pub fn scan_manifests(plugin_dir: &Path) -> Result<Vec<PluginManifest>> {
        let mut manifests = Vec::new();
        let entries = match std::fs::read_dir(plugin_dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(manifests),
        };
        for entry in entries.flatten() {
            let manifest_path = entry.path().join("manifest.json");
            if !manifest_path.is_file() {
                continue;
            }
            let contents = std::fs::read_to_string(&manifest_path)
                .map_err(|e| GraphError::Custom(format!("reading {manifest_path:?}: {e}")))?;
            let manifest: PluginManifest = serde_json::from_str(&contents)?;
            manifests.push(manifest);
        }
        Ok(manifests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ExecutionMode, NodeContext, NodePayload, ValidationOutcome, WaitStrategy};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct EchoNode;

    #[async_trait]
    impl Node for EchoNode {
        fn validate(&self, _node: &NodeDef) -> ValidationOutcome {
            ValidationOutcome::ok()
        }
        async fn execute(&self, _ctx: &NodeContext, payload: NodePayload) -> Result<Value> {
            Ok(json!({"status": "success", "output": payload.data}))
        }
        fn get_execution_mode(&self) -> ExecutionMode {
            ExecutionMode::default()
        }
        fn get_wait_strategy(&self) -> WaitStrategy {
            WaitStrategy::All
        }
    }

    #[test]
    fn unregistered_type_is_a_typed_error() {
        let registry = NodeRegistry::new();
        let node = NodeDef {
            id: "n1".into(),
            node_type: "mystery".into(),
            data: Value::Null,
        };
        let err = registry.build(&node).unwrap_err();
        assert!(matches!(err, GraphError::UnknownNodeType(t) if t == "mystery"));
    }

    #[test]
    fn registered_type_builds_and_lists() {
        let mut registry = NodeRegistry::new();
        registry.register("echo", Arc::new(|_def: &NodeDef| Arc::new(EchoNode) as Arc<dyn Node>));
        let node = NodeDef {
            id: "n1".into(),
            node_type: "echo".into(),
            data: Value::Null,
        };
        assert!(registry.build(&node).is_ok());
        assert!(registry.is_registered("echo"));
        assert_eq!(registry.list_nodes().len(), 1);
    }

    #[test]
    fn scanning_a_missing_plugin_dir_returns_empty() {
        let manifests = NodeRegistry::scan_manifests(Path::new("/nonexistent/plugins")).unwrap();
        assert!(manifests.is_empty());
    }
}
