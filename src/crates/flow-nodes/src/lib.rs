//! Built-in node types, registered into a [`flow_core::NodeRegistry`] at
//! startup.
//!
//! Each type here is a thin [`flow_core::Node`] implementation grounded on
//! one of the original plugin backends (see the module-level docs on each
//! file). Types that need shared runtime dependencies — the LLM client, the
//! run store, the ReAct step cap — receive them through [`BuiltinDeps`] at
//! registration time; [`NodeConstructor`](flow_core::NodeConstructor)
//! closures capture the relevant `Arc` clones so each constructed node
//! instance is otherwise self-contained.

pub mod command;
pub mod or_merge;
pub mod react_agent;
pub mod start;
pub mod tool_provider;
pub mod tools;
pub mod vault;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use flow_core::{NodeRegistry, Node};
use flow_llm::LlmClient;
use flow_store::RunStore;

use command::CommandNode;
use or_merge::OrMergeNode;
use react_agent::ReActAgentNode;
use start::StartNode;
use tool_provider::{RestartToolNode, ShellToolNode, StopToolNode};
use vault::VaultNode;

/// Shared runtime dependencies the ReAct agent (and, in principle, future
/// node types) need beyond their own `data` — captured by the registration
/// closures rather than threaded through [`flow_core::NodeConstructor`]'s
/// signature, which only ever receives a [`flow_core::model::NodeDef`].
#[derive(Clone)]
pub struct BuiltinDeps {
    pub llm: Arc<dyn LlmClient>,
    pub store: Arc<dyn RunStore>,
    pub react_agent_max_steps: u32,
}

/// Register every built-in node type under its conventional editor-facing
/// type key.
pub fn register_builtin(registry: &mut NodeRegistry, deps: BuiltinDeps) {
    // webhook/cron share the trigger type's pass-through contract with start
    // and have no distinct built-in backend of their own.
    registry.register("start", Arc::new(|def| Arc::new(StartNode::new(def)) as Arc<dyn Node>));
    registry.register("webhook", Arc::new(|def| Arc::new(StartNode::new(def)) as Arc<dyn Node>));
    registry.register("cron", Arc::new(|def| Arc::new(StartNode::new(def)) as Arc<dyn Node>));
    registry.register("command", Arc::new(|def| Arc::new(CommandNode::new(def)) as Arc<dyn Node>));
    registry.register("or_merge", Arc::new(|def| Arc::new(OrMergeNode::new(def)) as Arc<dyn Node>));
    registry.register("vault", Arc::new(|def| Arc::new(VaultNode::new(def)) as Arc<dyn Node>));
    registry.register("shell_tool", Arc::new(|def| Arc::new(ShellToolNode::new(def)) as Arc<dyn Node>));
    registry.register("restart_tool", Arc::new(|def| Arc::new(RestartToolNode::new(def)) as Arc<dyn Node>));
    registry.register("stop_tool", Arc::new(|def| Arc::new(StopToolNode::new(def)) as Arc<dyn Node>));

    let llm = deps.llm.clone();
    let store = deps.store.clone();
    let max_steps = deps.react_agent_max_steps;
    registry.register(
        "react_agent",
        Arc::new(move |def| {
            Arc::new(ReActAgentNode::new(def, llm.clone(), store.clone(), max_steps)) as Arc<dyn Node>
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_store::InMemoryRunStore;
    use std::time::Duration;

    struct UnusedClient;
    #[async_trait::async_trait]
    impl LlmClient for UnusedClient {
        async fn complete_json(&self, _system: &str, _messages: &[flow_llm::Message]) -> flow_llm::Result<serde_json::Value> {
            unreachable!("not exercised by this test")
        }
    }

    #[test]
    fn registers_every_builtin_type() {
        let mut registry = NodeRegistry::new();
        register_builtin(
            &mut registry,
            BuiltinDeps {
                llm: Arc::new(UnusedClient),
                store: Arc::new(InMemoryRunStore::new(Duration::from_secs(86_400))),
                react_agent_max_steps: 5,
            },
        );
        for ty in [
            "start", "webhook", "cron", "command", "or_merge", "vault", "shell_tool", "restart_tool",
            "stop_tool", "react_agent",
        ] {
            assert!(registry.is_registered(ty), "expected {ty} to be registered");
        }
    }
}
