//! ReAct Agent node: bounded reason-act loop with dynamically granted tools.
//!
//! Grounded on `original_source/plugins/ReActAgent/backend/node.py`: the
//! capability-grant classification of `TOOL_DEF` inputs, the JSON-mode
//! system-prompt shape, the per-step thought/action/args decision loop, and
//! the permission-denied fallback for an ungranted action all carry over.
//! Memory read/append against [`RunStore`] is this system's addition (see
//! SPEC_FULL.md §4.D point ii/vii) — the original had no persistence layer
//! to draw on.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use flow_core::error::Result;
use flow_core::model::NodeDef;
use flow_core::node::{Node, NodeContext, NodePayload, ValidationOutcome};
use flow_llm::{LlmClient, Message};
use flow_store::RunStore;

use crate::tools;

const SIGNAL_PREFIX: &str = "__FLOWCORE_SIGNAL__";
const MEMORY_RECALL_LIMIT: usize = 5;

pub struct ReActAgentNode {
    prompt: String,
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn RunStore>,
    max_steps: u32,
}

impl ReActAgentNode {
    pub fn new(node: &NodeDef, llm: Arc<dyn LlmClient>, store: Arc<dyn RunStore>, max_steps: u32) -> Self {
        Self {
            prompt: node.data.get("prompt").and_then(Value::as_str).unwrap_or_default().to_string(),
            llm,
            store,
            max_steps,
        }
    }
}

struct Capabilities {
    definitions: Vec<Value>,
    granted: HashSet<String>,
    context: String,
}

fn classify_inputs(inputs: &HashMap<String, Value>) -> Capabilities {
    let mut definitions = Vec::new();
    let mut granted = HashSet::new();
    let mut context = String::from("--- CONTEXT ---\n");

    for (parent_id, data) in inputs {
        let output = data.get("output").cloned().unwrap_or_else(|| data.clone());
        if output.get("type").and_then(Value::as_str) == Some("TOOL_DEF") {
            if let Some(def) = output.get("definition") {
                if let Some(name) = def.get("name").and_then(Value::as_str) {
                    if tools::is_known(name) || name == "restart_workflow" || name == "stop_workflow" {
                        granted.insert(name.to_string());
                        definitions.push(def.clone());
                    }
                }
            }
        } else {
            let text = output
                .get("stdout")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| output.to_string());
            context.push_str(&format!("[Node {parent_id}]: {text}\n"));
        }
    }

    Capabilities { definitions, granted, context }
}

fn value_to_arg_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

async fn dispatch_granted(name: &str, args: &str) -> String {
    match name {
        "restart_workflow" => format!("{SIGNAL_PREFIX}RESTART"),
        "stop_workflow" => {
            let reason = if args.is_empty() { "Stopped by Agent" } else { args };
            format!("{SIGNAL_PREFIX}STOP:{reason}")
        }
        other => tools::dispatch(other, args).await,
    }
}

#[async_trait]
impl Node for ReActAgentNode {
    fn validate(&self, node: &NodeDef) -> ValidationOutcome {
        if node.data.get("prompt").and_then(Value::as_str).unwrap_or_default().trim().is_empty() {
            return ValidationOutcome::critical(node.id.clone(), "Instruction prompt is required");
        }
        ValidationOutcome::ok()
    }

    async fn execute(&self, ctx: &NodeContext, payload: NodePayload) -> Result<Value> {
        let caps = classify_inputs(&payload.inputs);

        let recalled = self.store.read_memory(&ctx.thread_id, &ctx.node_id, MEMORY_RECALL_LIMIT).await.unwrap_or_default();
        let mut context_str = caps.context;
        if !recalled.is_empty() {
            context_str.push_str("--- RECENT MEMORY ---\n");
            for entry in &recalled {
                context_str.push_str(&format!("{entry}\n"));
            }
        }

        let tools_desc = if caps.definitions.is_empty() {
            "NO TOOLS AVAILABLE.".to_string()
        } else {
            let lines: Vec<String> = caps
                .definitions
                .iter()
                .map(|t| {
                    format!(
                        "- {}: {} (Args: {})",
                        t.get("name").and_then(Value::as_str).unwrap_or_default(),
                        t.get("description").and_then(Value::as_str).unwrap_or_default(),
                        t.get("parameters").and_then(Value::as_str).unwrap_or_default(),
                    )
                })
                .collect();
            format!("AVAILABLE TOOLS:\n{}", lines.join("\n"))
        };

        let system_prompt = format!(
            "You are an Agent. {tools_desc}\nRespond in JSON: {{\"thought\": \"...\", \"action\": \"tool_name\", \"args\": \"...\"}}"
        );
        let mut messages = vec![Message::user(format!("{context_str}\nGOAL: {}", self.prompt))];

        let mut final_response = String::new();
        let mut history_log: Vec<Value> = Vec::new();

        for step in 0..self.max_steps {
            ctx.emit_log(format!("\n🤖 [Step {}] Thinking...\n", step + 1), false).await;

            let decision = match self.llm.complete_json(&system_prompt, &messages).await {
                Ok(value) => value,
                Err(e) => return Ok(json!({"status": "failed", "output": {"error": e.to_string()}})),
            };
            messages.push(Message::assistant(decision.to_string()));

            let action = match decision.get("action").and_then(Value::as_str) {
                Some(a) => a.to_string(),
                None => continue,
            };
            let args = value_to_arg_string(decision.get("args"));
            let thought = decision.get("thought").and_then(Value::as_str).unwrap_or_default();
            ctx.emit_log(format!("🤔 {thought}\n⚡ {action}('{args}')\n"), false).await;

            if action == "final_answer" {
                final_response = args;
                break;
            }

            let tool_output = if caps.granted.contains(&action) {
                dispatch_granted(&action, &args).await
            } else {
                format!("Error: Permission Denied. Tool '{action}' is not connected.")
            };

            if let Some(rest) = tool_output.strip_prefix(SIGNAL_PREFIX) {
                if rest == "RESTART" {
                    return Ok(json!({"status": "success", "output": {"signal": "restart", "history": history_log}}));
                }
                if let Some(reason) = rest.strip_prefix("STOP:") {
                    history_log.push(json!({"step": step + 1, "type": "stop", "reason": reason}));
                    return Ok(json!({
                        "status": "success",
                        "output": {"signal": "stop", "reason": reason, "history": history_log},
                    }));
                }
            }

            let preview: String = tool_output.chars().take(100).collect();
            ctx.emit_log(format!("   -> {preview}...\n"), false).await;
            messages.push(Message::user(format!("Tool Output: {tool_output}")));
            history_log.push(json!({"step": step + 1, "type": "observation", "content": tool_output}));
        }

        let summary = json!({"prompt": self.prompt, "response": final_response});
        let _ = self.store.append_memory(&ctx.thread_id, &ctx.node_id, summary).await;

        Ok(json!({"status": "success", "output": {"response": final_response, "history": history_log}}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_store::InMemoryRunStore;
    use std::time::Duration;

    struct FinalAnswerClient;
    #[async_trait]
    impl LlmClient for FinalAnswerClient {
        async fn complete_json(&self, _system: &str, _messages: &[Message]) -> flow_llm::Result<Value> {
            Ok(json!({"thought": "done", "action": "final_answer", "args": "42"}))
        }
    }

    fn node_def(prompt: &str) -> NodeDef {
        NodeDef { id: "agent1".into(), node_type: "react_agent".into(), data: json!({"prompt": prompt}) }
    }

    #[tokio::test]
    async fn terminates_on_final_answer() {
        let def = node_def("what is the answer");
        let node = ReActAgentNode::new(
            &def,
            Arc::new(FinalAnswerClient),
            Arc::new(InMemoryRunStore::new(Duration::from_secs(86_400))),
            5,
        );
        let ctx = crate::test_support::blank_ctx("t1", "agent1");
        let result = node.execute(&ctx, NodePayload::default()).await.unwrap();
        assert_eq!(result["status"], "success");
        assert_eq!(result["output"]["response"], "42");
    }

    #[test]
    fn validate_requires_nonempty_prompt() {
        let def = node_def("");
        let node = ReActAgentNode::new(
            &def,
            Arc::new(FinalAnswerClient),
            Arc::new(InMemoryRunStore::new(Duration::from_secs(86_400))),
            5,
        );
        assert!(!node.validate(&def).valid);
    }

    struct DeniedToolClient;
    #[async_trait]
    impl LlmClient for DeniedToolClient {
        async fn complete_json(&self, _system: &str, messages: &[Message]) -> flow_llm::Result<Value> {
            if messages.len() == 1 {
                Ok(json!({"thought": "try shell", "action": "run_shell", "args": "echo hi"}))
            } else {
                Ok(json!({"thought": "give up", "action": "final_answer", "args": "denied"}))
            }
        }
    }

    #[tokio::test]
    async fn ungranted_tool_is_denied() {
        let def = node_def("do a thing");
        let node = ReActAgentNode::new(
            &def,
            Arc::new(DeniedToolClient),
            Arc::new(InMemoryRunStore::new(Duration::from_secs(86_400))),
            5,
        );
        let ctx = crate::test_support::blank_ctx("t1", "agent1");
        let result = node.execute(&ctx, NodePayload::default()).await.unwrap();
        assert_eq!(result["output"]["response"], "denied");
        let history = result["output"]["history"].as_array().unwrap();
        assert!(history[0]["content"].as_str().unwrap().contains("Permission Denied"));
    }
}
