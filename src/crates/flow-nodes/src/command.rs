//! Command node: runs `data.command` on a real PTY, optionally sudo-elevated.
//!
//! Grounded on `original_source/plugins/CommandNode/backend/node.py`: the
//! empty/placeholder/locked validation checks, the sudo-lock gate, the cyan
//! `"> <command>"` banner as the first streamed log line, and the
//! exit-code-zero success classification all carry over unchanged.

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;

use flow_core::error::Result;
use flow_core::model::NodeDef;
use flow_core::node::{ExecutionMode, Node, NodeContext, NodePayload, ValidationOutcome, WaitStrategy};
use flow_toolkit::pty::{execute_in_pty, OutputChunk, StreamLabel};

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

pub struct CommandNode {
    command: String,
    locked: bool,
    sudo_lock: bool,
}

impl CommandNode {
    pub fn new(node: &NodeDef) -> Self {
        Self {
            command: node.data.get("command").and_then(Value::as_str).unwrap_or_default().to_string(),
            locked: node.data.get("locked").and_then(Value::as_bool).unwrap_or(false),
            sudo_lock: node.data.get("sudoLock").and_then(Value::as_bool).unwrap_or(false),
        }
    }
}

#[async_trait]
impl Node for CommandNode {
    fn validate(&self, node: &NodeDef) -> ValidationOutcome {
        let command = node.data.get("command").and_then(Value::as_str).unwrap_or_default();
        if command.trim().is_empty() {
            return ValidationOutcome::critical(node.id.clone(), "Command is empty");
        }
        if placeholder_pattern().is_match(command) {
            return ValidationOutcome::critical(node.id.clone(), "Command contains unreplaced placeholders");
        }
        if node.data.get("locked").and_then(Value::as_bool) == Some(true) {
            return ValidationOutcome::critical(node.id.clone(), "Node is locked. Please unlock to proceed.");
        }
        ValidationOutcome::ok()
    }

    async fn execute(&self, ctx: &NodeContext, _payload: NodePayload) -> Result<Value> {
        if self.command.trim().is_empty() {
            return Ok(json!({"status": "error", "stdout": "No command provided"}));
        }

        if self.locked {
            ctx.emit_log("Node is locked. Please unlock to proceed.", true).await;
            return Ok(json!({"status": "error", "stdout": "Node is locked.", "exit_code": 126}));
        }

        let password_to_inject = if self.sudo_lock { ctx.sudo_password.clone() } else { None };
        if self.sudo_lock && password_to_inject.is_none() {
            ctx.emit_log("sudoLock is enabled but no sudo password was supplied for this run.", true).await;
            return Ok(json!({"status": "error", "stdout": "Missing sudo credential.", "exit_code": 126}));
        }

        ctx.emit_log(format!("\r\n\x1b[36m> {}\x1b[0m\r\n", self.command), false).await;

        let (chunk_tx, mut chunk_rx) = tokio::sync::mpsc::channel::<OutputChunk>(64);
        let events = ctx.events.clone();
        let thread_id = ctx.thread_id.clone();
        let node_id = ctx.node_id.clone();
        let forward = tokio::spawn(async move {
            while let Some(chunk) = chunk_rx.recv().await {
                if chunk.text.trim().is_empty() {
                    continue;
                }
                let is_stderr = matches!(chunk.label, StreamLabel::Stderr);
                events.emit_node_log(&thread_id, &node_id, chunk.text, is_stderr).await;
            }
        });

        let outcome = execute_in_pty(
            &self.command,
            password_to_inject.as_deref(),
            ctx.cancel.clone(),
            chunk_tx,
        )
        .await;
        let _ = forward.await;

        match outcome {
            Ok(result) => {
                let status = if result.exit_code == 0 { "success" } else { "error" };
                let final_output = if status == "success" {
                    result.stdout
                } else if !result.stderr.trim().is_empty() {
                    result.stderr
                } else {
                    result.stdout
                };
                Ok(json!({
                    "status": status,
                    "stdout": final_output.trim(),
                    "exit_code": result.exit_code,
                }))
            }
            Err(err) => Ok(json!({"status": "error", "stdout": err.to_string()})),
        }
    }

    fn get_execution_mode(&self) -> ExecutionMode {
        ExecutionMode { requires_pty: true, is_interactive: true }
    }

    fn get_wait_strategy(&self) -> WaitStrategy {
        WaitStrategy::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node_def(data: Value) -> NodeDef {
        NodeDef { id: "cmd1".into(), node_type: "command".into(), data }
    }

    #[test]
    fn validate_rejects_empty_command() {
        let node = CommandNode::new(&node_def(json!({"command": ""})));
        let outcome = node.validate(&node_def(json!({"command": ""})));
        assert!(!outcome.valid);
    }

    #[test]
    fn validate_rejects_unreplaced_placeholder() {
        let def = node_def(json!({"command": "scp <host>:/file ."}));
        let node = CommandNode::new(&def);
        assert!(!node.validate(&def).valid);
    }

    #[test]
    fn validate_rejects_locked_node() {
        let def = node_def(json!({"command": "ls", "locked": true}));
        let node = CommandNode::new(&def);
        assert!(!node.validate(&def).valid);
    }

    #[test]
    fn validate_accepts_plain_command() {
        let def = node_def(json!({"command": "ls -la"}));
        let node = CommandNode::new(&def);
        assert!(node.validate(&def).valid);
    }
}
