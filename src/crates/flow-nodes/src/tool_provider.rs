//! Tool-provider nodes: Shell, Restart, Stop.
//!
//! Each executes trivially to a `TOOL_DEF` capability grant; wiring an edge
//! from one of these into a ReAct Agent node is how a workflow author grants
//! that agent permission to call the named tool. Grounded on
//! `original_source/plugins/{ShellTool,RestartTool,StopTool}/backend/node.py`.

use async_trait::async_trait;
use serde_json::{json, Value};

use flow_core::error::Result;
use flow_core::model::NodeDef;
use flow_core::node::{Node, NodeContext, NodePayload};

fn tool_def_result(definition: Value) -> Value {
    json!({
        "status": "success",
        "output": {
            "type": "TOOL_DEF",
            "definition": definition,
        },
    })
}

pub struct ShellToolNode;

impl ShellToolNode {
    pub fn new(_node: &NodeDef) -> Self {
        Self
    }
}

#[async_trait]
impl Node for ShellToolNode {
    async fn execute(&self, _ctx: &NodeContext, _payload: NodePayload) -> Result<Value> {
        Ok(tool_def_result(json!({
            "name": "run_shell",
            "description": "Execute a shell command on the host system. Use this to inspect files, run scripts, or manage services.",
            "parameters": "{\"command\": \"string\"}",
        })))
    }
}

pub struct RestartToolNode;

impl RestartToolNode {
    pub fn new(_node: &NodeDef) -> Self {
        Self
    }
}

#[async_trait]
impl Node for RestartToolNode {
    async fn execute(&self, _ctx: &NodeContext, _payload: NodePayload) -> Result<Value> {
        Ok(tool_def_result(json!({
            "name": "restart_workflow",
            "description": "Restarts the entire workflow. Use to retry after a temporary failure or state fix.",
            "parameters": "ignore (string)",
        })))
    }
}

pub struct StopToolNode;

impl StopToolNode {
    pub fn new(_node: &NodeDef) -> Self {
        Self
    }
}

#[async_trait]
impl Node for StopToolNode {
    async fn execute(&self, _ctx: &NodeContext, _payload: NodePayload) -> Result<Value> {
        Ok(tool_def_result(json!({
            "name": "stop_workflow",
            "description": "Permanently stops the workflow. Use when a critical, unrecoverable error occurs.",
            "parameters": "reason (string)",
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shell_tool_advertises_run_shell() {
        let node = ShellToolNode;
        let ctx = crate::test_support::blank_ctx("t1", "shell");
        let result = node.execute(&ctx, NodePayload::default()).await.unwrap();
        assert_eq!(result["output"]["type"], "TOOL_DEF");
        assert_eq!(result["output"]["definition"]["name"], "run_shell");
    }

    #[tokio::test]
    async fn restart_tool_advertises_restart_workflow() {
        let node = RestartToolNode;
        let ctx = crate::test_support::blank_ctx("t1", "restart");
        let result = node.execute(&ctx, NodePayload::default()).await.unwrap();
        assert_eq!(result["output"]["definition"]["name"], "restart_workflow");
    }

    #[tokio::test]
    async fn stop_tool_advertises_stop_workflow() {
        let node = StopToolNode;
        let ctx = crate::test_support::blank_ctx("t1", "stop");
        let result = node.execute(&ctx, NodePayload::default()).await.unwrap();
        assert_eq!(result["output"]["definition"]["name"], "stop_workflow");
    }
}
