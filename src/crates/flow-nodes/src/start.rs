//! Start node: the conventional trigger. Always succeeds immediately.

use async_trait::async_trait;
use serde_json::{json, Value};

use flow_core::error::Result;
use flow_core::model::NodeDef;
use flow_core::node::{Node, NodeContext, NodePayload};

pub struct StartNode;

impl StartNode {
    pub fn new(_node: &NodeDef) -> Self {
        Self
    }
}

#[async_trait]
impl Node for StartNode {
    async fn execute(&self, _ctx: &NodeContext, payload: NodePayload) -> Result<Value> {
        Ok(json!({"status": "success", "output": payload.data}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_succeeds() {
        let node = StartNode;
        let ctx = crate::test_support::blank_ctx("t1", "start");
        let result = node.execute(&ctx, NodePayload::default()).await.unwrap();
        assert_eq!(result["status"], "success");
    }
}
