//! Vault / config-type node: purely editor state, filtered out of real runs
//! by `flow_core::validator::filter_executable`. Executes as a defensive
//! no-op success if a run ever does reach it directly.
//!
//! Grounded on `original_source/plugins/VaultNode/backend/node.py`.

use async_trait::async_trait;
use serde_json::{json, Value};

use flow_core::error::Result;
use flow_core::model::NodeDef;
use flow_core::node::{Node, NodeContext, NodePayload};

pub struct VaultNode;

impl VaultNode {
    pub fn new(_node: &NodeDef) -> Self {
        Self
    }
}

#[async_trait]
impl Node for VaultNode {
    async fn execute(&self, _ctx: &NodeContext, _payload: NodePayload) -> Result<Value> {
        Ok(json!({"status": "success", "message": "Vault configuration loaded."}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn executes_as_no_op_success() {
        let node = VaultNode;
        let ctx = crate::test_support::blank_ctx("t1", "vault");
        let result = node.execute(&ctx, NodePayload::default()).await.unwrap();
        assert_eq!(result["status"], "success");
    }
}
