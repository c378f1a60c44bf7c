//! OR-Merge (discriminator) node: fires on the first valid branch to arrive.
//!
//! Grounded on `original_source/plugins/ORMergeNode/backend/node.py`. The
//! `ANY` wait strategy means the executor has already guaranteed `inputs`
//! holds at most the surviving non-skip deliveries by the time this runs;
//! this node just relabels the winner as its own success payload.

use async_trait::async_trait;
use serde_json::{json, Value};

use flow_core::error::Result;
use flow_core::model::NodeDef;
use flow_core::node::{Node, NodeContext, NodePayload, WaitStrategy};

pub struct OrMergeNode;

impl OrMergeNode {
    pub fn new(_node: &NodeDef) -> Self {
        Self
    }
}

#[async_trait]
impl Node for OrMergeNode {
    async fn execute(&self, _ctx: &NodeContext, payload: NodePayload) -> Result<Value> {
        let winner = payload.inputs.iter().next();
        let (winner_id, winner_data) = match winner {
            Some((id, data)) => (id.clone(), data.clone()),
            None => ("unknown".to_string(), Value::Object(Default::default())),
        };
        Ok(json!({
            "status": "success",
            "output": winner_data,
            "_merged_from": winner_id,
        }))
    }

    fn get_wait_strategy(&self) -> WaitStrategy {
        WaitStrategy::Any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn relabels_first_input_as_winner() {
        let node = OrMergeNode;
        let ctx = crate::test_support::blank_ctx("t1", "merge");
        let mut inputs = HashMap::new();
        inputs.insert("branch-a".to_string(), json!({"status": "success", "value": 1}));
        let payload = NodePayload { data: Value::Null, inputs };
        let result = node.execute(&ctx, payload).await.unwrap();
        assert_eq!(result["_merged_from"], "branch-a");
        assert_eq!(result["output"]["value"], 1);
    }

    #[tokio::test]
    async fn empty_inputs_merge_as_unknown() {
        let node = OrMergeNode;
        let ctx = crate::test_support::blank_ctx("t1", "merge");
        let result = node.execute(&ctx, NodePayload::default()).await.unwrap();
        assert_eq!(result["_merged_from"], "unknown");
    }
}
