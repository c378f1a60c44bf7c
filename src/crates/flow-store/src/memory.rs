//! In-memory run store for development, testing, and the single-process default
//!
//! [`InMemoryRunStore`] implements [`RunStore`] over three `Arc<RwLock<HashMap>>`
//! tables, one per collection. It has no persistence across process restarts and
//! is the store `flow-server` wires up unless a networked backend is configured.

use crate::error::Result;
use crate::record::{MemoryRecord, NodeResult, RunRecord, WorkflowRecord, WorkflowSummary};
use crate::store::RunStore;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;

type WorkflowTable = Arc<RwLock<HashMap<String, WorkflowRecord>>>;
type RunTable = Arc<RwLock<HashMap<String, RunRecord>>>;
type MemoryTable = Arc<RwLock<HashMap<(String, String), MemoryRecord>>>;

/// Thread-safe, process-local implementation of [`RunStore`].
#[derive(Clone)]
pub struct InMemoryRunStore {
    workflows: WorkflowTable,
    runs: RunTable,
    memories: MemoryTable,
    memory_ttl: Duration,
}

impl InMemoryRunStore {
    /// Build an empty store with the given memory TTL (see
    /// [`crate::record::MemoryRecord::is_expired`]).
    pub fn new(memory_ttl: Duration) -> Self {
        Self {
            workflows: Arc::new(RwLock::new(HashMap::new())),
            runs: Arc::new(RwLock::new(HashMap::new())),
            memories: Arc::new(RwLock::new(HashMap::new())),
            memory_ttl,
        }
    }

    /// Drop everything. Intended for test isolation between cases that share
    /// a store instance.
    pub async fn clear(&self) {
        self.workflows.write().await.clear();
        self.runs.write().await.clear();
        self.memories.write().await.clear();
    }

    pub async fn workflow_count(&self) -> usize {
        self.workflows.read().await.len()
    }

    pub async fn run_count(&self) -> usize {
        self.runs.read().await.len()
    }
}

/// Default memory TTL (24h) used when a store is built without an explicit
/// override; `flow-toolkit`'s `RunSettings::memory_ttl` is the configured
/// source of truth in `flow-server`.
const DEFAULT_MEMORY_TTL_SECS: u64 = 86_400;

impl Default for InMemoryRunStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_MEMORY_TTL_SECS))
    }
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn put_workflow(&self, record: WorkflowRecord) -> Result<()> {
        self.workflows
            .write()
            .await
            .insert(record.id.clone(), record);
        Ok(())
    }

    async fn get_workflow(&self, id: &str) -> Result<Option<WorkflowRecord>> {
        Ok(self.workflows.read().await.get(id).cloned())
    }

    async fn list_workflows(&self) -> Result<Vec<WorkflowSummary>> {
        Ok(self
            .workflows
            .read()
            .await
            .values()
            .map(WorkflowSummary::from)
            .collect())
    }

    async fn delete_workflow(&self, id: &str) -> Result<bool> {
        Ok(self.workflows.write().await.remove(id).is_some())
    }

    async fn put_node_result(
        &self,
        thread_id: &str,
        node_id: &str,
        result: NodeResult,
    ) -> Result<()> {
        let mut runs = self.runs.write().await;
        let run = runs.entry(thread_id.to_string()).or_insert_with(|| RunRecord {
            thread_id: thread_id.to_string(),
            workflow_id: None,
            results: HashMap::new(),
        });
        run.results.insert(node_id.to_string(), result);
        Ok(())
    }

    async fn read_run(&self, thread_id: &str) -> Result<Option<RunRecord>> {
        Ok(self.runs.read().await.get(thread_id).cloned())
    }

    async fn read_memory(&self, thread_id: &str, node_id: &str, limit: usize) -> Result<Vec<Value>> {
        let key = (thread_id.to_string(), node_id.to_string());
        let memories = self.memories.read().await;
        let Some(record) = memories.get(&key) else {
            return Ok(Vec::new());
        };
        if record.is_expired(self.memory_ttl, SystemTime::now()) {
            return Ok(Vec::new());
        }
        let start = record.entries.len().saturating_sub(limit);
        Ok(record.entries[start..].to_vec())
    }

    async fn append_memory(&self, thread_id: &str, node_id: &str, entry: Value) -> Result<()> {
        let key = (thread_id.to_string(), node_id.to_string());
        let mut memories = self.memories.write().await;
        let record = memories.entry(key).or_insert_with(|| MemoryRecord {
            thread_id: thread_id.to_string(),
            node_id: node_id.to_string(),
            entries: Vec::new(),
            last_updated: SystemTime::now(),
        });
        record.entries.push(entry);
        record.last_updated = SystemTime::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::StoredStatus;
    use serde_json::json;

    fn store() -> InMemoryRunStore {
        InMemoryRunStore::new(Duration::from_secs(86_400))
    }

    #[tokio::test]
    async fn put_and_get_workflow_round_trips() {
        let s = store();
        s.put_workflow(WorkflowRecord {
            id: "wf-1".into(),
            name: "Example".into(),
            definition: json!({"nodes": []}),
        })
        .await
        .unwrap();

        let fetched = s.get_workflow("wf-1").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Example");
        assert_eq!(s.list_workflows().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_workflow_reports_whether_it_existed() {
        let s = store();
        assert!(!s.delete_workflow("missing").await.unwrap());
        s.put_workflow(WorkflowRecord {
            id: "wf-1".into(),
            name: "Example".into(),
            definition: json!({}),
        })
        .await
        .unwrap();
        assert!(s.delete_workflow("wf-1").await.unwrap());
        assert!(s.get_workflow("wf-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn node_results_accumulate_under_one_thread_id() {
        let s = store();
        s.put_node_result(
            "thread-1",
            "node-a",
            NodeResult {
                status: StoredStatus::Completed,
                timestamp: "2026-01-01T00:00:00Z".into(),
                data: json!({"ok": true}),
            },
        )
        .await
        .unwrap();
        s.put_node_result(
            "thread-1",
            "node-b",
            NodeResult {
                status: StoredStatus::Failed,
                timestamp: "2026-01-01T00:00:01Z".into(),
                data: json!({"error": "boom"}),
            },
        )
        .await
        .unwrap();

        let run = s.read_run("thread-1").await.unwrap().unwrap();
        assert_eq!(run.results.len(), 2);
        assert!(run.results["node-a"].status.is_resumable());
        assert!(!run.results["node-b"].status.is_resumable());
    }

    #[tokio::test]
    async fn memory_respects_limit_and_ttl() {
        let s = InMemoryRunStore::new(Duration::from_millis(10));
        s.append_memory("t1", "agent", json!("first")).await.unwrap();
        s.append_memory("t1", "agent", json!("second")).await.unwrap();
        let recent = s.read_memory("t1", "agent", 1).await.unwrap();
        assert_eq!(recent, vec![json!("second")]);

        tokio::time::sleep(Duration::from_millis(30)).await;
        let expired = s.read_memory("t1", "agent", 10).await.unwrap();
        assert!(expired.is_empty());
    }

    #[tokio::test]
    async fn clear_empties_every_table() {
        let s = store();
        s.put_workflow(WorkflowRecord {
            id: "wf-1".into(),
            name: "Example".into(),
            definition: json!({}),
        })
        .await
        .unwrap();
        s.append_memory("t1", "agent", json!("entry")).await.unwrap();
        s.clear().await;
        assert_eq!(s.workflow_count().await, 0);
        assert!(s.read_memory("t1", "agent", 10).await.unwrap().is_empty());
    }
}
