//! Document shapes held by the three logical collections a [`RunStore`](crate::RunStore)
//! exposes: workflow definitions, per-run result snapshots, and ReAct agent memory slices.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, SystemTime};

/// A stored graph definition, keyed by `id`.
///
/// `definition` is kept as an opaque JSON value here rather than the strongly
/// typed graph model: the store has no business parsing or validating graphs,
/// only persisting whatever `flow-core` hands it and returning it unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub id: String,
    pub name: String,
    pub definition: Value,
}

/// Lightweight projection of a [`WorkflowRecord`] for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
}

impl From<&WorkflowRecord> for WorkflowSummary {
    fn from(record: &WorkflowRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
        }
    }
}

/// Status of a single node's result within a run, as recorded in the store.
///
/// This intentionally mirrors only the subset of execution statuses that are
/// meaningful to persist and later resume from; transient states like
/// `running` never reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredStatus {
    Completed,
    Success,
    Failed,
    Skipped,
    Cancelled,
}

impl StoredStatus {
    /// Whether a resume read should treat this entry as usable input.
    ///
    /// Failed entries are intentionally excluded: resume is expected to
    /// retry them rather than replay a stale failure.
    pub fn is_resumable(self) -> bool {
        matches!(self, StoredStatus::Completed | StoredStatus::Success)
    }
}

/// One node's recorded result within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResult {
    pub status: StoredStatus,
    pub timestamp: String,
    pub data: Value,
}

/// A run's accumulated per-node results, keyed by `thread_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunRecord {
    pub thread_id: String,
    pub workflow_id: Option<String>,
    pub results: std::collections::HashMap<String, NodeResult>,
}

/// A ReAct agent memory slice, keyed by `(thread_id, node_id)`.
///
/// `last_updated` drives TTL eviction: entries older than the configured
/// TTL are treated as absent by [`RunStore::read_memory`](crate::RunStore::read_memory)
/// even if still physically present in the backing store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub thread_id: String,
    pub node_id: String,
    pub entries: Vec<Value>,
    #[serde(with = "system_time_secs")]
    pub last_updated: SystemTime,
}

impl MemoryRecord {
    pub fn is_expired(&self, ttl: Duration, now: SystemTime) -> bool {
        now.duration_since(self.last_updated)
            .map(|age| age > ttl)
            .unwrap_or(false)
    }
}

mod system_time_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S: Serializer>(value: &SystemTime, s: S) -> Result<S::Ok, S::Error> {
        let secs = value
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        secs.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SystemTime, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(UNIX_EPOCH + Duration::from_secs(secs))
    }
}
