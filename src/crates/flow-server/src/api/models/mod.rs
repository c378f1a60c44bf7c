//! Request/response DTOs for the HTTP surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use flow_store::{WorkflowRecord, WorkflowSummary};

/// `GET /health` response, following the teacher's health-check convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self { status: status.into(), version: crate::version::VERSION.to_string() }
    }
}

/// Body of `POST /workflows`. `id` absent means insert-and-stamp; present
/// means upsert by that id.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRequest {
    pub id: Option<String>,
    pub name: String,
    pub data: Value,
}

/// A stored workflow as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResponse {
    pub id: String,
    pub name: String,
    pub data: Value,
}

impl From<WorkflowRecord> for WorkflowResponse {
    fn from(record: WorkflowRecord) -> Self {
        Self { id: record.id, name: record.name, data: record.definition }
    }
}

/// Lightweight workflow listing entry.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSummaryResponse {
    pub id: String,
    pub name: String,
}

impl From<WorkflowSummary> for WorkflowSummaryResponse {
    fn from(summary: WorkflowSummary) -> Self {
        Self { id: summary.id, name: summary.name }
    }
}

/// `GET /system-info` response: host fingerprint plus the node type keys a
/// workflow author can use.
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfoResponse {
    pub fingerprint: String,
    pub version: String,
    pub node_types: Vec<String>,
}

/// Body of `POST /api/v1/workflow/execute`: the graph plus an optional
/// top-level `sudo_password`, which the original surface accepts as a
/// convenience alongside the nested `secrets.sudo_password`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteRequest {
    #[serde(flatten)]
    pub graph: flow_core::GraphDefinition,
    pub sudo_password: Option<String>,
}

impl ExecuteRequest {
    /// Resolve the effective sudo password: a top-level field wins over one
    /// nested under `secrets`.
    pub fn resolved_sudo_password(&self) -> Option<String> {
        self.sudo_password.clone().or_else(|| self.graph.secrets.sudo_password.clone())
    }
}

/// Response shape shared by execute and resume.
#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub thread_id: String,
    pub status: String,
    pub results: std::collections::HashMap<String, Value>,
    pub errors: Vec<ErrorEntry>,
}

/// JSON-friendly projection of a [`flow_core::RunError`].
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEntry {
    pub node_id: String,
    pub error: String,
}

impl From<&flow_core::RunError> for ErrorEntry {
    fn from(err: &flow_core::RunError) -> Self {
        Self { node_id: err.node_id.clone(), error: err.error.clone() }
    }
}

/// Body of `POST /api/v1/workflow/resume/{thread_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResumeRequest {
    #[serde(rename = "workflowId")]
    pub workflow_id: String,
    pub secrets: Option<flow_core::Secrets>,
}

/// `POST /api/v1/workflow/cancel/{thread_id}` response.
#[derive(Debug, Clone, Serialize)]
pub struct CancelResponse {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_request_prefers_top_level_password() {
        let req: ExecuteRequest = serde_json::from_value(serde_json::json!({
            "nodes": [],
            "edges": [],
            "sudo_password": "top-level",
            "secrets": {"sudo_password": "nested"},
        }))
        .unwrap();
        assert_eq!(req.resolved_sudo_password(), Some("top-level".to_string()));
    }

    #[test]
    fn execute_request_falls_back_to_nested_password() {
        let req: ExecuteRequest = serde_json::from_value(serde_json::json!({
            "nodes": [],
            "edges": [],
            "secrets": {"sudo_password": "nested"},
        }))
        .unwrap();
        assert_eq!(req.resolved_sudo_password(), Some("nested".to_string()));
    }

    #[test]
    fn health_response_reports_ok() {
        let health = HealthResponse::new("ok");
        assert_eq!(health.status, "ok");
        assert!(!health.version.is_empty());
    }
}
