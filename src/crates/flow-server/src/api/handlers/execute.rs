//! Execute, cancel, and resume endpoints — the three handlers that actually
//! drive a [`flow_core::GraphExecutor`] run.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use tokio_util::sync::CancellationToken;

use flow_core::{validate_workflow, EventNodeStatus, RunStatus};
use flow_store::StoredStatus;

use crate::api::{
    error::{ApiError, ApiResult},
    models::{CancelResponse, ExecuteRequest, ResumeRequest, RunResponse},
    response,
};
use crate::state::AppState;

fn run_response(thread_id: String, outcome: flow_core::RunOutcome) -> RunResponse {
    let status = match outcome.status {
        RunStatus::Completed => "completed",
        RunStatus::Failed => "failed",
        RunStatus::Cancelled => "cancelled",
    };
    RunResponse {
        thread_id,
        status: status.to_string(),
        results: outcome.results,
        errors: outcome.errors.iter().map(Into::into).collect(),
    }
}

/// `POST /api/v1/workflow/execute` — validate, then run to completion (or
/// until cancelled). The graph is rejected with `400` before a single node
/// is scheduled if strict validation finds a critical error.
pub async fn execute_workflow(
    State(state): State<AppState>,
    Json(req): Json<ExecuteRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    validate_workflow(&req.graph, &state.registry)?;

    let thread_id = uuid::Uuid::new_v4().to_string();
    let sudo_password = req.resolved_sudo_password();
    let token = CancellationToken::new();
    state.register_run(thread_id.clone(), token.clone());

    let executor = state.executor();
    let outcome = executor
        .run(&thread_id, &req.graph, HashMap::new(), sudo_password, token)
        .await;
    state.remove_run(&thread_id);

    let outcome = outcome?;
    tracing::info!(%thread_id, status = ?outcome.status, "run finished");
    Ok(response::ok(run_response(thread_id, outcome)))
}

/// `POST /api/v1/workflow/cancel/{thread_id}` — idempotent: cancelling a
/// thread that isn't running (or already finished) reports `ignored` rather
/// than erroring.
pub async fn cancel_workflow(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> impl axum::response::IntoResponse {
    let status = if state.cancel_run(&thread_id) { "success" } else { "ignored" };
    response::ok(CancelResponse { status })
}

/// `POST /api/v1/workflow/resume/{thread_id}` — rehydrate a previously
/// completed/failed run's resumable results and continue from there against
/// the original workflow definition.
pub async fn resume_workflow(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    Json(req): Json<ResumeRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let record = state
        .store
        .get_workflow(&req.workflow_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("workflow {}", req.workflow_id)))?;
    let graph: flow_core::GraphDefinition = serde_json::from_value(record.definition)?;

    let run_record = state.store.read_run(&thread_id).await?;
    let initial_state: HashMap<String, serde_json::Value> = run_record
        .map(|r| r.results)
        .unwrap_or_default()
        .into_iter()
        .filter(|(_, result)| result.status.is_resumable())
        .map(|(node_id, result)| (node_id, result.data))
        .collect();

    state.events.emit_node_status(&thread_id, "system", EventNodeStatus::Resuming).await;

    let sudo_password = req.secrets.and_then(|s| s.sudo_password);
    let token = CancellationToken::new();
    state.register_run(thread_id.clone(), token.clone());

    let executor = state.executor();
    let outcome = executor.run(&thread_id, &graph, initial_state, sudo_password, token).await;
    state.remove_run(&thread_id);

    let outcome = outcome?;
    tracing::info!(%thread_id, status = ?outcome.status, "resumed run finished");
    Ok(response::ok(run_response(thread_id, outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::{EventBus, GraphDefinition, NodeDef, NodeRegistry};
    use flow_store::{InMemoryRunStore, WorkflowRecord};
    use flow_toolkit::config::RunSettings;
    use std::sync::Arc;
    use std::time::Duration;

    fn blank_state() -> AppState {
        AppState::new(
            Arc::new(NodeRegistry::new()),
            Arc::new(InMemoryRunStore::new(Duration::from_secs(86_400))),
            Arc::new(EventBus::new(16)),
            Arc::new(RunSettings::default()),
            "test-host",
        )
    }

    #[tokio::test]
    async fn execute_with_no_start_node_is_bad_request() {
        let state = blank_state();
        let req = ExecuteRequest { graph: GraphDefinition::default(), sudo_password: None };
        let err = execute_workflow(State(state), Json(req)).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cancel_unknown_thread_is_ignored_not_error() {
        let state = blank_state();
        let resp = cancel_workflow(State(state), Path("nope".into())).await;
        let _ = resp;
    }

    #[tokio::test]
    async fn resume_missing_workflow_is_404() {
        let state = blank_state();
        let req = ResumeRequest { workflow_id: "missing".into(), secrets: None };
        let err = resume_workflow(State(state), Path("t1".into()), Json(req)).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn resume_existing_workflow_with_no_start_node_fails() {
        let state = blank_state();
        let node = NodeDef { id: "n1".into(), node_type: "noop".into(), data: serde_json::json!({}) };
        let graph = GraphDefinition { nodes: vec![node], edges: vec![], secrets: Default::default() };
        state
            .store
            .put_workflow(WorkflowRecord {
                id: "wf-1".into(),
                name: "demo".into(),
                definition: serde_json::to_value(&graph).unwrap(),
            })
            .await
            .unwrap();
        let req = ResumeRequest { workflow_id: "wf-1".into(), secrets: None };
        let result = resume_workflow(State(state), Path("t1".into()), Json(req)).await;
        assert!(result.is_err(), "unregistered node type should fail at build time");
    }
}
