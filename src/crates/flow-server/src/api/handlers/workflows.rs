//! Workflow CRUD endpoint handlers, backed by [`flow_store::RunStore`].

use axum::{extract::{Path, State}, http::StatusCode, Json};

use flow_store::WorkflowRecord;

use crate::api::{
    error::{ApiError, ApiResult},
    models::{WorkflowRequest, WorkflowResponse, WorkflowSummaryResponse},
    response,
};
use crate::state::AppState;

/// `POST /workflows` — upsert by `id` when present, else insert and stamp
/// a freshly generated id.
pub async fn create_workflow(
    State(state): State<AppState>,
    Json(req): Json<WorkflowRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let id = req.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let record = WorkflowRecord { id: id.clone(), name: req.name, definition: req.data };
    state.store.put_workflow(record.clone()).await?;
    tracing::info!(workflow_id = %id, "stored workflow");
    Ok((StatusCode::CREATED, Json(WorkflowResponse::from(record))))
}

/// `GET /workflows` — summaries only.
pub async fn list_workflows(State(state): State<AppState>) -> ApiResult<impl axum::response::IntoResponse> {
    let summaries = state.store.list_workflows().await?;
    let responses: Vec<WorkflowSummaryResponse> = summaries.into_iter().map(Into::into).collect();
    Ok(response::ok(responses))
}

/// `GET /workflows/{id}`
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let record = state
        .store
        .get_workflow(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("workflow {id}")))?;
    Ok(response::ok(WorkflowResponse::from(record)))
}

/// `DELETE /workflows/{id}`
pub async fn delete_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let deleted = state.store.delete_workflow(&id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("workflow {id}")));
    }
    tracing::info!(workflow_id = %id, "deleted workflow");
    Ok(response::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use flow_core::{EventBus, NodeRegistry};
    use flow_store::InMemoryRunStore;
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
    async fn create_then_get_round_trips() {
        let state = blank_state();
        let req = WorkflowRequest { id: None, name: "demo".into(), data: serde_json::json!({"nodes": []}) };
        let created = create_workflow(State(state.clone()), Json(req)).await.unwrap().into_response();
        assert_eq!(created.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn get_missing_workflow_is_404() {
        let state = blank_state();
        let err = get_workflow(State(state), Path("nope".into())).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_missing_workflow_is_404() {
        let state = blank_state();
        let err = delete_workflow(State(state), Path("nope".into())).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_reflects_stored_workflows() {
        let state = blank_state();
        let req = WorkflowRequest { id: Some("wf-1".into()), name: "demo".into(), data: serde_json::json!({}) };
        create_workflow(State(state.clone()), Json(req)).await.unwrap();
        let resp = list_workflows(State(state)).await;
        assert!(resp.is_ok());
    }
}
