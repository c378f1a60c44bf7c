//! System information and pre-flight validation handlers.

use axum::extract::State;
use axum::Json;

use flow_core::validate_graph;

use crate::api::{error::ApiResult, models::SystemInfoResponse, response};
use crate::state::AppState;

/// `GET /system-info`
pub async fn system_info(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let node_types = state
        .registry
        .list_nodes()
        .into_iter()
        .map(|info| info.type_key)
        .collect();
    response::ok(SystemInfoResponse {
        fingerprint: state.system_fingerprint.clone(),
        version: crate::version::VERSION.to_string(),
        node_types,
    })
}

/// `POST /workflow/validate`
///
/// Pre-flight only: never fails the request even when every node is
/// invalid, per the lenient contract [`flow_core::validate_graph`] exposes.
pub async fn validate_workflow(
    State(state): State<AppState>,
    Json(graph): Json<flow_core::GraphDefinition>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let validation = validate_graph(&graph, &state.registry);
    Ok(response::ok(validation))
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
    async fn system_info_reports_fingerprint() {
        let resp = system_info(State(blank_state())).await.into_response();
        assert_eq!(resp.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn validate_missing_start_node_reports_error_not_failure() {
        let graph = flow_core::GraphDefinition::default();
        let resp = validate_workflow(State(blank_state()), Json(graph)).await;
        assert!(resp.is_ok());
    }
}
