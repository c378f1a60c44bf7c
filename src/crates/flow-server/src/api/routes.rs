//! Router assembly: binds every handler in [`crate::api::handlers`] and
//! [`crate::api::ws`] to its path, and layers on CORS plus request tracing.

use axum::routing::{get, post};
use axum::Router;

use crate::api::{handlers, middleware, ws};
use crate::state::AppState;

/// Build the complete API router over a shared [`AppState`].
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/system-info", get(handlers::system_info))
        .route("/workflow/validate", post(handlers::validate_workflow))
        .route(
            "/workflows",
            post(handlers::create_workflow).get(handlers::list_workflows),
        )
        .route(
            "/workflows/:id",
            get(handlers::get_workflow).delete(handlers::delete_workflow),
        )
        .route("/api/v1/workflow/execute", post(handlers::execute_workflow))
        .route("/api/v1/workflow/cancel/:thread_id", post(handlers::cancel_workflow))
        .route("/api/v1/workflow/resume/:thread_id", post(handlers::resume_workflow))
        .route("/ws/workflow", get(ws::workflow_handler))
        .route("/ws/terminal", get(ws::terminal_handler))
        .route("/ws", get(ws::keepalive_handler))
        .layer(middleware::cors_layer())
        .layer(middleware::logging_layer())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
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
    async fn router_builds_and_serves_health() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let router = create_router(blank_state());
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
