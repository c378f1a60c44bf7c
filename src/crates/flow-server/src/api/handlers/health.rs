//! Liveness probe.

use crate::api::{models::HealthResponse, response};

/// `GET /health`
pub async fn health() -> impl axum::response::IntoResponse {
    response::ok(HealthResponse::new("ok"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn health_reports_ok() {
        let resp = health().await.into_response();
        assert_eq!(resp.status(), axum::http::StatusCode::OK);
    }
}
