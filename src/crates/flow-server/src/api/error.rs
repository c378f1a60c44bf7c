//! API error types and HTTP response conversion.
//!
//! Every domain error maps to a status code and a `{error, message, code}`
//! JSON body, logged via `tracing::error!` before the response goes out so a
//! failure is never silent even if the client disconnects first, following
//! the teacher's `ApiError`/`ApiErrorResponse` split.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
}

impl ApiErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self { error: error.into(), message: message.into(), code: code.into() }
    }
}

/// API result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Domain error surfaced at the HTTP boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("internal server error: {0}")]
    InternalError(String),

    /// Store connectivity failure or similar; mirrors §7's InfrastructureError.
    #[error("store error: {0}")]
    Store(#[from] flow_store::StoreError),

    /// Graph construction/validation/execution failure from `flow-core`.
    #[error("graph error: {0}")]
    Graph(#[from] flow_core::GraphError),

    /// Upstream LLM provider rejected the request (e.g. rate limited);
    /// mapped to a 429 per §7.
    #[error("upstream rate limited: {0}")]
    RateLimited(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Graph(flow_core::GraphError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Graph(flow_core::GraphError::UnknownNodeType(_)) => StatusCode::BAD_REQUEST,
            ApiError::Graph(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Store(_) => "STORE_ERROR",
            ApiError::Graph(_) => "GRAPH_ERROR",
            ApiError::RateLimited(_) => "RATE_LIMITED",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NotFound",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::ValidationError(_) => "ValidationError",
            ApiError::InternalError(_) => "InternalError",
            ApiError::Store(_) => "StoreError",
            ApiError::Graph(_) => "GraphError",
            ApiError::RateLimited(_) => "RateLimited",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiErrorResponse::new(self.error_type(), self.to_string(), self.code());
        tracing::error!(?body, "API error");
        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::NotFound("workflow wf-1".into());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn validation_error_maps_to_400() {
        let err = ApiError::ValidationError("missing prompt".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rate_limited_maps_to_429() {
        let err = ApiError::RateLimited("quota exceeded".into());
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn unknown_node_type_graph_error_maps_to_400() {
        let err = ApiError::Graph(flow_core::GraphError::UnknownNodeType("bogus".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
