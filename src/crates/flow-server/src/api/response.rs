//! Convenience wrappers for consistent JSON responses with the right status
//! code, following the teacher's `response::ok`/`response::created` helpers.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Create a 200 OK JSON response.
pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(data))
}

/// Create a 201 Created JSON response.
pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(data))
}

/// Create a 204 No Content response.
pub fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::Response;

    #[derive(Serialize)]
    struct Payload {
        id: u32,
    }

    #[tokio::test]
    async fn ok_uses_200() {
        let resp: Response = ok(Payload { id: 1 }).into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn created_uses_201() {
        let resp: Response = created(Payload { id: 1 }).into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
}
