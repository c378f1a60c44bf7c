//! HTTP/WebSocket API layer: workflow CRUD, validation, execution, and the
//! event and terminal sockets.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod ws;

pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use middleware::cors_layer;
pub use routes::create_router;
