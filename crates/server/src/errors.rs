use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Plain-text error response. The body is exactly `message`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, message) }
    pub fn not_found() -> Self { Self::new(StatusCode::NOT_FOUND, "Item not found") }
    pub fn conflict() -> Self { Self::new(StatusCode::CONFLICT, "Item already exists") }
    pub fn internal() -> Self { Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error") }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("cannot open record store: {0}")]
    Storage(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
