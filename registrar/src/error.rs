use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type RaResult<T> = Result<T, RaError>;

#[derive(Debug, Error)]
pub enum RaError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not ready: {0}")]
    NotReady(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for RaError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            RaError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            RaError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            RaError::NotReady(msg) => (StatusCode::CONFLICT, msg.clone()),
            RaError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<anyhow::Error> for RaError {
    fn from(err: anyhow::Error) -> Self {
        RaError::Internal(err.to_string())
    }
}

impl From<cryptocore::errors::CryptoError> for RaError {
    fn from(err: cryptocore::errors::CryptoError) -> Self {
        RaError::InvalidRequest(err.to_string())
    }
}
