use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type VsResult<T> = Result<T, VsError>;

#[derive(Debug, Error)]
pub enum VsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not accepting ballots right now: {0}")]
    NotReady(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for VsError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            VsError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            VsError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            VsError::NotReady(msg) => (StatusCode::CONFLICT, msg.clone()),
            VsError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<anyhow::Error> for VsError {
    fn from(err: anyhow::Error) -> Self {
        VsError::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for VsError {
    fn from(err: reqwest::Error) -> Self {
        VsError::Internal(err.to_string())
    }
}

impl From<cryptocore::errors::CryptoError> for VsError {
    fn from(err: cryptocore::errors::CryptoError) -> Self {
        VsError::InvalidRequest(err.to_string())
    }
}
