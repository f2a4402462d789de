use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type TsResult<T> = Result<T, TsError>;

#[derive(Debug, Error)]
pub enum TsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for TsError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            TsError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            TsError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            TsError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<anyhow::Error> for TsError {
    fn from(err: anyhow::Error) -> Self {
        TsError::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for TsError {
    fn from(err: reqwest::Error) -> Self {
        TsError::Internal(err.to_string())
    }
}

impl From<cryptocore::errors::CryptoError> for TsError {
    fn from(err: cryptocore::errors::CryptoError) -> Self {
        TsError::InvalidRequest(err.to_string())
    }
}
