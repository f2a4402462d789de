//! HTTP-facing error type for the Bulletin Board, following
//! `mef-api::error::ApiError`'s pattern of one `thiserror` enum implementing
//! `IntoResponse` directly, mapped to the 4xx/5xx/404 split in spec §7.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type BbResult<T> = Result<T, BbError>;

#[derive(Debug, Error)]
pub enum BbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for BbError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            BbError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            BbError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            BbError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<cryptocore::errors::CryptoError> for BbError {
    fn from(err: cryptocore::errors::CryptoError) -> Self {
        BbError::InvalidRequest(err.to_string())
    }
}

impl From<anyhow::Error> for BbError {
    fn from(err: anyhow::Error) -> Self {
        BbError::Internal(err.to_string())
    }
}
