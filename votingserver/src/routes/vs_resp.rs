//! Fire-and-forget notification from BB once group parameters have landed
//! (§4.1); publishes VS's own public key in response.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::VsResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/vs_resp", get(vs_resp))
}

async fn vs_resp(State(state): State<AppState>) -> VsResult<Json<serde_json::Value>> {
    state
        .http
        .post(format!("{}/receive-public-key", state.config.bb_api_url))
        .json(&serde_json::json!({ "service": "voting_server", "key": state.public_key }))
        .send()
        .await?
        .error_for_status()?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
