//! Fire-and-forget notification from BB once group parameters have landed
//! (§4.1); publishes TS's own public key in response, same pattern as
//! `votingserver::routes::vs_resp`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::TsResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/ts_resp", get(ts_resp))
}

async fn ts_resp(State(state): State<AppState>) -> TsResult<Json<serde_json::Value>> {
    state
        .http
        .post(format!("{}/receive-public-key", state.config.bb_api_url))
        .json(&serde_json::json!({ "service": "tallying_server", "key": state.public_key }))
        .send()
        .await?
        .error_for_status()?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
