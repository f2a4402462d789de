//! Liveness check, added beyond spec.md's endpoint list per SPEC_FULL.md's
//! ambient-stack notes, following `mef-api::routes::health`.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "bulletinboard" }))
}
