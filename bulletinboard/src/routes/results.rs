//! Election result publication and retrieval.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use cryptocore::model::ElectionResult;
use serde::Deserialize;

use crate::error::{BbError, BbResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/receive-election-result", post(receive_election_result))
        .route("/election-result", get(election_result))
}

async fn receive_election_result(State(state): State<AppState>, Json(result): Json<ElectionResult>) -> BbResult<Json<serde_json::Value>> {
    state.store.write().await.receive_election_result(result);
    state.persist().await;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Deserialize)]
pub struct ElectionIdQuery {
    election_id: String,
}

/// 404 when unavailable, per spec §6 -- a not-yet-tallied election is a
/// state error (§7e), not a validation failure.
async fn election_result(State(state): State<AppState>, Query(q): Query<ElectionIdQuery>) -> BbResult<Json<ElectionResult>> {
    state
        .store
        .read()
        .await
        .election_result(&q.election_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| BbError::NotFound(format!("no result for election {}", q.election_id)))
}
