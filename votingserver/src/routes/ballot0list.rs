use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use cryptocore::ballot::Ballot;
use serde::Deserialize;

use crate::error::VsResult;
use crate::scheduler;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/ballot0list", post(ballot0list))
}

#[derive(Deserialize)]
pub struct Ballot0ListBody {
    election_id: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    ballots: Vec<Ballot>,
}

/// RA's step 6: one `B0` per voter, to be scheduled and posted (§4.3).
/// Runs the (potentially slow, per-voter) scheduling work in the background
/// so RA's bootstrap call returns promptly.
async fn ballot0list(State(state): State<AppState>, Json(body): Json<Ballot0ListBody>) -> VsResult<Json<serde_json::Value>> {
    state.election_windows.write().await.insert(body.election_id.clone(), (body.start, body.end));
    let count = body.ballots.len();
    tokio::spawn(scheduler::on_ballot0_batch(state, body.election_id, body.start, body.end, body.ballots));
    Ok(Json(serde_json::json!({ "ok": true, "scheduled": count })))
}
