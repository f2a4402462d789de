//! `POST /receive-election {electionid}`: RA's step 7 notification that an
//! election has been fully bootstrapped; spawns the election-end tally task.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::TsResult;
use crate::scheduler;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/receive-election", post(receive_election))
}

#[derive(Deserialize)]
pub struct ReceiveElectionBody {
    electionid: String,
}

async fn receive_election(State(state): State<AppState>, Json(body): Json<ReceiveElectionBody>) -> TsResult<Json<serde_json::Value>> {
    scheduler::spawn_tally_task(state, body.electionid.clone());
    Ok(Json(serde_json::json!({ "ok": true, "election_id": body.electionid })))
}
