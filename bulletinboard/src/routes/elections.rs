//! Election and group-parameter endpoints.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use cryptocore::group::GroupParameters;
use cryptocore::model::{Candidate, Election, GlobalInfo, ServiceKind, Voter};
use serde::Deserialize;

use crate::error::{BbError, BbResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/candidates", get(candidates))
        .route("/voters", get(voters))
        .route("/elgamalparams", get(elgamalparams))
        .route("/receive-params", post(receive_params))
        .route("/receive-election", post(receive_election))
        .route("/send-elections-for-voter", get(send_elections_for_voter))
        .route("/send-election-startdate", post(send_election_startdate))
}

#[derive(Deserialize)]
pub struct ElectionIdQuery {
    election_id: String,
}

async fn candidates(State(state): State<AppState>, Query(q): Query<ElectionIdQuery>) -> BbResult<Json<Vec<Candidate>>> {
    let store = state.store.read().await;
    let candidates = store
        .candidates(&q.election_id)
        .ok_or_else(|| BbError::NotFound(format!("election {} not found", q.election_id)))?;
    Ok(Json(candidates.to_vec()))
}

async fn voters(State(state): State<AppState>, Query(q): Query<ElectionIdQuery>) -> BbResult<Json<Vec<Voter>>> {
    let store = state.store.read().await;
    let voters = store
        .voters(&q.election_id)
        .ok_or_else(|| BbError::NotFound(format!("election {} not found", q.election_id)))?;
    Ok(Json(voters.to_vec()))
}

async fn elgamalparams(State(state): State<AppState>) -> BbResult<Json<GlobalInfo>> {
    Ok(Json(state.store.read().await.global_info()))
}

async fn receive_params(State(state): State<AppState>, Json(group): Json<GroupParameters>) -> BbResult<Json<serde_json::Value>> {
    state.store.write().await.receive_params(group);
    state.persist().await;
    // Fire-and-forget fan-out to both services once group parameters land,
    // per §4.1: "On receipt of group parameters the BB fans out notifications
    // to TS and VS".
    state.notify(format!("{}/vs_resp", state.config.vs_api_url));
    state.notify(format!("{}/ts_resp", state.config.ts_api_url));
    Ok(Json(serde_json::json!({ "ok": true })))
}

async fn receive_election(State(state): State<AppState>, Json(election): Json<Election>) -> BbResult<Json<serde_json::Value>> {
    state.store.write().await.receive_election(election);
    state.persist().await;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Deserialize)]
pub struct VoterIdQuery {
    voter_id: String,
}

async fn send_elections_for_voter(State(state): State<AppState>, Query(q): Query<VoterIdQuery>) -> Json<Vec<Election>> {
    let store = state.store.read().await;
    Json(store.elections_for_voter(&q.voter_id).into_iter().cloned().collect())
}

#[derive(Deserialize)]
pub struct ElectionStartdateBody {
    electionid: String,
}

async fn send_election_startdate(State(state): State<AppState>, Json(body): Json<ElectionStartdateBody>) -> BbResult<Json<serde_json::Value>> {
    let store = state.store.read().await;
    let election = store
        .election(&body.electionid)
        .ok_or_else(|| BbError::NotFound(format!("election {} not found", body.electionid)))?;
    // The literal §6 contract is "start" only; the Tallying Server also
    // needs `end` to know when to begin tallying (§4.5 step 1), so the rest
    // of the election is carried alongside rather than requiring a second
    // round trip through an endpoint the design never names.
    Ok(Json(serde_json::json!({ "start": election.start, "end": election.end, "election": election })))
}

/// Accepts either of the two services named in `GlobalInfo`, matching the
/// `{service, key}` wire shape in §6.
pub fn service_kind_from_str(s: &str) -> Option<ServiceKind> {
    match s {
        "tallying_server" => Some(ServiceKind::TallyingServer),
        "voting_server" => Some(ServiceKind::VotingServer),
        _ => None,
    }
}
