//! Ballot posting and CBR query endpoints -- the bulk of the external
//! interface named in spec §6.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use cryptocore::ballot::Ballot;
use cryptocore::el_gamal::Ciphertext;
use serde::{Deserialize, Serialize};

use crate::error::{BbError, BbResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/receive-ballot0", post(receive_ballot))
        .route("/receive-ballot", post(receive_ballot))
        .route("/last_previous_last_ballot", get(last_previous_last_ballot))
        .route("/cbr_length", get(cbr_length))
        .route("/cbr-for-voter", get(cbr_for_voter))
        .route("/fetch-ballot-hashes", get(fetch_ballot_hashes))
        .route("/fetch_last_ballot_ctvs", get(fetch_last_ballot_ctvs))
        .route("/ballot", get(ballot_by_image))
        .route("/preceding-ballots", get(preceding_ballots))
}

/// Shared by `/receive-ballot0` and `/receive-ballot`: both post a `Ballot`
/// whose `kind` discriminant already tells BB which one it is; insertion is
/// idempotent on hash either way.
async fn receive_ballot(State(state): State<AppState>, Json(ballot): Json<Ballot>) -> BbResult<Json<serde_json::Value>> {
    state.store.write().await.receive_ballot(ballot);
    state.persist().await;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Deserialize)]
pub struct VoterElectionQuery {
    election_id: String,
    voter_id: String,
}

#[derive(Serialize)]
struct LastPreviousLast {
    last: Ballot,
    previous_last: Ballot,
}

async fn last_previous_last_ballot(State(state): State<AppState>, Query(q): Query<VoterElectionQuery>) -> BbResult<Json<LastPreviousLast>> {
    let store = state.store.read().await;
    let (last, previous_last) = store
        .last_previous_last_ballot(&q.voter_id, &q.election_id)
        .ok_or_else(|| BbError::NotFound(format!("no CBR for voter {} in election {}", q.voter_id, q.election_id)))?;
    Ok(Json(LastPreviousLast { last: last.clone(), previous_last: previous_last.clone() }))
}

async fn cbr_length(State(state): State<AppState>, Query(q): Query<VoterElectionQuery>) -> Json<serde_json::Value> {
    let store = state.store.read().await;
    Json(serde_json::json!({ "length": store.cbr_length(&q.voter_id, &q.election_id) }))
}

async fn cbr_for_voter(State(state): State<AppState>, Query(q): Query<VoterElectionQuery>) -> Json<Vec<Ballot>> {
    let store = state.store.read().await;
    Json(store.cbr(&q.voter_id, &q.election_id).to_vec())
}

#[derive(Deserialize)]
pub struct ElectionIdQuery {
    election_id: String,
}

async fn fetch_ballot_hashes(State(state): State<AppState>, Query(q): Query<ElectionIdQuery>) -> Json<Vec<String>> {
    Json(state.store.read().await.ballot_hashes(&q.election_id))
}

#[derive(Serialize)]
struct LastCtv {
    voter_id: String,
    ctv: Vec<Ciphertext>,
}

async fn fetch_last_ballot_ctvs(State(state): State<AppState>, Query(q): Query<ElectionIdQuery>) -> Json<Vec<LastCtv>> {
    let store = state.store.read().await;
    let out = store
        .fetch_last_ballot_ctvs(&q.election_id)
        .into_iter()
        .map(|(voter_id, ctv)| LastCtv { voter_id, ctv })
        .collect();
    Json(out)
}

#[derive(Deserialize)]
pub struct BallotByImageQuery {
    election_id: String,
    voter_id: String,
    image_filename: String,
}

async fn ballot_by_image(State(state): State<AppState>, Query(q): Query<BallotByImageQuery>) -> BbResult<Json<Ballot>> {
    let store = state.store.read().await;
    store
        .ballot_by_image(&q.election_id, &q.voter_id, &q.image_filename)
        .cloned()
        .map(Json)
        .ok_or_else(|| BbError::NotFound(format!("no ballot for image {}", q.image_filename)))
}

#[derive(Deserialize)]
pub struct PrecedingBallotsQuery {
    election_id: String,
    voter_id: String,
    timestamp: DateTime<Utc>,
}

async fn preceding_ballots(State(state): State<AppState>, Query(q): Query<PrecedingBallotsQuery>) -> BbResult<Json<LastPreviousLast>> {
    let store = state.store.read().await;
    let (last, previous_last) = store
        .preceding_ballots(&q.voter_id, &q.election_id, q.timestamp)
        .ok_or_else(|| BbError::NotFound(format!("no ballots preceding {}", q.timestamp)))?;
    Ok(Json(LastPreviousLast { last: last.clone(), previous_last: previous_last.clone() }))
}
