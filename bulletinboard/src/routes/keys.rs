//! Service and per-voter public-key endpoints.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use cryptocore::el_gamal::PublicKey;
use cryptocore::model::{GlobalInfo, VoterKeyEntry};
use serde::Deserialize;

use crate::error::{BbError, BbResult};
use crate::routes::elections::service_kind_from_str;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/receive-public-key", post(receive_public_key))
        .route("/public-keys-tsvs", get(public_keys_tsvs))
        .route("/receive-voter-keys", post(receive_voter_keys))
        .route("/voter-public-key", get(voter_public_key))
}

#[derive(Deserialize)]
pub struct ReceivePublicKeyBody {
    service: String,
    key: PublicKey,
}

async fn receive_public_key(State(state): State<AppState>, Json(body): Json<ReceivePublicKeyBody>) -> BbResult<Json<serde_json::Value>> {
    let service = service_kind_from_str(&body.service)
        .ok_or_else(|| BbError::InvalidRequest(format!("unknown service {}", body.service)))?;
    state.store.write().await.receive_public_key(service, body.key);
    state.persist().await;
    // "On receipt of a public key from TS or VS, BB persists it and notifies RA."
    state.notify(format!("{}/key_ready?service={}", state.config.ra_api_url, body.service));
    Ok(Json(serde_json::json!({ "ok": true })))
}

async fn public_keys_tsvs(State(state): State<AppState>) -> Json<GlobalInfo> {
    Json(state.store.read().await.global_info())
}

#[derive(Deserialize)]
pub struct ReceiveVoterKeysBody {
    election_id: String,
    keys: Vec<VoterKeyEntry>,
}

async fn receive_voter_keys(State(state): State<AppState>, Json(body): Json<ReceiveVoterKeysBody>) -> BbResult<Json<serde_json::Value>> {
    state.store.write().await.receive_voter_keys(&body.election_id, body.keys);
    state.persist().await;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Deserialize)]
pub struct VoterPublicKeyQuery {
    voter_id: String,
    election_id: String,
}

async fn voter_public_key(State(state): State<AppState>, Query(q): Query<VoterPublicKeyQuery>) -> BbResult<Json<PublicKey>> {
    let store = state.store.read().await;
    store
        .voter_public_key(&q.voter_id, &q.election_id)
        .map(Json)
        .ok_or_else(|| BbError::NotFound(format!("no public key for voter {} in election {}", q.voter_id, q.election_id)))
}
