//! `POST /key_ready {service}` (BB's notification that a service's public
//! key has landed) and `GET /voter-keys` (the voter app's out-of-band
//! fetch of its own keypair, per §4.2's closing paragraph).

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use cryptocore::el_gamal::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};

use crate::error::{RaError, RaResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/key_ready", post(key_ready)).route("/voter-keys", get(voter_keys))
}

#[derive(Deserialize)]
pub struct KeyReadyQuery {
    service: String,
}

async fn key_ready(State(state): State<AppState>, Query(q): Query<KeyReadyQuery>) -> RaResult<Json<serde_json::Value>> {
    let mut received = state.received_keys.write().await;
    match q.service.as_str() {
        "voting_server" => received.vs = true,
        "tallying_server" => received.ts = true,
        other => return Err(RaError::InvalidRequest(format!("unknown service {other}"))),
    }
    Ok(Json(serde_json::json!({ "ok": true, "ready": received.ready() })))
}

#[derive(Deserialize)]
pub struct VoterKeysQuery {
    voter_id: String,
    election_id: String,
}

#[derive(Serialize)]
struct VoterKeysResponse {
    public_key: PublicKey,
    secret_key: SecretKey,
}

async fn voter_keys(State(state): State<AppState>, Query(q): Query<VoterKeysQuery>) -> RaResult<Json<VoterKeysResponse>> {
    state.keystore_for(&q.election_id).await?;
    let keystores = state.keystores.read().await;
    let keystore = keystores.get(&q.election_id).expect("loaded above");
    let (public_key, secret_key) = keystore
        .get(&q.voter_id)
        .ok_or_else(|| RaError::NotFound(format!("no key for voter {} in election {}", q.voter_id, q.election_id)))?;
    Ok(Json(VoterKeysResponse { public_key: *public_key, secret_key: secret_key.clone() }))
}
