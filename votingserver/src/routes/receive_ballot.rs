//! The voter-facing submission endpoint (§4.3's "Ballot-receiving
//! endpoint"): buffers a ballot into `PendingVotes` and hands back the
//! image filename assigned to the voter's next unprocessed slot.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use cryptocore::el_gamal::{Ciphertext, PublicKey};
use serde::{Deserialize, Serialize};

use crate::error::VsResult;
use crate::local_store::PendingVote;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/receive-ballot", post(receive_ballot))
}

#[derive(Deserialize)]
pub struct ReceiveBallotBody {
    voter_id: String,
    election_id: String,
    public_key: PublicKey,
    ctv: Vec<Ciphertext>,
    ctlv: Ciphertext,
    ctlid: Ciphertext,
    proof: String,
}

/// `image` carries the memorable filename the voter should expect at their
/// next scheduled slot, or the literal sentinel `"Ballot rejected"` per §8's
/// boundary case for a submission outside `[start, end]` -- rejection here
/// is a 200 with that sentinel, not an HTTP error, so a coercer watching
/// the wire cannot distinguish "inactive election" from "thanks, recorded".
#[derive(Serialize)]
struct ReceiveBallotResponse {
    image: String,
}

const BALLOT_REJECTED: &str = "Ballot rejected";

async fn receive_ballot(State(state): State<AppState>, Json(body): Json<ReceiveBallotBody>) -> VsResult<Json<ReceiveBallotResponse>> {
    let now = state.clock.now();
    let window = state.election_windows.read().await.get(&body.election_id).copied();
    let Some(window) = window else {
        return Ok(Json(ReceiveBallotResponse { image: BALLOT_REJECTED.to_string() }));
    };
    if now < window.0 || now > window.1 {
        return Ok(Json(ReceiveBallotResponse { image: BALLOT_REJECTED.to_string() }));
    }

    let key = (body.voter_id.clone(), body.election_id.clone());
    state
        .local_store
        .set_pending(
            key.clone(),
            PendingVote { public_key: body.public_key, ctv: body.ctv, ctlv: body.ctlv, ctlid: body.ctlid, proof: body.proof },
        )
        .await;

    let image = state
        .local_store
        .next_unprocessed(&key)
        .await
        .map(|e| e.image_path)
        .unwrap_or_else(|| BALLOT_REJECTED.to_string());
    Ok(Json(ReceiveBallotResponse { image }))
}
