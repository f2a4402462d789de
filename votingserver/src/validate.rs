//! Validates a voter-submitted (buffered) ballot against the three
//! conditions in §4.4 before it is allowed to be emitted onto the CBR.

use cryptocore::ballot::{Ballot, BallotKind};
use cryptocore::hash::ballot_hash;
use cryptocore::nizk::ballot_proof::{self, BallotStatement};

use crate::bb_client;
use crate::error::{VsError, VsResult};
use crate::local_store::PendingVote;
use crate::state::AppState;

pub async fn validate_and_build(
    state: &AppState,
    voter_id: &str,
    election_id: &str,
    pending: PendingVote,
) -> VsResult<Ballot> {
    let bb = &state.config.bb_api_url;

    // Condition 1: voterId is registered for this election on BB, and the
    // submitted upk matches what RA published for them.
    let registered_pk = bb_client::voter_public_key(&state.http, bb, voter_id, election_id)
        .await
        .map_err(|_| VsError::InvalidRequest(format!("voter {voter_id} is not registered for election {election_id}")))?;
    if registered_pk != pending.public_key {
        return Err(VsError::InvalidRequest("submitted public key does not match registration".into()));
    }

    let info = bb_client::global_info(&state.http, bb).await?;
    let pk_ts = info.public_key_tallying_server.ok_or_else(|| VsError::NotReady("no tallying server key".into()))?;
    let pk_vs = state.public_key;
    let num_candidates = bb_client::candidates(&state.http, bb, election_id).await?.len();
    let (last, previous_last) = bb_client::last_previous_last(&state.http, bb, voter_id, election_id).await?;

    let mut ballot = Ballot {
        voter_id: voter_id.to_string(),
        election_id: election_id.to_string(),
        kind: BallotKind::RealVote,
        upk: pending.public_key.0,
        ctv: pending.ctv.clone(),
        ctlv: pending.ctlv,
        ctlid: pending.ctlid,
        proof: pending.proof.clone(),
        timestamp: state.clock.now(),
        hash: String::new(),
        image_path: None,
    };
    ballot.hash = ballot_hash(&ballot)?;

    // Condition 2: replay protection.
    let existing_hashes = bb_client::ballot_hashes(&state.http, bb, election_id).await?;
    if existing_hashes.contains(&ballot.hash) {
        return Err(VsError::InvalidRequest("ballot hash already present on the bulletin board".into()));
    }

    // Condition 3: the NIZK verifies against (params, upk, last, previous-last).
    let (ct_i, delta) = BallotStatement::derive_from_last(last.ctlv, last.ctlid);
    let stmt = BallotStatement {
        pk_ts,
        pk_vs,
        upk: pending.public_key.0,
        num_candidates,
        ctv: pending.ctv,
        ctlv: pending.ctlv,
        ctlid: pending.ctlid,
        ct_i,
        delta,
        ctv_last: last.ctv,
        ctv_prev_last: previous_last.ctv,
    };
    let proof = ballot.decode_proof()?;
    ballot_proof::verify(&stmt, &proof)?;

    Ok(ballot)
}
