//! Per-election bootstrap orchestration: `POST /elections/load-file?name`,
//! the seven-step flow in spec §4.2.

use axum::extract::{Query, State};
use axum::Json;
use cryptocore::ballot::{Ballot, BallotKind};
use cryptocore::el_gamal::{self, SecretKey};
use cryptocore::group::Scalar;
use cryptocore::hash::ballot_hash;
use cryptocore::model::{Election, VoterKeyEntry};
use serde::Deserialize;

use crate::error::{RaError, RaResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoadFileQuery {
    name: String,
}

pub async fn load_file(State(state): State<AppState>, Query(q): Query<LoadFileQuery>) -> RaResult<Json<serde_json::Value>> {
    // Step 1: guard that both service keys have landed on BB.
    if !state.received_keys.read().await.ready() {
        return Err(RaError::NotReady("voting server and tallying server keys not yet received".into()));
    }

    let path = state.config.election_file_path(&q.name);
    let bytes = util::file::read_to_string(&path).map_err(|e| RaError::InvalidRequest(e.to_string()))?;
    let election: Election = serde_json::from_str(&bytes).map_err(|e| RaError::InvalidRequest(e.to_string()))?;

    // Step 2: register the election on BB.
    let bb = &state.config.bb_api_url;
    state
        .http
        .post(format!("{bb}/receive-election"))
        .json(&election)
        .send()
        .await?
        .error_for_status()?;

    // Step 3: per-voter keypair, persisted locally.
    state.keystore_for(&election.id).await?;
    let mut rng = rand::rngs::OsRng;
    let mut key_entries = Vec::with_capacity(election.voters.len());
    {
        let mut keystores = state.keystores.write().await;
        let keystore = keystores.get_mut(&election.id).expect("just loaded above");
        for voter in &election.voters {
            let sk = SecretKey::random(&mut rng);
            let pk = sk.public_key();
            keystore.insert(voter.id.clone(), pk, sk);
            key_entries.push(VoterKeyEntry { voter_id: voter.id.clone(), public_key: pk });
        }
        keystore.save(&state.config.keystore_path(&election.id))?;
    }

    // Step 4: ship the public-key batch to BB.
    state
        .http
        .post(format!("{bb}/receive-voter-keys"))
        .json(&serde_json::json!({ "election_id": election.id, "keys": key_entries }))
        .send()
        .await?
        .error_for_status()?;

    // Step 5: fetch both service public keys, then build B0 for every voter.
    let global_info: cryptocore::model::GlobalInfo =
        state.http.get(format!("{bb}/public-keys-tsvs")).send().await?.error_for_status()?.json().await?;
    let pk_ts = global_info
        .public_key_tallying_server
        .ok_or_else(|| RaError::NotReady("tallying server public key not yet on bulletin board".into()))?;
    let pk_vs = global_info
        .public_key_voting_server
        .ok_or_else(|| RaError::NotReady("voting server public key not yet on bulletin board".into()))?;

    let keystores = state.keystores.read().await;
    let keystore = keystores.get(&election.id).expect("loaded above");
    let mut b0_batch = Vec::with_capacity(election.voters.len());
    for voter in &election.voters {
        let (upk, _sk) = keystore.get(&voter.id).expect("inserted above");
        let r0 = Scalar::random(&mut rng);
        let ctv: Vec<_> = election.candidates.iter().map(|_| el_gamal::encrypt(pk_ts, 0, r0)).collect();
        let ctlv = el_gamal::encrypt(pk_vs, 0, r0);
        let ctlid = ctlv; // "ctlid := ctl0 (they coincide for B0)"
        let mut b0 = Ballot {
            voter_id: voter.id.clone(),
            election_id: election.id.clone(),
            kind: BallotKind::Initialization,
            upk: upk.0,
            ctv,
            ctlv,
            ctlid,
            proof: Ballot::encode_b0_randomness(r0),
            timestamp: election.start,
            hash: String::new(),
            image_path: None,
        };
        b0.hash = ballot_hash(&b0)?;
        b0_batch.push(b0);
    }
    drop(keystores);

    // Step 6: ship the B0 batch to VS, which will assign each a schedule slot.
    // VS has no other way to learn the election window, so it rides along
    // here rather than requiring a second round trip to BB.
    let vs = &state.config.vs_api_url;
    state
        .http
        .post(format!("{vs}/ballot0list"))
        .json(&serde_json::json!({
            "election_id": election.id,
            "start": election.start,
            "end": election.end,
            "ballots": b0_batch,
        }))
        .send()
        .await?
        .error_for_status()?;

    // Step 7: notify TS so it can schedule the election-end tally.
    let ts = &state.config.ts_api_url;
    state
        .http
        .post(format!("{ts}/receive-election"))
        .json(&serde_json::json!({ "electionid": election.id }))
        .send()
        .await?
        .error_for_status()?;

    Ok(Json(serde_json::json!({ "ok": true, "election_id": election.id, "voters": election.voters.len() })))
}
