//! The Voting Server's obfuscation algorithm, §4.4 steps 1-6: fabricate a
//! ballot indistinguishable from a real vote by re-encrypting the voter's
//! prior CBR entry, proving `R2` or `R3` of the ballot NIZK depending on
//! whether the voter's last reported index list was honest.

use cryptocore::ballot::{Ballot, BallotKind};
use cryptocore::el_gamal;
use cryptocore::group::{Point, Scalar};
use cryptocore::hash::ballot_hash;
use cryptocore::nizk::ballot_proof::{self, BallotStatement, Witness};
use rand_core::CryptoRngCore;

use crate::bb_client;
use crate::error::VsResult;
use crate::state::AppState;

pub async fn build_obfuscation(
    state: &AppState,
    voter_id: &str,
    election_id: &str,
    rng: &mut impl CryptoRngCore,
) -> VsResult<Ballot> {
    let bb = &state.config.bb_api_url;

    // Step 1: fetch pk_TS, pk_VS, upk, last/previous-last ballots, candidate count.
    let info = bb_client::global_info(&state.http, bb).await?;
    let pk_ts = info.public_key_tallying_server.ok_or_else(|| crate::error::VsError::NotReady("no tallying server key".into()))?;
    let pk_vs = state.public_key;
    let upk = bb_client::voter_public_key(&state.http, bb, voter_id, election_id).await?.0;
    let (last, previous_last) = bb_client::last_previous_last(&state.http, bb, voter_id, election_id).await?;
    let num_candidates = bb_client::candidates(&state.http, bb, election_id).await?.len();

    // Step 2: fresh randomness.
    let r_v: Vec<Scalar> = (0..num_candidates).map(|_| Scalar::random(rng)).collect();
    let r_lv = Scalar::random(rng);
    let r_lid = Scalar::random(rng);

    // Step 3: ct_i, (c0, c1) from the last ballot; decrypt delta under sk_vs.
    let (ct_i, delta) = BallotStatement::derive_from_last(last.ctlv, last.ctlid);
    let decrypted = el_gamal::decrypt_to_point(&state.secret_key, delta);

    // Step 4: pick the re-encryption source and which branch to keep live.
    let (ctv_source, witness) = if decrypted == Point::identity() {
        (
            last.ctv.clone(),
            Witness::VsR2 { sk_vs: state.secret_key.scalar(), r_v: r_v.clone(), r_lv, r_lid },
        )
    } else {
        let w = recover_small_delta(decrypted)?;
        let winv = Scalar::from_u64(w).invert().ok_or_else(|| {
            crate::error::VsError::Internal("delta decrypted to zero unexpectedly".into())
        })?;
        (
            previous_last.ctv.clone(),
            Witness::VsR3 { sk_vs: state.secret_key.scalar(), winv, r_v: r_v.clone(), r_lv, r_lid },
        )
    };

    // Step 5: re-encrypt.
    let ctv: Vec<_> = ctv_source.iter().zip(&r_v).map(|(c, r)| el_gamal::re_encrypt(pk_ts, *c, *r)).collect();
    let ctlv = el_gamal::re_encrypt(pk_vs, ct_i, r_lv);
    let ctlid = el_gamal::re_encrypt(pk_vs, ct_i, r_lid);

    let stmt = BallotStatement {
        pk_ts,
        pk_vs,
        upk,
        num_candidates,
        ctv: ctv.clone(),
        ctlv,
        ctlid,
        ct_i,
        delta,
        ctv_last: last.ctv.clone(),
        ctv_prev_last: previous_last.ctv.clone(),
    };

    // Step 6: prove and assemble.
    let proof = ballot_proof::prove(&stmt, &witness, rng)?;
    let mut ballot = Ballot {
        voter_id: voter_id.to_string(),
        election_id: election_id.to_string(),
        kind: BallotKind::Obfuscation,
        upk,
        ctv,
        ctlv,
        ctlid,
        proof: Ballot::encode_proof(&proof)?,
        timestamp: state.clock.now(),
        hash: String::new(),
        image_path: None,
    };
    ballot.hash = ballot_hash(&ballot)?;
    Ok(ballot)
}

/// `delta` is a ciphertext of a small signed index-list discrepancy (at most
/// the number of candidates in magnitude); `w` itself is only needed as a
/// nonzero field element for `winv`, not as a faithfully-recovered integer,
/// so a modest search bound covers every deployment size this system targets.
fn recover_small_delta(point: Point) -> VsResult<u64> {
    let dlog = cryptocore::discrete_log::DiscreteLog::new(4096);
    let m = dlog.find_or_err(point)?;
    if m == 0 {
        return Err(crate::error::VsError::Internal("delta unexpectedly resolved to zero".into()));
    }
    Ok(m.unsigned_abs())
}
