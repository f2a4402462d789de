// Copyright (C) Microsoft Corporation. All rights reserved.

//! Independent verification of everything a voter (or any other party) can
//! check from Bulletin Board data alone: that a posted ballot's NIZK
//! verifies against the public parameters and its two preceding CBR
//! entries, and that a published `ElectionResult` really is the correct
//! decryption of the aggregated last-ballot ciphertexts (`verifyTally` in
//! the design's testable properties).
//!
//! This crate never talks to a network; every function here takes already-
//! fetched BB data and returns a verdict. The Bulletin Board, Voting Server
//! and Tallying Server each link against it for their own use of the same
//! checks (BB to reject malformed ballots at the edge; VS to validate a
//! submission before emitting it; TS and any external auditor to confirm a
//! tally).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

use cryptocore::ballot::{Ballot, BallotKind};
use cryptocore::el_gamal::{self, Ciphertext, PublicKey};
use cryptocore::errors::{CryptoError, CryptoResult};
use cryptocore::model::{CandidateResult, ElectionResult};
use cryptocore::nizk::ballot_proof::{self, BallotStatement};
use cryptocore::nizk::tally_proof;

/// The two CBR entries immediately preceding a ballot under verification,
/// per `last_previous_last_ballot`/`preceding-ballots` on the Bulletin
/// Board: `last` is the entry immediately before it, `previous_last` the
/// one before that (or `last` doubled, when only one preceding entry
/// exists -- the B0 case).
pub struct Preceding<'a> {
    pub last: &'a Ballot,
    pub previous_last: &'a Ballot,
}

/// Verifies one non-`B0` ballot's NIZK against the public parameters, the
/// voter's public key, and its two preceding CBR entries. Returns
/// `Ok(())` when the proof verifies; the invariant in the design's
/// testable properties that every posted ballot's proof verifies against
/// `(params, upk, last, previous_last)`.
pub fn verify_ballot(
    pk_ts: PublicKey,
    pk_vs: PublicKey,
    num_candidates: usize,
    ballot: &Ballot,
    preceding: Preceding<'_>,
) -> CryptoResult<()> {
    if ballot.kind == BallotKind::Initialization {
        return Err(CryptoError::MalformedBallot("B0 carries no NIZK to verify".into()));
    }
    let (ct_i, delta) = BallotStatement::derive_from_last(preceding.last.ctlv, preceding.last.ctlid);
    let stmt = BallotStatement {
        pk_ts,
        pk_vs,
        upk: ballot.upk,
        num_candidates,
        ctv: ballot.ctv.clone(),
        ctlv: ballot.ctlv,
        ctlid: ballot.ctlid,
        ct_i,
        delta,
        ctv_last: preceding.last.ctv.clone(),
        ctv_prev_last: preceding.previous_last.ctv.clone(),
    };
    let proof = ballot.decode_proof()?;
    ballot_proof::verify(&stmt, &proof)
}

/// Recomputes the aggregated ciphertext for one candidate from the
/// per-voter last-ballot `ctv` export (`fetch_last_ballot_ctvs`).
pub fn aggregate_candidate(last_ctvs: &[Vec<Ciphertext>], candidate_index: usize) -> Ciphertext {
    last_ctvs
        .iter()
        .map(|ctv| ctv[candidate_index])
        .fold(Ciphertext { c0: cryptocore::group::Point::identity(), c1: cryptocore::group::Point::identity() }, el_gamal::add)
}

/// `verifyTally`: recomputes every candidate's aggregated ciphertext from
/// `last_ctvs` and checks its published tally proof. `result.results` must
/// be in the same candidate order as `last_ctvs`' inner vectors.
pub fn verify_tally(last_ctvs: &[Vec<Ciphertext>], result: &ElectionResult) -> CryptoResult<()> {
    for (i, candidate_result) in result.results.iter().enumerate() {
        let agg = aggregate_candidate(last_ctvs, i);
        let proof = candidate_result.decode_proof()?;
        tally_proof::verify(agg.c0, agg.c1, candidate_result.votes, &proof)?;
    }
    let total_votes: u64 = result.results.iter().map(|r| r.votes).sum();
    if (total_votes as usize) > last_ctvs.len() {
        return Err(CryptoError::ProofInvalid("total votes exceed voter count".into()));
    }
    Ok(())
}

/// Convenience used by tests and by any CLI surface layered over this
/// crate: looks a candidate's result up by id before verifying it alone.
pub fn verify_candidate_result(
    last_ctvs: &[Vec<Ciphertext>],
    candidate_index: usize,
    result: &CandidateResult,
) -> CryptoResult<()> {
    let agg = aggregate_candidate(last_ctvs, candidate_index);
    let proof = result.decode_proof()?;
    tally_proof::verify(agg.c0, agg.c1, result.votes, &proof)
}

#[cfg(test)]
mod test {
    use super::*;
    use cryptocore::el_gamal::SecretKey;
    use cryptocore::group::Scalar;
    use cryptocore::model::CandidateResult;
    use cryptocore::nizk::ballot_proof::Witness;

    #[test]
    fn verify_tally_accepts_correct_result() {
        let mut rng = rand::rngs::OsRng;
        let sk_ts = SecretKey::random(&mut rng);
        let votes_a = [1u64, 0, 1];
        let votes_b = [0u64, 1, 0];
        let last_ctvs: Vec<Vec<Ciphertext>> = votes_a
            .iter()
            .zip(votes_b.iter())
            .map(|(&a, &b)| {
                vec![
                    el_gamal::encrypt(sk_ts.public_key(), a, Scalar::random(&mut rng)),
                    el_gamal::encrypt(sk_ts.public_key(), b, Scalar::random(&mut rng)),
                ]
            })
            .collect();

        let agg_a = aggregate_candidate(&last_ctvs, 0);
        let agg_b = aggregate_candidate(&last_ctvs, 1);
        let total_a: u64 = votes_a.iter().sum();
        let total_b: u64 = votes_b.iter().sum();
        let proof_a = tally_proof::prove(agg_a.c0, agg_a.c1, total_a, sk_ts.scalar(), &mut rng).expect("prove a");
        let proof_b = tally_proof::prove(agg_b.c0, agg_b.c1, total_b, sk_ts.scalar(), &mut rng).expect("prove b");

        let result = ElectionResult {
            election_id: "election-1".into(),
            results: vec![
                CandidateResult {
                    candidate_id: "A".into(),
                    votes: total_a,
                    proof: CandidateResult::encode_proof(&proof_a).expect("encode"),
                },
                CandidateResult {
                    candidate_id: "B".into(),
                    votes: total_b,
                    proof: CandidateResult::encode_proof(&proof_b).expect("encode"),
                },
            ],
        };

        verify_tally(&last_ctvs, &result).expect("tally verifies");
    }

    #[test]
    fn verify_tally_rejects_inflated_count() {
        let mut rng = rand::rngs::OsRng;
        let sk_ts = SecretKey::random(&mut rng);
        let last_ctvs: Vec<Vec<Ciphertext>> =
            vec![vec![el_gamal::encrypt(sk_ts.public_key(), 1, Scalar::random(&mut rng))]];
        let agg = aggregate_candidate(&last_ctvs, 0);
        // Prove (falsely, but validly in isolation) that the tally is 2 votes.
        let proof = tally_proof::prove(agg.c0, agg.c1, 2, sk_ts.scalar(), &mut rng);
        assert!(proof.is_err(), "DL-equality proof cannot be constructed for a false claim");
    }

    #[test]
    fn verify_ballot_detects_tampering() {
        let mut rng = rand::rngs::OsRng;
        let sk_ts = SecretKey::random(&mut rng);
        let sk_vs = SecretKey::random(&mut rng);
        let sk_id = Scalar::random(&mut rng);
        let upk = cryptocore::group::Point::generator() * sk_id;
        let num_candidates = 2;

        let r_v: Vec<Scalar> = (0..num_candidates).map(|_| Scalar::random(&mut rng)).collect();
        let ctv: Vec<Ciphertext> = (0..num_candidates)
            .map(|i| {
                let bit = if i == 0 { 1 } else { 0 };
                el_gamal::encrypt(sk_ts.public_key(), bit, r_v[i])
            })
            .collect();
        let r_lv = Scalar::random(&mut rng);
        let ctlv = el_gamal::encrypt(sk_vs.public_key(), 0, r_lv);
        let ctlid_last = el_gamal::encrypt(sk_vs.public_key(), 0, Scalar::random(&mut rng));
        let ctlv_last = el_gamal::encrypt(sk_vs.public_key(), 0, Scalar::random(&mut rng));
        let (ct_i, delta) = BallotStatement::derive_from_last(ctlv_last, ctlid_last);
        let r_lid = Scalar::random(&mut rng);
        let ctlid = el_gamal::re_encrypt(sk_vs.public_key(), ct_i, r_lid);

        let stmt = BallotStatement {
            pk_ts: sk_ts.public_key(),
            pk_vs: sk_vs.public_key(),
            upk,
            num_candidates,
            ctv: ctv.clone(),
            ctlv,
            ctlid,
            ct_i,
            delta,
            ctv_last: ctv.clone(),
            ctv_prev_last: ctv.clone(),
        };
        let witness = Witness::Voter { sk_id, choice: Some(0), r_v, lv: 0, r_lv, r_lid };
        let proof = ballot_proof::prove(&stmt, &witness, &mut rng).expect("prove");

        use chrono::Utc;
        let last = Ballot {
            voter_id: "voter-1".into(),
            election_id: "election-1".into(),
            kind: BallotKind::Initialization,
            upk,
            ctv: ctv.clone(),
            ctlv: ctlv_last,
            ctlid: ctlid_last,
            proof: Ballot::encode_b0_randomness(Scalar::random(&mut rng)),
            timestamp: Utc::now(),
            hash: "b0".into(),
            image_path: None,
        };
        let mut submitted = Ballot {
            voter_id: "voter-1".into(),
            election_id: "election-1".into(),
            kind: BallotKind::RealVote,
            upk,
            ctv,
            ctlv: stmt.ctlv,
            ctlid: stmt.ctlid,
            proof: Ballot::encode_proof(&proof).expect("encode"),
            timestamp: Utc::now(),
            hash: "ballot-1".into(),
            image_path: Some("anchor.png".into()),
        };

        verify_ballot(
            sk_ts.public_key(),
            sk_vs.public_key(),
            num_candidates,
            &submitted,
            Preceding { last: &last, previous_last: &last },
        )
        .expect("honest ballot verifies");

        submitted.ctv.swap(0, 1);
        assert!(verify_ballot(
            sk_ts.public_key(),
            sk_vs.public_key(),
            num_candidates,
            &submitted,
            Preceding { last: &last, previous_last: &last },
        )
        .is_err());
    }
}
