//! The Tallying Server's core algorithm, §4.5 steps 3-6: homomorphic
//! aggregation of each candidate's last-ballot ciphertexts, discrete-log
//! recovery of the vote count, and the NIZK of correct decryption.

use cryptocore::el_gamal::{self, Ciphertext};
use cryptocore::errors::CryptoResult;
use cryptocore::group::{Point, Scalar};
use cryptocore::model::{Candidate, CandidateResult, ElectionResult};
use cryptocore::nizk::tally_proof;
use rand_core::CryptoRngCore;

use crate::bb_client::LastCtv;

/// Runs §4.5 steps 3-6 for every candidate and assembles the result BB
/// publishes. `num_voters` bounds the discrete-log search (a tally can
/// never exceed the electorate) and is also the invariant checked in §8:
/// `sum(votes_i) <= num_voters`.
pub fn tally_election(
    election_id: &str,
    candidates: &[Candidate],
    last_ctvs: &[LastCtv],
    num_voters: usize,
    sk_ts: Scalar,
    rng: &mut impl CryptoRngCore,
) -> CryptoResult<ElectionResult> {
    let dlog = cryptocore::discrete_log::DiscreteLog::new(num_voters.max(1) as i64);

    let mut results = Vec::with_capacity(candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        let (c0, c1) = aggregate_candidate(last_ctvs, i);
        let sum_votes = c1 - c0 * sk_ts;
        let votes = dlog.find_or_err(sum_votes)?;
        debug_assert!(votes >= 0, "a correctly-formed ballot never encodes a negative vote");
        let votes = votes.max(0) as u64;

        let proof = tally_proof::prove(c0, c1, votes, sk_ts, rng)?;
        results.push(CandidateResult { candidate_id: candidate.id.clone(), votes, proof: CandidateResult::encode_proof(&proof)? });
    }

    Ok(ElectionResult { election_id: election_id.to_string(), results })
}

/// `(C0, C1)` summed component-wise across every voter's last ballot's
/// `ctv[candidate_index]`, per §4.5 step 3. A voter with no candidate at
/// that index (malformed CBR data) contributes nothing rather than
/// panicking -- this can only happen if BB itself is corrupted, which is
/// outside what TS can correct for.
fn aggregate_candidate(last_ctvs: &[LastCtv], candidate_index: usize) -> (Point, Point) {
    let mut acc = Ciphertext { c0: Point::identity(), c1: Point::identity() };
    for entry in last_ctvs {
        if let Some(ct) = entry.ctv.get(candidate_index) {
            acc = el_gamal::add(acc, *ct);
        }
    }
    (acc.c0, acc.c1)
}
