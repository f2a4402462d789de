// Copyright (C) Microsoft Corporation. All rights reserved.

//! The Tallying Server's proof of correct decryption: given the aggregated
//! per-candidate ciphertext `(C0, C1)` and the recovered vote count `v`, a
//! NIZK that `v*G == C1 - sk_TS*C0` without revealing `sk_TS`. This is a
//! single Schnorr-style knowledge proof, not a disjunction, so it is built
//! as a degenerate one-branch [`sigma::OrProof`] -- the OR-composition
//! collapses to a plain Fiat-Shamir Schnorr proof when there is only one
//! branch to (not) hide, which saves a second proof engine.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

use std::collections::BTreeMap;

use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::errors::CryptoResult;
use crate::group::{Point, Scalar};
use crate::nizk::sigma::{self, Branch, LinearStatement, OrProof};

const W_SK_TS: &str = "sk_ts";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TallyProof {
    pub or_proof: OrProof,
}

fn branch(c0: Point, c1: Point, v: u64) -> Branch {
    Branch::new(vec![LinearStatement::with_offset(
        c1,
        Point::encode_u64(v),
        vec![(W_SK_TS.into(), c0)],
    )])
}

/// Proves `v*G == C1 - sk_TS*C0` for the aggregated candidate ciphertext
/// `(c0, c1)` and recovered count `v`, using knowledge of `sk_ts`.
pub fn prove(c0: Point, c1: Point, v: u64, sk_ts: Scalar, rng: &mut impl CryptoRngCore) -> CryptoResult<TallyProof> {
    let branches = [branch(c0, c1, v)];
    let mut witness = BTreeMap::new();
    witness.insert(W_SK_TS.to_string(), sk_ts);
    let or_proof = sigma::prove_or(&branches, 0, &witness, rng)?;
    Ok(TallyProof { or_proof })
}

pub fn verify(c0: Point, c1: Point, v: u64, proof: &TallyProof) -> CryptoResult<()> {
    let branches = [branch(c0, c1, v)];
    sigma::verify_or(&branches, &proof.or_proof)
}
