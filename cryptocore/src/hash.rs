// Copyright (C) Microsoft Corporation. All rights reserved.

//! Ballot hashing, used both for replay protection (a ballot with a hash
//! already present on a voter's CBR is rejected) and as the integrity tag
//! carried in the `hash` field of every posted ballot.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::ballot::Ballot;
use crate::errors::{CryptoError, CryptoResult};

/// Canonical fields included in a ballot's hash, matching the upstream
/// reference's `hash_ballot`: the fields a voter's client actually commits
/// to, excluding bookkeeping (`election_id`, `timestamp`, `hash` itself,
/// `image_path`) that is not part of the cryptographic content.
#[derive(Serialize)]
struct HashedFields<'a> {
    voter_id: &'a str,
    upk: &'a crate::group::Point,
    ctv: &'a [crate::el_gamal::Ciphertext],
    ctlv: &'a crate::el_gamal::Ciphertext,
    ctlid: &'a crate::el_gamal::Ciphertext,
    proof: &'a str,
}

pub fn ballot_hash(ballot: &Ballot) -> CryptoResult<String> {
    let fields = HashedFields {
        voter_id: &ballot.voter_id,
        upk: &ballot.upk,
        ctv: &ballot.ctv,
        ctlv: &ballot.ctlv,
        ctlid: &ballot.ctlid,
        proof: &ballot.proof,
    };
    let canonical = serde_json::to_vec(&fields)
        .map_err(|e| CryptoError::MalformedBallot(format!("hashing ballot: {e}")))?;
    let digest = Sha256::digest(canonical);
    Ok(hex::encode(digest))
}
