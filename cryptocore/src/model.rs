// Copyright (C) Microsoft Corporation. All rights reserved.

//! Wire-level data model shared by every service: elections, candidates,
//! voters, and the published tally. None of these carry behavior of their
//! own beyond (de)serialization; they exist so BB, RA, VS and TS agree on
//! exactly one shape for the JSON each endpoint in the design's external
//! interfaces section accepts and returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::el_gamal::PublicKey;
use crate::nizk::tally_proof::TallyProof;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Voter {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Election {
    pub id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub candidates: Vec<Candidate>,
    pub voters: Vec<Voter>,
}

impl Election {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }
}

/// A `(voterId, publicKey)` pair for one election, the unit the
/// Registration Authority batches and posts to the Bulletin Board.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoterKeyEntry {
    pub voter_id: String,
    pub public_key: PublicKey,
}

/// Named identity of the two services whose keys the Bulletin Board tracks
/// in `GlobalInfo`, per the `receive-public-key {service, key}` contract.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    TallyingServer,
    VotingServer,
}

/// `GlobalInfo`: the group parameters plus the two service public keys,
/// immutable for the lifetime of the Bulletin Board once all three legs
/// (params, TS key, VS key) have landed.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct GlobalInfo {
    pub group: Option<crate::group::GroupParameters>,
    pub public_key_tallying_server: Option<PublicKey>,
    pub public_key_voting_server: Option<PublicKey>,
}

impl GlobalInfo {
    pub fn is_ready(&self) -> bool {
        self.group.is_some() && self.public_key_tallying_server.is_some() && self.public_key_voting_server.is_some()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateResult {
    pub candidate_id: String,
    pub votes: u64,
    /// The serialized [`TallyProof`] of correct decryption for this
    /// candidate's aggregated ciphertext.
    pub proof: TallyProofField,
}

pub type TallyProofField = String;

impl CandidateResult {
    pub fn encode_proof(proof: &TallyProof) -> crate::errors::CryptoResult<TallyProofField> {
        serde_json::to_string(proof)
            .map_err(|e| crate::errors::CryptoError::MalformedBallot(format!("encoding tally proof: {e}")))
    }

    pub fn decode_proof(&self) -> crate::errors::CryptoResult<TallyProof> {
        serde_json::from_str(&self.proof)
            .map_err(|e| crate::errors::CryptoError::MalformedBallot(format!("decoding tally proof: {e}")))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElectionResult {
    pub election_id: String,
    pub results: Vec<CandidateResult>,
}

/// A memorable image token assigned to one scheduled ballot slot, carried
/// alongside the ballot so a voter can recognize which slot was theirs.
pub type ImagePath = String;
