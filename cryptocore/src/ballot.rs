// Copyright (C) Microsoft Corporation. All rights reserved.

//! The Cast Ballot Record entry: the unit every service posts to, reads from
//! and verifies against the Bulletin Board. One instance of [`Ballot`] is
//! either a real vote, a VS-fabricated obfuscation ballot, or `B0`, the
//! Registration Authority's CBR-initializing ballot -- all three share the
//! same wire shape, distinguished by [`Ballot::kind`] rather than by
//! inspecting proof length (the upstream reference tells `B0` apart from a
//! later ballot by checking `len(proof_b64) < 100`; this crate carries an
//! explicit discriminant instead so a malformed proof can never be
//! misclassified as an initialization ballot).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::el_gamal::Ciphertext;
use crate::group::Point;
use crate::nizk::ballot_proof::BallotProof;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallotKind {
    /// `B0`: constructed once by the Registration Authority to seed a
    /// voter's CBR. Carries no NIZK proof of its own.
    Initialization,
    /// A ballot a voter actually cast through the Voting Server.
    RealVote,
    /// A VS-fabricated ballot re-encrypting a prior entry, indistinguishable
    /// on the wire from a real vote except for this discriminant (which is
    /// never exposed to a coercer -- only to the BB/verifier's internal
    /// bookkeeping).
    Obfuscation,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ballot {
    pub voter_id: String,
    pub election_id: String,
    pub kind: BallotKind,
    pub upk: Point,
    pub ctv: Vec<Ciphertext>,
    pub ctlv: Ciphertext,
    pub ctlid: Ciphertext,
    /// Base64-free: the NIZK proof transcript, already a self-describing
    /// serializable structure rather than an opaque blob.
    pub proof: BallotProofField,
    pub timestamp: DateTime<Utc>,
    pub hash: String,
    pub image_path: Option<crate::model::ImagePath>,
}

/// The proof travels over the wire as JSON embedded in the ballot, not as a
/// base64 string; `proof` on [`crate::hash::ballot_hash`]'s hashed-fields
/// view stringifies it canonically so the hash still matches the upstream
/// reference's "hash over the proof's encoded form" behavior.
pub type BallotProofField = String;

impl Ballot {
    pub fn encode_proof(proof: &BallotProof) -> crate::errors::CryptoResult<BallotProofField> {
        serde_json::to_string(proof)
            .map_err(|e| crate::errors::CryptoError::MalformedBallot(format!("encoding proof: {e}")))
    }

    pub fn decode_proof(&self) -> crate::errors::CryptoResult<BallotProof> {
        serde_json::from_str(&self.proof)
            .map_err(|e| crate::errors::CryptoError::MalformedBallot(format!("decoding proof: {e}")))
    }

    /// `B0` carries no NIZK proof; its `proof` field instead holds the
    /// single randomness `r0` used to build every one of its ciphertexts
    /// (base64 of the scalar's byte encoding).
    pub fn encode_b0_randomness(r0: crate::group::Scalar) -> BallotProofField {
        util::b64::encode(r0.to_bytes())
    }

    pub fn decode_b0_randomness(&self) -> crate::errors::CryptoResult<crate::group::Scalar> {
        let bytes = util::b64::decode(&self.proof)
            .map_err(|e| crate::errors::CryptoError::Decode(format!("decoding B0 randomness: {e}")))?;
        crate::group::Scalar::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::el_gamal;
    use crate::group::Scalar;
    use crate::hash::ballot_hash;

    fn sample_ballot(kind: BallotKind, proof: String) -> Ballot {
        let mut rng = rand::rngs::OsRng;
        let sk = el_gamal::SecretKey::random(&mut rng);
        let ct = el_gamal::encrypt(sk.public_key(), 0, Scalar::random(&mut rng));
        let mut ballot = Ballot {
            voter_id: "voter-1".into(),
            election_id: "election-1".into(),
            kind,
            upk: Point::generator() * Scalar::random(&mut rng),
            ctv: vec![ct],
            ctlv: ct,
            ctlid: ct,
            proof,
            timestamp: Utc::now(),
            hash: String::new(),
            image_path: Some("lighthouse.png".into()),
        };
        ballot.hash = ballot_hash(&ballot).expect("hash");
        ballot
    }

    #[test]
    fn b0_randomness_round_trips() {
        let r0 = Scalar::random(&mut rand::rngs::OsRng);
        let encoded = Ballot::encode_b0_randomness(r0);
        let ballot = sample_ballot(BallotKind::Initialization, encoded);
        let decoded = ballot.decode_b0_randomness().expect("decode");
        assert_eq!(decoded.to_bytes(), r0.to_bytes());
    }

    #[test]
    fn hash_is_stable_for_identical_fields() {
        let a = sample_ballot(BallotKind::RealVote, "{}".into());
        let mut b = a.clone();
        b.timestamp = a.timestamp + chrono::Duration::seconds(5);
        b.image_path = Some("different-image.png".into());
        assert_eq!(ballot_hash(&a).expect("hash"), ballot_hash(&b).expect("hash"));
    }

    #[test]
    fn hash_changes_with_ctv() {
        let a = sample_ballot(BallotKind::RealVote, "{}".into());
        let mut b = a.clone();
        b.ctv[0].c0 = b.ctv[0].c0 + b.ctv[0].c0;
        assert_ne!(ballot_hash(&a).expect("hash"), ballot_hash(&b).expect("hash"));
    }
}
