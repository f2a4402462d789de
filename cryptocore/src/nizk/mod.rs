// Copyright (C) Microsoft Corporation. All rights reserved.

//! Non-interactive zero-knowledge proofs: the generic Sigma-protocol engine
//! ([`sigma`]) and the two concrete proof families built on it -- ballot
//! validity/obfuscation ([`ballot_proof`]) and correct tally decryption
//! ([`tally_proof`]).

pub mod ballot_proof;
pub mod sigma;
pub mod tally_proof;

pub use ballot_proof::BallotProof;
