// Copyright (C) Microsoft Corporation. All rights reserved.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("proof verification failed: {0}")]
    ProofInvalid(String),

    #[error("discrete log not found within search bound {0}")]
    DiscreteLogNotFound(i64),

    #[error("malformed ballot: {0}")]
    MalformedBallot(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
