// Copyright (C) Microsoft Corporation. All rights reserved.

//! Serde helpers for carrying binary cryptographic material (EC points, scalars,
//! proofs) as base64 strings inside JSON, per the wire format used by every
//! service boundary in this system.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    B64.encode(bytes)
}

pub fn decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    B64.decode(s)
}

/// Serializes bytes as a base64 string. For use with `#[serde(with = "util::b64")]`.
pub fn serialize<S, T>(bytes: T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    encode(bytes).serialize(serializer)
}

/// Deserializes a base64 string into bytes. For use with `#[serde(with = "util::b64")]`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips() {
        let bytes = b"some ciphertext bytes\x00\x01\xff";
        let encoded = encode(bytes);
        let decoded = decode(&encoded).expect("valid base64");
        assert_eq!(decoded, bytes);
    }
}
