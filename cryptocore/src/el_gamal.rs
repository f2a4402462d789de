// Copyright (C) Microsoft Corporation. All rights reserved.

//! Exponential ElGamal over the curve group in [`crate::group`].
//!
//! A ciphertext `(c0, c1) = (r*G, m*G + r*pk)` hides a small integer message
//! `m` behind the generator rather than encoding it directly, so recovering
//! `m` from a decrypted point needs [`crate::discrete_log`]. This is what lets
//! the scheme be additively homomorphic, which both the Voting Server's
//! re-encryption/obfuscation step and the Tallying Server's vote aggregation
//! depend on.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::group::{Point, Scalar};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    pub c0: Point,
    pub c1: Point,
}

#[derive(Clone, Zeroize)]
pub struct SecretKey(pub(crate) Scalar);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey(pub Point);

impl SecretKey {
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        SecretKey(Scalar::random(rng))
    }

    pub fn from_scalar(scalar: Scalar) -> Self {
        SecretKey(scalar)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(Point::generator() * self.0)
    }

    pub fn scalar(&self) -> Scalar {
        self.0
    }
}

/// Serialized the same way as [`Scalar`] (base64 of its byte encoding), so a
/// service's private key file on disk is just `{"sk": "<base64>"}`-shaped
/// JSON rather than a bespoke format.
impl Serialize for SecretKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Scalar::deserialize(deserializer).map(SecretKey)
    }
}

/// Encrypts the small integer `m` under `pk`, using fresh randomness `r`.
pub fn encrypt(pk: PublicKey, m: u64, r: Scalar) -> Ciphertext {
    Ciphertext {
        c0: Point::generator() * r,
        c1: Point::encode_u64(m) + pk.0 * r,
    }
}

/// Encrypts an already-encoded point `m_point` (used when the message is a
/// group element rather than a small integer, e.g. a voter's public key).
pub fn encrypt_point(pk: PublicKey, m_point: Point, r: Scalar) -> Ciphertext {
    Ciphertext {
        c0: Point::generator() * r,
        c1: m_point + pk.0 * r,
    }
}

/// Re-randomizes a ciphertext with fresh randomness `r`, without changing the
/// plaintext it hides. This is the operation the Voting Server uses to turn
/// a voter's earlier real ballot into an indistinguishable obfuscation ballot.
pub fn re_encrypt(pk: PublicKey, ct: Ciphertext, r: Scalar) -> Ciphertext {
    Ciphertext {
        c0: ct.c0 + Point::generator() * r,
        c1: ct.c1 + pk.0 * r,
    }
}

/// Decrypts to the underlying group element `m*G`. Recovering the integer
/// `m` itself requires a further discrete-log search (see
/// [`crate::discrete_log`]) since this scheme is exponential ElGamal.
pub fn decrypt_to_point(sk: &SecretKey, ct: Ciphertext) -> Point {
    ct.c1 - ct.c0 * sk.0
}

/// Componentwise homomorphic sum of two ciphertexts encrypted under the same
/// public key: `Enc(a) + Enc(b) = Enc(a + b)`.
pub fn add(a: Ciphertext, b: Ciphertext) -> Ciphertext {
    Ciphertext {
        c0: a.c0 + b.c0,
        c1: a.c1 + b.c1,
    }
}

/// Componentwise homomorphic difference: `Enc(a) - Enc(b) = Enc(a - b)`.
pub fn sub(a: Ciphertext, b: Ciphertext) -> Ciphertext {
    Ciphertext {
        c0: a.c0 - b.c0,
        c1: a.c1 - b.c1,
    }
}

/// Componentwise scaling by a public scalar: `k * Enc(m) = Enc(k*m)`.
pub fn scale(ct: Ciphertext, k: Scalar) -> Ciphertext {
    Ciphertext {
        c0: ct.c0 * k,
        c1: ct.c1 * k,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encrypt_decrypt_round_trip() {
        let mut rng = rand::rngs::OsRng;
        let sk = SecretKey::random(&mut rng);
        let r = Scalar::random(&mut rng);
        let ct = encrypt(sk.public_key(), 7, r);
        let m_point = decrypt_to_point(&sk, ct);
        assert_eq!(m_point, Point::encode_u64(7));
    }

    #[test]
    fn re_encryption_preserves_plaintext() {
        let mut rng = rand::rngs::OsRng;
        let sk = SecretKey::random(&mut rng);
        let ct = encrypt(sk.public_key(), 1, Scalar::random(&mut rng));
        let ct2 = re_encrypt(sk.public_key(), ct, Scalar::random(&mut rng));
        assert_ne!(ct.c0, ct2.c0);
        assert_eq!(
            decrypt_to_point(&sk, ct),
            decrypt_to_point(&sk, ct2)
        );
    }

    #[test]
    fn homomorphic_scale_and_sub() {
        let mut rng = rand::rngs::OsRng;
        let sk = SecretKey::random(&mut rng);
        let ct = encrypt(sk.public_key(), 5, Scalar::random(&mut rng));
        let doubled = scale(ct, Scalar::from_u64(2));
        assert_eq!(decrypt_to_point(&sk, doubled), Point::encode_u64(10));

        let ct_a = encrypt(sk.public_key(), 9, Scalar::random(&mut rng));
        let ct_b = encrypt(sk.public_key(), 4, Scalar::random(&mut rng));
        let diff = sub(ct_a, ct_b);
        assert_eq!(decrypt_to_point(&sk, diff), Point::encode_u64(5));
    }

    #[test]
    fn homomorphic_sum() {
        let mut rng = rand::rngs::OsRng;
        let sk = SecretKey::random(&mut rng);
        let ct_a = encrypt(sk.public_key(), 2, Scalar::random(&mut rng));
        let ct_b = encrypt(sk.public_key(), 3, Scalar::random(&mut rng));
        let summed = add(ct_a, ct_b);
        assert_eq!(decrypt_to_point(&sk, summed), Point::encode_u64(5));
    }
}
