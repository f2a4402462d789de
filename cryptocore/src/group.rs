// Copyright (C) Microsoft Corporation. All rights reserved.

//! The elliptic-curve group (G, g, q) that every ElGamal ciphertext and NIZK
//! proof in this system is built over.
//!
//! The upstream reference implementation works over a safe-prime multiplicative
//! group; this system's data model calls for an elliptic curve group instead,
//! so this module is built on `k256` (secp256k1), following the sibling ECDH/ECIES
//! example in the retrieval pack. All higher layers (`el_gamal`, `nizk`) talk to
//! the curve exclusively through [`Scalar`] and [`Point`] so a different curve
//! could be swapped in here without touching the protocol logic above it.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use k256::elliptic_curve::group::{Group as _, GroupEncoding};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::Field as _;
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::errors::{CryptoError, CryptoResult};

/// Human-readable name of the curve backing this deployment, carried in
/// `GlobalInfo` on the Bulletin Board so a reader of the wire format knows
/// which group the base64 points belong to.
pub const GROUP_NAME: &str = "secp256k1";

/// A scalar in `Z_q`, the field over which all ElGamal randomness, secret
/// keys and NIZK witnesses/responses live.
#[derive(Clone, Copy, PartialEq, Eq, Zeroize)]
pub struct Scalar(pub(crate) k256::Scalar);

impl Scalar {
    pub fn zero() -> Self {
        Scalar(k256::Scalar::ZERO)
    }

    pub fn one() -> Self {
        Scalar(k256::Scalar::ONE)
    }

    pub fn from_u64(n: u64) -> Self {
        Scalar(k256::Scalar::from(n))
    }

    /// A uniformly random nonzero-biased scalar in `Z_q`.
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        Scalar(k256::Scalar::random(rng))
    }

    /// The multiplicative inverse, or `None` if `self` is zero.
    pub fn invert(&self) -> Option<Self> {
        let inv = self.0.invert();
        if bool::from(inv.is_some()) {
            Some(Scalar(inv.into_option()?))
        } else {
            None
        }
    }

    pub fn is_zero(&self) -> bool {
        bool::from(k256::elliptic_curve::Field::is_zero(&self.0))
    }

    pub fn neg(&self) -> Self {
        Scalar(-self.0)
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0.to_bytes().into()
    }

    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != 32 {
            return Err(CryptoError::Decode("scalar must be 32 bytes".into()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        let ct = k256::Scalar::from_repr(arr.into());
        if bool::from(ct.is_some()) {
            #[allow(clippy::unwrap_used)]
            Ok(Scalar(ct.unwrap()))
        } else {
            Err(CryptoError::Decode("scalar out of range".into()))
        }
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar(..)")
    }
}

impl Add for Scalar {
    type Output = Scalar;
    fn add(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 + rhs.0)
    }
}

impl Sub for Scalar {
    type Output = Scalar;
    fn sub(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 - rhs.0)
    }
}

impl Mul for Scalar {
    type Output = Scalar;
    fn mul(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 * rhs.0)
    }
}

impl Neg for Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        Scalar(-self.0)
    }
}

impl Serialize for Scalar {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        util::b64::encode(self.to_bytes()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = util::b64::decode(&s).map_err(serde::de::Error::custom)?;
        Scalar::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

//=================================================================================================|

/// A point in `G`. `Identity` is the group's neutral element (encodes plaintext `0`).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Point(pub(crate) k256::ProjectivePoint);

impl Point {
    pub fn identity() -> Self {
        Point(k256::ProjectivePoint::IDENTITY)
    }

    pub fn generator() -> Self {
        Point(k256::ProjectivePoint::GENERATOR)
    }

    pub fn is_identity(&self) -> bool {
        bool::from(self.0.is_identity())
    }

    /// `m * G` -- encodes the small plaintext integer `m` as a group element.
    pub fn encode_u64(m: u64) -> Self {
        Point::generator() * Scalar::from_u64(m)
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let encoded = k256::EncodedPoint::from_bytes(bytes)
            .map_err(|e| CryptoError::Decode(format!("invalid point encoding: {e}")))?;
        let affine = k256::AffinePoint::from_encoded_point(&encoded);
        if bool::from(affine.is_some()) {
            #[allow(clippy::unwrap_used)]
            Ok(Point(affine.unwrap().into()))
        } else {
            Err(CryptoError::Decode("point not on curve".into()))
        }
    }

    pub fn to_affine_encoded(self) -> k256::EncodedPoint {
        self.0.to_affine().to_encoded_point(true)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({})", hex::encode(self.to_bytes()))
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point(self.0 + rhs.0)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point(self.0 - rhs.0)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point(-self.0)
    }
}

impl Mul<Scalar> for Point {
    type Output = Point;
    fn mul(self, rhs: Scalar) -> Point {
        Point(self.0 * rhs.0)
    }
}

impl Serialize for Point {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        util::b64::encode(self.to_bytes()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = util::b64::decode(&s).map_err(serde::de::Error::custom)?;
        Point::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

/// Public group parameters, generated once by the Registration Authority and
/// immutable for the lifetime of all elections on a given Bulletin Board.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupParameters {
    pub curve: String,
    pub generator: Point,
    pub order: OrderMarker,
}

/// `q`, the prime order of `G`. Not itself a [`Scalar`] (scalars live in `Z_q`,
/// they cannot represent `q` itself); kept only for display/transport.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderMarker(pub String);

impl GroupParameters {
    pub fn standard() -> Self {
        GroupParameters {
            curve: GROUP_NAME.to_string(),
            generator: Point::generator(),
            order: OrderMarker(Self::order_hex().to_string()),
        }
    }

    /// The order `q` of the curve's scalar field, as a fixed hex string.
    /// secp256k1's order is a public constant of the curve, not data we
    /// generate -- it is reproduced here only so that `GlobalInfo` has
    /// something canonical to publish for `(G, g, q)`.
    pub fn order_hex() -> &'static str {
        "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
    }
}
