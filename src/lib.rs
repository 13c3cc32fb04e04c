//! Pure-Rust, self-contained secp256k1 elliptic curve.
//!
//! ## About
//!
//! This crate implements the secp256k1 curve (as specified in Certicom's
//! [SEC 2]: y² = x³ + 7 over a ~256-bit prime field) from the field
//! arithmetic up, with no external curve machinery:
//!
//! - field and scalar arithmetic on 64-bit limbs, constant time for
//!   secret values;
//! - Jacobian point arithmetic with constant-time windowed scalar
//!   multiplication and a precomputed, process-wide table for the base
//!   point;
//! - deterministic ECDSA per [RFC 6979] with canonical low-s signatures,
//!   public key recovery, and strict DER serialization;
//! - [BIP340] Schnorr signatures with x-only public keys;
//! - ECDH key agreement.
//!
//! It aims for correctness against the published test vectors and
//! algorithmic resistance to timing attacks: no secret-dependent branches
//! or table indexes. It makes no micro-architectural claims.
//!
//! ## ⚠️ Security Warning
//!
//! The curve arithmetic contained in this crate has never been
//! independently audited! USE AT YOUR OWN RISK!
//!
//! ## Signing example
//!
//! ```
//! use secp256k1_pure::ecdsa::SigningKey;
//!
//! let signing_key = SigningKey::random(rand_core::OsRng);
//! let message = b"ECDSA proves knowledge of a secret number in the context of a single message";
//!
//! let signature = signing_key.sign(message);
//! assert!(signing_key.verifying_key().verify(message, &signature).is_ok());
//! ```
//!
//! [SEC 2]: https://www.secg.org/sec2-v2.pdf
//! [RFC 6979]: https://datatracker.ietf.org/doc/html/rfc6979
//! [BIP340]: https://github.com/bitcoin/bips/blob/master/bip-0340.mediawiki

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

mod arithmetic;
mod error;
mod public_key;
mod rfc6979;
mod secret_key;

pub mod ecdh;
pub mod ecdsa;
pub mod schnorr;
pub mod sec1;

pub use crate::{
    arithmetic::{
        precompute, AffinePoint, FieldElement, NonZeroScalar, PrecomputedTable, ProjectivePoint,
        Scalar,
    },
    error::{Error, Result},
    public_key::PublicKey,
    secret_key::SecretKey,
};

/// The base field modulus p = 2²⁵⁶ − 2³² − 977, big-endian.
pub const FIELD_MODULUS: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe, 0xff, 0xff,
    0xfc, 0x2f,
];

/// The order n of the base point, big-endian.
pub const ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36,
    0x41, 0x41,
];

#[cfg(test)]
mod tests {
    use super::{FIELD_MODULUS, ORDER};
    use crate::{FieldElement, Scalar};

    #[test]
    fn exported_constants_are_the_moduli() {
        // p and n themselves are exactly out of range
        assert!(bool::from(FieldElement::from_bytes(&FIELD_MODULUS).is_none()));
        assert!(bool::from(Scalar::from_bytes(&ORDER).is_none()));

        let mut p_minus_1 = FIELD_MODULUS;
        p_minus_1[31] -= 1;
        assert!(bool::from(FieldElement::from_bytes(&p_minus_1).is_some()));

        let mut n_minus_1 = ORDER;
        n_minus_1[31] -= 1;
        assert!(bool::from(Scalar::from_bytes(&n_minus_1).is_some()));
    }
}
