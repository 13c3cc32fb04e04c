//! Taproot Schnorr signatures as defined in [BIP340].
//!
//! Schnorr signatures over secp256k1 use x-only public keys (the implicit
//! y-coordinate is always even) and tagged hashes for domain separation.
//! Because they are intended for consensus-critical applications, BIP340
//! is fully specified such that no two implementations should disagree on
//! the validity of a signature; the test suite below carries the upstream
//! test vectors.
//!
//! [BIP340]: https://github.com/bitcoin/bips/blob/master/bip-0340.mediawiki

#![allow(non_snake_case, clippy::many_single_char_names)]

mod signing;
mod verifying;

pub use self::{signing::SigningKey, verifying::VerifyingKey};

use crate::arithmetic::scalar::NonZeroScalar;
use crate::arithmetic::FieldElement;
use crate::{Error, Result};
use core::fmt;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const AUX_TAG: &[u8] = b"BIP0340/aux";
const NONCE_TAG: &[u8] = b"BIP0340/nonce";
const CHALLENGE_TAG: &[u8] = b"BIP0340/challenge";

/// Taproot Schnorr signature serialized as bytes.
pub type SignatureBytes = [u8; Signature::BYTE_SIZE];

/// Taproot Schnorr signature as defined in [BIP340].
///
/// [BIP340]: https://github.com/bitcoin/bips/blob/master/bip-0340.mediawiki
#[derive(Copy, Clone)]
pub struct Signature {
    r: FieldElement,
    s: NonZeroScalar,
}

impl Signature {
    /// Size of a Taproot Schnorr signature in bytes.
    pub const BYTE_SIZE: usize = 64;

    /// Serialize this signature as bytes.
    pub fn to_bytes(&self) -> SignatureBytes {
        let mut ret = [0; Self::BYTE_SIZE];
        let (r_bytes, s_bytes) = ret.split_at_mut(Self::BYTE_SIZE / 2);
        r_bytes.copy_from_slice(&self.r.to_bytes());
        s_bytes.copy_from_slice(&self.s.to_bytes());
        ret
    }

    /// Get the `r` component of this signature.
    fn r(&self) -> &FieldElement {
        &self.r
    }

    /// Get the `s` component of this signature.
    fn s(&self) -> &NonZeroScalar {
        &self.s
    }

    /// Split this signature into its `r` and `s` components.
    fn split(&self) -> (&FieldElement, &NonZeroScalar) {
        (self.r(), self.s())
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        (self.r.ct_eq(&other.r) & self.s.ct_eq(&other.s)).into()
    }
}

impl Eq for Signature {}

impl TryFrom<&[u8]> for Signature {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Signature> {
        if bytes.len() != Self::BYTE_SIZE {
            return Err(Error::InvalidEncoding);
        }
        let (r_bytes, s_bytes) = bytes.split_at(Self::BYTE_SIZE / 2);

        let mut r_arr = [0u8; 32];
        r_arr.copy_from_slice(r_bytes);
        let r: FieldElement =
            Option::from(FieldElement::from_bytes(&r_arr)).ok_or(Error::InvalidScalar)?;

        // one of the rules for valid signatures: !is_infinite(R)
        if r.is_zero().into() {
            return Err(Error::InvalidScalar);
        }

        let s = NonZeroScalar::try_from(s_bytes)?;

        Ok(Self { r, s })
    }
}

impl From<Signature> for SignatureBytes {
    fn from(signature: Signature) -> SignatureBytes {
        signature.to_bytes()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schnorr::Signature(")?;
        for byte in self.to_bytes() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

/// `tagged_hash(tag, msg) = SHA256(SHA256(tag) || SHA256(tag) || msg)`:
/// returns the digest pre-fed with the doubled tag hash.
fn tagged_hash(tag: &[u8]) -> Sha256 {
    let tag_hash = Sha256::digest(tag);
    let mut digest = Sha256::new();
    digest.update(tag_hash);
    digest.update(tag_hash);
    digest
}
