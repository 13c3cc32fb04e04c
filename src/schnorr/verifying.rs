//! Taproot Schnorr verifying key.

use super::{tagged_hash, Signature, CHALLENGE_TAG};
use crate::arithmetic::scalar::Scalar;
use crate::arithmetic::{mul, AffinePoint, ProjectivePoint};
use crate::{Error, PublicKey, Result};
use sha2::Digest;
use subtle::Choice;

/// Taproot Schnorr verifying key: the x-only form of a public point with
/// an even y-coordinate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VerifyingKey {
    /// Inner public key
    pub(super) inner: PublicKey,
}

impl VerifyingKey {
    /// Parses a verifying key from a big endian-encoded x-coordinate,
    /// lifting it to the curve point with even y.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let x: &[u8; 32] = bytes.try_into().map_err(|_| Error::InvalidEncoding)?;
        let point = Option::<AffinePoint>::from(AffinePoint::decompress(x, Choice::from(0)))
            .ok_or(Error::InvalidPoint)?;
        PublicKey::from_affine(point).map(|inner| Self { inner })
    }

    /// Serializes as bytes: the x-only public key.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.as_affine().x_bytes()
    }

    /// Borrows the inner [`AffinePoint`] this type wraps.
    pub fn as_affine(&self) -> &AffinePoint {
        self.inner.as_affine()
    }

    /// Verifies a BIP340 Schnorr signature over `msg` (signed as-is, no
    /// prehashing).
    pub fn verify_raw(&self, msg: &[u8], signature: &Signature) -> Result<()> {
        let (r, s) = signature.split();

        let e = Scalar::from_bytes_reduced(
            &tagged_hash(CHALLENGE_TAG)
                .chain_update(r.to_bytes())
                .chain_update(self.to_bytes())
                .chain_update(msg)
                .finalize()
                .into(),
        );

        // R' = s·G − e·P
        let big_r = mul::lincomb(
            &ProjectivePoint::GENERATOR,
            s.as_scalar(),
            &self.inner.to_projective(),
            &e.negate(),
        )
        .to_affine();

        if bool::from(big_r.is_identity())
            || bool::from(big_r.y_is_odd())
            || big_r.x() != r
        {
            return Err(Error::Verification);
        }

        Ok(())
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(vk: VerifyingKey) -> PublicKey {
        vk.inner
    }
}

impl TryFrom<PublicKey> for VerifyingKey {
    type Error = Error;

    fn try_from(public_key: PublicKey) -> Result<VerifyingKey> {
        if public_key.as_affine().y_is_odd().into() {
            Err(Error::InvalidPoint)
        } else {
            Ok(Self { inner: public_key })
        }
    }
}
