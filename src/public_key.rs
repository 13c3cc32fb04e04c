//! Public keys (curve points).

use crate::arithmetic::scalar::NonZeroScalar;
use crate::arithmetic::{AffinePoint, ProjectivePoint};
use crate::sec1::EncodedPoint;
use crate::{Error, Result};

/// secp256k1 public key: a point on the curve which is known not to be the
/// identity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PublicKey {
    point: AffinePoint,
}

impl PublicKey {
    /// Creates a public key from an affine point, rejecting the identity.
    pub fn from_affine(point: AffinePoint) -> Result<Self> {
        if point.is_identity().into() {
            return Err(Error::InvalidPoint);
        }
        Ok(Self { point })
    }

    /// Computes the public key for a secret scalar: `d·G`.
    ///
    /// Infallible: a non-zero scalar below the (prime) group order never
    /// lands on the identity.
    pub fn from_secret_scalar(scalar: &NonZeroScalar) -> Self {
        Self {
            point: ProjectivePoint::mul_by_generator(scalar).to_affine(),
        }
    }

    /// Parses a public key from its SEC1 encoding (compressed 33-byte or
    /// uncompressed 65-byte form).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        let encoded = EncodedPoint::from_bytes(bytes)?;
        Self::try_from(&encoded)
    }

    /// Borrows the affine point.
    pub fn as_affine(&self) -> &AffinePoint {
        &self.point
    }

    /// Converts to the projective representation.
    pub fn to_projective(&self) -> ProjectivePoint {
        ProjectivePoint::from(self.point)
    }

    /// Returns the SEC1 encoding of this public key.
    pub fn to_encoded_point(&self, compress: bool) -> EncodedPoint {
        EncodedPoint::from_affine_coordinates(
            &self.point.x_bytes(),
            &self.point.y_bytes(),
            compress,
        )
    }
}

impl TryFrom<&EncodedPoint> for PublicKey {
    type Error = Error;

    fn try_from(encoded: &EncodedPoint) -> Result<Self> {
        AffinePoint::try_from(encoded).and_then(Self::from_affine)
    }
}

impl TryFrom<AffinePoint> for PublicKey {
    type Error = Error;

    fn try_from(point: AffinePoint) -> Result<Self> {
        Self::from_affine(point)
    }
}

impl From<PublicKey> for AffinePoint {
    fn from(public_key: PublicKey) -> AffinePoint {
        public_key.point
    }
}

impl From<&PublicKey> for AffinePoint {
    fn from(public_key: &PublicKey) -> AffinePoint {
        public_key.point
    }
}
