//! Affine points

#![allow(clippy::op_ref)]

use super::{FieldElement, ProjectivePoint, Scalar, CURVE_EQUATION_B};
use crate::sec1::{Coordinates, EncodedPoint};
use crate::{Error, Result};
use core::ops::{Mul, Neg};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroize;

/// secp256k1 curve point expressed in affine coordinates.
#[derive(Clone, Copy, Debug)]
pub struct AffinePoint {
    /// x-coordinate
    pub(crate) x: FieldElement,

    /// y-coordinate
    pub(crate) y: FieldElement,

    /// Is this point the point at infinity? 0 = no, 1 = yes
    ///
    /// This is a proxy for [`Choice`], but uses `u8` instead to permit
    /// `const` constructors for `IDENTITY` and `GENERATOR`.
    pub(crate) infinity: u8,
}

impl AffinePoint {
    /// Additive identity of the group: the point at infinity.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        infinity: 1,
    };

    /// Base point of secp256k1.
    ///
    /// ```text
    /// Gₓ = 79be667e f9dcbbac 55a06295 ce870b07 029bfcdb 2dce28d9 59f2815b 16f81798
    /// Gᵧ = 483ada77 26a3c465 5da4fbfc 0e1108a8 fd17b448 a6855419 9c47d08f fb10d4b8
    /// ```
    pub const GENERATOR: Self = Self {
        x: FieldElement::from_bytes_unchecked(&[
            0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0, 0x62, 0x95, 0xce, 0x87,
            0x0b, 0x07, 0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b,
            0x16, 0xf8, 0x17, 0x98,
        ]),
        y: FieldElement::from_bytes_unchecked(&[
            0x48, 0x3a, 0xda, 0x77, 0x26, 0xa3, 0xc4, 0x65, 0x5d, 0xa4, 0xfb, 0xfc, 0x0e, 0x11,
            0x08, 0xa8, 0xfd, 0x17, 0xb4, 0x48, 0xa6, 0x85, 0x54, 0x19, 0x9c, 0x47, 0xd0, 0x8f,
            0xfb, 0x10, 0xd4, 0xb8,
        ]),
        infinity: 0,
    };

    /// Creates a new point with the given coordinates.
    pub(crate) const fn new(x: FieldElement, y: FieldElement) -> Self {
        Self { x, y, infinity: 0 }
    }

    /// Is this point the identity point?
    pub fn is_identity(&self) -> Choice {
        Choice::from(self.infinity)
    }

    /// Borrows the x-coordinate.
    pub fn x(&self) -> &FieldElement {
        &self.x
    }

    /// Big-endian x-coordinate. The identity yields all zeroes.
    pub fn x_bytes(&self) -> [u8; 32] {
        self.x.to_bytes()
    }

    /// Big-endian y-coordinate. The identity yields all zeroes.
    pub fn y_bytes(&self) -> [u8; 32] {
        self.y.to_bytes()
    }

    /// Is the y-coordinate odd in the SEC1 sense: `y mod 2 == 1`?
    pub fn y_is_odd(&self) -> Choice {
        self.y.is_odd()
    }

    /// Decompresses a point from its x-coordinate and the parity of its
    /// y-coordinate, solving y² = x³ + 7.
    ///
    /// Returns `None` if x names no curve point (x ≥ p, or x³ + 7 is a
    /// non-residue).
    pub fn decompress(x_bytes: &[u8; 32], y_is_odd: Choice) -> CtOption<Self> {
        FieldElement::from_bytes(x_bytes).and_then(|x| {
            let alpha = (x * &x * &x) + &CURVE_EQUATION_B;
            let beta = alpha.sqrt();

            beta.map(|beta| {
                let y = FieldElement::conditional_select(
                    &beta.negate(),
                    &beta,
                    beta.is_odd().ct_eq(&y_is_odd),
                );

                Self::new(x, y)
            })
        })
    }

    /// Attempts to parse the given [`EncodedPoint`] as a point on the curve.
    ///
    /// Returns `None` if the coordinates do not satisfy y² = x³ + 7.
    pub fn from_encoded_point(encoded: &EncodedPoint) -> CtOption<Self> {
        match encoded.coordinates() {
            Coordinates::Compressed { x, y_is_odd } => {
                Self::decompress(&x, Choice::from(y_is_odd as u8))
            }
            Coordinates::Uncompressed { x, y } => {
                let x = FieldElement::from_bytes(&x);
                let y = FieldElement::from_bytes(&y);

                x.and_then(|x| {
                    y.and_then(|y| {
                        // Check that the point is on the curve
                        let lhs = y * &y;
                        let rhs = x * &x * &x + &CURVE_EQUATION_B;
                        CtOption::new(Self::new(x, y), lhs.ct_eq(&rhs))
                    })
                })
            }
        }
    }

    /// Returns the SEC1 encoding of this point, or an error for the
    /// identity (which has no wire form).
    pub fn to_encoded_point(&self, compress: bool) -> Result<EncodedPoint> {
        if self.is_identity().into() {
            return Err(Error::InvalidPoint);
        }

        Ok(EncodedPoint::from_affine_coordinates(
            &self.x.to_bytes(),
            &self.y.to_bytes(),
            compress,
        ))
    }
}

impl ConditionallySelectable for AffinePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            infinity: u8::conditional_select(&a.infinity, &b.infinity, choice),
        }
    }
}

impl ConstantTimeEq for AffinePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.x.ct_eq(&other.x) & self.y.ct_eq(&other.y) & self.infinity.ct_eq(&other.infinity)
    }
}

impl PartialEq for AffinePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for AffinePoint {}

impl Default for AffinePoint {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Neg for AffinePoint {
    type Output = AffinePoint;

    fn neg(self) -> Self::Output {
        Self {
            x: self.x,
            y: self.y.negate(),
            infinity: self.infinity,
        }
    }
}

impl Mul<Scalar> for AffinePoint {
    type Output = ProjectivePoint;

    fn mul(self, scalar: Scalar) -> ProjectivePoint {
        ProjectivePoint::from(self) * scalar
    }
}

impl Mul<&Scalar> for AffinePoint {
    type Output = ProjectivePoint;

    fn mul(self, scalar: &Scalar) -> ProjectivePoint {
        ProjectivePoint::from(self) * scalar
    }
}

impl TryFrom<&EncodedPoint> for AffinePoint {
    type Error = Error;

    fn try_from(encoded: &EncodedPoint) -> Result<Self> {
        Option::from(Self::from_encoded_point(encoded)).ok_or(Error::InvalidPoint)
    }
}

impl Zeroize for AffinePoint {
    fn zeroize(&mut self) {
        self.x.zeroize();
        self.y.zeroize();
        self.infinity = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::AffinePoint;
    use crate::sec1::EncodedPoint;
    use hex_literal::hex;
    use subtle::Choice;

    const UNCOMPRESSED_BASEPOINT: &[u8] = &hex!(
        "0479BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798
         483ADA7726A3C4655DA4FBFC0E1108A8FD17B448A68554199C47D08FFB10D4B8"
    );
    const COMPRESSED_BASEPOINT: &[u8] =
        &hex!("0279BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798");

    #[test]
    fn uncompressed_round_trip() {
        let pubkey = EncodedPoint::from_bytes(UNCOMPRESSED_BASEPOINT).unwrap();
        let point = AffinePoint::try_from(&pubkey).unwrap();
        assert_eq!(point, AffinePoint::GENERATOR);
        assert_eq!(point.to_encoded_point(false).unwrap(), pubkey);
    }

    #[test]
    fn compressed_round_trip() {
        let pubkey = EncodedPoint::from_bytes(COMPRESSED_BASEPOINT).unwrap();
        let point = AffinePoint::try_from(&pubkey).unwrap();
        assert_eq!(point, AffinePoint::GENERATOR);
        assert_eq!(point.to_encoded_point(true).unwrap(), pubkey);
    }

    #[test]
    fn uncompressed_to_compressed() {
        let encoded = EncodedPoint::from_bytes(UNCOMPRESSED_BASEPOINT).unwrap();
        let res = AffinePoint::try_from(&encoded)
            .unwrap()
            .to_encoded_point(true)
            .unwrap();
        assert_eq!(res.as_bytes(), COMPRESSED_BASEPOINT);
    }

    #[test]
    fn compressed_to_uncompressed() {
        let encoded = EncodedPoint::from_bytes(COMPRESSED_BASEPOINT).unwrap();
        let res = AffinePoint::try_from(&encoded)
            .unwrap()
            .to_encoded_point(false)
            .unwrap();
        assert_eq!(res.as_bytes(), UNCOMPRESSED_BASEPOINT);
    }

    #[test]
    fn decompression_parity() {
        let even = AffinePoint::decompress(&AffinePoint::GENERATOR.x_bytes(), Choice::from(0))
            .unwrap();
        assert_eq!(even, AffinePoint::GENERATOR);

        let odd =
            AffinePoint::decompress(&AffinePoint::GENERATOR.x_bytes(), Choice::from(1)).unwrap();
        assert_eq!(odd, -AffinePoint::GENERATOR);
        assert!(bool::from(odd.y_is_odd()));
    }

    #[test]
    fn reject_x_not_below_field_modulus() {
        // x = p
        let p = hex!("fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f");
        assert!(bool::from(
            AffinePoint::decompress(&p, Choice::from(0)).is_none()
        ));
    }

    #[test]
    fn reject_off_curve_uncompressed() {
        let mut bytes = UNCOMPRESSED_BASEPOINT.to_vec();
        bytes[64] ^= 1; // corrupt y
        let encoded = EncodedPoint::from_bytes(&bytes).unwrap();
        assert!(AffinePoint::try_from(&encoded).is_err());
    }

    #[test]
    fn identity_has_no_encoding() {
        assert!(AffinePoint::IDENTITY.to_encoded_point(true).is_err());
        assert!(AffinePoint::IDENTITY.to_encoded_point(false).is_err());
    }

    #[test]
    fn affine_negation() {
        let basepoint = AffinePoint::GENERATOR;
        assert_eq!(-(-basepoint), basepoint);
    }
}
