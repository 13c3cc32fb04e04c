//! A pure-Rust implementation of group operations on secp256k1.

pub(crate) mod affine;
pub(crate) mod field;
pub(crate) mod mul;
pub(crate) mod projective;
pub(crate) mod scalar;
mod util;

#[cfg(test)]
mod test_vectors;

pub use self::{
    affine::AffinePoint,
    field::FieldElement,
    mul::{precompute, PrecomputedTable},
    projective::ProjectivePoint,
    scalar::{NonZeroScalar, Scalar},
};

/// b = 7: the constant term of the curve equation y² = x³ + 7.
pub(crate) const CURVE_EQUATION_B: FieldElement = FieldElement::from_u64(7);

#[cfg(test)]
mod tests {
    use super::CURVE_EQUATION_B;

    #[test]
    fn verify_constants() {
        assert_eq!(
            hex::encode(CURVE_EQUATION_B.to_bytes()),
            "0000000000000000000000000000000000000000000000000000000000000007"
        );
    }
}
