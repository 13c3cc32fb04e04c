//! Projective points in Jacobian coordinates.
//!
//! `(X, Y, Z)` represents the affine point `(X/Z², Y/Z³)` when Z ≠ 0;
//! Z = 0 encodes the point at infinity. The representation is not unique:
//! equality compares affine projections by cross-multiplication.

#![allow(clippy::op_ref)]

use super::{AffinePoint, FieldElement, Scalar};
use crate::arithmetic::mul;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// A point on the secp256k1 curve in Jacobian coordinates.
#[derive(Clone, Copy, Debug)]
pub struct ProjectivePoint {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) z: FieldElement,
}

impl ProjectivePoint {
    /// Additive identity of the group: the point at infinity.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    /// Base point of secp256k1.
    pub const GENERATOR: Self = Self {
        x: AffinePoint::GENERATOR.x,
        y: AffinePoint::GENERATOR.y,
        z: FieldElement::ONE,
    };

    /// Is this point the identity?
    pub fn is_identity(&self) -> Choice {
        self.z.is_zero()
    }

    /// Returns `[k] G` using the process-wide precomputed table for the
    /// base point.
    pub fn mul_by_generator(k: &Scalar) -> Self {
        mul::mul_by_generator(k)
    }

    /// Returns the affine representation of this point, or the affine
    /// identity if this is the point at infinity.
    pub fn to_affine(&self) -> AffinePoint {
        self.z
            .invert()
            .map(|zinv| self.to_affine_internal(zinv))
            .unwrap_or(AffinePoint::IDENTITY)
    }

    pub(crate) fn to_affine_internal(self, zinv: FieldElement) -> AffinePoint {
        let zinv2 = zinv.square();
        AffinePoint::new(self.x * &zinv2, self.y * &(zinv2 * &zinv))
    }

    /// Converts a batch of points to affine form with a single field
    /// inversion (Montgomery's trick). Identity points come out as the
    /// affine identity.
    pub fn batch_to_affine(points: &[Self]) -> Vec<AffinePoint> {
        // Replace zero z-coordinates by one so the running product stays
        // invertible, and fix the affected outputs up afterwards.
        let mut prefix = Vec::with_capacity(points.len());
        let mut zs = Vec::with_capacity(points.len());
        let mut acc = FieldElement::ONE;

        for point in points {
            let z = FieldElement::conditional_select(&point.z, &FieldElement::ONE, point.is_identity());
            prefix.push(acc);
            acc = acc * &z;
            zs.push(z);
        }

        // acc is a product of non-zero factors
        let mut inv = acc.invert_inner();

        let mut out = vec![AffinePoint::IDENTITY; points.len()];
        for i in (0..points.len()).rev() {
            let zinv = inv * &prefix[i];
            inv = inv * &zs[i];
            out[i] = AffinePoint::conditional_select(
                &points[i].to_affine_internal(zinv),
                &AffinePoint::IDENTITY,
                points[i].is_identity(),
            );
        }

        out
    }

    /// Returns `-self`.
    fn neg(&self) -> Self {
        Self {
            x: self.x,
            y: self.y.negate(),
            z: self.z,
        }
    }

    /// Doubles this point.
    pub fn double(&self) -> Self {
        // Jacobian doubling for a = 0 (dbl-2009-l). The identity has Z = 0
        // and flows through to another Z = 0 representative.
        let a = self.x.square();
        let b = self.y.square();
        let c = b.square();
        let d = ((self.x + &b).square() - &a - &c).double();
        let e = a.double() + &a;
        let f = e.square();

        let x3 = f - &d.double();
        let y3 = e * &(d - &x3) - &c.double().double().double();
        let z3 = (self.y * &self.z).double();

        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// Returns `self + other`.
    fn add(&self, other: &Self) -> Self {
        // General Jacobian addition (add-2007-bl shape). The formula is
        // undefined when the operands share an x-image (doubling or
        // inverse pair) or when either is the identity; those cases are
        // computed alongside and selected in constant time.
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let u1 = self.x * &z2z2;
        let u2 = other.x * &z1z1;
        let s1 = self.y * &(z2z2 * &other.z);
        let s2 = other.y * &(z1z1 * &self.z);
        let h = u2 - &u1;
        let r = s2 - &s1;

        let hh = h.square();
        let hhh = hh * &h;
        let v = u1 * &hh;

        let x3 = r.square() - &hhh - &v.double();
        let y3 = r * &(v - &x3) - &(s1 * &hhh);
        let z3 = (self.z * &other.z) * &h;

        let h_is_zero = h.is_zero();
        let r_is_zero = r.is_zero();

        let mut ret = Self::conditional_select(
            &Self {
                x: x3,
                y: y3,
                z: z3,
            },
            &self.double(),
            h_is_zero & r_is_zero,
        );
        ret.conditional_assign(
            &Self::IDENTITY,
            h_is_zero & !r_is_zero & !self.is_identity() & !other.is_identity(),
        );
        ret.conditional_assign(other, self.is_identity());
        ret.conditional_assign(self, other.is_identity());
        ret
    }

    /// Returns `self + other`.
    fn add_mixed(&self, other: &AffinePoint) -> Self {
        // Mixed addition with Z2 = 1.
        let z1z1 = self.z.square();
        let u2 = other.x * &z1z1;
        let s2 = other.y * &(z1z1 * &self.z);
        let h = u2 - &self.x;
        let r = s2 - &self.y;

        let hh = h.square();
        let hhh = hh * &h;
        let v = self.x * &hh;

        let x3 = r.square() - &hhh - &v.double();
        let y3 = r * &(v - &x3) - &(self.y * &hhh);
        let z3 = self.z * &h;

        let h_is_zero = h.is_zero();
        let r_is_zero = r.is_zero();

        let mut ret = Self::conditional_select(
            &Self {
                x: x3,
                y: y3,
                z: z3,
            },
            &self.double(),
            h_is_zero & r_is_zero,
        );
        ret.conditional_assign(
            &Self::IDENTITY,
            h_is_zero & !r_is_zero & !self.is_identity() & !other.is_identity(),
        );
        ret.conditional_assign(&Self::from(*other), self.is_identity());
        ret.conditional_assign(self, other.is_identity());
        ret
    }

    /// Returns `self - other`.
    fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Returns `self - other`.
    fn sub_mixed(&self, other: &AffinePoint) -> Self {
        self.add_mixed(&(-*other))
    }

    /// Checks whether `self` is equal to an affine point.
    ///
    /// This is a lot faster than converting `self` to an `AffinePoint`
    /// first, since it avoids the inversion.
    pub fn eq_affine(&self, other: &AffinePoint) -> Choice {
        let z1z1 = self.z.square();
        let x_eq = (other.x * &z1z1).ct_eq(&self.x);
        let y_eq = (other.y * &(z1z1 * &self.z)).ct_eq(&self.y);

        let both_identity = self.is_identity() & other.is_identity();
        let neither_identity = !self.is_identity() & !other.is_identity();
        both_identity | (neither_identity & x_eq & y_eq)
    }
}

impl From<AffinePoint> for ProjectivePoint {
    fn from(p: AffinePoint) -> Self {
        let projective = Self {
            x: p.x,
            y: p.y,
            z: FieldElement::ONE,
        };
        Self::conditional_select(&projective, &Self::IDENTITY, p.is_identity())
    }
}

impl From<&AffinePoint> for ProjectivePoint {
    fn from(p: &AffinePoint) -> Self {
        Self::from(*p)
    }
}

impl From<ProjectivePoint> for AffinePoint {
    fn from(p: ProjectivePoint) -> AffinePoint {
        p.to_affine()
    }
}

impl ConditionallySelectable for ProjectivePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl ConstantTimeEq for ProjectivePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        // Compare the affine images by cross-multiplication:
        // X₁Z₂² = X₂Z₁² and Y₁Z₂³ = Y₂Z₁³. A lone identity operand never
        // compares equal since its cross-products collapse to zero while
        // the other side's do not.
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();

        let x_eq = (self.x * &z2z2).ct_eq(&(other.x * &z1z1));
        let y_eq = (self.y * &(z2z2 * &other.z)).ct_eq(&(other.y * &(z1z1 * &self.z)));

        let both_identity = self.is_identity() & other.is_identity();
        let neither_identity = !self.is_identity() & !other.is_identity();
        both_identity | (neither_identity & x_eq & y_eq)
    }
}

impl PartialEq for ProjectivePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl PartialEq<AffinePoint> for ProjectivePoint {
    fn eq(&self, other: &AffinePoint) -> bool {
        self.eq_affine(other).into()
    }
}

impl PartialEq<ProjectivePoint> for AffinePoint {
    fn eq(&self, other: &ProjectivePoint) -> bool {
        other.eq_affine(self).into()
    }
}

impl Eq for ProjectivePoint {}

impl Default for ProjectivePoint {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Add<ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(&self, &other)
    }
}

impl Add<&ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(&self, other)
    }
}

impl Add<&ProjectivePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(self, other)
    }
}

impl AddAssign<ProjectivePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: ProjectivePoint) {
        *self = ProjectivePoint::add(self, &rhs);
    }
}

impl AddAssign<&ProjectivePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: &ProjectivePoint) {
        *self = ProjectivePoint::add(self, rhs);
    }
}

impl Add<AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: AffinePoint) -> ProjectivePoint {
        ProjectivePoint::add_mixed(&self, &other)
    }
}

impl Add<&AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::add_mixed(&self, other)
    }
}

impl AddAssign<AffinePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: AffinePoint) {
        *self = ProjectivePoint::add_mixed(self, &rhs);
    }
}

impl AddAssign<&AffinePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: &AffinePoint) {
        *self = ProjectivePoint::add_mixed(self, rhs);
    }
}

impl Sub<ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::sub(&self, &other)
    }
}

impl Sub<&ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::sub(&self, other)
    }
}

impl SubAssign<ProjectivePoint> for ProjectivePoint {
    fn sub_assign(&mut self, rhs: ProjectivePoint) {
        *self = ProjectivePoint::sub(self, &rhs);
    }
}

impl Sub<AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: AffinePoint) -> ProjectivePoint {
        ProjectivePoint::sub_mixed(&self, &other)
    }
}

impl SubAssign<AffinePoint> for ProjectivePoint {
    fn sub_assign(&mut self, rhs: AffinePoint) {
        *self = ProjectivePoint::sub_mixed(self, &rhs);
    }
}

impl Mul<Scalar> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, other: Scalar) -> ProjectivePoint {
        mul::mul(&self, &other)
    }
}

impl Mul<&Scalar> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, other: &Scalar) -> ProjectivePoint {
        mul::mul(&self, other)
    }
}

impl Mul<&Scalar> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, other: &Scalar) -> ProjectivePoint {
        mul::mul(self, other)
    }
}

impl MulAssign<Scalar> for ProjectivePoint {
    fn mul_assign(&mut self, rhs: Scalar) {
        *self = mul::mul(self, &rhs);
    }
}

impl MulAssign<&Scalar> for ProjectivePoint {
    fn mul_assign(&mut self, rhs: &Scalar) {
        *self = mul::mul(self, rhs);
    }
}

impl Neg for ProjectivePoint {
    type Output = ProjectivePoint;

    fn neg(self) -> ProjectivePoint {
        ProjectivePoint::neg(&self)
    }
}

impl Neg for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn neg(self) -> ProjectivePoint {
        ProjectivePoint::neg(self)
    }
}

impl Sum for ProjectivePoint {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ProjectivePoint::IDENTITY, |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::{AffinePoint, ProjectivePoint};
    use crate::arithmetic::test_vectors::ADD_TEST_VECTORS;
    use crate::Scalar;

    #[test]
    fn affine_to_projective() {
        let basepoint_affine = AffinePoint::GENERATOR;
        let basepoint_projective = ProjectivePoint::GENERATOR;

        assert_eq!(
            ProjectivePoint::from(basepoint_affine),
            basepoint_projective,
        );
        assert_eq!(basepoint_projective.to_affine(), basepoint_affine);
        assert!(!bool::from(
            basepoint_projective.to_affine().is_identity()
        ));

        assert!(bool::from(
            ProjectivePoint::IDENTITY.to_affine().is_identity()
        ));
    }

    #[test]
    fn projective_identity_addition() {
        let identity = ProjectivePoint::IDENTITY;
        let generator = ProjectivePoint::GENERATOR;

        assert_eq!(identity + &generator, generator);
        assert_eq!(generator + &identity, generator);
        assert_eq!(identity + &identity, identity);
    }

    #[test]
    fn projective_mixed_addition() {
        let identity = ProjectivePoint::IDENTITY;
        let basepoint_affine = AffinePoint::GENERATOR;
        let basepoint_projective = ProjectivePoint::GENERATOR;

        assert_eq!(identity + &basepoint_affine, basepoint_projective);
        assert_eq!(
            basepoint_projective + &basepoint_affine,
            basepoint_projective + &basepoint_projective
        );
        assert_eq!(
            basepoint_projective + &AffinePoint::IDENTITY,
            basepoint_projective
        );
    }

    #[test]
    fn test_vector_repeated_add() {
        let generator = ProjectivePoint::GENERATOR;
        let mut p = generator;

        for (expected_x, expected_y) in ADD_TEST_VECTORS {
            let affine = p.to_affine();
            assert_eq!(&affine.x_bytes(), expected_x);
            assert_eq!(&affine.y_bytes(), expected_y);

            p += &generator;
        }
    }

    #[test]
    fn test_vector_repeated_add_mixed() {
        let generator = AffinePoint::GENERATOR;
        let mut p = ProjectivePoint::GENERATOR;

        for (expected_x, expected_y) in ADD_TEST_VECTORS {
            let affine = p.to_affine();
            assert_eq!(&affine.x_bytes(), expected_x);
            assert_eq!(&affine.y_bytes(), expected_y);

            p += &generator;
        }
    }

    #[test]
    fn test_vector_double_generator() {
        let generator = ProjectivePoint::GENERATOR;
        let mut p = generator;

        for (expected_x, expected_y) in ADD_TEST_VECTORS.iter().take(2) {
            let affine = p.to_affine();
            assert_eq!(&affine.x_bytes(), expected_x);
            assert_eq!(&affine.y_bytes(), expected_y);

            p = p.double();
        }
    }

    #[test]
    fn projective_add_vs_double() {
        let generator = ProjectivePoint::GENERATOR;
        assert_eq!(generator + &generator, generator.double());

        let r1 = (generator + &generator) + &(generator + &generator);
        let r2 = generator.double().double();
        assert_eq!(r1, r2);
    }

    #[test]
    fn projective_add_and_sub() {
        let basepoint_affine = AffinePoint::GENERATOR;
        let basepoint_projective = ProjectivePoint::GENERATOR;

        assert_eq!(
            (basepoint_projective + &basepoint_projective) - &basepoint_projective,
            basepoint_projective
        );
        assert_eq!(
            (basepoint_projective + &basepoint_affine) - basepoint_affine,
            basepoint_projective
        );
    }

    #[test]
    fn projective_double_and_sub() {
        let generator = ProjectivePoint::GENERATOR;
        assert_eq!(generator.double() - &generator, generator);
    }

    #[test]
    fn add_inverse_is_identity() {
        let generator = ProjectivePoint::GENERATOR;
        assert_eq!(generator + &(-generator), ProjectivePoint::IDENTITY);

        let five = generator * Scalar::from(5u64);
        assert_eq!(five + &(-five), ProjectivePoint::IDENTITY);
    }

    #[test]
    fn projective_equality() {
        assert_ne!(ProjectivePoint::GENERATOR, ProjectivePoint::IDENTITY);
        assert_ne!(ProjectivePoint::IDENTITY, ProjectivePoint::GENERATOR);
        assert_eq!(ProjectivePoint::IDENTITY, ProjectivePoint::IDENTITY);
        assert_eq!(-ProjectivePoint::IDENTITY, ProjectivePoint::IDENTITY);
        assert_eq!(ProjectivePoint::GENERATOR, ProjectivePoint::GENERATOR);
        assert_ne!(ProjectivePoint::GENERATOR, -ProjectivePoint::GENERATOR);

        assert_ne!(ProjectivePoint::GENERATOR, AffinePoint::IDENTITY);
        assert_ne!(ProjectivePoint::IDENTITY, AffinePoint::GENERATOR);
        assert_eq!(ProjectivePoint::IDENTITY, AffinePoint::IDENTITY);
        assert_eq!(ProjectivePoint::GENERATOR, AffinePoint::GENERATOR);

        // same point under different Z representatives
        let doubled = ProjectivePoint::GENERATOR.double();
        let affine = doubled.to_affine();
        assert_eq!(doubled, ProjectivePoint::from(affine));
    }

    #[test]
    fn batch_to_affine_matches_individual() {
        let g = ProjectivePoint::GENERATOR;
        let points = [
            g,
            g.double(),
            ProjectivePoint::IDENTITY,
            g.double() + &g,
        ];
        let batch = ProjectivePoint::batch_to_affine(&points);
        for (projective, affine) in points.iter().zip(&batch) {
            assert_eq!(&projective.to_affine(), affine);
        }
    }
}
