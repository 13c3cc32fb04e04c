//! Scalar multiplication.
//!
//! Two paths, both constant time with respect to the scalar:
//!
//! - arbitrary points go through a signed radix-16 decomposition with a
//!   locally built 8-entry table, scanned in full for every digit;
//! - the base point (and any point the caller primes a table for) goes
//!   through a precomputed windowed table of affine multiples, selected by
//!   full scan and conditionally negated, using mixed additions only.
//!
//! The number of doublings and additions per multiplication is fixed and
//! independent of the scalar value, and no memory is indexed by secret
//! data.

use super::{AffinePoint, ProjectivePoint, Scalar};
use crate::{Error, Result};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Default window width for the base-point table.
const DEFAULT_WINDOW: u32 = 8;

/// Table of the multiples `[1, 2, ..., 8] * P` of a point.
#[derive(Copy, Clone, Default)]
struct LookupTable([ProjectivePoint; 8]);

impl From<&ProjectivePoint> for LookupTable {
    fn from(p: &ProjectivePoint) -> Self {
        let mut multiples = [*p; 8];
        for i in 1..8 {
            multiples[i] = multiples[i - 1] + p;
        }
        LookupTable(multiples)
    }
}

impl LookupTable {
    /// Given a digit in `[-8, 8]`, returns `digit * P` in constant time
    /// by scanning the whole table and conditionally negating; digit 0
    /// yields the identity.
    fn select(&self, digit: i8) -> ProjectivePoint {
        debug_assert!((-8..=8).contains(&digit));

        let mask = digit >> 7;
        let abs = ((digit + mask) ^ mask) as u8;

        let mut chosen = ProjectivePoint::IDENTITY;
        for (i, entry) in self.0.iter().enumerate() {
            chosen.conditional_assign(entry, abs.ct_eq(&(i as u8 + 1)));
        }

        let negate = Choice::from((mask & 1) as u8);
        chosen.conditional_assign(&-chosen, negate);
        chosen
    }
}

/// A 256-bit scalar re-expressed in signed radix 16: 65 digits, each in
/// `[-8, 8)` except the last, which holds the trailing 0/1 carry.
struct Radix16Decomposition([i8; 65]);

impl Radix16Decomposition {
    fn new(x: &Scalar) -> Self {
        let mut digits = [0i8; 65];

        // split each byte into two nibbles, least significant digit first
        let bytes = x.to_bytes();
        for (i, byte) in bytes.iter().rev().copied().enumerate() {
            digits[2 * i] = (byte & 0xf) as i8;
            digits[2 * i + 1] = (byte >> 4) as i8;
        }

        // A nibble of 8 or more becomes its 16-complement negated, with
        // one pushed into the following digit; the spare 65th digit
        // absorbs whatever the top nibble pushes out.
        let mut carry = 0i8;
        for digit in digits.iter_mut().take(64) {
            let value = *digit + carry;
            carry = (value + 8) >> 4;
            *digit = value - (carry << 4);
        }
        digits[64] = carry;

        Self(digits)
    }
}

/// Returns `[k] x`.
pub(crate) fn mul(x: &ProjectivePoint, k: &Scalar) -> ProjectivePoint {
    let table = LookupTable::from(x);
    let digits = Radix16Decomposition::new(k);

    let mut acc = table.select(digits.0[64]);
    for i in (0..64).rev() {
        for _ in 0..4 {
            acc = acc.double();
        }
        acc += &table.select(digits.0[i]);
    }
    acc
}

/// Calculates `x * k + y * l`.
pub(crate) fn lincomb(
    x: &ProjectivePoint,
    k: &Scalar,
    y: &ProjectivePoint,
    l: &Scalar,
) -> ProjectivePoint {
    let tables = [LookupTable::from(x), LookupTable::from(y)];
    let digits = [Radix16Decomposition::new(k), Radix16Decomposition::new(l)];

    let mut acc = ProjectivePoint::IDENTITY;
    for component in 0..2 {
        acc += &tables[component].select(digits[component].0[64]);
    }

    for i in (0..64).rev() {
        for _ in 0..4 {
            acc = acc.double();
        }
        for component in 0..2 {
            acc += &tables[component].select(digits[component].0[i]);
        }
    }
    acc
}

/// Decomposes a scalar into signed base-2^w digits, one per window plus a
/// final carry digit, each in `[-2^(w-1), 2^(w-1)]`.
fn signed_digits(k: &Scalar, w: u32) -> Vec<i32> {
    let bytes = k.to_bytes();
    let bit = |i: usize| -> i32 {
        if i >= 256 {
            0
        } else {
            ((bytes[31 - (i >> 3)] >> (i & 7)) & 1) as i32
        }
    };

    let w = w as usize;
    let windows = 256usize.div_ceil(w) + 1;
    let mut digits = vec![0i32; windows];
    let mut carry = 0i32;

    for (j, digit) in digits.iter_mut().enumerate() {
        let mut val = carry;
        for b in 0..w {
            val += bit(j * w + b) << b;
        }
        // recenter so that val == digit + carry * 2^w with |digit| <= 2^(w-1);
        // a trailing val of 0 or 1 never carries, so the loop terminates
        // cleanly in the extra window
        carry = (val + (1 << (w - 1)) - 1) >> w;
        *digit = val - (carry << w);
    }
    debug_assert_eq!(carry, 0);

    digits
}

/// Precomputed table of affine multiples of a point for windowed
/// fixed-base scalar multiplication.
///
/// For window width `w`, holds `⌈256/w⌉ + 1` windows of `2^(w-1)` points;
/// window `j` stores `[1, 2, ..., 2^(w-1)] * 2^(wj) * P`. Multiplication
/// is then one constant-time selection plus one mixed addition per window,
/// with no doublings.
pub struct PrecomputedTable {
    window: u32,
    point: AffinePoint,
    tables: Vec<Vec<AffinePoint>>,
}

impl PrecomputedTable {
    /// Builds a table for the given point and window width.
    ///
    /// Fails for widths outside `[1, 16]` and for the identity point.
    pub fn new(window: u32, point: &AffinePoint) -> Result<Self> {
        if !(1..=16).contains(&window) {
            return Err(Error::InvalidWindowSize);
        }
        if point.is_identity().into() {
            return Err(Error::InvalidPoint);
        }
        Ok(Self::build(window, point))
    }

    fn build(window: u32, point: &AffinePoint) -> Self {
        let w = window as usize;
        let windows = 256usize.div_ceil(w) + 1;
        let half = 1usize << (w - 1);

        let mut projective = Vec::with_capacity(windows * half);
        let mut base = ProjectivePoint::from(point);
        for _ in 0..windows {
            let mut multiple = base;
            for _ in 0..half {
                projective.push(multiple);
                multiple += &base;
            }
            for _ in 0..w {
                base = base.double();
            }
        }

        // One inversion for the whole table.
        let affine = ProjectivePoint::batch_to_affine(&projective);
        let tables = affine.chunks(half).map(<[AffinePoint]>::to_vec).collect();

        Self {
            window,
            point: *point,
            tables,
        }
    }

    /// The window width this table was built with.
    pub fn window(&self) -> u32 {
        self.window
    }

    /// The point this table holds multiples of.
    pub fn point(&self) -> &AffinePoint {
        &self.point
    }

    /// Returns `[k] P` using this table.
    pub fn mul(&self, k: &Scalar) -> ProjectivePoint {
        let digits = signed_digits(k, self.window);
        debug_assert_eq!(digits.len(), self.tables.len());

        let mut acc = ProjectivePoint::IDENTITY;
        for (row, digit) in self.tables.iter().zip(digits) {
            acc += &select_affine(row, digit);
        }
        acc
    }
}

/// Given `|digit| <= row.len()`, returns `digit * P_row` in constant time
/// by scanning the whole row; digit 0 yields the identity.
fn select_affine(row: &[AffinePoint], digit: i32) -> AffinePoint {
    let mask = digit >> 31;
    let abs = (digit + mask) ^ mask;

    let mut t = AffinePoint::IDENTITY;
    for (j, entry) in row.iter().enumerate() {
        let c = (abs as u32).ct_eq(&(j as u32 + 1));
        t.conditional_assign(entry, c);
    }

    let neg_mask = Choice::from((mask & 1) as u8);
    t.conditional_assign(&-t, neg_mask);
    t
}

/// Process-wide table for the base point: built lazily on first use,
/// replaced by [`precompute`], snapshotted by readers via `Arc`.
static GENERATOR_TABLE: LazyLock<RwLock<Arc<PrecomputedTable>>> = LazyLock::new(|| {
    RwLock::new(Arc::new(PrecomputedTable::build(
        DEFAULT_WINDOW,
        &AffinePoint::GENERATOR,
    )))
});

fn generator_table() -> Arc<PrecomputedTable> {
    GENERATOR_TABLE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Returns `[k] G` using the process-wide base-point table.
pub(crate) fn mul_by_generator(k: &Scalar) -> ProjectivePoint {
    generator_table().mul(k)
}

/// Primes the process-wide base-point table with the given window width,
/// replacing any previously stored table, and returns a handle to it.
///
/// Fails for window widths outside `[1, 16]`. For points other than the
/// generator, build a caller-held table with [`PrecomputedTable::new`].
pub fn precompute(window: u32) -> Result<Arc<PrecomputedTable>> {
    let table = Arc::new(PrecomputedTable::new(window, &AffinePoint::GENERATOR)?);
    *GENERATOR_TABLE
        .write()
        .unwrap_or_else(PoisonError::into_inner) = table.clone();
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::{lincomb, mul_by_generator, PrecomputedTable};
    use crate::arithmetic::test_vectors::{ADD_TEST_VECTORS, MUL_TEST_VECTORS};
    use crate::{AffinePoint, Error, ProjectivePoint, Scalar};

    /// Binary double-and-add, the defining sum of the operation.
    fn mul_reference(p: &ProjectivePoint, k: &Scalar) -> ProjectivePoint {
        let bytes = k.to_bytes();
        let mut acc = ProjectivePoint::IDENTITY;
        for byte in bytes {
            for bit in (0..8).rev() {
                acc = acc.double();
                if (byte >> bit) & 1 == 1 {
                    acc += p;
                }
            }
        }
        acc
    }

    #[test]
    fn small_multiples_of_g() {
        let g = ProjectivePoint::GENERATOR;
        for (i, (expected_x, expected_y)) in ADD_TEST_VECTORS.iter().enumerate() {
            let k = Scalar::from(i as u64 + 1);
            let affine = (g * k).to_affine();
            assert_eq!(&affine.x_bytes(), expected_x);
            assert_eq!(&affine.y_bytes(), expected_y);
        }
    }

    #[test]
    fn known_scalar_multiples() {
        let g = ProjectivePoint::GENERATOR;
        for (k, expected_x, expected_y) in MUL_TEST_VECTORS {
            let k = Scalar::from_bytes(k).unwrap();

            let affine = (g * k).to_affine();
            assert_eq!(&affine.x_bytes(), expected_x);
            assert_eq!(&affine.y_bytes(), expected_y);

            let affine = mul_by_generator(&k).to_affine();
            assert_eq!(&affine.x_bytes(), expected_x);
            assert_eq!(&affine.y_bytes(), expected_y);
        }
    }

    #[test]
    fn windowed_agrees_with_double_and_add() {
        let p = ProjectivePoint::GENERATOR.double() + &ProjectivePoint::GENERATOR;
        let mut k = Scalar::from(0x1234_5678_9abc_def0u64);
        // stir in some high limbs
        k = k.mul(&k).add(&Scalar::ONE).mul(&k);

        assert_eq!(p * k, mul_reference(&p, &k));
    }

    #[test]
    fn zero_scalar_yields_identity() {
        let g = ProjectivePoint::GENERATOR;
        assert_eq!(g * Scalar::ZERO, ProjectivePoint::IDENTITY);
        assert_eq!(
            mul_by_generator(&Scalar::ZERO),
            ProjectivePoint::IDENTITY
        );
    }

    #[test]
    fn scalar_mul_distributive_laws() {
        let g = ProjectivePoint::GENERATOR;
        let a = Scalar::from(0xdead_beefu64);
        let b = Scalar::from_bytes_reduced(&[0x5a; 32]);

        // (a + b) * G == a*G + b*G
        assert_eq!(g * a.add(&b), (g * a) + &(g * b));

        // a * (b * G) == (a * b) * G
        assert_eq!((g * b) * a, g * a.mul(&b));
    }

    #[test]
    fn lincomb_matches_sum() {
        let g = ProjectivePoint::GENERATOR;
        let p = g.double() + &g; // 3G
        let k = Scalar::from(17u64);
        let l = Scalar::from_bytes_reduced(&[0xa7; 32]);

        assert_eq!(lincomb(&g, &k, &p, &l), (g * k) + &(p * l));
    }

    #[test]
    fn precomputed_tables_agree_across_window_sizes() {
        let g = AffinePoint::GENERATOR;
        let k = Scalar::from_bytes_reduced(&[0xc3; 32]);
        let expected = ProjectivePoint::GENERATOR * k;

        for window in [1, 2, 4, 5, 8] {
            let table = PrecomputedTable::new(window, &g).unwrap();
            assert_eq!(table.mul(&k), expected, "window {window}");
        }

        // n - 1, the largest valid private key, exercises the carry window
        let n_minus_1 = Scalar::ONE.negate();
        let expected = ProjectivePoint::GENERATOR * n_minus_1;
        for window in [4, 8] {
            let table = PrecomputedTable::new(window, &g).unwrap();
            assert_eq!(table.mul(&n_minus_1), expected, "window {window}");
        }
    }

    #[test]
    fn precomputed_table_for_arbitrary_point() {
        let p = (ProjectivePoint::GENERATOR * Scalar::from(1234u64)).to_affine();
        let k = Scalar::from_bytes_reduced(&[0x77; 32]);

        let table = PrecomputedTable::new(6, &p).unwrap();
        assert_eq!(table.mul(&k), ProjectivePoint::from(p) * k);
    }

    #[test]
    fn precompute_window_range() {
        assert_eq!(
            PrecomputedTable::new(0, &AffinePoint::GENERATOR).err(),
            Some(Error::InvalidWindowSize)
        );
        assert_eq!(
            PrecomputedTable::new(17, &AffinePoint::GENERATOR).err(),
            Some(Error::InvalidWindowSize)
        );
        assert_eq!(
            PrecomputedTable::new(8, &AffinePoint::IDENTITY).err(),
            Some(Error::InvalidPoint)
        );
    }
}
