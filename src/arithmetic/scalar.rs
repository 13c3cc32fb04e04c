//! Scalar field arithmetic modulo the curve order n.

use crate::arithmetic::util::{adc, sbb};
use crate::{Error, Result};
use rand_core::{CryptoRng, RngCore};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroize;

/// Constant representing the modulus
/// n = FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141
const MODULUS: [u64; 4] = [
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// Limbs of 2^256 minus the secp256k1 order.
const NEG_MODULUS: [u64; 4] = [!MODULUS[0] + 1, !MODULUS[1], 1, 0];

/// Constant representing the modulus / 2
const FRAC_MODULUS_2: [u64; 4] = [
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
];

/// Add a to the number defined by (c0,c1,c2). c2 must never overflow.
#[inline(always)]
fn sumadd(a: u64, c0: u64, c1: u64, c2: u64) -> (u64, u64, u64) {
    let new_c0 = c0.wrapping_add(a);
    let over = (new_c0 < a) as u64;
    let new_c1 = c1.wrapping_add(over);
    let new_c2 = c2 + ((new_c1 < over) as u64);
    (new_c0, new_c1, new_c2)
}

/// Add a to the number defined by (c0,c1). c1 must never overflow.
#[inline(always)]
fn sumadd_fast(a: u64, c0: u64, c1: u64) -> (u64, u64) {
    let new_c0 = c0.wrapping_add(a);
    let new_c1 = c1 + ((new_c0 < a) as u64);
    debug_assert!((new_c1 != 0) | (new_c0 >= a));
    (new_c0, new_c1)
}

/// Add a*b to the number defined by (c0,c1,c2). c2 must never overflow.
#[inline(always)]
fn muladd(a: u64, b: u64, c0: u64, c1: u64, c2: u64) -> (u64, u64, u64) {
    let t = (a as u128) * (b as u128);
    let th = (t >> 64) as u64; // at most 0xFFFFFFFFFFFFFFFE
    let tl = t as u64;

    let new_c0 = c0.wrapping_add(tl);
    let new_th = th + ((new_c0 < tl) as u64); // at most 0xFFFFFFFFFFFFFFFF
    let new_c1 = c1.wrapping_add(new_th);
    let new_c2 = c2 + ((new_c1 < new_th) as u64);
    debug_assert!((new_c1 >= new_th) || (new_c2 != 0));
    (new_c0, new_c1, new_c2)
}

/// Add a*b to the number defined by (c0,c1). c1 must never overflow.
#[inline(always)]
fn muladd_fast(a: u64, b: u64, c0: u64, c1: u64) -> (u64, u64) {
    let t = (a as u128) * (b as u128);
    let th = (t >> 64) as u64;
    let tl = t as u64;

    let new_c0 = c0.wrapping_add(tl);
    let new_th = th + ((new_c0 < tl) as u64);
    let new_c1 = c1 + new_th;
    debug_assert!(new_c1 >= new_th);
    (new_c0, new_c1)
}

const fn bytes_to_u64(b: &[u8; 32], offset: usize) -> u64 {
    ((b[offset] as u64) << 56)
        | ((b[offset + 1] as u64) << 48)
        | ((b[offset + 2] as u64) << 40)
        | ((b[offset + 3] as u64) << 32)
        | ((b[offset + 4] as u64) << 24)
        | ((b[offset + 5] as u64) << 16)
        | ((b[offset + 6] as u64) << 8)
        | (b[offset + 7] as u64)
}

const fn bytes_to_words(b: &[u8; 32]) -> [u64; 4] {
    [
        bytes_to_u64(b, 24),
        bytes_to_u64(b, 16),
        bytes_to_u64(b, 8),
        bytes_to_u64(b, 0),
    ]
}

/// An element in the finite field modulo the curve order n, in a fully
/// reduced form on four 64-bit limbs (little-endian limb order).
#[derive(Clone, Copy, Debug, Default)]
pub struct Scalar(pub(crate) [u64; 4]);

impl Scalar {
    /// Zero scalar.
    pub const ZERO: Self = Self([0, 0, 0, 0]);

    /// Multiplicative identity.
    pub const ONE: Self = Self([1, 0, 0, 0]);

    /// Attempts to parse the given byte array as an SEC1-encoded scalar.
    ///
    /// Returns None if the byte array does not contain a big-endian integer
    /// in the range [0, n). This is the reduction-rejecting parse used for
    /// private keys and signature components.
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<Self> {
        let w = bytes_to_words(bytes);

        // If w is in the range [0, n) then w - n will overflow, resulting in
        // a borrow value of 2^64 - 1.
        let (_, borrow) = sbb(w[0], MODULUS[0], 0);
        let (_, borrow) = sbb(w[1], MODULUS[1], borrow);
        let (_, borrow) = sbb(w[2], MODULUS[2], borrow);
        let (_, borrow) = sbb(w[3], MODULUS[3], borrow);
        let is_some = (borrow as u8) & 1;

        CtOption::new(Self(w), Choice::from(is_some))
    }

    /// Parses the given byte array as a big-endian integer and reduces it
    /// mod n. This is the reducing parse used for converting message hashes
    /// into scalars.
    ///
    /// Since n > 2^255, a single conditional subtraction fully reduces any
    /// 256-bit value.
    pub fn from_bytes_reduced(bytes: &[u8; 32]) -> Self {
        let w = bytes_to_words(bytes);
        Self::sub_inner(
            w[0], w[1], w[2], w[3], 0, MODULUS[0], MODULUS[1], MODULUS[2], MODULUS[3], 0,
        )
    }

    /// Parses the given byte array as a scalar.
    ///
    /// Does not check the result for being in the correct range.
    pub(crate) const fn from_bytes_unchecked(bytes: &[u8; 32]) -> Self {
        Self(bytes_to_words(bytes))
    }

    /// Returns the SEC1 encoding of this scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut ret = [0; 32];
        ret[0..8].copy_from_slice(&self.0[3].to_be_bytes());
        ret[8..16].copy_from_slice(&self.0[2].to_be_bytes());
        ret[16..24].copy_from_slice(&self.0[1].to_be_bytes());
        ret[24..32].copy_from_slice(&self.0[0].to_be_bytes());
        ret
    }

    /// Checks if the scalar is zero.
    pub fn is_zero(&self) -> Choice {
        self.ct_eq(&Self::ZERO)
    }

    /// Is this scalar greater than n / 2?
    pub fn is_high(&self) -> Choice {
        // (n / 2) - self borrows exactly when self > n / 2
        let (_, borrow) = sbb(FRAC_MODULUS_2[0], self.0[0], 0);
        let (_, borrow) = sbb(FRAC_MODULUS_2[1], self.0[1], borrow);
        let (_, borrow) = sbb(FRAC_MODULUS_2[2], self.0[2], borrow);
        let (_, borrow) = sbb(FRAC_MODULUS_2[3], self.0[3], borrow);
        Choice::from((borrow as u8) & 1)
    }

    #[inline]
    #[allow(clippy::too_many_arguments)]
    const fn sub_inner(
        l0: u64,
        l1: u64,
        l2: u64,
        l3: u64,
        l4: u64,
        r0: u64,
        r1: u64,
        r2: u64,
        r3: u64,
        r4: u64,
    ) -> Self {
        let (w0, borrow) = sbb(l0, r0, 0);
        let (w1, borrow) = sbb(l1, r1, borrow);
        let (w2, borrow) = sbb(l2, r2, borrow);
        let (w3, borrow) = sbb(l3, r3, borrow);
        let (_, borrow) = sbb(l4, r4, borrow);

        let (w0, carry) = adc(w0, MODULUS[0] & borrow, 0);
        let (w1, carry) = adc(w1, MODULUS[1] & borrow, carry);
        let (w2, carry) = adc(w2, MODULUS[2] & borrow, carry);
        let (w3, _) = adc(w3, MODULUS[3] & borrow, carry);

        Self([w0, w1, w2, w3])
    }

    /// Returns self + rhs mod n.
    pub const fn add(&self, rhs: &Self) -> Self {
        let (w0, carry) = adc(self.0[0], rhs.0[0], 0);
        let (w1, carry) = adc(self.0[1], rhs.0[1], carry);
        let (w2, carry) = adc(self.0[2], rhs.0[2], carry);
        let (w3, w4) = adc(self.0[3], rhs.0[3], carry);

        Self::sub_inner(
            w0, w1, w2, w3, w4, MODULUS[0], MODULUS[1], MODULUS[2], MODULUS[3], 0,
        )
    }

    /// Returns self - rhs mod n.
    pub const fn sub(&self, rhs: &Self) -> Self {
        Self::sub_inner(
            self.0[0], self.0[1], self.0[2], self.0[3], 0, rhs.0[0], rhs.0[1], rhs.0[2], rhs.0[3],
            0,
        )
    }

    /// Returns -self mod n.
    pub const fn negate(&self) -> Self {
        Self::ZERO.sub(self)
    }

    /// Returns self * rhs mod n.
    pub fn mul(&self, rhs: &Self) -> Self {
        self.mul_wide(rhs).reduce()
    }

    /// Returns self * self mod n.
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    fn mul_wide(&self, rhs: &Self) -> WideScalar {
        // 160-bit accumulator
        let c0 = 0;
        let c1 = 0;
        let c2 = 0;

        // l[0..7] = a[0..3] * b[0..3]
        let (c0, c1) = muladd_fast(self.0[0], rhs.0[0], c0, c1);
        let (l0, c0, c1) = (c0, c1, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[0], c0, c1, c2);
        let (l1, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[0], c0, c1, c2);
        let (l2, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[0], c0, c1, c2);
        let (l3, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[1], c0, c1, c2);
        let (l4, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[2], c0, c1, c2);
        let (l5, c0, c1, _c2) = (c0, c1, c2, 0);
        let (c0, c1) = muladd_fast(self.0[3], rhs.0[3], c0, c1);
        let (l6, c0, _c1) = (c0, c1, 0);
        let l7 = c0;

        WideScalar([l0, l1, l2, l3, l4, l5, l6, l7])
    }

    /// Raises the scalar to the power `2^k`.
    fn pow2k(&self, k: usize) -> Self {
        let mut x = *self;
        for _ in 0..k {
            x = x.square();
        }
        x
    }

    /// Inverts the scalar, if it is non-zero.
    ///
    /// Computed as `self^(n - 2)`, in constant time.
    pub fn invert(&self) -> CtOption<Self> {
        CtOption::new(self.invert_inner(), !self.is_zero())
    }

    /// Fermat inversion without the zero check; `invert_inner(0) == 0`.
    ///
    /// Uses an addition chain from
    /// <https://briansmith.org/ecc-inversion-addition-chains-01#secp256k1_scalar_inversion>
    pub(crate) fn invert_inner(&self) -> Self {
        let x_1 = *self;
        let x_10 = self.pow2k(1);
        let x_11 = x_10.mul(&x_1);
        let x_101 = x_10.mul(&x_11);
        let x_111 = x_10.mul(&x_101);
        let x_1001 = x_10.mul(&x_111);
        let x_1011 = x_10.mul(&x_1001);
        let x_1101 = x_10.mul(&x_1011);

        let x6 = x_1101.pow2k(2).mul(&x_1011);
        let x8 = x6.pow2k(2).mul(&x_11);
        let x14 = x8.pow2k(6).mul(&x6);
        let x28 = x14.pow2k(14).mul(&x14);
        let x56 = x28.pow2k(28).mul(&x28);

        #[rustfmt::skip]
        let res = x56
            .pow2k(56).mul(&x56)
            .pow2k(14).mul(&x14)
            .pow2k(3).mul(&x_101)
            .pow2k(4).mul(&x_111)
            .pow2k(4).mul(&x_101)
            .pow2k(5).mul(&x_1011)
            .pow2k(4).mul(&x_1011)
            .pow2k(4).mul(&x_111)
            .pow2k(5).mul(&x_111)
            .pow2k(6).mul(&x_1101)
            .pow2k(4).mul(&x_101)
            .pow2k(3).mul(&x_111)
            .pow2k(5).mul(&x_1001)
            .pow2k(6).mul(&x_101)
            .pow2k(10).mul(&x_111)
            .pow2k(4).mul(&x_111)
            .pow2k(9).mul(&x8)
            .pow2k(5).mul(&x_1001)
            .pow2k(6).mul(&x_1011)
            .pow2k(4).mul(&x_1101)
            .pow2k(5).mul(&x_11)
            .pow2k(6).mul(&x_1101)
            .pow2k(10).mul(&x_1101)
            .pow2k(4).mul(&x_1001)
            .pow2k(6).mul(&x_1)
            .pow2k(8).mul(&x6);

        res
    }
}

/// The unreduced 512-bit product of two scalars.
#[derive(Clone, Copy, Debug, Default)]
struct WideScalar([u64; 8]);

impl WideScalar {
    /// Reduces 512 bits mod n, folding by 2^256 = (2^256 - n) (mod n)
    /// in three stages: 512 -> 385 -> 258 -> 256 bits, then a final
    /// conditional subtraction of n.
    fn reduce(&self) -> Scalar {
        let n0 = self.0[4];
        let n1 = self.0[5];
        let n2 = self.0[6];
        let n3 = self.0[7];

        // Reduce 512 bits into 385.
        // m[0..6] = self[0..3] + n[0..3] * NEG_MODULUS.
        let c0 = self.0[0];
        let c1 = 0;
        let c2 = 0;
        let (c0, c1) = muladd_fast(n0, NEG_MODULUS[0], c0, c1);
        let (m0, c0, c1) = (c0, c1, 0);
        let (c0, c1) = sumadd_fast(self.0[1], c0, c1);
        let (c0, c1, c2) = muladd(n1, NEG_MODULUS[0], c0, c1, c2);
        let (c0, c1, c2) = muladd(n0, NEG_MODULUS[1], c0, c1, c2);
        let (m1, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = sumadd(self.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(n2, NEG_MODULUS[0], c0, c1, c2);
        let (c0, c1, c2) = muladd(n1, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(n0, c0, c1, c2);
        let (m2, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = sumadd(self.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(n3, NEG_MODULUS[0], c0, c1, c2);
        let (c0, c1, c2) = muladd(n2, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(n1, c0, c1, c2);
        let (m3, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(n3, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(n2, c0, c1, c2);
        let (m4, c0, c1, _c2) = (c0, c1, c2, 0);
        let (c0, c1) = sumadd_fast(n3, c0, c1);
        let (m5, c0, _c1) = (c0, c1, 0);
        debug_assert!(c0 <= 1);
        let m6 = c0;

        // Reduce 385 bits into 258.
        // p[0..4] = m[0..3] + m[4..6] * NEG_MODULUS.
        let c0 = m0;
        let c1 = 0;
        let c2 = 0;
        let (c0, c1) = muladd_fast(m4, NEG_MODULUS[0], c0, c1);
        let (p0, c0, c1) = (c0, c1, 0);
        let (c0, c1) = sumadd_fast(m1, c0, c1);
        let (c0, c1, c2) = muladd(m5, NEG_MODULUS[0], c0, c1, c2);
        let (c0, c1, c2) = muladd(m4, NEG_MODULUS[1], c0, c1, c2);
        let (p1, c0, c1) = (c0, c1, 0);
        let (c0, c1, c2) = sumadd(m2, c0, c1, c2);
        let (c0, c1, c2) = muladd(m6, NEG_MODULUS[0], c0, c1, c2);
        let (c0, c1, c2) = muladd(m5, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(m4, c0, c1, c2);
        let (p2, c0, c1, _c2) = (c0, c1, c2, 0);
        let (c0, c1) = sumadd_fast(m3, c0, c1);
        let (c0, c1) = muladd_fast(m6, NEG_MODULUS[1], c0, c1);
        let (c0, c1) = sumadd_fast(m5, c0, c1);
        let (p3, c0, _c1) = (c0, c1, 0);
        let p4 = c0 + m6;
        debug_assert!(p4 <= 2);

        // Reduce 258 bits into 256.
        // r[0..3] = p[0..3] + p[4] * NEG_MODULUS.
        let mut c = (p0 as u128) + (NEG_MODULUS[0] as u128) * (p4 as u128);
        let r0 = c as u64;
        c >>= 64;
        c += (p1 as u128) + (NEG_MODULUS[1] as u128) * (p4 as u128);
        let r1 = c as u64;
        c >>= 64;
        c += (p2 as u128) + (p4 as u128);
        let r2 = c as u64;
        c >>= 64;
        c += p3 as u128;
        let r3 = c as u64;
        c >>= 64;

        // Final reduction: the value is now below 2n, one conditional
        // subtraction of n completes it.
        Scalar::sub_inner(
            r0, r1, r2, r3, c as u64, MODULUS[0], MODULUS[1], MODULUS[2], MODULUS[3], 0,
        )
    }
}

impl ConditionallySelectable for Scalar {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
        ])
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Scalar {}

impl From<u64> for Scalar {
    fn from(k: u64) -> Self {
        Self([k, 0, 0, 0])
    }
}

impl From<u32> for Scalar {
    fn from(k: u32) -> Self {
        Self::from(k as u64)
    }
}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

macro_rules! impl_scalar_op {
    ($trait:ident, $fn:ident, $inherent:ident) => {
        impl core::ops::$trait<Scalar> for Scalar {
            type Output = Scalar;

            fn $fn(self, other: Scalar) -> Scalar {
                Scalar::$inherent(&self, &other)
            }
        }

        impl core::ops::$trait<&Scalar> for Scalar {
            type Output = Scalar;

            fn $fn(self, other: &Scalar) -> Scalar {
                Scalar::$inherent(&self, other)
            }
        }

        impl core::ops::$trait<&Scalar> for &Scalar {
            type Output = Scalar;

            fn $fn(self, other: &Scalar) -> Scalar {
                Scalar::$inherent(self, other)
            }
        }
    };
}

impl_scalar_op!(Add, add, add);
impl_scalar_op!(Sub, sub, sub);
impl_scalar_op!(Mul, mul, mul);

impl core::ops::AddAssign<Scalar> for Scalar {
    fn add_assign(&mut self, rhs: Scalar) {
        *self = Scalar::add(self, &rhs);
    }
}

impl core::ops::SubAssign<Scalar> for Scalar {
    fn sub_assign(&mut self, rhs: Scalar) {
        *self = Scalar::sub(self, &rhs);
    }
}

impl core::ops::MulAssign<Scalar> for Scalar {
    fn mul_assign(&mut self, rhs: Scalar) {
        *self = Scalar::mul(self, &rhs);
    }
}

impl core::ops::Neg for Scalar {
    type Output = Scalar;

    fn neg(self) -> Scalar {
        self.negate()
    }
}

impl core::ops::Neg for &Scalar {
    type Output = Scalar;

    fn neg(self) -> Scalar {
        self.negate()
    }
}

/// A [`Scalar`] which is known to be non-zero, i.e. in the range
/// `[1, n - 1]` — the range of valid private keys.
#[derive(Clone, Copy)]
pub struct NonZeroScalar(Scalar);

impl NonZeroScalar {
    /// Creates a non-zero scalar, failing for zero.
    pub fn new(scalar: Scalar) -> CtOption<Self> {
        CtOption::new(Self(scalar), !scalar.is_zero())
    }

    /// Generates a uniformly random non-zero scalar using rejection
    /// sampling.
    ///
    /// This method is not constant time, but is secure so long as rejected
    /// RNG outputs are unrelated to future ones (a necessary property of a
    /// CSPRNG). With an unbiased RNG, the probability of failing to complete
    /// after 4 iterations is vanishingly small.
    pub fn random(mut rng: impl CryptoRng + RngCore) -> Self {
        let mut bytes = [0u8; 32];

        loop {
            rng.fill_bytes(&mut bytes);
            if let Some(scalar) = Scalar::from_bytes(&bytes)
                .and_then(Self::new)
                .into()
            {
                bytes.zeroize();
                return scalar;
            }
        }
    }

    /// Serializes as big-endian bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Inverts the scalar. Never fails, since the value is non-zero.
    pub fn invert(&self) -> Self {
        Self(self.0.invert_inner())
    }

    /// Borrows the inner scalar value.
    pub fn as_scalar(&self) -> &Scalar {
        &self.0
    }
}

impl AsRef<Scalar> for NonZeroScalar {
    fn as_ref(&self) -> &Scalar {
        &self.0
    }
}

impl core::ops::Deref for NonZeroScalar {
    type Target = Scalar;

    fn deref(&self) -> &Scalar {
        &self.0
    }
}

impl From<NonZeroScalar> for Scalar {
    fn from(scalar: NonZeroScalar) -> Scalar {
        scalar.0
    }
}

impl TryFrom<&[u8]> for NonZeroScalar {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; 32] = bytes.try_into().map_err(|_| Error::InvalidEncoding)?;
        Option::from(Scalar::from_bytes(bytes).and_then(Self::new)).ok_or(Error::InvalidScalar)
    }
}

impl ConditionallySelectable for NonZeroScalar {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        // selecting between two non-zero values preserves the invariant
        Self(Scalar::conditional_select(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for NonZeroScalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl core::ops::Neg for NonZeroScalar {
    type Output = NonZeroScalar;

    fn neg(self) -> NonZeroScalar {
        // the negation of a non-zero scalar is non-zero
        Self(self.0.negate())
    }
}

impl core::fmt::Debug for NonZeroScalar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("NonZeroScalar { ... }")
    }
}

impl Zeroize for NonZeroScalar {
    fn zeroize(&mut self) {
        // the invariant is briefly violated, but the value is on its way
        // out of memory entirely
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::{NonZeroScalar, Scalar, MODULUS};
    use crate::arithmetic::util::{biguint_to_u64_array, u64_array_to_biguint};
    use num_bigint::BigUint;
    use proptest::prelude::*;

    fn order() -> BigUint {
        u64_array_to_biguint(&MODULUS)
    }

    #[test]
    fn from_bytes_rejects_order_and_above() {
        let n_bytes = hex_literal::hex!(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        );
        assert!(bool::from(Scalar::from_bytes(&n_bytes).is_none()));
        assert!(bool::from(Scalar::from_bytes(&[0xff; 32]).is_none()));

        let n_minus_1 = hex_literal::hex!(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140"
        );
        assert!(bool::from(Scalar::from_bytes(&n_minus_1).is_some()));
    }

    #[test]
    fn from_bytes_reduced_wraps() {
        let n_bytes = hex_literal::hex!(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        );
        assert_eq!(Scalar::from_bytes_reduced(&n_bytes), Scalar::ZERO);

        let n_plus_1 = hex_literal::hex!(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364142"
        );
        assert_eq!(Scalar::from_bytes_reduced(&n_plus_1), Scalar::ONE);
    }

    #[test]
    fn negate() {
        let one = Scalar::ONE;
        assert_eq!(one.negate().add(&one), Scalar::ZERO);
        assert_eq!(Scalar::ZERO.negate(), Scalar::ZERO);
    }

    #[test]
    fn invert() {
        assert!(bool::from(Scalar::ZERO.invert().is_none()));
        assert_eq!(Scalar::ONE.invert().unwrap(), Scalar::ONE);

        let two = Scalar::from(2u64);
        assert_eq!(two.invert().unwrap().mul(&two), Scalar::ONE);
    }

    #[test]
    fn is_high() {
        assert!(!bool::from(Scalar::ZERO.is_high()));
        assert!(!bool::from(Scalar::ONE.is_high()));

        // n - 1 is high; (n - 1)/2 is the largest low scalar
        let n_minus_1 = Scalar::ONE.negate();
        assert!(bool::from(n_minus_1.is_high()));

        let half = Scalar(super::FRAC_MODULUS_2);
        assert!(!bool::from(half.is_high()));
        assert!(bool::from(half.add(&Scalar::ONE).is_high()));
    }

    #[test]
    fn nonzero_scalar_rejects_zero_and_short_input() {
        assert!(bool::from(NonZeroScalar::new(Scalar::ZERO).is_none()));
        assert!(NonZeroScalar::try_from([0u8; 32].as_slice()).is_err());
        assert!(NonZeroScalar::try_from([1u8; 16].as_slice()).is_err());
    }

    prop_compose! {
        fn scalar()(w0 in any::<u64>(), w1 in any::<u64>(), w2 in any::<u64>(), w3 in 0u64..0xFFFF_FFFF_FFFF_FFFF) -> Scalar {
            // top limb below n's keeps the value in range... except the
            // region just under n, handled by an explicit reduction
            let candidate = u64_array_to_biguint(&[w0, w1, w2, w3]) % u64_array_to_biguint(&MODULUS);
            Scalar(biguint_to_u64_array(&candidate))
        }
    }

    proptest! {
        #[test]
        fn add_matches_biguint(a in scalar(), b in scalar()) {
            let expected = (u64_array_to_biguint(&a.0) + u64_array_to_biguint(&b.0)) % order();
            prop_assert_eq!(u64_array_to_biguint(&a.add(&b).0), expected);
        }

        #[test]
        fn sub_matches_biguint(a in scalar(), b in scalar()) {
            let expected = (order() + u64_array_to_biguint(&a.0) - u64_array_to_biguint(&b.0)) % order();
            prop_assert_eq!(u64_array_to_biguint(&a.sub(&b).0), expected);
        }

        #[test]
        fn mul_matches_biguint(a in scalar(), b in scalar()) {
            let expected = (u64_array_to_biguint(&a.0) * u64_array_to_biguint(&b.0)) % order();
            prop_assert_eq!(u64_array_to_biguint(&a.mul(&b).0), expected);
        }

        #[test]
        fn invert_is_inverse(a in scalar()) {
            prop_assume!(!bool::from(a.is_zero()));
            prop_assert_eq!(a.mul(&a.invert().unwrap()), Scalar::ONE);
        }

        #[test]
        fn bytes_round_trip(a in scalar()) {
            prop_assert_eq!(Scalar::from_bytes(&a.to_bytes()).unwrap(), a);
        }
    }
}
