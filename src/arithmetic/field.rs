//! Field arithmetic modulo p = 2^256 - 2^32 - 977.
//!
//! Elements are held in a fully reduced form on four 64-bit limbs
//! (little-endian limb order), so every operation both consumes and
//! produces canonical representatives.

use crate::arithmetic::util::{adc, sbb};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroize;

/// Constant representing the modulus
/// p = FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE FFFFFC2F
const MODULUS: [u64; 4] = [
    0xFFFF_FFFE_FFFF_FC2F,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// Low limb of 2^256 mod p, i.e. 2^32 + 977. Since p is this close to
/// 2^256, a 512-bit product folds onto 256 bits by multiplying its high
/// half with this constant.
const REDUCTION: u64 = 0x1_0000_03D1;

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

/// An element in the finite field modulo p = 2^256 - 2^32 - 977.
#[derive(Clone, Copy, Debug)]
pub struct FieldElement(pub(crate) [u64; 4]);

impl FieldElement {
    /// The additive identity.
    pub const ZERO: Self = Self([0, 0, 0, 0]);

    /// The multiplicative identity.
    pub const ONE: Self = Self([1, 0, 0, 0]);

    /// Parses the given byte array as a field element.
    ///
    /// Does not check the result for being in the correct range.
    pub(crate) const fn from_bytes_unchecked(bytes: &[u8; 32]) -> Self {
        Self(bytes_to_words(bytes))
    }

    pub(crate) const fn from_u64(w: u64) -> Self {
        Self([w, 0, 0, 0])
    }

    /// Attempts to parse the given byte array as an SEC1-encoded field element.
    ///
    /// Returns None if the byte array does not contain a big-endian integer in
    /// the range [0, p).
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<Self> {
        let words = bytes_to_words(bytes);

        // If w is in the range [0, p) then w - p will overflow, resulting in a
        // borrow value of 2^64 - 1.
        let (_, borrow) = sbb(words[0], MODULUS[0], 0);
        let (_, borrow) = sbb(words[1], MODULUS[1], borrow);
        let (_, borrow) = sbb(words[2], MODULUS[2], borrow);
        let (_, borrow) = sbb(words[3], MODULUS[3], borrow);
        let is_some = (borrow as u8) & 1;

        CtOption::new(Self(words), Choice::from(is_some))
    }

    /// Returns the SEC1 encoding of this field element.
    pub fn to_bytes(self) -> [u8; 32] {
        let mut ret = [0; 32];
        ret[0..8].copy_from_slice(&self.0[3].to_be_bytes());
        ret[8..16].copy_from_slice(&self.0[2].to_be_bytes());
        ret[16..24].copy_from_slice(&self.0[1].to_be_bytes());
        ret[24..32].copy_from_slice(&self.0[0].to_be_bytes());
        ret
    }

    /// Determine if this `FieldElement` is zero.
    pub fn is_zero(&self) -> Choice {
        self.ct_eq(&Self::ZERO)
    }

    /// Determine if this `FieldElement` is odd in the SEC1 sense:
    /// `self mod 2 == 1`.
    pub fn is_odd(&self) -> Choice {
        Choice::from((self.0[0] & 1) as u8)
    }

    /// Subtracts the 5-limb value (l0..l4) by (r0..r4), then conditionally
    /// adds the modulus back if the subtraction borrowed.
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

        // If underflow occurred on the final limb, borrow = 0xfff...fff,
        // otherwise borrow = 0x000...000. Thus, we use it as a mask to
        // conditionally add the modulus.
        let (w0, carry) = adc(w0, MODULUS[0] & borrow, 0);
        let (w1, carry) = adc(w1, MODULUS[1] & borrow, carry);
        let (w2, carry) = adc(w2, MODULUS[2] & borrow, carry);
        let (w3, _) = adc(w3, MODULUS[3] & borrow, carry);

        Self([w0, w1, w2, w3])
    }

    /// Returns self + rhs mod p.
    pub const fn add(&self, rhs: &Self) -> Self {
        // Bit 256 of p is set, so addition can result in five words.
        let (w0, carry) = adc(self.0[0], rhs.0[0], 0);
        let (w1, carry) = adc(self.0[1], rhs.0[1], carry);
        let (w2, carry) = adc(self.0[2], rhs.0[2], carry);
        let (w3, w4) = adc(self.0[3], rhs.0[3], carry);

        // Attempt to subtract the modulus, to ensure the result is in the field.
        Self::sub_inner(
            w0, w1, w2, w3, w4, MODULUS[0], MODULUS[1], MODULUS[2], MODULUS[3], 0,
        )
    }

    /// Returns self - rhs mod p.
    pub const fn subtract(&self, rhs: &Self) -> Self {
        Self::sub_inner(
            self.0[0], self.0[1], self.0[2], self.0[3], 0, rhs.0[0], rhs.0[1], rhs.0[2], rhs.0[3],
            0,
        )
    }

    /// Returns -self mod p.
    pub const fn negate(&self) -> Self {
        Self::ZERO.subtract(self)
    }

    /// Returns 2 * self.
    pub const fn double(&self) -> Self {
        self.add(self)
    }

    /// Returns self * rhs mod p.
    pub fn mul(&self, rhs: &Self) -> Self {
        Self::reduce_wide(&self.mul_wide(rhs))
    }

    /// Returns self * self.
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Schoolbook 4x4 limb multiplication into a 512-bit result.
    fn mul_wide(&self, rhs: &Self) -> [u64; 8] {
        let mut w = [0u64; 8];
        for i in 0..4 {
            let mut carry = 0u64;
            for j in 0..4 {
                let t = (self.0[i] as u128) * (rhs.0[j] as u128)
                    + (w[i + j] as u128)
                    + (carry as u128);
                w[i + j] = t as u64;
                carry = (t >> 64) as u64;
            }
            w[i + 4] = carry;
        }
        w
    }

    /// Reduces a 512-bit value mod p using 2^256 = 2^32 + 977 (mod p):
    /// fold the high half onto the low half, fold the (small) spill twice
    /// more, then subtract p at most once.
    fn reduce_wide(w: &[u64; 8]) -> Self {
        let mut r = [0u64; 4];

        // lo + hi * (2^32 + 977); the final carry is below 2^34
        let mut t = 0u128;
        for i in 0..4 {
            t += (w[i] as u128) + (w[i + 4] as u128) * (REDUCTION as u128);
            r[i] = t as u64;
            t >>= 64;
        }

        // fold the carry; its product spans two limbs
        let c = t * (REDUCTION as u128);
        let mut t = (r[0] as u128) + ((c as u64) as u128);
        r[0] = t as u64;
        t >>= 64;
        t += (r[1] as u128) + ((c >> 64) as u128);
        r[1] = t as u64;
        t >>= 64;
        t += r[2] as u128;
        r[2] = t as u64;
        t >>= 64;
        t += r[3] as u128;
        r[3] = t as u64;
        t >>= 64;

        // at most a single-bit spill remains
        let c = (t as u64).wrapping_mul(REDUCTION);
        let mut t = (r[0] as u128) + (c as u128);
        r[0] = t as u64;
        t >>= 64;
        t += r[1] as u128;
        r[1] = t as u64;
        t >>= 64;
        t += r[2] as u128;
        r[2] = t as u64;
        t >>= 64;
        t += r[3] as u128;
        r[3] = t as u64;

        Self::sub_inner(
            r[0], r[1], r[2], r[3], 0, MODULUS[0], MODULUS[1], MODULUS[2], MODULUS[3], 0,
        )
    }

    /// Raises the element to the given power, with the exponent expressed
    /// as little-endian 64-bit limbs.
    ///
    /// **This operation is variable time with respect to the exponent.**
    /// If the exponent is fixed, this operation is effectively constant
    /// time.
    pub fn pow_vartime(&self, exp: &[u64; 4]) -> Self {
        let mut res = Self::ONE;
        for e in exp.iter().rev() {
            for i in (0..64).rev() {
                res = res.square();
                if ((e >> i) & 1) == 1 {
                    res = res.mul(self);
                }
            }
        }
        res
    }

    /// Raises the element to the power `2^k` by repeated squaring.
    fn pow2k(&self, k: usize) -> Self {
        let mut x = *self;
        for _ in 0..k {
            x = x.square();
        }
        x
    }

    /// Returns the multiplicative inverse of self, if self is non-zero.
    ///
    /// Computed as `self^(p - 2)` so the running time does not depend on the
    /// value being inverted.
    pub fn invert(&self) -> CtOption<Self> {
        CtOption::new(self.invert_inner(), !self.is_zero())
    }

    /// Fermat inversion without the zero check; `invert_inner(0) == 0`.
    pub(crate) fn invert_inner(&self) -> Self {
        // The binary representation of (p - 2) has 5 blocks of 1s, with
        // lengths in { 1, 2, 22, 223 }. Use an addition chain to calculate
        // 2^n - 1 for each block: [1], [2], 3, 6, 9, 11, [22], 44, 88, 176,
        // 220, [223]

        let x2 = self.square().mul(self);
        let x3 = x2.square().mul(self);
        let x6 = x3.pow2k(3).mul(&x3);
        let x9 = x6.pow2k(3).mul(&x3);
        let x11 = x9.pow2k(2).mul(&x2);
        let x22 = x11.pow2k(11).mul(&x11);
        let x44 = x22.pow2k(22).mul(&x22);
        let x88 = x44.pow2k(44).mul(&x44);
        let x176 = x88.pow2k(88).mul(&x88);
        let x220 = x176.pow2k(44).mul(&x44);
        let x223 = x220.pow2k(3).mul(&x3);

        // The final result is then assembled using a sliding window over the
        // blocks.
        x223.pow2k(23)
            .mul(&x22)
            .pow2k(5)
            .mul(self)
            .pow2k(3)
            .mul(&x2)
            .pow2k(2)
            .mul(self)
    }

    /// Returns the square root of self mod p, or `None` if no square root
    /// exists.
    pub fn sqrt(&self) -> CtOption<Self> {
        // Given that p is congruent to 3 mod 4, we can compute the square
        // root of a mod p as the (p+1)/4'th power of a.
        //
        // As (p+1)/4 is an even number, it will have the same result for a
        // and for (-a). Only one of these two numbers actually has a square
        // root, so we test at the end by squaring and comparing to the input.
        //
        // The binary representation of (p + 1)/4 has 3 blocks of 1s, with
        // lengths in { 2, 22, 223 }. Use an addition chain to calculate
        // 2^n - 1 for each block: 1, [2], 3, 6, 9, 11, [22], 44, 88, 176,
        // 220, [223]

        let x2 = self.square().mul(self);
        let x3 = x2.square().mul(self);
        let x6 = x3.pow2k(3).mul(&x3);
        let x9 = x6.pow2k(3).mul(&x3);
        let x11 = x9.pow2k(2).mul(&x2);
        let x22 = x11.pow2k(11).mul(&x11);
        let x44 = x22.pow2k(22).mul(&x22);
        let x88 = x44.pow2k(44).mul(&x44);
        let x176 = x88.pow2k(88).mul(&x88);
        let x220 = x176.pow2k(44).mul(&x44);
        let x223 = x220.pow2k(3).mul(&x3);

        let sqrt = x223.pow2k(23).mul(&x22).pow2k(6).mul(&x2).pow2k(2);

        CtOption::new(sqrt, sqrt.square().ct_eq(self))
    }
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
        ])
    }
}

impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for FieldElement {}

impl Default for FieldElement {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Zeroize for FieldElement {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

macro_rules! impl_field_op {
    ($trait:ident, $fn:ident, $inherent:ident) => {
        impl core::ops::$trait<FieldElement> for FieldElement {
            type Output = FieldElement;

            fn $fn(self, other: FieldElement) -> FieldElement {
                FieldElement::$inherent(&self, &other)
            }
        }

        impl core::ops::$trait<&FieldElement> for FieldElement {
            type Output = FieldElement;

            fn $fn(self, other: &FieldElement) -> FieldElement {
                FieldElement::$inherent(&self, other)
            }
        }

        impl core::ops::$trait<&FieldElement> for &FieldElement {
            type Output = FieldElement;

            fn $fn(self, other: &FieldElement) -> FieldElement {
                FieldElement::$inherent(self, other)
            }
        }
    };
}

impl_field_op!(Add, add, add);
impl_field_op!(Sub, sub, subtract);
impl_field_op!(Mul, mul, mul);

impl core::ops::AddAssign<FieldElement> for FieldElement {
    fn add_assign(&mut self, rhs: FieldElement) {
        *self = FieldElement::add(self, &rhs);
    }
}

impl core::ops::SubAssign<FieldElement> for FieldElement {
    fn sub_assign(&mut self, rhs: FieldElement) {
        *self = FieldElement::subtract(self, &rhs);
    }
}

impl core::ops::MulAssign<FieldElement> for FieldElement {
    fn mul_assign(&mut self, rhs: FieldElement) {
        *self = FieldElement::mul(self, &rhs);
    }
}

impl core::ops::Neg for FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        self.negate()
    }
}

impl core::ops::Neg for &FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        self.negate()
    }
}
