//! Elliptic Curve Digital Signature Algorithm (ECDSA).
//!
//! Signing is deterministic per [RFC 6979]: the ephemeral scalar is derived
//! from the private key and the message hash, and the same inputs always
//! produce the same signature. Signatures are emitted in canonical low-s
//! form, paired with a [`RecoveryId`] that allows the public key to be
//! reconstructed from the signature alone.
//!
//! [RFC 6979]: https://datatracker.ietf.org/doc/html/rfc6979

#![allow(non_snake_case, clippy::many_single_char_names)]

pub mod der;

use crate::arithmetic::scalar::{NonZeroScalar, Scalar};
use crate::arithmetic::{mul, AffinePoint, ProjectivePoint};
use crate::rfc6979::{bits2field, NonceGenerator};
use crate::{Error, PublicKey, Result};
use core::fmt;
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Cap on the nonce-retry loop. Candidates are rejected when r = 0 or
/// s = 0, which cannot occur for non-contrived inputs; the cap only bounds
/// the loop formally.
const MAX_SIGN_ATTEMPTS: usize = 1000;

/// ECDSA/secp256k1 signature: the scalar pair `(r, s)`, both in
/// `[1, n - 1]`.
#[derive(Clone, Copy)]
pub struct Signature {
    r: NonZeroScalar,
    s: NonZeroScalar,
}

impl Signature {
    /// Creates a signature from its component scalars, rejecting zeroes.
    pub fn from_scalars(r: Scalar, s: Scalar) -> Result<Self> {
        let r = Option::from(NonZeroScalar::new(r)).ok_or(Error::InvalidScalar)?;
        let s = Option::from(NonZeroScalar::new(s)).ok_or(Error::InvalidScalar)?;
        Ok(Self { r, s })
    }

    /// Parses a signature from its fixed 64-byte form `r || s`.
    ///
    /// Rejects components which are zero or not below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 64 {
            return Err(Error::InvalidEncoding);
        }
        let r = NonZeroScalar::try_from(&bytes[..32])?;
        let s = NonZeroScalar::try_from(&bytes[32..])?;
        Ok(Self { r, s })
    }

    /// Parses a signature from strict ASN.1 DER.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let (r, s) = der::Signature::decode(bytes)?;
        let r = NonZeroScalar::try_from(&r[..])?;
        let s = NonZeroScalar::try_from(&s[..])?;
        Ok(Self { r, s })
    }

    /// Serializes as the fixed 64-byte form `r || s`.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r.to_bytes());
        bytes[32..].copy_from_slice(&self.s.to_bytes());
        bytes
    }

    /// Serializes as ASN.1 DER.
    pub fn to_der(&self) -> der::Signature {
        der::Signature::from_components(&self.r.to_bytes(), &self.s.to_bytes())
    }

    /// The `r` component.
    pub fn r(&self) -> &NonZeroScalar {
        &self.r
    }

    /// The `s` component.
    pub fn s(&self) -> &NonZeroScalar {
        &self.s
    }

    /// Is the `s` component in the upper half of the scalar range?
    pub fn s_is_high(&self) -> bool {
        self.s.is_high().into()
    }

    /// Returns the canonical low-s counterpart of this signature, or
    /// `None` if it is already canonical.
    pub fn normalize_s(&self) -> Option<Self> {
        if self.s_is_high() {
            Some(Self {
                r: self.r,
                s: -self.s,
            })
        } else {
            None
        }
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        (self.r.ct_eq(&other.r) & self.s.ct_eq(&other.s)).into()
    }
}

impl Eq for Signature {}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(")?;
        for byte in self.to_bytes() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

/// Identifier used to reconstruct the signing public key from a
/// [`Signature`].
///
/// An integer in `{0, 1, 2, 3}`: the low bit is the parity of `R.y`, the
/// next bit records whether `R.x` exceeded the curve order and was
/// reduced. Values 2 and 3 cannot occur outside contrived inputs, since
/// n is so close to p.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RecoveryId(u8);

impl RecoveryId {
    /// Creates a recovery id from its component bits.
    pub fn new(is_y_odd: bool, is_x_reduced: bool) -> Self {
        Self((is_x_reduced as u8) << 1 | (is_y_odd as u8))
    }

    /// Was the y-coordinate of `R` odd?
    pub fn is_y_odd(self) -> bool {
        self.0 & 1 == 1
    }

    /// Was the x-coordinate of `R` reduced mod n?
    pub fn is_x_reduced(self) -> bool {
        self.0 & 2 == 2
    }

    /// The byte form, in `0..=3`.
    pub fn to_byte(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RecoveryId {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        if byte < 4 {
            Ok(Self(byte))
        } else {
            Err(Error::InvalidEncoding)
        }
    }
}

/// ECDSA/secp256k1 signing key.
#[derive(Clone)]
pub struct SigningKey {
    /// Secret scalar value.
    secret_scalar: NonZeroScalar,

    /// Verifying key for this signing key.
    verifying_key: VerifyingKey,
}

impl SigningKey {
    /// Generates a random signing key from the given CSPRNG.
    pub fn random(rng: impl CryptoRng + RngCore) -> Self {
        Self::from_nonzero_scalar(NonZeroScalar::random(rng))
    }

    /// Parses a signing key from 32 big-endian bytes in `[1, n - 1]`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        NonZeroScalar::try_from(bytes).map(Self::from_nonzero_scalar)
    }

    /// Creates a signing key from a non-zero scalar.
    pub fn from_nonzero_scalar(secret_scalar: NonZeroScalar) -> Self {
        let verifying_key = VerifyingKey {
            inner: PublicKey::from_secret_scalar(&secret_scalar),
        };
        Self {
            secret_scalar,
            verifying_key,
        }
    }

    /// Serializes the secret scalar as bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.secret_scalar.to_bytes()
    }

    /// Borrows the secret [`NonZeroScalar`] value for this key.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material. Please treat it with the care it
    /// deserves!
    pub fn as_nonzero_scalar(&self) -> &NonZeroScalar {
        &self.secret_scalar
    }

    /// The [`VerifyingKey`] which corresponds to this signing key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Signs the given message, hashing it with SHA-256 first.
    pub fn sign(&self, msg: &[u8]) -> Signature {
        self.sign_recoverable(msg).0
    }

    /// Signs the given message, hashing it with SHA-256 first, returning
    /// the recovery id alongside.
    pub fn sign_recoverable(&self, msg: &[u8]) -> (Signature, RecoveryId) {
        self.sign_prehash_recoverable(&Sha256::digest(msg))
            .expect("nonce retries exhausted")
    }

    /// Signs a prehashed message (its leftmost 256 bits, per RFC 6979
    /// `bits2int`).
    ///
    /// Deterministic, and canonical: `s` is always in the lower half of
    /// the scalar range.
    pub fn sign_prehash(&self, prehash: &[u8]) -> Result<Signature> {
        self.sign_prehash_recoverable(prehash).map(|(sig, _)| sig)
    }

    /// Signs a prehashed message, returning the recovery id alongside.
    pub fn sign_prehash_recoverable(&self, prehash: &[u8]) -> Result<(Signature, RecoveryId)> {
        let z = Scalar::from_bytes_reduced(&bits2field(prehash));
        let mut nonces = NonceGenerator::new(&self.secret_scalar.to_bytes(), prehash);

        for _ in 0..MAX_SIGN_ATTEMPTS {
            let k = nonces.next_nonce();

            // R = k×G
            let R = ProjectivePoint::mul_by_generator(&k).to_affine();

            // Lift the x-coordinate of R (an element of the base field)
            // into a serialized big integer, then reduce it into an
            // element of the scalar field.
            let x_bytes = R.x_bytes();
            let r = Scalar::from_bytes_reduced(&x_bytes);
            if r.is_zero().into() {
                continue;
            }

            // s = k⁻¹(z + r·d)
            let s = *k.invert().as_scalar() * &(z + &(r * self.secret_scalar.as_scalar()));
            if s.is_zero().into() {
                continue;
            }

            let is_x_reduced = Scalar::from_bytes(&x_bytes).is_none().into();
            let is_y_odd: bool = R.y_is_odd().into();

            // canonicalize to low-s, flipping the recovery parity with it
            let s_high = s.is_high();
            let s = Scalar::conditional_select(&s, &s.negate(), s_high);
            let is_y_odd = is_y_odd ^ bool::from(s_high);

            let signature = Signature::from_scalars(r, s)?;
            return Ok((signature, RecoveryId::new(is_y_odd, is_x_reduced)));
        }

        Err(Error::InvalidScalar)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("verifying_key", &self.verifying_key)
            .finish_non_exhaustive()
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.secret_scalar.zeroize();
    }
}

impl ZeroizeOnDrop for SigningKey {}

/// ECDSA/secp256k1 verifying (public) key.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VerifyingKey {
    inner: PublicKey,
}

impl VerifyingKey {
    /// Parses a verifying key from a SEC1-encoded point.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        PublicKey::from_sec1_bytes(bytes).map(|inner| Self { inner })
    }

    /// Creates a verifying key from an affine point, rejecting the
    /// identity.
    pub fn from_affine(point: AffinePoint) -> Result<Self> {
        PublicKey::from_affine(point).map(|inner| Self { inner })
    }

    /// Borrows the inner [`PublicKey`].
    pub fn as_public_key(&self) -> &PublicKey {
        &self.inner
    }

    /// Borrows the inner [`AffinePoint`].
    pub fn as_affine(&self) -> &AffinePoint {
        self.inner.as_affine()
    }

    /// Verifies a signature over the given message, hashing it with
    /// SHA-256 first.
    pub fn verify(&self, msg: &[u8], signature: &Signature) -> Result<()> {
        self.verify_prehash(&Sha256::digest(msg), signature)
    }

    /// Verifies a signature over a prehashed message.
    ///
    /// Never panics: every malformed input is an `Err`. Both halves of
    /// the `s` range are accepted; callers enforcing low-s can check
    /// [`Signature::s_is_high`].
    pub fn verify_prehash(&self, prehash: &[u8], signature: &Signature) -> Result<()> {
        let z = Scalar::from_bytes_reduced(&bits2field(prehash));
        let r = signature.r();
        let s_inv = signature.s().invert();

        let u1 = z * s_inv.as_scalar();
        let u2 = *r.as_scalar() * s_inv.as_scalar();

        let R = mul::lincomb(
            &ProjectivePoint::GENERATOR,
            &u1,
            &self.inner.to_projective(),
            &u2,
        );
        if R.is_identity().into() {
            return Err(Error::Verification);
        }

        let x = Scalar::from_bytes_reduced(&R.to_affine().x_bytes());
        if bool::from(x.ct_eq(r.as_scalar())) {
            Ok(())
        } else {
            Err(Error::Verification)
        }
    }

    /// Recovers the verifying key from a signature over the given
    /// (SHA-256 prehashed) message, or `None` if the recovery id does not
    /// lead to a valid key.
    pub fn recover_from_prehash(
        prehash: &[u8],
        signature: &Signature,
        recovery_id: RecoveryId,
    ) -> Option<Self> {
        let r = signature.r();
        let s = signature.s();

        // x_R = r + (recovery_id >> 1)·n, rejected when it leaves the field
        let x_bytes = if recovery_id.is_x_reduced() {
            add_order_to(&r.to_bytes())?
        } else {
            r.to_bytes()
        };

        let R = Option::<AffinePoint>::from(AffinePoint::decompress(
            &x_bytes,
            Choice::from(recovery_id.is_y_odd() as u8),
        ))?;
        let R = ProjectivePoint::from(R);

        // Q = r⁻¹(s·R − z·G)
        let z = Scalar::from_bytes_reduced(&bits2field(prehash));
        let r_inv = r.invert();
        let u1 = (r_inv.as_scalar() * &z).negate();
        let u2 = r_inv.as_scalar() * s.as_scalar();
        let Q = mul::lincomb(&ProjectivePoint::GENERATOR, &u1, &R, &u2);

        Self::from_affine(Q.to_affine()).ok()
    }

    /// Returns the SEC1 encoding of this verifying key.
    pub fn to_encoded_point(&self, compress: bool) -> crate::sec1::EncodedPoint {
        self.inner.to_encoded_point(compress)
    }
}

impl From<PublicKey> for VerifyingKey {
    fn from(inner: PublicKey) -> Self {
        Self { inner }
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        key.inner
    }
}

impl From<&SigningKey> for VerifyingKey {
    fn from(signing_key: &SigningKey) -> Self {
        *signing_key.verifying_key()
    }
}

/// `r + n` as a 32-byte big-endian value, or `None` when the sum does not
/// fit the base field.
fn add_order_to(r_bytes: &[u8; 32]) -> Option<[u8; 32]> {
    use crate::arithmetic::FieldElement;

    // r < n, so r + n < 2n < 2^257: an overflow past 256 bits certainly
    // leaves the field
    let r = Scalar::from_bytes_unchecked(r_bytes);
    let n = Scalar::from_bytes_unchecked(&crate::ORDER);

    let mut carry = 0u64;
    let mut limbs = [0u64; 4];
    for i in 0..4 {
        let t = (r.0[i] as u128) + (n.0[i] as u128) + (carry as u128);
        limbs[i] = t as u64;
        carry = (t >> 64) as u64;
    }
    if carry != 0 {
        return None;
    }

    let mut bytes = [0u8; 32];
    bytes[0..8].copy_from_slice(&limbs[3].to_be_bytes());
    bytes[8..16].copy_from_slice(&limbs[2].to_be_bytes());
    bytes[16..24].copy_from_slice(&limbs[1].to_be_bytes());
    bytes[24..32].copy_from_slice(&limbs[0].to_be_bytes());

    // must still be a valid x-coordinate
    if bool::from(FieldElement::from_bytes(&bytes).is_some()) {
        Some(bytes)
    } else {
        None
    }
}
