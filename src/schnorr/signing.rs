//! Taproot Schnorr signing key.

use super::{tagged_hash, Signature, VerifyingKey, AUX_TAG, CHALLENGE_TAG, NONCE_TAG};
use crate::arithmetic::scalar::{NonZeroScalar, Scalar};
use crate::arithmetic::ProjectivePoint;
use crate::{Error, PublicKey, Result};
use rand_core::{CryptoRng, RngCore};
use sha2::Digest;
use subtle::ConditionallySelectable;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Taproot Schnorr signing key.
#[derive(Clone)]
pub struct SigningKey {
    /// Secret key material
    secret_key: NonZeroScalar,

    /// Verifying key
    verifying_key: VerifyingKey,
}

impl SigningKey {
    /// Generates a cryptographically random [`SigningKey`].
    pub fn random(rng: impl CryptoRng + RngCore) -> Self {
        NonZeroScalar::random(rng).into()
    }

    /// Parses a signing key from big endian-encoded bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        NonZeroScalar::try_from(bytes).map(Into::into)
    }

    /// Serializes as bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.secret_key.to_bytes()
    }

    /// Gets the [`VerifyingKey`] that corresponds to this signing key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Borrows the secret [`NonZeroScalar`] value for this key.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material. Please treat it with the care it
    /// deserves!
    pub fn as_nonzero_scalar(&self) -> &NonZeroScalar {
        &self.secret_key
    }

    /// Signs the message with deterministic (all-zero) auxiliary
    /// randomness.
    pub fn sign(&self, msg: &[u8]) -> Result<Signature> {
        self.sign_raw(msg, &[0u8; 32])
    }

    /// Computes a BIP340 Schnorr signature over `msg` with the given
    /// auxiliary randomness.
    ///
    /// The message is signed as-is (BIP340 does not prehash); callers
    /// signing large inputs conventionally pass a 32-byte digest.
    pub fn sign_raw(&self, msg: &[u8], aux_rand: &[u8; 32]) -> Result<Signature> {
        let mut t = tagged_hash(AUX_TAG).chain_update(aux_rand).finalize();

        for (a, b) in t.iter_mut().zip(self.secret_key.to_bytes().iter()) {
            *a ^= b;
        }

        let rand = tagged_hash(NONCE_TAG)
            .chain_update(t)
            .chain_update(self.verifying_key.to_bytes())
            .chain_update(msg)
            .finalize();

        let k0 = Scalar::from_bytes_reduced(&rand.into());
        let k0: Option<NonZeroScalar> = Option::from(NonZeroScalar::new(k0));
        let k0 = k0.ok_or(Error::InvalidScalar)?;

        // negate k as needed so that R = k·G has an even y-coordinate
        let k = Self::from(k0);
        let r = *k.verifying_key.as_affine().x();

        let e = Scalar::from_bytes_reduced(
            &tagged_hash(CHALLENGE_TAG)
                .chain_update(r.to_bytes())
                .chain_update(self.verifying_key.to_bytes())
                .chain_update(msg)
                .finalize()
                .into(),
        );

        let s = *k.secret_key.as_scalar() + &(e * self.secret_key.as_scalar());
        let s = Option::from(NonZeroScalar::new(s)).ok_or(Error::InvalidScalar)?;
        let sig = Signature { r, s };

        #[cfg(debug_assertions)]
        self.verifying_key.verify_raw(msg, &sig)?;

        Ok(sig)
    }
}

impl From<NonZeroScalar> for SigningKey {
    fn from(mut secret_key: NonZeroScalar) -> SigningKey {
        // BIP340 keys are x-only: when d·G has an odd y-coordinate, the
        // secret is replaced by n - d so the implicit public point is the
        // even-y lift
        let odd = ProjectivePoint::mul_by_generator(&secret_key)
            .to_affine()
            .y_is_odd();

        secret_key.conditional_assign(&-secret_key, odd);

        let verifying_key = VerifyingKey {
            inner: PublicKey::from_secret_scalar(&secret_key),
        };

        SigningKey {
            secret_key,
            verifying_key,
        }
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SigningKey")
            .field("verifying_key", &self.verifying_key)
            .finish_non_exhaustive()
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.secret_key.zeroize();
    }
}

impl ZeroizeOnDrop for SigningKey {}
