//! Secret keys (private scalars).
//!
//! The [`SecretKey`] type wraps a non-zero scalar with a wrapper designed
//! to prevent unintentional exposure of the value (e.g. via `Debug` or
//! other logging), and zeroes it out of memory on drop.

use crate::arithmetic::scalar::NonZeroScalar;
use crate::{Error, PublicKey, Result};
use core::fmt;
use rand_core::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// secp256k1 secret key: a scalar in the range `[1, n - 1]`.
#[derive(Clone)]
pub struct SecretKey {
    inner: NonZeroScalar,
}

impl SecretKey {
    /// Generates a random secret key from the given CSPRNG.
    pub fn random(rng: impl CryptoRng + RngCore) -> Self {
        Self {
            inner: NonZeroScalar::random(rng),
        }
    }

    /// Parses a secret key from 32 big-endian bytes.
    ///
    /// This is the private key validity check of the curve: exactly the
    /// encodings of `[1, n - 1]` are accepted.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        NonZeroScalar::try_from(bytes).map(|inner| Self { inner })
    }

    /// Serializes the secret key as 32 big-endian bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes()
    }

    /// Borrows the secret scalar.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material. Please treat it with the care it
    /// deserves!
    pub fn to_nonzero_scalar(&self) -> NonZeroScalar {
        self.inner
    }

    /// Computes the public key `d·G` for this secret key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_scalar(&self.inner)
    }
}

impl TryFrom<&[u8]> for SecretKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}

impl From<NonZeroScalar> for SecretKey {
    fn from(inner: NonZeroScalar) -> Self {
        Self { inner }
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner.ct_eq(&other.inner).into()
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey { ... }")
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl ZeroizeOnDrop for SecretKey {}

#[cfg(test)]
mod tests {
    use super::SecretKey;
    use hex_literal::hex;

    #[test]
    fn boundary_keys() {
        // 0 and n are invalid, 1 and n - 1 are valid
        assert!(SecretKey::from_bytes(&[0u8; 32]).is_err());
        assert!(SecretKey::from_bytes(&hex!(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        ))
        .is_err());

        let mut one = [0u8; 32];
        one[31] = 1;
        assert!(SecretKey::from_bytes(&one).is_ok());
        assert!(SecretKey::from_bytes(&hex!(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140"
        ))
        .is_ok());

        // wrong lengths
        assert!(SecretKey::from_bytes(&[1u8; 31]).is_err());
        assert!(SecretKey::from_bytes(&[1u8; 33]).is_err());
    }

    #[test]
    fn round_trip() {
        let bytes = hex!("6b911fd37cdf5c81d4c0adb1ab7fa822ed253ab0ad9aa18d77257c88b29b718e");
        let key = SecretKey::from_bytes(&bytes).unwrap();
        assert_eq!(key.to_bytes(), bytes);
    }

    #[test]
    fn random_keys_are_distinct() {
        let a = SecretKey::random(rand_core::OsRng);
        let b = SecretKey::random(rand_core::OsRng);
        assert_ne!(a, b);
    }
}
