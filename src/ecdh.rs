//! Elliptic Curve Diffie-Hellman key agreement.
//!
//! The shared point is `d₁·Q₂ = d₁·d₂·G = d₂·Q₁`, computed with the
//! constant-time scalar multiplication path since the scalar is secret.

use crate::arithmetic::scalar::NonZeroScalar;
use crate::arithmetic::AffinePoint;
use crate::sec1::EncodedPoint;
use crate::PublicKey;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Shared secret value computed via ECDH key agreement.
pub struct SharedSecret {
    point: AffinePoint,
}

impl SharedSecret {
    /// The x-coordinate of the shared point — the form most key
    /// derivation consumers expect. Pass this through a KDF before using
    /// it as symmetric key material.
    pub fn raw_secret_bytes(&self) -> [u8; 32] {
        self.point.x_bytes()
    }

    /// The full shared point in SEC1 form, for protocols which bind both
    /// coordinates.
    pub fn to_encoded_point(&self, compress: bool) -> EncodedPoint {
        EncodedPoint::from_affine_coordinates(
            &self.point.x_bytes(),
            &self.point.y_bytes(),
            compress,
        )
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.point.zeroize();
    }
}

impl ZeroizeOnDrop for SharedSecret {}

/// Computes the ECDH shared secret `d·Q`.
///
/// The result cannot be the identity: the group has prime order, the
/// scalar is non-zero, and the public key is a validated curve point.
pub fn diffie_hellman(secret: &NonZeroScalar, public_key: &PublicKey) -> SharedSecret {
    let point = (public_key.to_projective() * secret.as_scalar()).to_affine();
    SharedSecret { point }
}

#[cfg(test)]
mod tests {
    use super::diffie_hellman;
    use crate::SecretKey;
    use hex_literal::hex;

    fn key(bytes: &[u8; 32]) -> SecretKey {
        SecretKey::from_bytes(bytes).unwrap()
    }

    #[test]
    fn shared_secret_is_symmetric() {
        let d1 = key(&hex!(
            "0000000000000000000000000000000000000000000000000000000000000003"
        ));
        let d2 = key(&hex!(
            "00000000000000000000000000000000000000000000000000000000000000fd"
        ));

        let s1 = diffie_hellman(&d1.to_nonzero_scalar(), &d2.public_key());
        let s2 = diffie_hellman(&d2.to_nonzero_scalar(), &d1.public_key());

        assert_eq!(s1.raw_secret_bytes(), s2.raw_secret_bytes());
        assert_eq!(
            s1.to_encoded_point(false).as_bytes(),
            s2.to_encoded_point(false).as_bytes()
        );

        // known answer for 3 * (0xfd * G)
        assert_eq!(
            s1.raw_secret_bytes(),
            hex!("96045e4c0ca075fc4a5383f3f03de105a34c7c4cb030ceffb58b98e12b39a3cf")
        );
    }

    #[test]
    fn random_agreement() {
        let alice = SecretKey::random(rand_core::OsRng);
        let bob = SecretKey::random(rand_core::OsRng);

        let ab = diffie_hellman(&alice.to_nonzero_scalar(), &bob.public_key());
        let ba = diffie_hellman(&bob.to_nonzero_scalar(), &alice.public_key());
        assert_eq!(ab.raw_secret_bytes(), ba.raw_secret_bytes());
    }
}
