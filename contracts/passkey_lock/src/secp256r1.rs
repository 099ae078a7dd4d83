//! P-256 (secp256r1) ECDSA verification for passkey assertions.
//!
//! The host's native `secp256r1_verify` rejects high-S signatures and traps
//! on failure. Authenticators do not normalise S, so verification runs in the
//! contract on top of the RustCrypto `p256` arithmetic and reports every
//! failure as `false`.

use p256::{
    ecdsa::{signature::hazmat::PrehashVerifier, Signature, VerifyingKey},
    EncodedPoint, FieldBytes,
};
use soroban_sdk::{contracttype, BytesN, Env};

/// SEC1 tag for an uncompressed point.
const SEC1_UNCOMPRESSED_TAG: u8 = 0x04;

/// Affine coordinates of the passkey's public point, big-endian.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicKey {
    pub x: BytesN<32>,
    pub y: BytesN<32>,
}

impl PublicKey {
    pub fn new(x: BytesN<32>, y: BytesN<32>) -> Self {
        Self { x, y }
    }

    /// `0x04 ‖ x ‖ y`.
    pub fn to_sec1_bytes(&self, env: &Env) -> BytesN<65> {
        let mut out = [0u8; 65];
        out[0] = SEC1_UNCOMPRESSED_TAG;
        out[1..33].copy_from_slice(&self.x.to_array());
        out[33..65].copy_from_slice(&self.y.to_array());
        BytesN::from_array(env, &out)
    }

    fn verifying_key(&self) -> Option<VerifyingKey> {
        let point = EncodedPoint::from_affine_coordinates(
            &FieldBytes::clone_from_slice(&self.x.to_array()),
            &FieldBytes::clone_from_slice(&self.y.to_array()),
            false,
        );
        // Rejects the identity and anything off the curve.
        VerifyingKey::from_encoded_point(&point).ok()
    }
}

/// Stateless ECDSA verifier over P-256.
pub struct P256Verifier;

impl P256Verifier {
    /// Verify `(r, s)` over a prehashed 32-byte `digest`.
    ///
    /// Returns `false` for a scalar that is zero or not below the group
    /// order, for a public key that is not a valid curve point, and for a
    /// signature that does not satisfy the verification equation.
    pub fn verify(
        digest: &BytesN<32>,
        r: &BytesN<32>,
        s: &BytesN<32>,
        public_key: &PublicKey,
    ) -> bool {
        let Some(key) = public_key.verifying_key() else {
            return false;
        };
        let signature = match Signature::from_scalars(
            FieldBytes::clone_from_slice(&r.to_array()),
            FieldBytes::clone_from_slice(&s.to_array()),
        ) {
            Ok(sig) => sig,
            Err(_) => return false,
        };
        key.verify_prehash(&digest.to_array(), &signature).is_ok()
    }
}
