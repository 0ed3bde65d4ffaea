//! secp256k1 public key.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed SEC1 public key in bytes.
pub const COMPRESSED_PUBLIC_KEY_LEN: usize = 33;

/// Length of an uncompressed SEC1 public key in bytes.
pub const UNCOMPRESSED_PUBLIC_KEY_LEN: usize = 65;

/// A secp256k1 public key.
///
/// Accepts compressed (33-byte) or uncompressed (65-byte) SEC1 encodings;
/// serialization always produces the compressed form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Parse a public key from SEC1 bytes (compressed or uncompressed).
    ///
    /// # Arguments
    /// * `bytes` - 33-byte compressed or 65-byte uncompressed encoding.
    ///
    /// # Returns
    /// `Ok(PublicKey)` if the bytes describe a valid curve point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != COMPRESSED_PUBLIC_KEY_LEN && bytes.len() != UNCOMPRESSED_PUBLIC_KEY_LEN {
            return Err(PrimitivesError::InvalidPublicKey(format!(
                "expected {} or {} bytes, got {}",
                COMPRESSED_PUBLIC_KEY_LEN,
                UNCOMPRESSED_PUBLIC_KEY_LEN,
                bytes.len()
            )));
        }
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner })
    }

    /// Wrap an existing k256 verifying key.
    pub(crate) fn from_verifying_key(inner: VerifyingKey) -> Self {
        PublicKey { inner }
    }

    /// Serialize as a 33-byte compressed SEC1 encoding.
    pub fn to_compressed(&self) -> [u8; 33] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Compute the Hash160 of the compressed encoding.
    ///
    /// This is the key-hash that P2PKH and P2WPKH locking scripts commit to.
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// Verify an ECDSA signature over a 32-byte digest.
    ///
    /// # Arguments
    /// * `digest` - The 32-byte hash that was signed.
    /// * `signature` - The signature to check.
    ///
    /// # Returns
    /// `true` if the signature is valid for this key and digest.
    pub fn verify(&self, digest: &[u8], signature: &Signature) -> bool {
        self.inner.verify_prehash(digest, signature.inner()).is_ok()
    }
}
