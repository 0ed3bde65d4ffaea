//! ECDSA signature with DER serialization.

use crate::PrimitivesError;

/// An ECDSA signature over secp256k1.
///
/// Produced in low-S form; serializes to and from DER as required by the
/// script-level signature encoding (which appends a sighash-type byte
/// outside of this type).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    inner: k256::ecdsa::Signature,
}

impl Signature {
    /// Wrap a k256 signature.
    pub(crate) fn from_inner(inner: k256::ecdsa::Signature) -> Self {
        Signature { inner }
    }

    /// Access the wrapped k256 signature.
    pub(crate) fn inner(&self) -> &k256::ecdsa::Signature {
        &self.inner
    }

    /// Parse a DER-encoded ECDSA signature.
    ///
    /// # Arguments
    /// * `bytes` - DER bytes: `0x30 <len> 0x02 <r> 0x02 <s>`.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if the encoding is malformed.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let inner = k256::ecdsa::Signature::from_der(bytes)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Signature { inner })
    }

    /// Serialize this signature to DER.
    pub fn to_der(&self) -> Vec<u8> {
        self.inner.to_der().as_bytes().to_vec()
    }
}
