/// Error types for primitive operations.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    /// A reader ran out of data before the requested field was complete.
    #[error("unexpected end of data")]
    UnexpectedEof,
    /// A hex string could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    /// A private key scalar was malformed or out of range.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
    /// A public key point was malformed or not on the curve.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
    /// A signature was malformed or failed to encode/decode.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}
