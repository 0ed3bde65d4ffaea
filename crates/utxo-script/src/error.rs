/// Error types for script and address operations.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// A hex string could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    /// An address string failed to parse or validate.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// A script could not be built from the given material.
    #[error("invalid script: {0}")]
    InvalidScript(String),
}
