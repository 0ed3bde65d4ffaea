/// Terminal conditions of planning, building, signing, and compiling.
///
/// These are semantic codes crossing the public boundary; callers match on
/// them. All operations are deterministic pure functions of their inputs,
/// so no error is ever retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
    /// The request carried no spendable UTXOs.
    #[error("missing input UTXOs")]
    MissingInputUtxos,
    /// A zero amount was requested without use-max-amount.
    #[error("zero amount requested")]
    ZeroAmountRequested,
    /// The available UTXOs cannot cover the requested amount plus fee.
    #[error("not enough UTXOs")]
    NotEnoughUtxos,
    /// The requested amount is below the dust threshold.
    #[error("requested amount is below the dust threshold")]
    DustAmountRequested,
    /// An address failed to parse or has no script form.
    #[error("invalid address")]
    InvalidAddress,
    /// No supplied private key matches an input's spending key-hash.
    #[error("missing private key")]
    MissingPrivateKey,
    /// No redeem script was supplied for a hash-locked input.
    #[error("missing redeem script")]
    MissingRedeemScript,
    /// A supplied redeem script is not a signable script.
    #[error("invalid redeem script")]
    InvalidRedeemScript,
    /// An input's locking script is not a recognized, signable template.
    #[error("invalid output script")]
    InvalidOutputScript,
    /// Signature/public-key parameters are malformed or miscounted.
    #[error("invalid parameters")]
    InvalidParams,
    /// A signature could not be produced or failed verification.
    #[error("signing failed")]
    SigningFailure,
}
