//! Key-less two-phase signing for external signers.
//!
//! A caller whose keys live elsewhere (hardware wallet, remote custody)
//! first requests the per-input digests, signs them out of process, then
//! submits the signatures and public keys for verification and final
//! assembly. No private key ever enters this module.

use crate::builder::TransactionBuilder;
use crate::signer::{PreImageHash, SignatureBuilder, SigningMode, SigningOutput, TransactionSigner};
use crate::types::SigningInput;
use crate::SigningError;

/// The two-phase external-signer entry points.
pub struct TransactionCompiler;

impl TransactionCompiler {
    /// Compute the digests an external signer must sign.
    ///
    /// Runs planning and building, then resolves each input's script far
    /// enough to compute its digest and the key-hash identifying the
    /// expected signing key. No key material is required.
    ///
    /// # Arguments
    /// * `input` - The send request, typically without private keys.
    ///
    /// # Returns
    /// The ordered digests, or the same terminal errors as signing up
    /// through script resolution.
    pub fn pre_image_hashes(input: &SigningInput) -> Result<Vec<PreImageHash>, SigningError> {
        let plan = TransactionSigner::plan(input);
        if let Some(error) = plan.error {
            return Err(error);
        }

        let unsigned = TransactionBuilder::build(&plan, input)?;
        let mut builder = SignatureBuilder::new(input, &plan, unsigned, SigningMode::HashOnly);
        builder.sign()?;
        Ok(builder.into_hashes())
    }

    /// Assemble and encode the transaction from externally produced
    /// signatures.
    ///
    /// The signature and public-key lists must both match the number of
    /// digests produced by [`Self::pre_image_hashes`], pairwise in the
    /// same order. Every public key must hash to the expected key-hash and
    /// every signature must verify against its digest; any mismatch is
    /// fatal, never silently skipped.
    ///
    /// # Arguments
    /// * `input` - The send request used for `pre_image_hashes`.
    /// * `signatures` - DER-encoded ECDSA signatures (or 64-byte Schnorr
    ///   signatures for taproot inputs), without sighash bytes.
    /// * `public_keys` - The corresponding public keys (33-byte compressed
    ///   SEC1, or 32-byte x-only output keys for taproot inputs).
    ///
    /// # Returns
    /// The signed transaction with its encoding and id.
    pub fn compile_with_signatures(
        input: &SigningInput,
        signatures: &[Vec<u8>],
        public_keys: &[Vec<u8>],
    ) -> Result<SigningOutput, SigningError> {
        if signatures.is_empty() || signatures.len() != public_keys.len() {
            return Err(SigningError::InvalidParams);
        }
        let expected = Self::pre_image_hashes(input)?;
        if signatures.len() != expected.len() {
            return Err(SigningError::InvalidParams);
        }

        let plan = TransactionSigner::plan(input);
        if let Some(error) = plan.error {
            return Err(error);
        }
        let unsigned = TransactionBuilder::build(&plan, input)?;

        let pairs: Vec<(Vec<u8>, Vec<u8>)> = signatures
            .iter()
            .cloned()
            .zip(public_keys.iter().cloned())
            .collect();
        let mut builder = SignatureBuilder::with_external_signatures(input, &plan, unsigned, pairs);
        let signed = builder.sign()?;

        Ok(SigningOutput {
            encoded: signed.to_bytes(),
            transaction_id: signed.tx_id_hex(),
            transaction: signed,
        })
    }
}
