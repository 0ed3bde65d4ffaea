//! Per-input signing and final assembly.
//!
//! `SignatureBuilder` resolves each input's locking script to a signing
//! recipe (which key, which script code, scriptSig or witness shape),
//! computes the digest, and fills the input in. The same ladder runs in
//! four modes: normal signing with in-process keys, size estimation with
//! placeholder signatures (for fee measurement), hash collection (for the
//! external-signer protocol), and external-signature splicing with
//! verification.

use utxo_primitives::ec::taproot;
use utxo_primitives::hash::{hash160, ripemd160};
use utxo_primitives::{PrivateKey, PublicKey, Signature};
use utxo_script::Script;
use utxo_transaction::sighash::{
    self, SighashExtra, SignatureVersion, SIGHASH_ALL, SIGHASH_DEFAULT, SIGHASH_FORKID,
};
use utxo_transaction::{Transaction, TransactionOutput};

use crate::builder::TransactionBuilder;
use crate::types::{SigningInput, TransactionPlan};
use crate::SigningError;

/// Placeholder length for an ECDSA signature during size estimation: a
/// DER signature plus the sighash byte is 71-73 bytes.
const ESTIMATION_SIGNATURE_LEN: usize = 72;

/// How the builder treats key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningMode {
    /// Sign with the request's private keys.
    Normal,
    /// Produce placeholder signatures and public keys; used to measure the
    /// encoded size before fees are settled.
    SizeEstimation,
    /// Compute and collect the per-input digests without any key material.
    HashOnly,
    /// Splice in externally produced signatures, verifying each against
    /// its digest and public key.
    External,
}

/// A digest to be signed externally, with the key-hash identifying the
/// expected signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreImageHash {
    /// Index of the input the digest belongs to.
    pub input_index: usize,
    /// The 32-byte digest to sign.
    pub digest: [u8; 32],
    /// The key-hash (or taproot output key) the signing key must match.
    pub public_key_hash: Vec<u8>,
    /// Whether the digest takes a Schnorr signature instead of ECDSA.
    pub taproot: bool,
}

/// Signs the inputs of a built transaction according to a plan.
pub struct SignatureBuilder<'a> {
    input: &'a SigningInput,
    plan: &'a TransactionPlan,
    transaction: Transaction,
    mode: SigningMode,
    hash_type: u32,
    sighash_extra: Option<SighashExtra>,
    external_signatures: Vec<(Vec<u8>, Vec<u8>)>,
    hashes: Vec<PreImageHash>,
}

impl<'a> SignatureBuilder<'a> {
    /// Create a builder over an unsigned transaction.
    ///
    /// # Arguments
    /// * `input` - The originating request (keys, redeem scripts, flags).
    /// * `plan` - The plan whose UTXOs the transaction spends, in order.
    /// * `transaction` - The unsigned skeleton to fill in.
    /// * `mode` - The signing mode.
    pub fn new(
        input: &'a SigningInput,
        plan: &'a TransactionPlan,
        transaction: Transaction,
        mode: SigningMode,
    ) -> Self {
        let params = input.coin.params();
        SignatureBuilder {
            input,
            plan,
            transaction,
            mode,
            hash_type: input.hash_type,
            sighash_extra: params.sighash_branch_id.map(|branch_id| SighashExtra {
                branch_id,
                expiry_height: 0,
            }),
            external_signatures: Vec::new(),
            hashes: Vec::new(),
        }
    }

    /// Create a builder in [`SigningMode::External`] with `(signature,
    /// public key)` pairs consumed in digest order.
    pub fn with_external_signatures(
        input: &'a SigningInput,
        plan: &'a TransactionPlan,
        transaction: Transaction,
        signatures: Vec<(Vec<u8>, Vec<u8>)>,
    ) -> Self {
        let mut builder = Self::new(input, plan, transaction, SigningMode::External);
        builder.external_signatures = signatures;
        builder
    }

    /// The digests collected while signing in hash-only or external mode.
    pub fn into_hashes(self) -> Vec<PreImageHash> {
        self.hashes
    }

    /// Sign every input and return the completed transaction.
    ///
    /// Inputs whose SIGHASH_SINGLE position has no matching output are
    /// left unsigned, per the legacy semantics.
    pub fn sign(&mut self) -> Result<Transaction, SigningError> {
        if self.transaction.inputs.is_empty() || self.plan.utxos.is_empty() {
            return Err(SigningError::MissingInputUtxos);
        }

        let hash_single = sighash::is_single(self.hash_type);
        for index in 0..self.plan.utxos.len() {
            if hash_single && index >= self.transaction.outputs.len() {
                continue;
            }
            if index < self.transaction.inputs.len() {
                let script = self.plan.utxos[index].script.clone();
                self.sign_input(script, index)?;
            }
        }

        Ok(self.transaction.clone())
    }

    /// Resolve and sign a single input.
    fn sign_input(&mut self, script: Script, index: usize) -> Result<(), SigningError> {
        // Taproot spends are self-contained: a single Schnorr witness item.
        if script.match_pay_to_taproot().is_some() {
            let witness = self.taproot_witness(&script, index)?;
            self.transaction.inputs[index].script_sig = Script::new();
            self.transaction.inputs[index].witness = witness;
            return Ok(());
        }

        let signature_version = if self.hash_type & SIGHASH_FORKID != 0 {
            SignatureVersion::WitnessV0
        } else {
            SignatureVersion::Base
        };

        let mut current_script = script;
        let mut results = self.sign_step(&current_script, index, signature_version)?;
        let mut redeem_script = Script::new();

        if current_script.is_pay_to_script_hash() {
            // Unwrap: the first step resolved the redeem script; sign
            // against it and remember to append it to the scriptSig.
            current_script = Script::from_bytes(&results[0]);
            results = self
                .sign_step(&current_script, index, signature_version)
                .map_err(|error| match error {
                    SigningError::InvalidOutputScript => SigningError::InvalidRedeemScript,
                    other => other,
                })?;
            redeem_script = current_script.clone();
        }

        let mut witness_stack: Vec<Vec<u8>> = Vec::new();
        if let Some(key_hash) = current_script.match_pay_to_witness_public_key_hash() {
            let witness_script = Script::build_pay_to_public_key_hash(&key_hash);
            witness_stack = self.sign_step(&witness_script, index, SignatureVersion::WitnessV0)?;
            results.clear();
        } else if current_script.match_pay_to_witness_script_hash().is_some() {
            let witness_script = Script::from_bytes(&results[0]);
            witness_stack = self
                .sign_step(&witness_script, index, SignatureVersion::WitnessV0)
                .map_err(|error| match error {
                    SigningError::InvalidOutputScript => SigningError::InvalidRedeemScript,
                    other => other,
                })?;
            witness_stack.push(witness_script.into_bytes());
            results.clear();
        } else if current_script.is_witness_program() {
            return Err(SigningError::InvalidOutputScript);
        }

        if !redeem_script.is_empty() {
            results.push(redeem_script.into_bytes());
        }

        self.transaction.inputs[index].script_sig = Script::push_all(&results);
        self.transaction.inputs[index].witness = witness_stack;
        Ok(())
    }

    /// Produce the stack items satisfying one script.
    ///
    /// For hash-locked scripts this resolves the referenced redeem/witness
    /// script; for key-locked scripts it produces `[signature]`,
    /// `[signature, pubkey]`, or the multisig stack.
    fn sign_step(
        &mut self,
        script: &Script,
        index: usize,
        version: SignatureVersion,
    ) -> Result<Vec<Vec<u8>>, SigningError> {
        let amount = self.plan.utxos[index].amount;

        if let Some(script_hash) = script.match_pay_to_script_hash() {
            let redeem = self
                .redeem_script_for_hash(&script_hash)
                .ok_or(SigningError::MissingRedeemScript)?;
            return Ok(vec![redeem.into_bytes()]);
        }
        if let Some(script_hash) = script.match_pay_to_witness_script_hash() {
            // Witness scripts are registered under the short hash of their
            // 32-byte commitment.
            let key = ripemd160(&script_hash);
            let redeem = self
                .redeem_script_for_hash(&key)
                .ok_or(SigningError::MissingRedeemScript)?;
            return Ok(vec![redeem.into_bytes()]);
        }
        if let Some(key_hash) = script.match_pay_to_witness_public_key_hash() {
            return Ok(vec![key_hash.to_vec()]);
        }
        if script.is_witness_program() {
            return Err(SigningError::InvalidOutputScript);
        }
        if let Some((keys, required)) = script.match_multisig() {
            // The leading empty item absorbs the CHECKMULTISIG extra pop.
            let mut results: Vec<Vec<u8>> = vec![Vec::new()];
            for public_key in keys {
                if results.len() > required {
                    break;
                }
                let key_hash = hash160(&public_key);
                let pair = self.key_pair_for_hash(&key_hash);
                if pair.is_none() && self.mode == SigningMode::Normal {
                    return Err(SigningError::MissingPrivateKey);
                }
                let signature =
                    self.create_signature(script, &key_hash, pair.as_ref(), index, amount, version)?;
                results.push(signature);
            }
            results.resize(required + 1, Vec::new());
            return Ok(results);
        }
        if let Some(public_key) = script.match_pay_to_public_key() {
            let key_hash = hash160(&public_key);
            let pair = self.key_pair_for_hash(&key_hash);
            if pair.is_none() && self.mode == SigningMode::Normal {
                return Err(SigningError::MissingPrivateKey);
            }
            let signature =
                self.create_signature(script, &key_hash, pair.as_ref(), index, amount, version)?;
            return Ok(vec![signature]);
        }
        if let Some(key_hash) = script.match_pay_to_public_key_hash() {
            let pair = self.key_pair_for_hash(&key_hash);
            let public_key: Vec<u8> = match (&pair, self.mode) {
                (Some((_, public_key)), _) => public_key.clone(),
                (None, SigningMode::SizeEstimation) | (None, SigningMode::HashOnly) => {
                    vec![0u8; 33]
                }
                (None, SigningMode::External) => {
                    let position = self.hashes.len();
                    self.external_signatures
                        .get(position)
                        .map(|(_, public_key)| public_key.clone())
                        .ok_or(SigningError::SigningFailure)?
                }
                (None, SigningMode::Normal) => return Err(SigningError::MissingPrivateKey),
            };
            let signature =
                self.create_signature(script, &key_hash, pair.as_ref(), index, amount, version)?;
            return Ok(vec![signature, public_key]);
        }
        Err(SigningError::InvalidOutputScript)
    }

    /// Produce one ECDSA signature (DER + sighash byte) for a script code,
    /// according to the signing mode.
    fn create_signature(
        &mut self,
        script_code: &Script,
        public_key_hash: &[u8],
        pair: Option<&(PrivateKey, Vec<u8>)>,
        index: usize,
        amount: i64,
        version: SignatureVersion,
    ) -> Result<Vec<u8>, SigningError> {
        if self.mode == SigningMode::SizeEstimation {
            return Ok(vec![0u8; ESTIMATION_SIGNATURE_LEN]);
        }

        let digest = sighash::signature_hash(
            &self.transaction,
            index,
            script_code.as_bytes(),
            self.hash_type,
            amount,
            version,
            self.sighash_extra.as_ref(),
        )
        .map_err(|_| SigningError::SigningFailure)?;

        match self.mode {
            SigningMode::HashOnly => {
                self.hashes.push(PreImageHash {
                    input_index: index,
                    digest,
                    public_key_hash: public_key_hash.to_vec(),
                    taproot: false,
                });
                Ok(vec![0u8; ESTIMATION_SIGNATURE_LEN])
            }
            SigningMode::External => {
                let position = self.hashes.len();
                self.hashes.push(PreImageHash {
                    input_index: index,
                    digest,
                    public_key_hash: public_key_hash.to_vec(),
                    taproot: false,
                });
                let (signature_der, public_key_bytes) = self
                    .external_signatures
                    .get(position)
                    .ok_or(SigningError::SigningFailure)?;

                let public_key = PublicKey::from_bytes(public_key_bytes)
                    .map_err(|_| SigningError::InvalidParams)?;
                if public_key.hash160().as_slice() != public_key_hash {
                    return Err(SigningError::InvalidParams);
                }
                let signature = Signature::from_der(signature_der)
                    .map_err(|_| SigningError::InvalidParams)?;
                if !public_key.verify(&digest, &signature) {
                    return Err(SigningError::SigningFailure);
                }

                let mut encoded = signature_der.clone();
                encoded.push(self.hash_type as u8);
                Ok(encoded)
            }
            SigningMode::Normal => {
                let (private_key, _) = pair.ok_or(SigningError::MissingPrivateKey)?;
                let signature = private_key
                    .sign(&digest)
                    .map_err(|_| SigningError::SigningFailure)?;
                let mut encoded = signature.to_der();
                encoded.push(self.hash_type as u8);
                Ok(encoded)
            }
            SigningMode::SizeEstimation => unreachable!("handled above"),
        }
    }

    /// Produce the witness stack for a taproot key-path spend.
    fn taproot_witness(
        &mut self,
        script: &Script,
        index: usize,
    ) -> Result<Vec<Vec<u8>>, SigningError> {
        let output_key = script
            .match_pay_to_taproot()
            .ok_or(SigningError::InvalidOutputScript)?;

        if self.mode == SigningMode::SizeEstimation {
            return Ok(vec![vec![0u8; 64]]);
        }

        // The default type is the canonical form of "sign everything".
        let taproot_hash_type = if self.hash_type == SIGHASH_ALL {
            SIGHASH_DEFAULT
        } else {
            self.hash_type
        };

        let spent_outputs: Vec<TransactionOutput> = self
            .plan
            .utxos
            .iter()
            .map(|utxo| TransactionOutput::new(utxo.amount, utxo.script.clone()))
            .collect();
        let digest = sighash::taproot_signature_hash(
            &self.transaction,
            index,
            taproot_hash_type,
            &spent_outputs,
        )
        .map_err(|_| SigningError::SigningFailure)?;

        let mut item = match self.mode {
            SigningMode::HashOnly => {
                self.hashes.push(PreImageHash {
                    input_index: index,
                    digest,
                    public_key_hash: output_key.to_vec(),
                    taproot: true,
                });
                vec![0u8; 64]
            }
            SigningMode::External => {
                let position = self.hashes.len();
                self.hashes.push(PreImageHash {
                    input_index: index,
                    digest,
                    public_key_hash: output_key.to_vec(),
                    taproot: true,
                });
                let (signature, public_key_bytes) = self
                    .external_signatures
                    .get(position)
                    .ok_or(SigningError::SigningFailure)?;
                if public_key_bytes.as_slice() != output_key.as_slice() {
                    return Err(SigningError::InvalidParams);
                }
                if !taproot::schnorr_verify(&output_key, &digest, signature) {
                    return Err(SigningError::SigningFailure);
                }
                signature.clone()
            }
            SigningMode::Normal => {
                let private_key = self
                    .input
                    .private_keys
                    .iter()
                    .find(|key| {
                        taproot::tweaked_signing_key(key)
                            .map(|signing_key| {
                                signing_key.verifying_key().to_bytes().as_slice()
                                    == output_key.as_slice()
                            })
                            .unwrap_or(false)
                    })
                    .ok_or(SigningError::MissingPrivateKey)?;
                let signing_key = taproot::tweaked_signing_key(private_key)
                    .map_err(|_| SigningError::SigningFailure)?;
                taproot::schnorr_sign(&signing_key, &digest)
                    .map_err(|_| SigningError::SigningFailure)?
                    .to_vec()
            }
            SigningMode::SizeEstimation => unreachable!("handled above"),
        };

        if taproot_hash_type != SIGHASH_DEFAULT {
            item.push(taproot_hash_type as u8);
        }
        Ok(vec![item])
    }

    /// Find the private key whose compressed public key hashes to the given
    /// key-hash.
    fn key_pair_for_hash(&self, key_hash: &[u8]) -> Option<(PrivateKey, Vec<u8>)> {
        for private_key in &self.input.private_keys {
            let public_key = private_key.public_key();
            if public_key.hash160().as_slice() == key_hash {
                return Some((private_key.clone(), public_key.to_compressed().to_vec()));
            }
        }
        None
    }

    /// Look up a redeem/witness script by the hash its locking script
    /// commits to.
    fn redeem_script_for_hash(&self, hash: &[u8]) -> Option<Script> {
        self.input
            .redeem_scripts
            .get(&hex::encode(hash))
            .filter(|script| !script.is_empty())
            .cloned()
    }
}

/// The end-to-end signing entry points.
pub struct TransactionSigner;

/// A signed transaction with its encoding and id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningOutput {
    /// The fully signed transaction.
    pub transaction: Transaction,
    /// The broadcast-ready encoding (witness envelope included when any
    /// input carries a witness).
    pub encoded: Vec<u8>,
    /// The transaction id, display (big-endian) hex.
    pub transaction_id: String,
}

impl TransactionSigner {
    /// Resolve the plan for a request: the precomputed plan when supplied,
    /// otherwise a fresh planning run.
    pub fn plan(input: &SigningInput) -> TransactionPlan {
        match &input.plan {
            Some(plan) => plan.clone(),
            None => TransactionBuilder::plan(input),
        }
    }

    /// Plan, build, sign, and encode a transaction.
    ///
    /// # Arguments
    /// * `input` - The send request, including private keys.
    ///
    /// # Returns
    /// The signed transaction with its encoding and id, or the first
    /// terminal error.
    pub fn sign(input: &SigningInput) -> Result<SigningOutput, SigningError> {
        let plan = Self::plan(input);
        if let Some(error) = plan.error {
            return Err(error);
        }

        let unsigned = TransactionBuilder::build(&plan, input)?;
        let mut builder = SignatureBuilder::new(input, &plan, unsigned, SigningMode::Normal);
        let signed = builder.sign()?;

        Ok(SigningOutput {
            encoded: signed.to_bytes(),
            transaction_id: signed.tx_id_hex(),
            transaction: signed,
        })
    }
}
