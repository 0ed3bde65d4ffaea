//! Signature hash computation.
//!
//! Computes the digest a signature authorizes for a given input. Three
//! constructions exist: the legacy whole-transaction serialization with
//! script blanking, the SegWit v0 form committing to the spent amount
//! through cached component hashes, and the taproot form hashing all spent
//! amounts and scripts in a single tagged pass.

use utxo_primitives::hash::{sha256, sha256d, tagged_hash};
use utxo_primitives::util::{VarInt, WireWriter};

use crate::output::TransactionOutput;
use crate::transaction::Transaction;
use crate::TransactionError;

// -----------------------------------------------------------------------
// Sighash flag constants
// -----------------------------------------------------------------------

/// Taproot default: sign all inputs and outputs, omit the type byte.
pub const SIGHASH_DEFAULT: u32 = 0x00;

/// Sign all inputs and all outputs.
pub const SIGHASH_ALL: u32 = 0x01;

/// Sign all inputs but no outputs.
pub const SIGHASH_NONE: u32 = 0x02;

/// Sign all inputs and only the output at the same index as the input.
pub const SIGHASH_SINGLE: u32 = 0x03;

/// Replay-protection flag used by forked chains; selects the v0 digest for
/// every input.
pub const SIGHASH_FORKID: u32 = 0x40;

/// Sign only the current input, allowing others to be added later.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// Mask extracting the base type (ALL, NONE, SINGLE).
pub const SIGHASH_MASK: u32 = 0x1f;

/// Whether the base type is SIGHASH_SINGLE.
pub fn is_single(hash_type: u32) -> bool {
    hash_type & SIGHASH_MASK == SIGHASH_SINGLE
}

/// Whether the base type is SIGHASH_NONE.
pub fn is_none(hash_type: u32) -> bool {
    hash_type & SIGHASH_MASK == SIGHASH_NONE
}

/// Whether SIGHASH_ANYONECANPAY is set.
pub fn is_anyone_can_pay(hash_type: u32) -> bool {
    hash_type & SIGHASH_ANYONECANPAY != 0
}

/// Which serialization the digest uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureVersion {
    /// Legacy whole-transaction serialization with script blanking.
    Base,
    /// SegWit v0 (amount-committing) serialization.
    WitnessV0,
    /// Taproot tagged-hash serialization.
    Taproot,
}

/// Chain-specific fields injected into the digest at fixed positions.
///
/// The branch id follows the version field; the expiry height follows the
/// lock time. Neither changes the blanking rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SighashExtra {
    /// Consensus branch id for replay protection.
    pub branch_id: u32,
    /// Expiry height of the transaction.
    pub expiry_height: u32,
}

// -----------------------------------------------------------------------
// Entry points
// -----------------------------------------------------------------------

/// Compute the signature hash for one input.
///
/// # Arguments
/// * `tx` - The transaction being signed.
/// * `input_index` - Index of the input being signed.
/// * `script_code` - The script the signature must satisfy (the locking
///   script, redeem script, or synthesized P2PKH form for P2WPKH).
/// * `hash_type` - The sighash flags.
/// * `amount` - Value of the output being spent (v0 only).
/// * `version` - Which digest construction to use ([`SignatureVersion::Taproot`]
///   requires [`taproot_signature_hash`] instead).
/// * `extra` - Chain-specific extra fields, if the coin requires them.
///
/// # Returns
/// The 32-byte double-SHA256 digest.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &[u8],
    hash_type: u32,
    amount: i64,
    version: SignatureVersion,
    extra: Option<&SighashExtra>,
) -> Result<[u8; 32], TransactionError> {
    if input_index >= tx.inputs.len() {
        return Err(TransactionError::InvalidTransaction(format!(
            "input index {} out of range (tx has {} inputs)",
            input_index,
            tx.inputs.len()
        )));
    }
    match version {
        SignatureVersion::Base => signature_hash_base(tx, input_index, script_code, hash_type, extra),
        SignatureVersion::WitnessV0 => {
            Ok(signature_hash_witness_v0(tx, input_index, script_code, hash_type, amount, extra))
        }
        SignatureVersion::Taproot => Err(TransactionError::InvalidTransaction(
            "taproot digests carry all spent outputs; use taproot_signature_hash".to_string(),
        )),
    }
}

// -----------------------------------------------------------------------
// Legacy
// -----------------------------------------------------------------------

/// Legacy digest: serialize the transaction with every input's script_sig
/// blanked except the signed input (set to `script_code`), apply the
/// output- and input-pruning semantics of the base type and
/// ANYONECANPAY, append the hash type, and double-hash.
fn signature_hash_base(
    tx: &Transaction,
    input_index: usize,
    script_code: &[u8],
    hash_type: u32,
    extra: Option<&SighashExtra>,
) -> Result<[u8; 32], TransactionError> {
    let single = is_single(hash_type);
    let none = is_none(hash_type);
    if single && input_index >= tx.outputs.len() {
        return Err(TransactionError::InvalidTransaction(format!(
            "no output at index {} for SIGHASH_SINGLE",
            input_index
        )));
    }

    let mut writer = WireWriter::with_capacity(256);
    writer.write_u32_le(tx.version);
    if let Some(extra) = extra {
        writer.write_u32_le(extra.branch_id);
    }

    // Inputs: only the signed one under ANYONECANPAY.
    let input_count = if is_anyone_can_pay(hash_type) {
        1
    } else {
        tx.inputs.len()
    };
    writer.write_varint(VarInt::from(input_count));
    for position in 0..input_count {
        let subindex = if is_anyone_can_pay(hash_type) {
            input_index
        } else {
            position
        };
        let input = &tx.inputs[subindex];
        input.previous_output.encode(&mut writer);
        if subindex == input_index {
            writer.write_var_bytes(script_code);
        } else {
            writer.write_varint(VarInt::from(0u64));
        }
        if subindex != input_index && (single || none) {
            writer.write_u32_le(0);
        } else {
            writer.write_u32_le(input.sequence);
        }
    }

    // Outputs: none, the matching one (with -1 placeholders before it), or all.
    let output_count = if none {
        0
    } else if single {
        input_index + 1
    } else {
        tx.outputs.len()
    };
    writer.write_varint(VarInt::from(output_count));
    for subindex in 0..output_count {
        if single && subindex != input_index {
            TransactionOutput::new(-1, utxo_script::Script::new()).encode(&mut writer);
        } else {
            tx.outputs[subindex].encode(&mut writer);
        }
    }

    writer.write_u32_le(tx.lock_time);
    if let Some(extra) = extra {
        writer.write_u32_le(extra.expiry_height);
    }
    writer.write_u32_le(hash_type);

    Ok(sha256d(writer.as_bytes()))
}

// -----------------------------------------------------------------------
// SegWit v0
// -----------------------------------------------------------------------

/// SegWit v0 digest committing to the spent amount.
///
/// The preimage is
/// `version ∥ hashPrevouts ∥ hashSequence ∥ outpoint ∥ scriptCode ∥ amount ∥
/// sequence ∥ hashOutputs ∥ lockTime ∥ hashType`, double-hashed. The three
/// component hashes are zeroed according to the ANYONECANPAY and base-type
/// rules.
fn signature_hash_witness_v0(
    tx: &Transaction,
    input_index: usize,
    script_code: &[u8],
    hash_type: u32,
    amount: i64,
    extra: Option<&SighashExtra>,
) -> [u8; 32] {
    let single = is_single(hash_type);
    let none = is_none(hash_type);

    let hash_prevouts = if !is_anyone_can_pay(hash_type) {
        prevouts_hash(tx)
    } else {
        [0u8; 32]
    };

    let hash_sequence = if !is_anyone_can_pay(hash_type) && !single && !none {
        sequences_hash(tx)
    } else {
        [0u8; 32]
    };

    let hash_outputs = if !single && !none {
        outputs_hash(tx, None)
    } else if single && input_index < tx.outputs.len() {
        outputs_hash(tx, Some(input_index))
    } else {
        [0u8; 32]
    };

    let input = &tx.inputs[input_index];
    let mut writer = WireWriter::with_capacity(256);
    writer.write_u32_le(tx.version);
    if let Some(extra) = extra {
        writer.write_u32_le(extra.branch_id);
    }
    writer.write_bytes(&hash_prevouts);
    writer.write_bytes(&hash_sequence);
    input.previous_output.encode(&mut writer);
    writer.write_var_bytes(script_code);
    writer.write_i64_le(amount);
    writer.write_u32_le(input.sequence);
    writer.write_bytes(&hash_outputs);
    writer.write_u32_le(tx.lock_time);
    if let Some(extra) = extra {
        writer.write_u32_le(extra.expiry_height);
    }
    writer.write_u32_le(hash_type);

    sha256d(writer.as_bytes())
}

/// Double-SHA256 of all input outpoints concatenated.
fn prevouts_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = WireWriter::with_capacity(tx.inputs.len() * 36);
    for input in &tx.inputs {
        input.previous_output.encode(&mut writer);
    }
    sha256d(writer.as_bytes())
}

/// Double-SHA256 of all input sequence numbers concatenated.
fn sequences_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = WireWriter::with_capacity(tx.inputs.len() * 4);
    for input in &tx.inputs {
        writer.write_u32_le(input.sequence);
    }
    sha256d(writer.as_bytes())
}

/// Double-SHA256 of serialized outputs: all of them, or a single one.
fn outputs_hash(tx: &Transaction, only: Option<usize>) -> [u8; 32] {
    let mut writer = WireWriter::new();
    match only {
        Some(index) => tx.outputs[index].encode(&mut writer),
        None => {
            for output in &tx.outputs {
                output.encode(&mut writer);
            }
        }
    }
    sha256d(writer.as_bytes())
}

// -----------------------------------------------------------------------
// Taproot
// -----------------------------------------------------------------------

/// Taproot key-path digest.
///
/// A single tagged-hash pass over transaction-wide and per-input fields,
/// including every spent amount and locking script; no blanking is needed
/// because the signature keys are tweaked per output.
///
/// # Arguments
/// * `tx` - The transaction being signed.
/// * `input_index` - Index of the input being signed.
/// * `hash_type` - `SIGHASH_DEFAULT` or a base type with optional
///   ANYONECANPAY.
/// * `spent_outputs` - The output spent by each input, in input order.
///
/// # Returns
/// The 32-byte "TapSighash"-tagged digest.
pub fn taproot_signature_hash(
    tx: &Transaction,
    input_index: usize,
    hash_type: u32,
    spent_outputs: &[TransactionOutput],
) -> Result<[u8; 32], TransactionError> {
    if input_index >= tx.inputs.len() {
        return Err(TransactionError::InvalidTransaction(format!(
            "input index {} out of range (tx has {} inputs)",
            input_index,
            tx.inputs.len()
        )));
    }
    if spent_outputs.len() != tx.inputs.len() {
        return Err(TransactionError::InvalidTransaction(format!(
            "{} spent outputs provided for {} inputs",
            spent_outputs.len(),
            tx.inputs.len()
        )));
    }
    let base = hash_type & SIGHASH_MASK;
    let valid = match (base, is_anyone_can_pay(hash_type)) {
        (SIGHASH_DEFAULT, false) => true,
        (SIGHASH_ALL | SIGHASH_NONE | SIGHASH_SINGLE, _) => true,
        _ => false,
    };
    if !valid || hash_type & !(SIGHASH_MASK | SIGHASH_ANYONECANPAY) != 0 {
        return Err(TransactionError::InvalidTransaction(format!(
            "invalid taproot sighash type {:#x}",
            hash_type
        )));
    }
    let single = base == SIGHASH_SINGLE;
    let none = base == SIGHASH_NONE;
    if single && input_index >= tx.outputs.len() {
        return Err(TransactionError::InvalidTransaction(format!(
            "no output at index {} for SIGHASH_SINGLE",
            input_index
        )));
    }

    let mut writer = WireWriter::with_capacity(256);
    // Sighash epoch.
    writer.write_u8(0x00);
    writer.write_u8(hash_type as u8);
    writer.write_u32_le(tx.version);
    writer.write_u32_le(tx.lock_time);

    if !is_anyone_can_pay(hash_type) {
        let mut prevouts = WireWriter::new();
        let mut amounts = WireWriter::new();
        let mut scripts = WireWriter::new();
        let mut sequences = WireWriter::new();
        for (input, spent) in tx.inputs.iter().zip(spent_outputs.iter()) {
            input.previous_output.encode(&mut prevouts);
            amounts.write_i64_le(spent.value);
            scripts.write_var_bytes(spent.locking_script.as_bytes());
            sequences.write_u32_le(input.sequence);
        }
        writer.write_bytes(&sha256(prevouts.as_bytes()));
        writer.write_bytes(&sha256(amounts.as_bytes()));
        writer.write_bytes(&sha256(scripts.as_bytes()));
        writer.write_bytes(&sha256(sequences.as_bytes()));
    }

    if !single && !none {
        let mut outputs = WireWriter::new();
        for output in &tx.outputs {
            output.encode(&mut outputs);
        }
        writer.write_bytes(&sha256(outputs.as_bytes()));
    }

    // Spend type: key path, no annex.
    writer.write_u8(0x00);

    if is_anyone_can_pay(hash_type) {
        let input = &tx.inputs[input_index];
        let spent = &spent_outputs[input_index];
        input.previous_output.encode(&mut writer);
        writer.write_i64_le(spent.value);
        writer.write_var_bytes(spent.locking_script.as_bytes());
        writer.write_u32_le(input.sequence);
    } else {
        writer.write_u32_le(input_index as u32);
    }

    if single {
        writer.write_bytes(&sha256(&tx.outputs[input_index].to_bytes()));
    }

    Ok(tagged_hash("TapSighash", writer.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TransactionInput;
    use crate::out_point::OutPoint;
    use utxo_script::Script;

    fn reversed(hex_str: &str) -> [u8; 32] {
        let bytes = hex::decode(hex_str).unwrap();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes);
        hash
    }

    /// The native-P2WPKH reference transaction: two inputs, two P2PKH
    /// outputs, lock time 0x11.
    fn reference_tx() -> Transaction {
        let mut tx = Transaction::new(1, 0x11);
        tx.inputs.push(TransactionInput::new(OutPoint::with_sequence(
            reversed("fff7f7881a8099afa6940d42d1e7f6362bec38171ea3edf433541db4e4ad969f"),
            0,
            0xffffffee,
        )));
        tx.inputs.push(TransactionInput::new(OutPoint::with_sequence(
            reversed("ef51e1b804cc89d182d279655c3aa89e815b1b309fe287d9b2b55d57b90ec68a"),
            1,
            0xffffffff,
        )));
        tx.outputs.push(TransactionOutput::new(
            112_340_000,
            Script::from_hex("76a9148280b37df378db99f66f85c95a783a76ac7a6d5988ac").unwrap(),
        ));
        tx.outputs.push(TransactionOutput::new(
            223_450_000,
            Script::from_hex("76a9143bde42dbee7e4dbe6a21b2d50ce2f0167faa815988ac").unwrap(),
        ));
        tx
    }

    #[test]
    fn test_witness_v0_reference_digest() {
        // Published digest for signing input 1 of the reference transaction
        // with the implied P2PKH script code and SIGHASH_ALL.
        let tx = reference_tx();
        let script_code =
            hex::decode("76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac").unwrap();
        let digest = signature_hash(
            &tx,
            1,
            &script_code,
            SIGHASH_ALL,
            600_000_000,
            SignatureVersion::WitnessV0,
            None,
        )
        .unwrap();
        assert_eq!(
            hex::encode(digest),
            "c37af31116d1b27caf68aae9e3ac82f1477929014d5b917657d0eb49478cb670"
        );
    }

    #[test]
    fn test_witness_v0_anyone_can_pay_zeroes_prevouts() {
        let tx = reference_tx();
        let script_code =
            hex::decode("76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac").unwrap();
        let all = signature_hash(&tx, 1, &script_code, SIGHASH_ALL, 600_000_000,
            SignatureVersion::WitnessV0, None).unwrap();
        let acp = signature_hash(&tx, 1, &script_code, SIGHASH_ALL | SIGHASH_ANYONECANPAY,
            600_000_000, SignatureVersion::WitnessV0, None).unwrap();
        assert_ne!(all, acp);
    }

    #[test]
    fn test_witness_v0_single_out_of_range_hashes_zeros() {
        // SIGHASH_SINGLE with no matching output commits to a zeroed
        // outputs hash rather than failing.
        let mut tx = reference_tx();
        tx.outputs.truncate(1);
        let script_code =
            hex::decode("76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac").unwrap();
        assert!(signature_hash(&tx, 1, &script_code, SIGHASH_SINGLE, 600_000_000,
            SignatureVersion::WitnessV0, None).is_ok());
    }

    #[test]
    fn test_legacy_digest_changes_with_hash_type() {
        let tx = reference_tx();
        let script_code =
            hex::decode("76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac").unwrap();
        let all = signature_hash(&tx, 0, &script_code, SIGHASH_ALL, 0,
            SignatureVersion::Base, None).unwrap();
        let none = signature_hash(&tx, 0, &script_code, SIGHASH_NONE, 0,
            SignatureVersion::Base, None).unwrap();
        let acp = signature_hash(&tx, 0, &script_code, SIGHASH_ALL | SIGHASH_ANYONECANPAY, 0,
            SignatureVersion::Base, None).unwrap();
        assert_ne!(all, none);
        assert_ne!(all, acp);
        assert_ne!(none, acp);
    }

    #[test]
    fn test_legacy_single_requires_matching_output() {
        let mut tx = reference_tx();
        tx.outputs.truncate(1);
        let script_code =
            hex::decode("76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac").unwrap();
        assert!(signature_hash(&tx, 1, &script_code, SIGHASH_SINGLE, 0,
            SignatureVersion::Base, None).is_err());
    }

    #[test]
    fn test_legacy_blanks_other_inputs() {
        // The digest must not depend on another input's script_sig.
        let mut tx = reference_tx();
        let script_code =
            hex::decode("76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac").unwrap();
        let before = signature_hash(&tx, 1, &script_code, SIGHASH_ALL, 0,
            SignatureVersion::Base, None).unwrap();
        tx.inputs[0].script_sig = Script::from_bytes(&[0x51, 0x51]);
        let after = signature_hash(&tx, 1, &script_code, SIGHASH_ALL, 0,
            SignatureVersion::Base, None).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_extra_fields_change_digest_at_fixed_positions() {
        let tx = reference_tx();
        let script_code =
            hex::decode("76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac").unwrap();
        let extra = SighashExtra { branch_id: 0x76b809bb, expiry_height: 0 };
        let plain = signature_hash(&tx, 1, &script_code, SIGHASH_ALL, 600_000_000,
            SignatureVersion::WitnessV0, None).unwrap();
        let branched = signature_hash(&tx, 1, &script_code, SIGHASH_ALL, 600_000_000,
            SignatureVersion::WitnessV0, Some(&extra)).unwrap();
        assert_ne!(plain, branched);

        let expired = SighashExtra { branch_id: 0x76b809bb, expiry_height: 100 };
        let with_expiry = signature_hash(&tx, 1, &script_code, SIGHASH_ALL, 600_000_000,
            SignatureVersion::WitnessV0, Some(&expired)).unwrap();
        assert_ne!(branched, with_expiry);
    }

    #[test]
    fn test_index_out_of_range() {
        let tx = reference_tx();
        assert!(signature_hash(&tx, 2, &[], SIGHASH_ALL, 0,
            SignatureVersion::Base, None).is_err());
        assert!(taproot_signature_hash(&tx, 2, SIGHASH_DEFAULT, &[]).is_err());
    }

    fn taproot_spent_outputs(tx: &Transaction) -> Vec<TransactionOutput> {
        let key = [0x55u8; 32];
        tx.inputs
            .iter()
            .map(|_| TransactionOutput::new(50_000, Script::build_pay_to_taproot(&key)))
            .collect()
    }

    #[test]
    fn test_taproot_requires_all_spent_outputs() {
        let tx = reference_tx();
        assert!(taproot_signature_hash(&tx, 0, SIGHASH_DEFAULT, &[]).is_err());
        let spent = taproot_spent_outputs(&tx);
        assert!(taproot_signature_hash(&tx, 0, SIGHASH_DEFAULT, &spent).is_ok());
    }

    #[test]
    fn test_taproot_commits_to_spent_amounts() {
        let tx = reference_tx();
        let spent = taproot_spent_outputs(&tx);
        let digest = taproot_signature_hash(&tx, 0, SIGHASH_DEFAULT, &spent).unwrap();

        let mut altered = spent.clone();
        altered[1].value += 1;
        let other = taproot_signature_hash(&tx, 0, SIGHASH_DEFAULT, &altered).unwrap();
        assert_ne!(digest, other);
    }

    #[test]
    fn test_taproot_rejects_fork_id_flag() {
        let tx = reference_tx();
        let spent = taproot_spent_outputs(&tx);
        assert!(taproot_signature_hash(&tx, 0, SIGHASH_ALL | SIGHASH_FORKID, &spent).is_err());
    }

    #[test]
    fn test_taproot_default_differs_from_all() {
        // DEFAULT and ALL commit to the same data but a different type byte.
        let tx = reference_tx();
        let spent = taproot_spent_outputs(&tx);
        let by_default = taproot_signature_hash(&tx, 0, SIGHASH_DEFAULT, &spent).unwrap();
        let by_all = taproot_signature_hash(&tx, 0, SIGHASH_ALL, &spent).unwrap();
        assert_ne!(by_default, by_all);
    }
}
