//! The `Script` type: an opaque byte program with pattern classification.
//!
//! Scripts are treated as data. Classification recognizes the standard
//! locking-script templates by their byte patterns; builders produce the
//! canonical encodings for each template.

use std::fmt;

use utxo_primitives::hash::hash160;

use crate::opcodes::*;

/// The maximum OP_RETURN payload accepted by standard relay policy.
pub const MAX_OP_RETURN_LENGTH: usize = 80;

/// The recognized locking-script template of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// Pay-to-public-key-hash.
    P2pkh,
    /// Pay-to-script-hash.
    P2sh,
    /// Pay-to-witness-public-key-hash (SegWit v0, 20-byte program).
    P2wpkh,
    /// Pay-to-witness-script-hash (SegWit v0, 32-byte program).
    P2wsh,
    /// Pay-to-taproot (SegWit v1, 32-byte x-only key).
    P2tr,
    /// Bare pay-to-public-key.
    P2pk,
    /// Bare m-of-n multisig.
    Multisig,
    /// Unspendable data-carrier output.
    OpReturn,
    /// No recognized template. A valid result, not an error.
    Unknown,
}

/// A script, represented as a byte vector newtype.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Script(Vec<u8>);

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create a new empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Create a script from a hex-encoded string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string (e.g. "76a914...88ac").
    ///
    /// # Returns
    /// A `Script` wrapping the decoded bytes, or an error if the hex is
    /// invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, crate::ScriptError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| crate::ScriptError::InvalidHex(e.to_string()))?;
        Ok(Script(bytes))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Return a reference to the underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the script and return the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Encode the script as a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Return the length of the script in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the script is empty (zero bytes).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compute the Hash160 of the script bytes.
    ///
    /// This is the hash a P2SH locking script commits to.
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.0)
    }

    // -----------------------------------------------------------------------
    // Push-data construction
    // -----------------------------------------------------------------------

    /// Append a data push with the canonical minimal push opcode.
    ///
    /// # Arguments
    /// * `data` - The bytes to push.
    pub fn append_push_data(&mut self, data: &[u8]) {
        if data.len() < OP_PUSHDATA1 as usize {
            self.0.push(data.len() as u8);
        } else if data.len() <= 0xff {
            self.0.push(OP_PUSHDATA1);
            self.0.push(data.len() as u8);
        } else if data.len() <= 0xffff {
            self.0.push(OP_PUSHDATA2);
            self.0.extend_from_slice(&(data.len() as u16).to_le_bytes());
        } else {
            self.0.push(OP_PUSHDATA4);
            self.0.extend_from_slice(&(data.len() as u32).to_le_bytes());
        }
        self.0.extend_from_slice(data);
    }

    /// Build a script that pushes each item in order.
    ///
    /// Empty items become OP_0 and single bytes 1..16 become their
    /// small-integer opcodes, matching the canonical scriptSig encoding of
    /// signature stacks.
    ///
    /// # Arguments
    /// * `items` - The stack items to push.
    pub fn push_all(items: &[Vec<u8>]) -> Script {
        let mut script = Script::new();
        for item in items {
            if item.is_empty() {
                script.0.push(OP_0);
            } else if item.len() == 1 && (1..=16).contains(&item[0]) {
                script.0.push(encode_small_integer(item[0]));
            } else {
                script.append_push_data(item);
            }
        }
        script
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    /// Check for the pay-to-script-hash pattern:
    /// `OP_HASH160 <20 bytes> OP_EQUAL`.
    pub fn is_pay_to_script_hash(&self) -> bool {
        self.0.len() == 23
            && self.0[0] == OP_HASH160
            && self.0[1] == 0x14
            && self.0[22] == OP_EQUAL
    }

    /// Check whether this is any witness program: a version opcode followed
    /// by a single 2..40 byte push.
    pub fn is_witness_program(&self) -> bool {
        if self.0.len() < 4 || self.0.len() > 42 {
            return false;
        }
        if self.0[0] != OP_0 && !(OP_1..=OP_16).contains(&self.0[0]) {
            return false;
        }
        self.0[1] as usize + 2 == self.0.len()
    }

    /// Extract the public key from a bare P2PK script:
    /// `<33 or 65 byte key> OP_CHECKSIG`.
    pub fn match_pay_to_public_key(&self) -> Option<Vec<u8>> {
        for key_len in [33usize, 65] {
            if self.0.len() == key_len + 2
                && self.0[0] as usize == key_len
                && self.0[key_len + 1] == OP_CHECKSIG
            {
                return Some(self.0[1..1 + key_len].to_vec());
            }
        }
        None
    }

    /// Extract the key-hash from a P2PKH script:
    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn match_pay_to_public_key_hash(&self) -> Option<[u8; 20]> {
        if self.0.len() == 25
            && self.0[0] == OP_DUP
            && self.0[1] == OP_HASH160
            && self.0[2] == 0x14
            && self.0[23] == OP_EQUALVERIFY
            && self.0[24] == OP_CHECKSIG
        {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&self.0[3..23]);
            return Some(hash);
        }
        None
    }

    /// Extract the script-hash from a P2SH script.
    pub fn match_pay_to_script_hash(&self) -> Option<[u8; 20]> {
        if !self.is_pay_to_script_hash() {
            return None;
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&self.0[2..22]);
        Some(hash)
    }

    /// Extract the key-hash from a P2WPKH script: `OP_0 <20 bytes>`.
    pub fn match_pay_to_witness_public_key_hash(&self) -> Option<[u8; 20]> {
        if self.0.len() == 22 && self.0[0] == OP_0 && self.0[1] == 0x14 {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&self.0[2..]);
            return Some(hash);
        }
        None
    }

    /// Extract the script-hash from a P2WSH script: `OP_0 <32 bytes>`.
    pub fn match_pay_to_witness_script_hash(&self) -> Option<[u8; 32]> {
        if self.0.len() == 34 && self.0[0] == OP_0 && self.0[1] == 0x20 {
            let mut hash = [0u8; 32];
            hash.copy_from_slice(&self.0[2..]);
            return Some(hash);
        }
        None
    }

    /// Extract the x-only output key from a P2TR script: `OP_1 <32 bytes>`.
    pub fn match_pay_to_taproot(&self) -> Option<[u8; 32]> {
        if self.0.len() == 34 && self.0[0] == OP_1 && self.0[1] == 0x20 {
            let mut key = [0u8; 32];
            key.copy_from_slice(&self.0[2..]);
            return Some(key);
        }
        None
    }

    /// Extract the public keys and required-signature count from a bare
    /// multisig script: `OP_m <key>... OP_n OP_CHECKMULTISIG`.
    ///
    /// # Returns
    /// `Some((keys, required))` when the pattern matches exactly.
    pub fn match_multisig(&self) -> Option<(Vec<Vec<u8>>, usize)> {
        if self.0.last() != Some(&OP_CHECKMULTISIG) {
            return None;
        }

        let mut pos = 0usize;
        let (opcode, _) = self.read_op(&mut pos)?;
        let required = decode_small_integer(opcode)?;

        let mut keys: Vec<Vec<u8>> = Vec::new();
        let mut last_opcode = opcode;
        while let Some((op, operand)) = self.read_op(&mut pos) {
            last_opcode = op;
            if !is_valid_public_key(&operand) {
                break;
            }
            keys.push(operand);
        }

        let expected = decode_small_integer(last_opcode)?;
        if keys.len() != expected || expected < required {
            return None;
        }
        if pos + 1 != self.0.len() {
            return None;
        }
        Some((keys, required))
    }

    /// Classify this script against the standard templates.
    pub fn kind(&self) -> ScriptKind {
        if self.match_pay_to_public_key_hash().is_some() {
            ScriptKind::P2pkh
        } else if self.is_pay_to_script_hash() {
            ScriptKind::P2sh
        } else if self.match_pay_to_witness_public_key_hash().is_some() {
            ScriptKind::P2wpkh
        } else if self.match_pay_to_witness_script_hash().is_some() {
            ScriptKind::P2wsh
        } else if self.match_pay_to_taproot().is_some() {
            ScriptKind::P2tr
        } else if self.match_pay_to_public_key().is_some() {
            ScriptKind::P2pk
        } else if self.match_multisig().is_some() {
            ScriptKind::Multisig
        } else if !self.0.is_empty() && self.0[0] == OP_RETURN {
            ScriptKind::OpReturn
        } else {
            ScriptKind::Unknown
        }
    }

    /// Extract the hash a spender must satisfy: the key-hash for
    /// P2PKH/P2WPKH (and hash160 of the key for P2PK), the script-hash for
    /// P2SH/P2WSH, or the 32-byte output key for P2TR.
    ///
    /// # Returns
    /// `None` for OP_RETURN, multisig, and unrecognized scripts.
    pub fn spending_hash(&self) -> Option<Vec<u8>> {
        if let Some(hash) = self.match_pay_to_public_key_hash() {
            return Some(hash.to_vec());
        }
        if let Some(hash) = self.match_pay_to_witness_public_key_hash() {
            return Some(hash.to_vec());
        }
        if let Some(hash) = self.match_pay_to_script_hash() {
            return Some(hash.to_vec());
        }
        if let Some(hash) = self.match_pay_to_witness_script_hash() {
            return Some(hash.to_vec());
        }
        if let Some(key) = self.match_pay_to_taproot() {
            return Some(key.to_vec());
        }
        if let Some(key) = self.match_pay_to_public_key() {
            return Some(hash160(&key).to_vec());
        }
        None
    }

    /// Read one operation at `*pos`: the opcode and its immediate operand.
    ///
    /// Advances `*pos` past the operation. Returns `None` at the end of the
    /// script or on a truncated push.
    fn read_op(&self, pos: &mut usize) -> Option<(u8, Vec<u8>)> {
        let bytes = &self.0;
        if *pos >= bytes.len() {
            return None;
        }
        let opcode = bytes[*pos];
        *pos += 1;

        if opcode > OP_PUSHDATA4 {
            return Some((opcode, Vec::new()));
        }

        let size = if opcode < OP_PUSHDATA1 {
            opcode as usize
        } else if opcode == OP_PUSHDATA1 {
            if bytes.len() - *pos < 1 {
                return None;
            }
            let size = bytes[*pos] as usize;
            *pos += 1;
            size
        } else if opcode == OP_PUSHDATA2 {
            if bytes.len() - *pos < 2 {
                return None;
            }
            let size = u16::from_le_bytes([bytes[*pos], bytes[*pos + 1]]) as usize;
            *pos += 2;
            size
        } else {
            if bytes.len() - *pos < 4 {
                return None;
            }
            let size = u32::from_le_bytes([
                bytes[*pos],
                bytes[*pos + 1],
                bytes[*pos + 2],
                bytes[*pos + 3],
            ]) as usize;
            *pos += 4;
            size
        };

        if bytes.len() - *pos < size {
            return None;
        }
        let operand = bytes[*pos..*pos + size].to_vec();
        *pos += size;
        Some((opcode, operand))
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    /// Build a P2PKH locking script for a 20-byte key-hash.
    pub fn build_pay_to_public_key_hash(hash: &[u8; 20]) -> Script {
        let mut bytes = Vec::with_capacity(25);
        bytes.push(OP_DUP);
        bytes.push(OP_HASH160);
        bytes.push(OP_DATA_20);
        bytes.extend_from_slice(hash);
        bytes.push(OP_EQUALVERIFY);
        bytes.push(OP_CHECKSIG);
        Script(bytes)
    }

    /// Build a P2SH locking script for a 20-byte script-hash.
    pub fn build_pay_to_script_hash(script_hash: &[u8; 20]) -> Script {
        let mut bytes = Vec::with_capacity(23);
        bytes.push(OP_HASH160);
        bytes.push(OP_DATA_20);
        bytes.extend_from_slice(script_hash);
        bytes.push(OP_EQUAL);
        Script(bytes)
    }

    /// Build a P2WPKH locking script for a 20-byte key-hash.
    pub fn build_pay_to_witness_public_key_hash(hash: &[u8; 20]) -> Script {
        let mut bytes = Vec::with_capacity(22);
        bytes.push(OP_0);
        bytes.push(OP_DATA_20);
        bytes.extend_from_slice(hash);
        Script(bytes)
    }

    /// Build a P2WSH locking script for a 32-byte script-hash.
    pub fn build_pay_to_witness_script_hash(script_hash: &[u8; 32]) -> Script {
        let mut bytes = Vec::with_capacity(34);
        bytes.push(OP_0);
        bytes.push(OP_DATA_32);
        bytes.extend_from_slice(script_hash);
        Script(bytes)
    }

    /// Build a P2TR locking script for a 32-byte x-only output key.
    pub fn build_pay_to_taproot(output_key: &[u8; 32]) -> Script {
        let mut bytes = Vec::with_capacity(34);
        bytes.push(OP_1);
        bytes.push(OP_DATA_32);
        bytes.extend_from_slice(output_key);
        Script(bytes)
    }

    /// Build a bare P2PK locking script for a public key.
    pub fn build_pay_to_public_key(public_key: &[u8]) -> Script {
        let mut script = Script::new();
        script.append_push_data(public_key);
        script.0.push(OP_CHECKSIG);
        script
    }

    /// Build an OP_RETURN data-carrier script.
    ///
    /// # Arguments
    /// * `payload` - The data to embed, at most [`MAX_OP_RETURN_LENGTH`] bytes.
    ///
    /// # Returns
    /// `Some(Script)` or `None` when the payload exceeds the accepted size.
    pub fn build_op_return(payload: &[u8]) -> Option<Script> {
        if payload.len() > MAX_OP_RETURN_LENGTH {
            return None;
        }
        let mut script = Script::new();
        script.0.push(OP_RETURN);
        script.append_push_data(payload);
        Some(script)
    }
}

/// A plausibility check for public key pushes inside scripts: correct
/// length and SEC1 prefix, without the curve-point validation that signing
/// performs later.
fn is_valid_public_key(bytes: &[u8]) -> bool {
    match bytes.len() {
        33 => bytes[0] == 0x02 || bytes[0] == 0x03,
        65 => bytes[0] == 0x04,
        _ => false,
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash20() -> [u8; 20] {
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&hex::decode("1d0f172a0ecb48aee1be1f2687d2963ae33f71a1").unwrap());
        hash
    }

    #[test]
    fn test_build_and_match_p2pkh() {
        let script = Script::build_pay_to_public_key_hash(&hash20());
        assert_eq!(
            script.to_hex(),
            "76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac"
        );
        assert_eq!(script.kind(), ScriptKind::P2pkh);
        assert_eq!(script.match_pay_to_public_key_hash(), Some(hash20()));
        assert_eq!(script.spending_hash(), Some(hash20().to_vec()));
    }

    #[test]
    fn test_build_and_match_p2sh() {
        let script = Script::build_pay_to_script_hash(&hash20());
        assert_eq!(script.len(), 23);
        assert_eq!(script.kind(), ScriptKind::P2sh);
        assert_eq!(script.match_pay_to_script_hash(), Some(hash20()));
        assert!(script.match_pay_to_public_key_hash().is_none());
    }

    #[test]
    fn test_build_and_match_p2wpkh() {
        let script = Script::build_pay_to_witness_public_key_hash(&hash20());
        assert_eq!(
            script.to_hex(),
            "00141d0f172a0ecb48aee1be1f2687d2963ae33f71a1"
        );
        assert_eq!(script.kind(), ScriptKind::P2wpkh);
        assert!(script.is_witness_program());
        assert_eq!(script.match_pay_to_witness_public_key_hash(), Some(hash20()));
    }

    #[test]
    fn test_build_and_match_p2wsh() {
        let inner = Script::build_pay_to_public_key_hash(&hash20());
        let script_hash = utxo_primitives::hash::sha256(inner.as_bytes());
        let script = Script::build_pay_to_witness_script_hash(&script_hash);
        assert_eq!(script.kind(), ScriptKind::P2wsh);
        assert_eq!(script.match_pay_to_witness_script_hash(), Some(script_hash));
    }

    #[test]
    fn test_build_and_match_p2tr() {
        let key: [u8; 32] = hex::decode(
            "a60869f0dbcf1dc659c9cecbaf8050135ea9e8cdc487053f1dc6880949dc684c",
        )
        .unwrap()
        .try_into()
        .unwrap();
        let script = Script::build_pay_to_taproot(&key);
        assert_eq!(
            script.to_hex(),
            "5120a60869f0dbcf1dc659c9cecbaf8050135ea9e8cdc487053f1dc6880949dc684c"
        );
        assert_eq!(script.kind(), ScriptKind::P2tr);
        assert_eq!(script.match_pay_to_taproot(), Some(key));
        // A taproot program is a witness program but not SegWit v0.
        assert!(script.is_witness_program());
        assert!(script.match_pay_to_witness_script_hash().is_none());
    }

    #[test]
    fn test_build_and_match_p2pk() {
        let pubkey = hex::decode(
            "03c9f4836b9a4f77fc0d81f7bcb01b7f1b35916864b9476c241ce9fc198bd25432",
        )
        .unwrap();
        let script = Script::build_pay_to_public_key(&pubkey);
        assert_eq!(
            script.to_hex(),
            "2103c9f4836b9a4f77fc0d81f7bcb01b7f1b35916864b9476c241ce9fc198bd25432ac"
        );
        assert_eq!(script.kind(), ScriptKind::P2pk);
        assert_eq!(script.match_pay_to_public_key(), Some(pubkey));
    }

    #[test]
    fn test_match_multisig() {
        let key1 = {
            let mut k = vec![0x02];
            k.extend_from_slice(&[0x11; 32]);
            k
        };
        let key2 = {
            let mut k = vec![0x03];
            k.extend_from_slice(&[0x22; 32]);
            k
        };
        // 1-of-2 multisig.
        let mut script = Script::new();
        script.0.push(OP_1);
        script.append_push_data(&key1);
        script.append_push_data(&key2);
        script.0.push(OP_1 + 1);
        script.0.push(OP_CHECKMULTISIG);

        assert_eq!(script.kind(), ScriptKind::Multisig);
        let (keys, required) = script.match_multisig().unwrap();
        assert_eq!(required, 1);
        assert_eq!(keys, vec![key1, key2]);
    }

    #[test]
    fn test_multisig_rejects_wrong_count() {
        let key = {
            let mut k = vec![0x02];
            k.extend_from_slice(&[0x11; 32]);
            k
        };
        // Declares 2 keys but carries 1.
        let mut script = Script::new();
        script.0.push(OP_1);
        script.append_push_data(&key);
        script.0.push(OP_1 + 1);
        script.0.push(OP_CHECKMULTISIG);
        assert!(script.match_multisig().is_none());
    }

    #[test]
    fn test_op_return_classification() {
        let script = Script::build_op_return(b"hello world").unwrap();
        assert_eq!(script.kind(), ScriptKind::OpReturn);
        assert_eq!(script.as_bytes()[0], OP_RETURN);
        assert!(script.spending_hash().is_none());
    }

    #[test]
    fn test_op_return_size_limit() {
        assert!(Script::build_op_return(&[0u8; 80]).is_some());
        assert!(Script::build_op_return(&[0u8; 81]).is_none());
    }

    #[test]
    fn test_unknown_scripts() {
        assert_eq!(Script::new().kind(), ScriptKind::Unknown);
        assert_eq!(Script::from_bytes(&[OP_DUP, OP_DUP]).kind(), ScriptKind::Unknown);
        // Truncated P2PKH.
        let script = Script::from_hex("76a9141d0f172a0ecb48aee1be1f2687d2963a").unwrap();
        assert_eq!(script.kind(), ScriptKind::Unknown);
    }

    #[test]
    fn test_push_all_small_int_and_empty() {
        let script = Script::push_all(&[vec![], vec![5], vec![0xab, 0xcd]]);
        assert_eq!(script.as_bytes(), &[OP_0, OP_1 + 4, 0x02, 0xab, 0xcd]);
    }

    #[test]
    fn test_append_push_data_sizes() {
        let mut script = Script::new();
        script.append_push_data(&[0u8; 75]);
        assert_eq!(script.as_bytes()[0], 75);

        let mut script = Script::new();
        script.append_push_data(&[0u8; 76]);
        assert_eq!(script.as_bytes()[0], OP_PUSHDATA1);
        assert_eq!(script.as_bytes()[1], 76);

        let mut script = Script::new();
        script.append_push_data(&[0u8; 300]);
        assert_eq!(script.as_bytes()[0], OP_PUSHDATA2);
        assert_eq!(&script.as_bytes()[1..3], &300u16.to_le_bytes());
    }
}
