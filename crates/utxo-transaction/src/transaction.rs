//! Core transaction type.
//!
//! A transaction is built unsigned (inputs without scripts or witnesses),
//! filled in by the signer, then serialized. The witness envelope (marker,
//! flag, and per-input witness stacks) is included only when requested or
//! when any input carries witness data.

use utxo_primitives::hash::sha256d;
use utxo_primitives::util::{VarInt, WireReader, WireWriter};

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::TransactionError;

/// Whether to serialize the witness envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WitnessFormat {
    /// Include the envelope only when some input carries witness data.
    IfPresent,
    /// Always include the envelope, even with empty stacks.
    Always,
    /// Never include the envelope.
    Never,
}

/// A transaction: version, inputs, outputs, and lock time.
///
/// # Wire format
///
/// | Field          | Size                                  |
/// |----------------|---------------------------------------|
/// | version        | 4 bytes (LE)                          |
/// | marker + flag  | `0001`, only in witness serialization |
/// | input count    | VarInt                                |
/// | inputs         | variable                              |
/// | output count   | VarInt                                |
/// | outputs        | variable                              |
/// | witness stacks | one per input, only in witness form   |
/// | lock_time      | 4 bytes (LE)                          |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction format version.
    pub version: u32,
    /// Block height or timestamp before which the transaction is invalid.
    pub lock_time: u32,
    /// Ordered list of inputs.
    pub inputs: Vec<TransactionInput>,
    /// Ordered list of outputs.
    pub outputs: Vec<TransactionOutput>,
}

impl Transaction {
    /// Create an empty transaction with the given version and lock time.
    pub fn new(version: u32, lock_time: u32) -> Self {
        Transaction {
            version,
            lock_time,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Whether any input carries witness data.
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|input| !input.witness.is_empty())
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// Serialize this transaction to raw bytes.
    ///
    /// # Arguments
    /// * `format` - Which serialization envelope to use.
    pub fn encode(&self, format: WitnessFormat) -> Vec<u8> {
        let witness = match format {
            WitnessFormat::IfPresent => self.has_witness(),
            WitnessFormat::Always => true,
            WitnessFormat::Never => false,
        };

        let mut writer = WireWriter::with_capacity(256);
        writer.write_u32_le(self.version);

        if witness {
            writer.write_u8(0x00);
            writer.write_u8(0x01);
        }

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.encode(&mut writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.encode(&mut writer);
        }

        if witness {
            for input in &self.inputs {
                input.encode_witness(&mut writer);
            }
        }

        writer.write_u32_le(self.lock_time);
        writer.into_bytes()
    }

    /// Serialize with the witness envelope iff witness data is present.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode(WitnessFormat::IfPresent)
    }

    /// Serialize to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse a transaction from raw bytes.
    ///
    /// Detects the witness envelope automatically. The byte slice must
    /// contain exactly one complete transaction with no trailing data.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = WireReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    /// Parse a transaction from a hex-encoded string.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| TransactionError::SerializationError(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Deserialize a transaction from a reader.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let version = reader
            .read_u32_le()
            .map_err(|e| TransactionError::SerializationError(format!("reading version: {}", e)))?;

        // A zero input count is only valid as the witness marker; the flag
        // byte 0x01 follows it.
        let witness = matches!(reader.peek_bytes(2), Ok([0x00, 0x01]));
        if witness {
            let _ = reader.read_bytes(2);
        }

        let input_count = reader
            .read_varint()
            .map_err(|e| TransactionError::SerializationError(format!("reading input count: {}", e)))?;
        let mut inputs = Vec::with_capacity(input_count.value() as usize);
        for _ in 0..input_count.value() {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = reader
            .read_varint()
            .map_err(|e| TransactionError::SerializationError(format!("reading output count: {}", e)))?;
        let mut outputs = Vec::with_capacity(output_count.value() as usize);
        for _ in 0..output_count.value() {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        if witness {
            for input in &mut inputs {
                input.read_witness(reader)?;
            }
        }

        let lock_time = reader
            .read_u32_le()
            .map_err(|e| TransactionError::SerializationError(format!("reading lock time: {}", e)))?;

        Ok(Transaction {
            version,
            lock_time,
            inputs,
            outputs,
        })
    }

    // -----------------------------------------------------------------
    // Transaction id and sizes
    // -----------------------------------------------------------------

    /// Compute the transaction id: double SHA-256 of the non-witness
    /// serialization, in internal byte order.
    pub fn tx_id(&self) -> [u8; 32] {
        sha256d(&self.encode(WitnessFormat::Never))
    }

    /// Compute the transaction id as a display hex string (byte-reversed).
    pub fn tx_id_hex(&self) -> String {
        let mut id = self.tx_id();
        id.reverse();
        hex::encode(id)
    }

    /// Compute the virtual size in bytes: non-witness bytes weigh 4,
    /// witness bytes weigh 1, rounded up.
    pub fn virtual_size(&self) -> usize {
        let non_segwit = self.encode(WitnessFormat::Never).len();
        let segwit = if self.has_witness() {
            self.encode(WitnessFormat::Always).len()
        } else {
            non_segwit
        };
        let weight = non_segwit * 3 + segwit;
        weight / 4 + usize::from(weight % 4 != 0)
    }
}
