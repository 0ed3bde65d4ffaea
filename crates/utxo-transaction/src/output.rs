//! Transaction output with value and locking script.

use utxo_primitives::util::{WireReader, WireWriter};
use utxo_script::Script;

use crate::TransactionError;

/// A single transaction output.
///
/// # Wire format
///
/// | Field          | Size         |
/// |----------------|--------------|
/// | value          | 8 bytes (LE) |
/// | script length  | VarInt       |
/// | locking_script | variable     |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    /// The amount locked by this output, in base units.
    pub value: i64,
    /// The locking script (scriptPubKey) defining spending conditions.
    pub locking_script: Script,
}

impl TransactionOutput {
    /// Create an output with the given value and locking script.
    pub fn new(value: i64, locking_script: Script) -> Self {
        TransactionOutput {
            value,
            locking_script,
        }
    }

    /// Serialize this output into a writer.
    pub fn encode(&self, writer: &mut WireWriter) {
        writer.write_i64_le(self.value);
        writer.write_var_bytes(self.locking_script.as_bytes());
    }

    /// Serialize this output to a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = WireWriter::new();
        self.encode(&mut writer);
        writer.into_bytes()
    }

    /// Deserialize an output from a reader.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let value = reader
            .read_i64_le()
            .map_err(|e| TransactionError::SerializationError(format!("reading value: {}", e)))?;
        let script_len = reader
            .read_varint()
            .map_err(|e| TransactionError::SerializationError(format!("reading script length: {}", e)))?;
        let script_bytes = reader
            .read_bytes(script_len.value() as usize)
            .map_err(|e| TransactionError::SerializationError(format!("reading locking script: {}", e)))?;
        Ok(TransactionOutput {
            value,
            locking_script: Script::from_bytes(script_bytes),
        })
    }
}
