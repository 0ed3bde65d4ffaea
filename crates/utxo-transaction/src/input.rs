//! Transaction input referencing a previous output.

use utxo_primitives::util::{VarInt, WireReader, WireWriter};
use utxo_script::Script;

use crate::out_point::OutPoint;
use crate::TransactionError;

/// A single transaction input.
///
/// `script_sig` and `witness` are empty until the input is signed.
///
/// # Wire format (non-witness part)
///
/// | Field           | Size          |
/// |-----------------|---------------|
/// | previous output | 36 bytes      |
/// | script length   | VarInt        |
/// | script_sig      | variable      |
/// | sequence        | 4 bytes (LE)  |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInput {
    /// The output being spent.
    pub previous_output: OutPoint,
    /// The unlocking script. Empty until signed (and always empty for
    /// native SegWit spends).
    pub script_sig: Script,
    /// Sequence number.
    pub sequence: u32,
    /// The witness stack. Empty for non-SegWit spends.
    pub witness: Vec<Vec<u8>>,
}

impl TransactionInput {
    /// Create an unsigned input spending the given outpoint.
    ///
    /// The sequence is taken from the outpoint.
    pub fn new(previous_output: OutPoint) -> Self {
        TransactionInput {
            previous_output,
            script_sig: Script::new(),
            sequence: previous_output.sequence,
            witness: Vec::new(),
        }
    }

    /// Serialize the non-witness part of this input into a writer.
    pub fn encode(&self, writer: &mut WireWriter) {
        self.previous_output.encode(writer);
        writer.write_var_bytes(self.script_sig.as_bytes());
        writer.write_u32_le(self.sequence);
    }

    /// Serialize the witness stack (item count + length-prefixed items).
    pub fn encode_witness(&self, writer: &mut WireWriter) {
        writer.write_varint(VarInt::from(self.witness.len()));
        for item in &self.witness {
            writer.write_var_bytes(item);
        }
    }

    /// Deserialize the non-witness part of an input.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let mut previous_output = OutPoint::read_from(reader)?;

        let script_len = reader
            .read_varint()
            .map_err(|e| TransactionError::SerializationError(format!("reading script length: {}", e)))?;
        let script_bytes = reader
            .read_bytes(script_len.value() as usize)
            .map_err(|e| TransactionError::SerializationError(format!("reading script_sig: {}", e)))?;

        let sequence = reader
            .read_u32_le()
            .map_err(|e| TransactionError::SerializationError(format!("reading sequence: {}", e)))?;
        previous_output.sequence = sequence;

        Ok(TransactionInput {
            previous_output,
            script_sig: Script::from_bytes(script_bytes),
            sequence,
            witness: Vec::new(),
        })
    }

    /// Deserialize this input's witness stack.
    pub fn read_witness(&mut self, reader: &mut WireReader) -> Result<(), TransactionError> {
        let count = reader
            .read_varint()
            .map_err(|e| TransactionError::SerializationError(format!("reading witness count: {}", e)))?;
        let mut witness = Vec::with_capacity(count.value() as usize);
        for _ in 0..count.value() {
            let len = reader
                .read_varint()
                .map_err(|e| TransactionError::SerializationError(format!("reading witness item length: {}", e)))?;
            let item = reader
                .read_bytes(len.value() as usize)
                .map_err(|e| TransactionError::SerializationError(format!("reading witness item: {}", e)))?;
            witness.push(item.to_vec());
        }
        self.witness = witness;
        Ok(())
    }
}
