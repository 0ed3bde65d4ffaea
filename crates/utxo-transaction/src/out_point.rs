//! Reference to a previous transaction output.

use utxo_primitives::util::{WireReader, WireWriter};

use crate::TransactionError;

/// Sequence number of a finalized input (no relative lock-time).
pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;

/// Identifies the output being spent by an input.
///
/// The `hash` is the source transaction id in internal (little-endian)
/// byte order, i.e. reversed with respect to the display hex. The
/// `sequence` travels with the outpoint so that callers can pin a
/// per-input sequence when describing a UTXO; it is serialized on the
/// input, not as part of the outpoint. `tree` is the chain-specific tree
/// byte used by Decred-style chains and is ignored on the standard wire
/// format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutPoint {
    /// Source transaction id, internal byte order.
    pub hash: [u8; 32],
    /// Index of the output within the source transaction.
    pub index: u32,
    /// Sequence to use for the input spending this outpoint.
    pub sequence: u32,
    /// Chain-specific tree byte (Decred), when applicable.
    pub tree: Option<i8>,
}

impl OutPoint {
    /// Create an outpoint with a finalized sequence and no tree byte.
    pub fn new(hash: [u8; 32], index: u32) -> Self {
        OutPoint {
            hash,
            index,
            sequence: SEQUENCE_FINAL,
            tree: None,
        }
    }

    /// Create an outpoint with an explicit sequence.
    pub fn with_sequence(hash: [u8; 32], index: u32, sequence: u32) -> Self {
        OutPoint {
            hash,
            index,
            sequence,
            tree: None,
        }
    }

    /// Serialize the outpoint (hash + index) into a writer.
    pub fn encode(&self, writer: &mut WireWriter) {
        writer.write_bytes(&self.hash);
        writer.write_u32_le(self.index);
    }

    /// Deserialize an outpoint (hash + index) from a reader.
    ///
    /// The sequence is not part of the outpoint wire encoding; the caller
    /// fills it from the enclosing input.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let hash_bytes = reader
            .read_bytes(32)
            .map_err(|e| TransactionError::SerializationError(format!("reading outpoint hash: {}", e)))?;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(hash_bytes);
        let index = reader
            .read_u32_le()
            .map_err(|e| TransactionError::SerializationError(format!("reading outpoint index: {}", e)))?;
        Ok(OutPoint::new(hash, index))
    }
}
