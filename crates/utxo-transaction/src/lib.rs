/// UTXO chain SDK - transaction structure and signature hashing.
///
/// Provides the transaction types (outpoint, input, output, transaction),
/// wire-format serialization with and without the witness envelope, and the
/// signature-hash constructions for legacy, SegWit v0, and taproot inputs.

pub mod input;
pub mod out_point;
pub mod output;
pub mod sighash;
pub mod transaction;

mod error;
pub use error::TransactionError;
pub use input::TransactionInput;
pub use out_point::OutPoint;
pub use output::TransactionOutput;
pub use transaction::{Transaction, WitnessFormat};
