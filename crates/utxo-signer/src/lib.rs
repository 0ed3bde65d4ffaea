/// UTXO chain SDK - transaction planning and signing.
///
/// Turns a high-level send request into a broadcast-ready transaction:
/// coin selection and fee planning, unsigned-transaction assembly, per-input
/// signing, and the two-phase external-signer protocol that never needs the
/// private key in-process.

pub mod builder;
pub mod compiler;
pub mod selector;
pub mod signer;
pub mod types;

mod error;
pub use builder::TransactionBuilder;
pub use compiler::TransactionCompiler;
pub use error::SigningError;
pub use selector::InputSelector;
pub use signer::{PreImageHash, SignatureBuilder, SigningMode, SigningOutput, TransactionSigner};
pub use types::{SigningInput, TransactionPlan, Utxo};
