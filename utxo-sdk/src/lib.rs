#![deny(missing_docs)]

//! UTXO chain SDK - complete SDK.
//!
//! Re-exports all components for convenient single-crate usage.

pub use utxo_coin as coin;
pub use utxo_primitives as primitives;
pub use utxo_script as script;
pub use utxo_signer as signer;
pub use utxo_transaction as transaction;
