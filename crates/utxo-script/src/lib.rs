/// UTXO chain SDK - locking scripts and addresses.
///
/// Provides the `Script` type with pattern classification over the standard
/// locking-script templates, script builders, and address parsing
/// (base58check, bech32, bech32m) under per-coin parameters.

pub mod address;
pub mod opcodes;
pub mod script;

mod error;
pub use address::{lock_script_for_address, Address};
pub use error::ScriptError;
pub use script::{Script, ScriptKind};
