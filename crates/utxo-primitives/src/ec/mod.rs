//! secp256k1 key and signature types.
//!
//! Wraps the `k256` crate with the conventions the transaction layer needs:
//! compressed public keys, DER-encoded low-S ECDSA signatures with RFC6979
//! deterministic nonces, and BIP-340 Schnorr signing with the taproot
//! output-key tweak.

pub mod private_key;
pub mod public_key;
pub mod signature;
pub mod taproot;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::Signature;
