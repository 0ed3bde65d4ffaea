/// UTXO chain SDK - hashing, wire encoding, and key primitives.
///
/// Provides the hash functions, binary reader/writer utilities, and
/// secp256k1 key/signature types shared by the script, transaction, and
/// signing layers.

pub mod ec;
pub mod hash;
pub mod util;

mod error;
pub use ec::{PrivateKey, PublicKey, Signature};
pub use error::PrimitivesError;
