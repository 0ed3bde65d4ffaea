/// UTXO chain SDK - per-coin configuration.
///
/// Provides the coin registry (`Coin`, `CoinParams`), the fee model used by
/// coin selection and planning, and the dust policy. All per-coin constants
/// are resolved once into plain value structs and threaded explicitly
/// through the pipeline; there is no global state.

pub mod coin;
pub mod dust;
pub mod fee;

pub use coin::{Base58Checksum, Coin, CoinParams};
pub use dust::DustPolicy;
pub use fee::FeeModel;
