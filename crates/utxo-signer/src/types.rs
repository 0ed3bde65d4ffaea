//! Request and plan types for the signing pipeline.

use std::collections::HashMap;

use utxo_coin::{Coin, DustPolicy};
use utxo_primitives::PrivateKey;
use utxo_script::Script;
use utxo_transaction::OutPoint;

use crate::SigningError;

/// An unspent transaction output available to spend.
#[derive(Debug, Clone, PartialEq)]
pub struct Utxo {
    /// The previous output being spent (with its per-input sequence).
    pub out_point: OutPoint,
    /// Value of the output, in base units.
    pub amount: i64,
    /// The locking script of the output.
    pub script: Script,
}

impl Utxo {
    /// Create a UTXO from its outpoint, amount, and locking script.
    pub fn new(out_point: OutPoint, amount: i64, script: Script) -> Self {
        Utxo {
            out_point,
            amount,
            script,
        }
    }
}

/// A caller-constructed send request, consumed once per transaction.
#[derive(Debug, Clone)]
pub struct SigningInput {
    /// The coin the transaction targets.
    pub coin: Coin,
    /// Sighash flags for every input signature.
    pub hash_type: u32,
    /// The amount to send to `to_address`.
    pub amount: i64,
    /// Fee per estimated byte.
    pub byte_fee: i64,
    /// The recipient address.
    pub to_address: String,
    /// The change address.
    pub change_address: String,
    /// Spend every spendable UTXO; the amount becomes everything minus fee.
    pub use_max_amount: bool,
    /// Transaction version.
    pub version: u32,
    /// Transaction lock time.
    pub lock_time: u32,
    /// Private keys available for signing. Matched to inputs by key-hash.
    pub private_keys: Vec<PrivateKey>,
    /// Redeem/witness scripts, keyed by the hex of the hash their locking
    /// script commits to.
    pub redeem_scripts: HashMap<String, Script>,
    /// The available UTXOs.
    pub utxos: Vec<Utxo>,
    /// Additional recipient outputs `(amount, address)` beyond the primary
    /// payment. Never reduced to fit.
    pub extra_outputs: Vec<(i64, String)>,
    /// OP_RETURN payload, when a data output is requested.
    pub op_return_payload: Vec<u8>,
    /// Explicit position of the OP_RETURN output; appended last when unset.
    pub op_return_index: Option<usize>,
    /// How the dust threshold is derived.
    pub dust_policy: DustPolicy,
    /// Disable dust filtering of inputs entirely.
    pub disable_dust_filter: bool,
    /// A precomputed plan; planning is skipped when present.
    pub plan: Option<TransactionPlan>,
}

impl SigningInput {
    /// Create an empty request for a coin, with the coin's default sighash
    /// type, version 1, and no outputs or keys.
    pub fn new(coin: Coin) -> Self {
        SigningInput {
            coin,
            hash_type: coin.params().default_hash_type,
            amount: 0,
            byte_fee: 1,
            to_address: String::new(),
            change_address: String::new(),
            use_max_amount: false,
            version: 1,
            lock_time: 0,
            private_keys: Vec::new(),
            redeem_scripts: HashMap::new(),
            utxos: Vec::new(),
            extra_outputs: Vec::new(),
            op_return_payload: Vec::new(),
            op_return_index: None,
            dust_policy: DustPolicy::FeeDerived,
            disable_dust_filter: false,
            plan: None,
        }
    }
}

/// The result of planning: selected UTXOs, fee, and change.
///
/// When `error` is unset the plan upholds
/// `available_amount == amount + Σextra + fee + change` and change is either
/// zero or at least the dust threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPlan {
    /// The selected UTXOs, in selection order.
    pub utxos: Vec<Utxo>,
    /// Amount paid to the primary recipient.
    pub amount: i64,
    /// Total value of the selected UTXOs.
    pub available_amount: i64,
    /// Fee paid to the network, including any folded dust change.
    pub fee: i64,
    /// Change returned to the sender; zero or at least the dust threshold.
    pub change: i64,
    /// OP_RETURN payload carried into the transaction.
    pub op_return_payload: Vec<u8>,
    /// Explicit position of the OP_RETURN output.
    pub op_return_index: Option<usize>,
    /// The terminal condition when planning failed.
    pub error: Option<SigningError>,
}
