//! Dust policy: the smallest output amount worth creating.

use crate::fee::FeeModel;

/// How the dust threshold for change and requested amounts is derived.
///
/// The fee-derived policy reuses the fee model's single-input cost: an
/// output below what it would cost to spend is dust. The fixed policy pins
/// an absolute amount (e.g. the 546-satoshi relay floor or a caller's own
/// limit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DustPolicy {
    /// Threshold equals `FeeModel::single_input_fee(byte_fee)`.
    FeeDerived,
    /// Threshold is a fixed amount independent of the byte fee.
    Fixed(i64),
}

impl DustPolicy {
    /// Resolve the dust threshold in base units.
    ///
    /// # Arguments
    /// * `fee_model` - The coin's fee model.
    /// * `byte_fee` - Fee per estimated byte.
    pub fn threshold(&self, fee_model: &FeeModel, byte_fee: i64) -> i64 {
        match self {
            DustPolicy::FeeDerived => fee_model.single_input_fee(byte_fee),
            DustPolicy::Fixed(amount) => *amount,
        }
    }
}

impl Default for DustPolicy {
    fn default() -> Self {
        DustPolicy::FeeDerived
    }
}
