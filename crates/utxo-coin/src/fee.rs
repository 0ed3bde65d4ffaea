//! Fee models for coin selection and transaction planning.

/// A per-coin transaction fee formula.
///
/// The linear variant charges per estimated byte with fractional per-input
/// weights for SegWit coins (witness bytes are discounted on the wire, so
/// an input costs less than its full serialized size). The constant variant
/// covers coins with a flat network fee regardless of transaction size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeeModel {
    /// `fee = ceil(per_input·n_in + per_output·n_out + base) · byte_fee`.
    Linear {
        /// Estimated bytes contributed per input.
        bytes_per_input: f64,
        /// Estimated bytes contributed per output.
        bytes_per_output: f64,
        /// Fixed overhead bytes (version, counts, lock time).
        bytes_base: f64,
        /// When set, `single_input_fee` reports 0 and dust filtering is off.
        dust_disabled: bool,
    },
    /// A flat fee independent of transaction size.
    Constant {
        /// The fixed fee amount.
        fee: i64,
    },
}

impl FeeModel {
    /// Create a linear model with dust filtering enabled.
    pub fn linear(bytes_per_input: f64, bytes_per_output: f64, bytes_base: f64) -> Self {
        FeeModel::Linear {
            bytes_per_input,
            bytes_per_output,
            bytes_base,
            dust_disabled: false,
        }
    }

    /// Estimate the fee for a transaction shape.
    ///
    /// # Arguments
    /// * `inputs` - Number of transaction inputs.
    /// * `outputs` - Number of transaction outputs.
    /// * `byte_fee` - Fee per estimated byte.
    ///
    /// # Returns
    /// The estimated fee in base units.
    pub fn calculate(&self, inputs: usize, outputs: usize, byte_fee: i64) -> i64 {
        match self {
            FeeModel::Linear {
                bytes_per_input,
                bytes_per_output,
                bytes_base,
                ..
            } => {
                let size = (bytes_per_input * inputs as f64
                    + bytes_per_output * outputs as f64
                    + bytes_base)
                    .ceil() as i64;
                size * byte_fee
            }
            FeeModel::Constant { fee } => *fee,
        }
    }

    /// The fee cost of spending one additional input.
    ///
    /// Doubles as the dust threshold for a spendable input: a UTXO worth
    /// less than this costs more to spend than it contributes. Returns 0
    /// when dust filtering is disabled or the fee is constant.
    ///
    /// # Arguments
    /// * `byte_fee` - Fee per estimated byte.
    pub fn single_input_fee(&self, byte_fee: i64) -> i64 {
        match self {
            FeeModel::Linear {
                bytes_per_input,
                dust_disabled,
                ..
            } => {
                if *dust_disabled {
                    0
                } else {
                    bytes_per_input.ceil() as i64 * byte_fee
                }
            }
            FeeModel::Constant { .. } => 0,
        }
    }
}
