//! Transaction planning and unsigned-transaction assembly.
//!
//! Planning validates the request, runs coin selection, and settles the
//! amount/fee/change split. The fee for SegWit-capable coins is measured by
//! dummy-signing the skeleton and charging its virtual size; other coins
//! (and any skeleton that cannot be estimated) use the linear fee formula.
//! Building turns a plan into an unsigned transaction with fully formed
//! outputs and empty input scripts.

use utxo_coin::FeeModel;
use utxo_script::{lock_script_for_address, Script};
use utxo_transaction::{Transaction, TransactionInput, TransactionOutput};

use crate::selector::InputSelector;
use crate::signer::{SignatureBuilder, SigningMode};
use crate::types::{SigningInput, TransactionPlan};
use crate::SigningError;

/// Above this many UTXOs, planning switches to the single-pass selection
/// strategy.
pub const SIMPLE_MODE_LIMIT: usize = 1000;

/// Hard cap on the number of UTXOs a plan will spend.
pub const MAX_UTXOS_HARD_LIMIT: usize = 3000;

/// Plans and builds transactions.
pub struct TransactionBuilder;

impl TransactionBuilder {
    /// Plan a transaction: validate the request, select UTXOs, and settle
    /// the amount/fee/change split.
    ///
    /// A request for more than the total available silently degrades to a
    /// send-everything-minus-fee plan, so callers can surface the best
    /// achievable amount. Hard failures are reported in `plan.error`.
    ///
    /// # Arguments
    /// * `input` - The send request.
    ///
    /// # Returns
    /// The plan; `error` is set on failure and the monetary fields are
    /// zeroed.
    pub fn plan(input: &SigningInput) -> TransactionPlan {
        let mut plan = TransactionPlan {
            op_return_payload: input.op_return_payload.clone(),
            op_return_index: input.op_return_index,
            ..TransactionPlan::default()
        };

        if input.amount == 0 && !input.use_max_amount {
            plan.error = Some(SigningError::ZeroAmountRequested);
            return plan;
        }
        if input.utxos.is_empty() {
            plan.error = Some(SigningError::MissingInputUtxos);
            return plan;
        }

        let fee_model = input.coin.fee_model(input.disable_dust_filter);
        let dust_threshold = input.dust_policy.threshold(&fee_model, input.byte_fee);
        if !input.use_max_amount && input.amount < dust_threshold {
            plan.error = Some(SigningError::DustAmountRequested);
            return plan;
        }

        let extra_amount: i64 = input.extra_outputs.iter().map(|(amount, _)| amount).sum();
        let target = input.amount + extra_amount;
        let input_sum = InputSelector::sum(&input.utxos);

        // An unsatisfiable amount degrades to max-amount planning: the best
        // achievable answer instead of a hard failure.
        let use_max = input.use_max_amount || target >= input_sum;

        let extra_output_count =
            input.extra_outputs.len() + usize::from(!input.op_return_payload.is_empty());
        let output_count = if use_max {
            1 + extra_output_count
        } else {
            2 + extra_output_count
        };

        let selector = InputSelector::new(&input.utxos, fee_model, input.dust_policy);
        let mut selected = if use_max {
            selector.select_max_amount(input.byte_fee)
        } else if input.utxos.len() <= SIMPLE_MODE_LIMIT {
            selector.select(target, input.byte_fee, output_count)
        } else {
            selector.select_simple(target, input.byte_fee, output_count)
        };

        // The window search predicts the fee with the linear formula, which
        // overshoots the measured virtual size for SegWit spends. Retry
        // against every spendable UTXO before giving up; the precise fee
        // check below settles whether the request actually fits.
        if selected.is_empty() && !use_max {
            selected = selector.select_max_amount(input.byte_fee);
        }
        selected.truncate(MAX_UTXOS_HARD_LIMIT);

        if selected.is_empty() {
            plan.error = Some(SigningError::NotEnoughUtxos);
            return plan;
        }

        plan.utxos = selected;
        plan.available_amount = InputSelector::sum(&plan.utxos);

        if !use_max && plan.available_amount < target {
            return Self::fail(plan, SigningError::NotEnoughUtxos);
        }

        // Preliminary split so the estimation skeleton has its final output
        // count; the fee is still zero here.
        if use_max {
            plan.amount = plan.available_amount - extra_amount;
            plan.change = 0;
            if plan.amount <= 0 {
                return Self::fail(plan, SigningError::NotEnoughUtxos);
            }
        } else {
            plan.amount = input.amount;
            plan.change = plan.available_amount - target;
        }

        plan.fee = Self::estimate_fee(input, &plan, output_count, &fee_model);
        plan.fee = plan.fee.min(plan.available_amount);

        if use_max {
            plan.amount = plan.available_amount - extra_amount - plan.fee;
            plan.change = 0;
            if plan.amount <= 0 {
                return Self::fail(plan, SigningError::NotEnoughUtxos);
            }
        } else {
            plan.change = plan.available_amount - target - plan.fee;
            if plan.change < 0 {
                return Self::fail(plan, SigningError::NotEnoughUtxos);
            }
            if plan.change > 0 && plan.change < dust_threshold {
                // Never emit a dust change output; waste it as fee instead.
                plan.fee += plan.change;
                plan.change = 0;
            }
        }

        plan
    }

    /// Build the unsigned transaction skeleton for a plan.
    ///
    /// Outputs are formed in fixed order: primary payment, extra outputs,
    /// change (when non-zero), and the OP_RETURN output inserted at its
    /// requested index or appended last. Inputs copy each selected UTXO's
    /// outpoint with empty script and witness.
    ///
    /// # Arguments
    /// * `plan` - The settled plan.
    /// * `input` - The originating request (addresses, version, lock time).
    ///
    /// # Returns
    /// The unsigned transaction, or a terminal error for an invalid
    /// address, oversized OP_RETURN payload, or out-of-range OP_RETURN
    /// index.
    pub fn build(plan: &TransactionPlan, input: &SigningInput) -> Result<Transaction, SigningError> {
        let params = input.coin.params();
        let mut tx = Transaction::new(input.version, input.lock_time);

        let to_script = lock_script_for_address(&input.to_address, &params)
            .map_err(|_| SigningError::InvalidAddress)?;
        tx.outputs.push(TransactionOutput::new(plan.amount, to_script));

        for (amount, address) in &input.extra_outputs {
            let script = lock_script_for_address(address, &params)
                .map_err(|_| SigningError::InvalidAddress)?;
            tx.outputs.push(TransactionOutput::new(*amount, script));
        }

        if plan.change > 0 {
            let change_script = lock_script_for_address(&input.change_address, &params)
                .map_err(|_| SigningError::InvalidAddress)?;
            tx.outputs
                .push(TransactionOutput::new(plan.change, change_script));
        }

        if !plan.op_return_payload.is_empty() {
            let script = Script::build_op_return(&plan.op_return_payload)
                .ok_or(SigningError::InvalidOutputScript)?;
            let output = TransactionOutput::new(0, script);
            match plan.op_return_index {
                Some(index) if index <= tx.outputs.len() => tx.outputs.insert(index, output),
                Some(_) => return Err(SigningError::InvalidParams),
                None => tx.outputs.push(output),
            }
        }

        for utxo in &plan.utxos {
            tx.inputs.push(TransactionInput::new(utxo.out_point));
        }

        Ok(tx)
    }

    /// Measure the plan's fee.
    ///
    /// SegWit-capable coins build the skeleton and dummy-sign it with
    /// placeholder signatures, charging `virtual_size · byte_fee`. Other
    /// coins, and any skeleton that fails to build or estimation-sign, use
    /// the linear formula.
    fn estimate_fee(
        input: &SigningInput,
        plan: &TransactionPlan,
        output_count: usize,
        fee_model: &FeeModel,
    ) -> i64 {
        let formula_fee = fee_model.calculate(plan.utxos.len(), output_count, input.byte_fee);
        if !input.coin.params().segwit {
            return formula_fee;
        }

        let Ok(skeleton) = Self::build(plan, input) else {
            return formula_fee;
        };
        let mut builder =
            SignatureBuilder::new(input, plan, skeleton, SigningMode::SizeEstimation);
        match builder.sign() {
            Ok(signed) => signed.virtual_size() as i64 * input.byte_fee,
            Err(_) => formula_fee,
        }
    }

    /// Reset a plan's monetary fields and mark it failed.
    fn fail(mut plan: TransactionPlan, error: SigningError) -> TransactionPlan {
        plan.utxos.clear();
        plan.amount = 0;
        plan.available_amount = 0;
        plan.fee = 0;
        plan.change = 0;
        plan.error = Some(error);
        plan
    }
}
