//! Coin selection.
//!
//! Chooses which UTXOs fund a transaction. The main strategy slides
//! fixed-size windows over the amount-sorted UTXO list, preferring the
//! fewest inputs whose sum lands closest to twice the target (so change is
//! neither dust nor needlessly large). A near-linear accumulating strategy
//! covers very large UTXO sets, and a max-amount strategy returns every
//! non-dust UTXO for spend-all transactions.

use utxo_coin::{DustPolicy, FeeModel};

use crate::types::Utxo;

/// Selects a subset of available UTXOs covering a target amount plus fee.
pub struct InputSelector<'a> {
    inputs: &'a [Utxo],
    fee_model: FeeModel,
    dust_policy: DustPolicy,
}

impl<'a> InputSelector<'a> {
    /// Create a selector over the given UTXOs.
    ///
    /// # Arguments
    /// * `inputs` - The available UTXOs, in caller order.
    /// * `fee_model` - The coin's fee model.
    /// * `dust_policy` - How the dust threshold is derived.
    pub fn new(inputs: &'a [Utxo], fee_model: FeeModel, dust_policy: DustPolicy) -> Self {
        InputSelector {
            inputs,
            fee_model,
            dust_policy,
        }
    }

    /// Sum the amounts of a UTXO slice.
    pub fn sum(utxos: &[Utxo]) -> i64 {
        utxos.iter().map(|utxo| utxo.amount).sum()
    }

    /// Drop UTXOs not worth spending: any single input below the cost of
    /// including it.
    fn filter_out_dust(&self, utxos: Vec<Utxo>, byte_fee: i64) -> Vec<Utxo> {
        let input_fee_limit = self.fee_model.single_input_fee(byte_fee);
        utxos
            .into_iter()
            .filter(|utxo| utxo.amount > input_fee_limit)
            .collect()
    }

    /// Select UTXOs for a target amount.
    ///
    /// For each input count `k` (ascending), considers every contiguous
    /// window of `k` amount-sorted UTXOs. A window must cover
    /// `target + fee(k, num_outputs) + dust` (first pass) or
    /// `target + fee` (second pass, tolerating dust change). Among the
    /// qualifying windows of the smallest satisfiable `k`, the one whose
    /// sum is closest to twice the target wins; ties go to the lower sum.
    ///
    /// # Arguments
    /// * `target` - The amount to cover, excluding fees.
    /// * `byte_fee` - Fee per estimated byte.
    /// * `num_outputs` - Expected output count, for the fee term.
    ///
    /// # Returns
    /// The selected UTXOs (dust inputs filtered out), or empty when the
    /// target is zero or no combination suffices.
    pub fn select(&self, target: i64, byte_fee: i64, num_outputs: usize) -> Vec<Utxo> {
        if target == 0 {
            return Vec::new();
        }
        if self.inputs.is_empty() || Self::sum(self.inputs) < target {
            return Vec::new();
        }

        let mut sorted = self.inputs.to_vec();
        sorted.sort_by_key(|utxo| utxo.amount);
        let n = sorted.len();

        // max_with_k[k]: the largest sum reachable with k inputs.
        let mut max_with_k = vec![0i64; n + 1];
        for k in 1..=n {
            max_with_k[k] = max_with_k[k - 1] + sorted[n - k].amount;
        }

        let double_target = target.saturating_mul(2);
        let dust_threshold = self.dust_policy.threshold(&self.fee_model, byte_fee);

        // 1. Fewest inputs that cover target + fee without producing dust
        //    change, sum closest to twice the target.
        for k in 1..=n {
            let fee = self.fee_model.calculate(k, num_outputs, byte_fee);
            let min_sum = target + fee + dust_threshold;
            if max_with_k[k] < min_sum {
                continue;
            }
            if let Some(window) = closest_to_double_target(&sorted, k, min_sum, double_target) {
                return self.filter_out_dust(window, byte_fee);
            }
        }

        // 2. Tolerate dust change: first (smallest-sum) window covering
        //    target + fee.
        for k in 1..=n {
            let fee = self.fee_model.calculate(k, num_outputs, byte_fee);
            let min_sum = target + fee;
            if max_with_k[k] < min_sum {
                continue;
            }
            if let Some(window) = first_covering_window(&sorted, k, min_sum) {
                return self.filter_out_dust(window, byte_fee);
            }
        }

        Vec::new()
    }

    /// Near-linear selection for very large UTXO sets.
    ///
    /// Accumulates non-dust UTXOs in caller order until the running sum
    /// reaches a padded target (10% headroom plus a worst-case fee),
    /// trading change-size optimality for a single pass.
    ///
    /// # Arguments
    /// * `target` - The amount to cover, excluding fees.
    /// * `byte_fee` - Fee per estimated byte.
    /// * `num_outputs` - Expected output count, for the fee term.
    pub fn select_simple(&self, target: i64, byte_fee: i64, num_outputs: usize) -> Vec<Utxo> {
        if target == 0 || self.inputs.is_empty() {
            return Vec::new();
        }

        let padded_target = (target as f64 * 1.1
            + self.fee_model.calculate(self.inputs.len(), num_outputs, byte_fee) as f64
            + 1000.0) as i64;
        let dust_threshold = self.fee_model.single_input_fee(byte_fee);

        let mut sum = 0i64;
        let mut selected = Vec::new();
        for utxo in self.inputs {
            if utxo.amount <= dust_threshold {
                continue;
            }
            selected.push(utxo.clone());
            sum += utxo.amount;
            if sum >= padded_target {
                return selected;
            }
        }

        Vec::new()
    }

    /// Every spendable (non-dust) UTXO, for spend-all transactions.
    pub fn select_max_amount(&self, byte_fee: i64) -> Vec<Utxo> {
        self.filter_out_dust(self.inputs.to_vec(), byte_fee)
    }
}

/// Among windows of size `k` whose sum is at least `min_sum`, the one whose
/// sum is closest to `double_target`; ties break to the lower sum.
fn closest_to_double_target(
    sorted: &[Utxo],
    k: usize,
    min_sum: i64,
    double_target: i64,
) -> Option<Vec<Utxo>> {
    let mut best: Option<(i64, usize)> = None;
    for start in 0..=(sorted.len() - k) {
        let sum = InputSelector::sum(&sorted[start..start + k]);
        if sum < min_sum {
            continue;
        }
        let distance = (sum - double_target).abs();
        // Windows ascend in sum, so a strict comparison keeps the earliest
        // (lowest-sum) window among equal distances.
        if best.map_or(true, |(best_distance, _)| distance < best_distance) {
            best = Some((distance, start));
        }
    }
    best.map(|(_, start)| sorted[start..start + k].to_vec())
}

/// The first (lowest-sum) window of size `k` covering `min_sum`.
fn first_covering_window(sorted: &[Utxo], k: usize, min_sum: i64) -> Option<Vec<Utxo>> {
    for start in 0..=(sorted.len() - k) {
        let sum = InputSelector::sum(&sorted[start..start + k]);
        if sum >= min_sum {
            return Some(sorted[start..start + k].to_vec());
        }
    }
    None
}
