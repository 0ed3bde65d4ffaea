mod common;

use common::{test_utxos, verify_selected};
use utxo_coin::{Coin, DustPolicy, FeeModel};
use utxo_signer::InputSelector;

fn bitcoin_model() -> FeeModel {
    Coin::Bitcoin.fee_model(false)
}

fn select(amounts: &[i64], target: i64, byte_fee: i64) -> Vec<i64> {
    let utxos = test_utxos(amounts);
    let selector = InputSelector::new(&utxos, bitcoin_model(), DustPolicy::FeeDerived);
    selector
        .select(target, byte_fee, 2)
        .iter()
        .map(|utxo| utxo.amount)
        .collect()
}

#[test]
fn test_select_one_from_many() {
    assert_eq!(select(&[4000, 2000, 6000, 1000, 11000, 12000], 5000, 1), vec![11000]);
    assert_eq!(select(&[4000, 2000, 6000, 1000, 50000, 120000], 10000, 1), vec![50000]);
}

#[test]
fn test_select_two_adjacent() {
    assert_eq!(select(&[4000, 2000, 5000], 6000, 1), vec![4000, 5000]);
    assert_eq!(select(&[40000, 30000, 30000], 50000, 1), vec![30000, 40000]);
}

#[test]
fn test_select_four_of_nine() {
    assert_eq!(
        select(&[1000, 2000, 3000, 4000, 5000, 6000, 7000, 8000, 9000], 28000, 1),
        vec![6000, 7000, 8000, 9000]
    );
}

#[test]
fn test_select_insufficient() {
    assert_eq!(select(&[4000, 4000, 4000], 15000, 1), Vec::<i64>::new());
}

#[test]
fn test_select_custom_case() {
    assert_eq!(select(&[794121, 2289357], 2287189, 61), vec![794121, 2289357]);
}

#[test]
fn test_select_no_utxos_and_zero_target() {
    assert_eq!(select(&[], 100000, 1), Vec::<i64>::new());
    assert_eq!(select(&[100000], 0, 1), Vec::<i64>::new());
}

#[test]
fn test_select_one_typical() {
    assert_eq!(select(&[100000], 50000, 1), vec![100000]);
}

#[test]
fn test_select_one_insufficient() {
    assert_eq!(select(&[100000], 200000, 1), Vec::<i64>::new());
    assert_eq!(select(&[100000], 100000, 1), Vec::<i64>::new());
    assert_eq!(select(&[100000], 99900, 1), Vec::<i64>::new());
}

#[test]
fn test_select_one_fits_exactly() {
    let expected_fee = 174; // 1-in-2-out at byte fee 1
    assert_eq!(select(&[100000], 100000 - expected_fee, 1), vec![100000]);
    // One more unit and it no longer fits.
    assert_eq!(select(&[100000], 100000 - expected_fee + 1, 1), Vec::<i64>::new());
}

#[test]
fn test_select_one_fits_exactly_high_fee() {
    let expected_fee = 1740; // 1-in-2-out at byte fee 10
    assert_eq!(select(&[100000], 100000 - expected_fee, 10), vec![100000]);
    assert_eq!(select(&[100000], 100000 - expected_fee + 1, 10), Vec::<i64>::new());
}

#[test]
fn test_select_three_no_dust() {
    // 100'000 would fit with dust change; two UTXOs are selected instead.
    assert_eq!(
        select(&[100000, 70000, 75000], 100000 - 174 - 10, 1),
        vec![75000, 100000]
    );

    // With room for a non-dust change, one UTXO suffices.
    let dust_limit = 102;
    assert_eq!(select(&[100000, 70000, 75000], 100000 - 174 - dust_limit, 1), vec![100000]);

    // One more and the dust margin is gone again.
    assert_eq!(
        select(&[100000, 70000, 75000], 100000 - 174 - dust_limit + 1, 1),
        vec![75000, 100000]
    );
}

#[test]
fn test_select_two_first_enough() {
    assert_eq!(select(&[20000, 80000], 15000, 1), vec![20000]);
    assert_eq!(select(&[20000, 80000], 70000, 1), vec![80000]);
    assert_eq!(select(&[20000, 80000], 90000, 1), vec![20000, 80000]);
    assert_eq!(select(&[20000, 22000], 18000, 1), vec![22000]);
}

#[test]
fn test_select_ten_three() {
    assert_eq!(
        select(
            &[1000, 2000, 100000, 3000, 4000, 5000, 125000, 6000, 150000, 7000],
            300000,
            1
        ),
        vec![100000, 125000, 150000]
    );
}

#[test]
fn test_select_simple_accumulates_in_order() {
    let utxos = test_utxos(&[1000, 2000, 3000, 4000, 5000, 6000, 7000, 8000, 9000]);
    let selector = InputSelector::new(&utxos, bitcoin_model(), DustPolicy::FeeDerived);
    verify_selected(
        &selector.select_simple(28000, 1, 2),
        &[1000, 2000, 3000, 4000, 5000, 6000, 7000, 8000],
    );

    let utxos = test_utxos(&[150000, 125000, 100000, 7000, 6000, 5000, 4000, 3000, 2000, 1000]);
    let selector = InputSelector::new(&utxos, bitcoin_model(), DustPolicy::FeeDerived);
    verify_selected(&selector.select_simple(300000, 1, 2), &[150000, 125000, 100000]);
}

#[test]
fn test_select_max_amount() {
    let utxos = test_utxos(&[400, 500, 600, 800, 1000]);

    let selector = InputSelector::new(&utxos, bitcoin_model(), DustPolicy::FeeDerived);
    verify_selected(&selector.select_max_amount(1), &[400, 500, 600, 800, 1000]);
    verify_selected(&selector.select_max_amount(4), &[500, 600, 800, 1000]);
    verify_selected(&selector.select_max_amount(8), &[1000]);
    verify_selected(&selector.select_max_amount(10), &[]);
}

#[test]
fn test_select_max_amount_no_utxos() {
    let utxos = test_utxos(&[]);
    let selector = InputSelector::new(&utxos, bitcoin_model(), DustPolicy::FeeDerived);
    assert!(selector.select_max_amount(1).is_empty());
}

#[test]
fn test_select_constant_fee_coin() {
    let utxos = test_utxos(&[100000, 2592, 73774]);
    let selector = InputSelector::new(&utxos, Coin::Zcash.fee_model(false), DustPolicy::FeeDerived);

    verify_selected(&selector.select(10000, 1, 2), &[73774]);
    // The constant fee model filters nothing as dust.
    verify_selected(&selector.select_max_amount(1), &[100000, 2592, 73774]);
    // Total covers the target but not target plus the constant fee.
    assert!(selector.select(176366 - 6, 1, 2).is_empty());
}

#[test]
fn test_select_many_utxos_900() {
    let byte_fee = 10;
    let values: Vec<i64> = (1..=900).map(|i| i * 100).collect();
    let value_sum: i64 = values.iter().sum();
    let target = value_sum / 8;
    assert_eq!(target, 5_068_125);

    let utxos = test_utxos(&values);
    let selector = InputSelector::new(&utxos, bitcoin_model(), DustPolicy::FeeDerived);
    let selected = selector.select(target, byte_fee, 2);

    // 59 largest UTXOs.
    let expected: Vec<i64> = ((900 - 59 + 1)..=900).map(|i| i * 100).collect();
    assert_eq!(expected.len(), 59);
    assert_eq!(expected.iter().sum::<i64>(), 5_138_900);
    verify_selected(&selected, &expected);
}

#[test]
fn test_select_simple_many_utxos_5000() {
    let byte_fee = 10;
    let values: Vec<i64> = (1..=5000).map(|i| i * 100).collect();
    let value_sum: i64 = values.iter().sum();
    let target = value_sum / 20;
    assert_eq!(target, 62_512_500);

    let utxos = test_utxos(&values);
    let selector = InputSelector::new(&utxos, bitcoin_model(), DustPolicy::FeeDerived);
    let selected = selector.select_simple(target, byte_fee, 2);

    // The smaller UTXOs in order, skipping the dust-level ones.
    let expected: Vec<i64> = (11..=1215).map(|i| i * 100).collect();
    assert_eq!(expected.len(), 1205);
    assert_eq!(expected.iter().sum::<i64>(), 73_866_500);
    verify_selected(&selected, &expected);
}

#[test]
fn test_select_max_amount_many_utxos_5000() {
    let byte_fee = 10;
    let values: Vec<i64> = (1..=5000).map(|i| i * 100).collect();
    let utxos = test_utxos(&values);
    let selector = InputSelector::new(&utxos, bitcoin_model(), DustPolicy::FeeDerived);
    let selected = selector.select_max_amount(byte_fee);

    // Everything above the single-input fee of 1020.
    let expected: Vec<i64> = (11..=5000).map(|i| i * 100).collect();
    assert_eq!(expected.len(), 4990);
    verify_selected(&selected, &expected);
}
