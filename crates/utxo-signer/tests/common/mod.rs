//! Shared fixtures for the planning and signing test suites.
#![allow(dead_code)]

use utxo_coin::Coin;
use utxo_primitives::PrivateKey;
use utxo_script::Script;
use utxo_signer::{SigningError, SigningInput, TransactionPlan, Utxo};
use utxo_transaction::OutPoint;

/// Key-hash of [`test_private_key`], spendable by every test UTXO.
pub const TEST_KEY_HASH: &str = "1d0f172a0ecb48aee1be1f2687d2963ae33f71a1";

/// The private key owning the test UTXOs.
pub fn test_private_key() -> PrivateKey {
    PrivateKey::from_hex("619c335025c7f4012e556c2a58b2506e30b8511b53ade95ea316fd8c3286feb9")
        .unwrap()
}

/// Decode a display-order txid into internal byte order.
pub fn txid_to_hash(display_hex: &str) -> [u8; 32] {
    let mut bytes = hex::decode(display_hex).unwrap();
    bytes.reverse();
    bytes.try_into().unwrap()
}

/// A spendable P2WPKH UTXO locked to [`TEST_KEY_HASH`].
pub fn test_utxo(amount: i64) -> Utxo {
    let mut hash = [0u8; 32];
    hash[..20].copy_from_slice(&hex::decode(TEST_KEY_HASH).unwrap());
    Utxo::new(
        OutPoint::new(hash, 0),
        amount,
        Script::from_hex(&format!("0014{}", TEST_KEY_HASH)).unwrap(),
    )
}

/// Build one test UTXO per amount.
pub fn test_utxos(amounts: &[i64]) -> Vec<Utxo> {
    amounts.iter().map(|amount| test_utxo(*amount)).collect()
}

/// A send request over the test UTXOs with legacy to/change addresses and
/// the test private key.
pub fn test_signing_input(
    amount: i64,
    byte_fee: i64,
    utxos: Vec<Utxo>,
    use_max_amount: bool,
    coin: Coin,
) -> SigningInput {
    let mut input = SigningInput::new(coin);
    input.amount = amount;
    input.byte_fee = byte_fee;
    input.utxos = utxos;
    input.use_max_amount = use_max_amount;
    input.to_address = "1Bp9U1ogV3A14FMvKbRJms7ctyso4Z4Tcx".to_string();
    input.change_address = "1FQc5LdgGHMHEN9nwkjmz6tWkxhPpxBvBU".to_string();
    input.private_keys.push(test_private_key());
    input
}

/// Assert a plan's selection, amount, fee, derived change, and error.
pub fn verify_plan(
    plan: &TransactionPlan,
    utxo_amounts: &[i64],
    amount: i64,
    fee: i64,
    error: Option<SigningError>,
) {
    let selected: Vec<i64> = plan.utxos.iter().map(|utxo| utxo.amount).collect();
    assert_eq!(selected, utxo_amounts, "selected UTXO amounts");
    assert_eq!(plan.amount, amount, "plan amount");
    assert_eq!(plan.fee, fee, "plan fee");

    let expected_available: i64 = utxo_amounts.iter().sum();
    assert_eq!(plan.available_amount, expected_available, "available amount");
    assert_eq!(
        plan.change,
        expected_available - amount - fee,
        "plan change"
    );
    assert_eq!(plan.error, error, "plan error");
}

/// Assert the amounts of a selection.
pub fn verify_selected(selected: &[Utxo], expected: &[i64]) {
    let amounts: Vec<i64> = selected.iter().map(|utxo| utxo.amount).collect();
    assert_eq!(amounts, expected);
}
