//! Address parsing and lock-script resolution.
//!
//! Addresses are parsed under a coin's parameters: base58check for legacy
//! P2PKH/P2SH (with the coin's version prefix and checksum algorithm),
//! bech32 for SegWit v0 programs, and bech32m for v1 (taproot) programs.

use bech32::{FromBase32, ToBase32, Variant};

use utxo_coin::{Base58Checksum, CoinParams};
use utxo_primitives::hash::{sha256, sha256d};

use crate::script::Script;
use crate::ScriptError;

/// A parsed address: the payload a locking script commits to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// A base58check address paying to a 20-byte key-hash.
    PublicKeyHash([u8; 20]),
    /// A base58check address paying to a 20-byte script-hash.
    ScriptHash([u8; 20]),
    /// A bech32/bech32m address: witness version and program.
    Witness { version: u8, program: Vec<u8> },
}

impl Address {
    /// Parse an address string under the given coin parameters.
    ///
    /// # Arguments
    /// * `string` - The address to parse.
    /// * `params` - Coin parameters (prefixes, HRP, checksum algorithm).
    ///
    /// # Returns
    /// The parsed `Address`, or `ScriptError::InvalidAddress`.
    pub fn parse(string: &str, params: &CoinParams) -> Result<Address, ScriptError> {
        if let Some(hrp) = params.hrp {
            if string.len() > hrp.len() + 1
                && string.as_bytes()[..hrp.len()].eq_ignore_ascii_case(hrp.as_bytes())
            {
                return Self::parse_witness(string, hrp);
            }
        }
        Self::parse_base58(string, params)
    }

    fn parse_witness(string: &str, expected_hrp: &str) -> Result<Address, ScriptError> {
        let (hrp, data, variant) = bech32::decode(string)
            .map_err(|e| ScriptError::InvalidAddress(format!("bech32: {}", e)))?;
        if hrp != expected_hrp {
            return Err(ScriptError::InvalidAddress(format!(
                "wrong address prefix: {}",
                hrp
            )));
        }
        if data.is_empty() {
            return Err(ScriptError::InvalidAddress(
                "missing witness version".to_string(),
            ));
        }
        let version = data[0].to_u8();
        let program = Vec::<u8>::from_base32(&data[1..])
            .map_err(|e| ScriptError::InvalidAddress(format!("bech32 payload: {}", e)))?;

        let valid = match (version, variant) {
            (0, Variant::Bech32) => program.len() == 20 || program.len() == 32,
            (1..=16, Variant::Bech32m) => (2..=40).contains(&program.len()),
            _ => false,
        };
        if !valid {
            return Err(ScriptError::InvalidAddress(format!(
                "invalid witness program: version {} length {}",
                version,
                program.len()
            )));
        }
        Ok(Address::Witness { version, program })
    }

    fn parse_base58(string: &str, params: &CoinParams) -> Result<Address, ScriptError> {
        let checksum_kind = params.base58_checksum.ok_or_else(|| {
            ScriptError::InvalidAddress("coin has no base58 address support".to_string())
        })?;
        let decoded = bs58::decode(string)
            .into_vec()
            .map_err(|e| ScriptError::InvalidAddress(format!("base58: {}", e)))?;
        if decoded.len() < 5 {
            return Err(ScriptError::InvalidAddress("address too short".to_string()));
        }

        let (payload, checksum) = decoded.split_at(decoded.len() - 4);
        let expected = base58_checksum(payload, checksum_kind);
        if checksum != expected {
            return Err(ScriptError::InvalidAddress("bad checksum".to_string()));
        }

        for (prefix, is_p2sh) in [(params.p2pkh_prefix, false), (params.p2sh_prefix, true)] {
            if payload.len() == prefix.len() + 20 && payload.starts_with(prefix) {
                let mut hash = [0u8; 20];
                hash.copy_from_slice(&payload[prefix.len()..]);
                return Ok(if is_p2sh {
                    Address::ScriptHash(hash)
                } else {
                    Address::PublicKeyHash(hash)
                });
            }
        }
        Err(ScriptError::InvalidAddress(
            "unknown address version prefix".to_string(),
        ))
    }

    /// Encode a base58check address for a prefix and 20-byte hash.
    ///
    /// # Arguments
    /// * `prefix` - The coin's version prefix bytes.
    /// * `hash` - The 20-byte key-hash or script-hash.
    /// * `checksum_kind` - The coin's checksum algorithm.
    pub fn base58_string(prefix: &[u8], hash: &[u8; 20], checksum_kind: Base58Checksum) -> String {
        let mut payload = Vec::with_capacity(prefix.len() + 24);
        payload.extend_from_slice(prefix);
        payload.extend_from_slice(hash);
        let checksum = base58_checksum(&payload, checksum_kind);
        payload.extend_from_slice(&checksum);
        bs58::encode(payload).into_string()
    }

    /// Encode a bech32/bech32m address for a witness version and program.
    pub fn witness_string(
        hrp: &str,
        version: u8,
        program: &[u8],
    ) -> Result<String, ScriptError> {
        let variant = if version == 0 {
            Variant::Bech32
        } else {
            Variant::Bech32m
        };
        let mut data = vec![bech32::u5::try_from_u8(version)
            .map_err(|e| ScriptError::InvalidAddress(e.to_string()))?];
        data.extend(program.to_base32());
        bech32::encode(hrp, data, variant)
            .map_err(|e| ScriptError::InvalidAddress(e.to_string()))
    }
}

fn base58_checksum(payload: &[u8], kind: Base58Checksum) -> [u8; 4] {
    let digest = match kind {
        Base58Checksum::DoubleSha256 => sha256d(payload),
        Base58Checksum::Sha256 => sha256(payload),
    };
    let mut checksum = [0u8; 4];
    checksum.copy_from_slice(&digest[..4]);
    checksum
}

/// Build the canonical locking script for an address under a coin's
/// parameters.
///
/// # Arguments
/// * `string` - The address to resolve.
/// * `params` - Coin parameters.
///
/// # Returns
/// The locking script, or `ScriptError::InvalidAddress` when the address
/// does not parse or its program shape has no script form.
pub fn lock_script_for_address(
    string: &str,
    params: &CoinParams,
) -> Result<Script, ScriptError> {
    match Address::parse(string, params)? {
        Address::PublicKeyHash(hash) => Ok(Script::build_pay_to_public_key_hash(&hash)),
        Address::ScriptHash(hash) => Ok(Script::build_pay_to_script_hash(&hash)),
        Address::Witness { version, program } => match (version, program.len()) {
            (0, 20) => {
                let mut hash = [0u8; 20];
                hash.copy_from_slice(&program);
                Ok(Script::build_pay_to_witness_public_key_hash(&hash))
            }
            (0, 32) => {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(&program);
                Ok(Script::build_pay_to_witness_script_hash(&hash))
            }
            (1, 32) => {
                let mut key = [0u8; 32];
                key.copy_from_slice(&program);
                Ok(Script::build_pay_to_taproot(&key))
            }
            (version, len) => Err(ScriptError::InvalidAddress(format!(
                "no script form for witness program: version {} length {}",
                version, len
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utxo_coin::Coin;

    #[test]
    fn test_p2pkh_address_to_script() {
        let params = Coin::Bitcoin.params();
        let script = lock_script_for_address("1Cu32FVupVCgHkMMRJdYJugxwo2Aprgk7H", &params)
            .unwrap();
        assert_eq!(
            script.to_hex(),
            "76a9148280b37df378db99f66f85c95a783a76ac7a6d5988ac"
        );

        let script = lock_script_for_address("16TZ8J6Q5iZKBWizWzFAYnrsaox5Z5aBRV", &params)
            .unwrap();
        assert_eq!(
            script.to_hex(),
            "76a9143bde42dbee7e4dbe6a21b2d50ce2f0167faa815988ac"
        );
    }

    #[test]
    fn test_p2wpkh_address_to_script() {
        let params = Coin::Bitcoin.params();
        let script =
            lock_script_for_address("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4", &params)
                .unwrap();
        assert_eq!(
            script.to_hex(),
            "0014751e76e8199196d454941c45d1b3a323f1433bd6"
        );

        let script =
            lock_script_for_address("bc1qm24wp577nk8aacckv8np465z3dvmu7ry45el6y", &params)
                .unwrap();
        assert_eq!(
            script.to_hex(),
            "0014daaae0d3de9d8fdee31661e61aea828b59be7864"
        );
    }

    #[test]
    fn test_p2wsh_address_to_script() {
        let params = Coin::Bitcoin.params();
        let script = lock_script_for_address(
            "bc1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3qccfmv2",
            &params,
        )
        .unwrap();
        assert_eq!(
            script.to_hex(),
            "00201863143c14c5166804bd19203356da136c985678cd4d27a1b8c6329604903262"
        );
    }

    #[test]
    fn test_p2tr_address_to_script() {
        let params = Coin::Bitcoin.params();
        let script = lock_script_for_address(
            "bc1p5cyxnuxmeuwuvkwfem96lqzszd02n6xdcjrs20cac6yqjjwudpxqkedrcr",
            &params,
        )
        .unwrap();
        assert_eq!(
            script.to_hex(),
            "5120a60869f0dbcf1dc659c9cecbaf8050135ea9e8cdc487053f1dc6880949dc684c"
        );
    }

    #[test]
    fn test_base58_roundtrip() {
        let hash: [u8; 20] = hex::decode("8280b37df378db99f66f85c95a783a76ac7a6d59")
            .unwrap()
            .try_into()
            .unwrap();
        let params = Coin::Bitcoin.params();
        let string =
            Address::base58_string(params.p2pkh_prefix, &hash, Base58Checksum::DoubleSha256);
        assert_eq!(string, "1Cu32FVupVCgHkMMRJdYJugxwo2Aprgk7H");
        assert_eq!(
            Address::parse(&string, &params).unwrap(),
            Address::PublicKeyHash(hash)
        );
    }

    #[test]
    fn test_p2sh_roundtrip() {
        let hash = [0x5a; 20];
        let params = Coin::Bitcoin.params();
        let string =
            Address::base58_string(params.p2sh_prefix, &hash, Base58Checksum::DoubleSha256);
        assert!(string.starts_with('3'));
        assert_eq!(
            Address::parse(&string, &params).unwrap(),
            Address::ScriptHash(hash)
        );
        let script = lock_script_for_address(&string, &params).unwrap();
        assert_eq!(script.match_pay_to_script_hash(), Some(hash));
    }

    #[test]
    fn test_groestlcoin_checksum_roundtrip() {
        let hash = [0x17; 20];
        let params = Coin::Groestlcoin.params();
        let string = Address::base58_string(params.p2pkh_prefix, &hash, Base58Checksum::Sha256);
        assert_eq!(
            Address::parse(&string, &params).unwrap(),
            Address::PublicKeyHash(hash)
        );
        // The same string fails under the double-SHA256 checksum rule.
        assert!(Address::parse(&string, &Coin::Bitcoin.params()).is_err());
    }

    #[test]
    fn test_witness_roundtrip() {
        let program = hex::decode("751e76e8199196d454941c45d1b3a323f1433bd6").unwrap();
        let string = Address::witness_string("bc", 0, &program).unwrap();
        assert_eq!(string, "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4");
    }

    #[test]
    fn test_invalid_addresses() {
        let params = Coin::Bitcoin.params();
        assert!(Address::parse("notanaddress!!!", &params).is_err());
        // Valid base58 but corrupted checksum.
        assert!(Address::parse("1Cu32FVupVCgHkMMRJdYJugxwo2Aprgk7J", &params).is_err());
        // Litecoin address under Bitcoin prefixes.
        assert!(lock_script_for_address("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4",
            &Coin::Litecoin.params()).is_err());
    }

    #[test]
    fn test_decred_addresses_unsupported() {
        let params = Coin::Decred.params();
        assert!(Address::parse("DsUZxxoHJSty8DCfwfartwTYbuhmVduzodg", &params).is_err());
    }
}
