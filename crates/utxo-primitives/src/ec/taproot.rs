//! Taproot key tweaking and BIP-340 Schnorr operations.
//!
//! A P2TR output commits to the x-only *output key* Q = P + t·G, where P is
//! the internal key with even y and t is the "TapTweak" tagged hash of P's
//! x coordinate (key-path spends with no script tree). Spending requires a
//! Schnorr signature under Q, so the private key is tweaked by the same t
//! before signing.

use k256::elliptic_curve::point::AffineCoordinates;
use k256::elliptic_curve::PrimeField;
use k256::schnorr;
use k256::{ProjectivePoint, PublicKey as CurvePoint, Scalar};

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::hash::tagged_hash;
use crate::PrimitivesError;

/// Extract the 32-byte x-only encoding of a public key.
pub fn x_only(public_key: &PublicKey) -> [u8; 32] {
    let compressed = public_key.to_compressed();
    let mut out = [0u8; 32];
    out.copy_from_slice(&compressed[1..]);
    out
}

/// Lift an x coordinate to the curve point with even y.
fn lift_x(x: &[u8; 32]) -> Result<CurvePoint, PrimitivesError> {
    let mut sec1 = [0u8; 33];
    sec1[0] = 0x02;
    sec1[1..].copy_from_slice(x);
    CurvePoint::from_sec1_bytes(&sec1)
        .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))
}

/// Compute the "TapTweak" scalar for an internal key's x coordinate.
fn tweak_scalar(internal_x: &[u8; 32]) -> Result<Scalar, PrimitivesError> {
    let digest = tagged_hash("TapTweak", internal_x);
    Option::<Scalar>::from(Scalar::from_repr(digest.into())).ok_or_else(|| {
        PrimitivesError::InvalidPrivateKey("taproot tweak overflows the curve order".to_string())
    })
}

/// Compute the x-only taproot output key for an x-only internal key.
///
/// # Arguments
/// * `internal_x` - The 32-byte x coordinate of the internal key.
///
/// # Returns
/// The 32-byte x coordinate of Q = P + t·G, or an error if the internal
/// key is not a valid curve point or the tweak degenerates.
pub fn output_key(internal_x: &[u8; 32]) -> Result<[u8; 32], PrimitivesError> {
    let p = lift_x(internal_x)?;
    let t = tweak_scalar(internal_x)?;
    let q = ProjectivePoint::from(*p.as_affine()) + ProjectivePoint::GENERATOR * t;
    if q == ProjectivePoint::IDENTITY {
        return Err(PrimitivesError::InvalidPublicKey(
            "taproot tweak produced the point at infinity".to_string(),
        ));
    }
    let affine = q.to_affine();
    let mut out = [0u8; 32];
    out.copy_from_slice(&affine.x());
    Ok(out)
}

/// Derive the tweaked Schnorr signing key for a private key.
///
/// The scalar is negated first if the untweaked public key has odd y, so
/// that the tweak is applied to the even-y internal key, matching
/// [`output_key`] of the same key.
///
/// # Arguments
/// * `private_key` - The untweaked (internal) private key.
///
/// # Returns
/// A BIP-340 signing key whose verifying key is the taproot output key.
pub fn tweaked_signing_key(
    private_key: &PrivateKey,
) -> Result<schnorr::SigningKey, PrimitivesError> {
    let compressed = private_key.public_key().to_compressed();
    let mut internal_x = [0u8; 32];
    internal_x.copy_from_slice(&compressed[1..]);

    let mut d = Option::<Scalar>::from(Scalar::from_repr(private_key.to_bytes().into()))
        .ok_or_else(|| {
            PrimitivesError::InvalidPrivateKey("scalar out of range".to_string())
        })?;
    if compressed[0] == 0x03 {
        d = -d;
    }

    let tweaked = d + tweak_scalar(&internal_x)?;
    schnorr::SigningKey::from_bytes(&tweaked.to_bytes())
        .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))
}

/// Sign a 32-byte digest with BIP-340 Schnorr.
///
/// Auxiliary randomness is fixed to zero, so signatures are deterministic.
///
/// # Arguments
/// * `signing_key` - The (already tweaked) Schnorr signing key.
/// * `digest` - The 32-byte message digest.
///
/// # Returns
/// The 64-byte Schnorr signature.
pub fn schnorr_sign(
    signing_key: &schnorr::SigningKey,
    digest: &[u8; 32],
) -> Result<[u8; 64], PrimitivesError> {
    let sig = signing_key
        .sign_raw(digest, &[0u8; 32])
        .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
    let mut out = [0u8; 64];
    out.copy_from_slice(&sig.to_bytes());
    Ok(out)
}

/// Verify a BIP-340 Schnorr signature against an x-only public key.
///
/// # Arguments
/// * `x_only_key` - The 32-byte x-only public key (taproot output key).
/// * `digest` - The 32-byte message digest.
/// * `signature` - The 64-byte signature.
///
/// # Returns
/// `true` if the signature is valid.
pub fn schnorr_verify(x_only_key: &[u8; 32], digest: &[u8; 32], signature: &[u8]) -> bool {
    let Ok(verifying_key) = schnorr::VerifyingKey::from_bytes(x_only_key) else {
        return false;
    };
    let Ok(sig) = schnorr::Signature::try_from(signature) else {
        return false;
    };
    verifying_key.verify_raw(digest, &sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    #[test]
    fn test_tweaked_key_matches_output_key() {
        let private_key = PrivateKey::from_hex(
            "619c335025c7f4012e556c2a58b2506e30b8511b53ade95ea316fd8c3286feb9",
        )
        .unwrap();
        let internal_x = x_only(&private_key.public_key());

        let expected = output_key(&internal_x).unwrap();
        let signing_key = tweaked_signing_key(&private_key).unwrap();
        assert_eq!(signing_key.verifying_key().to_bytes().as_slice(), &expected);
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let private_key = PrivateKey::from_hex(
            "bbc27228ddcb9209d7fd6f36b02f7dfa6252af40bb2f1cbc7a557da8027ff866",
        )
        .unwrap();
        let signing_key = tweaked_signing_key(&private_key).unwrap();
        let out_key = output_key(&x_only(&private_key.public_key())).unwrap();

        let digest = sha256(b"taproot digest");
        let sig = schnorr_sign(&signing_key, &digest).unwrap();
        assert!(schnorr_verify(&out_key, &digest, &sig));

        let other = sha256(b"other digest");
        assert!(!schnorr_verify(&out_key, &other, &sig));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let private_key = PrivateKey::from_hex(
            "619c335025c7f4012e556c2a58b2506e30b8511b53ade95ea316fd8c3286feb9",
        )
        .unwrap();
        let signing_key = tweaked_signing_key(&private_key).unwrap();
        let digest = sha256(b"same digest");
        assert_eq!(
            schnorr_sign(&signing_key, &digest).unwrap(),
            schnorr_sign(&signing_key, &digest).unwrap()
        );
    }

    #[test]
    fn test_bip86_output_key() {
        // First receive key of the BIP-86 derivation test vectors.
        let internal_x: [u8; 32] = hex::decode(
            "cc8a4bc64d897bddc5fbc2f670f7a8ba0b386779106cf1223c6fc5d7cd6fc115",
        )
        .unwrap()
        .try_into()
        .unwrap();
        let expected = "a60869f0dbcf1dc659c9cecbaf8050135ea9e8cdc487053f1dc6880949dc684c";
        assert_eq!(hex::encode(output_key(&internal_x).unwrap()), expected);
    }
}
