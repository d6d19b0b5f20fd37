//! ECDSA with fixed width `r || s` signatures, `ES256`, `ES384` and `ES512`.

use std::collections::HashMap;

use aws_lc_rs::{rand::SystemRandom, signature::UnparsedPublicKey};
use tollgate_error::ErrorContext as _;

use super::{
    JWA,
    registry::{Entry, verification_failed},
};
use crate::jose::{JWKEllipticCurves, JoseError, SigningKey, VerifyingKey};

pub(super) fn register(table: &mut HashMap<JWA, Entry>) {
    table.insert(
        JWA::ES256,
        Entry {
            sign: |payload, key| sign(JWKEllipticCurves::P256, payload, key),
            verify: |payload, sig, key| verify(JWKEllipticCurves::P256, payload, sig, key),
        },
    );
    table.insert(
        JWA::ES384,
        Entry {
            sign: |payload, key| sign(JWKEllipticCurves::P384, payload, key),
            verify: |payload, sig, key| verify(JWKEllipticCurves::P384, payload, sig, key),
        },
    );
    table.insert(
        JWA::ES512,
        Entry {
            sign: |payload, key| sign(JWKEllipticCurves::P521, payload, key),
            verify: |payload, sig, key| verify(JWKEllipticCurves::P521, payload, sig, key),
        },
    );
}

fn sign(curve: JWKEllipticCurves, payload: &[u8], key: &SigningKey) -> Result<Vec<u8>, JoseError> {
    let SigningKey::Ecdsa(key) = key else {
        return Err(JoseError::invalid_key_type("ecdsa private key", key.kind()));
    };
    if key.curve() != curve {
        return Err(JoseError::invalid_key_type(
            curve.as_str(),
            key.curve().as_str(),
        ));
    }

    let rng = SystemRandom::new();
    let signature = key
        .key_pair()
        .sign(&rng, payload)
        .context("ecdsa sign")
        .map_err(JoseError::invalid_key_material)?;
    Ok(signature.as_ref().to_vec())
}

fn verify(
    curve: JWKEllipticCurves,
    payload: &[u8],
    signature: &[u8],
    key: &VerifyingKey,
) -> Result<(), JoseError> {
    let VerifyingKey::Ecdsa(key) = key else {
        return Err(JoseError::invalid_key_type("ecdsa public key", key.kind()));
    };
    if key.curve() != curve {
        return Err(JoseError::invalid_key_type(
            curve.as_str(),
            key.curve().as_str(),
        ));
    }

    UnparsedPublicKey::new(curve.verification_algorithm(), key.as_sec1())
        .verify(payload, signature)
        .map_err(|_err| verification_failed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jose::{EcPublicKey, EcdsaSigningKey, JoseErrorKind};
    use aws_lc_rs::signature::{ECDSA_P521_SHA512_FIXED_SIGNING, EcdsaKeyPair};

    #[test]
    fn p521_signature_is_fixed_width() {
        let key = EcdsaSigningKey::new(
            JWKEllipticCurves::P521,
            EcdsaKeyPair::generate(&ECDSA_P521_SHA512_FIXED_SIGNING).unwrap(),
        )
        .unwrap();
        let signature = sign(JWKEllipticCurves::P521, b"payload", &key.into()).unwrap();
        assert_eq!(132, signature.len());
    }

    #[test]
    fn point_off_curve_fails_verification() {
        let key = EcPublicKey::from_coordinates(JWKEllipticCurves::P256, &[1; 32], &[2; 32])
            .unwrap();
        let err = verify(JWKEllipticCurves::P256, b"payload", &[0; 64], &key.into()).unwrap_err();
        assert!(err.is(&JoseErrorKind::SignatureVerificationFailed));
    }
}
