//! HMAC with SHA-2, `HS256`, `HS384` and `HS512`.

use std::collections::HashMap;

use aws_lc_rs::hmac;
use subtle::ConstantTimeEq as _;

use super::{
    JWA,
    registry::{Entry, verification_failed},
};
use crate::jose::{JoseError, JoseErrorKind, SigningKey, VerifyingKey};

const EXPECTED: &str = "octets";

pub(super) fn register(table: &mut HashMap<JWA, Entry>) {
    table.insert(
        JWA::HS256,
        Entry {
            sign: |payload, key| sign(hmac::HMAC_SHA256, payload, key),
            verify: |payload, signature, key| verify(hmac::HMAC_SHA256, payload, signature, key),
        },
    );
    table.insert(
        JWA::HS384,
        Entry {
            sign: |payload, key| sign(hmac::HMAC_SHA384, payload, key),
            verify: |payload, signature, key| verify(hmac::HMAC_SHA384, payload, signature, key),
        },
    );
    table.insert(
        JWA::HS512,
        Entry {
            sign: |payload, key| sign(hmac::HMAC_SHA512, payload, key),
            verify: |payload, signature, key| verify(hmac::HMAC_SHA512, payload, signature, key),
        },
    );
}

fn tag(algorithm: hmac::Algorithm, secret: &[u8], payload: &[u8]) -> Result<hmac::Tag, JoseError> {
    if secret.is_empty() {
        return Err(JoseError::from_display(
            JoseErrorKind::MissingKey,
            "hmac secret is empty",
        ));
    }
    let key = hmac::Key::new(algorithm, secret);
    Ok(hmac::sign(&key, payload))
}

fn sign(algorithm: hmac::Algorithm, payload: &[u8], key: &SigningKey) -> Result<Vec<u8>, JoseError> {
    let SigningKey::Octets(secret) = key else {
        return Err(JoseError::invalid_key_type(EXPECTED, key.kind()));
    };
    Ok(tag(algorithm, secret, payload)?.as_ref().to_vec())
}

fn verify(
    algorithm: hmac::Algorithm,
    payload: &[u8],
    signature: &[u8],
    key: &VerifyingKey,
) -> Result<(), JoseError> {
    let VerifyingKey::Octets(secret) = key else {
        return Err(JoseError::invalid_key_type(EXPECTED, key.kind()));
    };
    let expected = tag(algorithm, secret, payload)?;
    if bool::from(expected.as_ref().ct_eq(signature)) {
        Ok(())
    } else {
        Err(verification_failed())
    }
}
