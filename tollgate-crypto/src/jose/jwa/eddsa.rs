//! `EdDSA`, limited to Ed25519.

use std::collections::HashMap;

use aws_lc_rs::signature::{ED25519, UnparsedPublicKey};

use super::{
    JWA,
    registry::{Entry, verification_failed},
};
use crate::jose::{JoseError, SigningKey, VerifyingKey};

pub(super) fn register(table: &mut HashMap<JWA, Entry>) {
    table.insert(JWA::EdDSA, Entry { sign, verify });
}

fn sign(payload: &[u8], key: &SigningKey) -> Result<Vec<u8>, JoseError> {
    let SigningKey::Ed25519(key_pair) = key else {
        return Err(JoseError::invalid_key_type("ed25519 private key", key.kind()));
    };
    Ok(key_pair.sign(payload).as_ref().to_vec())
}

fn verify(payload: &[u8], signature: &[u8], key: &VerifyingKey) -> Result<(), JoseError> {
    let VerifyingKey::Ed25519(public_key) = key else {
        return Err(JoseError::invalid_key_type("ed25519 public key", key.kind()));
    };
    UnparsedPublicKey::new(&ED25519, public_key.as_bytes())
        .verify(payload, signature)
        .map_err(|_err| verification_failed())
}
