//! RSASSA-PKCS1-v1_5 (`RS*`) and RSASSA-PSS (`PS*`).
//!
//! PSS signatures are made with a salt as long as the digest.
//! Verification recovers the salt length from the encoded message,
//! so signatures with any salt length are accepted.

use std::collections::HashMap;

use aws_lc_rs::{
    digest::{self, SHA256, SHA384, SHA512},
    rand::SystemRandom,
    signature::{self, RsaEncoding, RsaParameters},
};
use rsa::BigUint;
use subtle::ConstantTimeEq as _;
use tollgate_error::ErrorContext as _;

use super::{
    JWA,
    registry::{Entry, verification_failed},
};
use crate::jose::{JoseError, SigningKey, VerifyingKey, codec};

const PSS_MODULUS_BITS: std::ops::RangeInclusive<usize> = 2048..=8192;

macro_rules! register_rsa {
    ($table:ident, $($alg:ident => $encoding:ident, $verify:expr;)+) => {
        $(
            $table.insert(
                JWA::$alg,
                Entry {
                    sign: |payload, key| sign(&signature::$encoding, payload, key),
                    verify: $verify,
                },
            );
        )+
    };
}

pub(super) fn register(table: &mut HashMap<JWA, Entry>) {
    register_rsa! {
        table,
        RS256 => RSA_PKCS1_SHA256,
            |payload, sig, key| verify_pkcs1(&signature::RSA_PKCS1_2048_8192_SHA256, payload, sig, key);
        RS384 => RSA_PKCS1_SHA384,
            |payload, sig, key| verify_pkcs1(&signature::RSA_PKCS1_2048_8192_SHA384, payload, sig, key);
        RS512 => RSA_PKCS1_SHA512,
            |payload, sig, key| verify_pkcs1(&signature::RSA_PKCS1_2048_8192_SHA512, payload, sig, key);
        PS256 => RSA_PSS_SHA256, |payload, sig, key| verify_pss(&SHA256, payload, sig, key);
        PS384 => RSA_PSS_SHA384, |payload, sig, key| verify_pss(&SHA384, payload, sig, key);
        PS512 => RSA_PSS_SHA512, |payload, sig, key| verify_pss(&SHA512, payload, sig, key);
    }
}

fn sign(
    encoding: &'static dyn RsaEncoding,
    payload: &[u8],
    key: &SigningKey,
) -> Result<Vec<u8>, JoseError> {
    let SigningKey::Rsa(key_pair) = key else {
        return Err(JoseError::invalid_key_type("rsa private key", key.kind()));
    };

    let rng = SystemRandom::new();
    let mut signature = vec![0; key_pair.public_modulus_len()];
    key_pair
        .sign(encoding, &rng, payload, &mut signature)
        .context("rsa sign")
        .map_err(JoseError::invalid_key_material)?;
    Ok(signature)
}

fn verify_pkcs1(
    params: &'static RsaParameters,
    payload: &[u8],
    signature: &[u8],
    key: &VerifyingKey,
) -> Result<(), JoseError> {
    let VerifyingKey::Rsa(components) = key else {
        return Err(JoseError::invalid_key_type("rsa public key", key.kind()));
    };
    components
        .verify(params, payload, signature)
        .map_err(|_err| verification_failed())
}

fn verify_pss(
    hash: &'static digest::Algorithm,
    payload: &[u8],
    signature: &[u8],
    key: &VerifyingKey,
) -> Result<(), JoseError> {
    let VerifyingKey::Rsa(components) = key else {
        return Err(JoseError::invalid_key_type("rsa public key", key.kind()));
    };
    let n = codec::trim_leading_zeros(&components.n);
    let Some(em) = encoded_message(n, &components.e, signature) else {
        return Err(verification_failed());
    };
    if emsa_pss_verify(hash, payload, em, modulus_bits(n) - 1) {
        Ok(())
    } else {
        Err(verification_failed())
    }
}

fn modulus_bits(n: &[u8]) -> usize {
    n.first()
        .map_or(0, |top| n.len() * 8 - top.leading_zeros() as usize)
}

/// `signature ^ e mod n`, as `emLen` big-endian bytes (RFC 8017 §8.1.2).
fn encoded_message(n: &[u8], e: &[u8], signature: &[u8]) -> Option<Vec<u8>> {
    let bits = modulus_bits(n);
    if !PSS_MODULUS_BITS.contains(&bits) || signature.len() != n.len() {
        return None;
    }

    let modulus = BigUint::from_bytes_be(n);
    let s = BigUint::from_bytes_be(signature);
    if s >= modulus {
        return None;
    }
    let m = s.modpow(&BigUint::from_bytes_be(e), &modulus).to_bytes_be();

    let em_len = (bits - 1).div_ceil(8);
    let m = codec::trim_leading_zeros(&m);
    if m.len() > em_len {
        return None;
    }
    let mut em = vec![0; em_len];
    em[em_len - m.len()..].copy_from_slice(m);
    Some(em)
}

/// EMSA-PSS-VERIFY (RFC 8017 §9.1.2) without a fixed salt length.
fn emsa_pss_verify(
    hash: &'static digest::Algorithm,
    payload: &[u8],
    mut em: Vec<u8>,
    em_bits: usize,
) -> bool {
    let m_hash = digest::digest(hash, payload);
    let h_len = m_hash.as_ref().len();
    let em_len = em.len();
    if em_len < h_len + 2 || em[em_len - 1] != 0xbc {
        return false;
    }

    let (db, rest) = em.split_at_mut(em_len - h_len - 1);
    let h = &rest[..h_len];
    let top_mask = 0xff_u8 >> (8 * em_len - em_bits);
    if db[0] & !top_mask != 0 {
        return false;
    }
    mgf1_xor(hash, h, db);
    db[0] &= top_mask;

    let Some(separator) = db.iter().position(|b| *b != 0) else {
        return false;
    };
    if db[separator] != 0x01 {
        return false;
    }
    let salt = &db[separator + 1..];

    let mut ctx = digest::Context::new(hash);
    ctx.update(&[0; 8]);
    ctx.update(m_hash.as_ref());
    ctx.update(salt);
    bool::from(ctx.finish().as_ref().ct_eq(h))
}

fn mgf1_xor(hash: &'static digest::Algorithm, seed: &[u8], out: &mut [u8]) {
    let mut counter = 0_u32;
    let mut offset = 0;
    while offset < out.len() {
        let mut ctx = digest::Context::new(hash);
        ctx.update(seed);
        ctx.update(&counter.to_be_bytes());
        let mask = ctx.finish();
        for (byte, mask) in out[offset..].iter_mut().zip(mask.as_ref()) {
            *byte ^= mask;
        }
        offset += mask.as_ref().len();
        counter += 1;
    }
}
