use std::{collections::HashMap, sync::LazyLock};

use crate::jose::{JoseError, JoseErrorKind, SigningKey, VerifyingKey};

use super::{JWA, ecdsa, eddsa, hmac, rsa};

pub(super) type SignFn = fn(&[u8], &SigningKey) -> Result<Vec<u8>, JoseError>;
pub(super) type VerifyFn = fn(&[u8], &[u8], &VerifyingKey) -> Result<(), JoseError>;

#[derive(Clone, Copy)]
/// Sign and verify functions of one algorithm.
pub(super) struct Entry {
    pub(super) sign: SignFn,
    pub(super) verify: VerifyFn,
}

static REGISTRY: LazyLock<HashMap<JWA, Entry>> = LazyLock::new(|| {
    let mut table = HashMap::with_capacity(JWA::ALL.len());
    hmac::register(&mut table);
    rsa::register(&mut table);
    ecdsa::register(&mut table);
    eddsa::register(&mut table);
    table
});

fn lookup(alg: JWA) -> Result<Entry, JoseError> {
    REGISTRY.get(&alg).copied().ok_or_else(|| {
        JoseError::from_display(
            JoseErrorKind::UnsupportedAlgorithm,
            format!("no signer registered for '{alg}'"),
        )
    })
}

#[derive(Debug, Clone, Copy)]
/// Signs payloads with a single registered [`JWA`].
pub struct AlgorithmSigner {
    alg: JWA,
    sign: SignFn,
}

impl AlgorithmSigner {
    /// Create an [`AlgorithmSigner`], fails with
    /// [`JoseErrorKind::UnsupportedAlgorithm`] if `alg` is not registered.
    pub fn new(alg: JWA) -> Result<Self, JoseError> {
        let entry = lookup(alg)?;
        Ok(Self {
            alg,
            sign: entry.sign,
        })
    }

    /// The algorithm used by this signer
    pub fn alg(&self) -> JWA {
        self.alg
    }

    /// Sign `payload` with `key`
    pub fn sign(&self, payload: &[u8], key: &SigningKey) -> Result<Vec<u8>, JoseError> {
        (self.sign)(payload, key)
    }
}

#[derive(Debug, Clone, Copy)]
/// Verifies signatures made with a single registered [`JWA`].
pub struct AlgorithmVerifier {
    alg: JWA,
    verify: VerifyFn,
}

impl AlgorithmVerifier {
    /// Create an [`AlgorithmVerifier`], fails with
    /// [`JoseErrorKind::UnsupportedAlgorithm`] if `alg` is not registered.
    pub fn new(alg: JWA) -> Result<Self, JoseError> {
        let entry = lookup(alg)?;
        Ok(Self {
            alg,
            verify: entry.verify,
        })
    }

    /// The algorithm used by this verifier
    pub fn alg(&self) -> JWA {
        self.alg
    }

    /// Verify `signature` over `payload` with `key`
    pub fn verify(
        &self,
        payload: &[u8],
        signature: &[u8],
        key: &VerifyingKey,
    ) -> Result<(), JoseError> {
        (self.verify)(payload, signature, key)
    }
}

pub(super) fn verification_failed() -> JoseError {
    JoseError::new(JoseErrorKind::SignatureVerificationFailed)
}
