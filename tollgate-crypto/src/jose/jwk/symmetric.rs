use std::fmt;

use serde::ser::SerializeMap;
use zeroize::Zeroizing;

use super::{FromJwk, JWK, KeyMaterial, members::Members};
use crate::jose::{JoseError, JoseErrorKind, codec};

#[derive(Clone, PartialEq, Eq)]
/// Key material of a symmetric (`oct`) key: the raw shared secret.
pub struct SymmetricKey {
    k: Zeroizing<Vec<u8>>,
}

impl SymmetricKey {
    /// Create a new [`SymmetricKey`], empty secrets are refused.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, JoseError> {
        Self::from_secret(Zeroizing::new(secret.into()))
    }

    fn from_secret(k: Zeroizing<Vec<u8>>) -> Result<Self, JoseError> {
        if k.is_empty() {
            return Err(JoseError::from_display(
                JoseErrorKind::InvalidKeyMaterial,
                "symmetric key must not be empty",
            ));
        }
        Ok(Self { k })
    }

    pub(super) fn from_members(members: &mut Members) -> Result<Self, JoseError> {
        Self::from_secret(members.require_secret("k")?)
    }

    pub(super) fn serialize_members<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        map.serialize_entry("k", &codec::encode(&self.k))
    }

    /// The raw secret
    pub fn as_bytes(&self) -> &[u8] {
        &self.k
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey").finish_non_exhaustive()
    }
}

fn symmetric(jwk: &JWK) -> Result<&SymmetricKey, JoseError> {
    match jwk.key() {
        KeyMaterial::Symmetric(key) => Ok(key),
        other => Err(JoseError::incompatible_target(format!(
            "{} key cannot be used as a symmetric secret",
            other.kty()
        ))),
    }
}

impl FromJwk for Vec<u8> {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        Ok(symmetric(jwk)?.as_bytes().to_vec())
    }
}

impl FromJwk for Zeroizing<Vec<u8>> {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        Ok(symmetric(jwk)?.k.clone())
    }
}
