use std::fmt;

use aws_lc_rs::{
    agreement::{self, X25519},
    encoding::{AsBigEndian, Curve25519SeedBin},
    signature::{Ed25519KeyPair, KeyPair as _},
};
use serde::{Deserialize, Serialize, ser::SerializeMap};
use serde_json::Value;
use tollgate_error::ErrorContext as _;
use zeroize::Zeroizing;

use super::{Accept, FromJwk, JWK, KeyMaterial, members::Members};
use crate::jose::{
    Ed25519PublicKey, JoseError, JoseErrorKind, X25519PublicKey, codec,
    native::CURVE25519_KEY_LEN,
};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Curves usable with `OKP` keys
pub enum JWKOkpCurves {
    /// Ed25519 signature keys, used by `EdDSA`
    Ed25519,
    /// X25519 key agreement keys
    X25519,
}

impl JWKOkpCurves {
    /// Name as used in the `crv` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "Ed25519",
            Self::X25519 => "X25519",
        }
    }
}

impl fmt::Display for JWKOkpCurves {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Accept for JWKOkpCurves {
    fn accept(value: &Value) -> Result<Self, JoseError> {
        Self::deserialize(value).map_err(|err| {
            JoseError::from_display(
                JoseErrorKind::MalformedInput,
                format!("unknown octet key pair curve: {err}"),
            )
        })
    }
}

#[derive(Clone, PartialEq, Eq)]
/// Key material of an `OKP` key.
///
/// A private key always carries the public key derived from its seed.
pub struct OkpKey {
    curve: JWKOkpCurves,
    x: Vec<u8>,
    d: Option<Zeroizing<Vec<u8>>>,
}

fn check_len(curve: JWKOkpCurves, name: &str, value: &[u8]) -> Result<(), JoseError> {
    if value.len() == CURVE25519_KEY_LEN {
        Ok(())
    } else {
        Err(JoseError::from_display(
            JoseErrorKind::InvalidKeyMaterial,
            format!("{curve} '{name}' must be {CURVE25519_KEY_LEN} bytes"),
        ))
    }
}

fn derive_public(curve: JWKOkpCurves, d: &[u8]) -> Result<Vec<u8>, JoseError> {
    match curve {
        JWKOkpCurves::Ed25519 => {
            let key_pair = Ed25519KeyPair::from_seed_unchecked(d)
                .context("create ed25519 key pair from seed")
                .map_err(JoseError::invalid_key_material)?;
            Ok(key_pair.public_key().as_ref().to_vec())
        }
        JWKOkpCurves::X25519 => {
            let public_key = agreement::PrivateKey::from_private_key(&X25519, d)
                .context("create x25519 private key")
                .map_err(JoseError::invalid_key_material)?
                .compute_public_key()
                .context("compute x25519 public key")
                .map_err(JoseError::invalid_key_material)?;
            Ok(public_key.as_ref().to_vec())
        }
    }
}

impl OkpKey {
    /// Create a public [`OkpKey`]
    pub fn public(curve: JWKOkpCurves, x: &[u8]) -> Result<Self, JoseError> {
        check_len(curve, "x", x)?;
        Ok(Self {
            curve,
            x: x.to_vec(),
            d: None,
        })
    }

    /// Create a private [`OkpKey`], `x` must match the public key derived from `d`.
    pub fn private(curve: JWKOkpCurves, x: &[u8], d: &[u8]) -> Result<Self, JoseError> {
        check_len(curve, "x", x)?;
        check_len(curve, "d", d)?;
        let derived = derive_public(curve, d)?;
        if derived != x {
            return Err(JoseError::from_display(
                JoseErrorKind::InvalidKeyMaterial,
                format!("{curve} public key does not match private key"),
            ));
        }
        Ok(Self {
            curve,
            x: derived,
            d: Some(Zeroizing::new(d.to_vec())),
        })
    }

    /// Curve of this key
    pub fn curve(&self) -> JWKOkpCurves {
        self.curve
    }

    /// The public key
    pub fn x(&self) -> &[u8] {
        &self.x
    }

    /// Returns true if the private seed is present
    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }

    /// This key without its private seed
    pub fn public_key(&self) -> Self {
        Self {
            curve: self.curve,
            x: self.x.clone(),
            d: None,
        }
    }

    pub(super) fn from_members(members: &mut Members) -> Result<Self, JoseError> {
        let curve: JWKOkpCurves = members.require("crv")?;
        let x = members.require_bytes("x")?;
        match members.take_secret("d")? {
            Some(d) => Self::private(curve, &x, &d),
            None => Self::public(curve, &x),
        }
    }

    pub(super) fn serialize_members<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        map.serialize_entry("crv", &self.curve)?;
        map.serialize_entry("x", &codec::encode(&self.x))?;
        if let Some(d) = &self.d {
            map.serialize_entry("d", &codec::encode(d))?;
        }
        Ok(())
    }

    fn seed(&self, curve: JWKOkpCurves) -> Result<&[u8], JoseError> {
        if self.curve != curve {
            return Err(JoseError::incompatible_target(format!(
                "{} key cannot be used as {curve} key",
                self.curve
            )));
        }
        self.d.as_deref().map(Vec::as_slice).ok_or_else(|| {
            JoseError::incompatible_target(format!("public {curve} key has no private part"))
        })
    }

    fn public_bytes(&self, curve: JWKOkpCurves) -> Result<&[u8], JoseError> {
        if self.curve == curve {
            Ok(&self.x)
        } else {
            Err(JoseError::incompatible_target(format!(
                "{} key cannot be used as {curve} key",
                self.curve
            )))
        }
    }
}

impl fmt::Debug for OkpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OkpKey")
            .field("crv", &self.curve)
            .field("x", &codec::encode(&self.x))
            .field("private", &self.is_private())
            .finish()
    }
}

impl TryFrom<&Ed25519KeyPair> for OkpKey {
    type Error = JoseError;

    fn try_from(key_pair: &Ed25519KeyPair) -> Result<Self, Self::Error> {
        let seed: Curve25519SeedBin<'static> = key_pair
            .seed()
            .and_then(|seed| seed.as_be_bytes())
            .context("export ed25519 seed")
            .map_err(JoseError::invalid_key_material)?;
        Self::private(
            JWKOkpCurves::Ed25519,
            key_pair.public_key().as_ref(),
            seed.as_ref(),
        )
    }
}

impl TryFrom<&agreement::PrivateKey> for OkpKey {
    type Error = JoseError;

    fn try_from(private_key: &agreement::PrivateKey) -> Result<Self, Self::Error> {
        let d: Curve25519SeedBin<'static> = private_key
            .as_be_bytes()
            .context("export x25519 private key")
            .map_err(JoseError::incompatible_target)?;
        let x = private_key
            .compute_public_key()
            .context("compute x25519 public key")
            .map_err(JoseError::invalid_key_material)?;
        Self::private(JWKOkpCurves::X25519, x.as_ref(), d.as_ref())
    }
}

impl From<&Ed25519PublicKey> for OkpKey {
    fn from(public_key: &Ed25519PublicKey) -> Self {
        Self {
            curve: JWKOkpCurves::Ed25519,
            x: public_key.as_bytes().to_vec(),
            d: None,
        }
    }
}

impl From<&X25519PublicKey> for OkpKey {
    fn from(public_key: &X25519PublicKey) -> Self {
        Self {
            curve: JWKOkpCurves::X25519,
            x: public_key.as_bytes().to_vec(),
            d: None,
        }
    }
}

fn okp(jwk: &JWK) -> Result<&OkpKey, JoseError> {
    match jwk.key() {
        KeyMaterial::OctetKeyPair(key) => Ok(key),
        other => Err(JoseError::incompatible_target(format!(
            "{} key cannot be used as an octet key pair",
            other.kty()
        ))),
    }
}

impl FromJwk for Ed25519KeyPair {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        let key = okp(jwk)?;
        let seed = key.seed(JWKOkpCurves::Ed25519)?;
        Self::from_seed_and_public_key(seed, &key.x)
            .context("create ed25519 key pair from jwk")
            .map_err(JoseError::invalid_key_material)
    }
}

impl FromJwk for Ed25519PublicKey {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        Self::try_from(okp(jwk)?.public_bytes(JWKOkpCurves::Ed25519)?)
    }
}

impl FromJwk for agreement::PrivateKey {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        let seed = okp(jwk)?.seed(JWKOkpCurves::X25519)?;
        Self::from_private_key(&X25519, seed)
            .context("create x25519 private key from jwk")
            .map_err(JoseError::invalid_key_material)
    }
}

impl FromJwk for X25519PublicKey {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        Self::try_from(okp(jwk)?.public_bytes(JWKOkpCurves::X25519)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ed25519_round_trip() {
        let key_pair = Ed25519KeyPair::generate().unwrap();
        let jwk = JWK::from(OkpKey::try_from(&key_pair).unwrap());

        let recreated: Ed25519KeyPair = jwk.materialize().unwrap();
        assert_eq!(
            key_pair.public_key().as_ref(),
            recreated.public_key().as_ref()
        );
        let public: Ed25519PublicKey = jwk.materialize().unwrap();
        assert_eq!(key_pair.public_key().as_ref(), public.as_bytes());

        let err = jwk.materialize::<X25519PublicKey>().unwrap_err();
        assert!(err.is(&JoseErrorKind::IncompatibleTarget));
    }

    #[test]
    fn x25519_round_trip() {
        let private_key = agreement::PrivateKey::generate(&X25519).unwrap();
        let jwk = JWK::from(OkpKey::try_from(&private_key).unwrap());

        let recreated: agreement::PrivateKey = jwk.materialize().unwrap();
        assert_eq!(
            private_key.compute_public_key().unwrap().as_ref(),
            recreated.compute_public_key().unwrap().as_ref()
        );
        let public: X25519PublicKey = jwk.materialize().unwrap();
        assert_eq!(
            private_key.compute_public_key().unwrap().as_ref(),
            public.as_bytes()
        );

        let err = jwk.materialize::<Ed25519KeyPair>().unwrap_err();
        assert!(err.is(&JoseErrorKind::IncompatibleTarget));
    }

    #[test]
    fn rfc8037_private_key_checks_public_part() {
        let d = codec::decode("nWGxne_9WmC6hEr0kuwsxERJxWl7MmkZcDusAxyuf2A").unwrap();
        let x = codec::decode("11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo").unwrap();
        OkpKey::private(JWKOkpCurves::Ed25519, &x, &d).unwrap();

        let mut wrong_x = x.clone();
        wrong_x[0] ^= 1;
        let err = OkpKey::private(JWKOkpCurves::Ed25519, &wrong_x, &d).unwrap_err();
        assert!(err.is(&JoseErrorKind::InvalidKeyMaterial));

        let err = OkpKey::public(JWKOkpCurves::X25519, &x[..31]).unwrap_err();
        assert!(err.is(&JoseErrorKind::InvalidKeyMaterial));
    }
}
