use std::fmt;

use aws_lc_rs::{
    encoding::{AsBigEndian, EcPrivateKeyBin},
    signature::{
        ECDSA_P256_SHA256_FIXED, ECDSA_P256_SHA256_FIXED_SIGNING, ECDSA_P384_SHA384_FIXED,
        ECDSA_P384_SHA384_FIXED_SIGNING, ECDSA_P521_SHA512_FIXED, ECDSA_P521_SHA512_FIXED_SIGNING,
        EcdsaKeyPair, EcdsaSigningAlgorithm, EcdsaVerificationAlgorithm, KeyPair as _,
    },
};
use serde::{Deserialize, Serialize, ser::SerializeMap};
use serde_json::Value;
use tollgate_error::ErrorContext as _;
use zeroize::Zeroizing;

use super::{Accept, FromJwk, JWK, KeyMaterial, members::Members};
use crate::jose::{EcPublicKey, EcdsaSigningKey, JoseError, JoseErrorKind, codec};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Curves usable with `EC` keys
pub enum JWKEllipticCurves {
    #[serde(rename = "P-256")]
    /// NIST P-256, used by `ES256`
    P256,
    #[serde(rename = "P-384")]
    /// NIST P-384, used by `ES384`
    P384,
    #[serde(rename = "P-521")]
    /// NIST P-521, used by `ES512`
    P521,
}

impl JWKEllipticCurves {
    /// Name as used in the `crv` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// Width in bytes of the coordinates and private scalar
    pub fn coordinate_len(&self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }

    /// Fixed width signing algorithm of this curve
    pub fn signing_algorithm(&self) -> &'static EcdsaSigningAlgorithm {
        match self {
            Self::P256 => &ECDSA_P256_SHA256_FIXED_SIGNING,
            Self::P384 => &ECDSA_P384_SHA384_FIXED_SIGNING,
            Self::P521 => &ECDSA_P521_SHA512_FIXED_SIGNING,
        }
    }

    /// Fixed width verification algorithm of this curve
    pub fn verification_algorithm(&self) -> &'static EcdsaVerificationAlgorithm {
        match self {
            Self::P256 => &ECDSA_P256_SHA256_FIXED,
            Self::P384 => &ECDSA_P384_SHA384_FIXED,
            Self::P521 => &ECDSA_P521_SHA512_FIXED,
        }
    }
}

impl fmt::Display for JWKEllipticCurves {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Accept for JWKEllipticCurves {
    fn accept(value: &Value) -> Result<Self, JoseError> {
        Self::deserialize(value).map_err(|err| {
            JoseError::from_display(
                JoseErrorKind::MalformedInput,
                format!("unknown elliptic curve: {err}"),
            )
        })
    }
}

#[derive(Clone, PartialEq, Eq)]
/// Key material of an `EC` key.
pub struct EcKey {
    public: EcPublicKey,
    d: Option<Zeroizing<Vec<u8>>>,
}

impl EcKey {
    /// Create a public [`EcKey`], coordinates must be exactly as wide as the curve requires.
    pub fn public(curve: JWKEllipticCurves, x: &[u8], y: &[u8]) -> Result<Self, JoseError> {
        Ok(Self {
            public: EcPublicKey::from_coordinates(curve, x, y)?,
            d: None,
        })
    }

    /// Create a private [`EcKey`].
    ///
    /// The private scalar is only checked against the
    /// public point once the key is materialized.
    pub fn private(
        curve: JWKEllipticCurves,
        x: &[u8],
        y: &[u8],
        d: &[u8],
    ) -> Result<Self, JoseError> {
        let mut key = Self::public(curve, x, y)?;
        if d.len() != curve.coordinate_len() {
            return Err(JoseError::from_display(
                JoseErrorKind::InvalidKeyMaterial,
                format!("{curve} private scalar must be {} bytes", curve.coordinate_len()),
            ));
        }
        key.d = Some(Zeroizing::new(d.to_vec()));
        Ok(key)
    }

    /// Curve of this key
    pub fn curve(&self) -> JWKEllipticCurves {
        self.public.curve()
    }

    /// The x coordinate
    pub fn x(&self) -> &[u8] {
        self.public.x()
    }

    /// The y coordinate
    pub fn y(&self) -> &[u8] {
        self.public.y()
    }

    /// Returns true if the private scalar is present
    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }

    /// This key without its private scalar
    pub fn public_key(&self) -> Self {
        Self {
            public: self.public.clone(),
            d: None,
        }
    }

    pub(super) fn from_members(members: &mut Members) -> Result<Self, JoseError> {
        let curve: JWKEllipticCurves = members.require("crv")?;
        let x = members.require_bytes("x")?;
        let y = members.require_bytes("y")?;
        match members.take_secret("d")? {
            Some(d) => Self::private(curve, &x, &y, &d),
            None => Self::public(curve, &x, &y),
        }
    }

    pub(super) fn serialize_members<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        map.serialize_entry("crv", &self.curve())?;
        map.serialize_entry("x", &codec::encode(self.x()))?;
        map.serialize_entry("y", &codec::encode(self.y()))?;
        if let Some(d) = &self.d {
            map.serialize_entry("d", &codec::encode(d))?;
        }
        Ok(())
    }
}

impl fmt::Debug for EcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcKey")
            .field("crv", &self.curve())
            .field("x", &codec::encode(self.x()))
            .field("y", &codec::encode(self.y()))
            .field("private", &self.is_private())
            .finish()
    }
}

impl From<&EcPublicKey> for EcKey {
    fn from(public: &EcPublicKey) -> Self {
        Self {
            public: public.clone(),
            d: None,
        }
    }
}

impl TryFrom<&EcdsaSigningKey> for EcKey {
    type Error = JoseError;

    fn try_from(key: &EcdsaSigningKey) -> Result<Self, Self::Error> {
        let curve = key.curve();
        let public = EcPublicKey::from_sec1(curve, key.key_pair().public_key().as_ref())?;
        let d: EcPrivateKeyBin<'static> = key
            .key_pair()
            .private_key()
            .as_be_bytes()
            .context("export ecdsa private key")
            .map_err(JoseError::invalid_key_material)?;
        let d = Zeroizing::new(codec::pad_left(d.as_ref(), curve.coordinate_len())?);
        Ok(Self {
            public,
            d: Some(d),
        })
    }
}

fn ec(jwk: &JWK) -> Result<&EcKey, JoseError> {
    match jwk.key() {
        KeyMaterial::EllipticCurve(key) => Ok(key),
        other => Err(JoseError::incompatible_target(format!(
            "{} key cannot be used as an elliptic curve key",
            other.kty()
        ))),
    }
}

impl FromJwk for EcdsaKeyPair {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        let key = ec(jwk)?;
        let d = key.d.as_ref().ok_or_else(|| {
            JoseError::incompatible_target("public elliptic curve key cannot be used as a key pair")
        })?;
        Self::from_private_key_and_public_key(
            key.curve().signing_algorithm(),
            d,
            key.public.as_sec1(),
        )
        .context("create ecdsa key pair from jwk")
        .map_err(JoseError::invalid_key_material)
    }
}

impl FromJwk for EcdsaSigningKey {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        let key_pair = EcdsaKeyPair::from_jwk(jwk)?;
        Self::new(ec(jwk)?.curve(), key_pair)
    }
}

impl FromJwk for EcPublicKey {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        Ok(ec(jwk)?.public.clone())
    }
}
