use aws_lc_rs::digest::{self, SHA256, SHA384, SHA512};
use indexmap::IndexMap;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    ser::{SerializeMap, SerializeStruct},
};
use serde_json::Value;
use tollgate_error::ErrorContext as _;
use tollgate_utils::macros::generate_set_and_with;

use crate::jose::{
    EcPublicKey, EcdsaSigningKey, JWA, JoseError, JoseErrorKind, SigningKey, VerifyingKey, codec,
};

mod certchain;
mod ec;
mod members;
mod okp;
mod params;
mod rsa;
mod set;
mod symmetric;

pub use certchain::CertificateChain;
pub use ec::{EcKey, JWKEllipticCurves};
pub use okp::{JWKOkpCurves, OkpKey};
pub use params::{Accept, JWKAlgorithm, JWKKeyOperation, JWKUse, ParameterValue};
pub use rsa::{RsaKey, RsaPrivateParams};
pub use set::JWKSet;
pub use symmetric::SymmetricKey;

use members::Members;

/// Parameters holding key material, these can never be set as metadata.
const KEY_MATERIAL_PARAMETERS: [&str; 14] = [
    "kty", "k", "n", "e", "d", "p", "q", "dp", "dq", "qi", "oth", "crv", "x", "y",
];

/// Native key types a [`JWK`] can be materialized into.
///
/// See [`JWK::materialize`].
pub trait FromJwk: Sized {
    /// Materialize the key material of `jwk` as `Self`.
    ///
    /// Fails with [`JoseErrorKind::IncompatibleTarget`] if `Self` cannot hold the key,
    /// and with [`JoseErrorKind::InvalidKeyMaterial`] if the key is refused by the primitive.
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Key material of a [`JWK`], one variant per `kty`
pub enum KeyMaterial {
    /// `oct`
    Symmetric(SymmetricKey),
    /// `RSA`
    Rsa(RsaKey),
    /// `EC`
    EllipticCurve(EcKey),
    /// `OKP`
    OctetKeyPair(OkpKey),
}

impl KeyMaterial {
    /// The "kty" (key type) parameter identifies the cryptographic algorithm family used with the key
    pub fn kty(&self) -> &'static str {
        match self {
            Self::Symmetric(_) => "oct",
            Self::Rsa(_) => "RSA",
            Self::EllipticCurve(_) => "EC",
            Self::OctetKeyPair(_) => "OKP",
        }
    }
}

impl From<SymmetricKey> for KeyMaterial {
    fn from(key: SymmetricKey) -> Self {
        Self::Symmetric(key)
    }
}

impl From<RsaKey> for KeyMaterial {
    fn from(key: RsaKey) -> Self {
        Self::Rsa(key)
    }
}

impl From<EcKey> for KeyMaterial {
    fn from(key: EcKey) -> Self {
        Self::EllipticCurve(key)
    }
}

impl From<OkpKey> for KeyMaterial {
    fn from(key: OkpKey) -> Self {
        Self::OctetKeyPair(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Hash used to compute a [`JWK::thumbprint`]
pub enum ThumbprintHash {
    #[default]
    /// SHA-256, the common choice
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl ThumbprintHash {
    fn algorithm(self) -> &'static digest::Algorithm {
        match self {
            Self::Sha256 => &SHA256,
            Self::Sha384 => &SHA384,
            Self::Sha512 => &SHA512,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// [`JWK`] or JSON Web Key as defined in [`rfc7517`]
///
/// Metadata never takes part in any cryptographic operation,
/// only the key id is used to look up keys in a [`JWKSet`].
///
/// [`rfc7517`]: https://datatracker.ietf.org/doc/html/rfc7517
pub struct JWK {
    key: KeyMaterial,
    alg: Option<JWKAlgorithm>,
    kid: Option<String>,
    key_use: Option<JWKUse>,
    key_ops: Option<Vec<JWKKeyOperation>>,
    x5u: Option<String>,
    x5c: Option<CertificateChain>,
    x5t: Option<String>,
    x5t_s256: Option<String>,
    extra: IndexMap<String, ParameterValue>,
}

impl JWK {
    /// Create a new [`JWK`] without any metadata
    pub fn new(key: impl Into<KeyMaterial>) -> Self {
        Self {
            key: key.into(),
            alg: None,
            kid: None,
            key_use: None,
            key_ops: None,
            x5u: None,
            x5c: None,
            x5t: None,
            x5t_s256: None,
            extra: IndexMap::new(),
        }
    }

    /// Decode a [`JWK`] from its JSON representation
    pub fn from_json(json: &[u8]) -> Result<Self, JoseError> {
        let members: IndexMap<String, Value> = serde_json::from_slice(json)
            .context("decode jwk json object")
            .map_err(JoseError::malformed)?;
        Self::from_members(members)
    }

    /// Decode a [`JWK`] from a JSON value
    pub fn from_value(value: Value) -> Result<Self, JoseError> {
        let Value::Object(object) = value else {
            return Err(JoseError::from_display(
                JoseErrorKind::MalformedInput,
                "jwk must be a json object",
            ));
        };
        Self::from_members(object.into_iter().collect())
    }

    pub(crate) fn from_members(members: IndexMap<String, Value>) -> Result<Self, JoseError> {
        let mut members = Members::new(members);
        let kty: String = members.require("kty")?;
        let key = match kty.as_str() {
            "oct" => KeyMaterial::Symmetric(SymmetricKey::from_members(&mut members)?),
            "RSA" => KeyMaterial::Rsa(RsaKey::from_members(&mut members)?),
            "EC" => KeyMaterial::EllipticCurve(EcKey::from_members(&mut members)?),
            "OKP" => KeyMaterial::OctetKeyPair(OkpKey::from_members(&mut members)?),
            other => {
                return Err(JoseError::from_display(
                    JoseErrorKind::MalformedInput,
                    format!("unknown key type '{other}'"),
                ));
            }
        };

        let mut jwk = Self::new(key);
        for (name, value) in members.into_inner() {
            jwk.set_parameter(&name, &value)?;
        }
        Ok(jwk)
    }

    /// Key material of this [`JWK`]
    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    /// Returns true if this [`JWK`] holds private or secret material
    pub fn is_private(&self) -> bool {
        match &self.key {
            KeyMaterial::Symmetric(_) => true,
            KeyMaterial::Rsa(key) => key.is_private(),
            KeyMaterial::EllipticCurve(key) => key.is_private(),
            KeyMaterial::OctetKeyPair(key) => key.is_private(),
        }
    }

    /// Materialize this [`JWK`] into a native key type, see [`FromJwk`]
    pub fn materialize<T: FromJwk>(&self) -> Result<T, JoseError> {
        T::from_jwk(self)
    }

    /// The public counterpart of this key, metadata included.
    ///
    /// Symmetric keys have no public counterpart.
    pub fn public_key(&self) -> Result<Self, JoseError> {
        let key = match &self.key {
            KeyMaterial::Symmetric(_) => {
                return Err(JoseError::incompatible_target(
                    "symmetric key has no public counterpart",
                ));
            }
            KeyMaterial::Rsa(key) => KeyMaterial::Rsa(key.public_key()),
            KeyMaterial::EllipticCurve(key) => KeyMaterial::EllipticCurve(key.public_key()),
            KeyMaterial::OctetKeyPair(key) => KeyMaterial::OctetKeyPair(key.public_key()),
        };
        Ok(Self {
            key,
            ..self.clone()
        })
    }

    /// [`JWK`] thumbprint as defined in [`rfc7638`], a stable identifier for a [`JWK`].
    ///
    /// Only the required public members take part, so a private key
    /// and its public counterpart share the same thumbprint.
    ///
    /// [`rfc7638`]: https://datatracker.ietf.org/doc/html/rfc7638
    pub fn thumbprint(&self, hash: ThumbprintHash) -> Result<Vec<u8>, JoseError> {
        let canonical = serde_json::to_vec(&ThumbprintInput(&self.key))
            .context("serialize jwk thumbprint input")
            .map_err(JoseError::invalid_key_material)?;
        Ok(digest::digest(hash.algorithm(), &canonical).as_ref().to_vec())
    }

    /// Set a parameter from a dynamic JSON value.
    ///
    /// Registered parameters are validated with [`Accept`],
    /// all others are kept as [`ParameterValue`]. Key material cannot be set this way.
    pub fn set_parameter(&mut self, name: &str, value: &Value) -> Result<&mut Self, JoseError> {
        match name {
            "alg" => self.alg = Some(JWKAlgorithm::accept(value)?),
            "kid" => self.kid = Some(String::accept(value)?),
            "use" => self.key_use = Some(JWKUse::accept(value)?),
            "key_ops" => self.key_ops = Some(Vec::<JWKKeyOperation>::accept(value)?),
            "x5u" => self.x5u = Some(String::accept(value)?),
            "x5c" => self.x5c = Some(CertificateChain::accept(value)?),
            "x5t" => self.x5t = Some(String::accept(value)?),
            "x5t#S256" => self.x5t_s256 = Some(String::accept(value)?),
            name if KEY_MATERIAL_PARAMETERS.contains(&name) => {
                return Err(JoseError::from_display(
                    JoseErrorKind::MalformedInput,
                    format!("'{name}' is not a parameter of this {} key", self.key.kty()),
                ));
            }
            name => {
                self.extra
                    .insert(name.to_owned(), ParameterValue::accept(value)?);
            }
        }
        Ok(self)
    }

    /// Intended algorithm to be used with this key
    pub fn alg(&self) -> Option<&JWKAlgorithm> {
        self.alg.as_ref()
    }

    generate_set_and_with! {
        /// Intended algorithm to be used with this key
        pub fn alg(mut self, alg: Option<JWKAlgorithm>) -> Self {
            self.alg = alg;
            self
        }
    }

    /// Key id
    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    generate_set_and_with! {
        /// Key id
        pub fn kid(mut self, kid: Option<String>) -> Self {
            self.kid = kid;
            self
        }
    }

    /// Intended use of the public key
    pub fn key_use(&self) -> Option<JWKUse> {
        self.key_use
    }

    generate_set_and_with! {
        /// Intended use of the public key
        pub fn key_use(mut self, key_use: Option<JWKUse>) -> Self {
            self.key_use = key_use;
            self
        }
    }

    /// Operations this key is intended for
    pub fn key_ops(&self) -> Option<&[JWKKeyOperation]> {
        self.key_ops.as_deref()
    }

    generate_set_and_with! {
        /// Operations this key is intended for
        pub fn key_ops(mut self, key_ops: Option<Vec<JWKKeyOperation>>) -> Self {
            self.key_ops = key_ops;
            self
        }
    }

    /// URL of the X.509 certificate (chain)
    pub fn x5u(&self) -> Option<&str> {
        self.x5u.as_deref()
    }

    generate_set_and_with! {
        /// URL of the X.509 certificate (chain)
        pub fn x5u(mut self, x5u: Option<String>) -> Self {
            self.x5u = x5u;
            self
        }
    }

    /// X.509 certificate chain
    pub fn x5c(&self) -> Option<&CertificateChain> {
        self.x5c.as_ref()
    }

    generate_set_and_with! {
        /// X.509 certificate chain
        pub fn x5c(mut self, x5c: Option<CertificateChain>) -> Self {
            self.x5c = x5c;
            self
        }
    }

    /// X.509 certificate SHA-1 thumbprint
    pub fn x5t(&self) -> Option<&str> {
        self.x5t.as_deref()
    }

    generate_set_and_with! {
        /// X.509 certificate SHA-1 thumbprint
        pub fn x5t(mut self, x5t: Option<String>) -> Self {
            self.x5t = x5t;
            self
        }
    }

    /// X.509 certificate SHA-256 thumbprint
    pub fn x5t_s256(&self) -> Option<&str> {
        self.x5t_s256.as_deref()
    }

    generate_set_and_with! {
        /// X.509 certificate SHA-256 thumbprint
        pub fn x5t_s256(mut self, x5t_s256: Option<String>) -> Self {
            self.x5t_s256 = x5t_s256;
            self
        }
    }

    /// Parameters without a dedicated field, in insertion order
    pub fn extra(&self) -> &IndexMap<String, ParameterValue> {
        &self.extra
    }
}

impl From<SymmetricKey> for JWK {
    fn from(key: SymmetricKey) -> Self {
        Self::new(key)
    }
}

impl From<RsaKey> for JWK {
    fn from(key: RsaKey) -> Self {
        Self::new(key)
    }
}

impl From<EcKey> for JWK {
    fn from(key: EcKey) -> Self {
        Self::new(key)
    }
}

impl From<OkpKey> for JWK {
    fn from(key: OkpKey) -> Self {
        Self::new(key)
    }
}

impl TryFrom<&SigningKey> for JWK {
    type Error = JoseError;

    fn try_from(key: &SigningKey) -> Result<Self, Self::Error> {
        Ok(match key {
            SigningKey::Octets(secret) => Self::new(SymmetricKey::new(secret.to_vec())?),
            SigningKey::Rsa(key_pair) => Self::new(RsaKey::try_from(key_pair)?),
            SigningKey::Ecdsa(key) => Self::new(EcKey::try_from(key)?),
            SigningKey::Ed25519(key_pair) => Self::new(OkpKey::try_from(key_pair)?),
        })
    }
}

impl TryFrom<&VerifyingKey> for JWK {
    type Error = JoseError;

    fn try_from(key: &VerifyingKey) -> Result<Self, Self::Error> {
        Ok(match key {
            VerifyingKey::Octets(secret) => Self::new(SymmetricKey::new(secret.to_vec())?),
            VerifyingKey::Rsa(components) => Self::new(RsaKey::try_from(components)?),
            VerifyingKey::Ecdsa(key) => Self::new(EcKey::from(key)),
            VerifyingKey::Ed25519(key) => Self::new(OkpKey::from(key)),
        })
    }
}

impl FromJwk for SigningKey {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        match jwk.key() {
            KeyMaterial::Symmetric(key) => Ok(Self::octets(key.as_bytes())),
            KeyMaterial::Rsa(_) => Ok(Self::Rsa(jwk.materialize()?)),
            KeyMaterial::EllipticCurve(_) => Ok(Self::Ecdsa(jwk.materialize()?)),
            KeyMaterial::OctetKeyPair(key) => match key.curve() {
                JWKOkpCurves::Ed25519 => Ok(Self::Ed25519(jwk.materialize()?)),
                JWKOkpCurves::X25519 => Err(JoseError::incompatible_target(
                    "X25519 keys cannot sign",
                )),
            },
        }
    }
}

impl FromJwk for VerifyingKey {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        match jwk.key() {
            KeyMaterial::Symmetric(key) => Ok(Self::octets(key.as_bytes())),
            KeyMaterial::Rsa(_) => Ok(Self::Rsa(jwk.materialize()?)),
            KeyMaterial::EllipticCurve(_) => Ok(Self::Ecdsa(jwk.materialize::<EcPublicKey>()?)),
            KeyMaterial::OctetKeyPair(key) => match key.curve() {
                JWKOkpCurves::Ed25519 => Ok(Self::Ed25519(jwk.materialize()?)),
                JWKOkpCurves::X25519 => Err(JoseError::incompatible_target(
                    "X25519 keys cannot verify",
                )),
            },
        }
    }
}

impl FromJwk for JWK {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        Ok(jwk.clone())
    }
}

impl Serialize for JWK {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("kty", self.key.kty())?;
        match &self.key {
            KeyMaterial::Symmetric(key) => key.serialize_members(&mut map)?,
            KeyMaterial::Rsa(key) => key.serialize_members(&mut map)?,
            KeyMaterial::EllipticCurve(key) => key.serialize_members(&mut map)?,
            KeyMaterial::OctetKeyPair(key) => key.serialize_members(&mut map)?,
        }
        if let Some(alg) = &self.alg {
            map.serialize_entry("alg", alg)?;
        }
        if let Some(kid) = &self.kid {
            map.serialize_entry("kid", kid)?;
        }
        if let Some(key_use) = &self.key_use {
            map.serialize_entry("use", key_use)?;
        }
        if let Some(key_ops) = &self.key_ops {
            map.serialize_entry("key_ops", key_ops)?;
        }
        if let Some(x5u) = &self.x5u {
            map.serialize_entry("x5u", x5u)?;
        }
        if let Some(x5c) = &self.x5c {
            map.serialize_entry("x5c", x5c)?;
        }
        if let Some(x5t) = &self.x5t {
            map.serialize_entry("x5t", x5t)?;
        }
        if let Some(x5t_s256) = &self.x5t_s256 {
            map.serialize_entry("x5t#S256", x5t_s256)?;
        }
        for (name, value) in &self.extra {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for JWK {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let members = IndexMap::<String, Value>::deserialize(deserializer)?;
        Self::from_members(members).map_err(serde::de::Error::custom)
    }
}

/// Required members of a key in lexicographic order, as hashed for a thumbprint.
struct ThumbprintInput<'a>(&'a KeyMaterial);

impl Serialize for ThumbprintInput<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Order here is important as this output is hashed
        match self.0 {
            KeyMaterial::EllipticCurve(key) => {
                let mut state = serializer.serialize_struct("JWKThumbprint", 4)?;
                state.serialize_field("crv", &key.curve())?;
                state.serialize_field("kty", "EC")?;
                state.serialize_field("x", &codec::encode(key.x()))?;
                state.serialize_field("y", &codec::encode(key.y()))?;
                state.end()
            }
            KeyMaterial::OctetKeyPair(key) => {
                let mut state = serializer.serialize_struct("JWKThumbprint", 3)?;
                state.serialize_field("crv", &key.curve())?;
                state.serialize_field("kty", "OKP")?;
                state.serialize_field("x", &codec::encode(key.x()))?;
                state.end()
            }
            KeyMaterial::Rsa(key) => {
                let mut state = serializer.serialize_struct("JWKThumbprint", 3)?;
                state.serialize_field("e", &codec::encode(key.e()))?;
                state.serialize_field("kty", "RSA")?;
                state.serialize_field("n", &codec::encode(key.n()))?;
                state.end()
            }
            KeyMaterial::Symmetric(key) => {
                let mut state = serializer.serialize_struct("JWKThumbprint", 2)?;
                state.serialize_field("k", &codec::encode(key.as_bytes()))?;
                state.serialize_field("kty", "oct")?;
                state.end()
            }
        }
    }
}

/// Build an [`EcdsaSigningKey`] backed [`JWK`], the way keys are usually published.
impl TryFrom<&EcdsaSigningKey> for JWK {
    type Error = JoseError;

    fn try_from(key: &EcdsaSigningKey) -> Result<Self, Self::Error> {
        Ok(Self::new(EcKey::try_from(key)?)
            .with_alg(JWA::from(key.curve()).into())
            .with_key_use(JWKUse::Signature))
    }
}
