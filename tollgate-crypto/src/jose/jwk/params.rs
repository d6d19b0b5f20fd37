use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Number, Value};

use crate::jose::{JWA, JoseError, JoseErrorKind};

/// Validated assignment of a JWK parameter from a dynamic JSON value.
///
/// Values outside the closed set of the parameter are refused
/// with [`JoseErrorKind::MalformedInput`].
pub trait Accept: Sized {
    /// Accept `value` as `Self`
    fn accept(value: &Value) -> Result<Self, JoseError>;
}

fn accept_with_serde<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T, JoseError> {
    T::deserialize(value).map_err(|err| {
        JoseError::from_display(
            JoseErrorKind::MalformedInput,
            format!("unacceptable {what} value: {err}"),
        )
    })
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
/// [`JWKUse`] identifies the intended use of the public key
pub enum JWKUse {
    #[serde(rename = "sig")]
    /// Signature or MAC verification
    Signature,
    #[serde(rename = "enc")]
    /// Encryption
    Encryption,
}

impl JWKUse {
    /// Value as used in the `use` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signature => "sig",
            Self::Encryption => "enc",
        }
    }
}

impl fmt::Display for JWKUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Accept for JWKUse {
    fn accept(value: &Value) -> Result<Self, JoseError> {
        accept_with_serde(value, "use")
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
/// Operation a key is intended for, as listed in the `key_ops` parameter
pub enum JWKKeyOperation {
    /// compute digital signature or MAC
    Sign,
    /// verify digital signature or MAC
    Verify,
    /// encrypt content
    Encrypt,
    /// decrypt content and validate decryption, if applicable
    Decrypt,
    /// encrypt key
    WrapKey,
    /// decrypt key and validate decryption, if applicable
    UnwrapKey,
    /// derive key
    DeriveKey,
    /// derive bits not to be used as a key
    DeriveBits,
}

impl Accept for JWKKeyOperation {
    fn accept(value: &Value) -> Result<Self, JoseError> {
        accept_with_serde(value, "key_ops")
    }
}

impl Accept for Vec<JWKKeyOperation> {
    fn accept(value: &Value) -> Result<Self, JoseError> {
        let Value::Array(values) = value else {
            return Err(JoseError::from_display(
                JoseErrorKind::MalformedInput,
                "key_ops must be an array",
            ));
        };
        values.iter().map(JWKKeyOperation::accept).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `alg` parameter of a JWK.
///
/// Key sets publish signing keys next to encryption keys,
/// so algorithms outside of [`JWA`] are kept by name.
pub enum JWKAlgorithm {
    /// A signature or MAC algorithm
    Signature(JWA),
    /// Any other algorithm, e.g. `RSA-OAEP`
    Other(String),
}

impl JWKAlgorithm {
    /// The signature algorithm, if this is one
    pub fn signature(&self) -> Option<JWA> {
        match self {
            Self::Signature(alg) => Some(*alg),
            Self::Other(_) => None,
        }
    }

    /// Value as used in the `alg` parameter
    pub fn as_str(&self) -> &str {
        match self {
            Self::Signature(alg) => alg.as_str(),
            Self::Other(name) => name,
        }
    }
}

impl From<JWA> for JWKAlgorithm {
    fn from(alg: JWA) -> Self {
        Self::Signature(alg)
    }
}

impl fmt::Display for JWKAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JWKAlgorithm {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl Accept for JWKAlgorithm {
    fn accept(value: &Value) -> Result<Self, JoseError> {
        let name = String::accept(value)?;
        Ok(match name.parse::<JWA>() {
            Ok(alg) => Self::Signature(alg),
            Err(_) => Self::Other(name),
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
/// Value of a JWK parameter without a dedicated field
pub enum ParameterValue {
    String(String),
    Number(Number),
    Bool(bool),
    StringList(Vec<String>),
}

impl Accept for ParameterValue {
    fn accept(value: &Value) -> Result<Self, JoseError> {
        accept_with_serde(value, "parameter")
    }
}

impl Accept for String {
    fn accept(value: &Value) -> Result<Self, JoseError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(JoseError::from_display(
                JoseErrorKind::MalformedInput,
                format!("expected a string, got {value}"),
            )),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for ParameterValue {
    fn from(value: Vec<String>) -> Self {
        Self::StringList(value)
    }
}
