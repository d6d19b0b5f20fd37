use std::fmt;

use indexmap::IndexMap;
use jiff::Timestamp;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, DeserializeOwned},
};
use serde_json::Value;
use tollgate_error::ErrorContext as _;
use tollgate_utils::macros::generate_set_and_with;

use crate::jose::{JoseError, JoseErrorKind};

pub(super) const ISSUER: &str = "iss";
pub(super) const SUBJECT: &str = "sub";
pub(super) const AUDIENCE: &str = "aud";
pub(super) const EXPIRATION: &str = "exp";
pub(super) const NOT_BEFORE: &str = "nbf";
pub(super) const ISSUED_AT: &str = "iat";
pub(super) const JWT_ID: &str = "jti";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Seconds since the unix epoch, as used by the `exp`, `nbf` and `iat` claims.
///
/// Sub-second precision is dropped. Deserializes from an integer,
/// a float or a numeric string, always serializes as an integer.
pub struct NumericDate(Timestamp);

impl NumericDate {
    /// Create a [`NumericDate`] from seconds since the unix epoch
    pub fn from_seconds(seconds: i64) -> Result<Self, JoseError> {
        Timestamp::from_second(seconds)
            .map(Self)
            .context("numeric date out of range")
            .map_err(JoseError::malformed)
    }

    /// Seconds since the unix epoch
    pub fn as_seconds(&self) -> i64 {
        self.0.as_second()
    }

    /// This date as a [`Timestamp`]
    pub fn timestamp(&self) -> Timestamp {
        self.0
    }
}

impl From<Timestamp> for NumericDate {
    fn from(value: Timestamp) -> Self {
        Self(Timestamp::from_second(value.as_second()).unwrap_or(value))
    }
}

impl fmt::Display for NumericDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_seconds())
    }
}

impl Serialize for NumericDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_seconds())
    }
}

impl<'de> Deserialize<'de> for NumericDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumericDateVisitor)
    }
}

struct NumericDateVisitor;

/// Outside of this range a float no longer fits a jiff timestamp anyway.
const MAX_FLOAT_SECONDS: f64 = 1e15;

impl de::Visitor<'_> for NumericDateVisitor {
    type Value = NumericDate;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("seconds since the unix epoch as number or numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        NumericDate::from_seconds(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let seconds = i64::try_from(v).map_err(E::custom)?;
        self.visit_i64(seconds)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() || v.abs() >= MAX_FLOAT_SECONDS {
            return Err(E::custom(format!("numeric date {v} out of range")));
        }
        self.visit_i64(v.trunc() as i64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        let v = v.trim();
        match v.parse::<i64>() {
            Ok(seconds) => self.visit_i64(seconds),
            Err(_err) => {
                let seconds = v.parse::<f64>().map_err(E::custom)?;
                self.visit_f64(seconds)
            }
        }
    }
}

mod audience {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    pub(super) fn serialize<S: Serializer>(
        audience: &[String],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match audience {
            [single] => serializer.serialize_str(single),
            _ => audience.serialize(serializer),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::One(audience)) => vec![audience],
            Some(Raw::Many(audience)) => audience,
            None => Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Claims set of a JSON Web Token as defined in [`rfc7519`]
///
/// Registered claims have typed accessors, all other claims
/// are kept in insertion order as private claims.
///
/// [`rfc7519`]: https://datatracker.ietf.org/doc/html/rfc7519
pub struct Token {
    #[serde(skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "audience::serialize",
        deserialize_with = "audience::deserialize"
    )]
    aud: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<NumericDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nbf: Option<NumericDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iat: Option<NumericDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
    #[serde(flatten)]
    private: IndexMap<String, Value>,
}

fn accept_claim<T: DeserializeOwned>(name: &str, value: Value) -> Result<T, JoseError> {
    T::deserialize(value).map_err(|err| {
        JoseError::from_display(
            JoseErrorKind::MalformedInput,
            format!("invalid '{name}' claim: {err}"),
        )
    })
}

impl Token {
    /// Create a [`Token`] without claims
    pub fn new() -> Self {
        Self::default()
    }

    /// `iss` claim
    pub fn issuer(&self) -> Option<&str> {
        self.iss.as_deref()
    }

    generate_set_and_with! {
        /// Set the `iss` claim
        pub fn issuer(mut self, issuer: Option<String>) -> Self {
            self.iss = issuer;
            self
        }
    }

    /// `sub` claim
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    generate_set_and_with! {
        /// Set the `sub` claim
        pub fn subject(mut self, subject: Option<String>) -> Self {
            self.sub = subject;
            self
        }
    }

    /// `aud` claim, empty if absent
    pub fn audience(&self) -> &[String] {
        &self.aud
    }

    generate_set_and_with! {
        /// Set the `aud` claim, an empty list removes it
        pub fn audience(mut self, audience: Vec<String>) -> Self {
            self.aud = audience;
            self
        }
    }

    /// `exp` claim
    pub fn expiration(&self) -> Option<NumericDate> {
        self.exp
    }

    generate_set_and_with! {
        /// Set the `exp` claim
        pub fn expiration(mut self, expiration: Option<NumericDate>) -> Self {
            self.exp = expiration;
            self
        }
    }

    /// `nbf` claim
    pub fn not_before(&self) -> Option<NumericDate> {
        self.nbf
    }

    generate_set_and_with! {
        /// Set the `nbf` claim
        pub fn not_before(mut self, not_before: Option<NumericDate>) -> Self {
            self.nbf = not_before;
            self
        }
    }

    /// `iat` claim
    pub fn issued_at(&self) -> Option<NumericDate> {
        self.iat
    }

    generate_set_and_with! {
        /// Set the `iat` claim
        pub fn issued_at(mut self, issued_at: Option<NumericDate>) -> Self {
            self.iat = issued_at;
            self
        }
    }

    /// `jti` claim
    pub fn jwt_id(&self) -> Option<&str> {
        self.jti.as_deref()
    }

    generate_set_and_with! {
        /// Set the `jti` claim
        pub fn jwt_id(mut self, jwt_id: Option<String>) -> Self {
            self.jti = jwt_id;
            self
        }
    }

    /// Claims which are not registered, in insertion order
    pub fn private_claims(&self) -> &IndexMap<String, Value> {
        &self.private
    }

    /// Get any claim by name as a JSON value.
    ///
    /// `aud` is always returned as an array.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            ISSUER => self.iss.clone().map(Value::String),
            SUBJECT => self.sub.clone().map(Value::String),
            AUDIENCE => (!self.aud.is_empty()).then(|| Value::from(self.aud.clone())),
            EXPIRATION => self.exp.map(|date| Value::from(date.as_seconds())),
            NOT_BEFORE => self.nbf.map(|date| Value::from(date.as_seconds())),
            ISSUED_AT => self.iat.map(|date| Value::from(date.as_seconds())),
            JWT_ID => self.jti.clone().map(Value::String),
            _ => self.private.get(name).cloned(),
        }
    }

    /// Set any claim by name.
    ///
    /// Registered claims must have their registered type, `null` removes them.
    pub fn set(&mut self, name: &str, value: Value) -> Result<&mut Self, JoseError> {
        match name {
            ISSUER => self.iss = accept_claim(name, value)?,
            SUBJECT => self.sub = accept_claim(name, value)?,
            AUDIENCE => {
                self.aud = audience::deserialize(value)
                    .context("invalid 'aud' claim")
                    .map_err(JoseError::malformed)?;
            }
            EXPIRATION => self.exp = accept_claim(name, value)?,
            NOT_BEFORE => self.nbf = accept_claim(name, value)?,
            ISSUED_AT => self.iat = accept_claim(name, value)?,
            JWT_ID => self.jti = accept_claim(name, value)?,
            _ => {
                self.private.insert(name.to_owned(), value);
            }
        }
        Ok(self)
    }

    /// Set any claim by name, consuming self
    pub fn try_with(mut self, name: &str, value: Value) -> Result<Self, JoseError> {
        self.set(name, value)?;
        Ok(self)
    }
}
