use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tollgate_error::ErrorContext as _;

use super::JWK;
use crate::jose::JoseError;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
/// [`JWKSet`] as defined in section 5 of [`rfc7517`]
///
/// Keys keep the order in which they were added, key ids are not required to be unique.
///
/// [`rfc7517`]: https://datatracker.ietf.org/doc/html/rfc7517
pub struct JWKSet {
    keys: Vec<JWK>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSet {
    Set { keys: Vec<IndexMap<String, Value>> },
    Single(IndexMap<String, Value>),
}

impl JWKSet {
    /// Create an empty [`JWKSet`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a [`JWKSet`], a single [`JWK`] object is accepted as a set of one.
    pub fn parse(json: &[u8]) -> Result<Self, JoseError> {
        let raw: RawSet = serde_json::from_slice(json)
            .context("decode jwk set json")
            .map_err(JoseError::malformed)?;
        let keys = match raw {
            RawSet::Set { keys } => keys
                .into_iter()
                .map(JWK::from_members)
                .collect::<Result<_, _>>()?,
            RawSet::Single(members) => vec![JWK::from_members(members)?],
        };
        Ok(Self { keys })
    }

    /// Parse a [`JWKSet`] from a string, see [`JWKSet::parse`]
    pub fn parse_str(json: &str) -> Result<Self, JoseError> {
        Self::parse(json.as_bytes())
    }

    /// Append a key to the set
    pub fn push(&mut self, key: JWK) {
        self.keys.push(key);
    }

    /// Append a key to the set
    #[must_use]
    pub fn with_key(mut self, key: JWK) -> Self {
        self.keys.push(key);
        self
    }

    /// All keys of this set, in order
    pub fn keys(&self) -> &[JWK] {
        &self.keys
    }

    /// Number of keys in this set
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if this set has no keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// All keys with the given key id, in set order
    pub fn lookup_key_id<'a>(&'a self, kid: &str) -> impl Iterator<Item = &'a JWK> {
        self.keys.iter().filter(move |key| key.kid() == Some(kid))
    }

    /// The set to publish: the public counterpart of every key,
    /// symmetric keys are left out.
    pub fn public_keys(&self) -> Result<Self, JoseError> {
        let keys = self
            .keys
            .iter()
            .filter(|key| !matches!(key.key(), super::KeyMaterial::Symmetric(_)))
            .map(JWK::public_key)
            .collect::<Result<_, _>>()?;
        Ok(Self { keys })
    }
}

impl FromIterator<JWK> for JWKSet {
    fn from_iter<T: IntoIterator<Item = JWK>>(iter: T) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for JWKSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Keys {
            keys: Vec<JWK>,
        }

        Keys::deserialize(deserializer).map(|Keys { keys }| Self { keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jose::{JoseErrorKind, SymmetricKey, codec};
    use aws_lc_rs::signature::Ed25519KeyPair;
    use serde_json::json;

    fn oct(kid: &str, secret: &[u8]) -> JWK {
        JWK::from(SymmetricKey::new(secret.to_vec()).unwrap()).with_kid(kid.to_owned())
    }

    #[test]
    fn lookup_in_set_order() {
        let set: JWKSet = [oct("a", b"first"), oct("a", b"second"), oct("b", b"third")]
            .into_iter()
            .collect();

        let found: Vec<Vec<u8>> = set
            .lookup_key_id("a")
            .map(|key| key.materialize().unwrap())
            .collect();
        assert_eq!(vec![b"first".to_vec(), b"second".to_vec()], found);
        assert_eq!(1, set.lookup_key_id("b").count());
        assert_eq!(0, set.lookup_key_id("c").count());
    }

    #[test]
    fn parse_set_or_single_key() {
        let key = json!({
            "kty": "oct",
            "use": "sig",
            "kid": "default",
            "k": "MWNhZjc2YV4xJWE0QjU2NTYqNCZmYzIoYjAxMzVjMmU=",
            "alg": "HS256",
        });

        let set = JWKSet::parse(key.to_string().as_bytes()).unwrap();
        assert_eq!(1, set.len());
        let secret: Vec<u8> = set.keys()[0].materialize().unwrap();
        assert_eq!(b"1caf76a^1%a4B5656*4&fc2(b0135c2e".to_vec(), secret);

        let set = JWKSet::parse_str(&json!({"keys": [key, key]}).to_string()).unwrap();
        assert_eq!(2, set.len());
        assert_eq!(2, set.lookup_key_id("default").count());

        let set: JWKSet = serde_json::from_value(json!({"keys": [key]})).unwrap();
        assert_eq!(1, set.len());
    }

    #[test]
    fn parse_errors_keep_their_kind() {
        let err = JWKSet::parse(b"[1, 2]").unwrap_err();
        assert!(err.is(&JoseErrorKind::MalformedInput));

        let err = JWKSet::parse_str(r#"{"keys":[{"kty":"oct","k":""}]}"#).unwrap_err();
        assert!(err.is(&JoseErrorKind::InvalidKeyMaterial));

        let err = JWKSet::parse_str(r#"{"keys":[{"kty":"XYZ"}]}"#).unwrap_err();
        assert!(err.is(&JoseErrorKind::MalformedInput));
    }

    #[test]
    fn extra_parameters_keep_order() {
        let set = JWKSet::parse_str(
            r#"{"keys":[{"kty":"oct","k":"AQAB","zeta":"z","alpha":"a","mid":1}]}"#,
        )
        .unwrap();
        let names: Vec<&str> = set.keys()[0].extra().keys().map(String::as_str).collect();
        assert_eq!(vec!["zeta", "alpha", "mid"], names);
    }

    #[test]
    fn public_keys_drop_secrets() {
        let key_pair = Ed25519KeyPair::generate().unwrap();
        let set = JWKSet::new()
            .with_key(oct("hmac", b"secret"))
            .with_key(JWK::try_from(&crate::jose::SigningKey::from(key_pair)).unwrap());

        let public = set.public_keys().unwrap();
        assert_eq!(1, public.len());
        assert!(!public.keys()[0].is_private());

        let json = serde_json::to_value(&public).unwrap();
        assert!(json["keys"][0].get("d").is_none());
        assert_eq!(
            32,
            codec::decode(json["keys"][0]["x"].as_str().unwrap())
                .unwrap()
                .len()
        );
    }
}
