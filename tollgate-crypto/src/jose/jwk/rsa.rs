use std::fmt::{self, Debug};

use aws_lc_rs::{
    encoding::{AsDer, Pkcs8V1Der},
    signature::{RsaKeyPair, RsaPublicKeyComponents},
};
use rustls_pki_types::SubjectPublicKeyInfoDer;
use serde::ser::SerializeMap;
use tollgate_error::ErrorContext as _;
use zeroize::Zeroizing;

use super::{FromJwk, JWK, KeyMaterial, members::Members};
use crate::jose::{
    JoseError, JoseErrorKind, codec,
    der::{self, RsaPrivateKeyFields},
};

#[derive(Clone, PartialEq, Eq)]
/// Key material of an `RSA` key.
///
/// All integers are stored big-endian without leading zeros.
pub struct RsaKey {
    n: Vec<u8>,
    e: Vec<u8>,
    private: Option<RsaPrivateKey>,
}

#[derive(Clone, PartialEq, Eq)]
struct RsaPrivateKey {
    d: Zeroizing<Vec<u8>>,
    p: Zeroizing<Vec<u8>>,
    q: Zeroizing<Vec<u8>>,
    dp: Option<Zeroizing<Vec<u8>>>,
    dq: Option<Zeroizing<Vec<u8>>>,
    qi: Option<Zeroizing<Vec<u8>>>,
}

#[derive(Debug, Clone, Copy, Default)]
/// Private parameters of an RSA key, as given to [`RsaKey::from_parts`].
///
/// Both primes are required, the CRT values are optional.
pub struct RsaPrivateParams<'a> {
    /// private exponent
    pub d: &'a [u8],
    /// first prime factor
    pub p: Option<&'a [u8]>,
    /// second prime factor
    pub q: Option<&'a [u8]>,
    /// first factor CRT exponent
    pub dp: Option<&'a [u8]>,
    /// second factor CRT exponent
    pub dq: Option<&'a [u8]>,
    /// first CRT coefficient
    pub qi: Option<&'a [u8]>,
}

fn integer(name: &str, value: &[u8]) -> Result<Vec<u8>, JoseError> {
    let value = codec::trim_leading_zeros(value);
    if value.is_empty() {
        return Err(JoseError::from_display(
            JoseErrorKind::InvalidKeyMaterial,
            format!("rsa parameter '{name}' is empty"),
        ));
    }
    Ok(value.to_vec())
}

fn secret(name: &str, value: &[u8]) -> Result<Zeroizing<Vec<u8>>, JoseError> {
    integer(name, value).map(Zeroizing::new)
}

fn prime(name: &str, value: Option<&[u8]>) -> Result<Zeroizing<Vec<u8>>, JoseError> {
    let value = value.ok_or_else(|| {
        JoseError::from_display(
            JoseErrorKind::InvalidKeyMaterial,
            format!("rsa private key is missing prime '{name}'"),
        )
    })?;
    secret(name, value)
}

impl RsaKey {
    /// Create a public [`RsaKey`] from its modulus and exponent
    pub fn public(n: &[u8], e: &[u8]) -> Result<Self, JoseError> {
        Self::from_parts(n, e, None)
    }

    /// Create an [`RsaKey`] from its parameters.
    ///
    /// A private key without both primes is refused.
    pub fn from_parts(
        n: &[u8],
        e: &[u8],
        private: Option<RsaPrivateParams<'_>>,
    ) -> Result<Self, JoseError> {
        let private = private
            .map(|params| -> Result<_, JoseError> {
                Ok(RsaPrivateKey {
                    d: secret("d", params.d)?,
                    p: prime("p", params.p)?,
                    q: prime("q", params.q)?,
                    dp: params.dp.map(|v| secret("dp", v)).transpose()?,
                    dq: params.dq.map(|v| secret("dq", v)).transpose()?,
                    qi: params.qi.map(|v| secret("qi", v)).transpose()?,
                })
            })
            .transpose()?;

        Ok(Self {
            n: integer("n", n)?,
            e: integer("e", e)?,
            private,
        })
    }

    /// Modulus
    pub fn n(&self) -> &[u8] {
        &self.n
    }

    /// Public exponent
    pub fn e(&self) -> &[u8] {
        &self.e
    }

    /// Returns true if the private parameters are present
    pub fn is_private(&self) -> bool {
        self.private.is_some()
    }

    /// This key without its private parameters
    pub fn public_key(&self) -> Self {
        Self {
            n: self.n.clone(),
            e: self.e.clone(),
            private: None,
        }
    }

    pub(super) fn from_members(members: &mut Members) -> Result<Self, JoseError> {
        let n = members.require_bytes("n")?;
        let e = members.require_bytes("e")?;

        let d = members.take_secret("d")?;
        let p = members.take_secret("p")?;
        let q = members.take_secret("q")?;
        let dp = members.take_secret("dp")?;
        let dq = members.take_secret("dq")?;
        let qi = members.take_secret("qi")?;

        let private = match d.as_deref() {
            Some(d) => Some(RsaPrivateParams {
                d,
                p: p.as_deref().map(Vec::as_slice),
                q: q.as_deref().map(Vec::as_slice),
                dp: dp.as_deref().map(Vec::as_slice),
                dq: dq.as_deref().map(Vec::as_slice),
                qi: qi.as_deref().map(Vec::as_slice),
            }),
            None if p.is_some() || q.is_some() || dp.is_some() || dq.is_some() || qi.is_some() => {
                return Err(JoseError::from_display(
                    JoseErrorKind::InvalidKeyMaterial,
                    "rsa private parameters without 'd'",
                ));
            }
            None => None,
        };

        Self::from_parts(&n, &e, private)
    }

    pub(super) fn serialize_members<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        map.serialize_entry("n", &codec::encode(&self.n))?;
        map.serialize_entry("e", &codec::encode(&self.e))?;
        if let Some(private) = &self.private {
            map.serialize_entry("d", &codec::encode(&private.d))?;
            map.serialize_entry("p", &codec::encode(&private.p))?;
            map.serialize_entry("q", &codec::encode(&private.q))?;
            for (name, value) in [("dp", &private.dp), ("dq", &private.dq), ("qi", &private.qi)] {
                if let Some(value) = value {
                    map.serialize_entry(name, &codec::encode(value))?;
                }
            }
        }
        Ok(())
    }

    /// PKCS#1 DER of the private key.
    ///
    /// CRT values are optional in a JWK and derived from the primes when absent.
    fn to_pkcs1_der(&self) -> Result<Zeroizing<Vec<u8>>, JoseError> {
        let private = self.private.as_ref().ok_or_else(|| {
            JoseError::incompatible_target("public rsa key cannot be used as a key pair")
        })?;
        let [dp, dq, qi] = match (&private.dp, &private.dq, &private.qi) {
            (Some(dp), Some(dq), Some(qi)) => [dp.clone(), dq.clone(), qi.clone()],
            _ => der::crt_values(&private.d, &private.p, &private.q)?,
        };

        der::encode_rsa_private_key(&RsaPrivateKeyFields {
            n: self.n.as_slice(),
            e: self.e.as_slice(),
            d: private.d.as_slice(),
            p: private.p.as_slice(),
            q: private.q.as_slice(),
            dp: dp.as_slice(),
            dq: dq.as_slice(),
            qi: qi.as_slice(),
        })
    }
}

impl Debug for RsaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKey")
            .field("n", &codec::encode(&self.n))
            .field("e", &codec::encode(&self.e))
            .field("private", &self.is_private())
            .finish()
    }
}

impl TryFrom<&RsaKeyPair> for RsaKey {
    type Error = JoseError;

    fn try_from(key_pair: &RsaKeyPair) -> Result<Self, Self::Error> {
        let pkcs8: Pkcs8V1Der<'static> = key_pair
            .as_der()
            .context("export rsa key pair as pkcs8")
            .map_err(JoseError::invalid_key_material)?;
        let fields = der::decode_rsa_pkcs8(pkcs8.as_ref())?;
        Self::from_parts(
            &fields.n,
            &fields.e,
            Some(RsaPrivateParams {
                d: fields.d.as_slice(),
                p: Some(fields.p.as_slice()),
                q: Some(fields.q.as_slice()),
                dp: Some(fields.dp.as_slice()),
                dq: Some(fields.dq.as_slice()),
                qi: Some(fields.qi.as_slice()),
            }),
        )
    }
}

impl<B> TryFrom<&RsaPublicKeyComponents<B>> for RsaKey
where
    B: AsRef<[u8]> + Debug,
{
    type Error = JoseError;

    fn try_from(components: &RsaPublicKeyComponents<B>) -> Result<Self, Self::Error> {
        Self::public(components.n.as_ref(), components.e.as_ref())
    }
}

pub(super) fn rsa(jwk: &JWK) -> Result<&RsaKey, JoseError> {
    match jwk.key() {
        KeyMaterial::Rsa(key) => Ok(key),
        other => Err(JoseError::incompatible_target(format!(
            "{} key cannot be used as an rsa key",
            other.kty()
        ))),
    }
}

impl FromJwk for RsaKeyPair {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        let der = rsa(jwk)?.to_pkcs1_der()?;
        Self::from_der(&der)
            .context("create rsa key pair from jwk")
            .map_err(JoseError::invalid_key_material)
    }
}

impl FromJwk for RsaPublicKeyComponents<Vec<u8>> {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        let key = rsa(jwk)?;
        Ok(Self {
            n: key.n.clone(),
            e: key.e.clone(),
        })
    }
}

impl FromJwk for SubjectPublicKeyInfoDer<'static> {
    fn from_jwk(jwk: &JWK) -> Result<Self, JoseError> {
        let key = rsa(jwk)?;
        der::encode_subject_public_key_info(&key.n, &key.e).map(Self::from)
    }
}
