//! Native key values handed to the signature primitives.
//!
//! [`SigningKey`] and [`VerifyingKey`] are the only key parameters
//! accepted by [`AlgorithmSigner`] and [`AlgorithmVerifier`]. Each variant
//! wraps one `aws-lc-rs` key type; which variant an algorithm expects is
//! checked at call time.
//!
//! [`AlgorithmSigner`]: crate::jose::AlgorithmSigner
//! [`AlgorithmVerifier`]: crate::jose::AlgorithmVerifier

use std::fmt;

use aws_lc_rs::{
    pkcs8::Document,
    signature::{EcdsaKeyPair, Ed25519KeyPair, KeyPair as _, RsaKeyPair, RsaPublicKeyComponents},
};
use tollgate_error::ErrorContext as _;
use zeroize::Zeroizing;

use super::{JWKEllipticCurves, JoseError, JoseErrorKind};

/// Uncompressed SEC1 point prefix
const SEC1_UNCOMPRESSED: u8 = 0x04;

/// Length of Ed25519 and X25519 public keys and seeds.
pub(crate) const CURVE25519_KEY_LEN: usize = 32;

/// A private or secret key able to produce signatures.
pub enum SigningKey {
    /// Shared secret used by the HMAC algorithms.
    Octets(Zeroizing<Vec<u8>>),
    /// RSA private key used by the `RS*` and `PS*` algorithms.
    Rsa(RsaKeyPair),
    /// ECDSA private key used by the `ES*` algorithms.
    Ecdsa(EcdsaSigningKey),
    /// Ed25519 private key used by `EdDSA`.
    Ed25519(Ed25519KeyPair),
}

impl SigningKey {
    /// Create a [`SigningKey`] for HMAC from the given secret.
    pub fn octets(secret: impl Into<Vec<u8>>) -> Self {
        Self::Octets(Zeroizing::new(secret.into()))
    }

    /// Human readable name of the key type, as used in [`JoseErrorKind::InvalidKeyType`].
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Octets(_) => "octets",
            Self::Rsa(_) => "rsa private key",
            Self::Ecdsa(_) => "ecdsa private key",
            Self::Ed25519(_) => "ed25519 private key",
        }
    }

    /// Derive the [`VerifyingKey`] matching this key.
    pub fn verifying_key(&self) -> Result<VerifyingKey, JoseError> {
        Ok(match self {
            Self::Octets(secret) => VerifyingKey::Octets(secret.clone()),
            Self::Rsa(key) => {
                let public_key = key.public_key();
                VerifyingKey::Rsa(RsaPublicKeyComponents {
                    n: public_key
                        .modulus()
                        .big_endian_without_leading_zero()
                        .to_vec(),
                    e: public_key
                        .exponent()
                        .big_endian_without_leading_zero()
                        .to_vec(),
                })
            }
            Self::Ecdsa(key) => VerifyingKey::Ecdsa(EcPublicKey::from_sec1(
                key.curve,
                key.key_pair.public_key().as_ref(),
            )?),
            Self::Ed25519(key) => {
                VerifyingKey::Ed25519(Ed25519PublicKey::try_from(key.public_key().as_ref())?)
            }
        })
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Octets(_) => f.write_str("SigningKey::Octets(..)"),
            Self::Rsa(key) => f.debug_tuple("SigningKey::Rsa").field(key).finish(),
            Self::Ecdsa(key) => f.debug_tuple("SigningKey::Ecdsa").field(key).finish(),
            Self::Ed25519(key) => f.debug_tuple("SigningKey::Ed25519").field(key).finish(),
        }
    }
}

impl From<RsaKeyPair> for SigningKey {
    fn from(key: RsaKeyPair) -> Self {
        Self::Rsa(key)
    }
}

impl From<EcdsaSigningKey> for SigningKey {
    fn from(key: EcdsaSigningKey) -> Self {
        Self::Ecdsa(key)
    }
}

impl From<Ed25519KeyPair> for SigningKey {
    fn from(key: Ed25519KeyPair) -> Self {
        Self::Ed25519(key)
    }
}

/// An [`EcdsaKeyPair`] together with the curve it was created for.
///
/// The key pair must have been created with the fixed width signing algorithm
/// of its curve, e.g. `ECDSA_P256_SHA256_FIXED_SIGNING`, as JWS signatures are `r || s`.
#[derive(Debug)]
pub struct EcdsaSigningKey {
    curve: JWKEllipticCurves,
    key_pair: EcdsaKeyPair,
}

impl EcdsaSigningKey {
    /// Create a new [`EcdsaSigningKey`], the key pair must belong to `curve`.
    pub fn new(curve: JWKEllipticCurves, key_pair: EcdsaKeyPair) -> Result<Self, JoseError> {
        if key_pair.public_key().as_ref().len() != 1 + 2 * curve.coordinate_len() {
            return Err(JoseError::from_display(
                JoseErrorKind::InvalidKeyMaterial,
                format!("ecdsa key pair does not belong to curve {curve}"),
            ));
        }
        Ok(Self { curve, key_pair })
    }

    /// Create a new [`EcdsaSigningKey`] from the given pkcs8 der
    pub fn from_pkcs8_der(curve: JWKEllipticCurves, pkcs8_der: &[u8]) -> Result<Self, JoseError> {
        let key_pair = EcdsaKeyPair::from_pkcs8(curve.signing_algorithm(), pkcs8_der)
            .context("create EcdsaKeyPair from pkcs8")
            .map_err(JoseError::invalid_key_material)?;
        Self::new(curve, key_pair)
    }

    /// Create pkcs8 der for the current [`EcdsaKeyPair`]
    pub fn pkcs8_der(&self) -> Result<Document, JoseError> {
        self.key_pair
            .to_pkcs8v1()
            .context("create pkcs8 der from keypair")
            .map_err(JoseError::invalid_key_material)
    }

    /// Curve of this key
    pub fn curve(&self) -> JWKEllipticCurves {
        self.curve
    }

    /// Reference to the inner [`EcdsaKeyPair`]
    pub fn key_pair(&self) -> &EcdsaKeyPair {
        &self.key_pair
    }
}

/// A public or secret key able to verify signatures.
pub enum VerifyingKey {
    /// Shared secret used by the HMAC algorithms.
    Octets(Zeroizing<Vec<u8>>),
    /// RSA public key used by the `RS*` and `PS*` algorithms.
    Rsa(RsaPublicKeyComponents<Vec<u8>>),
    /// ECDSA public key used by the `ES*` algorithms.
    Ecdsa(EcPublicKey),
    /// Ed25519 public key used by `EdDSA`.
    Ed25519(Ed25519PublicKey),
}

impl VerifyingKey {
    /// Create a [`VerifyingKey`] for HMAC from the given secret.
    pub fn octets(secret: impl Into<Vec<u8>>) -> Self {
        Self::Octets(Zeroizing::new(secret.into()))
    }

    /// Human readable name of the key type, as used in [`JoseErrorKind::InvalidKeyType`].
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Octets(_) => "octets",
            Self::Rsa(_) => "rsa public key",
            Self::Ecdsa(_) => "ecdsa public key",
            Self::Ed25519(_) => "ed25519 public key",
        }
    }
}

impl Clone for VerifyingKey {
    fn clone(&self) -> Self {
        match self {
            Self::Octets(secret) => Self::Octets(secret.clone()),
            Self::Rsa(key) => Self::Rsa(RsaPublicKeyComponents {
                n: key.n.clone(),
                e: key.e.clone(),
            }),
            Self::Ecdsa(key) => Self::Ecdsa(key.clone()),
            Self::Ed25519(key) => Self::Ed25519(key.clone()),
        }
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Octets(_) => f.write_str("VerifyingKey::Octets(..)"),
            Self::Rsa(key) => f.debug_tuple("VerifyingKey::Rsa").field(key).finish(),
            Self::Ecdsa(key) => f.debug_tuple("VerifyingKey::Ecdsa").field(key).finish(),
            Self::Ed25519(key) => f.debug_tuple("VerifyingKey::Ed25519").field(key).finish(),
        }
    }
}

impl From<RsaPublicKeyComponents<Vec<u8>>> for VerifyingKey {
    fn from(key: RsaPublicKeyComponents<Vec<u8>>) -> Self {
        Self::Rsa(key)
    }
}

impl From<EcPublicKey> for VerifyingKey {
    fn from(key: EcPublicKey) -> Self {
        Self::Ecdsa(key)
    }
}

impl From<Ed25519PublicKey> for VerifyingKey {
    fn from(key: Ed25519PublicKey) -> Self {
        Self::Ed25519(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An elliptic curve public key, stored as an uncompressed SEC1 point.
///
/// The point is only checked to be on the curve once it is used to verify.
pub struct EcPublicKey {
    curve: JWKEllipticCurves,
    point: Vec<u8>,
}

impl EcPublicKey {
    /// Create an [`EcPublicKey`] from its fixed width coordinates.
    pub fn from_coordinates(
        curve: JWKEllipticCurves,
        x: &[u8],
        y: &[u8],
    ) -> Result<Self, JoseError> {
        let len = curve.coordinate_len();
        if x.len() != len || y.len() != len {
            return Err(JoseError::from_display(
                JoseErrorKind::InvalidKeyMaterial,
                format!("{curve} coordinates must be {len} bytes"),
            ));
        }

        let mut point = Vec::with_capacity(1 + 2 * len);
        point.push(SEC1_UNCOMPRESSED);
        point.extend_from_slice(x);
        point.extend_from_slice(y);
        Ok(Self { curve, point })
    }

    /// Create an [`EcPublicKey`] from an uncompressed SEC1 point.
    pub fn from_sec1(curve: JWKEllipticCurves, point: &[u8]) -> Result<Self, JoseError> {
        match point.split_first() {
            Some((&SEC1_UNCOMPRESSED, coordinates))
                if coordinates.len() == 2 * curve.coordinate_len() =>
            {
                Ok(Self {
                    curve,
                    point: point.to_vec(),
                })
            }
            _ => Err(JoseError::from_display(
                JoseErrorKind::InvalidKeyMaterial,
                format!("not an uncompressed {curve} point"),
            )),
        }
    }

    /// Curve of this key
    pub fn curve(&self) -> JWKEllipticCurves {
        self.curve
    }

    /// The uncompressed SEC1 point: `0x04 || x || y`
    pub fn as_sec1(&self) -> &[u8] {
        &self.point
    }

    /// The x coordinate
    pub fn x(&self) -> &[u8] {
        let len = self.curve.coordinate_len();
        &self.point[1..=len]
    }

    /// The y coordinate
    pub fn y(&self) -> &[u8] {
        let len = self.curve.coordinate_len();
        &self.point[1 + len..]
    }
}

macro_rules! curve25519_public_key {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name([u8; CURVE25519_KEY_LEN]);

        impl $name {
            /// Raw public key bytes
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = JoseError;

            fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
                value.try_into().map(Self).map_err(|_err| {
                    JoseError::from_display(
                        JoseErrorKind::InvalidKeyMaterial,
                        concat!($label, " public key must be 32 bytes"),
                    )
                })
            }
        }
    };
}

curve25519_public_key! {
    /// An Ed25519 public key
    Ed25519PublicKey, "ed25519"
}

curve25519_public_key! {
    /// An X25519 public key, usable for key agreement only
    X25519PublicKey, "x25519"
}
