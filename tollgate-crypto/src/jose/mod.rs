//! # JOSE: JSON Object Signing and Encryption
//!
//! The signing half of the JOSE framework, as needed to authenticate bearer tokens:
//!
//! * JWK (JSON Web Key): a JSON format for cryptographic keys, here covering
//!   symmetric, RSA, elliptic curve and octet key pair keys. A [`JWK`] can be
//!   materialized into the native key types of `aws-lc-rs` and built back from them.
//!   See [`rfc7517`] for more details.
//!
//! * JWA (JSON Web Algorithm): the signature algorithms identified by the `alg`
//!   header. Every supported [`JWA`] is registered with an [`AlgorithmSigner`] and
//!   [`AlgorithmVerifier`]. See [`rfc7518`] for more details.
//!
//! * JWS (JSON Web Signature): signs any payload, serialized in compact or JSON form.
//!   See [`jws`] and [`rfc7515`].
//!
//! * JWT (JSON Web Token): a JSON claims set carried in a JWS, with key resolution
//!   from a [`JWKSet`] and claim validation. See [`jwt`] and [`rfc7519`].
//!
//! [`rfc7515`]: https://datatracker.ietf.org/doc/html/rfc7515
//! [`rfc7517`]: https://datatracker.ietf.org/doc/html/rfc7517
//! [`rfc7518`]: https://datatracker.ietf.org/doc/html/rfc7518
//! [`rfc7519`]: https://datatracker.ietf.org/doc/html/rfc7519

pub mod codec;

mod der;

mod error;
pub use error::{JoseError, JoseErrorKind};

mod native;
pub use native::{
    EcPublicKey, EcdsaSigningKey, Ed25519PublicKey, SigningKey, VerifyingKey, X25519PublicKey,
};

mod jwa;
pub use jwa::{AlgorithmSigner, AlgorithmVerifier, JWA};

mod jwk;
pub use jwk::{
    Accept, CertificateChain, EcKey, FromJwk, JWK, JWKAlgorithm, JWKEllipticCurves, JWKKeyOperation,
    JWKOkpCurves, JWKSet, JWKUse, KeyMaterial, OkpKey, ParameterValue, RsaKey, RsaPrivateParams,
    SymmetricKey, ThumbprintHash,
};

pub mod jws;
pub use jws::{JWS, JWSCompact, JWSFlattened};

pub mod jwt;
pub use jwt::Token;
