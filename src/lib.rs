//! Tollgate is a JOSE core for bearer token authentication, written in Rust.
//!
//! It covers the pieces needed to check a signed token against a key set:
//!
//! | category | support list |
//! |-|-|
//! | keys ([`jose::JWK`]) | `oct` ⸱ `RSA` ⸱ `EC` (P-256, P-384, P-521) ⸱ `OKP` (Ed25519, X25519) ⸱ key sets ⸱ thumbprints |
//! | algorithms ([`jose::JWA`]) | `HS*` ⸱ `RS*` ⸱ `PS*` ⸱ `ES*` ⸱ `EdDSA` |
//! | signatures ([`jose::jws`]) | compact ⸱ flattened JSON ⸱ general JSON ⸱ multiple signatures |
//! | tokens ([`jose::jwt`]) | key resolution by `kid` ⸱ claim validation ⸱ pluggable clock |
//!
//! HTTP handling, JWE and key generation are out of scope.
//!
//! # Example
//!
//! ```
//! use tollgate::jose::{
//!     JWA, JWK, JWKSet, SymmetricKey,
//!     jwt::{self, ParseOptions, SignOptions, Token},
//! };
//!
//! let jwk = JWK::new(SymmetricKey::new(b"my secret".to_vec()).unwrap())
//!     .with_kid("main".to_owned());
//!
//! let token = Token::new().with_subject("1".to_owned());
//! let signed = jwt::sign_with_jwk(&token, JWA::HS256, &jwk, &SignOptions::new()).unwrap();
//!
//! let options = ParseOptions::new().with_key_set(JWKSet::new().with_key(jwk));
//! let parsed = jwt::parse_str(&signed, &options).unwrap();
//! assert_eq!(Some("1"), parsed.subject());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(test, allow(clippy::float_cmp))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

pub mod error {
    //! Error utilities for tollgate, see [`tollgate_error`].

    #[doc(inline)]
    pub use tollgate_error::*;
}

pub mod utils {
    //! Utilities shared by the tollgate crates, see [`tollgate_utils`].

    #[doc(inline)]
    pub use tollgate_utils::*;
}

#[doc(inline)]
pub use tollgate_crypto::{dep, jose};
