//! JSON Web Token as defined in [`rfc7519`]
//!
//! Tokens are parsed in one of three modes, picked from [`ParseOptions`]:
//!
//! 1. verified with the key of a [`JWKSet`](crate::jose::JWKSet) matching the `kid` header;
//! 2. verified with an explicit algorithm and [`VerifyingKey`](crate::jose::VerifyingKey);
//! 3. not verified at all, in which case a bare JSON claims set is accepted as well.
//!
//! [`rfc7519`]: https://datatracker.ietf.org/doc/html/rfc7519

use std::io::Read;

use tollgate_error::ErrorContext as _;
use tracing::trace;

use crate::jose::{
    JWA, JWK, JoseError, JoseErrorKind, SigningKey,
    jws::{self, JWS, JWSBuilder, JWSCompact, KeySigner, KeyVerifier},
};

mod clock;
mod options;
mod resolve;
mod token;
mod validate;

pub use clock::{Clock, FixedClock, SystemClock};
pub use options::{ParseOptions, SignOptions, ValidateOptions};
pub use token::{NumericDate, Token};
pub use validate::validate;

/// Parse a token from bytes, verifying and validating it as configured in `options`.
pub fn parse(token: &[u8], options: &ParseOptions) -> Result<Token, JoseError> {
    let payload = if let Some(key_set) = &options.key_set {
        trace!(keys = key_set.len(), "parse jwt verified by key set");
        let jws = JWS::parse(token)?;
        let Some(headers) = jws.first_protected_headers()? else {
            return Err(JoseError::from_display(
                JoseErrorKind::SignatureVerificationFailed,
                "jwt has no signature",
            ));
        };
        let (alg, key) = resolve::resolve_key(key_set, &headers, options.use_default_key)?;
        jws.decode(&KeyVerifier::new(alg, &key)?)?.into_payload()
    } else if let Some((alg, key)) = &options.verify {
        trace!(%alg, "parse jwt verified by explicit key");
        jws::verify(token, *alg, key)?
    } else {
        trace!("parse jwt without verification");
        let jws = JWS::parse(token)?;
        if jws.is_empty() {
            token.to_vec()
        } else {
            jws.insecure_payload()?
        }
    };

    let token: Token = serde_json::from_slice(&payload)
        .context("decode jwt claims")
        .map_err(JoseError::malformed)?;

    if options.validate {
        validate(&token, &options.validate_options)?;
    }
    Ok(token)
}

/// Parse a token from a string, see [`parse`]
pub fn parse_str(token: &str, options: &ParseOptions) -> Result<Token, JoseError> {
    parse(token.as_bytes(), options)
}

/// Read a token until the end of `reader` and parse it, see [`parse`]
pub fn parse_reader(mut reader: impl Read, options: &ParseOptions) -> Result<Token, JoseError> {
    let mut token = Vec::new();
    reader
        .read_to_end(&mut token)
        .context("read jwt")
        .map_err(JoseError::malformed)?;
    parse(&token, options)
}

/// Sign `token` with `alg` and `key` into a compact JWS.
///
/// The protected header always contains `alg` and `typ: "JWT"`.
pub fn sign(
    token: &Token,
    alg: JWA,
    key: &SigningKey,
    options: &SignOptions,
) -> Result<String, JoseError> {
    let payload = serde_json::to_vec(token)
        .context("encode jwt claims")
        .map_err(JoseError::malformed)?;

    let mut builder = JWSBuilder::new().with_payload(payload);
    *builder.protected_headers_mut() = options.headers.clone();
    builder
        .protected_headers_mut()
        .try_set_header("typ".to_owned(), "JWT")?;

    let signer = KeySigner::new(alg, key)?.maybe_with_kid(options.kid.clone());
    builder.build_compact(&signer).map(JWSCompact::into_string)
}

/// Sign `token` with a private [`JWK`], copying its `kid` into the header
/// unless `options` already set one.
pub fn sign_with_jwk(
    token: &Token,
    alg: JWA,
    jwk: &JWK,
    options: &SignOptions,
) -> Result<String, JoseError> {
    let key: SigningKey = jwk.materialize()?;
    match (options.kid(), jwk.kid()) {
        (None, Some(kid)) => sign(
            token,
            alg,
            &key,
            &options.clone().with_kid(kid.to_owned()),
        ),
        _ => sign(token, alg, &key, options),
    }
}
