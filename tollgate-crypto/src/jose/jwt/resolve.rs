use serde_json::Value;
use tracing::debug;

use crate::jose::{JWA, JWK, JWKSet, JoseError, JoseErrorKind, VerifyingKey, jws::Headers};

/// Pick the key of `key_set` which verifies a message with the given protected headers.
///
/// Returns the algorithm from the `alg` header together with the materialized key.
pub(super) fn resolve_key(
    key_set: &JWKSet,
    headers: &Headers,
    use_default_key: bool,
) -> Result<(JWA, VerifyingKey), JoseError> {
    let jwk = select(key_set, headers, use_default_key)?;
    let alg = headers.alg()?;

    if let Some(key_alg) = jwk.alg()
        && key_alg.signature() != Some(alg)
    {
        debug!(%alg, %key_alg, "jwt alg header does not match key alg");
        return Err(JoseError::from_display(
            JoseErrorKind::UnsupportedAlgorithm,
            format!("header alg '{alg}' does not match key alg '{key_alg}'"),
        ));
    }

    Ok((alg, jwk.materialize()?))
}

fn select<'a>(
    key_set: &'a JWKSet,
    headers: &Headers,
    use_default_key: bool,
) -> Result<&'a JWK, JoseError> {
    match headers.get("kid") {
        Some(Value::String(kid)) => {
            let Some(jwk) = key_set.lookup_key_id(kid).next() else {
                debug!(kid, "no key found for jwt kid");
                return Err(JoseError::from_display(
                    JoseErrorKind::KeyNotFound,
                    format!("no key with kid '{kid}'"),
                ));
            };
            debug!(kid, "resolved jwt key by kid");
            Ok(jwk)
        }
        Some(_) => Err(JoseError::from_display(
            JoseErrorKind::MalformedInput,
            "kid header must be a string",
        )),
        None if use_default_key => match key_set.keys() {
            [jwk] => {
                debug!("resolved jwt without kid to the default key");
                Ok(jwk)
            }
            keys => {
                debug!(keys = keys.len(), "no default key for jwt without kid");
                Err(JoseError::from_display(
                    JoseErrorKind::AmbiguousOrMissingKeyID,
                    format!("default key needs a set of one key, got {}", keys.len()),
                ))
            }
        },
        None => Err(JoseError::from_display(
            JoseErrorKind::AmbiguousOrMissingKeyID,
            "token has no kid and no default key is allowed",
        )),
    }
}
