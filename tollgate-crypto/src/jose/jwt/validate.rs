use tracing::debug;

use super::{
    Token, ValidateOptions,
    token::{AUDIENCE, EXPIRATION, ISSUED_AT, ISSUER, JWT_ID, NOT_BEFORE, SUBJECT},
};
use crate::jose::JoseError;

/// Validate the claims of `token`.
///
/// Time claims are compared in whole seconds, widened by the acceptable skew.
/// The first failing claim is reported as
/// [`JoseErrorKind::ClaimValidationFailed`](crate::jose::JoseErrorKind::ClaimValidationFailed).
pub fn validate(token: &Token, options: &ValidateOptions) -> Result<(), JoseError> {
    validate_claims(token, options).inspect_err(|err| {
        debug!(%err, "jwt claim validation failed");
    })
}

fn validate_claims(token: &Token, options: &ValidateOptions) -> Result<(), JoseError> {
    expect_equal(ISSUER, token.issuer(), options.issuer.as_deref())?;
    expect_equal(SUBJECT, token.subject(), options.subject.as_deref())?;
    expect_equal(JWT_ID, token.jwt_id(), options.jwt_id.as_deref())?;

    if let Some(audience) = options.audience.as_deref()
        && !token.audience().iter().any(|aud| aud == audience)
    {
        return Err(JoseError::claim(AUDIENCE, "audience not listed"));
    }

    let now = options.clock.now().as_second();
    let skew = i64::try_from(options.acceptable_skew.as_secs()).unwrap_or(i64::MAX);

    if let Some(exp) = token.expiration()
        && now > exp.as_seconds().saturating_add(skew)
    {
        return Err(JoseError::claim(EXPIRATION, "token is expired"));
    }
    if let Some(nbf) = token.not_before()
        && now.saturating_add(skew) < nbf.as_seconds()
    {
        return Err(JoseError::claim(NOT_BEFORE, "token is not valid yet"));
    }
    if let Some(iat) = token.issued_at()
        && now.saturating_add(skew) < iat.as_seconds()
    {
        return Err(JoseError::claim(ISSUED_AT, "token is issued in the future"));
    }

    for (name, expected) in &options.claims {
        if token.get(name).as_ref() != Some(expected) {
            return Err(JoseError::claim(name.as_str(), "value mismatch"));
        }
    }

    Ok(())
}

fn expect_equal(claim: &str, actual: Option<&str>, expected: Option<&str>) -> Result<(), JoseError> {
    match (expected, actual) {
        (None, _) => Ok(()),
        (Some(expected), Some(actual)) if expected == actual => Ok(()),
        (Some(_), Some(_)) => Err(JoseError::claim(claim, "value mismatch")),
        (Some(_), None) => Err(JoseError::claim(claim, "claim is missing")),
    }
}
