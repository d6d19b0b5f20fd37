use std::fmt;
use tollgate_error::{BoxError, OpaqueError};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
/// The kind of failure a [`JoseError`] represents.
///
/// Callers are expected to branch on the kind,
/// e.g. to decide which status to return for a rejected token.
pub enum JoseErrorKind {
    /// Input is not valid JSON, base64 or compact structure.
    MalformedInput,
    /// The algorithm is not registered for signing or verification.
    UnsupportedAlgorithm,
    /// A key of the wrong native type was given to a signer or verifier.
    InvalidKeyType {
        /// Name of the key type the algorithm requires.
        expected: &'static str,
        /// Name of the key type that was given.
        actual: &'static str,
    },
    /// The requested native type cannot hold the key.
    IncompatibleTarget,
    /// Stored bytes cannot form a valid key.
    InvalidKeyMaterial,
    /// A required key is absent or empty.
    MissingKey,
    /// No key in the set matches the key id of the token.
    KeyNotFound,
    /// The token has no key id and no default key could be selected.
    AmbiguousOrMissingKeyID,
    /// None of the signatures could be verified.
    SignatureVerificationFailed,
    /// The named claim did not pass validation.
    ClaimValidationFailed(String),
}

impl fmt::Display for JoseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput => f.write_str("malformed input"),
            Self::UnsupportedAlgorithm => f.write_str("unsupported algorithm"),
            Self::InvalidKeyType { expected, actual } => {
                write!(f, "invalid key type: expected {expected}, got {actual}")
            }
            Self::IncompatibleTarget => f.write_str("incompatible key target"),
            Self::InvalidKeyMaterial => f.write_str("invalid key material"),
            Self::MissingKey => f.write_str("missing key"),
            Self::KeyNotFound => f.write_str("key not found"),
            Self::AmbiguousOrMissingKeyID => f.write_str("ambiguous or missing key id"),
            Self::SignatureVerificationFailed => f.write_str("signature verification failed"),
            Self::ClaimValidationFailed(claim) => write!(f, "'{claim}' claim validation failed"),
        }
    }
}

/// Error returned by all JOSE operations.
///
/// It always carries a [`JoseErrorKind`] and optionally
/// the error that caused it.
pub struct JoseError {
    kind: JoseErrorKind,
    source: Option<BoxError>,
}

impl JoseError {
    /// Create a new [`JoseError`] without a source.
    pub fn new(kind: JoseErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new [`JoseError`] caused by the given error.
    pub fn with_source(kind: JoseErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    /// Create a new [`JoseError`] with a message as its source.
    pub fn from_display(
        kind: JoseErrorKind,
        msg: impl fmt::Display + fmt::Debug + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(kind, OpaqueError::from_display(msg))
    }

    /// Recover a [`JoseError`] from a boxed error,
    /// or wrap it using the provided `kind` if it is of another type.
    pub fn from_boxed(error: BoxError, kind: JoseErrorKind) -> Self {
        match error.downcast::<Self>() {
            Ok(error) => *error,
            Err(error) => match error.downcast::<OpaqueError>() {
                Ok(opaque) => match opaque.downcast::<Self>() {
                    Ok(error) => error,
                    Err(opaque) => Self::with_source(kind, opaque),
                },
                Err(error) => Self::with_source(kind, error),
            },
        }
    }

    pub(crate) fn malformed(source: impl Into<BoxError>) -> Self {
        Self::with_source(JoseErrorKind::MalformedInput, source)
    }

    pub(crate) fn invalid_key_material(source: impl Into<BoxError>) -> Self {
        Self::with_source(JoseErrorKind::InvalidKeyMaterial, source)
    }

    pub(crate) fn incompatible_target(
        msg: impl fmt::Display + fmt::Debug + Send + Sync + 'static,
    ) -> Self {
        Self::from_display(JoseErrorKind::IncompatibleTarget, msg)
    }

    pub(crate) fn invalid_key_type(expected: &'static str, actual: &'static str) -> Self {
        Self::new(JoseErrorKind::InvalidKeyType { expected, actual })
    }

    pub(crate) fn claim(
        claim: impl Into<String>,
        msg: impl fmt::Display + fmt::Debug + Send + Sync + 'static,
    ) -> Self {
        Self::from_display(JoseErrorKind::ClaimValidationFailed(claim.into()), msg)
    }

    /// The [`JoseErrorKind`] of this error.
    pub fn kind(&self) -> &JoseErrorKind {
        &self.kind
    }

    /// Returns true if this error is of the given kind.
    pub fn is(&self, kind: &JoseErrorKind) -> bool {
        &self.kind == kind
    }
}

impl fmt::Debug for JoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoseError")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for JoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {source}", self.kind),
            None => fmt::Display::fmt(&self.kind, f),
        }
    }
}

impl std::error::Error for JoseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}

impl From<JoseErrorKind> for JoseError {
    fn from(kind: JoseErrorKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use tollgate_error::ErrorContext as _;

    #[test]
    fn display_includes_source() {
        let error = JoseError::from_display(JoseErrorKind::MalformedInput, "missing dot");
        assert_eq!("malformed input: missing dot", error.to_string());

        let error = JoseError::new(JoseErrorKind::SignatureVerificationFailed);
        assert_eq!("signature verification failed", error.to_string());
    }

    #[test]
    fn claim_failure_names_the_claim() {
        let error = JoseError::claim("exp", "exp not satisfied");
        assert_eq!(
            &JoseErrorKind::ClaimValidationFailed("exp".to_owned()),
            error.kind()
        );
        assert_eq!(
            "'exp' claim validation failed: exp not satisfied",
            error.to_string()
        );
    }

    #[test]
    fn from_boxed_keeps_original_kind() {
        let boxed: BoxError = Box::new(JoseError::new(JoseErrorKind::KeyNotFound));
        let error = JoseError::from_boxed(boxed, JoseErrorKind::MalformedInput);
        assert!(error.is(&JoseErrorKind::KeyNotFound));

        let boxed: BoxError = Box::new(OpaqueError::from_std(JoseError::new(
            JoseErrorKind::MissingKey,
        )));
        let error = JoseError::from_boxed(boxed, JoseErrorKind::MalformedInput);
        assert!(error.is(&JoseErrorKind::MissingKey));

        let boxed: BoxError = Box::new(OpaqueError::from_display("boom"));
        let error = JoseError::from_boxed(boxed, JoseErrorKind::MalformedInput);
        assert!(error.is(&JoseErrorKind::MalformedInput));
    }

    #[test]
    fn source_is_the_context() {
        let error = JoseError::malformed("x".parse::<u8>().context("parse header").unwrap_err());
        let source = error.source().unwrap();
        assert_eq!("parse header: invalid digit found in string", source.to_string());
        assert!(source.source().unwrap().is::<std::num::ParseIntError>());
    }
}
