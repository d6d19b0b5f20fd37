use std::{sync::Arc, time::Duration};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tollgate_utils::macros::generate_set_and_with;

use super::{Clock, SystemClock};
use crate::jose::{JWA, JWKSet, JoseError, VerifyingKey, jws::Headers};

#[derive(Debug, Clone, Default)]
/// Options for [`parse`](super::parse)
///
/// Verification mode is picked in this order: key set, explicit
/// algorithm and key, no verification at all.
pub struct ParseOptions {
    pub(super) key_set: Option<JWKSet>,
    pub(super) use_default_key: bool,
    pub(super) verify: Option<(JWA, VerifyingKey)>,
    pub(super) validate: bool,
    pub(super) validate_options: ValidateOptions,
}

impl ParseOptions {
    /// Create [`ParseOptions`] which parse without verifying or validating
    pub fn new() -> Self {
        Self::default()
    }

    generate_set_and_with! {
        /// Verify with the key in this set matching the `kid` of the token
        pub fn key_set(mut self, key_set: Option<JWKSet>) -> Self {
            self.key_set = key_set;
            self
        }
    }

    generate_set_and_with! {
        /// Use the only key of the key set for tokens without `kid`
        pub fn use_default_key(mut self, use_default_key: bool) -> Self {
            self.use_default_key = use_default_key;
            self
        }
    }

    generate_set_and_with! {
        /// Verify with this algorithm and key, ignored if a key set is configured
        pub fn verify(mut self, alg: JWA, key: VerifyingKey) -> Self {
            self.verify = Some((alg, key));
            self
        }
    }

    generate_set_and_with! {
        /// Validate the claims after parsing
        pub fn validation(mut self, validate: bool) -> Self {
            self.validate = validate;
            self
        }
    }

    generate_set_and_with! {
        /// Options used when validation is enabled
        pub fn validate_options(mut self, options: ValidateOptions) -> Self {
            self.validate_options = options;
            self
        }
    }

    /// Options used when validation is enabled
    pub fn validate_options(&self) -> &ValidateOptions {
        &self.validate_options
    }
}

#[derive(Debug, Clone)]
/// Expected claim values and time settings used by [`validate`](super::validate)
pub struct ValidateOptions {
    pub(super) clock: Arc<dyn Clock>,
    pub(super) acceptable_skew: Duration,
    pub(super) issuer: Option<String>,
    pub(super) subject: Option<String>,
    pub(super) audience: Option<String>,
    pub(super) jwt_id: Option<String>,
    pub(super) claims: IndexMap<String, Value>,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            acceptable_skew: Duration::ZERO,
            issuer: None,
            subject: None,
            audience: None,
            jwt_id: None,
            claims: IndexMap::new(),
        }
    }
}

impl ValidateOptions {
    /// Create [`ValidateOptions`] using the system clock and no skew
    pub fn new() -> Self {
        Self::default()
    }

    generate_set_and_with! {
        /// Clock providing the current time
        pub fn clock(mut self, clock: impl Clock) -> Self {
            self.clock = Arc::new(clock);
            self
        }
    }

    generate_set_and_with! {
        /// Clock providing the current time, shared with other users
        pub fn shared_clock(mut self, clock: Arc<dyn Clock>) -> Self {
            self.clock = clock;
            self
        }
    }

    generate_set_and_with! {
        /// Skew allowed on the time claims
        pub fn acceptable_skew(mut self, skew: Duration) -> Self {
            self.acceptable_skew = skew;
            self
        }
    }

    generate_set_and_with! {
        /// Expected `iss` claim
        pub fn issuer(mut self, issuer: Option<String>) -> Self {
            self.issuer = issuer;
            self
        }
    }

    generate_set_and_with! {
        /// Expected `sub` claim
        pub fn subject(mut self, subject: Option<String>) -> Self {
            self.subject = subject;
            self
        }
    }

    generate_set_and_with! {
        /// Audience which must be listed in the `aud` claim
        pub fn audience(mut self, audience: Option<String>) -> Self {
            self.audience = audience;
            self
        }
    }

    generate_set_and_with! {
        /// Expected `jti` claim
        pub fn jwt_id(mut self, jwt_id: Option<String>) -> Self {
            self.jwt_id = jwt_id;
            self
        }
    }

    generate_set_and_with! {
        /// Claim `name` must be present and equal to `value`
        pub fn claim(mut self, name: String, value: impl Into<Value>) -> Self {
            self.claims.insert(name, value.into());
            self
        }
    }

    /// Skew allowed on the time claims
    pub fn acceptable_skew(&self) -> Duration {
        self.acceptable_skew
    }
}

#[derive(Debug, Clone, Default)]
/// Options for [`sign`](super::sign)
pub struct SignOptions {
    pub(super) headers: Headers,
    pub(super) kid: Option<String>,
}

impl SignOptions {
    /// Create empty [`SignOptions`]
    pub fn new() -> Self {
        Self::default()
    }

    generate_set_and_with! {
        /// Extra protected header, `alg` and `typ` are always overwritten
        pub fn header(mut self, name: String, value: impl Serialize) -> Result<Self, JoseError> {
            self.headers.try_set_header(name, value)?;
            Ok(self)
        }
    }

    generate_set_and_with! {
        /// Key id to put in the protected header
        pub fn kid(mut self, kid: Option<String>) -> Self {
            self.kid = kid;
            self
        }
    }

    /// Key id to put in the protected header
    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }
}
