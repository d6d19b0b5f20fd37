use indexmap::IndexMap;
use serde_json::Value;
use zeroize::Zeroizing;

use super::Accept;
use crate::jose::{JoseError, JoseErrorKind, codec};

/// Members of a JSON object being decoded into a JWK.
///
/// Every consumed member is removed, what remains
/// ends up as extra parameters.
pub(super) struct Members(IndexMap<String, Value>);

impl Members {
    pub(super) fn new(members: IndexMap<String, Value>) -> Self {
        Self(members)
    }

    pub(super) fn take<T: Accept>(&mut self, name: &str) -> Result<Option<T>, JoseError> {
        self.0
            .shift_remove(name)
            .map(|value| {
                T::accept(&value).map_err(|err| {
                    JoseError::with_source(err.kind().clone(), format!("member '{name}': {err}"))
                })
            })
            .transpose()
    }

    pub(super) fn require<T: Accept>(&mut self, name: &str) -> Result<T, JoseError> {
        self.take(name)?.ok_or_else(|| missing(name))
    }

    pub(super) fn take_bytes(&mut self, name: &str) -> Result<Option<Vec<u8>>, JoseError> {
        self.take::<String>(name)?
            .map(codec::decode)
            .transpose()
    }

    pub(super) fn require_bytes(&mut self, name: &str) -> Result<Vec<u8>, JoseError> {
        self.take_bytes(name)?.ok_or_else(|| missing(name))
    }

    pub(super) fn take_secret(
        &mut self,
        name: &str,
    ) -> Result<Option<Zeroizing<Vec<u8>>>, JoseError> {
        Ok(self.take_bytes(name)?.map(Zeroizing::new))
    }

    pub(super) fn require_secret(&mut self, name: &str) -> Result<Zeroizing<Vec<u8>>, JoseError> {
        self.take_secret(name)?.ok_or_else(|| missing(name))
    }

    pub(super) fn into_inner(self) -> IndexMap<String, Value> {
        self.0
    }
}

fn missing(name: &str) -> JoseError {
    JoseError::from_display(
        JoseErrorKind::MalformedInput,
        format!("missing required member '{name}'"),
    )
}
