use rustls_pki_types::CertificateDer;
use serde::{Serialize, Serializer, ser::SerializeSeq};
use serde_json::Value;

use super::Accept;
use crate::jose::{JoseError, JoseErrorKind, codec};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// The `x5c` parameter: an X.509 certificate chain, leaf first.
///
/// Each certificate is parsed when it is added. The chain is
/// serialized as standard, padded base64 DER, not base64url.
pub struct CertificateChain(Vec<CertificateDer<'static>>);

impl CertificateChain {
    /// Create an empty [`CertificateChain`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a certificate to the chain
    pub fn push(&mut self, certificate: CertificateDer<'static>) -> Result<(), JoseError> {
        let (rest, _) = x509_parser::parse_x509_certificate(certificate.as_ref()).map_err(|err| {
            JoseError::from_display(
                JoseErrorKind::MalformedInput,
                format!("x5c: invalid certificate: {err}"),
            )
        })?;
        if !rest.is_empty() {
            return Err(JoseError::from_display(
                JoseErrorKind::MalformedInput,
                "x5c: trailing data after certificate",
            ));
        }
        self.0.push(certificate);
        Ok(())
    }

    /// Append a certificate given as (standard) base64 DER
    pub fn push_base64(&mut self, encoded: &str) -> Result<(), JoseError> {
        let der = codec::decode(encoded)?;
        self.push(CertificateDer::from(der))
    }

    /// The certificates in this chain
    pub fn certificates(&self) -> &[CertificateDer<'static>] {
        &self.0
    }

    /// Number of certificates in this chain
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the chain has no certificates
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<CertificateDer<'static>>> for CertificateChain {
    type Error = JoseError;

    fn try_from(certificates: Vec<CertificateDer<'static>>) -> Result<Self, Self::Error> {
        let mut chain = Self::new();
        for certificate in certificates {
            chain.push(certificate)?;
        }
        Ok(chain)
    }
}

impl Accept for CertificateChain {
    fn accept(value: &Value) -> Result<Self, JoseError> {
        let mut chain = Self::new();
        match value {
            Value::String(encoded) => chain.push_base64(encoded)?,
            Value::Array(values) => {
                for value in values {
                    let Value::String(encoded) = value else {
                        return Err(JoseError::from_display(
                            JoseErrorKind::MalformedInput,
                            "x5c: certificates must be strings",
                        ));
                    };
                    chain.push_base64(encoded)?;
                }
            }
            _ => {
                return Err(JoseError::from_display(
                    JoseErrorKind::MalformedInput,
                    "x5c: expected a string or an array of strings",
                ));
            }
        }
        Ok(chain)
    }
}

impl Serialize for CertificateChain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for certificate in &self.0 {
            seq.serialize_element(&codec::encode_std(certificate))?;
        }
        seq.end()
    }
}
