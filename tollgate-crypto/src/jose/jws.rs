//! JSON Web Signature as defined in [`rfc7515`]
//!
//! Messages can be built in compact, flattened and general JSON form using
//! [`JWSBuilder`], and parsed back from any of the three with [`JWS::parse`].
//! The signing input is always `b64(protected) '.' b64(payload)`.
//!
//! [`rfc7515`]: https://datatracker.ietf.org/doc/html/rfc7515

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tollgate_error::{BoxError, ErrorContext as _};
use tollgate_utils::macros::generate_set_and_with;

use crate::jose::{
    AlgorithmSigner, AlgorithmVerifier, JWA, JoseError, JoseErrorKind, SigningKey, VerifyingKey,
    codec,
};

#[derive(Default, Debug, Clone, PartialEq, Eq)]
/// [`JWSBuilder`] should be used when manually creating a [`JWS`], [`JWSCompact`] or [`JWSFlattened`]
pub struct JWSBuilder {
    protected_headers: Headers,
    unprotected_headers: Headers,
    payload: String,
}

#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
/// [`Headers`] store protected or unprotected headers and already
/// serializes them to correct JSON values.
pub struct Headers(Option<Map<String, Value>>);

impl Headers {
    /// Create empty [`Headers`]
    pub fn new() -> Self {
        Self::default()
    }

    generate_set_and_with! {
        /// Set provided header in the header map
        ///
        /// Warning: this function will replace already existing headers
        pub fn header(
            mut self,
            name: String,
            value: impl Serialize,
        ) -> Result<Self, JoseError> {
            let value = serde_json::to_value(value)
                .context("convert header to json value")
                .map_err(JoseError::malformed)?;
            self.0.get_or_insert_default().insert(name, value);
            Ok(self)
        }
    }

    generate_set_and_with! {
        /// Set provided headers in the header map, `headers` must serialize to an object
        ///
        /// Warning: this function will replace already existing headers
        pub fn headers(mut self, headers: impl Serialize) -> Result<Self, JoseError> {
            let headers = serde_json::to_value(headers)
                .context("convert headers to json value")
                .map_err(JoseError::malformed)?;
            let Value::Object(mut headers) = headers else {
                return Err(JoseError::from_display(
                    JoseErrorKind::MalformedInput,
                    "can only set multiple headers from a key value object",
                ));
            };

            match &mut self.0 {
                Some(existing_headers) => existing_headers.append(&mut headers),
                None => self.0 = Some(headers),
            }
            Ok(self)
        }
    }

    /// Get the raw value of a header
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.as_ref().and_then(|headers| headers.get(name))
    }

    /// The `kid` header, if it is a string
    pub fn kid(&self) -> Option<&str> {
        self.get("kid").and_then(Value::as_str)
    }

    /// The `alg` header.
    ///
    /// Fails with [`JoseErrorKind::UnsupportedAlgorithm`] if it is
    /// missing or names an unknown algorithm.
    pub fn alg(&self) -> Result<JWA, JoseError> {
        match self.get("alg") {
            Some(Value::String(alg)) => alg.parse(),
            Some(_) => Err(JoseError::from_display(
                JoseErrorKind::MalformedInput,
                "alg header must be a string",
            )),
            None => Err(JoseError::from_display(
                JoseErrorKind::UnsupportedAlgorithm,
                "missing alg header",
            )),
        }
    }

    /// Returns true if no header was set
    pub fn is_empty(&self) -> bool {
        self.0.as_ref().is_none_or(Map::is_empty)
    }

    /// Encode headers to a base64 url safe representation
    fn as_encoded_string(&self) -> Result<String, JoseError> {
        match &self.0 {
            Some(headers) => {
                let headers = serde_json::to_vec(headers)
                    .context("serialize headers")
                    .map_err(JoseError::malformed)?;
                Ok(codec::encode(headers))
            }
            None => Ok(String::new()),
        }
    }

    /// Decode base64 url encoded headers, an empty string means no headers
    fn from_encoded(encoded: &str) -> Result<Self, JoseError> {
        if encoded.is_empty() {
            return Ok(Self::default());
        }
        let decoded = codec::decode(encoded)?;
        serde_json::from_slice(&decoded)
            .context("deserialize protected headers")
            .map_err(JoseError::malformed)
    }

    fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Try decode headers to the provided `T`
    pub fn decode<'de, 'a: 'de, T>(&'a self) -> Result<T, JoseError>
    where
        T: Deserialize<'de>,
    {
        match &self.0 {
            Some(headers) => T::deserialize(headers)
                .context("deserialize headers into T")
                .map_err(JoseError::malformed),
            None => Err(JoseError::from_display(
                JoseErrorKind::MalformedInput,
                "headers are None, deserialize not supported",
            )),
        }
    }
}

/// Run `signer` over the current headers and payload.
fn sign_with(
    signer: &impl Signer,
    protected_headers: &mut Headers,
    unprotected_headers: &mut Headers,
    payload: &str,
) -> Result<Signature, JoseError> {
    signer
        .set_headers(protected_headers, unprotected_headers)
        .map_err(|err| JoseError::from_boxed(err.into(), JoseErrorKind::MalformedInput))?;

    let protected = protected_headers.as_encoded_string()?;
    let signing_input = format!("{protected}.{payload}");
    let signature = signer
        .sign(&signing_input)
        .map_err(|err| JoseError::from_boxed(err.into(), JoseErrorKind::InvalidKeyMaterial))?;

    Ok(Signature {
        protected,
        unprotected: std::mem::take(unprotected_headers),
        signature: codec::encode(signature.as_ref()),
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// [`ChainedJWSBuilder`] will be used to create a [`JWS`] with multiple signatures
pub struct ChainedJWSBuilder {
    signatures: Vec<Signature>,
    payload: String,
    protected_headers: Headers,
    unprotected_headers: Headers,
}

impl JWSBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    generate_set_and_with! {
        /// Add the provided payload to this [`JWSBuilder`]
        pub fn payload(mut self, payload: impl AsRef<[u8]>) -> Self {
            self.payload = codec::encode(payload);
            self
        }
    }

    generate_set_and_with! {
        /// Set provided header in the protected header map
        pub fn protected_header(
            mut self,
            name: String,
            value: impl Serialize,
        ) -> Result<Self, JoseError> {
            self.protected_headers.try_set_header(name, value)?;
            Ok(self)
        }
    }

    generate_set_and_with! {
        /// Set provided headers in the protected header map
        pub fn protected_headers(mut self, headers: impl Serialize) -> Result<Self, JoseError> {
            self.protected_headers.try_set_headers(headers)?;
            Ok(self)
        }
    }

    /// Get mutable reference to the underlying protected header store
    pub fn protected_headers_mut(&mut self) -> &mut Headers {
        &mut self.protected_headers
    }

    generate_set_and_with! {
        /// Set provided header in the unprotected header map
        pub fn unprotected_header(
            mut self,
            name: String,
            value: impl Serialize,
        ) -> Result<Self, JoseError> {
            self.unprotected_headers.try_set_header(name, value)?;
            Ok(self)
        }
    }

    generate_set_and_with! {
        /// Set provided headers in the unprotected header map
        pub fn unprotected_headers(mut self, headers: impl Serialize) -> Result<Self, JoseError> {
            self.unprotected_headers.try_set_headers(headers)?;
            Ok(self)
        }
    }

    /// Get mutable reference to the underlying unprotected header store
    pub fn unprotected_headers_mut(&mut self) -> &mut Headers {
        &mut self.unprotected_headers
    }

    /// Generate compact serialization of this `JWS`
    ///
    /// This only available if there is no unprotected header set
    pub fn build_compact(mut self, signer: &impl Signer) -> Result<JWSCompact, JoseError> {
        if !self.unprotected_headers.is_none() {
            return Err(JoseError::from_display(
                JoseErrorKind::MalformedInput,
                "compact jws does not support unprotected headers",
            ));
        }

        let signature = sign_with(
            signer,
            &mut self.protected_headers,
            &mut self.unprotected_headers,
            &self.payload,
        )?;
        if !signature.unprotected.is_none() {
            return Err(JoseError::from_display(
                JoseErrorKind::MalformedInput,
                "signer set unprotected headers on a compact jws",
            ));
        }

        Ok(JWSCompact(format!(
            "{}.{}.{}",
            signature.protected, self.payload, signature.signature
        )))
    }

    /// Build a [`JWSFlattened`]
    pub fn build_flattened(mut self, signer: &impl Signer) -> Result<JWSFlattened, JoseError> {
        let signature = sign_with(
            signer,
            &mut self.protected_headers,
            &mut self.unprotected_headers,
            &self.payload,
        )?;
        Ok(JWSFlattened {
            signature,
            payload: self.payload,
        })
    }

    /// Build a [`JWS`]
    pub fn build_jws(mut self, signer: &impl Signer) -> Result<JWS, JoseError> {
        let signature = sign_with(
            signer,
            &mut self.protected_headers,
            &mut self.unprotected_headers,
            &self.payload,
        )?;
        Ok(JWS {
            signatures: vec![signature],
            payload: self.payload,
        })
    }

    /// Create a [`ChainedJWSBuilder`] with the same payload but that can add a new set of headers
    /// and which will be signed again. This is needed to create a [`JWS`] with multiple signatures.
    pub fn add_signature(mut self, signer: &impl Signer) -> Result<ChainedJWSBuilder, JoseError> {
        let signature = sign_with(
            signer,
            &mut self.protected_headers,
            &mut self.unprotected_headers,
            &self.payload,
        )?;
        Ok(ChainedJWSBuilder {
            signatures: vec![signature],
            protected_headers: Headers::default(),
            unprotected_headers: Headers::default(),
            payload: self.payload,
        })
    }
}

impl ChainedJWSBuilder {
    generate_set_and_with! {
        /// Set provided header in the protected header map of the next signature
        pub fn protected_header(
            mut self,
            name: String,
            value: impl Serialize,
        ) -> Result<Self, JoseError> {
            self.protected_headers.try_set_header(name, value)?;
            Ok(self)
        }
    }

    generate_set_and_with! {
        /// Set provided headers in the protected header map of the next signature
        pub fn protected_headers(mut self, headers: impl Serialize) -> Result<Self, JoseError> {
            self.protected_headers.try_set_headers(headers)?;
            Ok(self)
        }
    }

    /// Get mutable reference to the protected header store of the next signature
    pub fn protected_headers_mut(&mut self) -> &mut Headers {
        &mut self.protected_headers
    }

    generate_set_and_with! {
        /// Set provided header in the unprotected header map of the next signature
        pub fn unprotected_header(
            mut self,
            name: String,
            value: impl Serialize,
        ) -> Result<Self, JoseError> {
            self.unprotected_headers.try_set_header(name, value)?;
            Ok(self)
        }
    }

    generate_set_and_with! {
        /// Set provided headers in the unprotected header map of the next signature
        pub fn unprotected_headers(mut self, headers: impl Serialize) -> Result<Self, JoseError> {
            self.unprotected_headers.try_set_headers(headers)?;
            Ok(self)
        }
    }

    /// Get mutable reference to the unprotected header store of the next signature
    pub fn unprotected_headers_mut(&mut self) -> &mut Headers {
        &mut self.unprotected_headers
    }

    /// Sign with `signer` and continue with a fresh set of headers
    pub fn add_signature(mut self, signer: &impl Signer) -> Result<Self, JoseError> {
        let signature = sign_with(
            signer,
            &mut self.protected_headers,
            &mut self.unprotected_headers,
            &self.payload,
        )?;
        self.signatures.push(signature);
        self.protected_headers = Headers::default();
        Ok(self)
    }

    /// Build the final [`JWS`] containing all provided signatures
    pub fn build(self, signer: &impl Signer) -> Result<JWS, JoseError> {
        let Self {
            signatures, payload, ..
        } = self.add_signature(signer)?;
        Ok(JWS {
            payload,
            signatures,
        })
    }
}

/// [`Signer`] implements all methods which are needed to sign a JWS,
/// and add the needed info to the JOSE headers (JOSE headers = protected + unprotected headers)
pub trait Signer {
    type Signature: AsRef<[u8]>;
    type Error: Into<BoxError>;

    /// Set headers which are needed to verify the final `Signature`
    ///
    /// Example headers are: `alg`, `kid`
    fn set_headers(
        &self,
        protected_headers: &mut Headers,
        unprotected_headers: &mut Headers,
    ) -> Result<(), Self::Error>;

    /// Sign the str encoded signing input
    fn sign(&self, data: &str) -> Result<Self::Signature, Self::Error>;
}

/// [`Verifier`] will be called to confirm if the received data is valid
///
/// For some algorithms all signatures need to be valid, but there are also
/// cases when only one or some need to be valid.
pub trait Verifier {
    type Error: Into<BoxError>;

    /// Verify if data is valid
    fn verify(&self, payload: &[u8], signatures: &[ToVerifySignature]) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// [`JWSCompact`] is a compact `JWS` representation as defined in [`rfc7515, section 7.1`]
///
/// [`rfc7515, section 7.1`]: https://datatracker.ietf.org/doc/html/rfc7515#section-7.1
pub struct JWSCompact(String);

impl JWSCompact {
    /// Create a builder which can be used to create a [`JWSCompact`]
    pub fn builder() -> JWSBuilder {
        JWSBuilder::new()
    }

    /// The compact serialization
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The compact serialization as bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Consume self and return the compact serialization
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for JWSCompact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// [`JWSFlattened`] is a `JWS` which is optimized for a single signature, as defined in [`rfc7515, section 7.2.2`]
///
/// It does this by setting protected, header and signature at the root,
/// vs setting it in the signatures array
///
/// [`rfc7515, section 7.2.2`]: https://datatracker.ietf.org/doc/html/rfc7515#section-7.2.2
pub struct JWSFlattened {
    #[serde(skip_serializing_if = "String::is_empty")]
    payload: String,
    #[serde(flatten)]
    signature: Signature,
}

impl JWSFlattened {
    /// Create a builder which can be used to create a [`JWSFlattened`]
    pub fn builder() -> JWSBuilder {
        JWSBuilder::new()
    }

    /// Create a [`JWSCompact`] from this [`JWSFlattened`]
    pub fn as_compact(&self) -> Result<JWSCompact, JoseError> {
        if !self.signature.unprotected.is_none() {
            return Err(JoseError::from_display(
                JoseErrorKind::MalformedInput,
                "compact jws does not support unprotected headers",
            ));
        }

        Ok(JWSCompact(format!(
            "{}.{}.{}",
            self.signature.protected, self.payload, self.signature.signature
        )))
    }

    /// Decode this [`JWSFlattened`] to a [`DecodedJWSFlattened`] by decoding all values
    /// and checking with [`Verifier`] if the provided signature is correct
    pub fn decode(self, verifier: &impl Verifier) -> Result<DecodedJWSFlattened, JoseError> {
        let to_verify = ToVerifySignature::new(self.signature, &self.payload)?;
        let payload = codec::decode(&self.payload)?;

        verifier
            .verify(&payload, std::slice::from_ref(&to_verify))
            .map_err(|err| {
                JoseError::from_boxed(err.into(), JoseErrorKind::SignatureVerificationFailed)
            })?;

        Ok(DecodedJWSFlattened {
            signature: to_verify.decoded_signature,
            payload,
        })
    }
}

impl From<JWSFlattened> for JWS {
    fn from(value: JWSFlattened) -> Self {
        Self {
            payload: value.payload,
            signatures: vec![value.signature],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// [`JWS`] is the general serialization format as defined in [`rfc7515, section 7.2.1`]
///
/// Messages parsed from the compact or flattened form are represented
/// as a [`JWS`] with a single signature.
///
/// [`rfc7515, section 7.2.1`]: https://datatracker.ietf.org/doc/html/rfc7515#section-7.2.1
pub struct JWS {
    payload: String,
    signatures: Vec<Signature>,
}

/// Members of a JSON serialized message, general or flattened.
#[derive(Deserialize)]
struct JsonMessage {
    payload: Option<String>,
    signatures: Option<Vec<Signature>>,
    protected: Option<String>,
    header: Option<Headers>,
    signature: Option<String>,
}

impl JWS {
    /// Create a builder which can be used to create a [`JWS`]
    pub fn builder() -> JWSBuilder {
        JWSBuilder::new()
    }

    /// Parse a message in compact, flattened JSON or general JSON serialization.
    ///
    /// A JSON object with neither payload nor signatures parses to an empty message.
    pub fn parse(message: &[u8]) -> Result<Self, JoseError> {
        let message = message.trim_ascii();
        if message.first() == Some(&b'{') {
            return Self::parse_json(message);
        }

        let message = std::str::from_utf8(message)
            .context("compact jws must be utf-8")
            .map_err(JoseError::malformed)?;
        let mut segments = message.split('.');
        let (Some(protected), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(JoseError::from_display(
                JoseErrorKind::MalformedInput,
                "compact jws must have exactly three segments",
            ));
        };

        Ok(Self {
            payload: payload.to_owned(),
            signatures: vec![Signature {
                protected: protected.to_owned(),
                unprotected: Headers::default(),
                signature: signature.to_owned(),
            }],
        })
    }

    fn parse_json(message: &[u8]) -> Result<Self, JoseError> {
        let JsonMessage {
            payload,
            signatures,
            protected,
            header,
            signature,
        } = serde_json::from_slice(message)
            .context("decode json jws")
            .map_err(JoseError::malformed)?;

        let signatures = match (signatures, signature) {
            (Some(_), Some(_)) => {
                return Err(JoseError::from_display(
                    JoseErrorKind::MalformedInput,
                    "jws cannot be both general and flattened",
                ));
            }
            (Some(signatures), None) => signatures,
            (None, Some(signature)) => vec![Signature {
                protected: protected.unwrap_or_default(),
                unprotected: header.unwrap_or_default(),
                signature,
            }],
            (None, None) => Vec::new(),
        };

        Ok(Self {
            payload: payload.unwrap_or_default(),
            signatures,
        })
    }

    /// Returns true if this message has neither payload nor signatures
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty() && self.signatures.is_empty()
    }

    /// Number of signatures in this message
    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    /// Decoded protected headers of the first signature, if there is one
    pub fn first_protected_headers(&self) -> Result<Option<Headers>, JoseError> {
        self.signatures
            .first()
            .map(|signature| Headers::from_encoded(&signature.protected))
            .transpose()
    }

    /// Decode the payload without verifying any signature.
    ///
    /// Only use this for content that is trusted by other means.
    pub fn insecure_payload(&self) -> Result<Vec<u8>, JoseError> {
        codec::decode(&self.payload)
    }

    /// Decode this [`JWS`] to a [`DecodedJWS`] by decoding all values and checking with [`Verifier`]
    /// if the signatures are correct
    pub fn decode(self, verifier: &impl Verifier) -> Result<DecodedJWS, JoseError> {
        let signatures = self
            .signatures
            .into_iter()
            .map(|signature| ToVerifySignature::new(signature, &self.payload))
            .collect::<Result<Vec<_>, _>>()?;
        let payload = codec::decode(&self.payload)?;

        verifier.verify(&payload, &signatures).map_err(|err| {
            JoseError::from_boxed(err.into(), JoseErrorKind::SignatureVerificationFailed)
        })?;

        Ok(DecodedJWS {
            signatures: signatures
                .into_iter()
                .map(|sig| sig.decoded_signature)
                .collect(),
            payload,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct Signature {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    protected: String,
    #[serde(default, skip_serializing_if = "Headers::is_none")]
    #[serde(rename = "header")]
    unprotected: Headers,
    signature: String,
}

#[derive(Debug)]
/// Decoded version of a [`JWSFlattened`]
///
/// Data here has already been verified, so everything
/// here is ready for usage
pub struct DecodedJWSFlattened {
    payload: Vec<u8>,
    signature: DecodedSignature,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Decoded version of a [`JWS`]
///
/// Data here has already been verified, so everything
/// here is ready for usage
pub struct DecodedJWS {
    payload: Vec<u8>,
    signatures: Vec<DecodedSignature>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Decoded version of a signature
pub struct DecodedSignature {
    protected: Headers,
    unprotected: Headers,
    signature: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A signature which still needs to be checked
///
/// It includes the encoded signing input, so this doesn't need to be re-encoded
pub struct ToVerifySignature {
    signed_data: String,
    decoded_signature: DecodedSignature,
}

impl ToVerifySignature {
    fn new(signature: Signature, payload: &str) -> Result<Self, JoseError> {
        let protected = Headers::from_encoded(&signature.protected)?;
        Ok(Self {
            signed_data: format!("{}.{payload}", signature.protected),
            decoded_signature: DecodedSignature {
                protected,
                unprotected: signature.unprotected,
                signature: signature.signature,
            },
        })
    }

    /// Encoded representation of protected + payload, the exact signing input
    pub fn signed_data(&self) -> &str {
        &self.signed_data
    }

    /// Reference to the [`DecodedSignature`]
    pub fn decoded_signature(&self) -> &DecodedSignature {
        &self.decoded_signature
    }
}

impl DecodedSignature {
    /// Reference to the protected [`Headers`]
    pub fn protected_headers(&self) -> &Headers {
        &self.protected
    }

    /// Trying decoding the protected headers to the provided `T`
    pub fn decode_protected_headers<'de, 'a: 'de, T: Deserialize<'de>>(
        &'a self,
    ) -> Result<T, JoseError> {
        self.protected.decode()
    }

    /// Reference to the unprotected [`Headers`]
    pub fn unprotected_headers(&self) -> &Headers {
        &self.unprotected
    }

    /// Trying decoding the unprotected headers to the provided `T`
    pub fn decode_unprotected_headers<'de, 'a: 'de, T: Deserialize<'de>>(
        &'a self,
    ) -> Result<T, JoseError> {
        self.unprotected.decode()
    }

    /// The base64url encoded signature
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl DecodedJWS {
    /// Get reference to the [`DecodedSignature`]s
    pub fn signatures(&self) -> &[DecodedSignature] {
        self.signatures.as_slice()
    }

    /// Get reference to the payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consume self and return the payload
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

impl DecodedJWSFlattened {
    /// Reference to the protected [`Headers`]
    pub fn protected_headers(&self) -> &Headers {
        self.signature.protected_headers()
    }

    /// Trying decoding the protected headers to the provided `T`
    pub fn decode_protected_headers<'de, 'a: 'de, T: Deserialize<'de>>(
        &'a self,
    ) -> Result<T, JoseError> {
        self.signature.decode_protected_headers()
    }

    /// Reference to the unprotected [`Headers`]
    pub fn unprotected_headers(&self) -> &Headers {
        self.signature.unprotected_headers()
    }

    /// Trying decoding the unprotected headers to the provided `T`
    pub fn decode_unprotected_headers<'de, 'a: 'de, T: Deserialize<'de>>(
        &'a self,
    ) -> Result<T, JoseError> {
        self.signature.decode_unprotected_headers()
    }

    /// The base64url encoded signature
    pub fn signature(&self) -> &str {
        self.signature.signature()
    }

    /// Get reference to the payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

#[derive(Debug)]
/// [`Signer`] backed by a registered [`JWA`] and a [`SigningKey`].
///
/// Sets the `alg` protected header, and `kid` if one was given.
pub struct KeySigner<'a> {
    signer: AlgorithmSigner,
    key: &'a SigningKey,
    kid: Option<String>,
}

impl<'a> KeySigner<'a> {
    /// Create a [`KeySigner`], fails if `alg` is not registered
    pub fn new(alg: JWA, key: &'a SigningKey) -> Result<Self, JoseError> {
        Ok(Self {
            signer: AlgorithmSigner::new(alg)?,
            key,
            kid: None,
        })
    }

    generate_set_and_with! {
        /// Key id to put in the protected header
        pub fn kid(mut self, kid: Option<String>) -> Self {
            self.kid = kid;
            self
        }
    }
}

impl Signer for KeySigner<'_> {
    type Signature = Vec<u8>;
    type Error = JoseError;

    fn set_headers(
        &self,
        protected_headers: &mut Headers,
        _unprotected_headers: &mut Headers,
    ) -> Result<(), Self::Error> {
        protected_headers.try_set_header("alg".to_owned(), self.signer.alg())?;
        if let Some(kid) = &self.kid {
            protected_headers.try_set_header("kid".to_owned(), kid)?;
        }
        Ok(())
    }

    fn sign(&self, data: &str) -> Result<Self::Signature, Self::Error> {
        self.signer.sign(data.as_bytes(), self.key)
    }
}

#[derive(Debug)]
/// [`Verifier`] backed by a registered [`JWA`] and a [`VerifyingKey`].
///
/// Verification succeeds as soon as any signature verifies.
pub struct KeyVerifier<'a> {
    verifier: AlgorithmVerifier,
    key: &'a VerifyingKey,
}

impl<'a> KeyVerifier<'a> {
    /// Create a [`KeyVerifier`], fails if `alg` is not registered
    pub fn new(alg: JWA, key: &'a VerifyingKey) -> Result<Self, JoseError> {
        Ok(Self {
            verifier: AlgorithmVerifier::new(alg)?,
            key,
        })
    }
}

impl Verifier for KeyVerifier<'_> {
    type Error = JoseError;

    fn verify(&self, _payload: &[u8], signatures: &[ToVerifySignature]) -> Result<(), Self::Error> {
        let mut last_error = None;
        for to_verify in signatures {
            let Ok(signature) = codec::decode(to_verify.decoded_signature.signature()) else {
                continue;
            };
            match self.verifier.verify(
                to_verify.signed_data.as_bytes(),
                &signature,
                self.key,
            ) {
                Ok(()) => return Ok(()),
                Err(err) if err.is(&JoseErrorKind::SignatureVerificationFailed) => {}
                Err(err) => last_error = Some(err),
            }
        }

        tracing::debug!(
            alg = %self.verifier.alg(),
            signatures = signatures.len(),
            "no jws signature could be verified"
        );
        Err(last_error
            .unwrap_or_else(|| JoseError::new(JoseErrorKind::SignatureVerificationFailed)))
    }
}

/// Sign `payload` with `alg` and `key`, producing a compact JWS.
///
/// `headers` are added to the protected header, `alg` is always set by this function.
pub fn sign(
    payload: &[u8],
    alg: JWA,
    key: &SigningKey,
    headers: Headers,
) -> Result<JWSCompact, JoseError> {
    let signer = KeySigner::new(alg, key)?;
    let mut builder = JWSBuilder::new().with_payload(payload);
    *builder.protected_headers_mut() = headers;
    builder.build_compact(&signer)
}

/// Verify a message in any serialization with `alg` and `key`, returning its payload.
///
/// The message is accepted if any of its signatures verifies.
pub fn verify(message: &[u8], alg: JWA, key: &VerifyingKey) -> Result<Vec<u8>, JoseError> {
    let verifier = KeyVerifier::new(alg, key)?;
    JWS::parse(message)?
        .decode(&verifier)
        .map(DecodedJWS::into_payload)
}
