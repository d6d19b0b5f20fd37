use serde_json::json;
use tollgate::jose::{
    JWA, JWK, JWKAlgorithm, JWKSet, JoseError, JoseErrorKind, ParameterValue, SigningKey,
    SymmetricKey,
    jwt::{self, ParseOptions, SignOptions, Token},
};

use crate::fixtures::{PS256_MAX_SALT, PS384_NO_SALT, RSA_E, RSA_N};

fn oct(kid: &str, secret: &[u8]) -> JWK {
    JWK::new(SymmetricKey::new(secret.to_vec()).unwrap()).with_kid(kid.to_owned())
}

fn key_set() -> JWKSet {
    JWKSet::new()
        .with_key(oct("a", b"first a"))
        .with_key(oct("a", b"second a"))
        .with_key(oct("b", b"only b"))
}

fn sign(kid: Option<&str>, secret: &[u8]) -> String {
    jwt::sign(
        &Token::new().with_subject("1".to_owned()),
        JWA::HS256,
        &SigningKey::octets(secret.to_vec()),
        &SignOptions::new().maybe_with_kid(kid.map(str::to_owned)),
    )
    .unwrap()
}

fn parse(signed: &str) -> Result<Token, JoseError> {
    jwt::parse_str(signed, &ParseOptions::new().with_key_set(key_set()))
}

#[test]
fn lookup_returns_matches_in_set_order() {
    let set = key_set();
    let matches: Vec<_> = set.lookup_key_id("a").collect();
    assert_eq!(2, matches.len());
    assert_eq!(&oct("a", b"first a"), matches[0]);
    assert_eq!(0, set.lookup_key_id("c").count());
}

#[test]
fn duplicate_kid_resolves_to_first_key() {
    assert_eq!(Some("1"), parse(&sign(Some("a"), b"first a")).unwrap().subject());

    let err = parse(&sign(Some("a"), b"second a")).unwrap_err();
    assert!(err.is(&JoseErrorKind::SignatureVerificationFailed));

    assert_eq!(Some("1"), parse(&sign(Some("b"), b"only b")).unwrap().subject());
}

#[test]
fn unknown_kid_is_not_found() {
    let err = parse(&sign(Some("c"), b"first a")).unwrap_err();
    assert!(err.is(&JoseErrorKind::KeyNotFound));
}

#[test]
fn missing_kid_without_default_key() {
    let err = parse(&sign(None, b"first a")).unwrap_err();
    assert!(err.is(&JoseErrorKind::AmbiguousOrMissingKeyID));

    let err = jwt::parse_str(
        &sign(None, b"first a"),
        &ParseOptions::new()
            .with_key_set(key_set())
            .with_use_default_key(true),
    )
    .unwrap_err();
    assert!(err.is(&JoseErrorKind::AmbiguousOrMissingKeyID));
}

#[test]
fn key_set_json_keeps_order_and_unknown_parameters() {
    let set = JWKSet::parse_str(
        r#"{"keys":[
            {"kty":"oct","kid":"a","k":"Zmlyc3QgYQ","purpose":"primary"},
            {"kty":"oct","kid":"a","k":"c2Vjb25kIGE"},
            {"kty":"oct","kid":"b","k":"b25seSBi"}
        ]}"#,
    )
    .unwrap();
    assert_eq!(3, set.len());
    assert_eq!(Some(&ParameterValue::from("primary")), set.keys()[0].extra().get("purpose"));
    let token = jwt::parse_str(
        &sign(Some("a"), b"first a"),
        &ParseOptions::new().with_key_set(set),
    )
    .unwrap();
    assert_eq!(Some("1"), token.subject());
}

#[test]
fn key_set_refuses_unknown_key_types() {
    let err = JWKSet::parse_str(r#"{"keys":[{"kty":"XYZ","k":"AA"}]}"#).unwrap_err();
    assert!(err.is(&JoseErrorKind::MalformedInput));
}

#[test]
fn key_set_with_encryption_keys() {
    let set = JWKSet::parse(
        json!({"keys": [
            {"kty": "RSA", "kid": "rsa-enc", "use": "enc", "alg": "RSA-OAEP", "n": RSA_N, "e": RSA_E},
            {"kty": "RSA", "kid": "rsa-ext", "use": "sig", "alg": "PS256", "n": RSA_N, "e": RSA_E},
        ]})
        .to_string()
        .as_bytes(),
    )
    .unwrap();
    assert_eq!(2, set.len());
    assert_eq!(
        Some(&JWKAlgorithm::Other("RSA-OAEP".to_owned())),
        set.keys()[0].alg()
    );

    let options = ParseOptions::new().with_key_set(set);
    let token = jwt::parse_str(PS256_MAX_SALT, &options).unwrap();
    assert_eq!(Some("1"), token.subject());

    let err = jwt::parse_str(PS384_NO_SALT, &options).unwrap_err();
    assert!(err.is(&JoseErrorKind::UnsupportedAlgorithm));
}

#[test]
fn encryption_key_cannot_verify() {
    let set = JWKSet::parse(
        json!({"keys": [
            {"kty": "RSA", "kid": "rsa-ext", "alg": "RSA-OAEP", "n": RSA_N, "e": RSA_E},
        ]})
        .to_string()
        .as_bytes(),
    )
    .unwrap();
    let err = jwt::parse_str(PS256_MAX_SALT, &ParseOptions::new().with_key_set(set)).unwrap_err();
    assert!(err.is(&JoseErrorKind::UnsupportedAlgorithm));

    let published = serde_json::to_value(JWKSet::new().with_key(
        JWK::from_json(br#"{"kty":"oct","k":"c2VjcmV0","alg":"A256GCMKW"}"#).unwrap(),
    ))
    .unwrap();
    assert_eq!(json!("A256GCMKW"), published["keys"][0]["alg"]);
}
