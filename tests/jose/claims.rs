use std::time::Duration;

use jiff::Timestamp;
use tollgate::jose::{
    JWA, JoseErrorKind, SigningKey, VerifyingKey,
    jwt::{self, FixedClock, NumericDate, ParseOptions, SignOptions, Token, ValidateOptions},
};

const NOW: i64 = 1_750_000_000;
const SECRET: &[u8] = b"claims secret";

fn clock() -> FixedClock {
    FixedClock::new(Timestamp::from_second(NOW).unwrap())
}

fn sign(token: &Token) -> String {
    jwt::sign(
        token,
        JWA::HS256,
        &SigningKey::octets(SECRET.to_vec()),
        &SignOptions::new(),
    )
    .unwrap()
}

fn options(validate_options: ValidateOptions) -> ParseOptions {
    ParseOptions::new()
        .with_verify(JWA::HS256, VerifyingKey::octets(SECRET.to_vec()))
        .with_validation(true)
        .with_validate_options(validate_options.with_clock(clock()))
}

fn failed_claim(signed: &str, options: &ParseOptions) -> String {
    match jwt::parse_str(signed, options).unwrap_err().kind() {
        JoseErrorKind::ClaimValidationFailed(claim) => claim.clone(),
        kind => panic!("unexpected error kind {kind}"),
    }
}

#[test]
fn expired_by_one_second_needs_skew() {
    let signed = sign(&Token::new().with_expiration(NumericDate::from_seconds(NOW - 1).unwrap()));

    assert_eq!(
        "exp",
        failed_claim(&signed, &options(ValidateOptions::new()))
    );
    jwt::parse_str(
        &signed,
        &options(ValidateOptions::new().with_acceptable_skew(Duration::from_secs(1))),
    )
    .unwrap();
    jwt::parse_str(
        &signed,
        &options(ValidateOptions::new().with_acceptable_skew(Duration::from_secs(30))),
    )
    .unwrap();
}

#[test]
fn not_yet_valid_tokens() {
    let signed = sign(&Token::new().with_not_before(NumericDate::from_seconds(NOW + 60).unwrap()));
    assert_eq!(
        "nbf",
        failed_claim(&signed, &options(ValidateOptions::new()))
    );
    jwt::parse_str(
        &signed,
        &options(ValidateOptions::new().with_acceptable_skew(Duration::from_secs(60))),
    )
    .unwrap();
}

#[test]
fn expected_issuer_and_audience() {
    let signed = sign(
        &Token::new()
            .with_issuer("https://issuer.example".to_owned())
            .with_audience(vec!["orders".to_owned(), "billing".to_owned()])
            .with_expiration(NumericDate::from_seconds(NOW + 60).unwrap()),
    );

    let token = jwt::parse_str(
        &signed,
        &options(
            ValidateOptions::new()
                .with_issuer("https://issuer.example".to_owned())
                .with_audience("billing".to_owned()),
        ),
    )
    .unwrap();
    assert_eq!(Some("https://issuer.example"), token.issuer());

    assert_eq!(
        "iss",
        failed_claim(
            &signed,
            &options(ValidateOptions::new().with_issuer("https://other.example".to_owned()))
        )
    );
    assert_eq!(
        "aud",
        failed_claim(
            &signed,
            &options(ValidateOptions::new().with_audience("shipping".to_owned()))
        )
    );
}

#[test]
fn verification_happens_before_validation() {
    let signed = sign(&Token::new().with_expiration(NumericDate::from_seconds(NOW - 100).unwrap()));
    let options = ParseOptions::new()
        .with_verify(JWA::HS256, VerifyingKey::octets(b"other".to_vec()))
        .with_validation(true)
        .with_validate_options(ValidateOptions::new().with_clock(clock()));
    let err = jwt::parse_str(&signed, &options).unwrap_err();
    assert!(err.is(&JoseErrorKind::SignatureVerificationFailed));
}
