use aws_lc_rs::{
    rsa::KeySize,
    signature::{
        ECDSA_P256_SHA256_FIXED_SIGNING, ECDSA_P384_SHA384_FIXED_SIGNING,
        ECDSA_P521_SHA512_FIXED_SIGNING, EcdsaKeyPair, Ed25519KeyPair, EcdsaSigningAlgorithm,
        RsaKeyPair,
    },
};
use serde_json::json;
use tollgate::jose::{
    EcdsaSigningKey, JWA, JWK, JWKEllipticCurves, JWKSet, JoseErrorKind, SigningKey,
    VerifyingKey, jws,
    jwt::{self, ParseOptions, SignOptions, Token},
};

use crate::fixtures::{PS256_MAX_SALT, PS384_NO_SALT, PS512_DIGEST_SALT, RSA_E, RSA_N};

fn ecdsa(curve: JWKEllipticCurves, alg: &'static EcdsaSigningAlgorithm) -> SigningKey {
    EcdsaSigningKey::new(curve, EcdsaKeyPair::generate(alg).unwrap())
        .unwrap()
        .into()
}

fn signing_key(alg: JWA) -> SigningKey {
    match alg {
        JWA::HS256 | JWA::HS384 | JWA::HS512 => SigningKey::octets(b"algorithm secret".to_vec()),
        JWA::RS256 | JWA::RS384 | JWA::RS512 | JWA::PS256 | JWA::PS384 | JWA::PS512 => {
            RsaKeyPair::generate(KeySize::Rsa2048).unwrap().into()
        }
        JWA::ES256 => ecdsa(JWKEllipticCurves::P256, &ECDSA_P256_SHA256_FIXED_SIGNING),
        JWA::ES384 => ecdsa(JWKEllipticCurves::P384, &ECDSA_P384_SHA384_FIXED_SIGNING),
        JWA::ES512 => ecdsa(JWKEllipticCurves::P521, &ECDSA_P521_SHA512_FIXED_SIGNING),
        JWA::EdDSA => Ed25519KeyPair::generate().unwrap().into(),
        JWA::None => panic!("none has no key"),
    }
}

fn supported() -> impl Iterator<Item = JWA> {
    JWA::ALL.into_iter().filter(|alg| *alg != JWA::None)
}

#[test]
fn every_algorithm_signs_and_verifies_through_a_published_key_set() {
    for alg in supported() {
        let private = JWK::try_from(&signing_key(alg))
            .unwrap()
            .with_kid(format!("{alg}-key"));
        let published = if matches!(alg, JWA::HS256 | JWA::HS384 | JWA::HS512) {
            JWKSet::new().with_key(private.clone())
        } else {
            JWKSet::new().with_key(private.clone()).public_keys().unwrap()
        };
        assert_eq!(1, published.len(), "{alg}");
        assert!(!published.keys()[0].is_private() || private.key().kty() == "oct");

        let token = Token::new().with_subject(alg.to_string());
        let signed = jwt::sign_with_jwk(&token, alg, &private, &SignOptions::new()).unwrap();

        let options = ParseOptions::new().with_key_set(published.clone());
        let parsed = jwt::parse_str(&signed, &options).unwrap();
        assert_eq!(Some(alg.to_string().as_str()), parsed.subject());

        let (signing_input, signature) = signed.rsplit_once('.').unwrap();
        let mut signature = tollgate::jose::codec::decode(signature).unwrap();
        signature[0] ^= 0x01;
        let tampered = format!(
            "{signing_input}.{}",
            tollgate::jose::codec::encode(&signature)
        );
        let err = jwt::parse_str(&tampered, &options).unwrap_err();
        assert!(
            err.is(&JoseErrorKind::SignatureVerificationFailed),
            "{alg}: {err}"
        );
    }
}

#[test]
fn jws_verify_with_wrong_algorithm_family() {
    let key = signing_key(JWA::ES256);
    let verifying_key = key.verifying_key().unwrap();
    let compact = jws::sign(b"payload", JWA::ES256, &key, jws::Headers::new()).unwrap();

    assert_eq!(
        b"payload".to_vec(),
        jws::verify(compact.as_bytes(), JWA::ES256, &verifying_key).unwrap()
    );

    let err = jws::verify(compact.as_bytes(), JWA::RS256, &verifying_key).unwrap_err();
    assert_eq!(
        &JoseErrorKind::InvalidKeyType {
            expected: "rsa public key",
            actual: "ecdsa public key",
        },
        err.kind()
    );
}

#[test]
fn none_algorithm_never_signs() {
    let key = SigningKey::octets(b"secret".to_vec());
    let err = jwt::sign(&Token::new(), JWA::None, &key, &SignOptions::new()).unwrap_err();
    assert!(err.is(&JoseErrorKind::UnsupportedAlgorithm));
}

fn external_rsa_key() -> JWK {
    JWK::from_json(
        json!({"kty": "RSA", "kid": "rsa-ext", "n": RSA_N, "e": RSA_E})
            .to_string()
            .as_bytes(),
    )
    .unwrap()
}

#[test]
fn pss_tokens_verify_regardless_of_salt_length() {
    let options = ParseOptions::new().with_key_set(JWKSet::new().with_key(external_rsa_key()));
    for signed in [PS256_MAX_SALT, PS384_NO_SALT, PS512_DIGEST_SALT] {
        let token = jwt::parse_str(signed, &options).unwrap();
        assert_eq!(Some("1"), token.subject());

        // {"sub":"1"} -> {"sub":"2"}
        let forged = signed.replace("eyJzdWIiOiIxIn0", "eyJzdWIiOiIyIn0");
        let err = jwt::parse_str(&forged, &options).unwrap_err();
        assert!(err.is(&JoseErrorKind::SignatureVerificationFailed));
    }
}

#[test]
fn pss_signature_is_bound_to_its_hash_and_padding() {
    let key: VerifyingKey = external_rsa_key().materialize().unwrap();
    assert_eq!(
        br#"{"sub":"1"}"#.to_vec(),
        jws::verify(PS256_MAX_SALT.as_bytes(), JWA::PS256, &key).unwrap()
    );

    for alg in [JWA::PS384, JWA::PS512, JWA::RS256] {
        let err = jws::verify(PS256_MAX_SALT.as_bytes(), alg, &key).unwrap_err();
        assert!(err.is(&JoseErrorKind::SignatureVerificationFailed), "{alg}");
    }
}
