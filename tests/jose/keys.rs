use aws_lc_rs::{rsa::KeySize, signature::RsaKeyPair};
use serde_json::json;
use tollgate::jose::{
    JWA, JWK, JoseErrorKind, SigningKey, ThumbprintHash, VerifyingKey, codec,
    jws::{self, Headers},
};

use crate::fixtures::{RSA_D, RSA_E, RSA_N, RSA_P, RSA_Q};

const RFC8037_D: &str = "nWGxne_9WmC6hEr0kuwsxERJxWl7MmkZcDusAxyuf2A";
const RFC8037_X: &str = "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo";
const RFC8037_JWS: &str = "eyJhbGciOiJFZERTQSJ9.RXhhbXBsZSBvZiBFZDI1NTE5IHNpZ25pbmc.hgyY0il_MGCjP0JzlnLWG1PPOt7-09PGcvMg3AIbQR6dWbhijcNR4ki4iylGjg5BhVsPt9g7sVvpAr_MuM0KAg";

#[test]
fn ed25519_jwk_reproduces_known_signature() {
    let jwk = JWK::from_json(
        json!({"kty": "OKP", "crv": "Ed25519", "d": RFC8037_D, "x": RFC8037_X})
            .to_string()
            .as_bytes(),
    )
    .unwrap();
    assert!(jwk.is_private());

    let key: SigningKey = jwk.materialize().unwrap();
    let compact = jws::sign(b"Example of Ed25519 signing", JWA::EdDSA, &key, Headers::new()).unwrap();
    assert_eq!(RFC8037_JWS, compact.as_str());

    let public = jwk.public_key().unwrap();
    assert!(!public.is_private());
    let verifying_key: VerifyingKey = public.materialize().unwrap();
    assert_eq!(
        b"Example of Ed25519 signing".to_vec(),
        jws::verify(RFC8037_JWS.as_bytes(), JWA::EdDSA, &verifying_key).unwrap()
    );
}

#[test]
fn okp_key_with_mismatched_public_part_is_refused() {
    let other_x = codec::encode([7u8; 32]);
    let err = JWK::from_json(
        json!({"kty": "OKP", "crv": "Ed25519", "d": RFC8037_D, "x": other_x})
            .to_string()
            .as_bytes(),
    )
    .unwrap_err();
    assert!(err.is(&JoseErrorKind::InvalidKeyMaterial));
}

#[test]
fn thumbprint_ignores_private_fields_and_metadata() {
    let key_pair = RsaKeyPair::generate(KeySize::Rsa2048).unwrap();
    let private = JWK::try_from(&SigningKey::from(key_pair))
        .unwrap()
        .with_kid("rsa-1".to_owned());
    let public = private.public_key().unwrap().without_kid();

    for hash in [
        ThumbprintHash::Sha256,
        ThumbprintHash::Sha384,
        ThumbprintHash::Sha512,
    ] {
        let thumbprint = private.thumbprint(hash).unwrap();
        assert_eq!(thumbprint, private.thumbprint(hash).unwrap());
        assert_eq!(thumbprint, public.thumbprint(hash).unwrap());
    }
}

#[test]
fn rsa_jwk_json_round_trip() {
    let key_pair = RsaKeyPair::generate(KeySize::Rsa2048).unwrap();
    let key = SigningKey::from(key_pair);
    let jwk = JWK::try_from(&key).unwrap();

    let json = serde_json::to_vec(&jwk).unwrap();
    let decoded = JWK::from_json(&json).unwrap();
    assert_eq!(jwk, decoded);

    let restored: SigningKey = decoded.materialize().unwrap();
    let compact = jws::sign(b"rsa", JWA::PS256, &restored, Headers::new()).unwrap();
    assert_eq!(
        b"rsa".to_vec(),
        jws::verify(compact.as_bytes(), JWA::PS256, &key.verifying_key().unwrap()).unwrap()
    );
}

#[test]
fn symmetric_key_has_no_public_counterpart() {
    let jwk = JWK::from_json(br#"{"kty":"oct","k":"c2VjcmV0"}"#).unwrap();
    let err = jwk.public_key().unwrap_err();
    assert!(err.is(&JoseErrorKind::IncompatibleTarget));

    let err = jwk.materialize::<RsaKeyPair>().unwrap_err();
    assert!(err.is(&JoseErrorKind::IncompatibleTarget));

    let err = JWK::from_json(br#"{"kty":"oct","k":""}"#).unwrap_err();
    assert!(err.is(&JoseErrorKind::InvalidKeyMaterial));
}

#[test]
fn rsa_private_jwk_without_crt_values() {
    let jwk = JWK::from_json(
        json!({"kty": "RSA", "n": RSA_N, "e": RSA_E, "d": RSA_D, "p": RSA_P, "q": RSA_Q})
            .to_string()
            .as_bytes(),
    )
    .unwrap();
    assert!(jwk.is_private());

    let key: SigningKey = jwk.materialize().unwrap();
    let verifying_key: VerifyingKey = jwk.public_key().unwrap().materialize().unwrap();
    for alg in [JWA::RS256, JWA::PS256] {
        let compact = jws::sign(b"no crt", alg, &key, Headers::new()).unwrap();
        assert_eq!(
            b"no crt".to_vec(),
            jws::verify(compact.as_bytes(), alg, &verifying_key).unwrap()
        );
    }

    let exported = JWK::try_from(&key).unwrap();
    assert_eq!(
        jwk.thumbprint(ThumbprintHash::Sha256).unwrap(),
        exported.thumbprint(ThumbprintHash::Sha256).unwrap()
    );
}
