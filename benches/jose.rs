use divan::AllocProfiler;
use tollgate::jose::{
    JWA, JWK, JWKSet, SigningKey, SymmetricKey, VerifyingKey, jws,
    jwt::{self, ParseOptions, SignOptions, Token},
};

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    // Run registered benchmarks.
    divan::main();
}

const SECRET: &[u8] = b"benchmark shared secret";

fn signed_token() -> String {
    let jwk = JWK::new(SymmetricKey::new(SECRET.to_vec()).unwrap()).with_kid("bench".to_owned());
    jwt::sign_with_jwk(
        &Token::new().with_subject("1".to_owned()),
        JWA::HS256,
        &jwk,
        &SignOptions::new(),
    )
    .unwrap()
}

#[divan::bench]
fn jwt_parse_with_key_set(bencher: divan::Bencher) {
    let token = signed_token();
    let options = ParseOptions::new().with_key_set(
        JWKSet::new()
            .with_key(JWK::new(SymmetricKey::new(b"other".to_vec()).unwrap()).with_kid("other".to_owned()))
            .with_key(JWK::new(SymmetricKey::new(SECRET.to_vec()).unwrap()).with_kid("bench".to_owned())),
    );
    bencher.bench(|| jwt::parse_str(divan::black_box(&token), &options).unwrap());
}

#[divan::bench]
fn jwt_parse_unverified(bencher: divan::Bencher) {
    let token = signed_token();
    let options = ParseOptions::new();
    bencher.bench(|| jwt::parse_str(divan::black_box(&token), &options).unwrap());
}

#[divan::bench(args = [JWA::HS256, JWA::HS512])]
fn jws_sign(bencher: divan::Bencher, alg: JWA) {
    let key = SigningKey::octets(SECRET.to_vec());
    bencher.bench(|| jws::sign(divan::black_box(b"payload"), alg, &key, jws::Headers::new()).unwrap());
}

#[divan::bench]
fn jws_verify(bencher: divan::Bencher) {
    let compact = jws::sign(
        b"payload",
        JWA::HS256,
        &SigningKey::octets(SECRET.to_vec()),
        jws::Headers::new(),
    )
    .unwrap();
    let key = VerifyingKey::octets(SECRET.to_vec());
    bencher.bench(|| jws::verify(divan::black_box(compact.as_bytes()), JWA::HS256, &key).unwrap());
}

#[divan::bench]
fn jwk_set_parse(bencher: divan::Bencher) {
    let json = r#"{"keys":[{"kty":"oct","kid":"default","k":"MWNhZjc2YV4xJWE0QjU2NTYqNCZmYzIoYjAxMzVjMmU="}]}"#;
    bencher.bench(|| JWKSet::parse_str(divan::black_box(json)).unwrap());
}
