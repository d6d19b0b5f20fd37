//! DER forms of RSA keys.
//!
//! The crypto backend only accepts RSA key pairs as DER, while JWK stores
//! their big integers as separate fields. The ASN.1 structures come from
//! the `pkcs1` and `pkcs8` crates as re-exported by `rsa`.

use rsa::{
    BigUint, RsaPublicKey,
    pkcs1::{
        self,
        der::{Encode as _, asn1::UintRef},
    },
    pkcs8::{EncodePublicKey as _, PrivateKeyInfo},
};
use tollgate_error::ErrorContext as _;
use zeroize::Zeroizing;

use super::{JoseError, JoseErrorKind};

/// Largest modulus accepted by the crypto backend, in bits.
const MAX_MODULUS_BITS: usize = 8192;

/// Big integers of a two-prime RSA private key, in `RSAPrivateKey` order.
#[cfg_attr(test, derive(Debug))]
pub(crate) struct RsaPrivateKeyFields<B> {
    pub(crate) n: B,
    pub(crate) e: B,
    pub(crate) d: B,
    pub(crate) p: B,
    pub(crate) q: B,
    pub(crate) dp: B,
    pub(crate) dq: B,
    pub(crate) qi: B,
}

/// CRT values of a two-prime key: `d mod (p-1)`, `d mod (q-1)` and `q^-1 mod p`.
///
/// The inverse is taken as `q^(p-2) mod p`, which holds since `p` is prime.
pub(crate) fn crt_values(
    d: &[u8],
    p: &[u8],
    q: &[u8],
) -> Result<[Zeroizing<Vec<u8>>; 3], JoseError> {
    let d = BigUint::from_bytes_be(d);
    let p = BigUint::from_bytes_be(p);
    let q = BigUint::from_bytes_be(q);

    let two = BigUint::from(2_u64);
    if p <= two || q <= two {
        return Err(JoseError::from_display(
            JoseErrorKind::InvalidKeyMaterial,
            "rsa prime is too small",
        ));
    }
    let one = BigUint::from(1_u64);

    let dp = &d % &(&p - &one);
    let dq = &d % &(&q - &one);
    let qi = q.modpow(&(&p - &two), &p);
    Ok([dp, dq, qi].map(|value| Zeroizing::new(value.to_bytes_be())))
}

/// Encode the `SubjectPublicKeyInfo` of an RSA public key,
/// see section 4.1 of [RFC 5280](https://datatracker.ietf.org/doc/rfc5280/).
pub(crate) fn encode_subject_public_key_info(n: &[u8], e: &[u8]) -> Result<Vec<u8>, JoseError> {
    let key = RsaPublicKey::new_with_max_size(
        BigUint::from_bytes_be(n),
        BigUint::from_bytes_be(e),
        MAX_MODULUS_BITS,
    )
    .context("create rsa public key")
    .map_err(JoseError::invalid_key_material)?;
    let document = key
        .to_public_key_der()
        .context("encode rsa subject public key info")
        .map_err(JoseError::invalid_key_material)?;
    Ok(document.into_vec())
}

/// Encode a two-prime `RSAPrivateKey` as defined in appendix A.1.2 of
/// [RFC 8017](https://datatracker.ietf.org/doc/rfc8017/).
pub(crate) fn encode_rsa_private_key<B: AsRef<[u8]>>(
    fields: &RsaPrivateKeyFields<B>,
) -> Result<Zeroizing<Vec<u8>>, JoseError> {
    let key = pkcs1::RsaPrivateKey {
        modulus: uint(&fields.n)?,
        public_exponent: uint(&fields.e)?,
        private_exponent: uint(&fields.d)?,
        prime1: uint(&fields.p)?,
        prime2: uint(&fields.q)?,
        exponent1: uint(&fields.dp)?,
        exponent2: uint(&fields.dq)?,
        coefficient: uint(&fields.qi)?,
        other_prime_infos: None,
    };
    key.to_der()
        .map(Zeroizing::new)
        .context("encode rsa private key")
        .map_err(JoseError::invalid_key_material)
}

fn uint(value: &impl AsRef<[u8]>) -> Result<UintRef<'_>, JoseError> {
    UintRef::new(value.as_ref())
        .context("encode rsa integer")
        .map_err(JoseError::invalid_key_material)
}

/// Extract the RSA key fields of a PKCS#8 `PrivateKeyInfo`,
/// see section 5 of [RFC 5208](https://datatracker.ietf.org/doc/rfc5208/).
pub(crate) fn decode_rsa_pkcs8(
    der: &[u8],
) -> Result<RsaPrivateKeyFields<Zeroizing<Vec<u8>>>, JoseError> {
    let info = PrivateKeyInfo::try_from(der)
        .context("decode pkcs8 private key info")
        .map_err(JoseError::invalid_key_material)?;
    if info.algorithm.oid != pkcs1::ALGORITHM_OID {
        return Err(JoseError::incompatible_target(
            "pkcs8 key is not an rsa encryption key",
        ));
    }

    let key = pkcs1::RsaPrivateKey::try_from(info.private_key)
        .context("decode rsa private key")
        .map_err(JoseError::invalid_key_material)?;
    if key.other_prime_infos.is_some() {
        return Err(JoseError::from_display(
            JoseErrorKind::InvalidKeyMaterial,
            "multi-prime rsa keys are not supported",
        ));
    }

    let owned = |value: UintRef<'_>| Zeroizing::new(value.as_bytes().to_vec());
    Ok(RsaPrivateKeyFields {
        n: owned(key.modulus),
        e: owned(key.public_exponent),
        d: owned(key.private_exponent),
        p: owned(key.prime1),
        q: owned(key.prime2),
        dp: owned(key.exponent1),
        dq: owned(key.exponent2),
        qi: owned(key.coefficient),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_lc_rs::{
        encoding::AsDer as _,
        rsa::KeySize,
        signature::{KeyPair as _, RsaKeyPair},
    };

    #[test]
    fn crt_values_of_small_key() {
        // p = 61, q = 53, e = 17, d = 413
        let [dp, dq, qi] = crt_values(&413_u16.to_be_bytes(), &[61], &[53]).unwrap();
        assert_eq!(&[53], dp.as_slice());
        assert_eq!(&[49], dq.as_slice());
        assert_eq!(&[38], qi.as_slice());

        let err = crt_values(&[7], &[2], &[53]).unwrap_err();
        assert!(err.is(&JoseErrorKind::InvalidKeyMaterial));
    }

    #[test]
    fn private_key_round_trip() {
        let key_pair = RsaKeyPair::generate(KeySize::Rsa2048).unwrap();
        let pkcs8 = key_pair.as_der().unwrap();
        let fields = decode_rsa_pkcs8(pkcs8.as_ref()).unwrap();

        let [dp, dq, qi] = crt_values(&fields.d, &fields.p, &fields.q).unwrap();
        assert_eq!(fields.dp, dp);
        assert_eq!(fields.dq, dq);
        assert_eq!(fields.qi, qi);

        let der = encode_rsa_private_key(&fields).unwrap();
        let recreated = RsaKeyPair::from_der(&der).unwrap();
        assert_eq!(
            key_pair.public_key().as_ref(),
            recreated.public_key().as_ref()
        );
    }

    #[test]
    fn reader_rejects_bad_input() {
        let err = decode_rsa_pkcs8(&[0x30, 0x03, 0x02, 0x01]).unwrap_err();
        assert!(err.is(&JoseErrorKind::InvalidKeyMaterial));
    }
}
