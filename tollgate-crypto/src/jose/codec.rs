//! Binary field encoding used by JOSE objects.
//!
//! All binary JWK and JWS values are base64url without padding.
//! Decoding is tolerant and accepts the standard alphabet and padding as well,
//! since plenty of key sets in the wild are produced that way.

use base64::{
    Engine as _,
    prelude::{BASE64_STANDARD, BASE64_STANDARD_NO_PAD, BASE64_URL_SAFE_NO_PAD},
};
use tollgate_error::ErrorContext as _;

use super::{JoseError, JoseErrorKind};

/// Encode bytes as base64url without padding.
pub fn encode(input: impl AsRef<[u8]>) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(input)
}

/// Decode base64 bytes, url-safe or standard, padded or not.
pub fn decode(input: impl AsRef<[u8]>) -> Result<Vec<u8>, JoseError> {
    let input = input.as_ref();
    let unpadded = input
        .iter()
        .rposition(|b| *b != b'=')
        .map_or(&input[..0], |last| &input[..=last]);
    if input.len() - unpadded.len() > 2 {
        return Err(JoseError::from_display(
            JoseErrorKind::MalformedInput,
            "base64: too much padding",
        ));
    }

    let decoded = if unpadded.iter().any(|b| *b == b'+' || *b == b'/') {
        BASE64_STANDARD_NO_PAD.decode(unpadded)
    } else {
        BASE64_URL_SAFE_NO_PAD.decode(unpadded)
    };
    decoded.context("decode base64").map_err(JoseError::malformed)
}

/// Encode bytes as standard base64 with padding, as used by `x5c`.
pub fn encode_std(input: impl AsRef<[u8]>) -> String {
    BASE64_STANDARD.encode(input)
}

/// Strip leading zero bytes of a big-endian unsigned integer.
///
/// A zero value keeps a single zero byte, the result is only
/// empty if the input was empty.
pub fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|b| *b != 0) {
        Some(start) => &bytes[start..],
        None => &bytes[bytes.len().saturating_sub(1)..],
    }
}

/// Big-endian bytes of `value` with leading zeros stripped.
pub fn encode_uint(value: u64) -> Vec<u8> {
    trim_leading_zeros(&value.to_be_bytes()).to_vec()
}

/// Left pad a big-endian value with zeros to exactly `width` bytes.
///
/// Values which need more than `width` bytes are refused.
pub fn pad_left(bytes: &[u8], width: usize) -> Result<Vec<u8>, JoseError> {
    let bytes = if bytes.len() > width {
        trim_leading_zeros(bytes)
    } else {
        bytes
    };
    if bytes.len() > width {
        return Err(JoseError::from_display(
            JoseErrorKind::InvalidKeyMaterial,
            format!("value of {} bytes exceeds width {width}", bytes.len()),
        ));
    }
    let mut out = vec![0; width - bytes.len()];
    out.extend_from_slice(bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use tokio_test::assert_err;

    #[test]
    fn decode_accepts_all_variants() {
        let expected = b"1caf76a^1%a4B5656*4&fc2(b0135c2e".to_vec();
        for input in [
            "MWNhZjc2YV4xJWE0QjU2NTYqNCZmYzIoYjAxMzVjMmU=",
            "MWNhZjc2YV4xJWE0QjU2NTYqNCZmYzIoYjAxMzVjMmU",
        ] {
            assert_eq!(expected, decode(input).unwrap());
        }

        assert_eq!(vec![0xfb, 0xff], decode("-_8").unwrap());
        assert_eq!(vec![0xfb, 0xff], decode("+/8=").unwrap());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_err!(decode("a.b"));
        assert_err!(decode("abc==="));
        assert_err!(decode("a"));
    }

    #[test]
    fn trim_never_empties_nonzero() {
        assert_eq!(&[1, 0], trim_leading_zeros(&[0, 0, 1, 0]));
        assert_eq!(&[0], trim_leading_zeros(&[0, 0]));
        assert!(trim_leading_zeros(&[]).is_empty());
        assert_eq!(vec![1, 0, 1], encode_uint(65537));
        assert_eq!(vec![3], encode_uint(3));
    }

    #[test]
    fn pad_left_to_width() {
        assert_eq!(vec![0, 0, 1], pad_left(&[1], 3).unwrap());
        assert_eq!(vec![0, 1], pad_left(&[0, 0, 0, 1], 2).unwrap());
        assert_err!(pad_left(&[1, 2, 3], 2));
    }

    #[quickcheck]
    fn encode_decode_is_identity(data: Vec<u8>) -> bool {
        decode(encode(&data)).unwrap() == data && decode(encode_std(&data)).unwrap() == data
    }

    #[quickcheck]
    fn encode_uint_has_no_leading_zero(value: u64) -> bool {
        let bytes = encode_uint(value);
        !bytes.is_empty() && (value == 0 || bytes[0] != 0)
    }
}
