use crate::encoding::{TextEncoding, B64_BCRYPT};
use crate::error::Error;
use crate::registry::{Algorithm, AlgorithmParams};

use base64::Engine;
use rand::{rngs::OsRng, Fill};

/// bcrypt salts are always 16 bytes, rendered as 22 characters of bcrypt's
/// own radix-64 alphabet.
pub(crate) const BCRYPT_SALT_LEN: usize = 16;
pub(crate) const BCRYPT_SALT_TEXT_LEN: usize = 22;

/// Generates `length_bytes` of cryptographically secure random salt and
/// renders it under `encoding`.
///
/// Fails with [`Error::RngUnavailable`] when the operating system's secure
/// random source cannot be read. There is deliberately no fallback to a
/// non-cryptographic generator.
pub fn generate_salt(length_bytes: usize, encoding: TextEncoding) -> Result<String, Error> {
    Ok(encoding.encode(&random_bytes(length_bytes)?))
}

/// Algorithm-aware salt generation.
///
/// For bcrypt this produces the 22-character payload of a fresh 16-byte salt
/// in bcrypt's own alphabet, exactly what the primitive's salt generator
/// emits after its `$2a$<cost>$` prefix; the prefix is never part of the
/// stored salt. For the other algorithms it defers to [`generate_salt`] with
/// the parameter set's salt length.
pub fn generate_algorithm_salt(
    params: &AlgorithmParams,
    encoding: TextEncoding,
) -> Result<String, Error> {
    match params.salt_length() {
        Some(length) => generate_salt(length, encoding),
        None => Ok(B64_BCRYPT.encode(random_bytes(BCRYPT_SALT_LEN)?)),
    }
}

/// The number of bytes `salt` represents under `encoding`.
///
/// For bcrypt, a 22-character salt counts as 16 bytes and anything else as 0.
/// Hex counts ceil(len/2). Base64 counts the decoded length, estimating
/// `floor(len * 3 / 4)` for text that does not decode. This supports
/// reporting and input hints only; hashing paths decode strictly.
pub fn salt_byte_length(salt: &str, encoding: TextEncoding, algorithm: Option<Algorithm>) -> usize {
    if salt.is_empty() {
        return 0;
    }

    if algorithm == Some(Algorithm::Bcrypt) {
        return if salt.len() == BCRYPT_SALT_TEXT_LEN {
            BCRYPT_SALT_LEN
        } else {
            0
        };
    }

    match encoding {
        TextEncoding::Hex => salt.len().div_ceil(2),
        TextEncoding::Base64 => match encoding.decode(salt) {
            Ok(bytes) => bytes.len(),
            Err(_) => salt.len() * 3 / 4,
        },
    }
}

/// Decodes a bare 22-character bcrypt salt payload into its 16 bytes.
/// `None` when the text has the wrong width or strays outside the alphabet.
pub(crate) fn bcrypt_salt_bytes(text: &str) -> Option<[u8; BCRYPT_SALT_LEN]> {
    if text.len() != BCRYPT_SALT_TEXT_LEN {
        return None;
    }

    B64_BCRYPT.decode(text).ok()?.try_into().ok()
}

/// Coerces arbitrary salt bytes to bcrypt's fixed 16, zero-padding short
/// input and truncating long input.
pub(crate) fn coerce_bcrypt_salt(bytes: &[u8]) -> [u8; BCRYPT_SALT_LEN] {
    let mut out = [0u8; BCRYPT_SALT_LEN];
    let n = bytes.len().min(BCRYPT_SALT_LEN);
    out[..n].copy_from_slice(&bytes[..n]);
    out
}

fn random_bytes(length: usize) -> Result<Vec<u8>, Error> {
    let mut bytes = vec![0u8; length];
    bytes
        .try_fill(&mut OsRng)
        .map_err(|e| Error::RngUnavailable(e.to_string()))?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_round_trips_at_every_length() {
        for length in [8usize, 16, 32, 64] {
            for encoding in [TextEncoding::Hex, TextEncoding::Base64] {
                let salt = generate_salt(length, encoding).unwrap();
                assert_eq!(encoding.decode(&salt).unwrap().len(), length);
            }
        }
    }

    #[test]
    fn test_generated_salts_differ() {
        let a = generate_salt(16, TextEncoding::Hex).unwrap();
        let b = generate_salt(16, TextEncoding::Hex).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_bcrypt_algorithm_salt_is_a_bare_payload() {
        let params = AlgorithmParams::defaults(Algorithm::Bcrypt);
        let salt = generate_algorithm_salt(&params, TextEncoding::Hex).unwrap();

        assert_eq!(salt.len(), BCRYPT_SALT_TEXT_LEN);
        assert!(!salt.starts_with('$'));
        assert!(bcrypt_salt_bytes(&salt).is_some());
    }

    #[test]
    fn test_algorithm_salt_respects_param_length() {
        let params = AlgorithmParams::Scrypt(crate::registry::ScryptParams {
            salt_length: 24,
            ..Default::default()
        });

        let salt = generate_algorithm_salt(&params, TextEncoding::Hex).unwrap();
        assert_eq!(salt.len(), 48);
    }

    #[test]
    fn test_salt_byte_length_bcrypt_rule() {
        let payload = "N9qo8uLOickgx2ZMRZoMye";

        assert_eq!(
            salt_byte_length(payload, TextEncoding::Hex, Some(Algorithm::Bcrypt)),
            16
        );
        assert_eq!(
            salt_byte_length("tooshort", TextEncoding::Hex, Some(Algorithm::Bcrypt)),
            0
        );
    }

    #[test]
    fn test_salt_byte_length_hex_and_base64() {
        assert_eq!(salt_byte_length("", TextEncoding::Hex, None), 0);
        assert_eq!(salt_byte_length("abc", TextEncoding::Hex, None), 2);
        assert_eq!(salt_byte_length("abcd", TextEncoding::Hex, None), 2);
        assert_eq!(salt_byte_length("AAAA", TextEncoding::Base64, None), 3);
        assert_eq!(salt_byte_length("AA==", TextEncoding::Base64, None), 1);
        // Undecodable base64 falls back to the floor estimate.
        assert_eq!(salt_byte_length("!!!!!!!!", TextEncoding::Base64, None), 6);
    }

    #[test]
    fn test_coerce_bcrypt_salt_pads_and_truncates() {
        assert_eq!(
            coerce_bcrypt_salt(&[1, 2, 3]),
            [1, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );

        let long = [7u8; 20];
        assert_eq!(coerce_bcrypt_salt(&long), [7u8; 16]);
    }
}
