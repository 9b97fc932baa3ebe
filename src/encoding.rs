use crate::error::Error;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use std::fmt;

const PAD_INDIFFERENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// Standard alphabet, padded output. Used for caller-facing base64 text
/// (salts and raw hashes). Decoding accepts padded or unpadded input.
pub(crate) const B64_TEXT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, PAD_INDIFFERENT);

/// Standard alphabet, no padding on output. Used for the salt and hash
/// payloads of `$argon2id$`, `$scrypt$`, and `$pbkdf2-sha256$` strings.
/// Decoding tolerates padded input so hashes from padding-happy encoders
/// still parse.
pub(crate) const B64_PHC: GeneralPurpose =
    GeneralPurpose::new(&alphabet::STANDARD, PAD_INDIFFERENT.with_encode_padding(false));

/// Bcrypt's `./A-Za-z0-9` alphabet, never padded. A 16-byte salt encodes to
/// 22 characters whose final 4 bits are ignored; trailing-bit tolerance keeps
/// salts from encoders that do not zero them parseable.
pub(crate) const B64_BCRYPT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// How salt and hash bytes are rendered as text.
///
/// The default is hex. Base64 here means the standard `+/` alphabet with `=`
/// padding on output; decoding accepts both padded and unpadded input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextEncoding {
    /// Lowercase hexadecimal, two characters per byte
    #[default]
    Hex,

    /// Standard-alphabet base64
    Base64,
}

impl TextEncoding {
    /// The lowercase name of this encoding (`"hex"` or `"base64"`).
    pub fn as_str(self) -> &'static str {
        match self {
            TextEncoding::Hex => "hex",
            TextEncoding::Base64 => "base64",
        }
    }

    /// Renders bytes as text under this encoding.
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Hex => hex::encode(bytes),
            TextEncoding::Base64 => B64_TEXT.encode(bytes),
        }
    }

    /// Decodes text back into bytes.
    ///
    /// Fails with [`Error::Decode`] on odd-length or non-hex-digit input for
    /// hex, or characters outside the alphabet for base64.
    pub fn decode(self, text: &str) -> Result<Vec<u8>, Error> {
        match self {
            TextEncoding::Hex => hex::decode(text).map_err(|e| Error::decode(self, e)),
            TextEncoding::Base64 => B64_TEXT.decode(text).map_err(|e| Error::decode(self, e)),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let bytes = [0x00u8, 0x01, 0xab, 0xff, 0x7e];
        let text = TextEncoding::Hex.encode(&bytes);

        assert_eq!(text, "0001abff7e");
        assert_eq!(TextEncoding::Hex.decode(&text).unwrap(), bytes);
    }

    #[test]
    fn test_base64_round_trip() {
        let bytes = [0xdeu8, 0xad, 0xbe, 0xef];
        let text = TextEncoding::Base64.encode(&bytes);

        assert_eq!(text, "3q2+7w==");
        assert_eq!(TextEncoding::Base64.decode(&text).unwrap(), bytes);
    }

    #[test]
    fn test_base64_decode_accepts_unpadded() {
        assert_eq!(
            TextEncoding::Base64.decode("3q2+7w").unwrap(),
            [0xdeu8, 0xad, 0xbe, 0xef]
        );
    }

    #[test]
    fn test_hex_rejects_odd_length() {
        assert!(TextEncoding::Hex.decode("abc").is_err());
    }

    #[test]
    fn test_hex_rejects_non_hex_digit() {
        assert!(TextEncoding::Hex.decode("zz").is_err());
    }

    #[test]
    fn test_base64_rejects_bad_alphabet() {
        assert!(TextEncoding::Base64.decode("not base64!!").is_err());
    }

    #[test]
    fn test_phc_engine_never_pads() {
        assert_eq!(B64_PHC.encode([0xdeu8, 0xad, 0xbe, 0xef, 0x01]), "3q2+7wE");
        assert_eq!(
            B64_PHC.decode("3q2+7wE").unwrap(),
            B64_PHC.decode("3q2+7wE=").unwrap()
        );
    }

    #[test]
    fn test_bcrypt_alphabet_salt_width() {
        let salt = [0x55u8; 16];
        let text = B64_BCRYPT.encode(salt);

        assert_eq!(text.len(), 22);
        assert_eq!(B64_BCRYPT.decode(&text).unwrap(), salt);
    }
}
