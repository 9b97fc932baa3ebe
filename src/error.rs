use std::fmt;

use crate::encoding::TextEncoding;
use crate::registry::Algorithm;

/// Errors that may occur when using this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Text could not be decoded under the encoding it was declared with.
    /// This normally means a non-hex digit, an odd-length hex string, or a
    /// character outside the base64 alphabet.
    #[error("invalid {encoding} input: {reason}")]
    Decode {
        /// The encoding the text was declared with
        encoding: TextEncoding,
        /// What the decoder rejected
        reason: String,
    },

    /// No cryptographically secure random source was available for salt
    /// generation. There is deliberately no fallback to a weaker generator.
    #[error("secure random source unavailable: {0}")]
    RngUnavailable(String),

    /// The underlying KDF primitive rejected its parameters or failed
    /// internally.
    #[error("{algorithm} computation failed: {cause}")]
    Computation {
        /// The algorithm whose primitive failed
        algorithm: Algorithm,
        /// The primitive's own description of the failure
        cause: String,
    },

    /// A hash string matched a known algorithm prefix but its structure does
    /// not follow that algorithm's format.
    #[error("invalid hash string: {0}")]
    MalformedHash(&'static str),

    /// A hash string does not begin with any recognized algorithm prefix.
    #[error("hash string does not match any supported algorithm format")]
    UnknownAlgorithm,
}

impl Error {
    pub(crate) fn computation(algorithm: Algorithm, cause: impl fmt::Display) -> Self {
        Error::Computation {
            algorithm,
            cause: cause.to_string(),
        }
    }

    pub(crate) fn decode(encoding: TextEncoding, reason: impl fmt::Display) -> Self {
        Error::Decode {
            encoding,
            reason: reason.to_string(),
        }
    }
}
