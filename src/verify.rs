use crate::engine;
use crate::error::Error;
use crate::format::ParsedHash;
use crate::registry::Algorithm;

use std::str::FromStr;
use subtle::ConstantTimeEq;
use tracing::debug;

/// The outcome of checking a password against an encoded hash string.
///
/// An `Ok` verification means the string was well formed and the check ran to
/// completion; whether the password matched is a separate question, answered
/// by [`Verification::is_valid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verification {
    valid: bool,
    algorithm: Algorithm,
}

impl Verification {
    /// Whether the password matches the hash.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The algorithm the hash string was produced with.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

/// Checks a password against a self-describing encoded hash string.
///
/// The algorithm and every parameter are recovered from the string itself, so
/// hashes produced under parameters that differ from the current defaults
/// keep verifying. A failed match is an `Ok` outcome with
/// [`Verification::is_valid`] false; `Err` is reserved for strings that
/// cannot be checked at all.
///
/// Because verification re-derives the hash, it costs as much as hashing did.
///
/// ```rust
/// use pwforge::{verify, Algorithm, Hasher, Pbkdf2Params};
///
/// let hash = Hasher::new(Algorithm::Pbkdf2)
///     .params(Pbkdf2Params { iterations: 1000, ..Pbkdf2Params::default() }.into())
///     .hash("hunter2")
///     .unwrap();
///
/// let outcome = verify("hunter2", hash.encoded()).unwrap();
/// assert!(outcome.is_valid());
/// assert_eq!(outcome.algorithm(), Algorithm::Pbkdf2);
///
/// assert!(!verify("*unter2", hash.encoded()).unwrap().is_valid());
/// ```
pub fn verify(password: &str, encoded: &str) -> Result<Verification, Error> {
    let parsed = ParsedHash::from_str(encoded)?;

    check(password, &parsed, None)
}

/// Checks a password against a hash string of one specific algorithm,
/// skipping prefix detection.
///
/// The string must satisfy that algorithm's grammar; a string of any other
/// algorithm fails with [`Error::MalformedHash`].
pub fn verify_as(
    password: &str,
    encoded: &str,
    algorithm: Algorithm,
) -> Result<Verification, Error> {
    let parsed = ParsedHash::parse_as(algorithm, encoded)?;

    check(password, &parsed, None)
}

/// Checks a password against an Argon2id hash that was created with a secret
/// key through [`crate::Hasher::secret`].
///
/// Hash strings of the other algorithms fail with a computation error, since
/// they cannot have been created with a secret.
pub fn verify_with_secret<S>(
    password: &str,
    encoded: &str,
    secret: &S,
) -> Result<Verification, Error>
where
    S: AsRef<[u8]> + ?Sized,
{
    let parsed = ParsedHash::from_str(encoded)?;

    check(password, &parsed, Some(secret.as_ref()))
}

fn check(
    password: &str,
    parsed: &ParsedHash,
    secret: Option<&[u8]>,
) -> Result<Verification, Error> {
    let algorithm = parsed.algorithm();

    if secret.is_some() && algorithm != Algorithm::Argon2id {
        return Err(Error::computation(algorithm, "only Argon2id supports a secret"));
    }

    let valid = match parsed {
        ParsedHash::Argon2id {
            memory_kib,
            iterations,
            parallelism,
            salt,
            hash,
        } => {
            let derived = engine::compute_argon2id(
                password.as_bytes(),
                salt,
                *memory_kib,
                *iterations,
                *parallelism,
                hash.len(),
                secret,
            )?;

            bool::from(derived.bytes.ct_eq(hash))
        }
        ParsedHash::Scrypt {
            log_n,
            r,
            p,
            salt,
            hash,
        } => {
            let derived = engine::compute_scrypt(password, salt, *log_n, *r, *p, hash.len())?;

            bool::from(derived.bytes.ct_eq(hash))
        }
        ParsedHash::Bcrypt { encoded, .. } => {
            bcrypt::verify(password, encoded).map_err(|e| Error::computation(algorithm, e))?
        }
        ParsedHash::Pbkdf2 {
            iterations,
            salt,
            hash,
        } => {
            let derived =
                engine::compute_pbkdf2(password.as_bytes(), salt, *iterations, hash.len())?;

            bool::from(derived.bytes.ct_eq(hash))
        }
    };

    debug!(%algorithm, valid, "verification finished");

    Ok(Verification { valid, algorithm })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::B64_TEXT;
    use crate::hasher::Hasher;
    use crate::registry::{
        AlgorithmParams, Argon2Params, BcryptParams, Pbkdf2Params, ScryptParams,
    };
    use base64::Engine;

    fn cheap_params(algorithm: Algorithm) -> AlgorithmParams {
        match algorithm {
            Algorithm::Argon2id => AlgorithmParams::Argon2id(Argon2Params {
                memory_mib: 8,
                iterations: 1,
                parallelism: 1,
                ..Argon2Params::default()
            }),
            Algorithm::Scrypt => AlgorithmParams::Scrypt(ScryptParams {
                n: 1024,
                ..ScryptParams::default()
            }),
            Algorithm::Bcrypt => AlgorithmParams::Bcrypt(BcryptParams { cost: 4 }),
            Algorithm::Pbkdf2 => AlgorithmParams::Pbkdf2(Pbkdf2Params {
                iterations: 1000,
                ..Pbkdf2Params::default()
            }),
        }
    }

    #[test]
    fn test_round_trip_every_algorithm() {
        for algorithm in Algorithm::ALL {
            let hash = Hasher::new(algorithm)
                .params(cheap_params(algorithm))
                .hash("correct horse battery staple")
                .unwrap();

            let outcome = verify("correct horse battery staple", hash.encoded()).unwrap();
            assert!(outcome.is_valid(), "{algorithm} round trip failed");
            assert_eq!(outcome.algorithm(), algorithm);

            let outcome = verify("incorrect horse battery staple", hash.encoded()).unwrap();
            assert!(!outcome.is_valid(), "{algorithm} accepted a wrong password");
        }
    }

    #[test]
    fn test_pbkdf2_fixed_string_verifies() {
        // PBKDF2-HMAC-SHA256("password", "salt", c=1, 32 bytes), RFC 7914 appendix
        let encoded = "$pbkdf2-sha256$1$c2FsdA$Eg+2z/z4syxD5yJSVsT4N6hlSMkszDVICAWYfLcL4Xs";

        assert!(verify("password", encoded).unwrap().is_valid());
        assert!(!verify("Password", encoded).unwrap().is_valid());
    }

    #[test]
    fn test_bcrypt_fixed_string_verifies() {
        // Openwall test vector
        let encoded = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

        assert!(verify("U*U", encoded).unwrap().is_valid());
        assert!(!verify("U*U*", encoded).unwrap().is_valid());
    }

    #[test]
    fn test_argon2id_exact_kib_is_preserved() {
        // 1000 KiB is not a whole number of MiB; verification must use the
        // exact value from the string.
        let salt = vec![5u8; 16];
        let derived = engine::compute_argon2id(b"password", &salt, 1000, 1, 1, 32, None).unwrap();

        let encoded = ParsedHash::Argon2id {
            memory_kib: 1000,
            iterations: 1,
            parallelism: 1,
            salt,
            hash: derived.bytes,
        }
        .to_string();

        assert!(encoded.contains("$m=1000,"));
        assert!(verify("password", &encoded).unwrap().is_valid());
    }

    #[test]
    fn test_padded_base64_payloads_verify() {
        let hash = Hasher::new(Algorithm::Scrypt)
            .params(cheap_params(Algorithm::Scrypt))
            .hash("password")
            .unwrap();

        let ParsedHash::Scrypt { log_n, r, p, salt, hash: raw } =
            hash.encoded().parse().unwrap()
        else {
            panic!("scrypt string parsed as something else");
        };

        let padded = format!(
            "$scrypt$ln={},r={},p={}${}${}",
            log_n,
            r,
            p,
            B64_TEXT.encode(&salt),
            B64_TEXT.encode(&raw),
        );

        assert!(padded.ends_with('='));
        assert!(verify("password", &padded).unwrap().is_valid());
    }

    #[test]
    fn test_unrecognized_string_is_an_error() {
        assert!(matches!(
            verify("password", "5f4dcc3b5aa765d61d8327deb882cf99"),
            Err(Error::UnknownAlgorithm)
        ));
    }

    #[test]
    fn test_malformed_string_with_known_prefix_is_an_error() {
        assert!(matches!(
            verify("password", "$argon2id$v=19$garbage"),
            Err(Error::MalformedHash(_))
        ));
        assert!(matches!(
            verify("password", "$pbkdf2-sha256$notanumber$AA==$BB=="),
            Err(Error::MalformedHash(_))
        ));
    }

    #[test]
    fn test_verify_as_enforces_the_grammar() {
        let hash = Hasher::new(Algorithm::Pbkdf2)
            .params(cheap_params(Algorithm::Pbkdf2))
            .hash("password")
            .unwrap();

        let outcome = verify_as("password", hash.encoded(), Algorithm::Pbkdf2).unwrap();
        assert!(outcome.is_valid());

        assert!(matches!(
            verify_as("password", hash.encoded(), Algorithm::Argon2id),
            Err(Error::MalformedHash(_))
        ));
    }

    #[test]
    fn test_secret_round_trip() {
        let hash = Hasher::new(Algorithm::Argon2id)
            .params(cheap_params(Algorithm::Argon2id))
            .secret("second factor")
            .hash("password")
            .unwrap();

        assert!(verify_with_secret("password", hash.encoded(), "second factor")
            .unwrap()
            .is_valid());
        assert!(!verify_with_secret("password", hash.encoded(), "wrong factor")
            .unwrap()
            .is_valid());

        // Without the secret the derivation cannot match.
        assert!(!verify("password", hash.encoded()).unwrap().is_valid());
    }

    #[test]
    fn test_secret_is_rejected_outside_argon2id() {
        let hash = Hasher::new(Algorithm::Bcrypt)
            .params(cheap_params(Algorithm::Bcrypt))
            .hash("password")
            .unwrap();

        assert!(matches!(
            verify_with_secret("password", hash.encoded(), "key"),
            Err(Error::Computation { .. })
        ));
    }

    #[test]
    fn test_external_salt_and_hash_lengths_are_honored() {
        // 8-byte salt, 24-byte key, both off the registry defaults
        let result = Hasher::new(Algorithm::Pbkdf2)
            .params(AlgorithmParams::Pbkdf2(Pbkdf2Params {
                iterations: 1000,
                salt_length: 8,
                key_length: 24,
            }))
            .hash("password")
            .unwrap();

        assert_eq!(result.salt().len(), 16);
        assert_eq!(result.hash().len(), 48);
        assert!(verify("password", result.encoded()).unwrap().is_valid());
    }
}
