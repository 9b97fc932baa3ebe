use crate::encoding::{TextEncoding, B64_BCRYPT};
use crate::engine;
use crate::error::Error;
use crate::format::ParsedHash;
use crate::registry::{Algorithm, AlgorithmParams};
use crate::salt::{
    bcrypt_salt_bytes, coerce_bcrypt_salt, generate_algorithm_salt, BCRYPT_SALT_LEN,
    BCRYPT_SALT_TEXT_LEN,
};

use base64::Engine;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// A builder for a password hash.
///
/// A `Hasher` starts from the registry defaults of one algorithm and lets you
/// override the parameter set, the salt, the text encodings, and (for
/// Argon2id) a secret key before computing. Hashing consumes the builder.
///
/// ```rust
/// use pwforge::{Algorithm, Hasher, Pbkdf2Params};
///
/// let result = Hasher::new(Algorithm::Pbkdf2)
///     .params(Pbkdf2Params { iterations: 1000, ..Pbkdf2Params::default() }.into())
///     .hash("correct horse battery staple")
///     .unwrap();
///
/// assert!(result.encoded().starts_with("$pbkdf2-sha256$1000$"));
/// ```
#[derive(Clone, Debug)]
pub struct Hasher<'a> {
    params: AlgorithmParams,
    custom_salt: Option<&'a str>,
    salt_encoding: TextEncoding,
    hash_encoding: TextEncoding,
    secret: Option<&'a [u8]>,
}

impl Default for Hasher<'_> {
    /// An Argon2id hasher with registry defaults: 19 MiB of memory, 2
    /// iterations, 1 lane, a random 16-byte salt, and a 32-byte hash.
    fn default() -> Self {
        Self::new(Algorithm::Argon2id)
    }
}

impl<'a> Hasher<'a> {
    /// Creates a `Hasher` with the registry defaults for `algorithm`.
    ///
    /// The defaults are chosen to be reasonable for interactive logins as of
    /// current guidance. The more resources the hashing requires, the
    /// stronger the hash; raise the cost parameters as high as your
    /// application can afford. [`crate::warnings`] flags parameter sets that
    /// fall below the advisory floors.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            params: AlgorithmParams::defaults(algorithm),
            custom_salt: None,
            salt_encoding: TextEncoding::default(),
            hash_encoding: TextEncoding::default(),
            secret: None,
        }
    }

    /// Replaces the whole parameter set, including the algorithm it implies.
    ///
    /// ```rust
    /// use pwforge::{Algorithm, BcryptParams, Hasher};
    ///
    /// let hasher = Hasher::new(Algorithm::Bcrypt)
    ///     .params(BcryptParams { cost: 4 }.into());
    /// ```
    pub fn params(mut self, params: AlgorithmParams) -> Self {
        self.params = params;
        self
    }

    /// Supplies a salt instead of generating one, for reproducing a hash
    /// deterministically.
    ///
    /// The text is interpreted in the configured salt encoding. bcrypt salts
    /// are special: a full `$2a$cost$...` string contributes its embedded
    /// 22-character salt, a bare 22-character bcrypt-base64 string is used
    /// directly, and any other text is decoded with the salt encoding and
    /// fitted to 16 bytes.
    ///
    /// When left unspecified, a salt of the parameter set's length is drawn
    /// from the operating system's secure random number generator.
    pub fn custom_salt(mut self, salt: &'a str) -> Self {
        self.custom_salt = Some(salt);
        self
    }

    /// Sets the text encoding for salts, both generated and supplied ones.
    /// Defaults to hex.
    pub fn salt_encoding(mut self, encoding: TextEncoding) -> Self {
        self.salt_encoding = encoding;
        self
    }

    /// Sets the text encoding for the derived hash bytes. Defaults to hex.
    ///
    /// bcrypt ignores this; its hash has no standalone byte form and is
    /// always reported as the full encoded string.
    pub fn hash_encoding(mut self, encoding: TextEncoding) -> Self {
        self.hash_encoding = encoding;
        self
    }

    /// Mixes a secret key, sometimes called a
    /// "[pepper](https://en.wikipedia.org/wiki/Pepper_(cryptography))," into
    /// the derivation. Only Argon2id supports this; the other algorithms fail
    /// with a computation error when a secret is set.
    ///
    /// The key should come from a cryptographically-secure random number
    /// generator and be stored separately from the hashes. A hash created
    /// with a secret can only be verified through
    /// [`crate::verify_with_secret`] with the same key.
    pub fn secret<S>(mut self, secret: &'a S) -> Self
    where
        S: AsRef<[u8]> + ?Sized,
    {
        self.secret = Some(secret.as_ref());
        self
    }

    /// Consumes the `Hasher` and computes a hash of `password`.
    ///
    /// This is deliberately expensive. For some applications it makes sense
    /// to move this call off the hot path, onto a worker thread or a blocking
    /// task.
    pub fn hash(self, password: &str) -> Result<HashResult, Error> {
        if self.secret.is_some() && self.params.algorithm() != Algorithm::Argon2id {
            return Err(Error::computation(
                self.params.algorithm(),
                "only Argon2id supports a secret",
            ));
        }

        let salt_text = match self.custom_salt {
            Some(text) => text.to_string(),
            None => generate_algorithm_salt(&self.params, self.salt_encoding)?,
        };

        let (salt_text, hash_text, encoded, elapsed) = match self.params {
            AlgorithmParams::Argon2id(p) => {
                let salt = self.salt_encoding.decode(&salt_text)?;
                let memory_kib = p.memory_mib.saturating_mul(1024);

                let derived = engine::compute_argon2id(
                    password.as_bytes(),
                    &salt,
                    memory_kib,
                    p.iterations,
                    p.parallelism,
                    p.key_length,
                    self.secret,
                )?;

                let hash_text = self.hash_encoding.encode(&derived.bytes);
                let encoded = ParsedHash::Argon2id {
                    memory_kib,
                    iterations: p.iterations,
                    parallelism: p.parallelism,
                    salt,
                    hash: derived.bytes,
                }
                .to_string();

                (salt_text, hash_text, encoded, derived.elapsed)
            }
            AlgorithmParams::Scrypt(p) => {
                let salt = self.salt_encoding.decode(&salt_text)?;
                let log_n = engine::scrypt_log_n(p.n)?;

                let derived =
                    engine::compute_scrypt(password, &salt, log_n, p.r, p.p, p.key_length)?;

                let hash_text = self.hash_encoding.encode(&derived.bytes);
                let encoded = ParsedHash::Scrypt {
                    log_n,
                    r: p.r,
                    p: p.p,
                    salt,
                    hash: derived.bytes,
                }
                .to_string();

                (salt_text, hash_text, encoded, derived.elapsed)
            }
            AlgorithmParams::Bcrypt(p) => {
                let salt = resolve_bcrypt_salt(&salt_text, self.salt_encoding)?;
                let derived = engine::compute_bcrypt(password, p.cost, salt)?;

                // The whole string is the hash; there is no separate byte
                // form to re-encode.
                (
                    B64_BCRYPT.encode(salt),
                    derived.encoded.clone(),
                    derived.encoded,
                    derived.elapsed,
                )
            }
            AlgorithmParams::Pbkdf2(p) => {
                let salt = self.salt_encoding.decode(&salt_text)?;

                // The derived key is consumed in whole 32-bit words.
                let out_len = (p.key_length / 4) * 4;
                if out_len == 0 {
                    return Err(Error::computation(
                        Algorithm::Pbkdf2,
                        "key length must be at least 4 bytes",
                    ));
                }

                let derived =
                    engine::compute_pbkdf2(password.as_bytes(), &salt, p.iterations, out_len)?;

                let hash_text = self.hash_encoding.encode(&derived.bytes);
                let encoded = ParsedHash::Pbkdf2 {
                    iterations: p.iterations,
                    salt,
                    hash: derived.bytes,
                }
                .to_string();

                (salt_text, hash_text, encoded, derived.elapsed)
            }
        };

        debug!(
            algorithm = %self.params.algorithm(),
            elapsed_ms = elapsed.as_millis() as u64,
            "password hashed"
        );

        Ok(HashResult {
            algorithm: self.params.algorithm(),
            params: self.params,
            salt: salt_text,
            salt_encoding: self.salt_encoding,
            hash: hash_text,
            hash_encoding: self.hash_encoding,
            encoded,
            elapsed,
        })
    }
}

/// Applies the bcrypt salt interpretation order: a full `$2a$cost$...` string
/// contributes its embedded payload, a bare 22-character payload is used
/// directly, and anything else is decoded with the configured encoding and
/// fitted to 16 bytes.
fn resolve_bcrypt_salt(
    text: &str,
    encoding: TextEncoding,
) -> Result<[u8; BCRYPT_SALT_LEN], Error> {
    let fields: Vec<&str> = text.split('$').collect();
    if let [empty, version, cost, payload] = fields.as_slice() {
        if empty.is_empty()
            && matches!(*version, "2a" | "2b" | "2y")
            && !cost.is_empty()
            && cost.bytes().all(|b| b.is_ascii_digit())
            && payload.is_ascii()
            && payload.len() >= BCRYPT_SALT_TEXT_LEN
        {
            if let Some(bytes) = bcrypt_salt_bytes(&payload[..BCRYPT_SALT_TEXT_LEN]) {
                return Ok(bytes);
            }
        }
    }

    if text.len() == BCRYPT_SALT_TEXT_LEN {
        if let Some(bytes) = bcrypt_salt_bytes(text) {
            return Ok(bytes);
        }
    }

    let decoded = encoding.decode(text)?;
    Ok(coerce_bcrypt_salt(&decoded))
}

/// A computed hash together with the inputs and parameters that produced it.
///
/// The encoded string ([`HashResult::encoded`], also the [`fmt::Display`]
/// form) is self-describing and is what belongs in a database; the salt and
/// hash are additionally available as text in the configured encodings.
#[derive(Clone, Debug)]
pub struct HashResult {
    algorithm: Algorithm,
    params: AlgorithmParams,
    salt: String,
    salt_encoding: TextEncoding,
    hash: String,
    hash_encoding: TextEncoding,
    encoded: String,
    elapsed: Duration,
}

impl HashResult {
    /// The algorithm that produced this hash.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The parameter set the hash was computed with.
    pub fn params(&self) -> &AlgorithmParams {
        &self.params
    }

    /// The salt as text. For bcrypt this is the 22-character salt payload in
    /// bcrypt's own base64 alphabet; otherwise it is in the salt encoding.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// The encoding [`HashResult::salt`] is expressed in.
    pub fn salt_encoding(&self) -> TextEncoding {
        self.salt_encoding
    }

    /// The derived hash as text in the hash encoding. For bcrypt this is the
    /// full encoded string, identical to [`HashResult::encoded`].
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// The encoding [`HashResult::hash`] is expressed in.
    pub fn hash_encoding(&self) -> TextEncoding {
        self.hash_encoding
    }

    /// The self-describing encoded hash string.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Wall-clock time spent inside the key derivation itself.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// [`HashResult::elapsed`] in whole milliseconds, for reporting.
    pub fn execution_time_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

impl fmt::Display for HashResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}
