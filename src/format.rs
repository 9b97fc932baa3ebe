use crate::encoding::{B64_BCRYPT, B64_PHC};
use crate::error::Error;
use crate::registry::{
    Algorithm, AlgorithmParams, Argon2Params, BcryptParams, Pbkdf2Params, ScryptParams,
};
use crate::salt::{bcrypt_salt_bytes, BCRYPT_SALT_TEXT_LEN};

use base64::Engine;
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// The only Argon2 version these strings may carry.
const ARGON2_VERSION: u32 = 19;

/// bcrypt's digest is always 31 characters, following the 22-character salt.
const BCRYPT_DIGEST_TEXT_LEN: usize = 31;

// Evaluated top to bottom; first match wins.
const PREFIXES: &[(&str, Algorithm)] = &[
    ("$argon2id$", Algorithm::Argon2id),
    ("$scrypt$", Algorithm::Scrypt),
    ("$2a$", Algorithm::Bcrypt),
    ("$2b$", Algorithm::Bcrypt),
    ("$2y$", Algorithm::Bcrypt),
    ("$pbkdf2-sha256$", Algorithm::Pbkdf2),
];

/// Determines which algorithm produced an encoded hash string by examining
/// its prefix.
///
/// Fails with [`Error::UnknownAlgorithm`] when the string starts with none of
/// the recognized prefixes. A matching prefix says nothing about the rest of
/// the string; parsing may still reject it.
///
/// ```rust
/// use pwforge::{detect_algorithm, Algorithm};
///
/// let algorithm = detect_algorithm("$2b$12$abcdefghijklmnopqrstuv").unwrap();
/// assert_eq!(algorithm, Algorithm::Bcrypt);
///
/// assert!(detect_algorithm("not-a-hash").is_err());
/// ```
pub fn detect_algorithm(encoded: &str) -> Result<Algorithm, Error> {
    PREFIXES
        .iter()
        .find(|(prefix, _)| encoded.starts_with(prefix))
        .map(|(_, algorithm)| *algorithm)
        .ok_or(Error::UnknownAlgorithm)
}

/// An encoded hash string decomposed into algorithm, parameters, salt, and
/// hash.
///
/// Parsing ([`FromStr`]) and serialization ([`fmt::Display`]) are exact
/// inverses for every valid string, so a parsed hash can be re-rendered
/// without losing information. Numeric parameters are kept exactly as the
/// string carried them; nothing is normalized toward registry defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedHash {
    /// A `$argon2id$v=19$m=..,t=..,p=..$salt$hash` PHC string
    Argon2id {
        /// Memory cost in KiB, exactly as the `m=` field carries it
        memory_kib: u32,
        /// Passes over memory, the `t=` field
        iterations: u32,
        /// Lane count, the `p=` field
        parallelism: u32,
        /// Decoded salt bytes
        salt: Vec<u8>,
        /// Decoded hash bytes
        hash: Vec<u8>,
    },

    /// A `$scrypt$ln=..,r=..,p=..$salt$hash` PHC string
    Scrypt {
        /// log2 of the cost factor, the `ln=` field
        log_n: u8,
        /// Block size, the `r=` field
        r: u32,
        /// Parallelization, the `p=` field
        p: u32,
        /// Decoded salt bytes
        salt: Vec<u8>,
        /// Decoded hash bytes
        hash: Vec<u8>,
    },

    /// A native `$2a$cost$<22-char-salt><31-char-hash>` bcrypt string
    Bcrypt {
        /// Cost factor from the second field
        cost: u32,
        /// The 22-character salt payload
        salt: String,
        /// The complete string; bcrypt has no separate raw hash
        encoded: String,
    },

    /// A `$pbkdf2-sha256$iterations$salt$hash` string
    Pbkdf2 {
        /// HMAC-SHA-256 iteration count
        iterations: u32,
        /// Decoded salt bytes
        salt: Vec<u8>,
        /// Decoded hash bytes
        hash: Vec<u8>,
    },
}

impl ParsedHash {
    /// The algorithm this hash was produced with.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            ParsedHash::Argon2id { .. } => Algorithm::Argon2id,
            ParsedHash::Scrypt { .. } => Algorithm::Scrypt,
            ParsedHash::Bcrypt { .. } => Algorithm::Bcrypt,
            ParsedHash::Pbkdf2 { .. } => Algorithm::Pbkdf2,
        }
    }

    /// The parameter set embedded in the string, in registry units.
    ///
    /// Salt and key lengths are taken from the decoded payloads. Argon2id
    /// memory is reported in whole MiB, rounding down when the string's KiB
    /// value is not MiB-aligned; the exact KiB value stays available on the
    /// variant itself.
    pub fn params(&self) -> AlgorithmParams {
        match self {
            ParsedHash::Argon2id {
                memory_kib,
                iterations,
                parallelism,
                salt,
                hash,
            } => AlgorithmParams::Argon2id(Argon2Params {
                memory_mib: memory_kib / 1024,
                iterations: *iterations,
                parallelism: *parallelism,
                salt_length: salt.len(),
                key_length: hash.len(),
            }),
            ParsedHash::Scrypt {
                log_n,
                r,
                p,
                salt,
                hash,
            } => AlgorithmParams::Scrypt(ScryptParams {
                n: 1u32.checked_shl(u32::from(*log_n)).unwrap_or(u32::MAX),
                r: *r,
                p: *p,
                salt_length: salt.len(),
                key_length: hash.len(),
            }),
            ParsedHash::Bcrypt { cost, .. } => AlgorithmParams::Bcrypt(BcryptParams { cost: *cost }),
            ParsedHash::Pbkdf2 {
                iterations,
                salt,
                hash,
            } => AlgorithmParams::Pbkdf2(Pbkdf2Params {
                iterations: *iterations,
                salt_length: salt.len(),
                key_length: hash.len(),
            }),
        }
    }

    /// Parses `encoded` under one specific algorithm's grammar, skipping
    /// prefix detection.
    ///
    /// A string of some other algorithm fails with [`Error::MalformedHash`],
    /// since it cannot satisfy this grammar.
    pub fn parse_as(algorithm: Algorithm, encoded: &str) -> Result<Self, Error> {
        match algorithm {
            Algorithm::Argon2id => parse_argon2id(encoded),
            Algorithm::Scrypt => parse_scrypt(encoded),
            Algorithm::Bcrypt => parse_bcrypt(encoded),
            Algorithm::Pbkdf2 => parse_pbkdf2(encoded),
        }
    }
}

impl FromStr for ParsedHash {
    type Err = Error;

    /// Detects the algorithm from the string's prefix, then parses under that
    /// algorithm's grammar.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let algorithm = detect_algorithm(s)?;
        trace!(%algorithm, "detected hash format");

        Self::parse_as(algorithm, s)
    }
}

impl fmt::Display for ParsedHash {
    /// Renders the canonical encoded form. PHC payloads use unpadded base64;
    /// bcrypt strings are reproduced exactly as parsed or computed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedHash::Argon2id {
                memory_kib,
                iterations,
                parallelism,
                salt,
                hash,
            } => write!(
                f,
                "$argon2id$v={ARGON2_VERSION}$m={},t={},p={}${}${}",
                memory_kib,
                iterations,
                parallelism,
                B64_PHC.encode(salt),
                B64_PHC.encode(hash),
            ),
            ParsedHash::Scrypt {
                log_n,
                r,
                p,
                salt,
                hash,
            } => write!(
                f,
                "$scrypt$ln={},r={},p={}${}${}",
                log_n,
                r,
                p,
                B64_PHC.encode(salt),
                B64_PHC.encode(hash),
            ),
            ParsedHash::Bcrypt { encoded, .. } => f.write_str(encoded),
            ParsedHash::Pbkdf2 {
                iterations,
                salt,
                hash,
            } => write!(
                f,
                "$pbkdf2-sha256${}${}${}",
                iterations,
                B64_PHC.encode(salt),
                B64_PHC.encode(hash),
            ),
        }
    }
}

fn parse_u32(field: &str, reason: &'static str) -> Result<u32, Error> {
    field.parse().map_err(|_| Error::MalformedHash(reason))
}

fn decode_payload(field: &str, reason: &'static str) -> Result<Vec<u8>, Error> {
    if field.is_empty() {
        return Err(Error::MalformedHash(reason));
    }

    B64_PHC.decode(field).map_err(|_| Error::MalformedHash(reason))
}

/// Splits a `k=v,k=v` section against an expected key set. Keys may appear in
/// any order; each must appear exactly once and nothing else may.
fn parse_kv_section<'a, const N: usize>(
    section: &'a str,
    keys: [&'static str; N],
    missing: &'static str,
) -> Result<[&'a str; N], Error> {
    let mut values: [Option<&str>; N] = [None; N];

    for piece in section.split(',') {
        let (key, value) = piece
            .split_once('=')
            .ok_or(Error::MalformedHash("parameter is not a key=value pair"))?;

        if value.is_empty() {
            return Err(Error::MalformedHash("parameter has an empty value"));
        }

        let slot = keys
            .iter()
            .position(|k| *k == key)
            .ok_or(Error::MalformedHash("unrecognized parameter key"))?;

        if values[slot].is_some() {
            return Err(Error::MalformedHash("duplicate parameter key"));
        }

        values[slot] = Some(value);
    }

    let mut out = [""; N];
    for (slot, value) in values.into_iter().enumerate() {
        out[slot] = value.ok_or(Error::MalformedHash(missing))?;
    }

    Ok(out)
}

fn parse_argon2id(s: &str) -> Result<ParsedHash, Error> {
    let fields: Vec<&str> = s.split('$').collect();

    let [empty, tag, version, section, salt, hash] = fields.as_slice() else {
        return Err(Error::MalformedHash(
            "argon2id string must be $argon2id$v=19$m=..,t=..,p=..$salt$hash",
        ));
    };

    if !empty.is_empty() || *tag != "argon2id" {
        return Err(Error::MalformedHash("string must begin with $argon2id$"));
    }

    let version = version
        .strip_prefix("v=")
        .ok_or(Error::MalformedHash("missing algorithm version"))?;
    if parse_u32(version, "version is not a number")? != ARGON2_VERSION {
        return Err(Error::MalformedHash("hash version is unsupported"));
    }

    let [m, t, p] = parse_kv_section(
        section,
        ["m", "t", "p"],
        "argon2id parameters must include m, t, and p",
    )?;

    Ok(ParsedHash::Argon2id {
        memory_kib: parse_u32(m, "m is not a number")?,
        iterations: parse_u32(t, "t is not a number")?,
        parallelism: parse_u32(p, "p is not a number")?,
        salt: decode_payload(salt, "invalid base64 in salt")?,
        hash: decode_payload(hash, "missing or invalid base64 hash after salt")?,
    })
}

fn parse_scrypt(s: &str) -> Result<ParsedHash, Error> {
    let fields: Vec<&str> = s.split('$').collect();

    let [empty, tag, section, salt, hash] = fields.as_slice() else {
        return Err(Error::MalformedHash(
            "scrypt string must be $scrypt$ln=..,r=..,p=..$salt$hash",
        ));
    };

    if !empty.is_empty() || *tag != "scrypt" {
        return Err(Error::MalformedHash("string must begin with $scrypt$"));
    }

    let [ln, r, p] = parse_kv_section(
        section,
        ["ln", "r", "p"],
        "scrypt parameters must include ln, r, and p",
    )?;

    let log_n = parse_u32(ln, "ln is not a number")?;
    if log_n >= 64 {
        return Err(Error::MalformedHash("ln is out of range"));
    }

    Ok(ParsedHash::Scrypt {
        log_n: log_n as u8,
        r: parse_u32(r, "r is not a number")?,
        p: parse_u32(p, "p is not a number")?,
        salt: decode_payload(salt, "invalid base64 in salt")?,
        hash: decode_payload(hash, "missing or invalid base64 hash after salt")?,
    })
}

fn parse_bcrypt(s: &str) -> Result<ParsedHash, Error> {
    let fields: Vec<&str> = s.split('$').collect();

    let [empty, version, cost, payload] = fields.as_slice() else {
        return Err(Error::MalformedHash(
            "bcrypt string must be $2a$cost$<22-char-salt><31-char-hash>",
        ));
    };

    if !empty.is_empty() || !matches!(*version, "2a" | "2b" | "2y") {
        return Err(Error::MalformedHash("unsupported bcrypt version tag"));
    }

    let cost = parse_u32(cost, "cost is not a number")?;

    if !payload.is_ascii() || payload.len() != BCRYPT_SALT_TEXT_LEN + BCRYPT_DIGEST_TEXT_LEN {
        return Err(Error::MalformedHash(
            "bcrypt payload must be 53 characters of salt and hash",
        ));
    }

    let salt = &payload[..BCRYPT_SALT_TEXT_LEN];
    if bcrypt_salt_bytes(salt).is_none() {
        return Err(Error::MalformedHash("salt is not valid bcrypt base64"));
    }

    if B64_BCRYPT.decode(&payload[BCRYPT_SALT_TEXT_LEN..]).is_err() {
        return Err(Error::MalformedHash("hash is not valid bcrypt base64"));
    }

    Ok(ParsedHash::Bcrypt {
        cost,
        salt: salt.to_string(),
        encoded: s.to_string(),
    })
}

fn parse_pbkdf2(s: &str) -> Result<ParsedHash, Error> {
    let fields: Vec<&str> = s.split('$').collect();

    let [empty, tag, iterations, salt, hash] = fields.as_slice() else {
        return Err(Error::MalformedHash(
            "pbkdf2 string must be $pbkdf2-sha256$iterations$salt$hash",
        ));
    };

    if !empty.is_empty() || *tag != "pbkdf2-sha256" {
        return Err(Error::MalformedHash(
            "string must begin with $pbkdf2-sha256$",
        ));
    }

    Ok(ParsedHash::Pbkdf2 {
        iterations: parse_u32(iterations, "iteration count is not a number")?,
        salt: decode_payload(salt, "invalid base64 in salt")?,
        hash: decode_payload(hash, "missing or invalid base64 hash after salt")?,
    })
}
