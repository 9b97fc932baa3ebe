use crate::error::Error;

use std::fmt;
use std::str::FromStr;

/// The four supported password hashing algorithms.
///
/// Argon2id is a good default for new systems. The other three are provided
/// for interoperability with hashes that already exist; all four produce
/// self-describing strings that [`crate::verify()`] can check without being
/// told the algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Memory-hard password hashing, the hybrid `id` variant specifically
    Argon2id,

    /// Memory-hard key derivation with tunable CPU/memory cost
    Scrypt,

    /// Adaptive Blowfish-based password hashing
    Bcrypt,

    /// Iterated HMAC-SHA-256 key derivation
    Pbkdf2,
}

impl Algorithm {
    /// All supported algorithms, in hash-string detection order.
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Argon2id,
        Algorithm::Scrypt,
        Algorithm::Bcrypt,
        Algorithm::Pbkdf2,
    ];

    /// The lowercase identifier used in hash-string prefixes and APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Argon2id => "argon2id",
            Algorithm::Scrypt => "scrypt",
            Algorithm::Bcrypt => "bcrypt",
            Algorithm::Pbkdf2 => "pbkdf2",
        }
    }

    /// Human-readable display name.
    pub fn label(self) -> &'static str {
        match self {
            Algorithm::Argon2id => "Argon2id",
            Algorithm::Scrypt => "scrypt",
            Algorithm::Bcrypt => "bcrypt",
            Algorithm::Pbkdf2 => "PBKDF2-HMAC-SHA256",
        }
    }

    /// One-line description of the algorithm family.
    pub fn description(self) -> &'static str {
        match self {
            Algorithm::Argon2id => "Memory-hard password hashing function",
            Algorithm::Scrypt => "Memory-hard key derivation function",
            Algorithm::Bcrypt => "Adaptive password hashing function",
            Algorithm::Pbkdf2 => "Password-based key derivation function",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "argon2id" => Ok(Algorithm::Argon2id),
            "scrypt" => Ok(Algorithm::Scrypt),
            "bcrypt" => Ok(Algorithm::Bcrypt),
            "pbkdf2" => Ok(Algorithm::Pbkdf2),
            _ => Err(Error::UnknownAlgorithm),
        }
    }
}

/// Argon2id tuning parameters.
///
/// Memory is specified in MiB, matching the registry schema; the engine
/// converts to KiB at the primitive boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in MiB
    pub memory_mib: u32,

    /// Number of passes over the memory
    pub iterations: u32,

    /// Number of lanes
    pub parallelism: u32,

    /// Length in bytes for a generated salt
    pub salt_length: usize,

    /// Output hash length in bytes
    pub key_length: usize,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_mib: 19,
            iterations: 2,
            parallelism: 1,
            salt_length: 16,
            key_length: 32,
        }
    }
}

/// scrypt tuning parameters.
///
/// `n` must be a power of two; the encoded form carries `log2(n)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScryptParams {
    /// CPU/memory cost, a power of two
    pub n: u32,

    /// Block size
    pub r: u32,

    /// Parallelization
    pub p: u32,

    /// Length in bytes for a generated salt
    pub salt_length: usize,

    /// Derived key length in bytes
    pub key_length: usize,
}

impl Default for ScryptParams {
    fn default() -> Self {
        Self {
            n: 131072,
            r: 8,
            p: 1,
            salt_length: 16,
            key_length: 32,
        }
    }
}

/// bcrypt tuning parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BcryptParams {
    /// Cost factor, the log2 of the round count
    pub cost: u32,
}

impl Default for BcryptParams {
    fn default() -> Self {
        Self { cost: 12 }
    }
}

/// PBKDF2-HMAC-SHA256 tuning parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pbkdf2Params {
    /// HMAC iteration count
    pub iterations: u32,

    /// Length in bytes for a generated salt
    pub salt_length: usize,

    /// Derived key length in bytes, consumed as whole 32-bit words
    pub key_length: usize,
}

impl Default for Pbkdf2Params {
    fn default() -> Self {
        Self {
            iterations: 600_000,
            salt_length: 16,
            key_length: 32,
        }
    }
}

/// Parameter sets for the supported algorithms, one concrete shape per
/// algorithm.
///
/// A parameter that does not exist for an algorithm cannot be expressed at
/// all, so there is no runtime name checking anywhere downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlgorithmParams {
    /// Argon2id parameter set
    Argon2id(Argon2Params),

    /// scrypt parameter set
    Scrypt(ScryptParams),

    /// bcrypt parameter set
    Bcrypt(BcryptParams),

    /// PBKDF2-HMAC-SHA256 parameter set
    Pbkdf2(Pbkdf2Params),
}

impl AlgorithmParams {
    /// The registry-default parameter set for an algorithm.
    pub fn defaults(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Argon2id => AlgorithmParams::Argon2id(Argon2Params::default()),
            Algorithm::Scrypt => AlgorithmParams::Scrypt(ScryptParams::default()),
            Algorithm::Bcrypt => AlgorithmParams::Bcrypt(BcryptParams::default()),
            Algorithm::Pbkdf2 => AlgorithmParams::Pbkdf2(Pbkdf2Params::default()),
        }
    }

    /// The algorithm this parameter set belongs to.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            AlgorithmParams::Argon2id(_) => Algorithm::Argon2id,
            AlgorithmParams::Scrypt(_) => Algorithm::Scrypt,
            AlgorithmParams::Bcrypt(_) => Algorithm::Bcrypt,
            AlgorithmParams::Pbkdf2(_) => Algorithm::Pbkdf2,
        }
    }

    /// Looks up a parameter by its schema name (`"memory"`, `"N"`, `"cost"`,
    /// `"saltLength"`, ...). Returns `None` when this algorithm has no such
    /// parameter.
    pub fn value_of(&self, name: &str) -> Option<u64> {
        let value = match self {
            AlgorithmParams::Argon2id(p) => match name {
                "memory" => p.memory_mib as u64,
                "iterations" => p.iterations as u64,
                "parallelism" => p.parallelism as u64,
                "saltLength" => p.salt_length as u64,
                "keyLength" => p.key_length as u64,
                _ => return None,
            },
            AlgorithmParams::Scrypt(p) => match name {
                "N" => p.n as u64,
                "r" => p.r as u64,
                "p" => p.p as u64,
                "saltLength" => p.salt_length as u64,
                "keyLength" => p.key_length as u64,
                _ => return None,
            },
            AlgorithmParams::Bcrypt(p) => match name {
                "cost" => p.cost as u64,
                _ => return None,
            },
            AlgorithmParams::Pbkdf2(p) => match name {
                "iterations" => p.iterations as u64,
                "saltLength" => p.salt_length as u64,
                "keyLength" => p.key_length as u64,
                _ => return None,
            },
        };

        Some(value)
    }

    /// Length in bytes for a generated salt. `None` for bcrypt, whose salts
    /// are always 16 bytes managed through its own text form.
    pub fn salt_length(&self) -> Option<usize> {
        match self {
            AlgorithmParams::Argon2id(p) => Some(p.salt_length),
            AlgorithmParams::Scrypt(p) => Some(p.salt_length),
            AlgorithmParams::Bcrypt(_) => None,
            AlgorithmParams::Pbkdf2(p) => Some(p.salt_length),
        }
    }
}

impl From<Argon2Params> for AlgorithmParams {
    fn from(params: Argon2Params) -> Self {
        AlgorithmParams::Argon2id(params)
    }
}

impl From<ScryptParams> for AlgorithmParams {
    fn from(params: ScryptParams) -> Self {
        AlgorithmParams::Scrypt(params)
    }
}

impl From<BcryptParams> for AlgorithmParams {
    fn from(params: BcryptParams) -> Self {
        AlgorithmParams::Bcrypt(params)
    }
}

impl From<Pbkdf2Params> for AlgorithmParams {
    fn from(params: Pbkdf2Params) -> Self {
        AlgorithmParams::Pbkdf2(params)
    }
}

/// Schema entry for one tunable parameter: its wire name, display label, and
/// the advisory range callers should offer in input controls.
///
/// The range is advisory at this layer. The engine computes with whatever it
/// is given and surfaces only rejections from the primitive itself.
#[derive(Clone, Copy, Debug)]
pub struct ParamSpec {
    /// Schema name, as accepted by [`AlgorithmParams::value_of`]
    pub name: &'static str,

    /// Display label
    pub label: &'static str,

    /// Default value
    pub default: u64,

    /// Advisory minimum
    pub min: u64,

    /// Advisory maximum
    pub max: u64,

    /// Stepping for input controls
    pub step: u64,
}

const ARGON2ID_SCHEMA: &[ParamSpec] = &[
    ParamSpec {
        name: "memory",
        label: "Memory (MiB)",
        default: 19,
        min: 1,
        max: 2048,
        step: 1,
    },
    ParamSpec {
        name: "iterations",
        label: "Iterations",
        default: 2,
        min: 1,
        max: 10,
        step: 1,
    },
    ParamSpec {
        name: "parallelism",
        label: "Parallelism",
        default: 1,
        min: 1,
        max: 16,
        step: 1,
    },
    ParamSpec {
        name: "saltLength",
        label: "Salt Length (bytes)",
        default: 16,
        min: 8,
        max: 64,
        step: 1,
    },
    ParamSpec {
        name: "keyLength",
        label: "Hash Length (bytes)",
        default: 32,
        min: 16,
        max: 64,
        step: 1,
    },
];

const SCRYPT_SCHEMA: &[ParamSpec] = &[
    ParamSpec {
        name: "N",
        label: "N (CPU/Memory cost)",
        default: 131072,
        min: 1024,
        max: 1048576,
        step: 1024,
    },
    ParamSpec {
        name: "r",
        label: "r (Block size)",
        default: 8,
        min: 1,
        max: 32,
        step: 1,
    },
    ParamSpec {
        name: "p",
        label: "p (Parallelization)",
        default: 1,
        min: 1,
        max: 16,
        step: 1,
    },
    ParamSpec {
        name: "saltLength",
        label: "Salt Length (bytes)",
        default: 16,
        min: 8,
        max: 64,
        step: 1,
    },
    ParamSpec {
        name: "keyLength",
        label: "Key Length (bytes)",
        default: 32,
        min: 16,
        max: 64,
        step: 1,
    },
];

const BCRYPT_SCHEMA: &[ParamSpec] = &[ParamSpec {
    name: "cost",
    label: "Cost Factor",
    default: 12,
    min: 4,
    max: 20,
    step: 1,
}];

const PBKDF2_SCHEMA: &[ParamSpec] = &[
    ParamSpec {
        name: "iterations",
        label: "Iterations",
        default: 600_000,
        min: 1000,
        max: 10_000_000,
        step: 1000,
    },
    ParamSpec {
        name: "saltLength",
        label: "Salt Length (bytes)",
        default: 16,
        min: 8,
        max: 64,
        step: 1,
    },
    ParamSpec {
        name: "keyLength",
        label: "Key Length (bytes)",
        default: 32,
        min: 16,
        max: 64,
        step: 1,
    },
];

/// The ordered parameter schema for an algorithm.
pub fn schema(algorithm: Algorithm) -> &'static [ParamSpec] {
    match algorithm {
        Algorithm::Argon2id => ARGON2ID_SCHEMA,
        Algorithm::Scrypt => SCRYPT_SCHEMA,
        Algorithm::Bcrypt => BCRYPT_SCHEMA,
        Algorithm::Pbkdf2 => PBKDF2_SCHEMA,
    }
}

struct Advisory {
    param: &'static str,
    threshold: u64,
    message: &'static str,
}

const ARGON2ID_ADVISORIES: &[Advisory] = &[
    Advisory {
        param: "memory",
        threshold: 19,
        message: "Memory below 19 MiB may be insecure",
    },
    Advisory {
        param: "iterations",
        threshold: 2,
        message: "Iterations below 2 may be insecure",
    },
    Advisory {
        param: "parallelism",
        threshold: 1,
        message: "Parallelism below 1 is invalid",
    },
];

const SCRYPT_ADVISORIES: &[Advisory] = &[
    Advisory {
        param: "N",
        threshold: 65536,
        message: "N below 65536 may be insecure",
    },
    Advisory {
        param: "r",
        threshold: 8,
        message: "r below 8 may be insecure",
    },
];

const BCRYPT_ADVISORIES: &[Advisory] = &[Advisory {
    param: "cost",
    threshold: 10,
    message: "Cost factor below 10 may be insecure",
}];

const PBKDF2_ADVISORIES: &[Advisory] = &[Advisory {
    param: "iterations",
    threshold: 100_000,
    message: "Iterations below 100,000 may be insecure",
}];

/// Advisory messages for parameters strictly below their security threshold.
///
/// Emission order follows schema declaration order. Warnings never block an
/// operation; they exist so callers can surface them next to input controls.
pub fn warnings(params: &AlgorithmParams) -> Vec<&'static str> {
    let advisories = match params.algorithm() {
        Algorithm::Argon2id => ARGON2ID_ADVISORIES,
        Algorithm::Scrypt => SCRYPT_ADVISORIES,
        Algorithm::Bcrypt => BCRYPT_ADVISORIES,
        Algorithm::Pbkdf2 => PBKDF2_ADVISORIES,
    };

    advisories
        .iter()
        .filter(|a| params.value_of(a.param).is_some_and(|v| v < a.threshold))
        .map(|a| a.message)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_schema() {
        for algorithm in Algorithm::ALL {
            let defaults = AlgorithmParams::defaults(algorithm);

            for spec in schema(algorithm) {
                assert_eq!(
                    defaults.value_of(spec.name),
                    Some(spec.default),
                    "{algorithm} schema default for {} disagrees with the params struct",
                    spec.name,
                );
            }
        }
    }

    #[test]
    fn test_no_warnings_at_defaults() {
        for algorithm in Algorithm::ALL {
            let defaults = AlgorithmParams::defaults(algorithm);
            assert!(warnings(&defaults).is_empty());
        }
    }

    #[test]
    fn test_low_memory_is_the_only_warning() {
        let params = AlgorithmParams::Argon2id(Argon2Params {
            memory_mib: 10,
            iterations: 2,
            parallelism: 1,
            ..Argon2Params::default()
        });

        assert_eq!(warnings(&params), ["Memory below 19 MiB may be insecure"]);
    }

    #[test]
    fn test_warning_order_follows_schema() {
        let params = AlgorithmParams::Scrypt(ScryptParams {
            n: 1024,
            r: 1,
            ..ScryptParams::default()
        });

        assert_eq!(
            warnings(&params),
            ["N below 65536 may be insecure", "r below 8 may be insecure"]
        );
    }

    #[test]
    fn test_bcrypt_and_pbkdf2_thresholds() {
        let low_cost = AlgorithmParams::Bcrypt(BcryptParams { cost: 9 });
        assert_eq!(warnings(&low_cost), ["Cost factor below 10 may be insecure"]);

        let low_rounds = AlgorithmParams::Pbkdf2(Pbkdf2Params {
            iterations: 99_999,
            ..Pbkdf2Params::default()
        });
        assert_eq!(
            warnings(&low_rounds),
            ["Iterations below 100,000 may be insecure"]
        );
    }

    #[test]
    fn test_algorithm_identifiers() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.as_str().parse::<Algorithm>().unwrap(), algorithm);
        }

        assert!("md5".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::Pbkdf2.label(), "PBKDF2-HMAC-SHA256");
    }

    #[test]
    fn test_value_of_rejects_foreign_names() {
        let params = AlgorithmParams::defaults(Algorithm::Bcrypt);

        assert_eq!(params.value_of("cost"), Some(12));
        assert_eq!(params.value_of("memory"), None);
    }
}
