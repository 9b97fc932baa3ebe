#![deny(missing_docs)]

//! A library for hashing passwords and verifying them later, speaking four
//! self-describing hash formats:
//! [Argon2id](https://en.wikipedia.org/wiki/Argon2),
//! [scrypt](https://en.wikipedia.org/wiki/Scrypt),
//! [bcrypt](https://en.wikipedia.org/wiki/Bcrypt), and
//! [PBKDF2](https://en.wikipedia.org/wiki/PBKDF2)-HMAC-SHA256.
//!
//! Every hash is rendered as a string that carries its own algorithm,
//! parameters, and salt. Verification reads everything back out of the
//! string, so hashes keep verifying even after you raise your defaults, and
//! strings produced by other libraries check out as long as they follow the
//! same formats. The underlying primitives are the pure-Rust
//! [RustCrypto](https://github.com/RustCrypto/password-hashes) implementations
//! and the [bcrypt crate](https://docs.rs/bcrypt).
//!
//! Default parameters follow current OWASP guidance. Nothing stops you from
//! hashing with weaker settings; [`warnings`] tells you when a parameter set
//! falls below the advisory floors, and [`schema`] describes each algorithm's
//! tunables for building input forms.
//!
//! # Usage
//!
//! To use pwforge, add the following to your Cargo.toml:
//!
//! ```toml
//! [dependencies]
//! pwforge = "1.0.3"
//! ```
//!
//! # Examples
//!
//! Hash a password, then verify the hash:
//!
//! ```rust
//! use pwforge::{verify, Algorithm, Hasher, Pbkdf2Params};
//!
//! let hash = Hasher::new(Algorithm::Pbkdf2)
//!     .params(Pbkdf2Params { iterations: 1000, ..Pbkdf2Params::default() }.into())
//!     .hash("password")
//!     .unwrap();
//!
//! assert!(verify("password", hash.encoded()).unwrap().is_valid());
//! assert!(!verify("passw0rd", hash.encoded()).unwrap().is_valid());
//! ```
//!
//! Pick an algorithm and tune its parameters:
//!
//! ```rust
//! use pwforge::{Algorithm, BcryptParams, Hasher};
//!
//! let hash = Hasher::new(Algorithm::Bcrypt)
//!     .params(BcryptParams { cost: 4 }.into())
//!     .hash("password")
//!     .unwrap();
//!
//! assert!(hash.encoded().starts_with("$2a$04$"));
//! ```
//!
//! Verify a hash string produced elsewhere, without saying which algorithm
//! made it:
//!
//! ```rust
//! use pwforge::{verify, Algorithm};
//!
//! let encoded = "$pbkdf2-sha256$1$c2FsdA$Eg+2z/z4syxD5yJSVsT4N6hlSMkszDVICAWYfLcL4Xs";
//!
//! let outcome = verify("password", encoded).unwrap();
//! assert!(outcome.is_valid());
//! assert_eq!(outcome.algorithm(), Algorithm::Pbkdf2);
//! ```
//!
//! Inspect a hash string without verifying anything:
//!
//! ```rust
//! use pwforge::{Algorithm, ParsedHash};
//!
//! let parsed: ParsedHash = "$scrypt$ln=17,r=8,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA"
//!     .parse()
//!     .unwrap();
//!
//! assert_eq!(parsed.algorithm(), Algorithm::Scrypt);
//! ```
//!
//! Generate a salt separately from hashing:
//!
//! ```rust
//! use pwforge::{generate_salt, salt_byte_length, TextEncoding};
//!
//! let salt = generate_salt(16, TextEncoding::Hex).unwrap();
//!
//! assert_eq!(salt.len(), 32);
//! assert_eq!(salt_byte_length(&salt, TextEncoding::Hex, None), 16);
//! ```
//!
//! Use a secret (sometimes called a
//! "[pepper](https://en.wikipedia.org/wiki/Pepper_(cryptography))") for
//! hashing and verification:
//!
//! ```rust
//! use pwforge::{verify_with_secret, Algorithm, Argon2Params, Hasher};
//!
//! let hash = Hasher::new(Algorithm::Argon2id)
//!     .params(Argon2Params { memory_mib: 8, iterations: 1, ..Argon2Params::default() }.into())
//!     .secret("secret")
//!     .hash("password")
//!     .unwrap();
//!
//! assert!(verify_with_secret("password", hash.encoded(), "secret").unwrap().is_valid());
//! ```
//!
//! Ask the registry what an algorithm's tunables are, and whether a chosen
//! parameter set is advisable:
//!
//! ```rust
//! use pwforge::{schema, warnings, Algorithm, ScryptParams};
//!
//! assert_eq!(schema(Algorithm::Scrypt)[0].label, "N (CPU/Memory cost)");
//!
//! let weak = ScryptParams { n: 1024, ..ScryptParams::default() }.into();
//! assert_eq!(warnings(&weak), ["N below 65536 may be insecure"]);
//! ```

mod encoding;
mod engine;
mod error;
mod format;
mod hasher;
mod registry;
mod salt;
mod verify;

pub use encoding::TextEncoding;
pub use error::Error;
pub use format::{detect_algorithm, ParsedHash};
pub use hasher::{HashResult, Hasher};
pub use registry::{
    schema, warnings, Algorithm, AlgorithmParams, Argon2Params, BcryptParams, ParamSpec,
    Pbkdf2Params, ScryptParams,
};
pub use salt::{generate_algorithm_salt, generate_salt, salt_byte_length};
pub use verify::{verify, verify_as, verify_with_secret, Verification};
