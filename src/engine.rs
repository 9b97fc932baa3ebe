use crate::error::Error;
use crate::registry::Algorithm;
use crate::salt::BCRYPT_SALT_LEN;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use std::time::{Duration, Instant};
use unicode_normalization::UnicodeNormalization;

/// Raw output of one derivation, with wall-clock time spent inside the
/// primitive call only.
pub(crate) struct Derived {
    pub bytes: Vec<u8>,
    pub elapsed: Duration,
}

/// bcrypt's output, which is only ever its full self-encoded string.
pub(crate) struct DerivedString {
    pub encoded: String,
    pub elapsed: Duration,
}

pub(crate) fn compute_argon2id(
    password: &[u8],
    salt: &[u8],
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
    key_length: usize,
    secret: Option<&[u8]>,
) -> Result<Derived, Error> {
    let params = argon2::Params::new(memory_kib, iterations, parallelism, Some(key_length))
        .map_err(|e| Error::computation(Algorithm::Argon2id, e))?;

    let ctx = match secret {
        Some(secret) => argon2::Argon2::new_with_secret(
            secret,
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        )
        .map_err(|e| Error::computation(Algorithm::Argon2id, e))?,
        None => argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
    };

    let mut out = vec![0u8; key_length];

    let start = Instant::now();
    ctx.hash_password_into(password, salt, &mut out)
        .map_err(|e| Error::computation(Algorithm::Argon2id, e))?;

    Ok(Derived {
        bytes: out,
        elapsed: start.elapsed(),
    })
}

pub(crate) fn compute_scrypt(
    password: &str,
    salt: &[u8],
    log_n: u8,
    r: u32,
    p: u32,
    key_length: usize,
) -> Result<Derived, Error> {
    let params = scrypt::Params::new(log_n, r, p, key_length)
        .map_err(|e| Error::computation(Algorithm::Scrypt, e))?;

    // Passwords are NFKC-normalized before derivation.
    let normalized: String = password.nfkc().collect();

    let mut out = vec![0u8; key_length];

    let start = Instant::now();
    scrypt::scrypt(normalized.as_bytes(), salt, &params, &mut out)
        .map_err(|e| Error::computation(Algorithm::Scrypt, e))?;

    Ok(Derived {
        bytes: out,
        elapsed: start.elapsed(),
    })
}

pub(crate) fn compute_bcrypt(
    password: &str,
    cost: u32,
    salt: [u8; BCRYPT_SALT_LEN],
) -> Result<DerivedString, Error> {
    let start = Instant::now();
    let parts = bcrypt::hash_with_salt(password, cost, salt)
        .map_err(|e| Error::computation(Algorithm::Bcrypt, e))?;

    Ok(DerivedString {
        encoded: parts.format_for_version(bcrypt::Version::TwoA),
        elapsed: start.elapsed(),
    })
}

pub(crate) fn compute_pbkdf2(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    key_length: usize,
) -> Result<Derived, Error> {
    if iterations == 0 {
        return Err(Error::computation(
            Algorithm::Pbkdf2,
            "iteration count must be positive",
        ));
    }

    let mut out = vec![0u8; key_length];

    let start = Instant::now();
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out);

    Ok(Derived {
        bytes: out,
        elapsed: start.elapsed(),
    })
}

/// log2 of the scrypt cost factor. The primitive takes the exponent, so a
/// non-power-of-two `N` cannot be expressed and is rejected here.
pub(crate) fn scrypt_log_n(n: u32) -> Result<u8, Error> {
    if n < 2 || !n.is_power_of_two() {
        return Err(Error::computation(
            Algorithm::Scrypt,
            format!("N must be a power of two greater than 1, got {n}"),
        ));
    }

    Ok(n.trailing_zeros() as u8)
}
