// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase generation fingerprints.
//!
//! A fingerprint is an Argon2id PHC string (`$argon2id$v=19$m=...$salt$hash`)
//! of the master passphrase. Every record carries the fingerprint of the
//! passphrase that wrapped its item key, so a rotation can tell which records
//! belong to the generation it is rotating away from without trying to
//! unwrap each one.

use argon2::password_hash::{PasswordHash, PasswordHasher, SaltString};
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};

use crate::crypto;
use crate::error::CryptoError;
use crate::kdf::KdfParams;

/// Compute a salted fingerprint of `passphrase`.
pub fn fingerprint(passphrase: &SecretString, params: &KdfParams) -> Result<String, CryptoError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = params
        .argon2()?
        .hash_password(passphrase.expose_secret().as_bytes(), &salt)
        .map_err(|e| CryptoError::Kdf(format!("failed to fingerprint passphrase: {e}")))?;
    Ok(hash.to_string())
}

/// Check `passphrase` against a stored fingerprint.
///
/// The hash is recomputed with the fingerprint's own salt and parameters and
/// compared in constant time. A fingerprint that does not parse, is not
/// Argon2id, or whose costs exceed the ceiling of the configured `kdf` never
/// matches.
pub fn verify(passphrase: &SecretString, fingerprint: &str, kdf: &KdfParams) -> bool {
    let Ok(parsed) = PasswordHash::new(fingerprint) else {
        return false;
    };
    if parsed.algorithm != argon2::ARGON2ID_IDENT {
        return false;
    }
    let (Some(salt), Some(expected)) = (parsed.salt, parsed.hash) else {
        return false;
    };
    let Ok(params) = argon2::Params::try_from(&parsed) else {
        return false;
    };
    let stored = KdfParams {
        memory_cost: params.m_cost(),
        iterations: params.t_cost(),
        parallelism: params.p_cost(),
    };
    if kdf.check_stored(&stored).is_err() {
        return false;
    }

    let Ok(computed) = argon2::Argon2::default().hash_password_customized(
        passphrase.expose_secret().as_bytes(),
        Some(parsed.algorithm),
        parsed.version,
        params,
        salt,
    ) else {
        return false;
    };
    computed
        .hash
        .is_some_and(|hash| crypto::constant_time_eq(hash.as_bytes(), expected.as_bytes()))
}
