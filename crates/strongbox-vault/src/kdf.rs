// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from a passphrase.

use strongbox_config::model::VaultConfig;
use zeroize::Zeroizing;

use crate::crypto::{self, KEY_LEN};
use crate::error::CryptoError;

/// Argon2id salt length.
pub const SALT_LEN: usize = 16;

/// Largest memory cost Argon2id is ever run with (4 GiB in KiB).
pub const MAX_MEMORY_COST: u32 = 4 * 1024 * 1024;

/// Largest pass count accepted from a stored wrapped key or fingerprint.
pub const MAX_ITERATIONS: u32 = 64;

/// Largest lane count accepted from a stored wrapped key or fingerprint.
pub const MAX_PARALLELISM: u32 = 64;

/// Stored costs may exceed the configured ones by at most this factor.
pub const STORED_COST_FACTOR: u32 = 4;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl From<&VaultConfig> for KdfParams {
    fn from(config: &VaultConfig) -> Self {
        Self {
            memory_cost: config.kdf_memory_cost,
            iterations: config.kdf_iterations,
            parallelism: config.kdf_parallelism,
        }
    }
}

impl KdfParams {
    /// The most expensive parameters accepted from stored data when `self`
    /// is the configured cost.
    ///
    /// Each cost is capped at [`STORED_COST_FACTOR`] times the configured
    /// value and at its absolute maximum, but never below the configured value.
    pub fn ceiling(&self) -> KdfParams {
        let cap = |configured: u32, max: u32| {
            configured
                .saturating_mul(STORED_COST_FACTOR)
                .min(max)
                .max(configured)
        };
        KdfParams {
            memory_cost: cap(self.memory_cost, MAX_MEMORY_COST),
            iterations: cap(self.iterations, MAX_ITERATIONS),
            parallelism: cap(self.parallelism, MAX_PARALLELISM),
        }
    }

    /// Refuse stored parameters above [`ceiling`](Self::ceiling) before any
    /// derivation runs with them.
    pub fn check_stored(&self, stored: &KdfParams) -> Result<(), CryptoError> {
        let ceiling = self.ceiling();
        let within = stored.memory_cost <= ceiling.memory_cost
            && stored.iterations <= ceiling.iterations
            && stored.parallelism <= ceiling.parallelism;
        if within {
            return Ok(());
        }
        Err(CryptoError::Kdf(format!(
            "stored cost m={},t={},p={} exceeds the m={},t={},p={} ceiling",
            stored.memory_cost,
            stored.iterations,
            stored.parallelism,
            ceiling.memory_cost,
            ceiling.iterations,
            ceiling.parallelism
        )))
    }

    pub(crate) fn argon2(&self) -> Result<argon2::Argon2<'static>, CryptoError> {
        if self.memory_cost > MAX_MEMORY_COST {
            return Err(CryptoError::Kdf(format!(
                "memory cost {} KiB exceeds the {MAX_MEMORY_COST} KiB ceiling",
                self.memory_cost
            )));
        }
        let params = argon2::Params::new(
            self.memory_cost,
            self.iterations,
            self.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| CryptoError::Kdf(format!("invalid Argon2id parameters: {e}")))?;

        Ok(argon2::Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        ))
    }
}

/// Derive a 32-byte key from a passphrase using Argon2id.
///
/// The returned key is zeroed on drop.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    params
        .argon2()?
        .hash_password_into(passphrase, salt, &mut output[..])
        .map_err(|e| CryptoError::Kdf(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a random 16-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], CryptoError> {
    crypto::random_bytes::<SALT_LEN>()
}
