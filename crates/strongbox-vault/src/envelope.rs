// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sealing and opening of stored item secrets.
//!
//! Sealing generates a fresh item key, wraps it under the passphrase, encrypts
//! the plaintext, and checks both outputs against the configured bounds. A
//! sealed triple that would not fit the store is never produced.

use secrecy::SecretString;
use strongbox_config::model::RotationConfig;
use strongbox_core::{SealedSecret, SecretRecord};
use zeroize::Zeroizing;

use crate::crypto;
use crate::error::CryptoError;
use crate::fingerprint;
use crate::kdf::KdfParams;
use crate::wrapping;

/// Upper bounds on stored ciphertexts and wrapped keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_ciphertext_len: usize,
    pub max_wrapped_key_len: usize,
}

impl From<&RotationConfig> for Limits {
    fn from(config: &RotationConfig) -> Self {
        Self {
            max_ciphertext_len: config.max_ciphertext_len,
            max_wrapped_key_len: config.max_wrapped_key_len,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::from(&RotationConfig::default())
    }
}

/// Seals item secrets under one passphrase generation.
pub struct Sealer<'a> {
    passphrase: &'a SecretString,
    fingerprint: String,
    kdf: KdfParams,
    limits: Limits,
}

impl std::fmt::Debug for Sealer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sealer")
            .field("passphrase", &"[REDACTED]")
            .field("kdf", &self.kdf)
            .field("limits", &self.limits)
            .finish()
    }
}

impl<'a> Sealer<'a> {
    /// Seal under `passphrase`, tagging records with an existing fingerprint
    /// of that passphrase.
    ///
    /// Fails if `fingerprint` does not belong to `passphrase`.
    pub fn new(
        passphrase: &'a SecretString,
        fingerprint: String,
        kdf: KdfParams,
        limits: Limits,
    ) -> Result<Self, CryptoError> {
        if !fingerprint::verify(passphrase, &fingerprint, &kdf) {
            return Err(CryptoError::FingerprintMismatch);
        }
        Ok(Self {
            passphrase,
            fingerprint,
            kdf,
            limits,
        })
    }

    /// Seal under `passphrase` with a freshly computed fingerprint.
    pub fn with_new_fingerprint(
        passphrase: &'a SecretString,
        kdf: KdfParams,
        limits: Limits,
    ) -> Result<Self, CryptoError> {
        let fingerprint = fingerprint::fingerprint(passphrase, &kdf)?;
        Ok(Self {
            passphrase,
            fingerprint,
            kdf,
            limits,
        })
    }

    /// The fingerprint stamped on every sealed triple.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Encrypt `plaintext` under a new item key.
    ///
    /// Output exceeding either bound fails with [`CryptoError::Oversize`].
    pub fn seal(&self, plaintext: &[u8]) -> Result<SealedSecret, CryptoError> {
        let (item_key, wrapped_key) = wrapping::wrap(self.passphrase, &self.kdf)?;
        let ciphertext = crypto::encrypt(plaintext, &item_key, self.limits.max_ciphertext_len)?;

        if wrapped_key.len() > self.limits.max_wrapped_key_len {
            return Err(CryptoError::Oversize {
                what: "wrapped key",
                actual: wrapped_key.len(),
                max: self.limits.max_wrapped_key_len,
            });
        }

        Ok(SealedSecret {
            ciphertext,
            wrapped_key,
            fingerprint: self.fingerprint.clone(),
        })
    }
}

/// Decrypt a stored record with `passphrase`.
///
/// `kdf` is the configured cost; it bounds the cost stored in the wrapped key.
/// Fails with [`CryptoError::Unwrap`] when the item key cannot be recovered and
/// [`CryptoError::Integrity`] when the ciphertext does not authenticate.
pub fn open_secret(
    record: &SecretRecord,
    passphrase: &SecretString,
    kdf: &KdfParams,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let item_key = wrapping::unwrap(&record.wrapped_key, passphrase, kdf)?;
    crypto::decrypt(&record.ciphertext, &item_key)
}
