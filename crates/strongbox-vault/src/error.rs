// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed failures of the cryptographic layer.

use strongbox_core::StrongboxError;
use thiserror::Error;

/// Failure of a cipher, wrapping, or key-derivation operation.
///
/// Messages describe what failed, never the data involved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Ciphertext failed authentication: wrong key or tampered bytes.
    #[error("ciphertext failed authentication")]
    Integrity,

    /// The wrapped key could not be opened with the supplied passphrase.
    #[error("wrapped key could not be opened with the supplied passphrase")]
    Unwrap,

    /// Output exceeded the configured sanity bound.
    #[error("{what} is {actual} bytes, limit {max}")]
    Oversize {
        what: &'static str,
        actual: usize,
        max: usize,
    },

    /// Stored bytes do not follow the expected layout.
    #[error("malformed {0}")]
    Malformed(&'static str),

    /// Stored bytes carry a format version this build does not know.
    #[error("unsupported {what} format version {version}")]
    UnsupportedVersion { what: &'static str, version: u8 },

    /// A fingerprint does not belong to the passphrase it was paired with.
    #[error("passphrase does not match the fingerprint")]
    FingerprintMismatch,

    /// Argon2id rejected its parameters or failed.
    #[error("key derivation failed: {0}")]
    Kdf(String),

    /// The system CSPRNG failed.
    #[error("secure random generator failed")]
    Rng,
}

impl From<CryptoError> for StrongboxError {
    fn from(err: CryptoError) -> Self {
        StrongboxError::Vault(err.to_string())
    }
}
