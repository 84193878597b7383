// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Strongbox credential vault.
//!
//! Record-scoped rotation failures are not errors at this level; they are
//! captured as [`FailureReason`](crate::report::FailureReason) values inside a
//! [`RotationReport`](crate::report::RotationReport).

use thiserror::Error;

use crate::types::Source;

/// The primary error type used across all Strongbox crates.
///
/// Messages never carry plaintext secrets or key material.
#[derive(Debug, Error)]
pub enum StrongboxError {
    /// Configuration errors (invalid TOML, missing fields, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Cryptographic or vault-state errors outside a rotation sweep.
    #[error("vault error: {0}")]
    Vault(String),

    /// The initial record fetch for a rotation pipeline failed. Fatal to the run.
    #[error("failed to fetch {table} records: {source}")]
    BatchFetch {
        table: Source,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A requested item or vault entry does not exist.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// A record changed between being read and being rewritten.
    #[error("{what} changed since it was read")]
    Conflict { what: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StrongboxError {
    /// Wrap any error as a storage error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }
}
