// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store adapter trait for a table of item secrets.

use async_trait::async_trait;

use crate::error::StrongboxError;
use crate::types::{SealedSecret, SecretRecord, Source};

/// Reads and rewrites the (ciphertext, wrapped key, fingerprint) triples of one
/// table. The same rotation pipeline runs against a live-items store and a
/// history store.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// The table this store reads and writes.
    fn source(&self) -> Source;

    /// Fetch every record in the table, sorted by ascending id.
    ///
    /// Rotation fetches every table in scope before its first write and keeps
    /// the records, ciphertexts included, until the run ends. Memory use
    /// therefore grows with the vault; in exchange a failed fetch leaves the
    /// vault untouched.
    async fn fetch_all(&self) -> Result<Vec<SecretRecord>, StrongboxError>;

    /// Replace the triple of `current` in a single atomic write.
    ///
    /// The write only lands if the stored row still holds the ciphertext and
    /// wrapped key of `current`. A row rewritten since it was fetched fails
    /// with [`StrongboxError::Conflict`] and keeps its newer contents; a row
    /// that no longer exists fails with [`StrongboxError::NotFound`].
    async fn persist(
        &self,
        current: &SecretRecord,
        sealed: &SealedSecret,
    ) -> Result<(), StrongboxError>;
}
