// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fingerprint of the master passphrase currently in force.
//!
//! Stored under one `vault_meta` key. It is set once by `init` and then only
//! replaced by [`ActiveFingerprint::commit`] after a rotation whose reports
//! are all safe to commit.

use strongbox_core::{RotationReport, StrongboxError};
use tracing::{info, warn};

use crate::database::Database;
use crate::queries::meta;

const ACTIVE_FINGERPRINT_KEY: &str = "active_fingerprint";

/// Accessor for the active passphrase fingerprint.
#[derive(Debug, Clone)]
pub struct ActiveFingerprint {
    db: Database,
}

impl ActiveFingerprint {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The current fingerprint, or `None` for an uninitialized vault.
    pub async fn get(&self) -> Result<Option<String>, StrongboxError> {
        meta::get_meta(&self.db, ACTIVE_FINGERPRINT_KEY).await
    }

    /// The current fingerprint, failing for an uninitialized vault.
    pub async fn require(&self) -> Result<String, StrongboxError> {
        self.get().await?.ok_or_else(|| StrongboxError::NotFound {
            what: "vault fingerprint (run `strongbox init` first)".to_string(),
        })
    }

    /// Record the first fingerprint. Fails if the vault is already initialized.
    pub async fn initialize(&self, fingerprint: &str) -> Result<(), StrongboxError> {
        if !meta::insert_meta(&self.db, ACTIVE_FINGERPRINT_KEY, fingerprint).await? {
            return Err(StrongboxError::Vault(
                "vault is already initialized".to_string(),
            ));
        }
        info!("vault fingerprint initialized");
        Ok(())
    }

    /// Switch from `previous` to `target` if every report is safe to commit.
    ///
    /// Returns `false` without writing when a report blocks the commit. Fails
    /// if the stored fingerprint is no longer `previous`.
    pub async fn commit(
        &self,
        previous: &str,
        target: &str,
        reports: &[&RotationReport],
    ) -> Result<bool, StrongboxError> {
        if reports.is_empty() || !reports.iter().all(|r| r.is_safe_to_commit()) {
            warn!("rotation reports do not allow a fingerprint commit");
            return Ok(false);
        }
        if !meta::compare_and_set_meta(&self.db, ACTIVE_FINGERPRINT_KEY, previous, target).await? {
            return Err(StrongboxError::Vault(
                "active fingerprint changed while the rotation was running".to_string(),
            ));
        }
        info!("new passphrase fingerprint committed");
        Ok(true)
    }
}
