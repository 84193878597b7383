// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end rotation testing.
//!
//! `TestVault` opens a temp SQLite database, initializes the active
//! fingerprint, and exposes the live and history stores the rotation engine
//! runs against. The temp directory is removed on drop.

use std::sync::Arc;

use secrecy::SecretString;
use strongbox_config::model::{StorageConfig, StrongboxConfig, VaultConfig};
use strongbox_core::{RecordId, SecretStore, StrongboxError};
use strongbox_storage::queries::{history, items};
use strongbox_storage::{ActiveFingerprint, Database, HistoryStore, LiveItemStore, SnapshotFlags};
use strongbox_vault::{Limits, RotationOptions, Rotator, Sealer};

use crate::fixtures::{self, FAST_KDF};

/// A vault in a temp directory, sealed under one passphrase.
pub struct TestVault {
    pub db: Database,
    pub live: Arc<LiveItemStore>,
    pub history: Arc<HistoryStore>,
    pub active: ActiveFingerprint,
    /// Configuration pointing at the temp database, with fast KDF costs.
    pub config: StrongboxConfig,
    passphrase: SecretString,
    _temp_dir: tempfile::TempDir,
}

impl TestVault {
    /// Create an initialized vault whose active passphrase is `passphrase`.
    pub async fn new(passphrase: &str) -> Result<Self, StrongboxError> {
        let temp_dir = tempfile::TempDir::new().map_err(StrongboxError::storage)?;
        let config = StrongboxConfig {
            storage: StorageConfig {
                database_path: temp_dir
                    .path()
                    .join("vault.db")
                    .to_string_lossy()
                    .into_owned(),
                wal_mode: true,
            },
            vault: VaultConfig {
                kdf_memory_cost: FAST_KDF.memory_cost,
                kdf_iterations: FAST_KDF.iterations,
                kdf_parallelism: FAST_KDF.parallelism,
            },
            ..StrongboxConfig::default()
        };

        let db = Database::open(&config.storage).await?;
        let passphrase = fixtures::passphrase(passphrase);
        let active = ActiveFingerprint::new(db.clone());
        active
            .initialize(&fixtures::fingerprint_of(&passphrase))
            .await?;

        Ok(Self {
            live: Arc::new(LiveItemStore::new(db.clone())),
            history: Arc::new(HistoryStore::new(db.clone())),
            db,
            active,
            config,
            passphrase,
            _temp_dir: temp_dir,
        })
    }

    /// The passphrase the vault was created with.
    pub fn passphrase(&self) -> &SecretString {
        &self.passphrase
    }

    async fn sealer(&self) -> Result<Sealer<'_>, StrongboxError> {
        let fingerprint = self.active.require().await?;
        Ok(Sealer::new(
            &self.passphrase,
            fingerprint,
            FAST_KDF,
            Limits::default(),
        )?)
    }

    /// Add an item sealed under the active passphrase.
    pub async fn add(&self, name: &str, plaintext: &[u8]) -> Result<RecordId, StrongboxError> {
        let sealed = self.sealer().await?.seal(plaintext)?;
        items::create_item(&self.db, name, &sealed).await
    }

    /// Replace an item secret, leaving a snapshot with `flags` in history.
    pub async fn update(
        &self,
        name: &str,
        plaintext: &[u8],
        flags: SnapshotFlags,
    ) -> Result<(), StrongboxError> {
        let sealed = self.sealer().await?.seal(plaintext)?;
        items::update_secret(&self.db, name, &sealed, flags).await
    }

    /// Delete an item, keeping its secret in history.
    pub async fn delete(&self, name: &str) -> Result<(), StrongboxError> {
        items::delete_item(&self.db, name).await
    }

    /// Number of history rows.
    pub async fn history_len(&self) -> Result<usize, StrongboxError> {
        Ok(history::fetch_secret_records(&self.db).await?.len())
    }

    /// A rotator over this vault's stores.
    pub fn rotator(&self, options: RotationOptions) -> Rotator {
        let live: Arc<dyn SecretStore> = self.live.clone();
        let history: Arc<dyn SecretStore> = self.history.clone();
        Rotator::new(live, history, options)
    }
}
