// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `strongbox init`, `add`, `update`, `show`, `list`, `history` and `delete`.
//!
//! Ordinary item edits seal through the same [`Sealer`] the rotation engine
//! uses, tagged with the active fingerprint.

use secrecy::SecretString;
use strongbox_config::model::StrongboxConfig;
use strongbox_core::StrongboxError;
use strongbox_storage::queries::{history, items};
use strongbox_storage::{ActiveFingerprint, Database, SnapshotFlags};
use strongbox_vault::{fingerprint, open_secret, KdfParams, Limits, Sealer};
use tracing::info;
use zeroize::Zeroizing;

async fn open(config: &StrongboxConfig) -> Result<(Database, ActiveFingerprint), StrongboxError> {
    let db = Database::open(&config.storage).await?;
    let active = ActiveFingerprint::new(db.clone());
    Ok((db, active))
}

/// Seal `value` under the active passphrase generation.
async fn seal(
    config: &StrongboxConfig,
    active: &ActiveFingerprint,
    passphrase: &SecretString,
    value: &[u8],
) -> Result<strongbox_core::SealedSecret, StrongboxError> {
    let sealer = Sealer::new(
        passphrase,
        active.require().await?,
        KdfParams::from(&config.vault),
        Limits::from(&config.rotation),
    )
    .map_err(|_| StrongboxError::Vault("incorrect master passphrase".to_string()))?;
    Ok(sealer.seal(value)?)
}

pub async fn run_init(
    config: &StrongboxConfig,
    passphrase: &SecretString,
) -> Result<(), StrongboxError> {
    let (db, active) = open(config).await?;
    if active.get().await?.is_some() {
        return Err(StrongboxError::Vault(
            "vault is already initialized".to_string(),
        ));
    }
    let fp = fingerprint::fingerprint(passphrase, &KdfParams::from(&config.vault))?;
    active.initialize(&fp).await?;
    db.close().await?;
    info!(path = %config.storage.database_path, "vault created");
    Ok(())
}

pub async fn run_add(
    config: &StrongboxConfig,
    passphrase: &SecretString,
    name: &str,
    value: &[u8],
) -> Result<(), StrongboxError> {
    let (db, active) = open(config).await?;
    let sealed = seal(config, &active, passphrase, value).await?;
    let id = items::create_item(&db, name, &sealed).await?;
    info!(item = name, id = %id, "item added");
    db.close().await
}

pub async fn run_update(
    config: &StrongboxConfig,
    passphrase: &SecretString,
    name: &str,
    value: &[u8],
) -> Result<(), StrongboxError> {
    let (db, active) = open(config).await?;
    let sealed = seal(config, &active, passphrase, value).await?;
    let flags = SnapshotFlags {
        deleted: false,
        modified: true,
    };
    items::update_secret(&db, name, &sealed, flags).await?;
    info!(item = name, "item updated");
    db.close().await
}

pub async fn run_show(
    config: &StrongboxConfig,
    passphrase: &SecretString,
    name: &str,
) -> Result<Zeroizing<Vec<u8>>, StrongboxError> {
    let (db, _active) = open(config).await?;
    let item = items::get_item(&db, name)
        .await?
        .ok_or_else(|| StrongboxError::NotFound {
            what: format!("item `{name}`"),
        })?;
    if item.ciphertext.is_empty() {
        return Ok(Zeroizing::new(Vec::new()));
    }
    open_secret(&item.to_record(), passphrase, &KdfParams::from(&config.vault))
        .map_err(|_| StrongboxError::Vault(format!("cannot decrypt `{name}` with this passphrase")))
}

/// One line per item: name and last edit time.
pub async fn run_list(config: &StrongboxConfig) -> Result<Vec<String>, StrongboxError> {
    let (db, _active) = open(config).await?;
    let lines = items::list_items(&db)
        .await?
        .into_iter()
        .map(|item| format!("{:<32} {}", item.name, item.updated_at))
        .collect();
    Ok(lines)
}

/// One line per snapshot, oldest first.
pub async fn run_history(
    config: &StrongboxConfig,
    name: &str,
) -> Result<Vec<String>, StrongboxError> {
    let (db, _active) = open(config).await?;
    let lines = history::list_history(&db, name)
        .await?
        .into_iter()
        .map(|entry| {
            let mut tags = Vec::new();
            if entry.flags.modified {
                tags.push("modified");
            }
            if entry.flags.deleted {
                tags.push("deleted");
            }
            format!("#{:<6} {} {}", entry.id.0, entry.created_at, tags.join(","))
                .trim_end()
                .to_string()
        })
        .collect();
    Ok(lines)
}

pub async fn run_delete(config: &StrongboxConfig, name: &str) -> Result<(), StrongboxError> {
    let (db, _active) = open(config).await?;
    items::delete_item(&db, name).await?;
    info!(item = name, "item deleted");
    db.close().await
}
