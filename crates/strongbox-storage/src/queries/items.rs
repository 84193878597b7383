// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live item operations.
//!
//! Replacing or deleting an item secret snapshots the previous triple into
//! `items_history` inside the same transaction. Writes are refused while a
//! rotation holds the vault lock.

use rusqlite::{params, OptionalExtension};
use strongbox_core::{RecordId, SealedSecret, SecretRecord, StrongboxError};

use crate::database::{map_tr_err, Database};
use crate::lock::ROTATION_LOCK_KEY;
use crate::models::{Item, SnapshotFlags};
use crate::queries::rewrite_triple;

const ITEM_COLUMNS: &str = "id, name, ciphertext, wrapped_key, fingerprint, created_at, updated_at";

/// Why an item write was not applied.
enum Refusal {
    Locked(String),
    Duplicate,
    Missing,
}

impl Refusal {
    fn into_error(self, what: String) -> StrongboxError {
        match self {
            Refusal::Locked(holder) => StrongboxError::Vault(format!(
                "vault is locked by a running rotation ({holder}); try again when it finishes"
            )),
            Refusal::Duplicate => {
                StrongboxError::Vault("an item with this name already exists".to_string())
            }
            Refusal::Missing => StrongboxError::NotFound { what },
        }
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn item_from_row(row: &rusqlite::Row<'_>) -> Result<Item, rusqlite::Error> {
    Ok(Item {
        id: RecordId(row.get(0)?),
        name: row.get(1)?,
        ciphertext: row.get(2)?,
        wrapped_key: row.get(3)?,
        fingerprint: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Insert a new item. Fails if the name is taken.
pub async fn create_item(
    db: &Database,
    name: &str,
    sealed: &SealedSecret,
) -> Result<RecordId, StrongboxError> {
    let what = format!("item `{name}`");
    let name = name.to_string();
    let sealed = sealed.clone();
    let inserted = db
        .connection()
        .call(move |conn| -> Result<Result<i64, Refusal>, rusqlite::Error> {
            let tx = conn.transaction()?;
            if let Some(holder) = rotation_holder(&tx)? {
                return Ok(Err(Refusal::Locked(holder)));
            }
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM items WHERE name = ?1)",
                params![name],
                |row| row.get(0),
            )?;
            if exists {
                return Ok(Err(Refusal::Duplicate));
            }
            let ts = now();
            tx.execute(
                "INSERT INTO items (name, ciphertext, wrapped_key, fingerprint, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![
                    name,
                    sealed.ciphertext,
                    sealed.wrapped_key,
                    sealed.fingerprint,
                    ts
                ],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(Ok(id))
        })
        .await
        .map_err(map_tr_err)?;

    inserted.map(RecordId).map_err(|refusal| refusal.into_error(what))
}

/// Look up an item by name.
pub async fn get_item(db: &Database, name: &str) -> Result<Option<Item>, StrongboxError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Item>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE name = ?1"),
                params![name],
                item_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All items, ordered by name.
pub async fn list_items(db: &Database) -> Result<Vec<Item>, StrongboxError> {
    db.connection()
        .call(|conn| -> Result<Vec<Item>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY name"))?;
            let items = stmt
                .query_map([], item_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}

/// Replace an item's secret, snapshotting the previous triple first.
///
/// `flags` are recorded on the snapshot exactly as given.
pub async fn update_secret(
    db: &Database,
    name: &str,
    sealed: &SealedSecret,
    flags: SnapshotFlags,
) -> Result<(), StrongboxError> {
    let what = format!("item `{name}`");
    let name = name.to_string();
    let sealed = sealed.clone();
    db.connection()
        .call(move |conn| -> Result<Result<(), Refusal>, rusqlite::Error> {
            let tx = conn.transaction()?;
            if let Some(holder) = rotation_holder(&tx)? {
                return Ok(Err(Refusal::Locked(holder)));
            }
            let Some(id) = snapshot_live(&tx, &name, flags)? else {
                return Ok(Err(Refusal::Missing));
            };
            tx.execute(
                "UPDATE items SET ciphertext = ?1, wrapped_key = ?2, fingerprint = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    sealed.ciphertext,
                    sealed.wrapped_key,
                    sealed.fingerprint,
                    now(),
                    id
                ],
            )?;
            tx.commit()?;
            Ok(Ok(()))
        })
        .await
        .map_err(map_tr_err)?
        .map_err(|refusal| refusal.into_error(what))
}

/// Delete an item, keeping its last secret as a `deleted` snapshot.
pub async fn delete_item(db: &Database, name: &str) -> Result<(), StrongboxError> {
    let what = format!("item `{name}`");
    let name = name.to_string();
    db.connection()
        .call(move |conn| -> Result<Result<(), Refusal>, rusqlite::Error> {
            let tx = conn.transaction()?;
            if let Some(holder) = rotation_holder(&tx)? {
                return Ok(Err(Refusal::Locked(holder)));
            }
            let flags = SnapshotFlags {
                deleted: true,
                modified: false,
            };
            let Some(id) = snapshot_live(&tx, &name, flags)? else {
                return Ok(Err(Refusal::Missing));
            };
            tx.execute("DELETE FROM items WHERE id = ?1", params![id])?;
            tx.commit()?;
            Ok(Ok(()))
        })
        .await
        .map_err(map_tr_err)?
        .map_err(|refusal| refusal.into_error(what))
}

/// Holder of the rotation lock, read inside the writing transaction.
fn rotation_holder(tx: &rusqlite::Transaction<'_>) -> Result<Option<String>, rusqlite::Error> {
    tx.query_row(
        "SELECT value FROM vault_meta WHERE key = ?1",
        params![ROTATION_LOCK_KEY],
        |row| row.get(0),
    )
    .optional()
}

/// Copy the live triple of `name` into history. Returns the item id, or
/// `None` if there is no such item.
fn snapshot_live(
    tx: &rusqlite::Transaction<'_>,
    name: &str,
    flags: SnapshotFlags,
) -> Result<Option<i64>, rusqlite::Error> {
    let Some(id) = tx
        .query_row(
            "SELECT id FROM items WHERE name = ?1",
            params![name],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
    else {
        return Ok(None);
    };
    tx.execute(
        "INSERT INTO items_history
             (item_id, item_name, ciphertext, wrapped_key, fingerprint, deleted, modified, created_at)
         SELECT id, name, ciphertext, wrapped_key, fingerprint, ?2, ?3, ?4 FROM items WHERE id = ?1",
        params![id, flags.deleted, flags.modified, now()],
    )?;
    Ok(Some(id))
}

/// Every live triple in ascending id order.
pub async fn fetch_secret_records(db: &Database) -> Result<Vec<SecretRecord>, StrongboxError> {
    db.connection()
        .call(|conn| -> Result<Vec<SecretRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id"))?;
            let records = stmt
                .query_map([], |row| item_from_row(row).map(|item| item.to_record()))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite one live triple if it still holds what `current` holds.
///
/// Rotation is not an edit: `updated_at` and history are left alone.
pub async fn persist_secret(
    db: &Database,
    current: &SecretRecord,
    sealed: &SealedSecret,
) -> Result<(), StrongboxError> {
    rewrite_triple(db, "items", current, sealed)
        .await?
        .into_result(|| format!("live record {}", current.id))
}
