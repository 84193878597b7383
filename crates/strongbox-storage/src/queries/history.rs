// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Item history operations.

use rusqlite::params;
use strongbox_core::{RecordId, SealedSecret, SecretRecord, StrongboxError};

use crate::database::{map_tr_err, Database};
use crate::models::{HistoryEntry, SnapshotFlags};
use crate::queries::rewrite_triple;

const HISTORY_COLUMNS: &str =
    "id, item_id, item_name, ciphertext, wrapped_key, fingerprint, deleted, modified, created_at";

fn entry_from_row(row: &rusqlite::Row<'_>) -> Result<HistoryEntry, rusqlite::Error> {
    Ok(HistoryEntry {
        id: RecordId(row.get(0)?),
        item_id: RecordId(row.get(1)?),
        item_name: row.get(2)?,
        ciphertext: row.get(3)?,
        wrapped_key: row.get(4)?,
        fingerprint: row.get(5)?,
        flags: SnapshotFlags {
            deleted: row.get(6)?,
            modified: row.get(7)?,
        },
        created_at: row.get(8)?,
    })
}

/// Snapshots of one item, oldest first.
pub async fn list_history(
    db: &Database,
    item_name: &str,
) -> Result<Vec<HistoryEntry>, StrongboxError> {
    let item_name = item_name.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<HistoryEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {HISTORY_COLUMNS} FROM items_history WHERE item_name = ?1 ORDER BY id"
            ))?;
            let entries = stmt
                .query_map(params![item_name], entry_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
        .await
        .map_err(map_tr_err)
}

/// One snapshot by id.
pub async fn get_entry(db: &Database, id: RecordId) -> Result<HistoryEntry, StrongboxError> {
    let entry = db
        .connection()
        .call(move |conn| -> Result<Option<HistoryEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {HISTORY_COLUMNS} FROM items_history WHERE id = ?1"
            ))?;
            let mut rows = stmt.query_map(params![id.0], entry_from_row)?;
            rows.next().transpose()
        })
        .await
        .map_err(map_tr_err)?;

    entry.ok_or_else(|| StrongboxError::NotFound {
        what: format!("history record {id}"),
    })
}

/// Every history triple in ascending id order.
pub async fn fetch_secret_records(db: &Database) -> Result<Vec<SecretRecord>, StrongboxError> {
    db.connection()
        .call(|conn| -> Result<Vec<SecretRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {HISTORY_COLUMNS} FROM items_history ORDER BY id"
            ))?;
            let records = stmt
                .query_map([], |row| entry_from_row(row).map(|entry| entry.to_record()))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite one history triple if it still holds what `current` holds.
/// Flags and timestamps are left alone.
pub async fn persist_secret(
    db: &Database,
    current: &SecretRecord,
    sealed: &SealedSecret,
) -> Result<(), StrongboxError> {
    rewrite_triple(db, "items_history", current, sealed)
        .await?
        .into_result(|| format!("history record {}", current.id))
}
