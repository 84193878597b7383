// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value access to `vault_meta`.

use rusqlite::{params, OptionalExtension};
use strongbox_core::StrongboxError;

use crate::database::{map_tr_err, Database};

/// Read one meta value.
pub async fn get_meta(db: &Database, key: &str) -> Result<Option<String>, StrongboxError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row(
                "SELECT value FROM vault_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a meta value only if the key is absent. Returns whether it was written.
pub async fn insert_meta(db: &Database, key: &str, value: &str) -> Result<bool, StrongboxError> {
    let key = key.to_string();
    let value = value.to_string();
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "INSERT OR IGNORE INTO vault_meta (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(changed == 1)
}

/// Replace a meta value only if it still holds `expected`. Returns whether it
/// was written.
pub async fn compare_and_set_meta(
    db: &Database,
    key: &str,
    expected: &str,
    value: &str,
) -> Result<bool, StrongboxError> {
    let key = key.to_string();
    let expected = expected.to_string();
    let value = value.to_string();
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE vault_meta SET value = ?3 WHERE key = ?1 AND value = ?2",
                params![key, expected, value],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(changed == 1)
}

/// Delete a meta value only if it still holds `expected`. Returns whether it
/// was deleted.
pub async fn delete_meta_if(
    db: &Database,
    key: &str,
    expected: &str,
) -> Result<bool, StrongboxError> {
    let key = key.to_string();
    let expected = expected.to_string();
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "DELETE FROM vault_meta WHERE key = ?1 AND value = ?2",
                params![key, expected],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(changed == 1)
}

/// Delete a meta value, returning what it held.
pub async fn take_meta(db: &Database, key: &str) -> Result<Option<String>, StrongboxError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let value = tx
                .query_row(
                    "SELECT value FROM vault_meta WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            tx.execute("DELETE FROM vault_meta WHERE key = ?1", params![key])?;
            tx.commit()?;
            Ok(value)
        })
        .await
        .map_err(map_tr_err)
}
