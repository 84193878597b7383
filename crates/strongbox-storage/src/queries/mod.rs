// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table.

pub mod history;
pub mod items;
pub mod meta;

use rusqlite::params;
use strongbox_core::{SealedSecret, SecretRecord, StrongboxError};

use crate::database::{map_tr_err, Database};

/// Outcome of a conditional triple rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rewrite {
    Written,
    /// The row holds a different triple than the one that was read.
    Changed,
    Missing,
}

/// Overwrite the triple of row `current.id` in `table`, but only while it
/// still holds the ciphertext and wrapped key of `current`.
pub(crate) async fn rewrite_triple(
    db: &Database,
    table: &'static str,
    current: &SecretRecord,
    sealed: &SealedSecret,
) -> Result<Rewrite, StrongboxError> {
    let id = current.id.0;
    let expected_ciphertext = current.ciphertext.clone();
    let expected_wrapped_key = current.wrapped_key.clone();
    let sealed = sealed.clone();
    db.connection()
        .call(move |conn| -> Result<Rewrite, rusqlite::Error> {
            let changed = conn.execute(
                &format!(
                    "UPDATE {table} SET ciphertext = ?1, wrapped_key = ?2, fingerprint = ?3
                     WHERE id = ?4 AND ciphertext = ?5 AND wrapped_key = ?6"
                ),
                params![
                    sealed.ciphertext,
                    sealed.wrapped_key,
                    sealed.fingerprint,
                    id,
                    expected_ciphertext,
                    expected_wrapped_key
                ],
            )?;
            if changed == 1 {
                return Ok(Rewrite::Written);
            }
            let exists: bool = conn.query_row(
                &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
                params![id],
                |row| row.get(0),
            )?;
            Ok(if exists { Rewrite::Changed } else { Rewrite::Missing })
        })
        .await
        .map_err(map_tr_err)
}

impl Rewrite {
    /// Turn a miss into the error the store trait promises.
    pub(crate) fn into_result(self, what: impl FnOnce() -> String) -> Result<(), StrongboxError> {
        match self {
            Rewrite::Written => Ok(()),
            Rewrite::Changed => Err(StrongboxError::Conflict { what: what() }),
            Rewrite::Missing => Err(StrongboxError::NotFound { what: what() }),
        }
    }
}
