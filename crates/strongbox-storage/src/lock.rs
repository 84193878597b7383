// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault-wide lock held for the duration of a rotation.
//!
//! The lock is a `vault_meta` row, so it is visible to every process sharing
//! the database file. While it exists, item writes (create, update, delete)
//! are refused and a second rotation cannot start. A process that dies
//! without releasing it leaves the row behind; [`RotationLock::force_release`]
//! clears it.

use strongbox_core::StrongboxError;
use tracing::{info, warn};

use crate::database::Database;
use crate::queries::meta;

pub(crate) const ROTATION_LOCK_KEY: &str = "rotation_lock";

/// A held rotation lock. Release it with [`RotationLock::release`].
#[derive(Debug)]
#[must_use = "the lock stays held until released"]
pub struct RotationLock {
    db: Database,
    holder: String,
}

impl RotationLock {
    /// Take the lock, failing if another rotation holds it.
    pub async fn acquire(db: &Database) -> Result<Self, StrongboxError> {
        let holder = format!(
            "pid {} since {}",
            std::process::id(),
            chrono::Utc::now().to_rfc3339()
        );
        if !meta::insert_meta(db, ROTATION_LOCK_KEY, &holder).await? {
            let current = Self::holder(db).await?.unwrap_or_default();
            return Err(StrongboxError::Vault(format!(
                "a rotation is already running ({current}); \
                 run `strongbox unlock` if it was interrupted"
            )));
        }
        info!(%holder, "rotation lock acquired");
        Ok(Self {
            db: db.clone(),
            holder,
        })
    }

    /// Who holds the lock, if anyone.
    pub async fn holder(db: &Database) -> Result<Option<String>, StrongboxError> {
        meta::get_meta(db, ROTATION_LOCK_KEY).await
    }

    /// Clear a lock left behind by an interrupted rotation. Returns the
    /// previous holder.
    pub async fn force_release(db: &Database) -> Result<Option<String>, StrongboxError> {
        let previous = meta::take_meta(db, ROTATION_LOCK_KEY).await?;
        if let Some(holder) = &previous {
            warn!(%holder, "rotation lock cleared by force");
        }
        Ok(previous)
    }

    /// Give the lock up.
    pub async fn release(self) -> Result<(), StrongboxError> {
        if !meta::delete_meta_if(&self.db, ROTATION_LOCK_KEY, &self.holder).await? {
            warn!(holder = %self.holder, "rotation lock was already gone");
        }
        info!("rotation lock released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquire_fails_until_release() {
        let db = Database::open_in_memory().await.unwrap();
        let lock = RotationLock::acquire(&db).await.unwrap();
        assert!(RotationLock::holder(&db).await.unwrap().is_some());

        let err = RotationLock::acquire(&db).await.unwrap_err();
        assert!(err.to_string().contains("already running"));

        lock.release().await.unwrap();
        assert_eq!(RotationLock::holder(&db).await.unwrap(), None);
        RotationLock::acquire(&db).await.unwrap().release().await.unwrap();
    }

    #[tokio::test]
    async fn force_release_clears_a_stale_lock() {
        let db = Database::open_in_memory().await.unwrap();
        let stale = RotationLock::acquire(&db).await.unwrap();

        let previous = RotationLock::force_release(&db).await.unwrap();
        assert!(previous.unwrap().starts_with("pid "));
        assert_eq!(RotationLock::force_release(&db).await.unwrap(), None);

        // Releasing after a forced clear is harmless.
        stale.release().await.unwrap();
    }
}
