// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementations of the `SecretStore` trait.
//!
//! Both stores share one [`Database`] and differ only in the table they read
//! and rewrite, so the rotation engine runs the same pipeline over each.

use async_trait::async_trait;
use strongbox_core::{SealedSecret, SecretRecord, SecretStore, Source, StrongboxError};

use crate::database::Database;
use crate::queries;

/// The `items` table.
#[derive(Debug, Clone)]
pub struct LiveItemStore {
    db: Database,
}

impl LiveItemStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SecretStore for LiveItemStore {
    fn source(&self) -> Source {
        Source::Live
    }

    async fn fetch_all(&self) -> Result<Vec<SecretRecord>, StrongboxError> {
        queries::items::fetch_secret_records(&self.db).await
    }

    async fn persist(
        &self,
        current: &SecretRecord,
        sealed: &SealedSecret,
    ) -> Result<(), StrongboxError> {
        queries::items::persist_secret(&self.db, current, sealed).await
    }
}

/// The `items_history` table.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    db: Database,
}

impl HistoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SecretStore for HistoryStore {
    fn source(&self) -> Source {
        Source::History
    }

    async fn fetch_all(&self) -> Result<Vec<SecretRecord>, StrongboxError> {
        queries::history::fetch_secret_records(&self.db).await
    }

    async fn persist(
        &self,
        current: &SecretRecord,
        sealed: &SealedSecret,
    ) -> Result<(), StrongboxError> {
        queries::history::persist_secret(&self.db, current, sealed).await
    }
}
