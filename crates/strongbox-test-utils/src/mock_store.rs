// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory secret store for deterministic rotation tests.
//!
//! `MockStore` implements `SecretStore` over a sorted map, with injectable
//! fetch and persist failures and a write counter for assertions. Persist
//! honors the compare-and-swap contract of the trait.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use strongbox_core::{RecordId, SealedSecret, SecretRecord, SecretStore, Source, StrongboxError};

/// A mock table of item secrets.
#[derive(Clone)]
pub struct MockStore {
    source: Source,
    rows: Arc<Mutex<BTreeMap<RecordId, SecretRecord>>>,
    fail_fetch: bool,
    fail_persist: Arc<Mutex<HashSet<RecordId>>>,
    writes: Arc<Mutex<Vec<RecordId>>>,
}

impl MockStore {
    /// Create an empty table for `source`.
    pub fn new(source: Source) -> Self {
        Self {
            source,
            rows: Arc::new(Mutex::new(BTreeMap::new())),
            fail_fetch: false,
            fail_persist: Arc::new(Mutex::new(HashSet::new())),
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a table pre-filled with `records`.
    pub fn with_records(source: Source, records: Vec<SecretRecord>) -> Self {
        let store = Self::new(source);
        let rows = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            rows: Arc::new(Mutex::new(rows)),
            ..store
        }
    }

    /// Make every `fetch_all` fail.
    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Make `persist` fail for one record.
    pub async fn fail_persist_for(&self, id: RecordId) {
        self.fail_persist.lock().await.insert(id);
    }

    /// Insert or replace a record.
    pub async fn insert(&self, record: SecretRecord) {
        self.rows.lock().await.insert(record.id, record);
    }

    /// Current state of one record.
    pub async fn record(&self, id: RecordId) -> Option<SecretRecord> {
        self.rows.lock().await.get(&id).cloned()
    }

    /// Ids written through `persist`, in order.
    pub async fn written(&self) -> Vec<RecordId> {
        self.writes.lock().await.clone()
    }
}

#[async_trait]
impl SecretStore for MockStore {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch_all(&self) -> Result<Vec<SecretRecord>, StrongboxError> {
        if self.fail_fetch {
            return Err(StrongboxError::storage(std::io::Error::other(
                "mock fetch failure",
            )));
        }
        Ok(self.rows.lock().await.values().cloned().collect())
    }

    async fn persist(
        &self,
        current: &SecretRecord,
        sealed: &SealedSecret,
    ) -> Result<(), StrongboxError> {
        let id = current.id;
        if self.fail_persist.lock().await.contains(&id) {
            return Err(StrongboxError::storage(std::io::Error::other(
                "mock persist failure",
            )));
        }
        let what = || format!("{} record {id}", self.source);
        let mut rows = self.rows.lock().await;
        let row = rows
            .get_mut(&id)
            .ok_or_else(|| StrongboxError::NotFound { what: what() })?;
        if row.ciphertext != current.ciphertext || row.wrapped_key != current.wrapped_key {
            return Err(StrongboxError::Conflict { what: what() });
        }
        row.ciphertext = sealed.ciphertext.clone();
        row.wrapped_key = sealed.wrapped_key.clone();
        row.fingerprint = Some(sealed.fingerprint.clone());
        self.writes.lock().await.push(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> SecretRecord {
        SecretRecord {
            id: RecordId(id),
            label: format!("item {id}"),
            ciphertext: vec![1, 2, 3],
            wrapped_key: vec![4, 5, 6],
            fingerprint: None,
        }
    }

    #[tokio::test]
    async fn fetch_returns_ascending_ids() {
        let store = MockStore::with_records(Source::Live, vec![record(3), record(1), record(2)]);
        let ids: Vec<_> = store
            .fetch_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id.0)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn persist_replaces_the_triple() {
        let store = MockStore::with_records(Source::History, vec![record(1)]);
        let sealed = SealedSecret {
            ciphertext: vec![9],
            wrapped_key: vec![8],
            fingerprint: "fp".into(),
        };
        store.persist(&record(1), &sealed).await.unwrap();

        let row = store.record(RecordId(1)).await.unwrap();
        assert_eq!(row.ciphertext, vec![9]);
        assert_eq!(row.fingerprint.as_deref(), Some("fp"));
        assert_eq!(store.written().await, vec![RecordId(1)]);

        // `record(1)` no longer matches what is stored.
        assert!(matches!(
            store.persist(&record(1), &sealed).await,
            Err(StrongboxError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn injected_failures() {
        let store = MockStore::with_records(Source::Live, vec![record(1)]);
        store.fail_persist_for(RecordId(1)).await;
        let sealed = SealedSecret {
            ciphertext: vec![],
            wrapped_key: vec![],
            fingerprint: String::new(),
        };
        assert!(store.persist(&record(1), &sealed).await.is_err());
        assert!(store.written().await.is_empty());

        let broken = MockStore::new(Source::Live).failing_fetch();
        assert!(broken.fetch_all().await.is_err());
    }
}
