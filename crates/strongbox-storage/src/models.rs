// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for the vault tables.

use strongbox_core::{RecordId, SecretRecord};

/// A live item row.
#[derive(Clone, PartialEq, Eq)]
pub struct Item {
    pub id: RecordId,
    pub name: String,
    pub ciphertext: Vec<u8>,
    pub wrapped_key: Vec<u8>,
    pub fingerprint: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Item {
    /// The stored triple, labelled with the item name.
    pub fn to_record(&self) -> SecretRecord {
        SecretRecord {
            id: self.id,
            label: self.name.clone(),
            ciphertext: self.ciphertext.clone(),
            wrapped_key: self.wrapped_key.clone(),
            fingerprint: self.fingerprint.clone(),
        }
    }
}

impl std::fmt::Debug for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("ciphertext_len", &self.ciphertext.len())
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Why a history snapshot was taken. The two flags are independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotFlags {
    /// The live item was deleted after this snapshot.
    pub deleted: bool,
    /// The live secret was replaced after this snapshot.
    pub modified: bool,
}

/// An immutable snapshot of a previous item secret.
#[derive(Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: RecordId,
    pub item_id: RecordId,
    pub item_name: String,
    pub ciphertext: Vec<u8>,
    pub wrapped_key: Vec<u8>,
    pub fingerprint: Option<String>,
    pub flags: SnapshotFlags,
    pub created_at: String,
}

impl HistoryEntry {
    pub fn to_record(&self) -> SecretRecord {
        SecretRecord {
            id: self.id,
            label: self.item_name.clone(),
            ciphertext: self.ciphertext.clone(),
            wrapped_key: self.wrapped_key.clone(),
            fingerprint: self.fingerprint.clone(),
        }
    }
}

impl std::fmt::Debug for HistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryEntry")
            .field("id", &self.id)
            .field("item_name", &self.item_name)
            .field("flags", &self.flags)
            .field("created_at", &self.created_at)
            .finish()
    }
}
