// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types exchanged between the rotation engine and its store adapters.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of a stored secret, unique within its table.
///
/// Live and history tables are disjoint id-spaces, so a bare `RecordId` is only
/// meaningful together with its [`Source`]. See [`RecordKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which table a record lives in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Current item secrets.
    Live,
    /// Immutable snapshots taken whenever a live secret changed.
    History,
}

/// Selects which pipelines a rotation request runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Live,
    History,
    Both,
}

impl Scope {
    /// The sources covered by this scope, in the order the pipelines run.
    pub fn sources(&self) -> &'static [Source] {
        match self {
            Scope::Live => &[Source::Live],
            Scope::History => &[Source::History],
            Scope::Both => &[Source::Live, Source::History],
        }
    }
}

/// A record reference that is unique across both tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub source: Source,
    pub id: RecordId,
}

impl RecordKey {
    pub fn new(source: Source, id: RecordId) -> Self {
        Self { source, id }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.source, self.id)
    }
}

/// One stored secret: the (ciphertext, wrapped key, fingerprint) triple plus
/// the owning item's display label.
///
/// Debug output shows only byte lengths.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub id: RecordId,
    /// Item name used in reports. Never the secret itself.
    pub label: String,
    pub ciphertext: Vec<u8>,
    pub wrapped_key: Vec<u8>,
    /// Fingerprint of the passphrase generation that produced `wrapped_key`.
    pub fingerprint: Option<String>,
}

impl SecretRecord {
    /// Whether there is anything to rotate.
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }
}

impl std::fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRecord")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("ciphertext_len", &self.ciphertext.len())
            .field("wrapped_key_len", &self.wrapped_key.len())
            .field("has_fingerprint", &self.fingerprint.is_some())
            .finish()
    }
}

/// A freshly sealed triple ready to be persisted in one atomic write.
///
/// `ciphertext` and `wrapped_key` only travel together.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedSecret {
    pub ciphertext: Vec<u8>,
    pub wrapped_key: Vec<u8>,
    pub fingerprint: String,
}

impl std::fmt::Debug for SealedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedSecret")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("wrapped_key_len", &self.wrapped_key.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_key_display() {
        let key = RecordKey::new(Source::History, RecordId(42));
        assert_eq!(key.to_string(), "history#42");
    }

    #[test]
    fn record_keys_order_live_before_history_then_by_id() {
        let mut keys = vec![
            RecordKey::new(Source::History, RecordId(1)),
            RecordKey::new(Source::Live, RecordId(9)),
            RecordKey::new(Source::Live, RecordId(2)),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                RecordKey::new(Source::Live, RecordId(2)),
                RecordKey::new(Source::Live, RecordId(9)),
                RecordKey::new(Source::History, RecordId(1)),
            ]
        );
    }

    #[test]
    fn debug_does_not_dump_bytes() {
        let record = SecretRecord {
            id: RecordId(1),
            label: "db".into(),
            ciphertext: vec![0xAB; 40],
            wrapped_key: vec![0xCD; 89],
            fingerprint: Some("$argon2id$...".into()),
        };
        let debug = format!("{record:?}");
        assert!(debug.contains("ciphertext_len: 40"));
        assert!(!debug.contains("171"));
        assert!(!debug.contains("argon2id"));
    }

    #[test]
    fn scope_parses_from_cli_strings() {
        use std::str::FromStr;
        assert_eq!(Scope::from_str("both").unwrap(), Scope::Both);
        assert_eq!(Scope::from_str("history").unwrap(), Scope::History);
        assert!(Scope::from_str("everything").is_err());
    }
}
