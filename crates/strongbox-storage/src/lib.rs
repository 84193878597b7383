// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Strongbox credential vault.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, typed operations on live items and
//! their history, the `SecretStore` adapters the rotation engine runs
//! against, the active passphrase fingerprint, and the rotation lock.

pub mod active;
pub mod adapter;
pub mod database;
pub mod lock;
pub mod migrations;
pub mod models;
pub mod queries;

pub use active::ActiveFingerprint;
pub use adapter::{HistoryStore, LiveItemStore};
pub use database::Database;
pub use lock::RotationLock;
pub use models::*;
