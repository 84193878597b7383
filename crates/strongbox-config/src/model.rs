// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so misspelled keys are
//! rejected at startup instead of silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Strongbox configuration. Every section defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StrongboxConfig {
    /// Logging and deployment mode.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Key derivation settings for wrapping and fingerprints.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Rotation sweep settings.
    #[serde(default)]
    pub rotation: RotationConfig,
}

/// Logging and deployment mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Name used in notification subjects.
    #[serde(default = "default_vault_name")]
    pub vault_name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Read-only demo deployment: rotation reports success and writes nothing.
    #[serde(default)]
    pub demo_mode: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            vault_name: default_vault_name(),
            log_level: default_log_level(),
            demo_mode: false,
        }
    }
}

fn default_vault_name() -> String {
    "strongbox".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("strongbox").join("strongbox.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("strongbox.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Argon2id parameters used for new wrapped keys and new fingerprints.
///
/// Existing wrapped keys carry their own parameters, so changing these only
/// affects records sealed afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub kdf_memory_cost: u32,

    /// Argon2id iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2id parallelism lanes (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_memory_cost: default_kdf_memory_cost(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
        }
    }
}

fn default_kdf_memory_cost() -> u32 {
    65536
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

/// Rotation sweep configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RotationConfig {
    /// Emit a progress tick and flush detail lines every N records.
    #[serde(default = "default_flush_every")]
    pub flush_every: usize,

    /// Upper bound on a stored item ciphertext, in bytes.
    #[serde(default = "default_max_len")]
    pub max_ciphertext_len: usize,

    /// Upper bound on a stored wrapped key, in bytes.
    #[serde(default = "default_max_len")]
    pub max_wrapped_key_len: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            flush_every: default_flush_every(),
            max_ciphertext_len: default_max_len(),
            max_wrapped_key_len: default_max_len(),
        }
    }
}

fn default_flush_every() -> usize {
    100
}

fn default_max_len() -> usize {
    1000
}
