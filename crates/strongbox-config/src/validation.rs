// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::StrongboxConfig;

/// Bytes of framing around an item ciphertext: version byte, nonce, GCM tag.
pub const CIPHERTEXT_OVERHEAD: usize = 1 + 12 + 16;

/// Size of a version-1 wrapped key.
pub const WRAPPED_KEY_LEN: usize = 1 + 12 + 16 + 12 + 32 + 16;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every problem instead of failing on the first one.
pub fn validate_config(config: &StrongboxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.general.log_level.as_str()) {
        fail(format!(
            "general.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.general.log_level
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.vault.kdf_memory_cost < 32768 {
        fail(format!(
            "vault.kdf_memory_cost must be at least 32768 (32 MiB), got {}",
            config.vault.kdf_memory_cost
        ));
    }

    if config.vault.kdf_iterations < 2 {
        fail(format!(
            "vault.kdf_iterations must be at least 2, got {}",
            config.vault.kdf_iterations
        ));
    }

    if config.vault.kdf_parallelism < 1 {
        fail(format!(
            "vault.kdf_parallelism must be at least 1, got {}",
            config.vault.kdf_parallelism
        ));
    }

    if config.rotation.flush_every == 0 {
        fail("rotation.flush_every must be at least 1".to_string());
    }

    if config.rotation.max_ciphertext_len <= CIPHERTEXT_OVERHEAD {
        fail(format!(
            "rotation.max_ciphertext_len must exceed the {CIPHERTEXT_OVERHEAD}-byte framing, got {}",
            config.rotation.max_ciphertext_len
        ));
    }

    if config.rotation.max_wrapped_key_len < WRAPPED_KEY_LEN {
        fail(format!(
            "rotation.max_wrapped_key_len must be at least {WRAPPED_KEY_LEN}, got {}",
            config.rotation.max_wrapped_key_len
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&StrongboxConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = StrongboxConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn weak_kdf_parameters_fail_validation() {
        let mut config = StrongboxConfig::default();
        config.vault.kdf_memory_cost = 1024;
        config.vault.kdf_iterations = 1;
        config.vault.kdf_parallelism = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_error(&errors, "kdf_memory_cost"));
        assert!(has_error(&errors, "kdf_iterations"));
        assert!(has_error(&errors, "kdf_parallelism"));
    }

    #[test]
    fn zero_flush_interval_fails_validation() {
        let mut config = StrongboxConfig::default();
        config.rotation.flush_every = 0;
        assert!(has_error(&validate_config(&config).unwrap_err(), "flush_every"));
    }

    #[test]
    fn bounds_below_framing_fail_validation() {
        let mut config = StrongboxConfig::default();
        config.rotation.max_ciphertext_len = CIPHERTEXT_OVERHEAD;
        config.rotation.max_wrapped_key_len = 10;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "max_ciphertext_len"));
        assert!(has_error(&errors, "max_wrapped_key_len"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = StrongboxConfig::default();
        config.general.log_level = "verbose".to_string();
        assert!(has_error(&validate_config(&config).unwrap_err(), "log_level"));
    }
}
