// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Strongbox configuration system.

use strongbox_config::diagnostic::ConfigError;
use strongbox_config::model::StrongboxConfig;
use strongbox_config::{load_and_validate_str, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_strongbox_config() {
    let toml = r#"
[general]
vault_name = "ops"
log_level = "debug"
demo_mode = true

[storage]
database_path = "/tmp/strongbox-test.db"
wal_mode = false

[vault]
kdf_memory_cost = 32768
kdf_iterations = 2
kdf_parallelism = 1

[rotation]
flush_every = 25
max_ciphertext_len = 4096
max_wrapped_key_len = 512
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.general.vault_name, "ops");
    assert_eq!(config.general.log_level, "debug");
    assert!(config.general.demo_mode);
    assert_eq!(config.storage.database_path, "/tmp/strongbox-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.vault.kdf_memory_cost, 32768);
    assert_eq!(config.vault.kdf_iterations, 2);
    assert_eq!(config.vault.kdf_parallelism, 1);
    assert_eq!(config.rotation.flush_every, 25);
    assert_eq!(config.rotation.max_ciphertext_len, 4096);
    assert_eq!(config.rotation.max_wrapped_key_len, 512);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    let defaults = StrongboxConfig::default();
    assert_eq!(config.rotation.flush_every, defaults.rotation.flush_every);
    assert_eq!(config.rotation.max_ciphertext_len, 1000);
    assert_eq!(config.vault.kdf_memory_cost, 65536);
    assert!(!config.general.demo_mode);
}

#[test]
fn unknown_key_in_rotation_suggests_correction() {
    let toml = "[rotation]\nflush_evry = 10\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            valid_keys,
            ..
        } => {
            assert_eq!(key, "flush_evry");
            assert_eq!(suggestion.as_deref(), Some("flush_every"));
            assert!(valid_keys.contains("max_ciphertext_len"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telemetry]\nenabled = true\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "telemetry"));
}

#[test]
fn wrong_type_is_reported_with_key_path() {
    let errors = load_and_validate_str("[rotation]\nflush_every = \"often\"\n").unwrap_err();
    match &errors[0] {
        ConfigError::InvalidType { key, .. } => assert_eq!(key, "rotation.flush_every"),
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

#[test]
fn semantic_errors_are_collected_together() {
    let toml = "[vault]\nkdf_iterations = 1\n\n[rotation]\nflush_every = 0\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}
