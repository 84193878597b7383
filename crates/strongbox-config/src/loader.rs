// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/strongbox/strongbox.toml` < `~/.config/strongbox/strongbox.toml`
//! < `./strongbox.toml`, then `STRONGBOX_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::StrongboxConfig;

/// Config files in merge order (later overrides earlier).
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/strongbox/strongbox.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("strongbox/strongbox.toml"));
    }
    paths.push(PathBuf::from("strongbox.toml"));
    paths
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<StrongboxConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<StrongboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrongboxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StrongboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrongboxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The layered Figment before extraction.
pub fn build_figment() -> Figment {
    config_paths().into_iter().fold(
        Figment::new().merge(Serialized::defaults(StrongboxConfig::default())),
        |figment, path| figment.merge(Toml::file(path)),
    )
    .merge(env_provider())
}

/// Map `STRONGBOX_SECTION_KEY` to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `STRONGBOX_ROTATION_MAX_CIPHERTEXT_LEN` maps to `rotation.max_ciphertext_len`.
/// Passphrase variables share the prefix and are skipped.
fn env_provider() -> Env {
    Env::prefixed("STRONGBOX_")
        .ignore(&["passphrase", "new_passphrase"])
        .map(|key| {
            let key_str = key.as_str();
            let mapped = ["general", "storage", "vault", "rotation"]
                .iter()
                .find_map(|section| {
                    key_str
                        .strip_prefix(section)
                        .and_then(|rest| rest.strip_prefix('_'))
                        .map(|rest| format!("{section}.{rest}"))
                })
                .unwrap_or_else(|| key_str.to_string());
            mapped.into()
        })
}
