// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase acquisition via environment variable or TTY prompt.

use secrecy::SecretString;
use strongbox_core::StrongboxError;

/// Environment variable holding the current master passphrase.
pub const PASSPHRASE_ENV_VAR: &str = "STRONGBOX_PASSPHRASE";

/// Environment variable holding the replacement master passphrase.
pub const NEW_PASSPHRASE_ENV_VAR: &str = "STRONGBOX_NEW_PASSPHRASE";

fn from_env(var: &str) -> Option<SecretString> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}

fn read_line(prompt: &str) -> Result<String, StrongboxError> {
    eprint!("{prompt}");
    rpassword::read_password()
        .map_err(|e| StrongboxError::Vault(format!("failed to read passphrase: {e}")))
}

fn stdin_is_terminal() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdin())
}

fn unavailable(var: &str) -> StrongboxError {
    StrongboxError::Vault(format!(
        "No passphrase provided. Set {var} or run interactively."
    ))
}

/// Get the current master passphrase.
///
/// `STRONGBOX_PASSPHRASE` wins over the interactive prompt so headless runs
/// (cron, systemd) work without a TTY.
pub fn get_passphrase() -> Result<SecretString, StrongboxError> {
    if let Some(passphrase) = from_env(PASSPHRASE_ENV_VAR) {
        return Ok(passphrase);
    }

    if stdin_is_terminal() {
        let passphrase = read_line("Master passphrase: ")?;
        if passphrase.is_empty() {
            return Err(StrongboxError::Vault("empty passphrase not allowed".to_string()));
        }
        return Ok(SecretString::from(passphrase));
    }

    Err(unavailable(PASSPHRASE_ENV_VAR))
}

/// Get a new master passphrase, prompting twice to confirm it.
///
/// `env_var` selects the variable consulted first: [`NEW_PASSPHRASE_ENV_VAR`]
/// for rotation, [`PASSPHRASE_ENV_VAR`] when creating a vault.
pub fn get_new_passphrase(env_var: &str) -> Result<SecretString, StrongboxError> {
    // Env var does not need confirmation.
    if let Some(passphrase) = from_env(env_var) {
        return Ok(passphrase);
    }

    if stdin_is_terminal() {
        let first = read_line("New master passphrase: ")?;
        let second = read_line("Confirm new master passphrase: ")?;

        if first != second {
            return Err(StrongboxError::Vault("passphrases do not match".to_string()));
        }
        if first.is_empty() {
            return Err(StrongboxError::Vault("empty passphrase not allowed".to_string()));
        }
        return Ok(SecretString::from(first));
    }

    Err(unavailable(env_var))
}
