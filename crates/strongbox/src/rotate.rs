// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `strongbox rotate` command implementation.
//!
//! Runs the rotation engine over the live and history tables, then commits
//! the new fingerprint as the active one when the report allows it. Ctrl+C
//! stops the sweep between records; the fingerprint is then left alone.
//! `strongbox unlock` clears the vault lock of a rotation that died.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use colored::Colorize;
use secrecy::SecretString;
use serde::Serialize;
use strongbox_config::model::StrongboxConfig;
use strongbox_core::{
    Notification, RotationReport, RunStatus, Scope, SecretStore, StrongboxError,
};
use strongbox_storage::{ActiveFingerprint, Database, HistoryStore, LiveItemStore, RotationLock};
use strongbox_vault::{fingerprint, RotationOptions, RotationRequest, Rotator};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::progress::ProgressReporter;

/// Flags of `strongbox rotate`.
#[derive(Debug, Clone)]
pub struct RotateArgs {
    pub scope: Scope,
    pub demo: bool,
    pub report_path: Option<PathBuf>,
    pub verbose: bool,
}

/// What happened to the active fingerprint after the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitState {
    Committed,
    /// The report did not allow a commit (demo, cancelled, edited mid-run).
    Withheld,
    /// Only one table was rotated.
    PartialScope,
}

/// The JSON document written by `--report`.
#[derive(Debug, Serialize)]
struct ReportFile<'a> {
    scope: Scope,
    commit: CommitState,
    report: &'a RotationReport,
    notification: Notification,
}

#[derive(Debug)]
pub struct RotateOutcome {
    pub report: RotationReport,
    pub commit: CommitState,
    pub notification: Notification,
}

impl RotateOutcome {
    /// Every record in scope was attempted and none failed.
    pub fn is_clean(&self) -> bool {
        self.report.failures.is_empty() && self.report.status != RunStatus::Cancelled
    }

    /// Non-zero when any record failed or the run was cut short.
    pub fn exit_code(&self) -> ExitCode {
        if self.is_clean() {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(2)
        }
    }
}

/// Installs a Ctrl+C handler that cancels the returned token.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received SIGINT (Ctrl+C), stopping after the current record");
            token_clone.cancel();
        }
    });

    token
}

/// Run the rotation and commit the new fingerprint when allowed.
///
/// Outside demo mode the vault lock is held from before the first fetch until
/// after the commit, so item edits and other rotations wait it out.
pub async fn run_rotate(
    config: &StrongboxConfig,
    args: &RotateArgs,
    old_passphrase: SecretString,
    new_passphrase: SecretString,
    cancel: &CancellationToken,
) -> Result<RotateOutcome, StrongboxError> {
    let db = Database::open(&config.storage).await?;
    let active = ActiveFingerprint::new(db.clone());
    let previous = active.require().await?;

    let mut options = RotationOptions::from_config(config);
    options.demo_mode |= args.demo;
    if !fingerprint::verify(&old_passphrase, &previous, &options.kdf) {
        return Err(StrongboxError::Vault(
            "incorrect current master passphrase".to_string(),
        ));
    }

    let lock = if options.demo_mode {
        None
    } else {
        Some(RotationLock::acquire(&db).await?)
    };

    let outcome = rotate_and_commit(
        config,
        args,
        &db,
        &active,
        &previous,
        options,
        old_passphrase,
        new_passphrase,
        cancel,
    )
    .await;

    if let Some(lock) = lock {
        if let Err(e) = lock.release().await {
            warn!(error = %e, "could not release the rotation lock; run `strongbox unlock`");
        }
    }
    db.close().await?;
    outcome
}

#[allow(clippy::too_many_arguments)]
async fn rotate_and_commit(
    config: &StrongboxConfig,
    args: &RotateArgs,
    db: &Database,
    active: &ActiveFingerprint,
    previous: &str,
    options: RotationOptions,
    old_passphrase: SecretString,
    new_passphrase: SecretString,
    cancel: &CancellationToken,
) -> Result<RotateOutcome, StrongboxError> {
    let request = RotationRequest::new(old_passphrase, new_passphrase, &options.kdf)?;
    let live: Arc<dyn SecretStore> = Arc::new(LiveItemStore::new(db.clone()));
    let history: Arc<dyn SecretStore> = Arc::new(HistoryStore::new(db.clone()));
    let rotator = Rotator::new(live, history, options);

    let mut reporter = ProgressReporter::new(args.verbose);
    let report = rotator
        .rotate(&request, args.scope, &mut reporter, cancel)
        .await?;

    let commit = if args.scope != Scope::Both {
        CommitState::PartialScope
    } else if active
        .commit(previous, &request.target_fingerprint, &[&report])
        .await?
    {
        CommitState::Committed
    } else {
        CommitState::Withheld
    };
    if commit != CommitState::Committed {
        warn!(?commit, "active fingerprint left unchanged");
    }

    let notification = report.notification(&config.general.vault_name);
    if let Some(path) = &args.report_path {
        write_report(path, args.scope, commit, &report, &notification)?;
    }

    Ok(RotateOutcome {
        report,
        commit,
        notification,
    })
}

/// Clear the lock of an interrupted rotation. Returns the previous holder.
pub async fn run_unlock(config: &StrongboxConfig) -> Result<Option<String>, StrongboxError> {
    let db = Database::open(&config.storage).await?;
    let previous = RotationLock::force_release(&db).await?;
    db.close().await?;
    Ok(previous)
}

fn write_report(
    path: &Path,
    scope: Scope,
    commit: CommitState,
    report: &RotationReport,
    notification: &Notification,
) -> Result<(), StrongboxError> {
    let file = ReportFile {
        scope,
        commit,
        report,
        notification: notification.clone(),
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| StrongboxError::Internal(format!("failed to serialize report: {e}")))?;
    std::fs::write(path, json).map_err(StrongboxError::storage)?;
    info!(path = %path.display(), "rotation report written");
    Ok(())
}

/// Print the summary with failures highlighted.
pub fn print_outcome(outcome: &RotateOutcome) {
    let report = &outcome.report;
    for (i, line) in report.summary_lines().iter().enumerate() {
        if i == 0 {
            if outcome.is_clean() {
                eprintln!("{}", line.green().bold());
            } else {
                eprintln!("{}", line.yellow().bold());
            }
        } else if line.starts_with("WARNING") || line.starts_with("  ") {
            eprintln!("{}", line.red());
        } else {
            eprintln!("{line}");
        }
    }

    match outcome.commit {
        CommitState::Committed => eprintln!("{}", "New master passphrase is now active.".green()),
        CommitState::Withheld => eprintln!(
            "{}",
            "Master passphrase NOT changed; the previous passphrase is still active.".yellow()
        ),
        CommitState::PartialScope => eprintln!(
            "{}",
            "Master passphrase NOT changed; rotate with --scope both to switch.".yellow()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strongbox_storage::queries::items;
    use strongbox_test_utils::fixtures::{open_record, passphrase, FAST_KDF};
    use strongbox_test_utils::TestVault;
    use tempfile::TempDir;

    fn args(scope: Scope) -> RotateArgs {
        RotateArgs {
            scope,
            demo: false,
            report_path: None,
            verbose: false,
        }
    }

    #[tokio::test]
    async fn full_rotation_commits_and_writes_the_report() {
        let vault = TestVault::new("alpha").await.unwrap();
        vault.add("smtp", b"mail").await.unwrap();
        let out = TempDir::new().unwrap();
        let report_path = out.path().join("report.json");
        let args = RotateArgs {
            report_path: Some(report_path.clone()),
            ..args(Scope::Both)
        };

        let outcome = run_rotate(
            &vault.config,
            &args,
            passphrase("alpha"),
            passphrase("beta"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.commit, CommitState::Committed);
        assert!(outcome.is_clean());
        assert!(outcome.notification.subject.ends_with("succeeded"));
        let active = vault.active.require().await.unwrap();
        assert!(fingerprint::verify(&passphrase("beta"), &active, &FAST_KDF));

        let item = items::get_item(&vault.db, "smtp").await.unwrap().unwrap();
        assert_eq!(open_record(&item.to_record(), &passphrase("beta")).unwrap(), b"mail");

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(json["commit"], "committed");
        assert_eq!(json["scope"], "both");
        assert_eq!(json["report"]["status"], "completed");
        assert_eq!(json["report"]["total"], 1);
    }

    #[tokio::test]
    async fn partial_scope_is_never_committed() {
        let vault = TestVault::new("alpha").await.unwrap();
        vault.add("smtp", b"mail").await.unwrap();
        let before = vault.active.require().await.unwrap();

        let outcome = run_rotate(
            &vault.config,
            &args(Scope::Live),
            passphrase("alpha"),
            passphrase("beta"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.commit, CommitState::PartialScope);
        assert_eq!(vault.active.require().await.unwrap(), before);
    }

    #[tokio::test]
    async fn cancelled_run_is_withheld() {
        let vault = TestVault::new("alpha").await.unwrap();
        vault.add("smtp", b"mail").await.unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = run_rotate(
            &vault.config,
            &args(Scope::Both),
            passphrase("alpha"),
            passphrase("beta"),
            &cancel,
        )
        .await
        .unwrap();

        assert_eq!(outcome.report.status, RunStatus::Cancelled);
        assert_eq!(outcome.commit, CommitState::Withheld);
        assert!(!outcome.is_clean());
    }

    #[tokio::test]
    async fn demo_flag_is_withheld_and_writes_nothing() {
        let vault = TestVault::new("alpha").await.unwrap();
        vault.add("smtp", b"mail").await.unwrap();
        let args = RotateArgs {
            demo: true,
            ..args(Scope::Both)
        };

        let outcome = run_rotate(
            &vault.config,
            &args,
            passphrase("alpha"),
            passphrase("beta"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(outcome.report.demo);
        assert_eq!(outcome.commit, CommitState::Withheld);
        let item = items::get_item(&vault.db, "smtp").await.unwrap().unwrap();
        assert_eq!(open_record(&item.to_record(), &passphrase("alpha")).unwrap(), b"mail");
    }

    #[tokio::test]
    async fn wrong_current_passphrase_is_rejected_up_front() {
        let vault = TestVault::new("alpha").await.unwrap();
        let err = run_rotate(
            &vault.config,
            &args(Scope::Both),
            passphrase("wrong"),
            passphrase("beta"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("incorrect current master passphrase"));
    }

    #[tokio::test]
    async fn lock_is_released_after_the_run() {
        let vault = TestVault::new("alpha").await.unwrap();
        vault.add("smtp", b"mail").await.unwrap();

        run_rotate(
            &vault.config,
            &args(Scope::Both),
            passphrase("alpha"),
            passphrase("beta"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(RotationLock::holder(&vault.db).await.unwrap(), None);
    }

    #[tokio::test]
    async fn held_lock_blocks_a_second_rotation_until_unlocked() {
        let vault = TestVault::new("alpha").await.unwrap();
        vault.add("smtp", b"mail").await.unwrap();
        let _stale = RotationLock::acquire(&vault.db).await.unwrap();

        let err = run_rotate(
            &vault.config,
            &args(Scope::Both),
            passphrase("alpha"),
            passphrase("beta"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("already running"));
        let item = items::get_item(&vault.db, "smtp").await.unwrap().unwrap();
        assert_eq!(open_record(&item.to_record(), &passphrase("alpha")).unwrap(), b"mail");

        assert!(run_unlock(&vault.config).await.unwrap().is_some());
        let outcome = run_rotate(
            &vault.config,
            &args(Scope::Both),
            passphrase("alpha"),
            passphrase("beta"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(outcome.commit, CommitState::Committed);
    }
}
