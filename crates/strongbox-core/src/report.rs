// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured result of a rotation run.
//!
//! A [`RotationReport`] is produced for every run that got past the initial
//! fetch. It is the only thing the rotation engine hands back to its caller:
//! per-record outcomes, a run status, and the data needed to render a
//! human-readable log or notification email. Nothing in here ever holds
//! plaintext.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::RecordKey;

/// Why a single record could not be rotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The record is tagged with a different passphrase generation (or none).
    PassphraseMismatch,
    /// The wrapped key or the ciphertext failed authentication.
    UnableToDecrypt,
    /// Re-encryption produced output outside the sanity bound, or another
    /// internal fault. The record was left untouched.
    InternalError { detail: String },
    /// The store rejected the write for this record.
    PersistFailed { detail: String },
    /// The record was edited between fetch and write. The edit was kept and
    /// the record is still sealed under the old passphrase.
    ChangedDuringRotation { detail: String },
}

impl FailureReason {
    /// Internal faults point at a defect rather than at bad data.
    pub fn is_internal(&self) -> bool {
        matches!(self, FailureReason::InternalError { .. })
    }

    /// A concurrent edit left the record under the old passphrase.
    pub fn is_conflict(&self) -> bool {
        matches!(self, FailureReason::ChangedDuringRotation { .. })
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::PassphraseMismatch => write!(f, "passphrase generation mismatch"),
            FailureReason::UnableToDecrypt => write!(f, "unable to decrypt"),
            FailureReason::InternalError { detail } => write!(f, "internal error: {detail}"),
            FailureReason::PersistFailed { detail } => write!(f, "persist failed: {detail}"),
            FailureReason::ChangedDuringRotation { detail } => {
                write!(f, "changed during rotation: {detail}")
            }
        }
    }
}

/// A failed record, identified by table, id and item label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    pub key: RecordKey,
    pub label: String,
    pub reason: FailureReason,
}

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every record in scope was attempted.
    Completed,
    /// The run stopped between records on request. Later records were not attempted.
    Cancelled,
    /// The scope held no records.
    NothingToDo,
}

/// A progress tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
    /// Estimated time remaining, `None` before any record was processed.
    pub eta: Option<Duration>,
}

impl Progress {
    /// Estimate remaining time from the elapsed time and the remaining count.
    pub fn estimate(processed: usize, total: usize, elapsed: Duration) -> Self {
        let eta = if processed == 0 {
            None
        } else {
            let remaining = total.saturating_sub(processed) as u128;
            let nanos = elapsed.as_nanos().saturating_mul(remaining) / processed as u128;
            Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
        };
        Self {
            processed,
            total,
            eta,
        }
    }

    pub fn eta_seconds(&self) -> Option<u64> {
        self.eta.map(|d| d.as_secs())
    }
}

/// Outcome of one rotation request (one or both pipelines).
#[derive(Debug, Clone, Serialize)]
pub struct RotationReport {
    pub status: RunStatus,
    /// Records fetched across all pipelines in scope.
    pub total: usize,
    pub succeeded: Vec<RecordKey>,
    /// Records with an empty ciphertext: informational, not failures.
    pub skipped_empty: Vec<RecordKey>,
    pub failures: Vec<RecordFailure>,
    /// Demo mode: successes were reported without any write.
    pub demo: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RotationReport {
    /// An empty report for a run starting now.
    pub fn begin(demo: bool) -> Self {
        let now = Utc::now();
        Self {
            status: RunStatus::NothingToDo,
            total: 0,
            succeeded: Vec::new(),
            skipped_empty: Vec::new(),
            failures: Vec::new(),
            demo,
            started_at: now,
            finished_at: now,
        }
    }

    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_empty.len()
    }

    /// Records that reached an outcome (success, skip, or failure).
    pub fn processed(&self) -> usize {
        self.succeeded.len() + self.skipped_empty.len() + self.failures.len()
    }

    /// Failure reasons keyed by record, in stable order.
    pub fn failures_by_record(&self) -> BTreeMap<RecordKey, &FailureReason> {
        self.failures.iter().map(|f| (f.key, &f.reason)).collect()
    }

    /// Whether any record was edited while the run was rewriting it.
    pub fn has_conflicts(&self) -> bool {
        self.failures.iter().any(|f| f.reason.is_conflict())
    }

    /// Whether any failure was an internal fault (oversize output and the like).
    pub fn has_internal_faults(&self) -> bool {
        self.failures.iter().any(|f| f.reason.is_internal())
    }

    /// Whether the caller may commit the new passphrase fingerprint on the
    /// strength of this report.
    ///
    /// A cancelled run left records under the old passphrase. A demo run wrote
    /// nothing. A record edited mid-run is still sealed under the old
    /// passphrase and would be stranded by the commit. Other record-level
    /// failures do not block the commit; they are listed for the operator.
    pub fn is_safe_to_commit(&self) -> bool {
        !self.demo
            && !self.has_conflicts()
            && matches!(self.status, RunStatus::Completed | RunStatus::NothingToDo)
    }

    /// Fold another pipeline's report into this one.
    pub fn merge(&mut self, other: RotationReport) {
        self.status = match (self.status, other.status) {
            (RunStatus::Cancelled, _) | (_, RunStatus::Cancelled) => RunStatus::Cancelled,
            (RunStatus::NothingToDo, RunStatus::NothingToDo) => RunStatus::NothingToDo,
            _ => RunStatus::Completed,
        };
        self.total += other.total;
        self.succeeded.extend(other.succeeded);
        self.skipped_empty.extend(other.skipped_empty);
        self.failures.extend(other.failures);
        self.demo |= other.demo;
        self.started_at = self.started_at.min(other.started_at);
        self.finished_at = self.finished_at.max(other.finished_at);
    }

    /// Human-readable summary, one line per fact, failures last.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let status = match self.status {
            RunStatus::Completed => "completed",
            RunStatus::Cancelled => "cancelled before all records were attempted",
            RunStatus::NothingToDo => "nothing to do",
        };
        lines.push(format!("Rotation {status}."));
        if self.demo {
            lines.push("Demo mode: no record was modified.".to_string());
        }
        lines.push(format!(
            "{} of {} records re-encrypted, {} failed, {} empty.",
            self.succeeded_count(),
            self.total,
            self.failed_count(),
            self.skipped_count()
        ));
        if self.has_internal_faults() {
            lines.push(
                "WARNING: internal faults occurred; affected records were left untouched."
                    .to_string(),
            );
        }
        if self.has_conflicts() {
            lines.push(
                "WARNING: records were edited during the run; rerun the rotation before committing."
                    .to_string(),
            );
        }
        for failure in &self.failures {
            lines.push(format!(
                "  {} ({}): {}",
                failure.key, failure.label, failure.reason
            ));
        }
        lines
    }

    /// Render the end-of-run message for email delivery.
    pub fn notification(&self, vault_name: &str) -> Notification {
        let outcome = if self.failures.is_empty() {
            "succeeded"
        } else {
            "finished with failures"
        };
        let subject = format!("[{vault_name}] master passphrase rotation {outcome}");
        let mut body = self.summary_lines().join("\n");
        body.push_str(&format!(
            "\n\nStarted: {}\nFinished: {}\n",
            self.started_at.to_rfc3339(),
            self.finished_at.to_rfc3339()
        ));
        Notification { subject, body }
    }
}

/// A rendered message for external delivery (email, chat). Transport is the
/// caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}
