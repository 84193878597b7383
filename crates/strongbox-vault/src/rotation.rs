// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master passphrase rotation.
//!
//! [`Rotator::rotate`] re-wraps every record in scope under a new passphrase.
//! Records are processed one at a time in ascending id order; each record is
//! either rotated and persisted as a unit, skipped, or recorded as a failure.
//! A single bad record never stops the sweep.
//!
//! All batches in scope are fetched before the first write, so a failed fetch
//! leaves the vault exactly as it was. Each write only lands if the record
//! still holds what was fetched; a record edited in the meantime keeps the
//! edit and is reported as changed during rotation, which blocks the commit.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use secrecy::SecretString;
use strongbox_config::model::StrongboxConfig;
use strongbox_core::{
    FailureReason, Progress, RecordFailure, RecordKey, RotationReport, RotationReporter,
    RunStatus, Scope, SecretRecord, SecretStore, Source, StrongboxError,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::envelope::{self, Limits, Sealer};
use crate::error::CryptoError;
use crate::fingerprint;
use crate::kdf::KdfParams;

/// Tunables for a rotation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationOptions {
    /// Argon2id cost for the new wrapped keys.
    pub kdf: KdfParams,
    pub limits: Limits,
    /// Flush detail lines and emit a progress tick every this many records.
    pub flush_every: usize,
    /// Report every record as rotated without writing anything.
    pub demo_mode: bool,
}

impl RotationOptions {
    pub fn from_config(config: &StrongboxConfig) -> Self {
        Self {
            kdf: KdfParams::from(&config.vault),
            limits: Limits::from(&config.rotation),
            flush_every: config.rotation.flush_every.max(1),
            demo_mode: config.general.demo_mode,
        }
    }
}

/// The two passphrase generations involved in a rotation, plus the
/// fingerprint every rotated record will carry.
///
/// The caller keeps `target_fingerprint` so that it can commit exactly that
/// value as the active fingerprint once the run is safe to commit.
pub struct RotationRequest {
    pub old_passphrase: SecretString,
    pub new_passphrase: SecretString,
    pub target_fingerprint: String,
}

impl RotationRequest {
    /// Build a request with a freshly computed target fingerprint.
    pub fn new(
        old_passphrase: SecretString,
        new_passphrase: SecretString,
        kdf: &KdfParams,
    ) -> Result<Self, CryptoError> {
        let target_fingerprint = fingerprint::fingerprint(&new_passphrase, kdf)?;
        Ok(Self {
            old_passphrase,
            new_passphrase,
            target_fingerprint,
        })
    }
}

impl std::fmt::Debug for RotationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationRequest")
            .field("old_passphrase", &"[REDACTED]")
            .field("new_passphrase", &"[REDACTED]")
            .field("target_fingerprint", &self.target_fingerprint)
            .finish()
    }
}

/// Caches fingerprint verdicts for the old passphrase.
///
/// Records of one generation share one fingerprint string, so Argon2id runs
/// once per distinct fingerprint instead of once per record.
struct FingerprintGate<'a> {
    passphrase: &'a SecretString,
    kdf: KdfParams,
    verdicts: HashMap<String, bool>,
}

impl<'a> FingerprintGate<'a> {
    fn new(passphrase: &'a SecretString, kdf: KdfParams) -> Self {
        Self {
            passphrase,
            kdf,
            verdicts: HashMap::new(),
        }
    }

    fn admits(&mut self, fingerprint: Option<&str>) -> bool {
        let Some(fingerprint) = fingerprint else {
            return false;
        };
        if let Some(verdict) = self.verdicts.get(fingerprint) {
            return *verdict;
        }
        let verdict = fingerprint::verify(self.passphrase, fingerprint, &self.kdf);
        self.verdicts.insert(fingerprint.to_string(), verdict);
        verdict
    }
}

enum Outcome {
    Rotated,
    Empty,
    Failed(FailureReason),
}

/// Runs the rotation pipelines against a live store and a history store.
pub struct Rotator {
    live: Arc<dyn SecretStore>,
    history: Arc<dyn SecretStore>,
    options: RotationOptions,
}

impl Rotator {
    pub fn new(
        live: Arc<dyn SecretStore>,
        history: Arc<dyn SecretStore>,
        options: RotationOptions,
    ) -> Self {
        Self {
            live,
            history,
            options,
        }
    }

    fn store(&self, source: Source) -> &dyn SecretStore {
        match source {
            Source::Live => self.live.as_ref(),
            Source::History => self.history.as_ref(),
        }
    }

    /// Re-wrap every record in `scope` from the old passphrase to the new one.
    ///
    /// Returns an error only when `target_fingerprint` does not belong to the
    /// new passphrase or when fetching a batch fails; in both cases nothing was
    /// written. Everything else, including cancellation, ends in a report.
    pub async fn rotate(
        &self,
        request: &RotationRequest,
        scope: Scope,
        reporter: &mut dyn RotationReporter,
        cancel: &CancellationToken,
    ) -> Result<RotationReport, StrongboxError> {
        let sealer = Sealer::new(
            &request.new_passphrase,
            request.target_fingerprint.clone(),
            self.options.kdf,
            self.options.limits,
        )
        .map_err(|e| StrongboxError::Vault(format!("target fingerprint rejected: {e}")))?;

        info!(%scope, demo = self.options.demo_mode, "starting passphrase rotation");

        let mut batches = Vec::with_capacity(scope.sources().len());
        for &source in scope.sources() {
            let records = self
                .store(source)
                .fetch_all()
                .await
                .map_err(|e| StrongboxError::BatchFetch {
                    table: source,
                    source: Box::new(e),
                })?;
            debug!(%source, count = records.len(), "fetched records");
            batches.push((source, records));
        }

        let mut gate = FingerprintGate::new(&request.old_passphrase, self.options.kdf);
        let mut report = RotationReport::begin(self.options.demo_mode);
        for (source, records) in batches {
            if report.status == RunStatus::Cancelled {
                // Counted but never attempted.
                report.total += records.len();
                continue;
            }
            let pipeline = self
                .rotate_pipeline(source, records, &sealer, &mut gate, reporter, cancel)
                .await;
            report.merge(pipeline);
        }
        report.finished_at = chrono::Utc::now();

        info!(
            status = ?report.status,
            total = report.total,
            succeeded = report.succeeded_count(),
            failed = report.failed_count(),
            empty = report.skipped_count(),
            "passphrase rotation finished"
        );
        if report.has_internal_faults() {
            warn!("rotation hit internal faults; affected records were left untouched");
        }

        reporter.on_complete(&report);
        Ok(report)
    }

    async fn rotate_pipeline(
        &self,
        source: Source,
        records: Vec<SecretRecord>,
        sealer: &Sealer<'_>,
        gate: &mut FingerprintGate<'_>,
        reporter: &mut dyn RotationReporter,
        cancel: &CancellationToken,
    ) -> RotationReport {
        let total = records.len();
        let mut report = RotationReport::begin(self.options.demo_mode);
        report.total = total;
        reporter.on_start(source, total);

        if total == 0 {
            info!(%source, "no records to rotate");
            return report;
        }
        report.status = RunStatus::Completed;

        let started = Instant::now();
        let mut details = Vec::with_capacity(self.options.flush_every.min(total));

        for (index, record) in records.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(%source, processed = index, total, "rotation cancelled");
                details.push(format!("cancelled after {index} of {total} {source} records"));
                report.status = RunStatus::Cancelled;
                break;
            }

            let key = RecordKey::new(source, record.id);
            match self.rotate_record(source, record, sealer, gate).await {
                Outcome::Rotated => {
                    debug!(record = %key, "record rotated");
                    let note = if self.options.demo_mode {
                        "rotated (demo, not written)"
                    } else {
                        "rotated"
                    };
                    details.push(format!("{key} ({}): {note}", record.label));
                    report.succeeded.push(key);
                }
                Outcome::Empty => {
                    debug!(record = %key, "empty secret, nothing to rotate");
                    details.push(format!("{key} ({}): empty secret, skipped", record.label));
                    report.skipped_empty.push(key);
                }
                Outcome::Failed(reason) => {
                    warn!(record = %key, label = %record.label, %reason, "record not rotated");
                    details.push(format!("{key} ({}): {reason}", record.label));
                    report.failures.push(RecordFailure {
                        key,
                        label: record.label.clone(),
                        reason,
                    });
                }
            }

            let processed = index + 1;
            if processed % self.options.flush_every == 0 || processed == total {
                reporter.on_details(&details);
                details.clear();
                reporter.on_progress(
                    source,
                    &Progress::estimate(processed, total, started.elapsed()),
                );
            }
        }

        if !details.is_empty() {
            reporter.on_details(&details);
        }
        report.finished_at = chrono::Utc::now();
        report
    }

    async fn rotate_record(
        &self,
        source: Source,
        record: &SecretRecord,
        sealer: &Sealer<'_>,
        gate: &mut FingerprintGate<'_>,
    ) -> Outcome {
        if self.options.demo_mode {
            return Outcome::Rotated;
        }
        if record.is_empty() {
            return Outcome::Empty;
        }
        if !gate.admits(record.fingerprint.as_deref()) {
            return Outcome::Failed(FailureReason::PassphraseMismatch);
        }

        let sealed = {
            let plaintext = match envelope::open_secret(record, gate.passphrase, &gate.kdf) {
                Ok(plaintext) => plaintext,
                Err(e) => {
                    debug!(%source, id = %record.id, error = %e, "decryption failed");
                    return Outcome::Failed(FailureReason::UnableToDecrypt);
                }
            };
            match sealer.seal(&plaintext) {
                Ok(sealed) => sealed,
                Err(e) => {
                    return Outcome::Failed(FailureReason::InternalError {
                        detail: e.to_string(),
                    });
                }
            }
        };

        match self.store(source).persist(record, &sealed).await {
            Ok(()) => Outcome::Rotated,
            Err(e @ StrongboxError::Conflict { .. }) => {
                warn!(%source, id = %record.id, "record changed during rotation, edit kept");
                Outcome::Failed(FailureReason::ChangedDuringRotation {
                    detail: e.to_string(),
                })
            }
            Err(e) => Outcome::Failed(FailureReason::PersistFailed {
                detail: e.to_string(),
            }),
        }
    }
}
