// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observer receiving progress and results from a rotation run.

use crate::report::{Progress, RotationReport};
use crate::types::Source;

/// Receives progress ticks, batched detail lines, and the final report.
///
/// Detail lines are flushed in batches so that very large runs do not
/// accumulate the whole log in memory. Persisting the report and notifying
/// anyone about it is the reporter's job.
pub trait RotationReporter: Send {
    /// A pipeline is about to process `total` records.
    fn on_start(&mut self, _source: Source, _total: usize) {}

    /// Periodic progress tick with an ETA estimate.
    fn on_progress(&mut self, source: Source, progress: &Progress);

    /// A batch of human-readable log lines. Never contains plaintext.
    fn on_details(&mut self, lines: &[String]);

    /// The run finished (completed, cancelled, or had nothing to do).
    fn on_complete(&mut self, report: &RotationReport);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl RotationReporter for NullReporter {
    fn on_progress(&mut self, _source: Source, _progress: &Progress) {}

    fn on_details(&mut self, _lines: &[String]) {}

    fn on_complete(&mut self, _report: &RotationReport) {}
}
