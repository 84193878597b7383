// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporter that records every callback for later assertion.

use strongbox_core::{Progress, RotationReport, RotationReporter, Source};

/// Captures progress ticks, detail batches and the final report.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub starts: Vec<(Source, usize)>,
    pub ticks: Vec<(Source, Progress)>,
    pub detail_batches: Vec<Vec<String>>,
    pub completed: Option<RotationReport>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every detail line, in the order it was flushed.
    pub fn all_details(&self) -> Vec<String> {
        self.detail_batches.concat()
    }
}

impl RotationReporter for RecordingReporter {
    fn on_start(&mut self, source: Source, total: usize) {
        self.starts.push((source, total));
    }

    fn on_progress(&mut self, source: Source, progress: &Progress) {
        self.ticks.push((source, *progress));
    }

    fn on_details(&mut self, lines: &[String]) {
        self.detail_batches.push(lines.to_vec());
    }

    fn on_complete(&mut self, report: &RotationReport) {
        self.completed = Some(report.clone());
    }
}
