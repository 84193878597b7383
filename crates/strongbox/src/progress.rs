// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal progress for `strongbox rotate`.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use strongbox_core::{Progress, RotationReport, RotationReporter, Source};

/// Draws one progress bar per pipeline on stderr.
///
/// Detail lines are printed above the bar in verbose mode. The bar hides
/// itself when stderr is not a terminal.
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
    target: fn() -> ProgressDrawTarget,
    verbose: bool,
}

impl ProgressReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            bar: None,
            target: ProgressDrawTarget::stderr,
            verbose,
        }
    }

    #[cfg(test)]
    fn hidden(verbose: bool) -> Self {
        Self {
            bar: None,
            target: ProgressDrawTarget::hidden,
            verbose,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:>8} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn finish_current(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}

impl RotationReporter for ProgressReporter {
    fn on_start(&mut self, source: Source, total: usize) {
        self.finish_current();
        let bar = ProgressBar::with_draw_target(Some(total as u64), (self.target)());
        bar.set_style(Self::style());
        bar.set_prefix(source.to_string());
        self.bar = Some(bar);
    }

    fn on_progress(&mut self, _source: Source, progress: &Progress) {
        if let Some(bar) = &self.bar {
            bar.set_position(progress.processed as u64);
            bar.set_message(format_eta(progress.eta));
        }
    }

    fn on_details(&mut self, lines: &[String]) {
        if !self.verbose {
            return;
        }
        for line in lines {
            match &self.bar {
                Some(bar) => bar.println(line),
                None => eprintln!("{line}"),
            }
        }
    }

    fn on_complete(&mut self, _report: &RotationReport) {
        self.finish_current();
    }
}

fn format_eta(eta: Option<Duration>) -> String {
    match eta {
        None => String::new(),
        Some(eta) if eta.as_secs() >= 60 => {
            format!("eta {}m{:02}s", eta.as_secs() / 60, eta.as_secs() % 60)
        }
        Some(eta) => format!("eta {}s", eta.as_secs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_follows_progress_ticks() {
        let mut reporter = ProgressReporter::hidden(false);
        reporter.on_start(Source::Live, 10);
        reporter.on_progress(
            Source::Live,
            &Progress::estimate(4, 10, Duration::from_secs(8)),
        );

        let bar = reporter.bar.as_ref().unwrap();
        assert_eq!(bar.position(), 4);
        assert_eq!(bar.length(), Some(10));
        assert_eq!(bar.message(), "eta 12s");

        reporter.on_complete(&RotationReport::begin(false));
        assert!(reporter.bar.is_none());
    }

    #[test]
    fn a_new_pipeline_replaces_the_bar() {
        let mut reporter = ProgressReporter::hidden(true);
        reporter.on_start(Source::Live, 2);
        reporter.on_start(Source::History, 5);
        assert_eq!(reporter.bar.as_ref().unwrap().prefix(), "history");
        reporter.on_details(&["history#1 (db): rotated".to_string()]);
    }

    #[test]
    fn eta_formatting() {
        assert_eq!(format_eta(None), "");
        assert_eq!(format_eta(Some(Duration::from_secs(9))), "eta 9s");
        assert_eq!(format_eta(Some(Duration::from_secs(125))), "eta 2m05s");
    }
}
