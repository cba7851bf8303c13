// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Terminal progress for a pipeline run.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::OnceLock;

use super::LogContext;

/// How run progress is shown on the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressDisplay {
    /// No progress output (`--quiet`, tests).
    Hidden,
    /// One bar counting processed packages.
    #[default]
    Bar,
}

/// Pre-validated progress bar style for package counts.
fn bar_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        })
        .clone()
}

/// Progress over the packages of one run.
#[derive(Debug)]
pub struct RunProgress {
    bar: ProgressBar,
}

impl RunProgress {
    /// Create progress for `total` packages.
    #[must_use]
    pub fn new(total: u64, display: ProgressDisplay) -> Self {
        let bar = match display {
            ProgressDisplay::Hidden => ProgressBar::hidden(),
            ProgressDisplay::Bar => {
                let bar = ProgressBar::new(total);
                bar.set_style(bar_style());
                bar
            }
        };
        Self { bar }
    }

    /// Show what is being worked on.
    pub fn set_context(&self, context: &LogContext) {
        self.bar.set_message(context.prefix().trim_end().to_string());
    }

    /// Mark one package as done.
    pub fn advance(&self) {
        self.bar.inc(1);
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Remove the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
