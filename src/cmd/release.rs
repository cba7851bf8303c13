// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pipeline commands: release, import-upstream and generate.
//!
//! ```text
//! tracks.toml (config branch) --> TrackConfig
//! resolver.rules              --> RuleTable
//! RunContext + Stages         --> pipeline::run --> RunReport --> summary / exit status
//! ```

use std::path::Path;

use anyhow::{Context, bail};
use tracing::debug;

use crate::cli::release::{GenerateArgs, TrackArgs};
use crate::config::Config;
use crate::config::tracks::TracksFile;
use crate::error::{GitError, Result};
use crate::git::query::is_git_repo;
use crate::logging::progress::ProgressDisplay;
use crate::pipeline::{self, RunContext, RunReport, Stages};
use crate::resolve::RuleTable;

/// Run every stage for a track.
///
/// # Errors
///
/// Returns an error if the track cannot be loaded, the run cannot start,
/// or any package failed.
pub fn run_release_command(args: &TrackArgs, config: &Config, repo: &Path) -> Result<()> {
    run_stages(args, Stages::all(), config, repo)
}

/// Import the upstream version of a track.
///
/// # Errors
///
/// Returns an error if the track cannot be loaded or the import fails.
pub fn run_import_upstream_command(args: &TrackArgs, config: &Config, repo: &Path) -> Result<()> {
    run_stages(args, Stages::IMPORT, config, repo)
}

/// Generate release and/or distribution branches from the last import.
///
/// # Errors
///
/// Returns an error if the track cannot be loaded, the run cannot start,
/// or any package failed.
pub fn run_generate_command(args: &GenerateArgs, config: &Config, repo: &Path) -> Result<()> {
    run_stages(&args.target, args.stages(), config, repo)
}

fn load_rules(config: &Config) -> Result<RuleTable> {
    match &config.resolver.rules {
        Some(path) => RuleTable::from_file(path)
            .with_context(|| format!("failed to load resolver rules from {}", path.display())),
        None => {
            debug!("no resolver rules configured");
            Ok(RuleTable::default())
        }
    }
}

fn run_stages(args: &TrackArgs, stages: Stages, config: &Config, repo: &Path) -> Result<()> {
    if !is_git_repo(repo) {
        return Err(GitError::RepoNotFound {
            path: repo.display().to_string(),
        }
        .into());
    }

    let tracks = TracksFile::load_from_branch(repo, &config.release).context("failed to load tracks")?;
    let track = tracks.track(&args.track)?;
    let rules = load_rules(config)?;

    let display = if args.quiet {
        ProgressDisplay::Hidden
    } else {
        ProgressDisplay::Bar
    };
    let mut ctx = RunContext::new(repo).with_progress(display);
    let report = pipeline::run(&mut ctx, &args.track, &track, stages, &rules)?;

    if !args.quiet {
        print_summary(&report);
    }
    if report.is_success() {
        return Ok(());
    }
    for failure in &report.failures {
        eprintln!("{} ({}): {}", failure.package, failure.stage, failure.error);
    }
    bail!(
        "{} package(s) failed: {}",
        report.failed_packages().len(),
        report.failed_packages().join(", ")
    )
}

fn print_summary(report: &RunReport) {
    if let Some(upstream) = &report.upstream {
        if upstream.created {
            println!("imported {}", upstream.tag);
        } else {
            println!("{} already imported", upstream.tag);
        }
    }
    for release in &report.releases {
        match &release.new_tag {
            Some(tag) => println!("{}: tagged {tag}", release.package),
            None => println!("{}: {} up to date", release.package, release.branch),
        }
    }
    for distribution in &report.distributions {
        if distribution.tagged {
            println!("{}: tagged {}", distribution.package, distribution.tag);
        }
    }
}
