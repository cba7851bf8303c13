// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Release pipeline orchestration.
//!
//! ```text
//! run(ctx, track, stages)
//!   IMPORT   upstream::import_upstream       upstream, upstream/<v>
//!   per package (sorted by name):
//!     RELEASE  release::release_package      release/<d>/<pkg>, .../<v>-<inc>
//!     DEBIAN   debian::generate_package      debian/<d>/<codename>/<pkg> per platform
//!   failures are collected per package; other packages continue
//! ```
//!
//! The repository must be clean and is not locked; no other writer may
//! touch it during a run. The starting checkout is restored afterwards.

pub mod debian;
pub mod derive;
pub mod names;
pub mod release;
pub mod upstream;


use bitflags::bitflags;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, error, info};

use crate::config::types::TrackConfig;
use crate::error::{PipelineError, ProcessError, RelResult};
use crate::git::cmd::clone;
use crate::git::ops::{BranchGuard, ensure_clean};
use crate::git::query::list_tags;
use crate::logging::LogContext;
use crate::logging::progress::{ProgressDisplay, RunProgress};
use crate::manifest::discover::DiscoveredPackage;
use crate::resolve::{DependencyResolver, ReleaseResolver};
use debian::{DebianOutcome, Platform};
use names::{latest_upstream_version, upstream_tag};
use release::ReleaseOutcome;
use upstream::UpstreamImport;

bitflags! {
    /// Pipeline stages to run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Stages: u8 {
        /// Import upstream onto the `upstream` branch.
        const IMPORT = 0x01;
        /// Build release branches.
        const RELEASE = 0x02;
        /// Generate distribution branches.
        const DEBIAN = 0x04;
    }
}

impl Default for Stages {
    fn default() -> Self {
        Self::all()
    }
}

/// State owned by the caller for the duration of one invocation.
///
/// Holds the temporary upstream clones so a track is fetched once per run.
#[derive(Debug)]
pub struct RunContext {
    repo: PathBuf,
    clones: BTreeMap<String, TempDir>,
    progress: ProgressDisplay,
}

impl RunContext {
    #[must_use]
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self {
            repo: repo.into(),
            clones: BTreeMap::new(),
            progress: ProgressDisplay::default(),
        }
    }

    #[must_use]
    pub const fn with_progress(mut self, progress: ProgressDisplay) -> Self {
        self.progress = progress;
        self
    }

    /// Release repository.
    #[must_use]
    pub fn repo(&self) -> &Path {
        &self.repo
    }

    /// Local clone of `uri`, cloned on first use.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the clone fails.
    pub fn upstream_clone(&mut self, uri: &str) -> RelResult<PathBuf> {
        if let Some(dir) = self.clones.get(uri) {
            debug!(uri, "reusing upstream clone");
            return Ok(dir.path().join("upstream"));
        }
        let dir = tempfile::tempdir()?;
        let dest = dir.path().join("upstream");
        info!(uri, "cloning upstream");
        clone(uri, &dest, None, false)?;
        self.clones.insert(uri.to_string(), dir);
        Ok(dest)
    }
}

/// A package that did not make it through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFailure {
    pub package: String,
    pub stage: &'static str,
    pub error: String,
}

/// Outcome of a pipeline run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub upstream: Option<UpstreamImport>,
    /// Upstream version the run worked on.
    pub version: Option<String>,
    pub releases: Vec<ReleaseOutcome>,
    pub distributions: Vec<DebianOutcome>,
    pub failures: Vec<PackageFailure>,
}

impl RunReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Names of failed packages, each once.
    #[must_use]
    pub fn failed_packages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.failures.iter().map(|f| f.package.as_str()).collect();
        names.dedup();
        names
    }
}

/// Fail early when `git` is not installed.
///
/// # Errors
///
/// Returns `ProcessError::ExecutableNotFound`.
pub fn require_git() -> RelResult<()> {
    which::which("git").map_err(|_| ProcessError::ExecutableNotFound {
        name: "git".to_string(),
    })?;
    Ok(())
}

/// Run `stages` of `track` against the release repository of `ctx`.
///
/// Errors that concern a single package are recorded in the report;
/// only problems that stop every package are returned as errors.
///
/// # Errors
///
/// Returns an error if git is missing, the repository is dirty, the
/// upstream import fails, or no upstream version has been imported.
pub fn run(
    ctx: &mut RunContext,
    track_name: &str,
    track: &TrackConfig,
    stages: Stages,
    resolver: &dyn DependencyResolver,
) -> RelResult<RunReport> {
    require_git()?;
    let repo = ctx.repo().to_path_buf();
    ensure_clean(&repo)?;
    let _guard = BranchGuard::new(&repo)?;
    let mut report = RunReport::default();

    let version = if stages.contains(Stages::IMPORT) {
        let import = upstream::import_upstream(ctx, track_name, track)?;
        let version = import.version.clone();
        report.upstream = Some(import);
        version
    } else {
        latest_upstream_version(&list_tags(&repo)?).ok_or_else(|| PipelineError::UpstreamImport {
            track: track_name.to_string(),
            reason: "no upstream version has been imported yet".to_string(),
        })?
    };
    report.version = Some(version.clone());

    if !stages.intersects(Stages::RELEASE | Stages::DEBIAN) {
        return Ok(report);
    }

    let snapshot = format!("refs/tags/{}", upstream_tag(&version));
    let packages = upstream::packages_at(&repo, &snapshot, &track.ignore_packages)?;
    info!(count = packages.len(), version = %version, "releasing packages");

    let released = packages.iter().map(|p| p.package.name.clone());
    let resolver = ReleaseResolver::new(resolver, &track.ros_distro, released);
    let platforms: Vec<Platform<'_>> = track
        .targets()
        .map(|(os, codename)| Platform { os, codename })
        .collect();

    let progress = RunProgress::new(u64::try_from(packages.len()).unwrap_or(u64::MAX), ctx.progress);
    for package in &packages {
        let mut log_ctx = LogContext::with_package(package.package.name.as_str());
        let _span = log_ctx.span().entered();
        let run = PackageRun {
            repo: &repo,
            track: track_name,
            distro: &track.ros_distro,
            version: &version,
            resolver: &resolver,
            platforms: &platforms,
        };
        if let Err(failure) = run.execute(package, stages, &mut log_ctx, &progress, &mut report) {
            error!(
                package = %failure.package,
                stage = failure.stage,
                error = %failure.error,
                "package failed"
            );
            report.failures.push(failure);
        }
        progress.advance();
    }
    progress.finish();

    if report.is_success() {
        info!(version = %version, "release pipeline finished");
    }
    Ok(report)
}

/// Per-package stage sequence.
struct PackageRun<'a> {
    repo: &'a Path,
    track: &'a str,
    distro: &'a str,
    version: &'a str,
    resolver: &'a ReleaseResolver<'a>,
    platforms: &'a [Platform<'a>],
}

impl PackageRun<'_> {
    fn execute(
        &self,
        package: &DiscoveredPackage,
        stages: Stages,
        log_ctx: &mut LogContext,
        progress: &RunProgress,
        report: &mut RunReport,
    ) -> Result<(), PackageFailure> {
        let name = package.package.name.as_str();
        let fail = |stage: &'static str, error: &dyn std::fmt::Display| PackageFailure {
            package: name.to_string(),
            stage,
            error: error.to_string(),
        };

        let inc = if stages.contains(Stages::RELEASE) {
            log_ctx.set_stage("release");
            progress.set_context(log_ctx);
            let outcome = release::release_package(self.repo, self.track, self.distro, self.version, package)
                .map_err(|e| fail("release", &e))?;
            let inc = outcome.inc;
            report.releases.push(outcome);
            inc
        } else {
            release::latest_inc(self.repo, self.distro, name, self.version)
                .map_err(|e| fail("release", &e))?
                .ok_or_else(|| {
                    fail(
                        "release",
                        &format!("'{name}' has no release for version {}", self.version),
                    )
                })?
        };

        if stages.contains(Stages::DEBIAN) {
            log_ctx.set_stage("debian");
            progress.set_context(log_ctx);
            for platform in self.platforms {
                let outcome = debian::generate_package(self.repo, name, self.version, inc, *platform, self.resolver)
                    .map_err(|e| fail("debian", &e))?;
                report.distributions.push(outcome);
            }
        }
        log_ctx.clear_stage();
        Ok(())
    }
}
