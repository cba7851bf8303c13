// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Upstream importer.
//!
//! ```text
//! vcs_uri --clone--> <tmp>/upstream --checkout devel_branch--> discover, read version
//!                                    --checkout release tag--> fetch HEAD
//! release repo:  upstream  <- commit "Imported upstream version X"   tag upstream/X
//! ```
//!
//! The whole upstream tree is imported as is, so symlinks, odd file names
//! and overlay directories arrive unchanged.

use std::path::Path;
use tracing::{debug, info};

use super::RunContext;
use super::names::{UPSTREAM_BRANCH, upstream_tag};
use crate::config::types::{TrackConfig, VcsType, VersionSource};
use crate::error::{GitError, PipelineError, RelResult};
use crate::git::cmd::{add_all, checkout, commit, fetch_ref, read_tree_reset, tag};
use crate::git::ops::{BranchGuard, switch_or_orphan};
use crate::git::query::{commit_of, resolve};
use crate::manifest::discover::{DiscoveredPackage, discover_packages};

/// Result of an upstream import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamImport {
    pub version: String,
    /// `upstream/<version>`.
    pub tag: String,
    /// Commit the tag points at.
    pub commit: String,
    /// `false` when the version had already been imported.
    pub created: bool,
}

fn import_error(track: &str, reason: impl Into<String>) -> PipelineError {
    PipelineError::UpstreamImport {
        track: track.to_string(),
        reason: reason.into(),
    }
}

/// Single version shared by every package.
///
/// # Errors
///
/// Returns `PipelineError::UpstreamImport` when there are no packages or
/// their versions differ.
pub fn common_version(track: &str, packages: &[DiscoveredPackage]) -> Result<String, PipelineError> {
    let Some(first) = packages.first() else {
        return Err(import_error(track, "no packages found in upstream repository"));
    };
    if packages.iter().all(|p| p.package.version == first.package.version) {
        return Ok(first.package.version.clone());
    }
    let listing = packages
        .iter()
        .map(|p| format!("{} {}", p.package.name, p.package.version))
        .collect::<Vec<_>>()
        .join(", ");
    Err(import_error(track, format!("inconsistent package versions: {listing}")))
}

/// Import the upstream source of `track` onto the `upstream` branch.
///
/// Re-importing a version that already has an `upstream/<version>` tag is
/// a no-op.
///
/// # Errors
///
/// Returns `GitError::UnsupportedVcs` for non-git upstreams, a clone or
/// checkout error, or `PipelineError::UpstreamImport` when no single
/// version can be determined.
pub fn import_upstream(ctx: &mut RunContext, track_name: &str, track: &TrackConfig) -> RelResult<UpstreamImport> {
    if track.vcs_type != VcsType::Git {
        return Err(GitError::UnsupportedVcs {
            vcs_type: track.vcs_type.to_string(),
        }
        .into());
    }

    let clone = ctx.upstream_clone(&track.vcs_uri)?;
    if let Some(devel) = track.devel_branch.as_deref() {
        checkout(&clone, devel)?;
    }

    let version = match &track.version {
        VersionSource::Literal(version) => version.clone(),
        VersionSource::Auto => {
            let packages = discover_packages(&clone, &track.ignore_packages)?;
            common_version(track_name, &packages)?
        }
    };
    info!(track = track_name, version = %version, "upstream version");

    let repo = ctx.repo().to_path_buf();
    let tag_name = upstream_tag(&version);
    if let Some(existing) = commit_of(&repo, &format!("refs/tags/{tag_name}"))? {
        info!(tag = %tag_name, "upstream version already imported");
        return Ok(UpstreamImport {
            version,
            tag: tag_name,
            commit: existing,
            created: false,
        });
    }

    if let Some(reference) = track.release_tag.resolve(&version) {
        if resolve(&clone, &format!("{reference}^{{commit}}"))?.is_none() {
            return Err(import_error(
                track_name,
                format!("upstream has no ref '{reference}' for version {version}"),
            )
            .into());
        }
        checkout(&clone, &reference)?;
    }

    let commit = snapshot(&repo, &clone, &version)?;
    tag(&repo, &tag_name, &format!("Upstream version {version}"), &commit, false)?;
    info!(tag = %tag_name, commit = %commit, "imported upstream");
    Ok(UpstreamImport {
        version,
        tag: tag_name,
        commit,
        created: true,
    })
}

/// Commit the checked out tree of `clone` on top of the `upstream` branch.
fn snapshot(repo: &Path, clone: &Path, version: &str) -> RelResult<String> {
    let source = clone.to_string_lossy();
    fetch_ref(repo, &source, "HEAD")?;

    let _guard = BranchGuard::new(repo)?;
    let created = switch_or_orphan(repo, UPSTREAM_BRANCH)?;
    debug!(created, "on upstream branch");
    read_tree_reset(repo, "FETCH_HEAD^{tree}")?;
    add_all(repo)?;
    commit(repo, &format!("Imported upstream version {version}"))?;

    commit_of(repo, "HEAD")?.ok_or_else(|| {
        GitError::BranchNotFound {
            branch: UPSTREAM_BRANCH.to_string(),
        }
        .into()
    })
}

/// Packages contained in an imported upstream snapshot.
///
/// The snapshot is checked out (detached) for the walk; the previous
/// checkout is restored before returning.
///
/// # Errors
///
/// Returns a checkout or discovery error.
pub fn packages_at(repo: &Path, revision: &str, ignore_patterns: &[String]) -> RelResult<Vec<DiscoveredPackage>> {
    let _guard = BranchGuard::new(repo)?;
    checkout(repo, revision)?;
    discover_packages(repo, ignore_patterns)
}
