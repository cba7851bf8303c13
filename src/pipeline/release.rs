// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Release branch builder.
//!
//! ```text
//! upstream/<version>:<pkg path>  --derive-->  release/<distro>/<pkg>
//!                                             tag release/<distro>/<pkg>/<version>-<inc>
//! inc: 1 for a new version, unchanged when the tree matches the newest tag,
//!      newest + 1 otherwise
//! ```

use std::path::Path;
use tracing::{debug, info};

use super::derive::{DeriveOutcome, DeriveRequest, derive_branch};
use super::names::{release_branch, release_incs, release_tag, upstream_tag};
use crate::error::{PipelineError, RelResult};
use crate::git::cmd::tag;
use crate::git::query::{list_tags, subtree_of, tree_of};
use crate::manifest::discover::DiscoveredPackage;

/// What a release run did for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    pub package: String,
    pub branch: String,
    pub version: String,
    /// Release number of the newest tag for this version.
    pub inc: u32,
    /// Tag created in this run, `None` when the newest tag already matched.
    pub new_tag: Option<String>,
    pub branch_state: DeriveOutcome,
}

/// Release number for the next tag, or `None` when `tip_tree` already
/// carries the newest tag.
fn next_inc(repo: &Path, distro: &str, package: &str, version: &str, tip_tree: &str) -> RelResult<(u32, bool)> {
    let tags = list_tags(repo)?;
    let Some(newest) = release_incs(&tags, distro, package, version).last().copied() else {
        return Ok((1, true));
    };
    let newest_tag = release_tag(distro, package, version, newest);
    if tree_of(repo, &format!("refs/tags/{newest_tag}"))?.as_deref() == Some(tip_tree) {
        return Ok((newest, false));
    }
    Ok((newest + 1, true))
}

/// Newest release number tagged for `package` at `version`.
///
/// # Errors
///
/// Returns a `GitError` if the tags cannot be listed.
pub fn latest_inc(repo: &Path, distro: &str, package: &str, version: &str) -> RelResult<Option<u32>> {
    let tags = list_tags(repo)?;
    Ok(release_incs(&tags, distro, package, version).last().copied())
}

/// Create or update the release branch of `package` from the imported
/// upstream `version` and tag the result.
///
/// # Errors
///
/// Returns `PipelineError::UpstreamImport` if the package is missing from
/// the upstream snapshot, or any error of the branch derivation.
pub fn release_package(
    repo: &Path,
    track: &str,
    distro: &str,
    version: &str,
    package: &DiscoveredPackage,
) -> RelResult<ReleaseOutcome> {
    let name = package.package.name.as_str();
    let upstream = format!("refs/tags/{}", upstream_tag(version));
    let source = subtree_of(repo, &upstream, &package.path)?.ok_or_else(|| {
        PipelineError::UpstreamImport {
            track: track.to_string(),
            reason: format!("'{}' has no directory '{}'", upstream_tag(version), package.path),
        }
    })?;

    let branch = release_branch(distro, name);
    let message = format!("Release {name} {version} from {}", upstream_tag(version));
    let request = DeriveRequest {
        branch: &branch,
        source_tree: &source,
        message: &message,
        package: name,
        stage: "release",
    };
    let state = derive_branch(repo, &request, |_| Ok(()))?;

    let tip_tree = tree_of(repo, state.tip())?.unwrap_or_default();
    let (inc, fresh) = next_inc(repo, distro, name, version, &tip_tree)?;
    let new_tag = if fresh {
        let tag_name = release_tag(distro, name, version, inc);
        tag(repo, &tag_name, &format!("Release {name} {version}-{inc}"), state.tip(), false)?;
        info!(package = name, tag = %tag_name, "tagged release");
        Some(tag_name)
    } else {
        debug!(package = name, inc, "release already tagged");
        None
    };

    Ok(ReleaseOutcome {
        package: name.to_string(),
        branch,
        version: version.to_string(),
        inc,
        new_tag,
        branch_state: state,
    })
}
