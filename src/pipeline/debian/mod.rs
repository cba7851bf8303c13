// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Distribution branch generator.
//!
//! ```text
//! release/<distro>/<pkg>/<version>-<inc>  (tag)
//!     | manifest, license files, author date
//!     v
//! DebianMetadata --render--> debian/{control,changelog,copyright,rules,compat,source/format}
//!     |
//!     v  derive (overlay on the release tree)
//! debian/<distro>/<codename>/<pkg>
//!     tag debian/ros-<distro>-<san>_<version>-<inc>_<codename>
//! ```
//!
//! Dependencies are resolved before any branch is touched, so a resolution
//! failure leaves the repository as it was.

pub mod render;

#[cfg(test)]
mod tests;

use std::path::Path;
use tracing::{debug, info, warn};

use super::derive::{DeriveOutcome, DeriveRequest, derive_branch};
use super::names::{debian_branch, debian_package_name, debian_tag, release_tag};
use crate::error::{GitError, ManifestError, RelResult};
use crate::git::cmd::tag;
use crate::git::query::{author_date_rfc2822, show_file, tree_of};
use crate::manifest::{MANIFEST_FILE, Package};
use crate::resolve::ReleaseResolver;
use render::{DebianMetadata, LicenseText};

/// Target platform of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform<'a> {
    pub os: &'a str,
    pub codename: &'a str,
}

/// What a generation did for one package and platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebianOutcome {
    pub package: String,
    pub codename: String,
    pub branch: String,
    pub tag: String,
    /// Whether the tag was created or moved in this run.
    pub tagged: bool,
    pub branch_state: DeriveOutcome,
}

fn as_refs(keys: &[String]) -> Vec<&str> {
    keys.iter().map(String::as_str).collect()
}

/// Build the packaging metadata of `package` released at `release_ref`.
///
/// # Errors
///
/// Returns `PipelineError::DependencyResolution` for an unknown dependency
/// and a `GitError` if the release commit cannot be read.
pub fn metadata_for(
    repo: &Path,
    release_ref: &str,
    package: &Package,
    inc: u32,
    platform: Platform<'_>,
    resolver: &ReleaseResolver<'_>,
) -> RelResult<DebianMetadata> {
    let distro = resolver.distro();
    let resolve = |keys: &[&str]| resolver.resolve_all(&package.name, keys, platform.os, platform.codename);

    let build_depends = resolve(&package.build_depends())?;
    let depends = resolve(&package.run_depends())?;
    let conflicts = resolve(&as_refs(&package.conflicts))?;
    let replaces = resolve(&as_refs(&package.replaces))?;

    let mut licenses = Vec::with_capacity(package.licenses.len());
    for license in &package.licenses {
        let text = match license.file.as_deref() {
            Some(file) => show_file(repo, release_ref, file)?
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()),
            None => None,
        };
        if license.file.is_some() && text.is_none() {
            warn!(package = %package.name, license = %license.name, "license file not found");
        }
        licenses.push(LicenseText {
            name: license.name.clone(),
            text,
        });
    }

    let maintainer = package
        .maintainers
        .first()
        .map_or_else(|| "Unknown <unknown@localhost>".to_string(), ToString::to_string);

    Ok(DebianMetadata {
        name: debian_package_name(distro, &package.name),
        version: format!("{}-{inc}{}", package.version, platform.codename),
        distro: distro.to_string(),
        codename: platform.codename.to_string(),
        maintainer,
        description: package.description.clone(),
        homepage: package.homepage().map(ToString::to_string),
        build_depends,
        depends,
        conflicts,
        replaces,
        licenses,
        date: author_date_rfc2822(repo, release_ref)?,
    })
}

/// Generate the distribution branch of `package_name` for `platform` from
/// release `<version>-<inc>` and tag it.
///
/// # Errors
///
/// Returns `PipelineError::DependencyResolution` for an unresolvable
/// dependency, `GitError::BranchNotFound` if the release tag is missing, a
/// manifest error if the released manifest is unreadable, or any error of
/// the branch derivation.
pub fn generate_package(
    repo: &Path,
    package_name: &str,
    version: &str,
    inc: u32,
    platform: Platform<'_>,
    resolver: &ReleaseResolver<'_>,
) -> RelResult<DebianOutcome> {
    let distro = resolver.distro();
    let release_ref = format!("refs/tags/{}", release_tag(distro, package_name, version, inc));
    let source = tree_of(repo, &release_ref)?.ok_or_else(|| GitError::BranchNotFound {
        branch: release_ref.clone(),
    })?;

    let manifest = show_file(repo, &release_ref, MANIFEST_FILE)?.ok_or_else(|| {
        ManifestError::MissingField {
            path: format!("{release_ref}:{MANIFEST_FILE}"),
            field: "package",
        }
    })?;
    let package = Package::parse(
        &String::from_utf8_lossy(&manifest),
        &format!("{release_ref}:{MANIFEST_FILE}"),
    )?;
    let metadata = metadata_for(repo, &release_ref, &package, inc, platform, resolver)?;

    let branch = debian_branch(distro, platform.codename, package_name);
    let message = format!("Generate {} {}", metadata.name, metadata.version);
    let request = DeriveRequest {
        branch: &branch,
        source_tree: &source,
        message: &message,
        package: package_name,
        stage: "debian",
    };
    let state = derive_branch(repo, &request, |root| Ok(metadata.write_to(root)?))?;

    let tag_name = debian_tag(distro, package_name, version, inc, platform.codename);
    let tip_tree = tree_of(repo, state.tip())?;
    let tagged = match tree_of(repo, &format!("refs/tags/{tag_name}"))? {
        Some(existing) if Some(&existing) == tip_tree.as_ref() => {
            debug!(tag = %tag_name, "distribution tag up to date");
            false
        }
        Some(_) => {
            warn!(tag = %tag_name, "moving distribution tag to regenerated branch");
            tag(repo, &tag_name, &message, state.tip(), true)?;
            true
        }
        None => {
            tag(repo, &tag_name, &message, state.tip(), false)?;
            true
        }
    };
    if tagged {
        info!(package = package_name, tag = %tag_name, "tagged distribution release");
    }
    Ok(DebianOutcome {
        package: package_name.to_string(),
        codename: platform.codename.to_string(),
        branch,
        tag: tag_name,
        tagged,
        branch_state: state,
    })
}
