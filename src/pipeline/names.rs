// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Branch and tag naming grammar.
//!
//! ```text
//! upstream                                   upstream/<version>
//! release/<distro>/<pkg>                     release/<distro>/<pkg>/<version>-<inc>
//! debian/<distro>/<codename>/<pkg>           debian/ros-<distro>-<san>_<version>-<inc>_<codename>
//! patches/<any derived branch>
//! ```
//!
//! `<san>` is [`sanitize_package_name`]: lowercase, `_` replaced by `-`.

use regex::Regex;
use std::sync::OnceLock;

/// Branch receiving upstream imports.
pub const UPSTREAM_BRANCH: &str = "upstream";

/// Debian-safe form of a package name. Pure and stable: lowercase ASCII,
/// underscores become hyphens, nothing else changes.
#[must_use]
pub fn sanitize_package_name(name: &str) -> String {
    name.to_ascii_lowercase().replace('_', "-")
}

/// Binary package name of a ROS package in a distribution.
#[must_use]
pub fn debian_package_name(distro: &str, package: &str) -> String {
    format!("ros-{distro}-{}", sanitize_package_name(package))
}

#[must_use]
pub fn upstream_tag(version: &str) -> String {
    format!("upstream/{version}")
}

#[must_use]
pub fn release_branch(distro: &str, package: &str) -> String {
    format!("release/{distro}/{package}")
}

#[must_use]
pub fn release_tag(distro: &str, package: &str, version: &str, inc: u32) -> String {
    format!("release/{distro}/{package}/{version}-{inc}")
}

#[must_use]
pub fn debian_branch(distro: &str, codename: &str, package: &str) -> String {
    format!("debian/{distro}/{codename}/{package}")
}

#[must_use]
pub fn debian_tag(distro: &str, package: &str, version: &str, inc: u32, codename: &str) -> String {
    format!(
        "debian/{}_{version}-{inc}_{codename}",
        debian_package_name(distro, package)
    )
}

/// Patch tracking branch of a derived branch.
#[must_use]
pub fn patches_branch(branch: &str) -> String {
    format!("patches/{branch}")
}

/// Pre-validated `upstream/<X.Y.Z>` pattern.
fn upstream_tag_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^upstream/(\d+\.\d+\.\d+)$").ok())
        .as_ref()
}

/// Versions of well-formed `upstream/<X.Y.Z>` tags; anything else under
/// `upstream/` (e.g. `upstream/0.0.0@baz`) is ignored.
#[must_use]
pub fn upstream_versions(tags: &[String]) -> Vec<String> {
    let Some(re) = upstream_tag_regex() else {
        return Vec::new();
    };
    tags.iter()
        .filter_map(|tag| re.captures(tag))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Release numbers already tagged for `package` at `version`.
#[must_use]
pub fn release_incs(tags: &[String], distro: &str, package: &str, version: &str) -> Vec<u32> {
    let prefix = format!("release/{distro}/{package}/{version}-");
    let mut incs: Vec<u32> = tags
        .iter()
        .filter_map(|tag| tag.strip_prefix(&prefix))
        .filter(|inc| !inc.is_empty() && inc.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|inc| inc.parse().ok())
        .collect();
    incs.sort_unstable();
    incs
}

fn version_key(version: &str) -> Option<(u64, u64, u64)> {
    let mut parts = version.split('.').map(str::parse::<u64>);
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(Ok(major)), Some(Ok(minor)), Some(Ok(patch)), None) => Some((major, minor, patch)),
        _ => None,
    }
}

/// Highest imported upstream version, compared numerically.
#[must_use]
pub fn latest_upstream_version(tags: &[String]) -> Option<String> {
    upstream_versions(tags)
        .into_iter()
        .filter_map(|version| version_key(&version).map(|key| (key, version)))
        .max_by_key(|(key, _)| *key)
        .map(|(_, version)| version)
}
