// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Package discovery in a source tree.
//!
//! ```text
//! root/                      path ""      (a package at the root stops the walk)
//! root/foo/package.xml       path "foo"
//! root/stack/bar/package.xml path "stack/bar"
//! root/skip/CATKIN_IGNORE    skipped
//! ```

use std::path::Path;
use tracing::{debug, info};
use wax::{Glob, Program as _};

use super::{MANIFEST_FILE, Package};
use crate::error::{ConfigError, ManifestError, RelError, RelResult};
use crate::utility::fs::walk::{WalkOptions, find_marked_dirs};

/// A package together with its location in the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPackage {
    pub package: Package,
    /// `/`-separated path relative to the tree root, empty for the root.
    pub path: String,
}

/// Find every package below `root`, sorted by name.
///
/// Packages whose name matches one of `ignore_patterns` are left out.
///
/// # Errors
///
/// Returns an error if `root` cannot be walked, a manifest is invalid, an
/// ignore pattern is not a valid glob, or two packages share a name.
pub fn discover_packages(root: &Path, ignore_patterns: &[String]) -> RelResult<Vec<DiscoveredPackage>> {
    let ignores = ignore_patterns
        .iter()
        .map(|pattern| {
            Glob::new(pattern).map_err(|e| ConfigError::InvalidValue {
                section: "track".to_string(),
                key: "ignore_packages".to_string(),
                message: format!("invalid glob '{pattern}': {e}"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let dirs = find_marked_dirs(root, MANIFEST_FILE, &WalkOptions::for_packages())
        .map_err(|e| RelError::Other(format!("{e:#}").into_boxed_str()))?;

    let mut found: Vec<DiscoveredPackage> = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let package = Package::from_file(&dir.join(MANIFEST_FILE))?;
        let path = relative_path(root, &dir);

        if ignores.iter().any(|glob| glob.is_match(package.name.as_str())) {
            info!(package = %package.name, "ignoring package");
            continue;
        }
        debug!(package = %package.name, path = %path, version = %package.version, "found package");
        found.push(DiscoveredPackage { package, path });
    }

    found.sort_by(|a, b| a.package.name.cmp(&b.package.name));
    for pair in found.windows(2) {
        if pair[0].package.name == pair[1].package.name {
            return Err(ManifestError::DuplicateName {
                name: pair[0].package.name.clone(),
                first: pair[0].path.clone(),
                second: pair[1].path.clone(),
            }
            .into());
        }
    }
    Ok(found)
}

fn relative_path(root: &Path, dir: &Path) -> String {
    dir.strip_prefix(root)
        .unwrap_or(dir)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
