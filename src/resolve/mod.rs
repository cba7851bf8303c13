// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Dependency resolution: manifest dependency keys to system package names.
//!
//! ```text
//! ReleaseResolver
//!   key released in this run  --> ros-<distro>-<sanitized key>
//!   otherwise                 --> DependencyResolver (RuleTable)
//!                                   [rules.<key>]
//!                                   <os> = ["pkg", ...]                 all codenames
//!                                   <os> = { <codename> = ["pkg"] }     per codename
//! ```
//!
//! An empty package list is a valid resolution (the key needs nothing).

#[cfg(test)]
mod tests;

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::config::loader::ConfigLoader;
use crate::error::{ConfigError, PipelineError, RelResult};
use crate::pipeline::names::debian_package_name;

/// Maps a dependency key to system packages for one platform.
pub trait DependencyResolver {
    /// System packages for `key` on `os`/`codename`, `None` when unknown.
    fn resolve(&self, key: &str, os: &str, codename: &str) -> Option<Vec<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum OsRule {
    Packages(Vec<String>),
    ByCodename(BTreeMap<String, Vec<String>>),
}

/// Static rule table read from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleTable {
    rules: BTreeMap<String, BTreeMap<String, OsRule>>,
}

impl RuleTable {
    /// Parse a rule table from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for malformed content.
    pub fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        ConfigLoader::new()
            .add_named_toml_str(content, origin)
            .build_as()
            .map_err(|e| ConfigError::ParseError {
                path: origin.to_string(),
                message: format!("{e:#}"),
            })
    }

    /// Read a rule table file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file is unreadable, or a parse error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Number of keys in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl DependencyResolver for RuleTable {
    fn resolve(&self, key: &str, os: &str, codename: &str) -> Option<Vec<String>> {
        match self.rules.get(key)?.get(os)? {
            OsRule::Packages(packages) => Some(packages.clone()),
            OsRule::ByCodename(by_codename) => by_codename.get(codename).cloned(),
        }
    }
}

/// Resolver for one release run: packages released together resolve to
/// their own distribution names, everything else goes to `inner`.
pub struct ReleaseResolver<'a> {
    inner: &'a dyn DependencyResolver,
    distro: &'a str,
    released: BTreeSet<String>,
}

impl<'a> ReleaseResolver<'a> {
    #[must_use]
    pub fn new(
        inner: &'a dyn DependencyResolver,
        distro: &'a str,
        released: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            inner,
            distro,
            released: released.into_iter().collect(),
        }
    }

    /// Distribution the released packages belong to.
    #[must_use]
    pub fn distro(&self) -> &'a str {
        self.distro
    }

    /// Resolve every key of `package`'s dependency list, keeping order and
    /// dropping duplicates.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::DependencyResolution` for the first key with
    /// no mapping on `os`/`codename`.
    pub fn resolve_all(
        &self,
        package: &str,
        keys: &[&str],
        os: &str,
        codename: &str,
    ) -> RelResult<Vec<String>> {
        let mut resolved: Vec<String> = Vec::new();
        for key in keys {
            let names = if self.released.contains(*key) {
                vec![debian_package_name(self.distro, key)]
            } else {
                self.inner
                    .resolve(key, os, codename)
                    .ok_or_else(|| PipelineError::DependencyResolution {
                        package: package.to_string(),
                        dependency: (*key).to_string(),
                        os: os.to_string(),
                        codename: codename.to_string(),
                    })?
            };
            for name in names {
                if !resolved.contains(&name) {
                    resolved.push(name);
                }
            }
        }
        Ok(resolved)
    }
}
