// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for rosrel.
//!
//! # Config Structure
//!
//! ```text
//! Config:      GlobalConfig, ReleaseConfig, ResolverConfig
//! TrackConfig: vcs_type, vcs_uri, devel_branch, ros_distro,
//!              version, release_tag, ignore_packages, platforms
//! ```
//!
//! # Track Placeholders
//!
//! ```text
//! version     = ":{auto}"     read from package.xml    | literal
//! release_tag = ":{version}"  upstream tag == version  | ":{none}" devel tip | literal
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::logging::LogLevel;

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file; no file log when unset.
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
        }
    }
}

/// Where the release repository keeps its track configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseConfig {
    /// Branch holding the tracks file.
    pub config_branch: String,
    /// Tracks file name on `config_branch`.
    pub tracks_file: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            config_branch: "master".to_string(),
            tracks_file: "tracks.toml".to_string(),
        }
    }
}

/// Dependency resolution options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// TOML rule table mapping dependency keys to system packages.
    pub rules: Option<PathBuf>,
}

/// Version control system of an upstream repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsType {
    #[default]
    Git,
    Hg,
    Svn,
    Tar,
}

impl std::fmt::Display for VcsType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
            Self::Hg => write!(f, "hg"),
            Self::Svn => write!(f, "svn"),
            Self::Tar => write!(f, "tar"),
        }
    }
}

/// How the upstream version is determined.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VersionSource {
    /// Read from the package manifests (`:{auto}`).
    #[default]
    Auto,
    /// Use this version verbatim.
    Literal(String),
}

impl From<String> for VersionSource {
    fn from(value: String) -> Self {
        if value == ":{auto}" {
            Self::Auto
        } else {
            Self::Literal(value)
        }
    }
}

impl From<VersionSource> for String {
    fn from(value: VersionSource) -> Self {
        match value {
            VersionSource::Auto => ":{auto}".to_string(),
            VersionSource::Literal(version) => version,
        }
    }
}

/// Which upstream ref is imported once the version is known.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReleaseTagSource {
    /// The upstream tag named exactly like the version (`:{version}`).
    #[default]
    Version,
    /// The development branch tip (`:{none}`).
    None,
    /// A literal ref where `:{version}` is substituted.
    Template(String),
}

impl ReleaseTagSource {
    /// Ref to check out for `version`, `None` to stay on the development branch.
    #[must_use]
    pub fn resolve(&self, version: &str) -> Option<String> {
        match self {
            Self::Version => Some(version.to_string()),
            Self::None => None,
            Self::Template(template) => Some(template.replace(":{version}", version)),
        }
    }
}

impl From<String> for ReleaseTagSource {
    fn from(value: String) -> Self {
        match value.as_str() {
            ":{version}" => Self::Version,
            ":{none}" => Self::None,
            _ => Self::Template(value),
        }
    }
}

impl From<ReleaseTagSource> for String {
    fn from(value: ReleaseTagSource) -> Self {
        match value {
            ReleaseTagSource::Version => ":{version}".to_string(),
            ReleaseTagSource::None => ":{none}".to_string(),
            ReleaseTagSource::Template(template) => template,
        }
    }
}

/// Release track: where upstream lives and what to build from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackConfig {
    pub vcs_type: VcsType,
    /// Upstream repository URL or path.
    pub vcs_uri: String,
    /// Branch to read manifests from; the remote default branch when unset.
    pub devel_branch: Option<String>,
    /// ROS distribution (release series) name.
    pub ros_distro: String,
    pub version: VersionSource,
    pub release_tag: ReleaseTagSource,
    /// Glob patterns of package names that are never released.
    pub ignore_packages: Vec<String>,
    /// Target platforms: OS name to codenames.
    pub platforms: BTreeMap<String, Vec<String>>,
}

impl TrackConfig {
    /// Check that the fields every stage needs are present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingKey` naming the first empty required field.
    pub fn validate(&self, track: &str) -> Result<(), ConfigError> {
        let missing = |key: &str| ConfigError::MissingKey {
            section: format!("tracks.{track}"),
            key: key.to_string(),
        };
        if self.vcs_uri.trim().is_empty() {
            return Err(missing("vcs_uri"));
        }
        if self.ros_distro.trim().is_empty() {
            return Err(missing("ros_distro"));
        }
        if self.ros_distro.contains('/') {
            return Err(ConfigError::InvalidValue {
                section: format!("tracks.{track}"),
                key: "ros_distro".to_string(),
                message: format!("'{}' may not contain '/'", self.ros_distro),
            });
        }
        Ok(())
    }

    /// Iterate `(os, codename)` pairs in a stable order.
    pub fn targets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.platforms.iter().flat_map(|(os, codenames)| {
            codenames
                .iter()
                .map(move |codename| (os.as_str(), codename.as_str()))
        })
    }
}
