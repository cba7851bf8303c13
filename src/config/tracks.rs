// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Release track definitions stored in the release repository.
//!
//! ```toml
//! [track]
//! vcs_type = "git"
//! release_tag = ":{version}"
//!
//! [tracks.melodic]
//! vcs_uri = "https://github.com/ros/foo.git"
//! devel_branch = "melodic_devel"
//! ros_distro = "melodic"
//! platforms = { ubuntu = ["bionic"], debian = ["stretch"] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::ReleaseConfig;
use super::loader::ConfigLoader;
use super::merge::{TrackConfigOverride, merge_track_config};
use super::types::TrackConfig;
use crate::error::{ConfigError, RelResult};
use crate::git::query::show_file;

/// Parsed tracks file: shared defaults plus per-track overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TracksFile {
    /// Defaults for every track.
    pub track: TrackConfig,
    /// Per-track configuration overrides (field-level merging).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tracks: BTreeMap<String, TrackConfigOverride>,
    /// Where this file was read from, for error messages.
    #[serde(skip)]
    origin: String,
}

impl TracksFile {
    /// Parse a tracks file from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` if the content is not valid TOML or
    /// does not match the tracks layout.
    pub fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let mut file: Self = ConfigLoader::new()
            .add_named_toml_str(content, origin)
            .build_as()
            .map_err(|e| ConfigError::ParseError {
                path: origin.to_string(),
                message: format!("{e:#}"),
            })?;
        file.origin = origin.to_string();
        Ok(file)
    }

    /// Read the tracks file from the configuration branch of `repo_path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the branch does not carry the file,
    /// or a parse error for malformed content.
    pub fn load_from_branch(repo_path: &Path, release: &ReleaseConfig) -> RelResult<Self> {
        let origin = format!("{}:{}", release.config_branch, release.tracks_file);
        let bytes = show_file(repo_path, &release.config_branch, &release.tracks_file)?
            .ok_or_else(|| ConfigError::ReadError {
                path: origin.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such file on the configuration branch",
                ),
            })?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(Self::parse(&content, &origin)?)
    }

    /// Names of every configured track.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    /// Effective, validated configuration of `name`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::TrackNotFound` for an unknown track or
    /// `ConfigError::MissingKey` when a required field is empty after merging.
    pub fn track(&self, name: &str) -> Result<TrackConfig, ConfigError> {
        let override_config = self
            .tracks
            .get(name)
            .ok_or_else(|| ConfigError::TrackNotFound {
                track: name.to_string(),
                file: self.origin.clone(),
            })?;
        let merged = merge_track_config(&self.track, override_config);
        merged.validate(name)?;
        Ok(merged)
    }
}
