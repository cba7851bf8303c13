// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for rosrel.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. rosrel.toml (cwd, optional)
//! 3. --ini FILE...
//! 4. ROSREL_* env vars
//! 5. --set / CLI overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! ROSREL_GLOBAL__OUTPUT_LOG_LEVEL=4  → global.output_log_level = 4
//! ROSREL_RELEASE__CONFIG_BRANCH=cfg  → release.config_branch = "cfg"
//! ROSREL_RESOLVER__RULES=/etc/r.toml → resolver.rules = "/etc/r.toml"
//! ```
//!
//! # Track-Specific Overrides
//!
//! Tracks live in the release repository, not in the app config:
//!
//! ```toml
//! [track]
//! release_tag = ":{version}"
//!
//! [tracks.melodic]
//! release_tag = ":{none}" # override for melodic only
//! ```

pub mod loader;
pub mod merge;
pub mod tracks;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;

use loader::ConfigLoader;
pub use types::{GlobalConfig, ReleaseConfig, ResolverConfig};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Release repository layout.
    pub release: ReleaseConfig,
    /// Dependency resolution.
    pub resolver: ResolverConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rosrel::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("rosrel.toml")
    ///     .with_env_prefix("ROSREL")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file (simple API).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Validate values the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error if a release layout value is empty.
    pub fn resolve_and_validate(&mut self) -> Result<()> {
        if self.release.config_branch.trim().is_empty() {
            anyhow::bail!("release.config_branch must not be empty");
        }
        if self.release.tracks_file.trim().is_empty() {
            anyhow::bail!("release.tracks_file must not be empty");
        }
        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_release_options(&mut options);
        self.format_resolver_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
    }

    fn format_release_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "release.config_branch".into(),
            self.release.config_branch.clone(),
        );
        options.insert("release.tracks_file".into(), self.release.tracks_file.clone());
    }

    fn format_resolver_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "resolver.rules".into(),
            self.resolver
                .rules
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
    }
}
