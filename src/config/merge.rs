// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Track configuration merging.
//!
//! ```text
//! TrackConfig + TrackConfigOverride --> field-by-field merge
//! ```
//!
//! Only explicitly set fields (`Some`) in override replace base values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{ReleaseTagSource, TrackConfig, VcsType, VersionSource};

/// Track configuration with optional fields for field-level merging.
///
/// All fields are optional to distinguish between "not set" (None) and
/// "explicitly set to value".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackConfigOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_type: Option<VcsType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devel_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ros_distro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_tag: Option<ReleaseTagSource>,
    /// Replaces (does not extend) the default ignore list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_packages: Option<Vec<String>>,
    /// Replaces the default platform table as a whole.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms: Option<BTreeMap<String, Vec<String>>>,
}

/// Merge track-specific config over the `[track]` defaults.
pub(super) fn merge_track_config(
    base: &TrackConfig,
    override_config: &TrackConfigOverride,
) -> TrackConfig {
    TrackConfig {
        vcs_type: override_config.vcs_type.unwrap_or(base.vcs_type),
        vcs_uri: override_config
            .vcs_uri
            .clone()
            .unwrap_or_else(|| base.vcs_uri.clone()),
        devel_branch: override_config
            .devel_branch
            .clone()
            .or_else(|| base.devel_branch.clone()),
        ros_distro: override_config
            .ros_distro
            .clone()
            .unwrap_or_else(|| base.ros_distro.clone()),
        version: override_config
            .version
            .clone()
            .unwrap_or_else(|| base.version.clone()),
        release_tag: override_config
            .release_tag
            .clone()
            .unwrap_or_else(|| base.release_tag.clone()),
        ignore_packages: override_config
            .ignore_packages
            .clone()
            .unwrap_or_else(|| base.ignore_packages.clone()),
        platforms: override_config
            .platforms
            .clone()
            .unwrap_or_else(|| base.platforms.clone()),
    }
}
