// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Patch command arguments.

use clap::{Args, Subcommand};

/// Arguments for the `patch` command.
#[derive(Debug, Clone, Args)]
pub struct PatchArgs {
    /// Patch operation.
    #[command(subcommand)]
    pub action: PatchAction,
}

/// Patch operations.
#[derive(Debug, Clone, Subcommand)]
pub enum PatchAction {
    /// Stores the commits on top of the recorded base as patches.
    Export(PatchTarget),

    /// Resets the branch to its recorded base.
    Remove(PatchTarget),

    /// Applies the stored patches onto the branch.
    Import(PatchTarget),
}

impl PatchAction {
    #[must_use]
    pub const fn target(&self) -> &PatchTarget {
        match self {
            Self::Export(target) | Self::Remove(target) | Self::Import(target) => target,
        }
    }
}

/// Branch a patch operation works on.
#[derive(Debug, Clone, Default, Args)]
pub struct PatchTarget {
    /// Derived branch; defaults to the checked out branch.
    #[arg(short = 'b', long = "branch", value_name = "BRANCH")]
    pub branch: Option<String>,
}
