// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments of the pipeline commands.
//!
//! ```text
//! release <track> [-q]                      import + release + debian
//! import-upstream <track> [-q]              import
//! generate <track> [-q] [--stage S]...      release and/or debian (default both)
//! ```

use clap::{Args, ValueEnum};

use crate::pipeline::Stages;

/// Track selection shared by the pipeline commands.
#[derive(Debug, Clone, Args)]
pub struct TrackArgs {
    /// Track name from the tracks file.
    #[arg(value_name = "TRACK")]
    pub track: String,

    /// Only print warnings and errors, without progress.
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Stage selectable for `generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StageArg {
    /// Release branches from the imported upstream version.
    Release,
    /// Distribution branches from the release tags.
    Debian,
}

/// Arguments for the `generate` command.
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub target: TrackArgs,

    /// Stage to run; can be repeated. Runs every stage when omitted.
    #[arg(long = "stage", value_name = "STAGE", value_enum, action = clap::ArgAction::Append)]
    pub stages: Vec<StageArg>,
}

impl GenerateArgs {
    /// Selected stages; never includes the upstream import.
    #[must_use]
    pub fn stages(&self) -> Stages {
        if self.stages.is_empty() {
            return Stages::RELEASE | Stages::DEBIAN;
        }
        self.stages
            .iter()
            .fold(Stages::empty(), |stages, stage| match stage {
                StageArg::Release => stages | Stages::RELEASE,
                StageArg::Debian => stages | Stages::DEBIAN,
            })
    }
}
