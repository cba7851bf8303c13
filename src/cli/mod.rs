// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for rosrel using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! rosrel [global options] <command>
//! release <track> [--quiet]
//! import-upstream <track>
//! generate <track> [--stage release|debian]...
//! patch {export|remove|import} [--branch B]
//! options | inis
//! version
//! ```

pub mod global;
pub mod patch;
pub mod release;


use crate::cli::global::GlobalOptions;
use crate::cli::patch::PatchArgs;
use crate::cli::release::{GenerateArgs, TrackArgs};
use clap::{Parser, Subcommand};

/// ROS release pipeline.
///
/// Imports upstream sources into a release repository and derives release
/// and distribution branches from them.
#[derive(Debug, Parser)]
#[command(
    name = "rosrel",
    author,
    version,
    about = "ROS Release Pipeline",
    long_about = "rosrel Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Imports upstream sources into a release repository and derives\n\
                  release and distribution branches from them.\n\n\
                  Run `rosrel release <track>` inside the release repository to\n\
                  import, release and generate everything for a track. See\n\
                  `rosrel <command> --help` for more information about a command.",
    after_help = "CONFIGURATION:\n\n\
                  Settings are read from `rosrel.toml` in the current directory,\n\
                  then from every --ini file, then from ROSREL_* environment\n\
                  variables (e.g. ROSREL_RELEASE__CONFIG_BRANCH), then from --set.\n\
                  Tracks are read from `tracks.toml` on the release repository's\n\
                  config branch (default `master`)."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their values.
    Options,

    /// Lists the configuration files that were loaded.
    Inis,

    /// Imports upstream, then generates release and distribution branches.
    Release(TrackArgs),

    /// Imports the upstream version of a track.
    #[command(name = "import-upstream")]
    ImportUpstream(TrackArgs),

    /// Generates release and/or distribution branches from the last import.
    Generate(GenerateArgs),

    /// Manages the patch set of a derived branch.
    Patch(PatchArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
