// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Patch command implementation.

use std::path::Path;

use anyhow::{Context, anyhow};

use crate::cli::patch::{PatchAction, PatchArgs};
use crate::error::Result;
use crate::git::query::current_branch;
use crate::patch::{self, ExportOutcome, ImportOutcome, RemoveOutcome};
use crate::pipeline::require_git;

/// Main handler for the patch command.
///
/// # Errors
///
/// Returns an error if no branch is given or checked out, or the patch
/// operation fails.
pub fn run_patch_command(args: &PatchArgs, repo: &Path) -> Result<()> {
    require_git()?;
    let branch = match &args.action.target().branch {
        Some(branch) => branch.clone(),
        None => current_branch(repo)?
            .ok_or_else(|| anyhow!("no branch is checked out; pass --branch"))?,
    };

    match &args.action {
        PatchAction::Export(_) => {
            match patch::export(repo, &branch).with_context(|| format!("failed to export patches of {branch}"))? {
                ExportOutcome::UpToDate => println!("{branch}: patches are up to date"),
                ExportOutcome::Exported(count) => println!("{branch}: exported {count} patch(es)"),
            }
        }
        PatchAction::Remove(_) => {
            match patch::remove(repo, &branch).with_context(|| format!("failed to remove patches of {branch}"))? {
                RemoveOutcome::AlreadyRemoved => println!("{branch}: already at its base"),
                RemoveOutcome::Removed => println!("{branch}: patches removed"),
            }
        }
        PatchAction::Import(_) => {
            match patch::import(repo, &branch).with_context(|| format!("failed to import patches of {branch}"))? {
                ImportOutcome::AlreadyApplied => println!("{branch}: patches already applied"),
                ImportOutcome::Applied(count) => println!("{branch}: applied {count} patch(es)"),
            }
        }
    }
    Ok(())
}
