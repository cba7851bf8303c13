// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Derived branches: a source tree plus an overlay, with the branch's patch
//! set replayed on top.
//!
//! ```text
//! new branch        base = commit(source + overlay)         patches: init(base)
//!                   branch -> base
//! existing branch   export unexported user commits (tip == base after
//!                   remove keeps the stored set)
//!                   source + overlay == tree(base)  ->  unchanged
//!                   otherwise  base' = commit(source + overlay, parent base)
//!                              rebase patches to base', import
//!                              conflict -> branch and patch set restored
//! ```

use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{PatchError, PipelineError, RelError, RelResult};
use crate::git::cmd::{add_all, checkout, commit_tree, read_tree_reset, reset_hard};
use crate::git::ops::{BranchGuard, switch_or_orphan};
use crate::git::query::{commit_of, index_tree, tree_of};
use crate::patch;

/// What to derive and where.
#[derive(Debug, Clone, Copy)]
pub struct DeriveRequest<'a> {
    /// Branch to create or update.
    pub branch: &'a str,
    /// Tree id of the content the branch tracks.
    pub source_tree: &'a str,
    /// Commit message for new base commits.
    pub message: &'a str,
    pub package: &'a str,
    pub stage: &'static str,
}

/// Branch state after [`derive_branch`], carrying the new tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeriveOutcome {
    Created(String),
    Updated(String),
    Unchanged(String),
}

impl DeriveOutcome {
    #[must_use]
    pub fn tip(&self) -> &str {
        match self {
            Self::Created(tip) | Self::Updated(tip) | Self::Unchanged(tip) => tip,
        }
    }
}

fn head(repo: &Path, branch: &str) -> RelResult<String> {
    commit_of(repo, &format!("refs/heads/{branch}"))?.ok_or_else(|| {
        crate::error::GitError::BranchNotFound {
            branch: branch.to_string(),
        }
        .into()
    })
}

/// Create or update `request.branch` from `request.source_tree`.
///
/// `overlay` runs on the work tree after the source has been checked out
/// and before the result is committed.
///
/// # Errors
///
/// Returns `PipelineError::NoBaseRecorded` for an existing branch without a
/// patch set, `PipelineError::ReleaseMergeConflict` when the patch set no
/// longer applies (branch and patch set are left as they were), or any
/// error of the overlay.
pub fn derive_branch<F>(repo: &Path, request: &DeriveRequest<'_>, overlay: F) -> RelResult<DeriveOutcome>
where
    F: FnOnce(&Path) -> RelResult<()>,
{
    let _guard = BranchGuard::new(repo)?;
    let branch = request.branch;

    if commit_of(repo, &format!("refs/heads/{branch}"))?.is_none() {
        switch_or_orphan(repo, branch)?;
        read_tree_reset(repo, request.source_tree)?;
        overlay(repo)?;
        add_all(repo)?;
        let tree = index_tree(repo)?;
        let base = commit_tree(repo, &tree, None, request.message)?;
        // The branch ref only appears once its patch set exists.
        patch::init(repo, branch, &base)?;
        reset_hard(repo, &base)?;
        info!(branch, package = request.package, "created branch");
        return Ok(DeriveOutcome::Created(base));
    }

    let set = patch::load(repo, branch)?.ok_or_else(|| PipelineError::NoBaseRecorded {
        package: request.package.to_string(),
        branch: branch.to_string(),
    })?;
    let tip = head(repo, branch)?;
    if tip == set.meta.base && tip != set.meta.exported_tip {
        debug!(branch, "patches removed, stored set kept for re-import");
    } else if tip != set.meta.exported_tip {
        info!(branch, "exporting commits made since the last run");
        patch::export(repo, branch)?;
    }
    let base = set.meta.base;

    checkout(repo, branch)?;
    read_tree_reset(repo, request.source_tree)?;
    overlay(repo)?;
    add_all(repo)?;
    let tree = index_tree(repo)?;

    if tree_of(repo, &base)?.as_deref() == Some(tree.as_str()) {
        reset_hard(repo, &tip)?;
        debug!(branch, "source unchanged");
        return Ok(DeriveOutcome::Unchanged(tip));
    }

    let new_base = commit_tree(repo, &tree, Some(&base), request.message)?;
    reset_hard(repo, &new_base)?;
    let previous_patches = patch::rebase(repo, branch, &new_base)?;

    match patch::import(repo, branch) {
        Ok(_) => {
            let new_tip = head(repo, branch)?;
            info!(branch, package = request.package, "updated branch");
            Ok(DeriveOutcome::Updated(new_tip))
        }
        Err(RelError::Patch(e)) if matches!(*e, PatchError::Conflict { .. }) => {
            warn!(branch, "patches no longer apply, restoring branch");
            reset_hard(repo, &tip)?;
            patch::restore(repo, branch, &previous_patches)?;
            Err(PipelineError::ReleaseMergeConflict {
                package: request.package.to_string(),
                stage: request.stage,
                branch: branch.to_string(),
                reason: e.to_string(),
            }
            .into())
        }
        Err(e) => {
            reset_hard(repo, &tip)?;
            patch::restore(repo, branch, &previous_patches)?;
            Err(e)
        }
    }
}
