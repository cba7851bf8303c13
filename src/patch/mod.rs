// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Patch Store: per-branch patch sets kept on `patches/<branch>`.
//!
//! ```text
//! <branch>            base --- c1 --- c2          (tip)
//! patches/<branch>    patches.json                {parent, base, exported_tip}
//!                     0001-<subject>.patch        c1
//!                     0002-<subject>.patch        c2
//!
//! export   format-patch base..tip   -> new commit on patches/<branch>
//!          (tip == base keeps the stored set)
//! remove   tip -> base              (refused if tip != exported_tip)
//! import   am stored patches onto tip
//! ```
//!
//! Patch branches are written with plumbing only and never checked out.
//! Every operation takes the tracked branch explicitly; the checked out
//! branch matters only when it has to be moved.


use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{GitError, PatchError, RelResult};
use crate::git::cmd::{TreeEntry, am, am_abort, checkout, commit_tree, format_patch, hash_object, mktree, reset_hard, set_branch};
use crate::git::ops::{BranchGuard, ensure_clean};
use crate::git::query::{commit_of, current_branch, is_ancestor, ls_tree_names, show_file, tree_of};
use crate::pipeline::names::patches_branch;

/// Metadata file on a patch branch.
pub const METADATA_FILE: &str = "patches.json";

/// Bookkeeping stored next to the patch files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchMeta {
    /// Branch the patches belong to.
    pub parent: String,
    /// Commit the patches apply to.
    pub base: String,
    /// Branch tip at the last export or import.
    pub exported_tip: String,
}

/// A loaded patch set.
#[derive(Debug, Clone)]
pub struct PatchSet {
    pub meta: PatchMeta,
    /// `(file name, mailbox content)` in application order.
    pub patches: Vec<(String, Vec<u8>)>,
    /// Current commit of the patch branch.
    pub commit: String,
}

impl PatchSet {
    /// Names of the stored patch files.
    #[must_use]
    pub fn patch_names(&self) -> Vec<&str> {
        self.patches.iter().map(|(name, _)| name.as_str()).collect()
    }
}

/// Result of [`export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Tip unchanged since the last export.
    UpToDate,
    /// Patch set rewritten with this many patches.
    Exported(usize),
}

/// Result of [`remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Branch already at its base.
    AlreadyRemoved,
    /// Branch moved back to its base.
    Removed,
}

/// Result of [`import`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Patches already present on the tip.
    AlreadyApplied,
    /// This many patches were applied.
    Applied(usize),
}

fn metadata_error(branch: &str, message: impl Into<String>) -> PatchError {
    PatchError::Metadata {
        patches_branch: patches_branch(branch),
        message: message.into(),
    }
}

fn no_base(branch: &str) -> PatchError {
    PatchError::NoBaseRecorded {
        branch: branch.to_string(),
        patches_branch: patches_branch(branch),
    }
}

fn branch_tip(repo: &Path, branch: &str) -> RelResult<String> {
    commit_of(repo, &format!("refs/heads/{branch}"))?.ok_or_else(|| {
        GitError::BranchNotFound {
            branch: branch.to_string(),
        }
        .into()
    })
}

/// Load the patch set of `branch`, `None` when no patch branch exists.
///
/// # Errors
///
/// Returns `PatchError::Metadata` if the patch branch has no readable
/// `patches.json`.
pub fn load(repo: &Path, branch: &str) -> RelResult<Option<PatchSet>> {
    let store = patches_branch(branch);
    let Some(commit) = commit_of(repo, &format!("refs/heads/{store}"))? else {
        return Ok(None);
    };

    let raw = show_file(repo, &commit, METADATA_FILE)?
        .ok_or_else(|| metadata_error(branch, format!("{METADATA_FILE} is missing")))?;
    let meta: PatchMeta =
        serde_json::from_slice(&raw).map_err(|e| metadata_error(branch, e.to_string()))?;

    let mut patches = Vec::new();
    for name in ls_tree_names(repo, &commit)? {
        if !name.ends_with(".patch") {
            continue;
        }
        let content = show_file(repo, &commit, &name)?.unwrap_or_default();
        patches.push((name, content));
    }
    patches.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(Some(PatchSet {
        meta,
        patches,
        commit,
    }))
}

/// Write a patch set as a new commit on `patches/<branch>`.
///
/// Nothing is written when the resulting tree equals the current one.
fn store(
    repo: &Path,
    meta: &PatchMeta,
    patches: &[(String, Vec<u8>)],
    previous: Option<&str>,
    message: &str,
) -> RelResult<String> {
    let mut json = serde_json::to_vec_pretty(meta)
        .map_err(|e| metadata_error(&meta.parent, e.to_string()))?;
    json.push(b'\n');

    let mut entries = vec![TreeEntry {
        name: METADATA_FILE.to_string(),
        blob: hash_object(repo, &json)?,
    }];
    for (name, content) in patches {
        entries.push(TreeEntry {
            name: name.clone(),
            blob: hash_object(repo, content)?,
        });
    }
    let tree = mktree(repo, &entries)?;

    if let Some(previous) = previous
        && tree_of(repo, previous)?.as_deref() == Some(tree.as_str())
    {
        return Ok(previous.to_string());
    }

    let commit = commit_tree(repo, &tree, previous, message)?;
    set_branch(repo, &patches_branch(&meta.parent), &commit)?;
    Ok(commit)
}

/// Record `base` as the starting point of `branch` with an empty patch set.
///
/// # Errors
///
/// Returns a `GitError` if the patch branch cannot be written.
pub fn init(repo: &Path, branch: &str, base: &str) -> RelResult<()> {
    let meta = PatchMeta {
        parent: branch.to_string(),
        base: base.to_string(),
        exported_tip: base.to_string(),
    };
    let previous = commit_of(repo, &format!("refs/heads/{}", patches_branch(branch)))?;
    store(repo, &meta, &[], previous.as_deref(), &format!("Start patches for {branch}"))?;
    debug!(branch, base, "patch base recorded");
    Ok(())
}

/// Move the recorded base of `branch` to `base`, keeping its patches.
///
/// Used after the branch was rebuilt on new content: the stored patches are
/// then re-applied with [`import`]. Returns the previous patch branch commit
/// so a failed import can be rolled back with [`restore`].
///
/// # Errors
///
/// Returns `PatchError::NoBaseRecorded` if `branch` has no patch set.
pub fn rebase(repo: &Path, branch: &str, base: &str) -> RelResult<String> {
    let set = load(repo, branch)?.ok_or_else(|| no_base(branch))?;
    let meta = PatchMeta {
        parent: branch.to_string(),
        base: base.to_string(),
        exported_tip: base.to_string(),
    };
    store(
        repo,
        &meta,
        &set.patches,
        Some(&set.commit),
        &format!("Rebase patches for {branch}"),
    )?;
    Ok(set.commit)
}

/// Point `patches/<branch>` back at `commit`.
///
/// # Errors
///
/// Returns a `GitError` if the ref cannot be updated.
pub fn restore(repo: &Path, branch: &str, commit: &str) -> RelResult<()> {
    set_branch(repo, &patches_branch(branch), commit)
}

/// Store the commits between the recorded base and the tip of `branch`.
///
/// A branch sitting at its base with a non-empty patch set is the state left
/// by [`remove`]; the stored patches are kept rather than emptied.
///
/// # Errors
///
/// Returns `PatchError::NoBaseRecorded` without a patch set, and
/// `PatchError::Metadata` if the base is not an ancestor of the tip.
pub fn export(repo: &Path, branch: &str) -> RelResult<ExportOutcome> {
    let set = load(repo, branch)?.ok_or_else(|| no_base(branch))?;
    let tip = branch_tip(repo, branch)?;

    if tip == set.meta.exported_tip {
        debug!(branch, "patches up to date");
        return Ok(ExportOutcome::UpToDate);
    }
    if tip == set.meta.base && !set.patches.is_empty() {
        debug!(branch, "branch at its base after remove, keeping stored patches");
        return Ok(ExportOutcome::UpToDate);
    }
    if !is_ancestor(repo, &set.meta.base, &tip)? {
        return Err(metadata_error(
            branch,
            format!("base {} is not an ancestor of {branch}", set.meta.base),
        )
        .into());
    }

    let dir = tempfile::tempdir()?;
    let files = format_patch(repo, &set.meta.base, &tip, dir.path())?;
    let mut patches = Vec::with_capacity(files.len());
    for file in &files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        patches.push((name, std::fs::read(file)?));
    }

    let meta = PatchMeta {
        exported_tip: tip,
        ..set.meta
    };
    store(
        repo,
        &meta,
        &patches,
        Some(&set.commit),
        &format!("Export patches for {branch}"),
    )?;
    info!(branch, count = patches.len(), "exported patches");
    Ok(ExportOutcome::Exported(patches.len()))
}

/// Reset `branch` to its recorded base.
///
/// # Errors
///
/// Returns `PatchError::UnexportedChanges` if the tip has commits that were
/// never exported, `PatchError::NoBaseRecorded` without a patch set, and a
/// `GitError` if the checked out work tree is dirty.
pub fn remove(repo: &Path, branch: &str) -> RelResult<RemoveOutcome> {
    let set = load(repo, branch)?.ok_or_else(|| no_base(branch))?;
    let tip = branch_tip(repo, branch)?;

    if tip == set.meta.base {
        debug!(branch, "patches already removed");
        return Ok(RemoveOutcome::AlreadyRemoved);
    }
    if tip != set.meta.exported_tip {
        return Err(PatchError::UnexportedChanges {
            branch: branch.to_string(),
            exported: set.meta.exported_tip,
        }
        .into());
    }

    if current_branch(repo)?.as_deref() == Some(branch) {
        ensure_clean(repo)?;
        reset_hard(repo, &set.meta.base)?;
    } else {
        set_branch(repo, branch, &set.meta.base)?;
    }
    info!(branch, base = %set.meta.base, "removed patches");
    Ok(RemoveOutcome::Removed)
}

/// Apply the stored patches on top of the current tip of `branch`.
///
/// On failure the branch is returned to its previous tip.
///
/// # Errors
///
/// Returns `PatchError::Conflict` when a patch does not apply,
/// `PatchError::NoBaseRecorded` without a patch set, and a `GitError` if the
/// work tree is dirty.
pub fn import(repo: &Path, branch: &str) -> RelResult<ImportOutcome> {
    let set = load(repo, branch)?.ok_or_else(|| no_base(branch))?;
    let tip = branch_tip(repo, branch)?;

    if set.patches.is_empty() || (tip == set.meta.exported_tip && tip != set.meta.base) {
        debug!(branch, "nothing to import");
        if tip != set.meta.exported_tip {
            let meta = PatchMeta {
                exported_tip: tip,
                ..set.meta
            };
            store(repo, &meta, &set.patches, Some(&set.commit), &format!("Track {branch}"))?;
        }
        return Ok(ImportOutcome::AlreadyApplied);
    }

    ensure_clean(repo)?;
    let dir = tempfile::tempdir()?;
    let mut files: Vec<PathBuf> = Vec::with_capacity(set.patches.len());
    for (name, content) in &set.patches {
        let path = dir.path().join(name);
        std::fs::write(&path, content)?;
        files.push(path);
    }

    let _guard = BranchGuard::new(repo)?;
    checkout(repo, branch)?;
    if let Err(e) = am(repo, &files) {
        am_abort(repo);
        reset_hard(repo, &tip)?;
        return Err(PatchError::Conflict {
            branch: branch.to_string(),
            patches_branch: patches_branch(branch),
            message: e.to_string(),
        }
        .into());
    }

    let new_tip = branch_tip(repo, branch)?;
    let count = set.patches.len();
    let meta = PatchMeta {
        exported_tip: new_tip,
        ..set.meta
    };
    store(
        repo,
        &meta,
        &set.patches,
        Some(&set.commit),
        &format!("Import patches for {branch}"),
    )?;
    info!(branch, count, "imported patches");
    Ok(ImportOutcome::Applied(count))
}
