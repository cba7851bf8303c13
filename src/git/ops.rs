// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Higher level repository operations shared by the pipeline stages.
//!
//! ```text
//! ensure_clean    refuse to run on a dirty work tree
//! BranchGuard     restore the starting branch on scope exit
//! switch_or_orphan checkout a branch, creating it without history if absent
//! ```

use crate::error::{GitError, RelResult};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::cmd::{checkout, checkout_orphan};
use super::query::{branch_exists, current_branch, has_uncommitted_changes, resolve};

/// Fail with `UncommittedChanges` when the work tree has staged, unstaged or
/// untracked changes.
///
/// # Errors
///
/// Returns a `GitError` if the repository is dirty or its status cannot be read.
pub fn ensure_clean(repo_path: &Path) -> RelResult<()> {
    if has_uncommitted_changes(repo_path)? {
        return Err(GitError::UncommittedChanges {
            path: repo_path.display().to_string(),
        }
        .into());
    }
    Ok(())
}

/// Checkout `branch`, creating an orphan branch when it does not exist yet.
///
/// Returns `true` when the branch was newly created.
///
/// # Errors
///
/// Returns a `GitError` if the checkout fails.
pub fn switch_or_orphan(repo_path: &Path, branch: &str) -> RelResult<bool> {
    if branch_exists(repo_path, branch, true)? {
        checkout(repo_path, branch)?;
        return Ok(false);
    }
    debug!(branch, "creating orphan branch");
    checkout_orphan(repo_path, branch)?;
    Ok(true)
}

/// Remembers the branch (or detached commit) checked out at creation and
/// switches back to it when dropped.
#[derive(Debug)]
pub struct BranchGuard {
    repo: PathBuf,
    original: Option<String>,
}

impl BranchGuard {
    /// Capture the current checkout of `repo_path`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if HEAD cannot be read.
    pub fn new(repo_path: &Path) -> RelResult<Self> {
        let original = match current_branch(repo_path)? {
            Some(branch) => Some(branch),
            None => resolve(repo_path, "HEAD")?,
        };
        Ok(Self {
            repo: repo_path.to_path_buf(),
            original,
        })
    }

    /// Branch or commit that will be restored.
    #[must_use]
    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }
}

impl Drop for BranchGuard {
    fn drop(&mut self) {
        let Some(original) = self.original.as_deref() else {
            return;
        };
        if current_branch(&self.repo).ok().flatten().as_deref() == Some(original) {
            return;
        }
        if let Err(e) = checkout(&self.repo, original) {
            warn!(branch = original, error = %e, "failed to restore original branch");
        }
    }
}
