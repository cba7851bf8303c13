// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git query operations.
//!
//! ```text
//! query.rs --> GixBackend   --> .git/ (no subprocess)
//!          --> ShellBackend --> git rev-parse / tag / cat-file
//! ```
//!
//! Uses gix for ref and status lookups, the CLI for object plumbing.

use crate::error::RelResult;
use std::path::Path;

use super::backend::{GitQuery, GixBackend, ShellBackend};

#[must_use]
pub fn is_git_repo(path: &Path) -> bool {
    GixBackend::is_git_repo(path)
}

/// Get current branch name (None if HEAD is detached).
///
/// # Errors
///
/// Returns a `GitError` if repository discovery or head resolution fails.
pub fn current_branch(path: &Path) -> RelResult<Option<String>> {
    GixBackend::current_branch(path)
}

/// Check whether a branch exists, optionally also among remote-tracking refs.
///
/// # Errors
///
/// Returns a `GitError` if repository discovery or reference lookup fails.
pub fn branch_exists(path: &Path, branch: &str, local_only: bool) -> RelResult<bool> {
    if GixBackend::local_branch_exists(path, branch)? {
        return Ok(true);
    }
    if local_only {
        return Ok(false);
    }
    let pattern = format!("refs/remotes/*/{branch}");
    let refs = ShellBackend::git_command(&["for-each-ref", "--format=%(refname)", &pattern], path)?;
    Ok(!refs.is_empty())
}

/// Check for uncommitted changes (staged, unstaged, or untracked files).
///
/// # Errors
///
/// Returns a `GitError` if repository discovery or status check fails.
pub fn has_uncommitted_changes(path: &Path) -> RelResult<bool> {
    GixBackend::has_uncommitted_changes(path)
}

/// List every tag in the repository.
///
/// # Errors
///
/// Returns a `GitError` if `git tag` fails.
pub fn list_tags(path: &Path) -> RelResult<Vec<String>> {
    let output = ShellBackend::git_command(&["tag", "--list"], path)?;
    Ok(output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect())
}

/// Resolve any object expression to its id, `None` when it does not exist.
///
/// # Errors
///
/// Never fails for unknown revisions; only spawn failures are reported.
pub fn resolve(path: &Path, expression: &str) -> RelResult<Option<String>> {
    match ShellBackend::git_command(&["rev-parse", "--verify", "--quiet", expression], path) {
        Ok(id) if !id.is_empty() => Ok(Some(id)),
        Ok(_) => Ok(None),
        Err(crate::error::RelError::Git(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Commit id a revision points at (peeling tags).
///
/// # Errors
///
/// Only spawn failures are reported.
pub fn commit_of(path: &Path, rev: &str) -> RelResult<Option<String>> {
    resolve(path, &format!("{rev}^{{commit}}"))
}

/// Root tree id of a revision.
///
/// # Errors
///
/// Only spawn failures are reported.
pub fn tree_of(path: &Path, rev: &str) -> RelResult<Option<String>> {
    resolve(path, &format!("{rev}^{{tree}}"))
}

/// Tree id of a subdirectory of a revision (the root tree when `subdir` is empty).
///
/// # Errors
///
/// Only spawn failures are reported.
pub fn subtree_of(path: &Path, rev: &str, subdir: &str) -> RelResult<Option<String>> {
    let subdir = subdir.trim_matches('/');
    if subdir.is_empty() {
        tree_of(path, rev)
    } else {
        resolve(path, &format!("{rev}:{subdir}"))
    }
}

/// Read a file's bytes from a revision, `None` if absent.
///
/// # Errors
///
/// Only spawn failures are reported.
pub fn show_file(path: &Path, rev: &str, file: &str) -> RelResult<Option<Vec<u8>>> {
    let spec = format!("{rev}:{file}");
    if resolve(path, &spec)?.is_none() {
        return Ok(None);
    }
    ShellBackend::git_command_bytes(&["cat-file", "blob", &spec], path).map(Some)
}

/// Names of the top-level entries of a revision.
///
/// # Errors
///
/// Returns a `GitError` if the revision cannot be listed.
pub fn ls_tree_names(path: &Path, rev: &str) -> RelResult<Vec<String>> {
    let output = ShellBackend::git_command(&["ls-tree", "--name-only", rev], path)?;
    Ok(output.lines().map(ToString::to_string).collect())
}

/// RFC 2822 author date of a commit.
///
/// # Errors
///
/// Returns a `GitError` if the revision does not exist.
pub fn author_date_rfc2822(path: &Path, rev: &str) -> RelResult<String> {
    ShellBackend::git_command(&["log", "-1", "--format=%aD", rev], path)
}

/// Whether `ancestor` is reachable from `descendant` (a commit is its own ancestor).
///
/// # Errors
///
/// Only spawn failures are reported.
pub fn is_ancestor(path: &Path, ancestor: &str, descendant: &str) -> RelResult<bool> {
    match ShellBackend::git_command(&["merge-base", "--is-ancestor", ancestor, descendant], path) {
        Ok(_) => Ok(true),
        Err(crate::error::RelError::Git(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Tree id of the current index.
///
/// # Errors
///
/// Returns a `GitError` if the index cannot be written as a tree.
pub fn index_tree(path: &Path) -> RelResult<String> {
    ShellBackend::git_command(&["write-tree"], path)
}
