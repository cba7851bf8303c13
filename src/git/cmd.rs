// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git command operations using shell backend.
//!
//! ```text
//! cmd.rs --> ShellBackend --> git (porcelain + plumbing)
//! ```

use crate::error::{GitError, RelResult};
use std::path::{Path, PathBuf};

use super::backend::{GitMutation, ShellBackend};

/// Clone a repository.
///
/// # Errors
///
/// Returns a `GitError` if the clone operation fails or the destination path is invalid.
pub fn clone(url: &str, dest: &Path, branch: Option<&str>, shallow: bool) -> RelResult<()> {
    ShellBackend::clone(url, dest, branch, shallow)
}

/// Fetch `refspec` from `source` into `FETCH_HEAD`.
///
/// # Errors
///
/// Returns a `GitError` if the fetch operation fails.
pub fn fetch_ref(repo_path: &Path, source: &str, refspec: &str) -> RelResult<()> {
    ShellBackend::fetch_ref(repo_path, source, refspec)
}

/// Checkout a branch, tag, or commit.
///
/// # Errors
///
/// Returns a `GitError` if the checkout operation fails.
pub fn checkout(repo_path: &Path, what: &str) -> RelResult<()> {
    ShellBackend::checkout(repo_path, what)
}

/// Switch to a new, history-less branch.
///
/// # Errors
///
/// Returns a `GitError` if the branch cannot be created.
pub fn checkout_orphan(repo_path: &Path, branch: &str) -> RelResult<()> {
    ShellBackend::checkout_orphan(repo_path, branch)
}

/// Initialize a new repository.
///
/// # Errors
///
/// Returns a `GitError` if repository initialization fails.
pub fn init_repo(path: &Path) -> RelResult<()> {
    ShellBackend::init_repo(path)
}

/// Make index and work tree match `treeish` exactly (tracked files only).
///
/// # Errors
///
/// Returns a `GitError` if the tree cannot be read.
pub fn read_tree_reset(repo_path: &Path, treeish: &str) -> RelResult<()> {
    ShellBackend::read_tree_reset(repo_path, treeish)
}

/// Stage all changes.
///
/// # Errors
///
/// Returns a `GitError` if staging fails.
pub fn add_all(repo_path: &Path) -> RelResult<()> {
    ShellBackend::add_all(repo_path)
}

/// Commit the index.
///
/// # Errors
///
/// Returns a `GitError` if the commit fails.
pub fn commit(repo_path: &Path, message: &str) -> RelResult<()> {
    ShellBackend::commit(repo_path, message)
}

/// Create an annotated tag, replacing an existing one when `force` is set.
///
/// # Errors
///
/// Returns a `GitError` if tagging fails.
pub fn tag(repo_path: &Path, name: &str, message: &str, target: &str, force: bool) -> RelResult<()> {
    ShellBackend::tag(repo_path, name, message, target, force)
}

/// Hard reset the checked out branch.
///
/// # Errors
///
/// Returns a `GitError` if the reset fails.
pub fn reset_hard(repo_path: &Path, rev: &str) -> RelResult<()> {
    ShellBackend::reset_hard(repo_path, rev)
}

/// Point `refs/heads/<branch>` at `commit`.
///
/// # Errors
///
/// Returns a `GitError` if the update fails.
pub fn set_branch(repo_path: &Path, branch: &str, commit: &str) -> RelResult<()> {
    ShellBackend::update_ref(repo_path, &format!("refs/heads/{branch}"), commit)
}

/// Set git config value.
///
/// # Errors
///
/// Returns a `GitError` if the config value cannot be set.
pub fn set_config(repo_path: &Path, key: &str, value: &str) -> RelResult<()> {
    ShellBackend::set_config(repo_path, key, value)
}

/// Store bytes as a blob and return its id.
///
/// # Errors
///
/// Returns a `GitError` if the object cannot be written.
pub fn hash_object(repo_path: &Path, content: &[u8]) -> RelResult<String> {
    ShellBackend::git_command_with_input(&["hash-object", "-w", "--stdin"], repo_path, content)
}

/// An entry of a flat tree built with [`mktree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub blob: String,
}

/// Build a flat tree of regular files and return its id.
///
/// # Errors
///
/// Returns a `GitError` if a name is not representable or `mktree` fails.
pub fn mktree(repo_path: &Path, entries: &[TreeEntry]) -> RelResult<String> {
    let mut sorted: Vec<&TreeEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut input = String::new();
    for entry in sorted {
        if entry.name.contains(['/', '\n', '\t']) {
            return Err(GitError::CommandFailed {
                command: "git mktree".to_string(),
                message: format!("invalid tree entry name '{}'", entry.name),
            }
            .into());
        }
        input.push_str(&format!("100644 blob {}\t{}\n", entry.blob, entry.name));
    }
    ShellBackend::git_command_with_input(&["mktree"], repo_path, input.as_bytes())
}

/// Create a commit object for `tree` without touching any branch.
///
/// # Errors
///
/// Returns a `GitError` if `commit-tree` fails.
pub fn commit_tree(
    repo_path: &Path,
    tree: &str,
    parent: Option<&str>,
    message: &str,
) -> RelResult<String> {
    let mut args = vec!["commit-tree", tree];
    if let Some(parent) = parent {
        args.extend(&["-p", parent]);
    }
    args.extend(&["-m", message]);
    ShellBackend::git_command(&args, repo_path)
}

/// Write one patch file per commit in `base..tip` into `out_dir`.
///
/// Output is reproducible for identical commits: commit ids are zeroed and
/// subjects are kept verbatim.
///
/// # Errors
///
/// Returns a `GitError` if `format-patch` fails or its output cannot be listed.
pub fn format_patch(repo_path: &Path, base: &str, tip: &str, out_dir: &Path) -> RelResult<Vec<PathBuf>> {
    let range = format!("{base}..{tip}");
    let out = out_dir.to_str().ok_or_else(|| GitError::CommandFailed {
        command: "git format-patch".to_string(),
        message: "invalid output directory".to_string(),
    })?;
    ShellBackend::git_command(
        &[
            "format-patch",
            "--quiet",
            "--keep-subject",
            "--binary",
            "--full-index",
            "--no-signature",
            "--zero-commit",
            "--no-stat",
            "-o",
            out,
            &range,
        ],
        repo_path,
    )?;

    let mut files = Vec::new();
    for entry in std::fs::read_dir(out_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "patch") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Apply mailbox patches on top of the checked out branch with 3-way fallback.
///
/// # Errors
///
/// Returns a `GitError` carrying git's message when a patch does not apply;
/// the caller is responsible for [`am_abort`].
pub fn am(repo_path: &Path, patches: &[PathBuf]) -> RelResult<()> {
    if patches.is_empty() {
        return Ok(());
    }
    let mut args: Vec<&str> = vec!["am", "--quiet", "--3way", "--keep"];
    for patch in patches {
        args.push(patch.to_str().ok_or_else(|| GitError::CommandFailed {
            command: "git am".to_string(),
            message: format!("invalid patch path {}", patch.display()),
        })?);
    }
    ShellBackend::git_command(&args, repo_path)?;
    Ok(())
}

/// Abandon an interrupted `git am`. A no-op when none is in progress.
pub fn am_abort(repo_path: &Path) {
    let _ = ShellBackend::git_command(&["am", "--abort"], repo_path);
}
