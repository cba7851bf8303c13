// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git backend abstraction layer.
//!
//! ```text
//! GitQuery (read)     --> GixBackend (pure Rust gix)
//!                     --> ShellBackend (git CLI)
//! GitMutation (write) --> ShellBackend (git CLI)
//! ```

use crate::error::{GitError, GixError, RelResult};
use std::io::Write as _;
use std::path::Path;
use std::process::{Command, Output, Stdio};

// --- Query Trait (Read-only operations) ---

/// Read-only git query operations.
///
/// Implementors provide methods to inspect repository state without modification.
pub trait GitQuery {
    /// Check if path is inside a git work tree.
    fn is_git_repo(path: &Path) -> bool;

    /// Get current branch name (None if HEAD is detached).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or head resolution fails.
    fn current_branch(path: &Path) -> RelResult<Option<String>>;

    /// Check if a local branch exists.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or reference lookup fails.
    fn local_branch_exists(path: &Path, branch: &str) -> RelResult<bool>;

    /// Check for uncommitted changes (staged, unstaged, or untracked files).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or status check fails.
    fn has_uncommitted_changes(path: &Path) -> RelResult<bool>;
}

// --- Mutation Trait (Write operations) ---

/// Git mutation operations that modify repository state.
pub trait GitMutation {
    /// Clone a repository.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the clone operation fails or the destination path is invalid.
    fn clone(url: &str, dest: &Path, branch: Option<&str>, shallow: bool) -> RelResult<()>;

    /// Fetch a single ref from another repository into `FETCH_HEAD`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the fetch operation fails.
    fn fetch_ref(repo_path: &Path, source: &str, refspec: &str) -> RelResult<()>;

    /// Checkout a branch, tag, or commit.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the checkout operation fails.
    fn checkout(repo_path: &Path, what: &str) -> RelResult<()>;

    /// Switch to a new branch with no history.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the branch cannot be created.
    fn checkout_orphan(repo_path: &Path, branch: &str) -> RelResult<()>;

    /// Initialize a new repository.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository initialization fails.
    fn init_repo(path: &Path) -> RelResult<()>;

    /// Replace index and work tree with the given tree-ish.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the tree cannot be read.
    fn read_tree_reset(repo_path: &Path, treeish: &str) -> RelResult<()>;

    /// Stage every change in the work tree, including deletions.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if staging fails.
    fn add_all(repo_path: &Path) -> RelResult<()>;

    /// Commit the index.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the commit fails.
    fn commit(repo_path: &Path, message: &str) -> RelResult<()>;

    /// Create (or with `force`, move) an annotated tag.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if tagging fails.
    fn tag(repo_path: &Path, name: &str, message: &str, target: &str, force: bool)
    -> RelResult<()>;

    /// Hard reset the checked out branch.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the reset fails.
    fn reset_hard(repo_path: &Path, rev: &str) -> RelResult<()>;

    /// Point a ref at a commit.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the update fails.
    fn update_ref(repo_path: &Path, refname: &str, commit: &str) -> RelResult<()>;

    /// Set git config value.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the config value cannot be set.
    fn set_config(repo_path: &Path, key: &str, value: &str) -> RelResult<()>;
}

// --- GixBackend Implementation (Pure Rust) ---

/// Pure Rust git backend using gix.
///
/// Provides efficient read-only operations without spawning subprocesses.
pub struct GixBackend;

impl GitQuery for GixBackend {
    fn is_git_repo(path: &Path) -> bool {
        gix::discover(path).is_ok()
    }

    fn current_branch(path: &Path) -> RelResult<Option<String>> {
        let repo =
            gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?;
        let head = repo
            .head_name()
            .map_err(|e| GitError::Gix(GixError::Head(e)))?;
        Ok(head.map(|name| name.shorten().to_string()))
    }

    fn local_branch_exists(path: &Path, branch: &str) -> RelResult<bool> {
        let repo =
            gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?;
        let full_name = format!("refs/heads/{branch}");

        match repo.find_reference(full_name.as_str()) {
            Ok(_) => Ok(true),
            Err(gix::reference::find::existing::Error::NotFound { name: _ }) => Ok(false),
            Err(e) => Err(GitError::Gix(GixError::Reference(e)).into()),
        }
    }

    fn has_uncommitted_changes(path: &Path) -> RelResult<bool> {
        use gix::status::UntrackedFiles;

        let repo =
            gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?;

        let has_changes = repo
            .status(gix::progress::Discard)
            .map_err(|_| GitError::CommandFailed {
                command: "status".to_string(),
                message: "failed to prepare status check".to_string(),
            })?
            .untracked_files(UntrackedFiles::Files)
            .into_iter(None)
            .map_err(|_| GitError::CommandFailed {
                command: "status".to_string(),
                message: "failed to check repository status".to_string(),
            })?
            .next()
            .is_some();

        Ok(has_changes)
    }
}

// --- ShellBackend Implementation (Git CLI) ---

/// Shell-based git backend using git CLI.
///
/// Required for:
/// - Every write (commits, tags, refs, patch application)
/// - Plumbing not exposed by gix (`mktree`, `format-patch`, `am`)
pub struct ShellBackend;

impl ShellBackend {
    fn command(args: &[&str], cwd: &Path) -> Command {
        let mut command = Command::new("git");
        command
            .args(args)
            .current_dir(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0");
        command
    }

    fn check(args: &[&str], output: Output) -> RelResult<Vec<u8>> {
        if !output.status.success() {
            let mut message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if message.is_empty() {
                message = String::from_utf8_lossy(&output.stdout).trim().to_string();
            }
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                message,
            }
            .into());
        }
        Ok(output.stdout)
    }

    /// Execute a git command. Sets `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0`.
    pub(crate) fn git_command(args: &[&str], cwd: &Path) -> RelResult<String> {
        let stdout = Self::git_command_bytes(args, cwd)?;
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }

    /// Execute a git command and return stdout untouched.
    pub(crate) fn git_command_bytes(args: &[&str], cwd: &Path) -> RelResult<Vec<u8>> {
        let output = Self::command(args, cwd)
            .output()
            .map_err(|e| std::io::Error::new(e.kind(), format!("failed to execute git: {e}")))?;
        Self::check(args, output)
    }

    /// Execute a git command feeding `input` on stdin.
    pub(crate) fn git_command_with_input(
        args: &[&str],
        cwd: &Path,
        input: &[u8],
    ) -> RelResult<String> {
        let mut child = Self::command(args, cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| std::io::Error::new(e.kind(), format!("failed to execute git: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input)?;
        }
        let output = child.wait_with_output()?;
        let stdout = Self::check(args, output)?;
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }
}

impl GitMutation for ShellBackend {
    fn clone(url: &str, dest: &Path, branch: Option<&str>, shallow: bool) -> RelResult<()> {
        let mut args = vec!["clone", "--quiet"];
        args.extend(&["-c", "advice.detachedHead=false"]);
        if shallow {
            args.extend(&["--depth", "1"]);
        }
        if let Some(b) = branch {
            args.extend(&["--branch", b]);
        }
        args.push(url);
        let dest_str = dest.to_str().ok_or_else(|| GitError::CloneFailed {
            url: url.to_string(),
            message: "invalid destination path".to_string(),
        })?;
        args.push(dest_str);

        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        Self::git_command(&args, parent).map_err(|e| GitError::CloneFailed {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    fn fetch_ref(repo_path: &Path, source: &str, refspec: &str) -> RelResult<()> {
        Self::git_command(
            &["fetch", "--quiet", "--no-tags", source, refspec],
            repo_path,
        )?;
        Ok(())
    }

    fn checkout(repo_path: &Path, what: &str) -> RelResult<()> {
        Self::git_command(
            &["-c", "advice.detachedHead=false", "checkout", "-q", what],
            repo_path,
        )
        .map_err(|e| GitError::CheckoutFailed {
            what: what.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    fn checkout_orphan(repo_path: &Path, branch: &str) -> RelResult<()> {
        Self::git_command(&["checkout", "-q", "--orphan", branch], repo_path).map_err(|e| {
            GitError::CheckoutFailed {
                what: branch.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(())
    }

    fn init_repo(path: &Path) -> RelResult<()> {
        Self::git_command(&["init", "--quiet"], path)?;
        Ok(())
    }

    fn read_tree_reset(repo_path: &Path, treeish: &str) -> RelResult<()> {
        Self::git_command(&["read-tree", "-u", "--reset", treeish], repo_path)?;
        Ok(())
    }

    fn add_all(repo_path: &Path) -> RelResult<()> {
        Self::git_command(&["add", "-A", "--", "."], repo_path)?;
        Ok(())
    }

    fn commit(repo_path: &Path, message: &str) -> RelResult<()> {
        Self::git_command(
            &["commit", "--quiet", "--allow-empty", "--no-verify", "-m", message],
            repo_path,
        )?;
        Ok(())
    }

    fn tag(
        repo_path: &Path,
        name: &str,
        message: &str,
        target: &str,
        force: bool,
    ) -> RelResult<()> {
        let mut args = vec!["tag", "-a", "-m", message];
        if force {
            args.push("-f");
        }
        args.extend(&[name, target]);
        Self::git_command(&args, repo_path)?;
        Ok(())
    }

    fn reset_hard(repo_path: &Path, rev: &str) -> RelResult<()> {
        Self::git_command(&["reset", "--quiet", "--hard", rev], repo_path)?;
        Ok(())
    }

    fn update_ref(repo_path: &Path, refname: &str, commit: &str) -> RelResult<()> {
        Self::git_command(&["update-ref", refname, commit], repo_path)?;
        Ok(())
    }

    fn set_config(repo_path: &Path, key: &str, value: &str) -> RelResult<()> {
        Self::git_command(&["config", key, value], repo_path)?;
        Ok(())
    }
}

impl GitQuery for ShellBackend {
    fn is_git_repo(path: &Path) -> bool {
        Self::git_command(&["rev-parse", "--is-inside-work-tree"], path).is_ok()
    }

    fn current_branch(path: &Path) -> RelResult<Option<String>> {
        Self::git_command(&["symbolic-ref", "--short", "HEAD"], path)
            .map_or_else(|_| Ok(None), |branch| Ok(Some(branch)))
    }

    fn local_branch_exists(path: &Path, branch: &str) -> RelResult<bool> {
        let full_name = format!("refs/heads/{branch}");
        let output = Self::git_command(&["show-ref", "--verify", "--quiet", &full_name], path);
        Ok(output.is_ok())
    }

    fn has_uncommitted_changes(path: &Path) -> RelResult<bool> {
        let output = Self::git_command(&["status", "--porcelain"], path)?;
        Ok(!output.is_empty())
    }
}
