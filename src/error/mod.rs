// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!                RelError (~24 bytes)
//!                       |
//!   +-------+-------+---+----+--------+-------+------+
//!   |       |       |        |        |       |      |
//!   v       v       v        v        v       v      v
//! Bail    Git   Config  Manifest   Patch  Pipeline Io/Other
//!         Box    Box      Box       Box     Box    Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Git       Gix, CommandFailed, UncommittedChanges, UnsupportedVcs
//!   Config    ParseError, MissingKey, InvalidValue, TrackNotFound
//!   Manifest  Xml, MissingField, InvalidVersion, InvalidFormat
//!   Patch     NoBaseRecorded, UnexportedChanges, Conflict
//!   Pipeline  UpstreamImport, ReleaseMergeConflict,
//!             DependencyResolution, NoBaseRecorded
//!
//! All variants boxed => RelError fits in 24 bytes.
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`RelError`].
pub type RelResult<T> = std::result::Result<T, RelError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum RelError {
    /// Fatal error that should terminate the application.
    #[error("fatal error: {0}")]
    Bailed(Box<str>),

    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Package manifest could not be read.
    #[error("manifest error: {0}")]
    Manifest(#[from] Box<ManifestError>),

    /// Patch store operation failed.
    #[error("patch error: {0}")]
    Patch(#[from] Box<PatchError>),

    /// A pipeline stage failed.
    #[error("{0}")]
    Pipeline(#[from] Box<PipelineError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

/// Create a fatal [`RelError::Bailed`] that terminates the application.
pub fn bail_out(message: impl Into<String>) -> RelError {
    RelError::Bailed(message.into().into_boxed_str())
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for RelError {
                fn from(err: $error) -> Self {
                    RelError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    GitError => Git,
    ConfigError => Config,
    ManifestError => Manifest,
    PatchError => Patch,
    PipelineError => Pipeline,
    ProcessError => Process,
    std::io::Error => Io,
}

// --- Gix Errors ---

/// Wrapper for gix-specific errors.
///
/// Large error types are boxed to keep enum size manageable.
#[derive(Debug, Error)]
pub enum GixError {
    /// Failed to discover repository from path.
    #[error("failed to discover repository: {0}")]
    Discover(#[from] Box<gix::discover::Error>),

    /// Failed to look up a reference.
    #[error("failed to find reference: {0}")]
    Reference(#[from] gix::reference::find::existing::Error),

    /// Failed to get HEAD reference.
    #[error("failed to get head reference: {0}")]
    Head(gix::reference::find::existing::Error),
}

// --- Git Errors ---

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found at the specified path.
    #[error("repository not found: {path}")]
    RepoNotFound { path: String },

    /// Git command execution failed.
    #[error("git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// Error from gix library.
    #[error("gix error: {0}")]
    Gix(#[from] GixError),

    /// Uncommitted changes detected when clean working tree required.
    #[error("uncommitted changes in {path}")]
    UncommittedChanges { path: String },

    /// Branch not found.
    #[error("branch not found: {branch}")]
    BranchNotFound { branch: String },

    /// Clone operation failed.
    #[error("failed to clone {url}: {message}")]
    CloneFailed { url: String, message: String },

    /// Checkout operation failed.
    #[error("failed to checkout {what}: {message}")]
    CheckoutFailed { what: String, message: String },

    /// Only git upstreams can be imported.
    #[error("unsupported vcs type '{vcs_type}'")]
    UnsupportedVcs { vcs_type: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// The requested release track is not configured.
    #[error("track '{track}' not found in {file}")]
    TrackNotFound { track: String, file: String },
}

// --- Manifest Errors ---

/// Package manifest (`package.xml`) errors.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest is not well-formed XML.
    #[error("invalid xml in '{path}': {message}")]
    Xml { path: String, message: String },

    /// A required element is missing or empty.
    #[error("'{path}' has no <{field}>")]
    MissingField { path: String, field: &'static str },

    /// The version is not `major.minor.patch`.
    #[error("'{path}' has invalid version '{version}' (expected X.Y.Z)")]
    InvalidVersion { path: String, version: String },

    /// The `format` attribute is not a supported integer.
    #[error("'{path}' declares unsupported format '{format}'")]
    InvalidFormat { path: String, format: String },

    /// Two packages share a name.
    #[error("package '{name}' found twice: '{first}' and '{second}'")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
}

// --- Patch Errors ---

/// Patch store errors.
#[derive(Debug, Error)]
pub enum PatchError {
    /// No patch base was recorded for the branch.
    #[error("no patch base recorded for '{branch}' (missing {patches_branch})")]
    NoBaseRecorded {
        branch: String,
        patches_branch: String,
    },

    /// The branch has commits that were never exported.
    #[error("'{branch}' has unexported commits on top of {exported}; export them first")]
    UnexportedChanges { branch: String, exported: String },

    /// Stored patches do not apply to the branch tip.
    #[error("patches from '{patches_branch}' do not apply to '{branch}': {message}")]
    Conflict {
        branch: String,
        patches_branch: String,
        message: String,
    },

    /// Stored patch metadata is unreadable.
    #[error("corrupt patch metadata on '{patches_branch}': {message}")]
    Metadata {
        patches_branch: String,
        message: String,
    },
}

// --- Pipeline Errors ---

/// Release pipeline stage errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Upstream could not be imported.
    #[error("upstream import failed for track '{track}': {reason}")]
    UpstreamImport { track: String, reason: String },

    /// Replaying a patch set over new upstream content failed.
    #[error(
        "merge conflict releasing '{package}' on '{branch}' ({stage}): {reason}; \
         the branch was left untouched"
    )]
    ReleaseMergeConflict {
        package: String,
        stage: &'static str,
        branch: String,
        reason: String,
    },

    /// A dependency has no mapping for the target platform.
    #[error("cannot resolve dependency '{dependency}' of '{package}' for {os}:{codename}")]
    DependencyResolution {
        package: String,
        dependency: String,
        os: String,
        codename: String,
    },

    /// A derived branch has no recorded patch base.
    #[error("no patch base recorded for '{branch}' of '{package}'")]
    NoBaseRecorded { package: String, branch: String },
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
