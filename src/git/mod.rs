// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git access for the release repository and upstream clones.
//!
//! ```text
//! pipeline / patch / config::tracks
//!        |            |            |
//!     query.rs      cmd.rs       ops.rs
//!  (refs, trees,  (plumbing,   (clean check,
//!   blobs)         porcelain)   branch guard)
//!        |            |
//!    GixBackend   ShellBackend
//!   repo state    every write, object reads
//! ```
//!
//! Reads that only need repository state go through `gix`; anything that
//! writes objects or refs runs the `git` binary.

pub mod backend;
pub mod cmd;
pub mod ops;
pub mod query;
