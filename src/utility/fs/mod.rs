// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem utilities with parallel traversal.
//!
//! ```text
//! walk:  find_marked_dirs()  ignore::WalkParallel (multi-core)
//!        WalkOptions         max_depth, hidden, skip dirs, ignore markers
//! ```

pub mod walk;

#[cfg(test)]
mod tests;
