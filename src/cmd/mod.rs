// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   release, import-upstream, generate --> pipeline::run
//!   patch                              --> patch::{export, remove, import}
//!   options                            --> config
//! ```

pub mod config;
pub mod patch;
pub mod release;
