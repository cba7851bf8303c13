// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |        release / generate / patch
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |         pipeline          |
//!              | upstream > release > deb  |
//!              '--+--------+--------+------'
//!                 |        |        |
//!                 v        v        v
//!              patch    manifest  resolve
//!           patches/*  package.xml  rules
//!                 |        |
//!                 v        v
//!                git     utility
//!             gix/CLI    fs walk
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging, config    |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod manifest;
pub mod patch;
pub mod pipeline;
pub mod resolve;
pub mod utility;
