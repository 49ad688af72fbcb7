// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # mdindex-observability
//!
//! Logging setup shared by the MDIndex binaries, with per-crate debug flag
//! support.
//!
//! ## Features
//! - `file-logging`: daily rolling JSON log files next to console output

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known MDIndex crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "mdindex",
    "mdindex-engine",
    "mdindex-config",
    "mdindex-observability",
];
