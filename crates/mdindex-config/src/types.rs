// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `mdindex_configuration.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration file name searched for by [`crate::find_config_file`]
pub const CONFIG_FILE_NAME: &str = "mdindex_configuration.toml";

/// Deepest box level a 16-bit-per-axis key can describe
pub const MAX_BOX_DEPTH: usize = 16;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub box_controller: BoxControllerConfig,
    pub build: BuildConfig,
    pub logging: LoggingConfig,
}

/// Box splitting configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BoxControllerConfig {
    /// A box holding more records than this is split
    pub split_threshold: usize,
    /// Splits allowed below the root (at most [`MAX_BOX_DEPTH`])
    pub max_depth: usize,
}

impl Default for BoxControllerConfig {
    fn default() -> Self {
        Self {
            split_threshold: 1000,
            max_depth: 5,
        }
    }
}

/// Build execution configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    pub num_threads: usize, // 0 = global pool
    pub recover_coordinates: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            num_threads: 0,
            recover_coordinates: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "text" or "json"
    pub format: String,
    /// Directory for daily rolling log files; console only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            log_dir: None,
        }
    }
}
