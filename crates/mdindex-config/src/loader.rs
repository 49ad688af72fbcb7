// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, IndexerConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the MDIndex configuration file
///
/// Search order:
/// 1. `MDINDEX_CONFIG_PATH` environment variable
/// 2. Current working directory: `./mdindex_configuration.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("MDINDEX_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by MDINDEX_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "MDIndex configuration file '{}' not found in any of these locations:\n{}\n\nSet MDINDEX_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Values are not validated here; see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<IndexerConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: IndexerConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `MDINDEX_SPLIT_THRESHOLD` -> `box_controller.split_threshold`
/// - `MDINDEX_MAX_DEPTH` -> `box_controller.max_depth`
/// - `MDINDEX_NUM_THREADS` -> `build.num_threads`
/// - `MDINDEX_RECOVER_COORDINATES` -> `build.recover_coordinates`
/// - `MDINDEX_LOG_LEVEL` -> `logging.level`
///
/// Unparseable numbers are ignored.
pub fn apply_environment_overrides(config: &mut IndexerConfig) {
    if let Ok(value) = env::var("MDINDEX_SPLIT_THRESHOLD") {
        if let Ok(threshold) = value.parse::<usize>() {
            config.box_controller.split_threshold = threshold;
        }
    }
    if let Ok(value) = env::var("MDINDEX_MAX_DEPTH") {
        if let Ok(depth) = value.parse::<usize>() {
            config.box_controller.max_depth = depth;
        }
    }

    if let Ok(value) = env::var("MDINDEX_NUM_THREADS") {
        if let Ok(threads) = value.parse::<usize>() {
            config.build.num_threads = threads;
        }
    }
    if let Ok(value) = env::var("MDINDEX_RECOVER_COORDINATES") {
        config.build.recover_coordinates = parse_flag(&value);
    }

    if let Ok(value) = env::var("MDINDEX_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"split_threshold": "500", "max_depth": "8"}`)
pub fn apply_cli_overrides(config: &mut IndexerConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("split_threshold") {
        if let Ok(threshold) = value.parse::<usize>() {
            config.box_controller.split_threshold = threshold;
        }
    }
    if let Some(value) = cli_args.get("max_depth") {
        if let Ok(depth) = value.parse::<usize>() {
            config.box_controller.max_depth = depth;
        }
    }

    if let Some(value) = cli_args.get("num_threads") {
        if let Ok(threads) = value.parse::<usize>() {
            config.build.num_threads = threads;
        }
    }
    if let Some(value) = cli_args.get("recover_coordinates") {
        config.build.recover_coordinates = parse_flag(value);
    }

    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("log_format") {
        config.logging.format = value.clone();
    }
    if let Some(value) = cli_args.get("log_dir") {
        config.logging.log_dir = Some(PathBuf::from(value));
    }
}
