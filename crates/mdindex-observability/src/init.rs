// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output in text or JSON, plus an optional daily rolling JSON file
//! per run when built with `file-logging`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingOptions};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const RUN_PREFIX: &str = "run_";
const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Keeps file writers alive; logs are flushed when dropped
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving log files, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Install the global subscriber.
///
/// Per-crate debug flags raise the named crates to `debug`; everything else
/// logs at `options.level`. With `options.log_dir` set, logs also go to
/// `<log_dir>/run_<timestamp>/mdindex.log`.
pub fn init_logging(debug_flags: &CrateDebugFlags, options: &LoggingOptions) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(&options.level);
    #[cfg_attr(not(feature = "file-logging"), allow(unused_mut))]
    let mut layers: Vec<BoxedLayer> = vec![console_layer(options.format, env_filter(&filter)?)];

    #[cfg(feature = "file-logging")]
    let mut file_guards = Vec::new();

    let log_dir = match &options.log_dir {
        #[cfg(feature = "file-logging")]
        Some(base) => Some(add_file_layer(
            base,
            &filter,
            options.retention_runs,
            &mut layers,
            &mut file_guards,
        )?),
        #[cfg(not(feature = "file-logging"))]
        Some(base) => anyhow::bail!(
            "Logging to {} requires the `file-logging` feature",
            base.display()
        ),
        None => None,
    };

    Registry::default()
        .with(layers)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        log_dir,
    })
}

/// Console-only logging at `level`
pub fn init_console_logging(debug_flags: &CrateDebugFlags, level: &str) -> Result<LoggingGuard> {
    let options = LoggingOptions {
        level: level.to_string(),
        ..LoggingOptions::default()
    };
    init_logging(debug_flags, &options)
}

fn env_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter).with_context(|| format!("Invalid log filter: {}", filter))
}

fn console_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer {
    match format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_filter(filter)
            .boxed(),
    }
}

#[cfg(feature = "file-logging")]
fn add_file_layer(
    base_log_dir: &Path,
    filter: &str,
    retention_runs: usize,
    layers: &mut Vec<BoxedLayer>,
    guards: &mut Vec<tracing_appender::non_blocking::WorkerGuard>,
) -> Result<PathBuf> {
    let timestamp = chrono::Utc::now().format(RUN_TIMESTAMP_FORMAT);
    let run_folder = base_log_dir.join(format!("{}{}", RUN_PREFIX, timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    cleanup_old_runs(base_log_dir, retention_runs)?;

    let appender = tracing_appender::rolling::daily(&run_folder, "mdindex.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    guards.push(guard);

    layers.push(
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(env_filter(filter)?)
            .boxed(),
    );

    Ok(run_folder)
}

/// Remove all but the `keep` most recent `run_<timestamp>` folders under
/// `base_log_dir`. Returns how many were removed.
pub fn cleanup_old_runs(base_log_dir: &Path, keep: usize) -> Result<usize> {
    if !base_log_dir.exists() {
        return Ok(0);
    }

    let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let stamp = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix(RUN_PREFIX))
            .and_then(|s| NaiveDateTime::parse_from_str(s, RUN_TIMESTAMP_FORMAT).ok());
        if let Some(stamp) = stamp {
            runs.push((path, stamp));
        }
    }

    // oldest first
    runs.sort_by_key(|(_, stamp)| *stamp);

    let excess = runs.len().saturating_sub(keep);
    for (path, _) in runs.iter().take(excess) {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove old log directory {}", path.display()))?;
    }

    Ok(excess)
}
