// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Build an index from a seeded synthetic source and print its summary.
//!
//! Per-crate debug logging is enabled with `--debug-<crate>` or
//! `--debug-all` (see `mdindex_observability::debug_flags_help`).

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use mdindex::config::{find_config_file, load_config, ConfigError, IndexerConfig};
use mdindex::engine::{EventVariant, RawEventKind};
use mdindex::observability::{debug_flags_help, init_logging, CrateDebugFlags};
use mdindex::services::IndexService;
use mdindex::synthetic::{generate, SyntheticParams};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    Lean,
    Regular,
}

impl From<Variant> for EventVariant {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Lean => EventVariant::Lean,
            Variant::Regular => EventVariant::Regular,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Tof,
    Weighted,
    WeightedNoTime,
}

impl From<Kind> for RawEventKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Tof => RawEventKind::Tof,
            Kind::Weighted => RawEventKind::Weighted,
            Kind::WeightedNoTime => RawEventKind::WeightedNoTime,
        }
    }
}

/// MDIndex bulk build - index a synthetic event source
#[derive(Parser, Debug)]
#[command(
    name = "build_index",
    version,
    author,
    long_about = None,
    after_help = debug_flags_help()
)]
struct Args {
    /// Number of index dimensions (2-8)
    #[arg(short, long, default_value_t = 3)]
    dims: usize,

    /// Record variant stored in the leaves
    #[arg(long, value_enum, default_value_t = Variant::Lean)]
    variant: Variant,

    /// Raw event representation of the generated channels
    #[arg(long, value_enum, default_value_t = Kind::Tof)]
    kind: Kind,

    /// Number of detector channels
    #[arg(short, long, default_value_t = 256)]
    channels: usize,

    /// Events generated per channel
    #[arg(short, long, default_value_t = 4000)]
    events: usize,

    /// Probability that a channel is masked
    #[arg(long, default_value_t = 0.0)]
    masked_fraction: f64,

    /// Lower bound of every axis
    #[arg(long, default_value_t = -10.0, allow_hyphen_values = true)]
    min: f32,

    /// Upper bound of every axis
    #[arg(long, default_value_t = 10.0, allow_hyphen_values = true)]
    max: f32,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Configuration file (searched for when omitted; defaults if absent)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override box_controller.split_threshold
    #[arg(long)]
    split_threshold: Option<usize>,

    /// Override box_controller.max_depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Override build.num_threads (0 = global pool)
    #[arg(long)]
    threads: Option<usize>,

    /// Keep exact coordinates instead of snapping to key quanta
    #[arg(long, default_value_t = false)]
    no_recover: bool,

    /// Override logging.level
    #[arg(long)]
    log_level: Option<String>,

    /// Override logging.format (text or json)
    #[arg(long)]
    log_format: Option<String>,

    /// Override logging.log_dir
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Args {
    fn cli_overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(threshold) = self.split_threshold {
            overrides.insert("split_threshold".to_string(), threshold.to_string());
        }
        if let Some(depth) = self.max_depth {
            overrides.insert("max_depth".to_string(), depth.to_string());
        }
        if let Some(threads) = self.threads {
            overrides.insert("num_threads".to_string(), threads.to_string());
        }
        if self.no_recover {
            overrides.insert("recover_coordinates".to_string(), "false".to_string());
        }
        if let Some(level) = &self.log_level {
            overrides.insert("log_level".to_string(), level.clone());
        }
        if let Some(format) = &self.log_format {
            overrides.insert("log_format".to_string(), format.clone());
        }
        if let Some(dir) = &self.log_dir {
            overrides.insert("log_dir".to_string(), dir.display().to_string());
        }
        overrides
    }

    fn synthetic_params(&self) -> SyntheticParams {
        SyntheticParams {
            num_dims: self.dims,
            channels: self.channels,
            events_per_channel: self.events,
            kind: self.kind.into(),
            masked_fraction: self.masked_fraction,
            min: self.min,
            max: self.max,
            run_index: 0,
            seed: self.seed,
        }
    }
}

/// Split `--debug-*` flags off before clap sees the arguments.
fn split_debug_args() -> (CrateDebugFlags, Vec<String>) {
    let (debug_args, args): (Vec<String>, Vec<String>) =
        env::args().partition(|arg| arg.starts_with("--debug-"));
    let mut flags = CrateDebugFlags::from_args(debug_args);
    if let Ok(value) = env::var("MDINDEX_DEBUG") {
        flags.merge_env_value(&value);
    }
    (flags, args)
}

fn load_service(args: &Args) -> Result<IndexService> {
    let overrides = args.cli_overrides();
    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => match find_config_file() {
            Ok(path) => Some(path),
            Err(ConfigError::FileNotFound(_)) => None,
            Err(e) => return Err(e.into()),
        },
    };

    let config = match config_path {
        Some(path) => load_config(Some(&path), Some(&overrides))
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => {
            let mut config = IndexerConfig::default();
            mdindex::config::apply_environment_overrides(&mut config);
            mdindex::config::apply_cli_overrides(&mut config, &overrides);
            config
        }
    };

    Ok(IndexService::from_config(config)?)
}

fn main() -> Result<()> {
    let (debug_flags, clap_args) = split_debug_args();
    let args = Args::parse_from(clap_args);

    let service = load_service(&args)?;
    let _log_guard = init_logging(&debug_flags, &service.logging_options())?;

    let run = generate(&args.synthetic_params())?;
    let mut target =
        service.create_index(run.num_dims(), args.variant.into(), &run.min, &run.max)?;

    let started = Instant::now();
    let summary =
        service.run_build(target.as_mut(), &run.source, &run.conversion, &run.transform)?;
    let elapsed = started.elapsed();

    info!(
        target: "mdindex",
        "Indexed {} events in {:.3}s ({} masked channels)",
        summary.accepted_events,
        elapsed.as_secs_f64(),
        run.masked_channels
    );

    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!();
    println!("{:>5} {:>10} {:>10}", "depth", "leaves", "grids");
    for level in &summary.level_counts {
        println!("{:>5} {:>10} {:>10}", level.depth, level.leaves, level.grids);
    }

    Ok(())
}
