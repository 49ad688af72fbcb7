// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Application boundary between configuration and the index engine.

[`IndexService`] owns a validated [`IndexerConfig`], derives the engine's
settings from it, and runs builds against dynamically shaped targets.
*/

use std::path::Path;

use mdindex_config::{load_config, validate_config, ConfigError, IndexerConfig};
use mdindex_engine::{
    append_events_with_progress, create_index, BoxSettings, BuildProgress, BuildSettings,
    BuildSummary, Coord, CoordinateTransform, EventSource, EventVariant, IndexError, IndexTarget,
    LogProgress, UnitConversion,
};
use mdindex_observability::{LogFormat, LoggingOptions};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Runs index builds with settings taken from one configuration
#[derive(Debug, Clone)]
pub struct IndexService {
    config: IndexerConfig,
    box_settings: BoxSettings,
}

impl IndexService {
    /// Validate `config` and derive the engine settings from it.
    pub fn from_config(config: IndexerConfig) -> ServiceResult<Self> {
        validate_config(&config)?;
        let box_settings = BoxSettings::new(
            config.box_controller.split_threshold,
            config.box_controller.max_depth,
        )?;
        Ok(Self {
            config,
            box_settings,
        })
    }

    /// Load (file, then environment, then `cli_overrides`) and validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_overrides: Option<&std::collections::HashMap<String, String>>,
    ) -> ServiceResult<Self> {
        let config = load_config(config_path, cli_overrides)?;
        Self::from_config(config)
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub fn box_settings(&self) -> BoxSettings {
        self.box_settings
    }

    pub fn build_settings(&self) -> BuildSettings {
        BuildSettings {
            num_threads: self.config.build.num_threads,
            recover_coordinates: self.config.build.recover_coordinates,
        }
    }

    /// Logging options for [`mdindex_observability::init_logging`].
    ///
    /// The format was validated on construction, so the text fallback only
    /// guards against a config mutated afterwards.
    pub fn logging_options(&self) -> LoggingOptions {
        let logging = &self.config.logging;
        let format = logging.format.parse::<LogFormat>().unwrap_or_else(|e| {
            warn!(target: "mdindex", "{}, falling back to text", e);
            LogFormat::Text
        });
        LoggingOptions {
            level: logging.level.clone(),
            format,
            log_dir: logging.log_dir.clone(),
            ..LoggingOptions::default()
        }
    }

    /// Empty index of the requested shape using the configured box settings.
    pub fn create_index(
        &self,
        num_dims: usize,
        variant: EventVariant,
        min: &[Coord],
        max: &[Coord],
    ) -> ServiceResult<Box<dyn IndexTarget>> {
        Ok(create_index(num_dims, variant, min, max, self.box_settings)?)
    }

    /// Index `source` into `target`, logging progress.
    pub fn run_build<U, T>(
        &self,
        target: &mut dyn IndexTarget,
        source: &EventSource,
        conversion: &U,
        transform: &T,
    ) -> ServiceResult<BuildSummary>
    where
        U: UnitConversion,
        T: CoordinateTransform,
    {
        self.run_build_with_progress(target, source, conversion, transform, &LogProgress)
    }

    pub fn run_build_with_progress<U, T>(
        &self,
        target: &mut dyn IndexTarget,
        source: &EventSource,
        conversion: &U,
        transform: &T,
        progress: &dyn BuildProgress,
    ) -> ServiceResult<BuildSummary>
    where
        U: UnitConversion,
        T: CoordinateTransform,
    {
        let settings = self.build_settings();
        info!(
            target: "mdindex",
            "Building {}-D {} index (split threshold {}, max depth {}, threads {})",
            target.num_dims(),
            target.event_variant(),
            self.box_settings.split_threshold,
            self.box_settings.max_depth,
            settings.num_threads
        );
        let summary =
            append_events_with_progress(target, source, conversion, transform, &settings, progress)?;
        Ok(summary)
    }
}
