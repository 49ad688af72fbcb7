// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # MDIndex
//!
//! Parallel bulk indexing of point-like measurement events into a
//! Morton-ordered box tree over an N-dimensional (2..=8) coordinate space.
//!
//! This crate re-exports the engine and wires the configuration and logging
//! crates around it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mdindex::prelude::*;
//! use mdindex::services::IndexService;
//! use mdindex::synthetic::{generate, SyntheticParams};
//!
//! let service = IndexService::from_config(IndexerConfig::default())?;
//! let run = generate(&SyntheticParams::default())?;
//! let mut target = service.create_index(run.num_dims(), EventVariant::Lean, &run.min, &run.max)?;
//! let summary = service.run_build(target.as_mut(), &run.source, &run.conversion, &run.transform)?;
//! println!("{} leaves", summary.leaf_count);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: mdindex-config                             │
//! │  (TOML + environment + CLI overrides)                   │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: mdindex-engine                             │
//! │  (transform, Morton keys, sort, box tree, dispatch)     │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Services: mdindex::services, tools/build_index         │
//! │  (config mapping, logging, synthetic sources)           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub use mdindex_config as config;
pub use mdindex_engine as engine;
pub use mdindex_observability as observability;

pub mod services;
pub mod synthetic;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{load_config, validate_config, IndexerConfig};
    pub use crate::engine::{
        append_events, create_index, BoxSettings, BuildSettings, BuildSummary, CoordinateTransform,
        DetectorTableTransform, EventChannel, EventSource, EventVariant, IndexError, IndexTarget,
        LeanEvent, LinearConversion, MdEvent, MdEventIndex, RegularEvent, SpaceBounds,
        UnitConversion,
    };
    pub use crate::services::{IndexService, ServiceError, ServiceResult};
}
