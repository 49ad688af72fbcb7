// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Build progress milestones.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pipeline milestone, reported once per build in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildStage {
    KeysAssigned,
    Sorted,
    StructureBuilt,
    Materialized,
}

impl BuildStage {
    pub const ALL: [BuildStage; 4] = [
        BuildStage::KeysAssigned,
        BuildStage::Sorted,
        BuildStage::StructureBuilt,
        BuildStage::Materialized,
    ];

    /// 1-based position among [`BuildStage::ALL`]
    pub fn step(&self) -> usize {
        match self {
            BuildStage::KeysAssigned => 1,
            BuildStage::Sorted => 2,
            BuildStage::StructureBuilt => 3,
            BuildStage::Materialized => 4,
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStage::KeysAssigned => "Calculating indexes",
            BuildStage::Sorted => "Sorting",
            BuildStage::StructureBuilt => "Building box structure",
            BuildStage::Materialized => "Materializing boxes",
        };
        f.write_str(name)
    }
}

/// Receives pipeline milestones; called from the thread driving the build.
pub trait BuildProgress: Sync {
    fn report(&self, stage: BuildStage);
}

impl<F> BuildProgress for F
where
    F: Fn(BuildStage) + Sync,
{
    fn report(&self, stage: BuildStage) {
        self(stage)
    }
}

/// Writes milestones to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl BuildProgress for LogProgress {
    fn report(&self, stage: BuildStage) {
        debug!(
            target: "mdindex-engine",
            "[BUILD] step {}/{}: {}",
            stage.step(),
            BuildStage::ALL.len(),
            stage
        );
    }
}
