// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Box splitting settings and per-level box statistics.

The counters are diagnostic only: the builder increments them with relaxed
atomics from its parallel workers.
*/

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::spatial::MORTON_BITS_PER_AXIS;
use crate::types::{IndexError, IndexResult};

/// Leaf capacity above which a box is split
pub const DEFAULT_SPLIT_THRESHOLD: usize = 1000;

/// Maximum number of splits below the root
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Deepest level the key width can describe
pub const MAX_BOX_DEPTH: usize = MORTON_BITS_PER_AXIS as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxSettings {
    pub split_threshold: usize,
    pub max_depth: usize,
}

impl Default for BoxSettings {
    fn default() -> Self {
        Self {
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl BoxSettings {
    pub fn new(split_threshold: usize, max_depth: usize) -> IndexResult<Self> {
        let settings = Self {
            split_threshold,
            max_depth,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> IndexResult<()> {
        if self.split_threshold == 0 {
            return Err(IndexError::configuration("split threshold must be at least 1"));
        }
        if self.max_depth > MAX_BOX_DEPTH {
            return Err(IndexError::configuration(format!(
                "max depth {} exceeds the {} levels a key can describe",
                self.max_depth, MAX_BOX_DEPTH
            )));
        }
        Ok(())
    }
}

/// Leaf/grid boxes created at one tree level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelCounts {
    pub depth: usize,
    pub leaves: usize,
    pub grids: usize,
}

/// Splitting settings plus box statistics of the last build
#[derive(Debug)]
pub struct BoxController {
    settings: BoxSettings,
    leaves: Vec<AtomicUsize>,
    grids: Vec<AtomicUsize>,
}

impl BoxController {
    pub fn new(settings: BoxSettings) -> IndexResult<Self> {
        settings.validate()?;
        let levels = settings.max_depth + 1;
        Ok(Self {
            settings,
            leaves: (0..levels).map(|_| AtomicUsize::new(0)).collect(),
            grids: (0..levels).map(|_| AtomicUsize::new(0)).collect(),
        })
    }

    pub fn settings(&self) -> &BoxSettings {
        &self.settings
    }

    pub fn split_threshold(&self) -> usize {
        self.settings.split_threshold
    }

    pub fn max_depth(&self) -> usize {
        self.settings.max_depth
    }

    pub fn reset_counters(&self) {
        for counter in self.leaves.iter().chain(self.grids.iter()) {
            counter.store(0, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn inc_leaf(&self, depth: usize) {
        if let Some(counter) = self.leaves.get(depth) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn inc_grid(&self, depth: usize) {
        if let Some(counter) = self.grids.get(depth) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn level_counts(&self) -> Vec<LevelCounts> {
        self.leaves
            .iter()
            .zip(self.grids.iter())
            .enumerate()
            .map(|(depth, (leaves, grids))| LevelCounts {
                depth,
                leaves: leaves.load(Ordering::Relaxed),
                grids: grids.load(Ordering::Relaxed),
            })
            .collect()
    }

    pub fn total_leaves(&self) -> usize {
        self.leaves.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    pub fn total_grids(&self) -> usize {
        self.grids.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = BoxSettings::default();
        assert_eq!(settings.split_threshold, 1000);
        assert_eq!(settings.max_depth, 5);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        assert!(BoxSettings::new(0, 5).unwrap_err().is_configuration());
        assert!(BoxSettings::new(10, MAX_BOX_DEPTH + 1).is_err());
        assert!(BoxSettings::new(1, MAX_BOX_DEPTH).is_ok());
    }

    #[test]
    fn test_level_counters() {
        let controller = BoxController::new(BoxSettings::new(10, 2).unwrap()).unwrap();
        controller.inc_grid(0);
        controller.inc_leaf(1);
        controller.inc_leaf(1);
        controller.inc_leaf(2);

        let counts = controller.level_counts();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[0], LevelCounts { depth: 0, leaves: 0, grids: 1 });
        assert_eq!(counts[1].leaves, 2);
        assert_eq!(controller.total_leaves(), 3);
        assert_eq!(controller.total_grids(), 1);

        controller.reset_counters();
        assert_eq!(controller.total_leaves(), 0);
        assert_eq!(controller.total_grids(), 0);
    }
}
