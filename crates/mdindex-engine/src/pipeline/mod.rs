// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
The bulk build pipeline for one concrete (N, record variant, raw event)
combination.

Stages run strictly in order:
1. transform raw channel events into bounded records
2. assign Morton keys
3. sort by key
4. build the box structure
5. recover coordinates (optional) and materialize the tree

The target's root is only replaced once every stage succeeded.
*/

pub(crate) mod materialize;
pub(crate) mod morton_pass;
pub(crate) mod sort;
pub(crate) mod structure;
pub(crate) mod transform;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::box_controller::LevelCounts;
use crate::events::{EventVariant, MdEvent};
use crate::index::MdEventIndex;
use crate::progress::{BuildProgress, BuildStage};
use crate::source::{CoordinateTransform, EventSource, RawEvent, UnitConversion};
use crate::types::{IndexError, IndexResult};

/// Per-build knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Worker threads for a dedicated pool; 0 runs on the global pool
    pub num_threads: usize,
    /// Snap record coordinates to the centre of their key's quantum
    pub recover_coordinates: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            num_threads: 0,
            recover_coordinates: true,
        }
    }
}

/// Outcome of one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub dimensions: usize,
    pub variant: EventVariant,
    pub accepted_events: usize,
    pub dropped_events: usize,
    pub leaf_count: usize,
    pub grid_count: usize,
    pub max_leaf_events: usize,
    pub max_depth: usize,
    /// Boxes created per level, root first, down to `max_depth`
    pub level_counts: Vec<LevelCounts>,
}

/// Run the whole pipeline and install the result as `index`'s root.
///
/// On error the index is left untouched. Callable without going through
/// `append_events`, so the transform's dimension count is checked here too.
pub fn build_index<R, E, U, T, const N: usize>(
    source: &EventSource,
    conversion: &U,
    transform: &T,
    index: &mut MdEventIndex<E, N>,
    settings: &BuildSettings,
    progress: &dyn BuildProgress,
) -> IndexResult<BuildSummary>
where
    R: RawEvent,
    E: MdEvent<N>,
    U: UnitConversion,
    T: CoordinateTransform,
{
    if transform.num_dims() != N {
        return Err(IndexError::configuration(format!(
            "coordinate transform produces {} coordinates for a {}-dimensional index",
            transform.num_dims(),
            N
        )));
    }
    let bounds = *index.bounds();
    let controller = index.box_controller().clone();

    let transformed = transform::transform_events::<R, E, U, T, N>(
        source.run_index,
        &source.channels,
        conversion,
        transform,
        &bounds,
    )?;
    let mut events = transformed.events;
    let accepted_events = events.len();
    debug!(
        target: "mdindex-engine",
        "[BUILD] {} events accepted, {} dropped from {} channels",
        accepted_events,
        transformed.dropped,
        source.num_channels()
    );

    morton_pass::assign_keys(&mut events, &bounds);
    progress.report(BuildStage::KeysAssigned);

    sort::sort_by_index(&mut events);
    progress.report(BuildStage::Sorted);

    controller.reset_counters();
    let structure = structure::build_structure(&events, &controller);
    progress.report(BuildStage::StructureBuilt);

    if settings.recover_coordinates {
        morton_pass::recover_coordinates(&mut events, &bounds);
    }
    let root = materialize::materialize(structure, events, &bounds);
    progress.report(BuildStage::Materialized);

    let (leaf_count, grid_count) = root.node_counts();
    let max_depth = root.max_depth();
    let summary = BuildSummary {
        dimensions: N,
        variant: E::VARIANT,
        accepted_events,
        dropped_events: transformed.dropped,
        leaf_count,
        grid_count,
        max_leaf_events: root
            .leaves()
            .iter()
            .map(|leaf| leaf.events.len())
            .max()
            .unwrap_or(0),
        max_depth,
        level_counts: controller
            .level_counts()
            .into_iter()
            .take(max_depth + 1)
            .collect(),
    };
    index.set_root(root);

    info!(
        target: "mdindex-engine",
        "[BUILD] indexed {} {}-D {} events into {} leaves and {} grids (max depth {})",
        summary.accepted_events,
        summary.dimensions,
        summary.variant,
        summary.leaf_count,
        summary.grid_count,
        summary.max_depth
    );

    Ok(summary)
}
