// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# MDIndex Engine

Bulk indexing of point-like measurement events into a box tree over an
N-dimensional coordinate space:
- Event transformation (unit conversion, coordinates, bounds filtering)
- Morton (Z-order) key assignment and parallel sort
- Recursive bulk construction of a grid/leaf box tree
- Materialization into owned index nodes with coordinate extents

## Architecture

- `source` → raw per-channel events and their conversion collaborators
- `spatial` → bounds box and N-dimensional Morton keys
- `pipeline` → the build stages for one concrete (N, variant) pair
- `dispatch` → run-time selection of N (2..=8) and record variant

Each build is a one-shot batch over a closed input set; the target's tree is
replaced wholesale, or left untouched when the build fails.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod box_controller;
pub mod dispatch;
pub mod events;
pub mod index;
pub mod pipeline;
pub mod progress;
pub mod source;
pub mod spatial;
pub mod types;

pub use box_controller::{BoxController, BoxSettings, LevelCounts, MAX_BOX_DEPTH};
pub use dispatch::{append_events, append_events_with_progress, create_index};
pub use events::{EventVariant, LeanEvent, MdEvent, Provenance, RegularEvent};
pub use index::{GridBox, IndexNode, IndexTarget, LeafBox, MdEventIndex, NodeExtents};
pub use pipeline::{build_index, BuildSettings, BuildSummary};
pub use progress::{BuildProgress, BuildStage, LogProgress};
pub use source::{
    ChannelEvents, CoordinateTransform, DetectorTableTransform, EventChannel, EventSource,
    LinearConversion, RawEvent, RawEventKind, TofEvent, UnitConversion, WeightedEvent,
    WeightedEventNoTime,
};
pub use spatial::{AxisExtent, MortonInterval, MortonKey, SpaceBounds, MAX_DIMS, MIN_DIMS};
pub use types::{Coord, IndexError, IndexResult, Signal, SourceError};
