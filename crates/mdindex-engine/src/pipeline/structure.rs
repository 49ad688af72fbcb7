// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Box-tree builder: recursive bulk partitioning of a key-sorted record run.

A node over `[begin, end)` at `depth` becomes a leaf when it holds at most
`split_threshold` records or sits at `max_depth`. Otherwise its run is cut
into the octants selected by the key's bit group for that depth; octants are
contiguous in a sorted run, so each one is found by binary search. Empty
octants are skipped and non-empty ones are built in parallel.

Each node carries two key ranges:
- `cell`: the aligned octant cell it occupies (all its keys lie inside)
- `interval`: the cell widened over skipped neighbour octants, so that the
  children of a grid tile the grid's interval without gaps
*/

use std::ops::Range;

use rayon::prelude::*;

use crate::box_controller::BoxController;
use crate::events::MdEvent;
use crate::spatial::{octant_of, MortonInterval, MortonKey, MORTON_BITS_PER_AXIS};

/// Scratch tree over a sorted record array
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StructNode {
    Leaf {
        depth: usize,
        range: Range<usize>,
        interval: MortonInterval,
        cell: MortonInterval,
    },
    Grid {
        depth: usize,
        range: Range<usize>,
        interval: MortonInterval,
        children: Vec<StructNode>,
    },
}

impl StructNode {
    pub fn range(&self) -> &Range<usize> {
        match self {
            StructNode::Leaf { range, .. } | StructNode::Grid { range, .. } => range,
        }
    }

    pub fn interval(&self) -> &MortonInterval {
        match self {
            StructNode::Leaf { interval, .. } | StructNode::Grid { interval, .. } => interval,
        }
    }
}

/// Build the scratch tree over key-sorted `events`.
///
/// Per-level leaf/grid counts are added to `controller`.
pub(crate) fn build_structure<E: MdEvent<N>, const N: usize>(
    events: &[E],
    controller: &BoxController,
) -> StructNode {
    let domain = MortonInterval::domain(N);
    build_node::<E, N>(events, 0..events.len(), 0, domain, domain, controller)
}

fn build_node<E: MdEvent<N>, const N: usize>(
    events: &[E],
    range: Range<usize>,
    depth: usize,
    interval: MortonInterval,
    cell: MortonInterval,
    controller: &BoxController,
) -> StructNode {
    if range.len() <= controller.split_threshold() || depth >= controller.max_depth() {
        controller.inc_leaf(depth);
        return StructNode::Leaf {
            depth,
            range,
            interval,
            cell,
        };
    }

    let octants = split_octants::<E, N>(events, range.clone(), depth);
    let shift = (MORTON_BITS_PER_AXIS as usize - 1 - depth) * N;
    let child_lower = |octant: usize| cell.lower | ((octant as MortonKey) << shift);

    let last = octants.len() - 1;
    let plans: Vec<(Range<usize>, MortonInterval, MortonInterval)> = octants
        .iter()
        .enumerate()
        .map(|(i, (octant, child_range))| {
            let lower = if i == 0 {
                interval.lower
            } else {
                child_lower(*octant)
            };
            let upper = if i == last {
                interval.upper
            } else {
                child_lower(octants[i + 1].0) - 1
            };
            let child_cell =
                MortonInterval::cell_containing(child_lower(*octant), N, depth + 1);
            (
                child_range.clone(),
                MortonInterval::new(lower, upper),
                child_cell,
            )
        })
        .collect();

    let children: Vec<StructNode> = plans
        .into_par_iter()
        .map(|(child_range, child_interval, child_cell)| {
            build_node::<E, N>(
                events,
                child_range,
                depth + 1,
                child_interval,
                child_cell,
                controller,
            )
        })
        .collect();

    controller.inc_grid(depth);
    StructNode::Grid {
        depth,
        range,
        interval,
        children,
    }
}

/// Non-empty octants of a sorted run, in key order
fn split_octants<E: MdEvent<N>, const N: usize>(
    events: &[E],
    range: Range<usize>,
    depth: usize,
) -> Vec<(usize, Range<usize>)> {
    let run = &events[range.clone()];
    let mut octants = Vec::new();
    let mut start = 0;

    while start < run.len() {
        let octant = octant_of(run[start].index(), N, depth);
        let len = run[start..].partition_point(|e| octant_of(e.index(), N, depth) == octant);
        octants.push((octant, range.start + start..range.start + start + len));
        start += len;
    }

    octants
}
