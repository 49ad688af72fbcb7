// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use mdindex_engine::{
    ChannelEvents, Coord, CoordinateTransform, EventChannel, EventSource, IndexNode, MdEvent,
    Signal, SourceError, SpaceBounds, TofEvent,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Coordinate transform that treats an event's value as a row number into
/// a table of explicit points. Lets tests place events anywhere.
#[derive(Debug, Clone)]
pub struct PointTableTransform {
    num_dims: usize,
    points: Arc<Vec<Vec<Coord>>>,
}

impl PointTableTransform {
    pub fn new(num_dims: usize, points: Vec<Vec<Coord>>) -> Self {
        Self {
            num_dims,
            points: Arc::new(points),
        }
    }
}

impl CoordinateTransform for PointTableTransform {
    fn num_dims(&self) -> usize {
        self.num_dims
    }

    fn channel_coordinates(
        &mut self,
        _channel: usize,
        _coords: &mut [Coord],
    ) -> Result<bool, SourceError> {
        Ok(true)
    }

    fn event_coordinates(
        &mut self,
        value: f64,
        coords: &mut [Coord],
        _signal: &mut Signal,
        _error_squared: &mut Signal,
    ) -> Result<bool, SourceError> {
        let point = self
            .points
            .get(value as usize)
            .ok_or_else(|| SourceError::new(format!("no point {}", value)))?;
        coords.copy_from_slice(point);
        Ok(true)
    }
}

/// Spread `points` round-robin over `channels` channels; each event's value
/// is its point's row.
pub fn point_source(points: Vec<Vec<Coord>>, channels: usize) -> (EventSource, PointTableTransform) {
    let num_dims = points.first().map(|p| p.len()).unwrap_or(2);
    let mut per_channel: Vec<Vec<TofEvent>> = vec![Vec::new(); channels];
    for row in 0..points.len() {
        per_channel[row % channels].push(TofEvent {
            tof: row as f64,
            pulse_time: row as i64,
        });
    }

    let source = EventSource::new(
        0,
        per_channel
            .into_iter()
            .enumerate()
            .map(|(ch, events)| EventChannel::new(ch as u32, ChannelEvents::Tof(events)))
            .collect(),
    );
    (source, PointTableTransform::new(num_dims, points))
}

/// `count` points uniformly distributed in `[min, max)^num_dims`
pub fn uniform_points(count: usize, num_dims: usize, min: Coord, max: Coord, seed: u64) -> Vec<Vec<Coord>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..num_dims).map(|_| rng.gen_range(min..max)).collect())
        .collect()
}

/// Assert every structural property of a built tree.
pub fn check_tree<E: MdEvent<N>, const N: usize>(
    root: &IndexNode<E, N>,
    bounds: &SpaceBounds<N>,
    split_threshold: usize,
    max_depth: usize,
    expected_events: usize,
) {
    check_node(root, bounds, split_threshold, max_depth);

    let leaves = root.leaves();
    let total: usize = leaves.iter().map(|leaf| leaf.events.len()).sum();
    assert_eq!(total, expected_events, "leaf counts must sum to accepted events");
    assert_eq!(root.event_count(), expected_events);

    let mut previous = None;
    for leaf in &leaves {
        for event in &leaf.events {
            if let Some(prev) = previous {
                assert!(prev <= event.index(), "keys must not decrease across leaves");
            }
            previous = Some(event.index());
        }
    }
}

fn check_node<E: MdEvent<N>, const N: usize>(
    node: &IndexNode<E, N>,
    bounds: &SpaceBounds<N>,
    split_threshold: usize,
    max_depth: usize,
) {
    match node {
        IndexNode::Leaf(leaf) => {
            assert!(
                leaf.events.len() <= split_threshold || leaf.depth == max_depth,
                "leaf at depth {} holds {} events",
                leaf.depth,
                leaf.events.len()
            );
            for event in &leaf.events {
                assert!(leaf.interval.contains(event.index()));
                assert!(leaf.extents.contains(event.center()));
                assert!(bounds.contains(event.center()));
            }
        }
        IndexNode::Grid(grid) => {
            assert!(!grid.children.is_empty());
            let first = grid.children[0].interval();
            let last = grid.children[grid.children.len() - 1].interval();
            assert_eq!(first.lower, grid.interval.lower);
            assert_eq!(last.upper, grid.interval.upper);
            for pair in grid.children.windows(2) {
                assert_eq!(
                    pair[0].interval().upper + 1,
                    pair[1].interval().lower,
                    "children intervals must tile the parent"
                );
            }

            let mut union = *grid.children[0].extents();
            for child in &grid.children {
                assert_eq!(child.depth(), grid.depth + 1);
                union = union.union(child.extents());
                check_node(child, bounds, split_threshold, max_depth);
            }
            assert_eq!(grid.extents, union, "grid box must be the union of its children");
            assert_eq!(
                grid.event_count,
                grid.children.iter().map(|c| c.event_count()).sum::<usize>()
            );
        }
    }
}
