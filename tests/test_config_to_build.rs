// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end: configuration file -> service -> synthetic build.

use std::fs;

use mdindex::engine::{
    EventVariant, IndexNode, LeanEvent, MdEvent, MdEventIndex, RawEventKind, RegularEvent,
};
use mdindex::services::IndexService;
use mdindex::synthetic::{generate, SyntheticParams};
use tempfile::tempdir;

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mdindex_configuration.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

fn check_leaves<E: MdEvent<N>, const N: usize>(
    node: &IndexNode<E, N>,
    threshold: usize,
    max_depth: usize,
) {
    match node {
        IndexNode::Leaf(leaf) => {
            assert!(leaf.events.len() <= threshold || leaf.depth == max_depth);
            for event in &leaf.events {
                assert!(leaf.extents.contains(event.center()));
                assert!(leaf.interval.contains(event.index()));
            }
        }
        IndexNode::Grid(grid) => {
            assert!(grid.depth < max_depth);
            for child in &grid.children {
                check_leaves(child, threshold, max_depth);
            }
        }
    }
}

#[test]
fn test_configured_build_honours_box_settings() {
    let (_dir, path) = write_config(
        r#"
        [box_controller]
        split_threshold = 50
        max_depth = 6

        [build]
        num_threads = 2
        "#,
    );
    let service = IndexService::load(Some(&path), None).unwrap();
    assert_eq!(service.box_settings().split_threshold, 50);

    let run = generate(&SyntheticParams {
        num_dims: 3,
        channels: 16,
        events_per_channel: 200,
        seed: 7,
        ..SyntheticParams::default()
    })
    .unwrap();
    let mut target = service
        .create_index(3, EventVariant::Lean, &run.min, &run.max)
        .unwrap();

    let summary = service
        .run_build(target.as_mut(), &run.source, &run.conversion, &run.transform)
        .unwrap();

    assert_eq!(summary.accepted_events + summary.dropped_events, 3200);
    assert!(summary.dropped_events > 0, "overshoot should drop some events");
    assert!(summary.grid_count > 0);

    let index = target
        .as_any()
        .downcast_ref::<MdEventIndex<LeanEvent<3>, 3>>()
        .unwrap();
    assert_eq!(index.num_events(), summary.accepted_events);
    check_leaves(index.root(), 50, 6);
}

#[test]
fn test_regular_records_keep_provenance() {
    let (_dir, path) = write_config("[box_controller]\nsplit_threshold = 20\n");
    let service = IndexService::load(Some(&path), None).unwrap();

    let run = generate(&SyntheticParams {
        num_dims: 2,
        channels: 4,
        events_per_channel: 50,
        kind: RawEventKind::Weighted,
        run_index: 9,
        ..SyntheticParams::default()
    })
    .unwrap();
    let mut target = service
        .create_index(2, EventVariant::Regular, &run.min, &run.max)
        .unwrap();
    service
        .run_build(target.as_mut(), &run.source, &run.conversion, &run.transform)
        .unwrap();

    let index = target
        .as_any()
        .downcast_ref::<MdEventIndex<RegularEvent<2>, 2>>()
        .unwrap();
    let detectors: Vec<u32> = run.source.channels.iter().map(|c| c.detector_id).collect();
    for leaf in index.root().leaves() {
        for event in &leaf.events {
            assert_eq!(event.run_index(), 9);
            assert!(detectors.contains(&event.detector_id()));
        }
    }
}

#[test]
fn test_masked_channels_contribute_nothing() {
    let service = IndexService::from_config(Default::default()).unwrap();
    let run = generate(&SyntheticParams {
        num_dims: 4,
        channels: 8,
        events_per_channel: 25,
        masked_fraction: 1.0,
        ..SyntheticParams::default()
    })
    .unwrap();
    let mut target = service
        .create_index(4, EventVariant::Lean, &run.min, &run.max)
        .unwrap();

    let summary = service
        .run_build(target.as_mut(), &run.source, &run.conversion, &run.transform)
        .unwrap();

    assert_eq!(summary.accepted_events, 0);
    assert_eq!(summary.leaf_count, 1);
    assert_eq!(summary.grid_count, 0);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let (_dir, path) = write_config("[box_controller]\nmax_depth = 40\n");
    assert!(IndexService::load(Some(&path), None).is_err());
}
