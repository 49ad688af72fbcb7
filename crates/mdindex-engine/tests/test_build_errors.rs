// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Rejected builds leave the target untouched.

mod common;

use std::any::Any;

use common::{point_source, uniform_points};
use mdindex_engine::{
    append_events, BoxSettings, BuildSettings, ChannelEvents, DetectorTableTransform,
    EventChannel, EventSource, EventVariant, IndexError, IndexTarget, LeanEvent,
    LinearConversion, MdEventIndex, SpaceBounds, TofEvent, WeightedEventNoTime,
};

/// Target declaring an arbitrary shape without matching storage
struct DeclaredOnly {
    dims: usize,
    variant: EventVariant,
}

impl IndexTarget for DeclaredOnly {
    fn num_dims(&self) -> usize {
        self.dims
    }

    fn event_variant(&self) -> EventVariant {
        self.variant
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn built_index() -> MdEventIndex<LeanEvent<2>, 2> {
    let bounds = SpaceBounds::<2>::uniform(0.0, 10.0).unwrap();
    let mut index =
        MdEventIndex::<LeanEvent<2>, 2>::new(bounds, BoxSettings::new(20, 4).unwrap()).unwrap();
    let (source, transform) = point_source(uniform_points(300, 2, 0.0, 10.0, 5), 3);
    append_events(
        &mut index,
        &source,
        &LinearConversion::identity(),
        &transform,
        &BuildSettings::default(),
    )
    .unwrap();
    index
}

#[test]
fn test_unsupported_dimensionality() {
    for dims in [0, 1, 9, 12] {
        let mut target = DeclaredOnly {
            dims,
            variant: EventVariant::Lean,
        };
        let transform = DetectorTableTransform::new(dims.max(1), vec![]).unwrap();
        let err = append_events(
            &mut target,
            &EventSource::default(),
            &LinearConversion::identity(),
            &transform,
            &BuildSettings::default(),
        )
        .unwrap_err();
        assert!(err.is_configuration(), "{} dims: {}", dims, err);
    }
}

#[test]
fn test_storage_must_match_declaration() {
    let mut target = DeclaredOnly {
        dims: 3,
        variant: EventVariant::Regular,
    };
    let transform = DetectorTableTransform::new(3, vec![]).unwrap();
    let err = append_events(
        &mut target,
        &EventSource::default(),
        &LinearConversion::identity(),
        &transform,
        &BuildSettings::default(),
    )
    .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_transform_dimension_mismatch_leaves_root() {
    let mut index = built_index();
    let before = index.root().clone();

    let (source, transform) = point_source(uniform_points(10, 3, 0.0, 1.0, 1), 1);
    let err = append_events(
        &mut index,
        &source,
        &LinearConversion::identity(),
        &transform,
        &BuildSettings::default(),
    )
    .unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(index.root(), &before);
}

#[test]
fn test_mixed_event_kinds_rejected() {
    let mut index = built_index();
    let before = index.root().clone();

    let source = EventSource::new(
        0,
        vec![
            EventChannel::new(
                0,
                ChannelEvents::Tof(vec![TofEvent {
                    tof: 1.0,
                    pulse_time: 0,
                }]),
            ),
            EventChannel::new(
                1,
                ChannelEvents::WeightedNoTime(vec![WeightedEventNoTime {
                    tof: 1.0,
                    weight: 1.0,
                    error_squared: 1.0,
                }]),
            ),
        ],
    );
    let transform = DetectorTableTransform::new(2, vec![vec![1.0], vec![2.0]]).unwrap();
    let err = append_events(
        &mut index,
        &source,
        &LinearConversion::identity(),
        &transform,
        &BuildSettings::default(),
    )
    .unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(index.root(), &before);
}

#[test]
fn test_data_error_aborts_and_leaves_root() {
    let mut index = built_index();
    let before = index.root().clone();
    let events_before = index.num_events();

    // only two conversion factors for three channels
    let (source, transform) = point_source(uniform_points(30, 2, 0.0, 10.0, 9), 3);
    let conversion = LinearConversion::per_channel(vec![1.0, 1.0], 0.0);
    let err = append_events(
        &mut index,
        &source,
        &conversion,
        &transform,
        &BuildSettings::default(),
    )
    .unwrap_err();

    match err {
        IndexError::Data { channel, .. } => assert_eq!(channel, 2),
        other => panic!("expected a data error, got {}", other),
    }
    assert_eq!(index.root(), &before);
    assert_eq!(index.num_events(), events_before);
}
