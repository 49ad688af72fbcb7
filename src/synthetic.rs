// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Seeded synthetic event sources for benchmarking and smoke testing.
//!
//! Each channel gets a random detector position for axes 1..N; events carry
//! a random time-of-flight that converts linearly onto axis 0. The
//! conversion overshoots the upper bound slightly so some events are dropped,
//! and a fraction of channels can be masked out.

use mdindex_engine::{
    AxisExtent, ChannelEvents, Coord, DetectorTableTransform, EventChannel, EventSource,
    IndexResult, LinearConversion, RawEventKind, Signal, TofEvent, WeightedEvent,
    WeightedEventNoTime,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper end of generated time-of-flight values (microseconds)
const TOF_RANGE: f64 = 20_000.0;

/// Part of the generated axis-0 range that lands above the bounds
const OVERSHOOT: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticParams {
    pub num_dims: usize,
    pub channels: usize,
    pub events_per_channel: usize,
    pub kind: RawEventKind,
    /// Probability that a channel is masked
    pub masked_fraction: f64,
    /// Bounds of every axis
    pub min: Coord,
    pub max: Coord,
    pub run_index: u16,
    pub seed: u64,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            num_dims: 3,
            channels: 64,
            events_per_channel: 1000,
            kind: RawEventKind::Tof,
            masked_fraction: 0.0,
            min: -10.0,
            max: 10.0,
            run_index: 0,
            seed: 42,
        }
    }
}

/// A generated source with the collaborators and bounds it was made for
#[derive(Debug, Clone)]
pub struct SyntheticRun {
    pub source: EventSource,
    pub conversion: LinearConversion,
    pub transform: DetectorTableTransform,
    pub min: Vec<Coord>,
    pub max: Vec<Coord>,
    pub masked_channels: usize,
}

impl SyntheticRun {
    pub fn num_dims(&self) -> usize {
        self.min.len()
    }
}

/// Generate the source described by `params`.
///
/// Fails when the bounds are empty or not finite.
pub fn generate(params: &SyntheticParams) -> IndexResult<SyntheticRun> {
    AxisExtent::new(params.min, params.max).validate()?;
    let mut rng = StdRng::seed_from_u64(params.seed);
    let width = (params.max - params.min) as f64;
    let axes = params.num_dims.saturating_sub(1);

    let mut table = Vec::with_capacity(params.channels);
    let mut masked_channels = 0;
    for _ in 0..params.channels {
        if params.masked_fraction > 0.0 && rng.gen_bool(params.masked_fraction.min(1.0)) {
            masked_channels += 1;
            table.push(vec![Coord::NAN; axes]);
        } else {
            table.push((0..axes).map(|_| rng.gen_range(params.min..params.max)).collect());
        }
    }

    let channels = (0..params.channels)
        .map(|channel| {
            let events = random_events(&mut rng, params.kind, params.events_per_channel);
            EventChannel::new(1000 + channel as u32, events)
        })
        .collect();

    let conversion =
        LinearConversion::uniform(width * (1.0 + OVERSHOOT) / TOF_RANGE, params.min as f64);
    let transform = DetectorTableTransform::new(params.num_dims, table)?;

    debug!(
        target: "mdindex",
        "Generated {} {} events in {} channels ({} masked), seed {}",
        params.channels * params.events_per_channel,
        params.kind,
        params.channels,
        masked_channels,
        params.seed
    );

    Ok(SyntheticRun {
        source: EventSource::new(params.run_index, channels),
        conversion,
        transform,
        min: vec![params.min; params.num_dims],
        max: vec![params.max; params.num_dims],
        masked_channels,
    })
}

fn random_events(rng: &mut StdRng, kind: RawEventKind, count: usize) -> ChannelEvents {
    match kind {
        RawEventKind::Tof => ChannelEvents::Tof(
            (0..count)
                .map(|_| TofEvent {
                    tof: rng.gen_range(0.0..TOF_RANGE),
                    pulse_time: rng.gen_range(0..1_000_000),
                })
                .collect(),
        ),
        RawEventKind::Weighted => ChannelEvents::Weighted(
            (0..count)
                .map(|_| {
                    let weight: Signal = rng.gen_range(0.5..1.5);
                    WeightedEvent {
                        tof: rng.gen_range(0.0..TOF_RANGE),
                        pulse_time: rng.gen_range(0..1_000_000),
                        weight,
                        error_squared: weight,
                    }
                })
                .collect(),
        ),
        RawEventKind::WeightedNoTime => ChannelEvents::WeightedNoTime(
            (0..count)
                .map(|_| {
                    let weight: Signal = rng.gen_range(0.5..1.5);
                    WeightedEventNoTime {
                        tof: rng.gen_range(0.0..TOF_RANGE),
                        weight,
                        error_squared: weight,
                    }
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_source() {
        let params = SyntheticParams {
            channels: 4,
            events_per_channel: 10,
            ..SyntheticParams::default()
        };
        let a = generate(&params).unwrap();
        let b = generate(&params).unwrap();
        assert_eq!(a.source, b.source);
        assert_eq!(a.source.total_events(), 40);
        assert_eq!(a.num_dims(), 3);
    }

    #[test]
    fn test_kind_is_respected() {
        let params = SyntheticParams {
            kind: RawEventKind::WeightedNoTime,
            channels: 2,
            events_per_channel: 3,
            ..SyntheticParams::default()
        };
        let run = generate(&params).unwrap();
        assert_eq!(run.source.event_kind(), Ok(Some(RawEventKind::WeightedNoTime)));
    }

    #[test]
    fn test_fully_masked() {
        let params = SyntheticParams {
            masked_fraction: 1.0,
            channels: 5,
            events_per_channel: 1,
            ..SyntheticParams::default()
        };
        assert_eq!(generate(&params).unwrap().masked_channels, 5);
    }

    #[test]
    fn test_empty_bounds_rejected() {
        let params = SyntheticParams {
            min: 1.0,
            max: 1.0,
            ..SyntheticParams::default()
        };
        assert!(generate(&params).unwrap_err().is_configuration());
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        let params = SyntheticParams {
            max: f32::INFINITY,
            ..SyntheticParams::default()
        };
        let err = generate(&params).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("non-finite"));
    }
}
