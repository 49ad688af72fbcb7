// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Event transformer: raw channel events to bounded N-dimensional records.

Channels are converted in parallel, each with its own clone of the
conversion and coordinate collaborators. Per-channel buffers are merged in
channel order, so the merged record order is independent of scheduling.
*/

use rayon::prelude::*;
use tracing::trace;

use crate::events::{MdEvent, Provenance};
use crate::source::{CoordinateTransform, EventChannel, RawEvent, UnitConversion};
use crate::spatial::SpaceBounds;
use crate::types::{Coord, IndexError, IndexResult};

/// Records accepted from a source, in channel order
#[derive(Debug)]
pub(crate) struct TransformedEvents<E> {
    pub events: Vec<E>,
    pub dropped: usize,
}

struct ChannelOutput<E> {
    events: Vec<E>,
    dropped: usize,
}

impl<E> ChannelOutput<E> {
    fn skipped(dropped: usize) -> Self {
        Self {
            events: Vec::new(),
            dropped,
        }
    }
}

pub(crate) fn transform_events<R, E, U, T, const N: usize>(
    run_index: u16,
    channels: &[EventChannel],
    conversion: &U,
    transform: &T,
    bounds: &SpaceBounds<N>,
) -> IndexResult<TransformedEvents<E>>
where
    R: RawEvent,
    E: MdEvent<N>,
    U: UnitConversion,
    T: CoordinateTransform,
{
    let outputs = channels
        .par_iter()
        .enumerate()
        .map(|(channel, events)| {
            convert_channel::<R, E, U, T, N>(
                channel, run_index, events, conversion, transform, bounds,
            )
        })
        .collect::<IndexResult<Vec<_>>>()?;

    let accepted: usize = outputs.iter().map(|o| o.events.len()).sum();
    let mut merged = TransformedEvents {
        events: Vec::with_capacity(accepted),
        dropped: 0,
    };
    for output in outputs {
        merged.events.extend(output.events);
        merged.dropped += output.dropped;
    }

    Ok(merged)
}

fn convert_channel<R, E, U, T, const N: usize>(
    channel: usize,
    run_index: u16,
    source: &EventChannel,
    conversion: &U,
    transform: &T,
    bounds: &SpaceBounds<N>,
) -> IndexResult<ChannelOutput<E>>
where
    R: RawEvent,
    E: MdEvent<N>,
    U: UnitConversion,
    T: CoordinateTransform,
{
    let raw = R::events_in(&source.events).ok_or_else(|| {
        IndexError::configuration(format!(
            "channel {} holds {} events, expected {}",
            channel,
            source.events.kind(),
            R::KIND
        ))
    })?;
    if raw.is_empty() {
        return Ok(ChannelOutput::skipped(0));
    }

    let mut conversion = conversion.clone();
    let mut transform = transform.clone();
    let mut coords: [Coord; N] = [0.0; N];

    conversion
        .update_for_channel(channel)
        .map_err(|e| IndexError::data(channel, e))?;
    let in_range = transform
        .channel_coordinates(channel, &mut coords)
        .map_err(|e| IndexError::data(channel, e))?;
    if !in_range {
        trace!(
            target: "mdindex-engine",
            "[TRANSFORM] skipping channel {} (detector {}), {} events",
            channel,
            source.detector_id,
            raw.len()
        );
        return Ok(ChannelOutput::skipped(raw.len()));
    }

    let provenance = Provenance {
        run_index,
        detector_id: source.detector_id,
    };
    let mut output = ChannelOutput {
        events: Vec::with_capacity(raw.len()),
        dropped: 0,
    };

    for event in raw {
        let value = conversion
            .convert(event.tof())
            .map_err(|e| IndexError::data(channel, e))?;
        let mut signal = event.weight();
        let mut error_squared = event.error_squared();

        let keep = transform
            .event_coordinates(value, &mut coords, &mut signal, &mut error_squared)
            .map_err(|e| IndexError::data(channel, e))?;
        if !keep || !bounds.contains(&coords) {
            output.dropped += 1;
            continue;
        }

        output
            .events
            .push(E::from_parts(signal, error_squared, provenance, coords));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RegularEvent;
    use crate::source::{
        ChannelEvents, DetectorTableTransform, LinearConversion, TofEvent, WeightedEvent,
    };

    fn tof(values: &[f64]) -> ChannelEvents {
        ChannelEvents::Tof(
            values
                .iter()
                .map(|&tof| TofEvent { tof, pulse_time: 0 })
                .collect(),
        )
    }

    #[test]
    fn test_filters_out_of_bounds_and_keeps_channel_order() {
        let bounds = SpaceBounds::<2>::uniform(0.0, 10.0).unwrap();
        let channels = vec![
            EventChannel::new(100, tof(&[1.0, 10.0, 2.0])),
            EventChannel::new(101, tof(&[-1.0, 3.0])),
        ];
        let transform = DetectorTableTransform::new(2, vec![vec![5.0], vec![6.0]]).unwrap();

        let out = transform_events::<TofEvent, RegularEvent<2>, _, _, 2>(
            7,
            &channels,
            &LinearConversion::identity(),
            &transform,
            &bounds,
        )
        .unwrap();

        let centers: Vec<[Coord; 2]> = out.events.iter().map(|e| *e.center()).collect();
        assert_eq!(centers, vec![[1.0, 5.0], [2.0, 5.0], [3.0, 6.0]]);
        assert_eq!(out.dropped, 2);
        assert_eq!(out.events[2].detector_id(), 101);
        assert_eq!(out.events[0].run_index(), 7);
    }

    #[test]
    fn test_masked_channel_is_skipped() {
        let bounds = SpaceBounds::<2>::uniform(0.0, 10.0).unwrap();
        let channels = vec![
            EventChannel::new(1, tof(&[1.0, 2.0])),
            EventChannel::new(2, tof(&[3.0])),
        ];
        let transform =
            DetectorTableTransform::new(2, vec![vec![f32::NAN], vec![1.0]]).unwrap();

        let out = transform_events::<TofEvent, RegularEvent<2>, _, _, 2>(
            0,
            &channels,
            &LinearConversion::identity(),
            &transform,
            &bounds,
        )
        .unwrap();
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.dropped, 2);
    }

    #[test]
    fn test_conversion_failure_names_channel() {
        let bounds = SpaceBounds::<2>::uniform(0.0, 10.0).unwrap();
        let channels = vec![
            EventChannel::new(1, tof(&[1.0])),
            EventChannel::new(2, tof(&[f64::NAN])),
        ];
        let transform = DetectorTableTransform::new(2, vec![vec![1.0], vec![1.0]]).unwrap();

        let err = transform_events::<TofEvent, RegularEvent<2>, _, _, 2>(
            0,
            &channels,
            &LinearConversion::identity(),
            &transform,
            &bounds,
        )
        .unwrap_err();
        assert!(matches!(err, IndexError::Data { channel: 1, .. }));
    }

    #[test]
    fn test_weighted_events_carry_signal() {
        let bounds = SpaceBounds::<2>::uniform(0.0, 10.0).unwrap();
        let channels = vec![EventChannel::new(
            1,
            ChannelEvents::Weighted(vec![WeightedEvent {
                tof: 4.0,
                pulse_time: 12,
                weight: 2.5,
                error_squared: 0.5,
            }]),
        )];
        let transform = DetectorTableTransform::new(2, vec![vec![1.0]]).unwrap();

        let out = transform_events::<WeightedEvent, RegularEvent<2>, _, _, 2>(
            0,
            &channels,
            &LinearConversion::uniform(2.0, 0.0),
            &transform,
            &bounds,
        )
        .unwrap();
        assert_eq!(out.events[0].signal(), 2.5);
        assert_eq!(out.events[0].error_squared(), 0.5);
        assert_eq!(out.events[0].center(), &[8.0, 1.0]);
    }
}
