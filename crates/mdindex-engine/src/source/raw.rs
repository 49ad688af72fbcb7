// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Raw per-channel events as produced by an acquisition system.
*/

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::events::Provenance;
use crate::types::Signal;

/// Raw event representation carried by a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawEventKind {
    Tof,
    Weighted,
    WeightedNoTime,
}

impl fmt::Display for RawEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawEventKind::Tof => write!(f, "tof"),
            RawEventKind::Weighted => write!(f, "weighted"),
            RawEventKind::WeightedNoTime => write!(f, "weighted_no_time"),
        }
    }
}

/// Time-of-flight event with unit weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TofEvent {
    pub tof: f64,
    pub pulse_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedEvent {
    pub tof: f64,
    pub pulse_time: i64,
    pub weight: Signal,
    pub error_squared: Signal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedEventNoTime {
    pub tof: f64,
    pub weight: Signal,
    pub error_squared: Signal,
}

/// Common view over the raw event representations.
pub trait RawEvent: Copy + Send + Sync + 'static {
    const KIND: RawEventKind;

    /// Value in the channel's native unit, converted into the first axis
    fn tof(&self) -> f64;
    fn weight(&self) -> Signal;
    fn error_squared(&self) -> Signal;

    /// The channel's events, if they are of this representation
    fn events_in(events: &ChannelEvents) -> Option<&[Self]>;
}

impl RawEvent for TofEvent {
    const KIND: RawEventKind = RawEventKind::Tof;

    #[inline]
    fn tof(&self) -> f64 {
        self.tof
    }

    #[inline]
    fn weight(&self) -> Signal {
        1.0
    }

    #[inline]
    fn error_squared(&self) -> Signal {
        1.0
    }

    fn events_in(events: &ChannelEvents) -> Option<&[Self]> {
        match events {
            ChannelEvents::Tof(events) => Some(events),
            _ => None,
        }
    }
}

impl RawEvent for WeightedEvent {
    const KIND: RawEventKind = RawEventKind::Weighted;

    #[inline]
    fn tof(&self) -> f64 {
        self.tof
    }

    #[inline]
    fn weight(&self) -> Signal {
        self.weight
    }

    #[inline]
    fn error_squared(&self) -> Signal {
        self.error_squared
    }

    fn events_in(events: &ChannelEvents) -> Option<&[Self]> {
        match events {
            ChannelEvents::Weighted(events) => Some(events),
            _ => None,
        }
    }
}

impl RawEvent for WeightedEventNoTime {
    const KIND: RawEventKind = RawEventKind::WeightedNoTime;

    #[inline]
    fn tof(&self) -> f64 {
        self.tof
    }

    #[inline]
    fn weight(&self) -> Signal {
        self.weight
    }

    #[inline]
    fn error_squared(&self) -> Signal {
        self.error_squared
    }

    fn events_in(events: &ChannelEvents) -> Option<&[Self]> {
        match events {
            ChannelEvents::WeightedNoTime(events) => Some(events),
            _ => None,
        }
    }
}

/// Events of one channel, all of one representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChannelEvents {
    Tof(Vec<TofEvent>),
    Weighted(Vec<WeightedEvent>),
    WeightedNoTime(Vec<WeightedEventNoTime>),
}

impl ChannelEvents {
    pub fn kind(&self) -> RawEventKind {
        match self {
            ChannelEvents::Tof(_) => RawEventKind::Tof,
            ChannelEvents::Weighted(_) => RawEventKind::Weighted,
            ChannelEvents::WeightedNoTime(_) => RawEventKind::WeightedNoTime,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChannelEvents::Tof(events) => events.len(),
            ChannelEvents::Weighted(events) => events.len(),
            ChannelEvents::WeightedNoTime(events) => events.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One detector channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventChannel {
    pub detector_id: u32,
    pub events: ChannelEvents,
}

impl EventChannel {
    pub fn new(detector_id: u32, events: ChannelEvents) -> Self {
        Self {
            detector_id,
            events,
        }
    }
}

/// Closed set of raw events for one build
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventSource {
    pub run_index: u16,
    pub channels: Vec<EventChannel>,
}

impl EventSource {
    pub fn new(run_index: u16, channels: Vec<EventChannel>) -> Self {
        Self {
            run_index,
            channels,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn total_events(&self) -> usize {
        self.channels.iter().map(|c| c.events.len()).sum()
    }

    /// Provenance of events in channel `channel`
    pub fn provenance(&self, channel: usize) -> Provenance {
        Provenance {
            run_index: self.run_index,
            detector_id: self.channels[channel].detector_id,
        }
    }

    /// The single raw representation shared by every channel.
    ///
    /// Returns `Err` with the two conflicting kinds when channels disagree,
    /// and `Ok(None)` when there are no channels.
    pub fn event_kind(&self) -> Result<Option<RawEventKind>, (RawEventKind, RawEventKind)> {
        let mut kind = None;
        for channel in &self.channels {
            let channel_kind = channel.events.kind();
            match kind {
                None => kind = Some(channel_kind),
                Some(k) if k != channel_kind => return Err((k, channel_kind)),
                _ => {}
            }
        }
        Ok(kind)
    }
}
