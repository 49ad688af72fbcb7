// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Event sources: raw per-channel events and the collaborators that convert
them into index coordinates.
*/

pub mod convert;
pub mod raw;

pub use convert::{CoordinateTransform, DetectorTableTransform, LinearConversion, UnitConversion};
pub use raw::{
    ChannelEvents, EventChannel, EventSource, RawEvent, RawEventKind, TofEvent, WeightedEvent,
    WeightedEventNoTime,
};
