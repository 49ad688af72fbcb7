// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Collaborator interfaces turning raw event values into index coordinates,
with table-driven implementations.

Both collaborators are cloned once per channel task so that any mutable
per-channel state stays private to the worker that owns it.
*/

use std::sync::Arc;

use crate::types::{Coord, IndexError, IndexResult, Signal, SourceError};

/// Converts a raw event value from the channel's native unit into the unit
/// of the first index axis.
pub trait UnitConversion: Clone + Send + Sync {
    /// Re-target the conversion at `channel` before its events are converted
    fn update_for_channel(&mut self, channel: usize) -> Result<(), SourceError>;

    fn convert(&mut self, value: f64) -> Result<f64, SourceError>;
}

/// Computes the coordinates of converted events.
pub trait CoordinateTransform: Clone + Send + Sync {
    /// Number of coordinates this transform produces
    fn num_dims(&self) -> usize;

    /// Fill in the channel-dependent coordinates once per channel.
    ///
    /// Returning `Ok(false)` skips the whole channel.
    fn channel_coordinates(
        &mut self,
        channel: usize,
        coords: &mut [Coord],
    ) -> Result<bool, SourceError>;

    /// Fill in the event-dependent coordinates of one converted value.
    ///
    /// May rescale `signal` and `error_squared`. Returning `Ok(false)` drops
    /// the event.
    fn event_coordinates(
        &mut self,
        value: f64,
        coords: &mut [Coord],
        signal: &mut Signal,
        error_squared: &mut Signal,
    ) -> Result<bool, SourceError>;
}

/// `value * factor + offset`, with an optional factor per channel
#[derive(Debug, Clone)]
pub struct LinearConversion {
    factors: Option<Arc<[f64]>>,
    offset: f64,
    factor: f64,
}

impl LinearConversion {
    pub fn identity() -> Self {
        Self::uniform(1.0, 0.0)
    }

    pub fn uniform(factor: f64, offset: f64) -> Self {
        Self {
            factors: None,
            offset,
            factor,
        }
    }

    pub fn per_channel(factors: Vec<f64>, offset: f64) -> Self {
        Self {
            factors: Some(factors.into()),
            offset,
            factor: 1.0,
        }
    }
}

impl UnitConversion for LinearConversion {
    fn update_for_channel(&mut self, channel: usize) -> Result<(), SourceError> {
        if let Some(factors) = &self.factors {
            self.factor = *factors.get(channel).ok_or_else(|| {
                SourceError::new(format!("no conversion factor for channel {}", channel))
            })?;
        }
        Ok(())
    }

    #[inline]
    fn convert(&mut self, value: f64) -> Result<f64, SourceError> {
        if !value.is_finite() {
            return Err(SourceError::new(format!("cannot convert value {}", value)));
        }
        Ok(value * self.factor + self.offset)
    }
}

/// Looks up the per-channel coordinates (axes 1..N) in a detector table; the
/// converted value becomes axis 0.
///
/// A NaN entry in a channel's row marks the channel as masked.
#[derive(Debug, Clone)]
pub struct DetectorTableTransform {
    num_dims: usize,
    table: Arc<[Vec<Coord>]>,
    corrections: Option<Arc<[Signal]>>,
    correction: Signal,
}

impl DetectorTableTransform {
    /// `table[channel]` must hold `num_dims - 1` coordinates.
    pub fn new(num_dims: usize, table: Vec<Vec<Coord>>) -> IndexResult<Self> {
        if num_dims == 0 {
            return Err(IndexError::configuration(
                "coordinate transform needs at least one axis",
            ));
        }
        if let Some((channel, row)) = table
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != num_dims - 1)
        {
            return Err(IndexError::configuration(format!(
                "detector table row {} has {} coordinates, expected {}",
                channel,
                row.len(),
                num_dims - 1
            )));
        }
        Ok(Self {
            num_dims,
            table: table.into(),
            corrections: None,
            correction: 1.0,
        })
    }

    /// Multiply each channel's signal by a correction factor (squared error
    /// by its square).
    pub fn with_corrections(mut self, corrections: Vec<Signal>) -> IndexResult<Self> {
        if corrections.len() != self.table.len() {
            return Err(IndexError::configuration(format!(
                "{} correction factors for {} channels",
                corrections.len(),
                self.table.len()
            )));
        }
        self.corrections = Some(corrections.into());
        Ok(self)
    }

    pub fn num_channels(&self) -> usize {
        self.table.len()
    }
}

impl CoordinateTransform for DetectorTableTransform {
    fn num_dims(&self) -> usize {
        self.num_dims
    }

    fn channel_coordinates(
        &mut self,
        channel: usize,
        coords: &mut [Coord],
    ) -> Result<bool, SourceError> {
        let row = self
            .table
            .get(channel)
            .ok_or_else(|| SourceError::new(format!("channel {} not in detector table", channel)))?;

        if row.iter().any(|c| c.is_nan()) {
            return Ok(false);
        }
        coords[1..].copy_from_slice(row);

        self.correction = match &self.corrections {
            Some(corrections) => corrections[channel],
            None => 1.0,
        };
        Ok(true)
    }

    #[inline]
    fn event_coordinates(
        &mut self,
        value: f64,
        coords: &mut [Coord],
        signal: &mut Signal,
        error_squared: &mut Signal,
    ) -> Result<bool, SourceError> {
        coords[0] = value as Coord;
        if self.correction != 1.0 {
            *signal *= self.correction;
            *error_squared *= self.correction * self.correction;
        }
        Ok(true)
    }
}
