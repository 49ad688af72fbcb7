// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Normalized N-dimensional event records.

Two storage variants exist:
- `LeanEvent`: signal, squared error, coordinates and Morton key
- `RegularEvent`: the same plus run index and detector id provenance

Both implement [`MdEvent`], which is what the pipeline is generic over.
*/

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::spatial::{MortonKey, SpaceBounds};
use crate::types::{Coord, Signal};

/// Record storage variant declared by an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventVariant {
    Lean,
    Regular,
}

impl fmt::Display for EventVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventVariant::Lean => write!(f, "lean"),
            EventVariant::Regular => write!(f, "regular"),
        }
    }
}

/// Where an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Provenance {
    pub run_index: u16,
    pub detector_id: u32,
}

/// An index record with N coordinates.
pub trait MdEvent<const N: usize>: Clone + Send + Sync + 'static {
    const VARIANT: EventVariant;

    /// Build a record. Lean records discard the provenance.
    fn from_parts(
        signal: Signal,
        error_squared: Signal,
        provenance: Provenance,
        center: [Coord; N],
    ) -> Self;

    fn signal(&self) -> Signal;
    fn error_squared(&self) -> Signal;
    fn center(&self) -> &[Coord; N];
    fn center_mut(&mut self) -> &mut [Coord; N];
    fn index(&self) -> MortonKey;
    fn set_index(&mut self, key: MortonKey);

    /// `None` for lean records
    fn provenance(&self) -> Option<Provenance>;

    /// Compute and store the Morton key of this record's coordinates
    #[inline]
    fn retrieve_index(&mut self, bounds: &SpaceBounds<N>) {
        let key = bounds.morton_key(self.center());
        self.set_index(key);
    }

    /// Replace the coordinates by the centre of the key's quantum
    #[inline]
    fn retrieve_coordinates(&mut self, bounds: &SpaceBounds<N>) {
        *self.center_mut() = bounds.coordinates_of(self.index());
    }
}

/// Record without provenance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeanEvent<const N: usize> {
    signal: Signal,
    error_squared: Signal,
    center: [Coord; N],
    index: MortonKey,
}

impl<const N: usize> MdEvent<N> for LeanEvent<N> {
    const VARIANT: EventVariant = EventVariant::Lean;

    fn from_parts(
        signal: Signal,
        error_squared: Signal,
        _provenance: Provenance,
        center: [Coord; N],
    ) -> Self {
        Self {
            signal,
            error_squared,
            center,
            index: 0,
        }
    }

    #[inline]
    fn signal(&self) -> Signal {
        self.signal
    }

    #[inline]
    fn error_squared(&self) -> Signal {
        self.error_squared
    }

    #[inline]
    fn center(&self) -> &[Coord; N] {
        &self.center
    }

    #[inline]
    fn center_mut(&mut self) -> &mut [Coord; N] {
        &mut self.center
    }

    #[inline]
    fn index(&self) -> MortonKey {
        self.index
    }

    #[inline]
    fn set_index(&mut self, key: MortonKey) {
        self.index = key;
    }

    fn provenance(&self) -> Option<Provenance> {
        None
    }
}

/// Record carrying run index and detector id
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegularEvent<const N: usize> {
    signal: Signal,
    error_squared: Signal,
    run_index: u16,
    detector_id: u32,
    center: [Coord; N],
    index: MortonKey,
}

impl<const N: usize> RegularEvent<N> {
    pub fn run_index(&self) -> u16 {
        self.run_index
    }

    pub fn detector_id(&self) -> u32 {
        self.detector_id
    }
}

impl<const N: usize> MdEvent<N> for RegularEvent<N> {
    const VARIANT: EventVariant = EventVariant::Regular;

    fn from_parts(
        signal: Signal,
        error_squared: Signal,
        provenance: Provenance,
        center: [Coord; N],
    ) -> Self {
        Self {
            signal,
            error_squared,
            run_index: provenance.run_index,
            detector_id: provenance.detector_id,
            center,
            index: 0,
        }
    }

    #[inline]
    fn signal(&self) -> Signal {
        self.signal
    }

    #[inline]
    fn error_squared(&self) -> Signal {
        self.error_squared
    }

    #[inline]
    fn center(&self) -> &[Coord; N] {
        &self.center
    }

    #[inline]
    fn center_mut(&mut self) -> &mut [Coord; N] {
        &mut self.center
    }

    #[inline]
    fn index(&self) -> MortonKey {
        self.index
    }

    #[inline]
    fn set_index(&mut self, key: MortonKey) {
        self.index = key;
    }

    fn provenance(&self) -> Option<Provenance> {
        Some(Provenance {
            run_index: self.run_index,
            detector_id: self.detector_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lean_event_drops_provenance() {
        let provenance = Provenance {
            run_index: 3,
            detector_id: 42,
        };
        let event = LeanEvent::<2>::from_parts(2.0, 4.0, provenance, [1.0, 2.0]);
        assert_eq!(event.provenance(), None);
        assert_eq!(event.signal(), 2.0);
        assert_eq!(event.error_squared(), 4.0);
        assert_eq!(LeanEvent::<2>::VARIANT, EventVariant::Lean);
    }

    #[test]
    fn test_regular_event_keeps_provenance() {
        let provenance = Provenance {
            run_index: 3,
            detector_id: 42,
        };
        let event = RegularEvent::<3>::from_parts(1.0, 1.0, provenance, [0.0, 1.0, 2.0]);
        assert_eq!(event.provenance(), Some(provenance));
        assert_eq!(event.run_index(), 3);
        assert_eq!(event.detector_id(), 42);
        assert_eq!(RegularEvent::<3>::VARIANT, EventVariant::Regular);
    }

    #[test]
    fn test_index_then_recover_coordinates() {
        let bounds = SpaceBounds::<2>::uniform(0.0, 1.0).unwrap();
        let mut event = LeanEvent::<2>::from_parts(1.0, 1.0, Provenance::default(), [0.25, 0.75]);

        event.retrieve_index(&bounds);
        assert_eq!(event.index(), bounds.morton_key(&[0.25, 0.75]));

        event.retrieve_coordinates(&bounds);
        let center = event.center();
        assert!((center[0] - 0.25).abs() <= bounds.resolution(0));
        assert!((center[1] - 0.75).abs() <= bounds.resolution(1));
        // key is stable under recovery
        let key = event.index();
        event.retrieve_index(&bounds);
        assert_eq!(event.index(), key);
    }
}
