// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-record Morton key assignment and coordinate recovery.

use rayon::prelude::*;

use crate::events::MdEvent;
use crate::spatial::SpaceBounds;

/// Compute every record's key from its coordinates
pub(crate) fn assign_keys<E: MdEvent<N>, const N: usize>(events: &mut [E], bounds: &SpaceBounds<N>) {
    events
        .par_iter_mut()
        .for_each(|event| event.retrieve_index(bounds));
}

/// Replace every record's coordinates by the centre of its key's quantum
pub(crate) fn recover_coordinates<E: MdEvent<N>, const N: usize>(
    events: &mut [E],
    bounds: &SpaceBounds<N>,
) {
    events
        .par_iter_mut()
        .for_each(|event| event.retrieve_coordinates(bounds));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{LeanEvent, Provenance};

    #[test]
    fn test_assign_then_recover() {
        let bounds = SpaceBounds::<3>::uniform(-1.0, 1.0).unwrap();
        let mut events: Vec<LeanEvent<3>> = (0..64)
            .map(|i| {
                let x = -1.0 + i as f32 / 32.0;
                LeanEvent::from_parts(1.0, 1.0, Provenance::default(), [x, -x * 0.5, 0.25])
            })
            .collect();
        let originals: Vec<[f32; 3]> = events.iter().map(|e| *e.center()).collect();

        assign_keys(&mut events, &bounds);
        for (event, original) in events.iter().zip(&originals) {
            assert_eq!(event.index(), bounds.morton_key(original));
        }

        recover_coordinates(&mut events, &bounds);
        for (event, original) in events.iter().zip(&originals) {
            for axis in 0..3 {
                assert!((event.center()[axis] - original[axis]).abs() <= bounds.resolution(axis));
            }
        }
    }
}
