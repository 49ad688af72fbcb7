// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Parallel sort of records by Morton key.

use rayon::prelude::*;

use crate::events::MdEvent;

/// Ascending by key. Stable: equal keys keep their input order.
pub(crate) fn sort_by_index<E: MdEvent<N>, const N: usize>(events: &mut [E]) {
    events.par_sort_by_key(|event| event.index());
}
