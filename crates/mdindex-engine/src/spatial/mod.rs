// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Spatial primitives of the index space.

Implements Morton encoding (Z-order curve) over N quantized axes plus the
bounds box that maps coordinates onto quanta:
- Locality-preserving record ordering
- Aligned cells for every tree depth
- Coordinate recovery from keys
*/

pub mod bounds;
pub mod morton;

pub use bounds::{AxisExtent, SpaceBounds};
pub use morton::{
    cell_mask, morton_decode, morton_encode, octant_of, MortonInterval, MortonKey, MAX_DIMS,
    MIN_DIMS, MORTON_BITS_PER_AXIS, QUANTA_PER_AXIS,
};
