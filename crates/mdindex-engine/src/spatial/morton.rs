// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Morton encoding utilities for N-dimensional index keys.

Implements Z-order curve encoding to preserve spatial locality. Every axis is
quantized to [`MORTON_BITS_PER_AXIS`] bits and the per-axis bits are
interleaved into a single [`MortonKey`], axis 0 occupying the lowest bit of
each interleaved group.
*/

use serde::{Deserialize, Serialize};

/// Interleaved Z-order key
pub type MortonKey = u128;

/// Quantization width of a single axis.
pub const MORTON_BITS_PER_AXIS: u32 = 16;

/// Largest supported dimensionality (8 axes x 16 bits = 128 key bits).
pub const MAX_DIMS: usize = 8;

/// Smallest supported dimensionality.
pub const MIN_DIMS: usize = 2;

/// Number of quanta along one axis
pub const QUANTA_PER_AXIS: u32 = 1 << MORTON_BITS_PER_AXIS;

/// Morton encode N quantized axis values into a single key.
///
/// Each value is limited to [`MORTON_BITS_PER_AXIS`] bits.
#[inline]
pub fn morton_encode<const N: usize>(axes: &[u32; N]) -> MortonKey {
    debug_assert!(N <= MAX_DIMS, "dimensionality exceeds key width");

    let mut result: MortonKey = 0;

    // Interleave bits: ...x1(N-1)..x1(1)x1(0) x0(N-1)..x0(1)x0(0)
    for bit in 0..MORTON_BITS_PER_AXIS {
        for (axis, &value) in axes.iter().enumerate() {
            debug_assert!(value < QUANTA_PER_AXIS, "axis value exceeds 16-bit limit");
            let b = ((value >> bit) & 1) as MortonKey;
            result |= b << (bit as usize * N + axis);
        }
    }

    result
}

/// Morton decode a key back to its N quantized axis values.
#[inline]
pub fn morton_decode<const N: usize>(key: MortonKey) -> [u32; N] {
    let mut axes = [0u32; N];

    for bit in 0..MORTON_BITS_PER_AXIS {
        for (axis, value) in axes.iter_mut().enumerate() {
            let b = ((key >> (bit as usize * N + axis)) & 1) as u32;
            *value |= b << bit;
        }
    }

    axes
}

/// Mask of the key bits below the cell prefix of a node at `depth`.
///
/// At depth 0 the whole key is below the prefix; each level consumes one
/// interleaved group of `n_dims` bits.
#[inline]
pub fn cell_mask(n_dims: usize, depth: usize) -> MortonKey {
    let levels = (MORTON_BITS_PER_AXIS as usize).saturating_sub(depth);
    let bits = levels * n_dims;
    if bits >= MortonKey::BITS as usize {
        MortonKey::MAX
    } else {
        (1 << bits) - 1
    }
}

/// Octant index of `key` inside the cell it occupies at `depth`.
///
/// This is the interleaved bit group that splits a node at `depth` into its
/// children.
#[inline]
pub fn octant_of(key: MortonKey, n_dims: usize, depth: usize) -> usize {
    debug_assert!(depth < MORTON_BITS_PER_AXIS as usize);
    let group = MORTON_BITS_PER_AXIS as usize - 1 - depth;
    let octant_mask: MortonKey = (1 << n_dims) - 1;
    ((key >> (group * n_dims)) & octant_mask) as usize
}

/// Inclusive range of Morton keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MortonInterval {
    pub lower: MortonKey,
    pub upper: MortonKey,
}

impl MortonInterval {
    pub fn new(lower: MortonKey, upper: MortonKey) -> Self {
        debug_assert!(lower <= upper, "inverted Morton interval");
        Self { lower, upper }
    }

    /// The whole key domain of an `n_dims`-dimensional space
    pub fn domain(n_dims: usize) -> Self {
        Self::new(0, cell_mask(n_dims, 0))
    }

    /// Aligned cell of depth `depth` that contains `key`
    pub fn cell_containing(key: MortonKey, n_dims: usize, depth: usize) -> Self {
        let mask = cell_mask(n_dims, depth);
        Self::new(key & !mask, (key & !mask) | mask)
    }

    #[inline]
    pub fn contains(&self, key: MortonKey) -> bool {
        self.lower <= key && key <= self.upper
    }

    #[inline]
    pub fn contains_interval(&self, other: &MortonInterval) -> bool {
        self.lower <= other.lower && other.upper <= self.upper
    }
}
