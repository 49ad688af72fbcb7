// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Declared coordinate bounds of an index and the quantization between
coordinates and Morton keys.

Bounds are half-open: a coordinate is inside an axis when
`min <= x < max`.
*/

use serde::{Deserialize, Serialize};

use super::morton::{
    morton_decode, morton_encode, MortonInterval, MortonKey, MORTON_BITS_PER_AXIS,
    QUANTA_PER_AXIS,
};
use crate::types::{Coord, IndexError, IndexResult};

/// Minimum/maximum of one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisExtent {
    pub min: Coord,
    pub max: Coord,
}

impl AxisExtent {
    pub fn new(min: Coord, max: Coord) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> Coord {
        self.max - self.min
    }

    /// Half-open containment; NaN is never contained
    #[inline]
    pub fn contains(&self, value: Coord) -> bool {
        value >= self.min && value < self.max
    }

    /// Reject empty, inverted or non-finite extents.
    pub fn validate(&self) -> IndexResult<()> {
        match self.defect() {
            Some(defect) => Err(IndexError::configuration(format!(
                "{} bounds [{}, {})",
                defect, self.min, self.max
            ))),
            None => Ok(()),
        }
    }

    fn defect(&self) -> Option<&'static str> {
        if !self.min.is_finite() || !self.max.is_finite() {
            Some("non-finite")
        } else if self.min >= self.max {
            Some("empty")
        } else {
            None
        }
    }
}

/// Axis-aligned box of an N-dimensional index space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceBounds<const N: usize> {
    axes: [AxisExtent; N],
}

impl<const N: usize> SpaceBounds<N> {
    /// Create bounds, rejecting empty, inverted or non-finite axes.
    pub fn new(axes: [AxisExtent; N]) -> IndexResult<Self> {
        for (axis, extent) in axes.iter().enumerate() {
            if let Some(defect) = extent.defect() {
                return Err(IndexError::configuration(format!(
                    "axis {} has {} bounds [{}, {})",
                    axis, defect, extent.min, extent.max
                )));
            }
        }
        Ok(Self { axes })
    }

    pub fn from_min_max(min: [Coord; N], max: [Coord; N]) -> IndexResult<Self> {
        let mut axes = [AxisExtent::new(0.0, 0.0); N];
        for (axis, extent) in axes.iter_mut().enumerate() {
            *extent = AxisExtent::new(min[axis], max[axis]);
        }
        Self::new(axes)
    }

    /// Same extent on every axis
    pub fn uniform(min: Coord, max: Coord) -> IndexResult<Self> {
        Self::new([AxisExtent::new(min, max); N])
    }

    pub fn axes(&self) -> &[AxisExtent; N] {
        &self.axes
    }

    pub fn axis(&self, axis: usize) -> AxisExtent {
        self.axes[axis]
    }

    pub fn num_dims(&self) -> usize {
        N
    }

    #[inline]
    pub fn contains(&self, coords: &[Coord; N]) -> bool {
        self.axes
            .iter()
            .zip(coords.iter())
            .all(|(extent, &value)| extent.contains(value))
    }

    /// Width of one quantum along `axis`
    pub fn resolution(&self, axis: usize) -> Coord {
        (self.axes[axis].width() as f64 / QUANTA_PER_AXIS as f64) as Coord
    }

    /// Quantize coordinates to `MORTON_BITS_PER_AXIS` bits per axis.
    ///
    /// Values are clamped into the top quantum, so callers should only pass
    /// coordinates that are inside the bounds.
    #[inline]
    pub fn quantize(&self, coords: &[Coord; N]) -> [u32; N] {
        let mut quanta = [0u32; N];
        for (axis, q) in quanta.iter_mut().enumerate() {
            let extent = self.axes[axis];
            let scaled = (coords[axis] as f64 - extent.min as f64)
                / (extent.max as f64 - extent.min as f64)
                * QUANTA_PER_AXIS as f64;
            *q = if scaled >= 0.0 {
                (scaled.floor() as u64).min(QUANTA_PER_AXIS as u64 - 1) as u32
            } else {
                0
            };
        }
        quanta
    }

    /// Coordinate of the lower edge of quantum `q` (q may equal
    /// `QUANTA_PER_AXIS`, the upper edge of the axis).
    #[inline]
    pub fn quantum_edge(&self, axis: usize, q: u32) -> Coord {
        let extent = self.axes[axis];
        if q >= QUANTA_PER_AXIS {
            return extent.max;
        }
        (extent.min as f64
            + (extent.max as f64 - extent.min as f64) * q as f64 / QUANTA_PER_AXIS as f64)
            as Coord
    }

    /// Centre of each quantum
    #[inline]
    pub fn dequantize(&self, quanta: &[u32; N]) -> [Coord; N] {
        let mut coords = [0.0; N];
        for (axis, c) in coords.iter_mut().enumerate() {
            let extent = self.axes[axis];
            *c = (extent.min as f64
                + (extent.max as f64 - extent.min as f64) * (quanta[axis] as f64 + 0.5)
                    / QUANTA_PER_AXIS as f64) as Coord;
        }
        coords
    }

    #[inline]
    pub fn morton_key(&self, coords: &[Coord; N]) -> MortonKey {
        morton_encode(&self.quantize(coords))
    }

    /// Coordinates recovered from a key (centre of its quantum)
    #[inline]
    pub fn coordinates_of(&self, key: MortonKey) -> [Coord; N] {
        self.dequantize(&morton_decode::<N>(key))
    }

    /// Coordinate box of the aligned cell `cell` sitting at `depth`.
    pub fn cell_extents(&self, cell: &MortonInterval, depth: usize) -> ([Coord; N], [Coord; N]) {
        let lower = morton_decode::<N>(cell.lower);
        let side = 1u32 << (MORTON_BITS_PER_AXIS as usize - depth.min(MORTON_BITS_PER_AXIS as usize));

        let mut min = [0.0; N];
        let mut max = [0.0; N];
        for axis in 0..N {
            min[axis] = self.quantum_edge(axis, lower[axis]);
            max[axis] = self.quantum_edge(axis, lower[axis] + side);
        }
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_open_containment() {
        let bounds = SpaceBounds::<2>::uniform(0.0, 10.0).unwrap();
        assert!(bounds.contains(&[0.0, 0.0]));
        assert!(bounds.contains(&[9.999, 5.0]));
        assert!(!bounds.contains(&[10.0, 5.0]));
        assert!(!bounds.contains(&[5.0, -0.001]));
        assert!(!bounds.contains(&[f32::NAN, 5.0]));
    }

    #[test]
    fn test_rejects_invalid_bounds() {
        assert!(SpaceBounds::<2>::from_min_max([0.0, 1.0], [1.0, 1.0]).is_err());
        assert!(SpaceBounds::<2>::from_min_max([0.0, 2.0], [1.0, 1.0]).is_err());
        assert!(SpaceBounds::<2>::from_min_max([0.0, f32::NEG_INFINITY], [1.0, 1.0]).is_err());
    }

    #[test]
    fn test_axis_extent_validate() {
        assert!(AxisExtent::new(-1.0, 1.0).validate().is_ok());

        let empty = AxisExtent::new(1.0, 1.0).validate().unwrap_err();
        assert!(empty.is_configuration());
        assert!(empty.to_string().contains("empty"));

        assert!(AxisExtent::new(2.0, 1.0).validate().is_err());
        let nan = AxisExtent::new(f32::NAN, 1.0).validate().unwrap_err();
        assert!(nan.to_string().contains("non-finite"));

        let err = SpaceBounds::<2>::from_min_max([0.0, 3.0], [1.0, 3.0]).unwrap_err();
        assert!(err.to_string().contains("axis 1 has empty bounds"));
    }

    #[test]
    fn test_quantize_edges() {
        let bounds = SpaceBounds::<2>::from_min_max([-5.0, 0.0], [5.0, 1.0]).unwrap();
        assert_eq!(bounds.quantize(&[-5.0, 0.0]), [0, 0]);
        assert_eq!(bounds.quantize(&[0.0, 0.5]), [QUANTA_PER_AXIS / 2, QUANTA_PER_AXIS / 2]);
        // just below the maximum lands in the top quantum
        assert_eq!(
            bounds.quantize(&[4.999_999, 0.999_999_9]),
            [QUANTA_PER_AXIS - 1, QUANTA_PER_AXIS - 1]
        );
    }

    #[test]
    fn test_recovered_coordinates_within_resolution() {
        let bounds = SpaceBounds::<3>::from_min_max([0.0, -2.0, 100.0], [10.0, 2.0, 200.0]).unwrap();
        let points = [[0.0, -2.0, 100.0], [3.3, 0.7, 150.25], [9.9999, 1.9999, 199.99]];

        for point in points {
            let recovered = bounds.coordinates_of(bounds.morton_key(&point));
            for axis in 0..3 {
                let diff = (recovered[axis] - point[axis]).abs();
                assert!(
                    diff <= bounds.resolution(axis),
                    "axis {} drifted by {} (resolution {})",
                    axis,
                    diff,
                    bounds.resolution(axis)
                );
            }
        }
    }

    #[test]
    fn test_cell_extents() {
        let bounds = SpaceBounds::<2>::uniform(0.0, 8.0).unwrap();

        let root = MortonInterval::domain(2);
        assert_eq!(bounds.cell_extents(&root, 0), ([0.0, 0.0], [8.0, 8.0]));

        // upper-right quadrant at depth 1
        let key = bounds.morton_key(&[6.0, 7.0]);
        let cell = MortonInterval::cell_containing(key, 2, 1);
        assert_eq!(bounds.cell_extents(&cell, 1), ([4.0, 4.0], [8.0, 8.0]));
    }
}
