// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
The materialized box tree and the index that owns it.

Every node owns its children exclusively; leaves own their records. The
tree is replaced wholesale by each build.
*/

use std::any::Any;
use std::sync::Arc;

use crate::box_controller::{BoxController, BoxSettings};
use crate::events::{EventVariant, MdEvent};
use crate::spatial::{MortonInterval, SpaceBounds};
use crate::types::{Coord, IndexResult};

/// Coordinate-space box of a node, half-open per axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeExtents<const N: usize> {
    pub min: [Coord; N],
    pub max: [Coord; N],
}

impl<const N: usize> NodeExtents<N> {
    pub fn new(min: [Coord; N], max: [Coord; N]) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing both
    pub fn union(&self, other: &Self) -> Self {
        let mut min = self.min;
        let mut max = self.max;
        for axis in 0..N {
            min[axis] = min[axis].min(other.min[axis]);
            max[axis] = max[axis].max(other.max[axis]);
        }
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, coords: &[Coord; N]) -> bool {
        (0..N).all(|axis| coords[axis] >= self.min[axis] && coords[axis] < self.max[axis])
    }

    pub fn contains_extents(&self, other: &Self) -> bool {
        (0..N).all(|axis| self.min[axis] <= other.min[axis] && other.max[axis] <= self.max[axis])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeafBox<E, const N: usize> {
    pub depth: usize,
    pub extents: NodeExtents<N>,
    pub interval: MortonInterval,
    pub events: Vec<E>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridBox<E, const N: usize> {
    pub depth: usize,
    pub extents: NodeExtents<N>,
    pub interval: MortonInterval,
    pub children: Vec<IndexNode<E, N>>,
    /// Records below this grid
    pub event_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexNode<E, const N: usize> {
    Leaf(LeafBox<E, N>),
    Grid(GridBox<E, N>),
}

impl<E, const N: usize> IndexNode<E, N> {
    pub fn depth(&self) -> usize {
        match self {
            IndexNode::Leaf(leaf) => leaf.depth,
            IndexNode::Grid(grid) => grid.depth,
        }
    }

    pub fn extents(&self) -> &NodeExtents<N> {
        match self {
            IndexNode::Leaf(leaf) => &leaf.extents,
            IndexNode::Grid(grid) => &grid.extents,
        }
    }

    pub fn interval(&self) -> &MortonInterval {
        match self {
            IndexNode::Leaf(leaf) => &leaf.interval,
            IndexNode::Grid(grid) => &grid.interval,
        }
    }

    pub fn event_count(&self) -> usize {
        match self {
            IndexNode::Leaf(leaf) => leaf.events.len(),
            IndexNode::Grid(grid) => grid.event_count,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, IndexNode::Leaf(_))
    }

    pub fn as_grid(&self) -> Option<&GridBox<E, N>> {
        match self {
            IndexNode::Grid(grid) => Some(grid),
            IndexNode::Leaf(_) => None,
        }
    }

    /// Leaves in depth-first, left-to-right order
    pub fn leaves(&self) -> Vec<&LeafBox<E, N>> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a LeafBox<E, N>>) {
        match self {
            IndexNode::Leaf(leaf) => out.push(leaf),
            IndexNode::Grid(grid) => {
                for child in &grid.children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// (leaves, grids) in the subtree
    pub fn node_counts(&self) -> (usize, usize) {
        match self {
            IndexNode::Leaf(_) => (1, 0),
            IndexNode::Grid(grid) => grid.children.iter().fold((0, 1), |(l, g), child| {
                let (cl, cg) = child.node_counts();
                (l + cl, g + cg)
            }),
        }
    }

    /// Deepest node depth in the subtree
    pub fn max_depth(&self) -> usize {
        match self {
            IndexNode::Leaf(leaf) => leaf.depth,
            IndexNode::Grid(grid) => grid
                .children
                .iter()
                .map(|child| child.max_depth())
                .max()
                .unwrap_or(grid.depth),
        }
    }
}

/// Seam between the dispatcher and a concrete index of unknown N/variant.
pub trait IndexTarget: Any + Send {
    fn num_dims(&self) -> usize;
    fn event_variant(&self) -> EventVariant;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// An N-dimensional event index
#[derive(Debug)]
pub struct MdEventIndex<E, const N: usize> {
    bounds: SpaceBounds<N>,
    box_controller: Arc<BoxController>,
    root: IndexNode<E, N>,
}

impl<E: MdEvent<N>, const N: usize> MdEventIndex<E, N> {
    /// Empty index: the root is a leaf with no records covering the bounds
    pub fn new(bounds: SpaceBounds<N>, settings: BoxSettings) -> IndexResult<Self> {
        let box_controller = Arc::new(BoxController::new(settings)?);
        Ok(Self {
            root: Self::empty_root(&bounds),
            bounds,
            box_controller,
        })
    }

    pub(crate) fn empty_root(bounds: &SpaceBounds<N>) -> IndexNode<E, N> {
        let interval = MortonInterval::domain(N);
        let (min, max) = bounds.cell_extents(&interval, 0);
        IndexNode::Leaf(LeafBox {
            depth: 0,
            extents: NodeExtents::new(min, max),
            interval,
            events: Vec::new(),
        })
    }

    pub fn bounds(&self) -> &SpaceBounds<N> {
        &self.bounds
    }

    pub fn box_controller(&self) -> &Arc<BoxController> {
        &self.box_controller
    }

    pub fn root(&self) -> &IndexNode<E, N> {
        &self.root
    }

    pub fn num_events(&self) -> usize {
        self.root.event_count()
    }

    pub(crate) fn set_root(&mut self, root: IndexNode<E, N>) {
        self.root = root;
    }
}

impl<E: MdEvent<N>, const N: usize> IndexTarget for MdEventIndex<E, N> {
    fn num_dims(&self) -> usize {
        N
    }

    fn event_variant(&self) -> EventVariant {
        E::VARIANT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
