// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Native tree materializer.

Walks the scratch tree depth-first and moves the sorted records into the
leaves that cover them. Leaf ranges are contiguous and visited in key order,
so records are consumed from the front of the array without copying.
*/

use crate::events::MdEvent;
use crate::index::{GridBox, IndexNode, LeafBox, NodeExtents};
use crate::spatial::SpaceBounds;

use super::structure::StructNode;

/// Convert the scratch tree into owned index nodes.
///
/// `events` must be the sorted array the structure was built over.
pub(crate) fn materialize<E: MdEvent<N>, const N: usize>(
    structure: StructNode,
    events: Vec<E>,
    bounds: &SpaceBounds<N>,
) -> IndexNode<E, N> {
    debug_assert_eq!(structure.range().len(), events.len());
    let mut records = events.into_iter();
    materialize_node(structure, &mut records, bounds)
}

fn materialize_node<E: MdEvent<N>, const N: usize>(
    node: StructNode,
    records: &mut std::vec::IntoIter<E>,
    bounds: &SpaceBounds<N>,
) -> IndexNode<E, N> {
    match node {
        StructNode::Leaf {
            depth,
            range,
            interval,
            cell,
        } => {
            let (min, max) = bounds.cell_extents(&cell, depth);
            let events: Vec<E> = records.by_ref().take(range.len()).collect();
            IndexNode::Leaf(LeafBox {
                depth,
                extents: NodeExtents::new(min, max),
                interval,
                events,
            })
        }
        StructNode::Grid {
            depth,
            range,
            interval,
            children,
        } => {
            let children: Vec<IndexNode<E, N>> = children
                .into_iter()
                .map(|child| materialize_node(child, records, bounds))
                .collect();

            let mut extents = *children[0].extents();
            for child in &children[1..] {
                extents = extents.union(child.extents());
            }

            IndexNode::Grid(GridBox {
                depth,
                extents,
                interval,
                children,
                event_count: range.len(),
            })
        }
    }
}
