/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Spatial index for graph-node hit-testing.
//!
//! Node centers are indexed in canvas space so pointer presses can find
//! the closest node with an R*-tree nearest-neighbor query instead of a
//! full node scan.

use euclid::default::Point2D;
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};

use crate::graph::{NodeId, NodeRegistry};

type IndexedNode = GeomWithData<[f64; 2], NodeId>;

/// Spatial index mapping canvas-space positions to `NodeId`s.
pub struct NodeSpatialIndex {
    tree: RTree<IndexedNode>,
}

impl NodeSpatialIndex {
    /// Build the index from an iterator of `(id, canvas_position)` pairs.
    pub fn build(nodes: impl Iterator<Item = (NodeId, Point2D<f64>)>) -> Self {
        let entries: Vec<_> = nodes
            .map(|(id, pos)| IndexedNode::new([pos.x, pos.y], id))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn from_registry(registry: &NodeRegistry) -> Self {
        Self::build(registry.nodes().map(|node| (node.id, node.position)))
    }

    /// Closest node whose center is strictly closer than `radius`.
    pub fn nearest_within(&self, point: Point2D<f64>, radius: f64) -> Option<NodeId> {
        let nearest = self.tree.nearest_neighbor(&[point.x, point.y])?;
        let [x, y] = *nearest.geom();
        (Point2D::new(x, y).distance_to(point) < radius).then_some(nearest.data)
    }

    /// Nodes whose center lies inside the rectangle spanned by `min` and `max`.
    pub fn nodes_in_rect(&self, min: Point2D<f64>, max: Point2D<f64>) -> Vec<NodeId> {
        let aabb = AABB::from_corners([min.x, min.y], [max.x, max.y]);
        self.tree
            .locate_in_envelope(&aabb)
            .map(|entry| entry.data)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
