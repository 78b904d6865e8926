/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Road graph data structures.
//!
//! Core structures:
//! - `NodeRegistry`: owns every intersection node, backed by an undirected
//!   `petgraph::StableUnGraph`, and allocates stable `NodeId`s
//! - `Node`: an intersection with a planar position
//! - `SelectionState`: the exclusive "currently selected" node
//!
//! Roads are undirected: a single petgraph edge is stored per connected
//! pair, so adjacency is symmetric by construction.

use euclid::default::Point2D;
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use std::collections::HashMap;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::persistence::codec::{self, LayoutLoadReport};
use crate::persistence::types::Layout;

pub mod selection;

pub use selection::SelectionState;

/// Internal petgraph handle. Not exposed; collaborators address nodes by `NodeId`.
type NodeKey = NodeIndex;

/// Stable node identity.
///
/// Allocated sequentially by the registry or restored verbatim from a
/// persisted layout, where it appears as a decimal string key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(NodeId)
    }
}

/// An intersection in the road graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Stable node identity.
    pub id: NodeId,

    /// Position in canvas space.
    pub position: Point2D<f64>,

    /// Transient route-highlight flag, cleared once per frame.
    pub highlighted: bool,
}

/// Errors from registry operations. None of them leave the registry mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    NodeNotFound(NodeId),
    DuplicateNodeId(NodeId),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::NodeNotFound(id) => write!(f, "Node {id} not found"),
            GraphError::DuplicateNodeId(id) => write!(f, "Node id {id} already in use"),
        }
    }
}

impl std::error::Error for GraphError {}

/// Owner of every node in an editing session.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    inner: StableUnGraph<Node, ()>,

    /// Stable id to petgraph handle mapping.
    id_to_node: HashMap<NodeId, NodeKey>,

    /// Next candidate for sequential id allocation.
    next_id: u64,

    selection: SelectionState,

    /// Bumped on every topology or position change.
    revision: u64,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node at `position` with the next sequential id.
    ///
    /// When `select_on_create` is set the new node becomes the sole
    /// selected node.
    pub fn create_node(&mut self, position: Point2D<f64>, select_on_create: bool) -> NodeId {
        let id = self.allocate_id();
        self.insert_node(id, position);
        if select_on_create {
            self.selection.select(id);
        }
        id
    }

    /// Insert a node carrying a persisted id.
    pub(crate) fn restore_node(
        &mut self,
        id: NodeId,
        position: Point2D<f64>,
    ) -> Result<NodeId, GraphError> {
        if self.id_to_node.contains_key(&id) {
            return Err(GraphError::DuplicateNodeId(id));
        }
        self.insert_node(id, position);
        if let Some(next) = id.0.checked_add(1) {
            self.next_id = self.next_id.max(next);
        }
        Ok(id)
    }

    /// Next free id at or after the cursor. Restored ids may sit anywhere,
    /// including `u64::MAX`, so the search skips taken ids and wraps.
    fn allocate_id(&mut self) -> NodeId {
        let mut candidate = self.next_id;
        while self.id_to_node.contains_key(&NodeId(candidate)) {
            candidate = candidate.wrapping_add(1);
        }
        self.next_id = candidate.wrapping_add(1);
        NodeId(candidate)
    }

    fn insert_node(&mut self, id: NodeId, position: Point2D<f64>) {
        let key = self.inner.add_node(Node {
            id,
            position,
            highlighted: false,
        });
        self.id_to_node.insert(id, key);
        self.bump_revision();
    }

    /// Make `id` the only selected node.
    pub fn select_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        if !self.id_to_node.contains_key(&id) {
            return Err(GraphError::NodeNotFound(id));
        }
        self.selection.select(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selection.primary()
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.is_selected(id)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Connect two nodes with an undirected road.
    ///
    /// Returns `Ok(false)` when the pair is already connected; repeated
    /// connects never create a second edge.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> Result<bool, GraphError> {
        let key_a = self.key_of(a)?;
        let key_b = self.key_of(b)?;
        if self.inner.find_edge(key_a, key_b).is_some() {
            return Ok(false);
        }
        self.inner.add_edge(key_a, key_b, ());
        self.bump_revision();
        Ok(true)
    }

    pub fn are_connected(&self, a: NodeId, b: NodeId) -> bool {
        match (self.id_to_node.get(&a), self.id_to_node.get(&b)) {
            (Some(&key_a), Some(&key_b)) => self.inner.find_edge(key_a, key_b).is_some(),
            _ => false,
        }
    }

    pub fn find_node_by_id(&self, id: NodeId) -> Option<&Node> {
        let key = *self.id_to_node.get(&id)?;
        self.inner.node_weight(key)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_to_node.contains_key(&id)
    }

    /// Neighbor ids of `id` in ascending order. Empty for unknown ids.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&key) = self.id_to_node.get(&id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<NodeId> = self
            .inner
            .neighbors(key)
            .map(|neighbor| self.inner[neighbor].id)
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.inner.node_indices().map(move |key| &self.inner[key])
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes().map(|node| node.id)
    }

    /// Every undirected edge once, as `(a, b)` id pairs.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.inner
            .edge_references()
            .map(move |edge| (self.inner[edge.source()].id, self.inner[edge.target()].id))
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Set the transient highlight flag. Returns false for unknown ids.
    pub fn set_highlighted(&mut self, id: NodeId, highlighted: bool) -> bool {
        let Some(&key) = self.id_to_node.get(&id) else {
            return false;
        };
        match self.inner.node_weight_mut(key) {
            Some(node) => {
                node.highlighted = highlighted;
                true
            },
            None => false,
        }
    }

    pub fn clear_highlights(&mut self) {
        for node in self.inner.node_weights_mut() {
            node.highlighted = false;
        }
    }

    /// Drop every node and restart id allocation at zero.
    pub fn reset(&mut self) {
        self.inner.clear();
        self.id_to_node.clear();
        self.next_id = 0;
        self.selection.clear();
        self.bump_revision();
    }

    /// Monotonic counter bumped whenever nodes or edges change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Serialize the registry to its persisted layout.
    pub fn to_layout(&self) -> Layout {
        codec::encode(self)
    }

    /// Rebuild a registry from a persisted layout.
    pub fn from_layout(layout: &Layout) -> (Self, LayoutLoadReport) {
        codec::decode(layout)
    }

    fn key_of(&self, id: NodeId) -> Result<NodeKey, GraphError> {
        self.id_to_node
            .get(&id)
            .copied()
            .ok_or(GraphError::NodeNotFound(id))
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.saturating_add(1);
    }
}
