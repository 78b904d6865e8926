/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Conversion between a [`NodeRegistry`] and its persisted [`Layout`].
//!
//! Loading is split into two passes. Edge entries may point at nodes that
//! appear later in the document, so every node is materialized before any
//! edge is wired.

use euclid::default::Point2D;
use log::{debug, info, warn};
use std::fmt;

use super::types::{Layout, LayoutRecord, RecordError};
use crate::graph::{GraphError, NodeId, NodeRegistry};

/// A recoverable problem found while loading a layout.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutLoadFailure {
    /// The record under `key` was skipped.
    MalformedLayoutRecord { key: String, reason: String },
    /// Two keys parsed to the same node id; the later record was skipped.
    DuplicateNodeId { key: String, id: NodeId },
    /// `from` lists `to` as a neighbor but `to` was never materialized.
    DanglingEdgeReference { from: NodeId, to: NodeId },
    /// `from` lists an integer neighbor key that no node id can take.
    InvalidEdgeKey { from: NodeId, key: String },
}

impl fmt::Display for LayoutLoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutLoadFailure::MalformedLayoutRecord { key, reason } => {
                write!(f, "Skipped layout record '{key}': {reason}")
            },
            LayoutLoadFailure::DuplicateNodeId { key, id } => {
                write!(f, "Skipped layout record '{key}': node id {id} already loaded")
            },
            LayoutLoadFailure::DanglingEdgeReference { from, to } => {
                write!(f, "Failed to connect {from} to {to}: node {to} does not exist")
            },
            LayoutLoadFailure::InvalidEdgeKey { from, key } => {
                write!(f, "Failed to connect {from} to {key}: not a valid node id")
            },
        }
    }
}

/// Outcome of a layout load. A load never fails as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutLoadReport {
    pub nodes_restored: usize,
    pub edges_restored: usize,
    pub failures: Vec<LayoutLoadFailure>,
}

impl LayoutLoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Edge entries that could not be wired, for either reason.
    pub fn dangling_edge_count(&self) -> usize {
        self.failures
            .iter()
            .filter(|failure| {
                matches!(
                    failure,
                    LayoutLoadFailure::DanglingEdgeReference { .. }
                        | LayoutLoadFailure::InvalidEdgeKey { .. }
                )
            })
            .count()
    }

    fn record(&mut self, failure: LayoutLoadFailure) {
        warn!("{failure}");
        self.failures.push(failure);
    }
}

/// Serialize every node, in creation order, with its neighbors.
///
/// Each road is written from both endpoints.
pub fn encode(registry: &NodeRegistry) -> Layout {
    let mut layout = Layout::new();
    for node in registry.nodes() {
        let record = LayoutRecord {
            x: node.position.x,
            y: node.position.y,
            connections: registry.neighbors(node.id),
            invalid_connections: Vec::new(),
        };
        layout.insert_record(node.id, &record);
    }
    layout
}

/// Build a fresh registry from `layout`.
pub fn decode(layout: &Layout) -> (NodeRegistry, LayoutLoadReport) {
    let mut registry = NodeRegistry::new();
    let report = load_into(&mut registry, layout);
    (registry, report)
}

/// Replace the contents of `registry` with `layout`.
///
/// The registry is reset first; persisted ids are kept verbatim and no
/// node ends up selected.
pub fn load_into(registry: &mut NodeRegistry, layout: &Layout) -> LayoutLoadReport {
    let mut report = LayoutLoadReport::default();
    registry.reset();

    // Pass 1: materialize nodes.
    let mut materialized: Vec<(NodeId, LayoutRecord)> = Vec::with_capacity(layout.len());
    for (key, value) in layout.entries() {
        let Ok(id) = key.parse::<NodeId>() else {
            report.record(LayoutLoadFailure::MalformedLayoutRecord {
                key: key.to_string(),
                reason: "key is not a node id".to_string(),
            });
            continue;
        };
        let record = match LayoutRecord::parse(value) {
            Ok(record) => record,
            Err(reason) => {
                report.record(malformed(key, reason));
                continue;
            },
        };
        let position = Point2D::new(record.x, record.y);
        match registry.restore_node(id, position) {
            Ok(_) => {
                debug!("Created node {id} at ({}, {})", record.x, record.y);
                report.nodes_restored += 1;
                materialized.push((id, record));
            },
            Err(_) => report.record(LayoutLoadFailure::DuplicateNodeId {
                key: key.to_string(),
                id,
            }),
        }
    }

    // Pass 2: wire edges now that every target exists.
    for (id, record) in &materialized {
        for key in &record.invalid_connections {
            report.record(LayoutLoadFailure::InvalidEdgeKey {
                from: *id,
                key: key.clone(),
            });
        }
        for &neighbor in &record.connections {
            match registry.connect(*id, neighbor) {
                Ok(true) => report.edges_restored += 1,
                Ok(false) => {},
                Err(GraphError::NodeNotFound(_) | GraphError::DuplicateNodeId(_)) => {
                    report.record(LayoutLoadFailure::DanglingEdgeReference {
                        from: *id,
                        to: neighbor,
                    });
                },
            }
        }
    }

    info!(
        "Loaded layout: {} nodes, {} edges, {} failures",
        report.nodes_restored,
        report.edges_restored,
        report.failures.len()
    );
    report
}

fn malformed(key: &str, reason: RecordError) -> LayoutLoadFailure {
    LayoutLoadFailure::MalformedLayoutRecord {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
