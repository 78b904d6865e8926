/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Read-only render data for the canvas.
//!
//! Drawing itself happens in the host; it consumes a [`RenderSnapshot`]
//! captured once per frame and never mutates the registry.

pub mod spatial_index;

use euclid::default::Point2D;

use crate::graph::{NodeId, NodeRegistry};
use crate::spawn::{AgentId, AgentRoster};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRenderItem {
    pub id: NodeId,
    pub position: Point2D<f64>,
    pub selected: bool,
    pub highlighted: bool,
}

/// One road segment; every undirected edge appears once.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRenderItem {
    pub from: NodeId,
    pub to: NodeId,
    pub start: Point2D<f64>,
    pub end: Point2D<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentRenderItem {
    pub id: AgentId,
    pub position: Point2D<f64>,
    pub hovered: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSnapshot {
    /// Nodes in creation order.
    pub nodes: Vec<NodeRenderItem>,
    pub edges: Vec<EdgeRenderItem>,
    pub agents: Vec<AgentRenderItem>,
}

impl RenderSnapshot {
    pub fn capture(registry: &NodeRegistry, agents: &AgentRoster) -> Self {
        let nodes = registry
            .nodes()
            .map(|node| NodeRenderItem {
                id: node.id,
                position: node.position,
                selected: registry.is_selected(node.id),
                highlighted: node.highlighted,
            })
            .collect();

        let edges = registry
            .edges()
            .filter_map(|(from, to)| {
                let start = registry.find_node_by_id(from)?.position;
                let end = registry.find_node_by_id(to)?.position;
                Some(EdgeRenderItem {
                    from,
                    to,
                    start,
                    end,
                })
            })
            .collect();

        let agents = agents
            .agents()
            .iter()
            .map(|agent| AgentRenderItem {
                id: agent.id,
                position: agent.position,
                hovered: agent.hovered,
            })
            .collect();

        Self {
            nodes,
            edges,
            agents,
        }
    }

    pub fn selected_node(&self) -> Option<&NodeRenderItem> {
        self.nodes.iter().find(|node| node.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_reports_selection_and_segments() {
        let mut registry = NodeRegistry::new();
        let a = registry.create_node(Point2D::new(0.0, 0.0), false);
        let b = registry.create_node(Point2D::new(30.0, 40.0), true);
        registry.connect(a, b).unwrap();
        registry.set_highlighted(a, true);
        let mut agents = AgentRoster::new();
        agents.spawn_at(&registry, b).unwrap();

        let snapshot = RenderSnapshot::capture(&registry, &agents);

        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes.iter().filter(|node| node.selected).count(), 1);
        assert_eq!(snapshot.selected_node().map(|node| node.id), Some(b));
        assert!(snapshot.nodes[0].highlighted);
        assert_eq!(snapshot.edges.len(), 1);
        let segment = &snapshot.edges[0];
        assert_eq!(segment.start.distance_to(segment.end), 50.0);
        assert_eq!(snapshot.agents[0].position, Point2D::new(30.0, 40.0));
    }

    #[test]
    fn capture_of_empty_session_is_empty() {
        let snapshot = RenderSnapshot::capture(&NodeRegistry::new(), &AgentRoster::new());
        assert_eq!(snapshot, RenderSnapshot::default());
    }
}
