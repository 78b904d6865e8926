/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Spawn points and the roster of spawned agents ("cars").
//!
//! Agent movement and route finding belong to the agent subsystem; this
//! module only decides where an agent starts and tracks what was spawned.

use euclid::default::Point2D;
use log::info;
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

use crate::graph::{NodeId, NodeRegistry};
use crate::persistence::types::Layout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    /// The layout has no nodes to spawn on.
    EmptyGraph,
    /// The chosen spawn node is not in the registry.
    UnknownNode(NodeId),
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::EmptyGraph => write!(f, "No nodes available to spawn on"),
            SpawnError::UnknownNode(id) => write!(f, "Spawn node {id} not found"),
        }
    }
}

impl std::error::Error for SpawnError {}

/// Pick a spawn node uniformly at random among the layout's node ids.
pub fn pick_spawn_target<R: Rng + ?Sized>(layout: &Layout, rng: &mut R) -> Result<NodeId, SpawnError> {
    layout
        .node_ids()
        .choose(rng)
        .copied()
        .ok_or(SpawnError::EmptyGraph)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "car-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    /// Node the agent was spawned on.
    pub origin: NodeId,
    /// Position in canvas space.
    pub position: Point2D<f64>,
    /// Whether the pointer is over the agent this frame.
    pub hovered: bool,
}

/// Every agent spawned in the current session.
#[derive(Debug, Clone, Default)]
pub struct AgentRoster {
    agents: Vec<Agent>,
    next_id: u64,
}

impl AgentRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an agent on `origin`, placed at the node's position.
    pub fn spawn_at(&mut self, registry: &NodeRegistry, origin: NodeId) -> Result<AgentId, SpawnError> {
        let node = registry
            .find_node_by_id(origin)
            .ok_or(SpawnError::UnknownNode(origin))?;
        let id = AgentId(self.next_id);
        self.next_id += 1;
        self.agents.push(Agent {
            id,
            origin,
            position: node.position,
            hovered: false,
        });
        info!("Creating new car at {origin}");
        Ok(id)
    }

    /// Spawn an agent on a random node of `layout`.
    pub fn spawn_random<R: Rng + ?Sized>(
        &mut self,
        registry: &NodeRegistry,
        layout: &Layout,
        rng: &mut R,
    ) -> Result<AgentId, SpawnError> {
        let origin = pick_spawn_target(layout, rng)?;
        self.spawn_at(registry, origin)
    }

    /// Mark agents within `radius` of `pointer` as hovered.
    pub fn update_hover(&mut self, pointer: Point2D<f64>, radius: f64) {
        for agent in &mut self.agents {
            agent.hovered = agent.position.distance_to(pointer) < radius;
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn clear(&mut self) {
        self.agents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn two_node_layout() -> Layout {
        Layout::from_json_str(r#"{"0":{"x":0,"y":0},"1":{"x":1,"y":1}}"#).unwrap()
    }

    #[test]
    fn pick_spawn_target_is_roughly_uniform() {
        let layout = two_node_layout();
        let mut rng = StdRng::seed_from_u64(7);
        let trials = 10_000;

        let zeros = (0..trials)
            .map(|_| pick_spawn_target(&layout, &mut rng).unwrap())
            .filter(|id| *id == NodeId(0))
            .count();

        let share = zeros as f64 / trials as f64;
        assert!((0.45..0.55).contains(&share), "share of node 0 was {share}");
    }

    #[test]
    fn pick_spawn_target_only_returns_layout_ids() {
        let layout = Layout::from_json_str(r#"{"4":{"x":0,"y":0},"9":{"x":1,"y":1}}"#).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let id = pick_spawn_target(&layout, &mut rng).unwrap();
            assert!(id == NodeId(4) || id == NodeId(9));
        }
    }

    #[test]
    fn pick_spawn_target_on_empty_layout_fails() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            pick_spawn_target(&Layout::new(), &mut rng),
            Err(SpawnError::EmptyGraph)
        );
    }

    #[test]
    fn spawn_at_places_agent_on_node() {
        let mut registry = NodeRegistry::new();
        let node = registry.create_node(Point2D::new(40.0, 60.0), false);
        let mut roster = AgentRoster::new();

        let first = roster.spawn_at(&registry, node).unwrap();
        let second = roster.spawn_at(&registry, node).unwrap();

        assert_ne!(first, second);
        let agent = roster.get(first).unwrap();
        assert_eq!(agent.origin, node);
        assert_eq!(agent.position, Point2D::new(40.0, 60.0));
        assert_eq!(
            roster.spawn_at(&registry, NodeId(5)),
            Err(SpawnError::UnknownNode(NodeId(5)))
        );
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn spawn_random_uses_registry_layout() {
        let mut registry = NodeRegistry::new();
        registry.create_node(Point2D::new(0.0, 0.0), false);
        let mut roster = AgentRoster::new();
        let mut rng = StdRng::seed_from_u64(3);

        let id = roster
            .spawn_random(&registry, &registry.to_layout(), &mut rng)
            .unwrap();

        assert_eq!(roster.get(id).unwrap().origin, NodeId(0));
    }

    #[test]
    fn update_hover_marks_nearby_agents() {
        let mut registry = NodeRegistry::new();
        let near = registry.create_node(Point2D::new(0.0, 0.0), false);
        let far = registry.create_node(Point2D::new(100.0, 0.0), false);
        let mut roster = AgentRoster::new();
        let near_agent = roster.spawn_at(&registry, near).unwrap();
        let far_agent = roster.spawn_at(&registry, far).unwrap();

        roster.update_hover(Point2D::new(5.0, 5.0), 20.0);

        assert!(roster.get(near_agent).unwrap().hovered);
        assert!(!roster.get(far_agent).unwrap().hovered);
    }
}
