/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Editing session state and the intent reducer.
//!
//! The host polls input devices and turns them into [`GraphIntent`]s;
//! `EditorApp::apply_intents` is the single write path into the node
//! registry and agent roster.

use euclid::default::{Point2D, Size2D};
use log::{debug, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::EditorConfig;
use crate::graph::{NodeId, NodeRegistry};
use crate::persistence::codec::{self, LayoutLoadReport};
use crate::persistence::default_layout;
use crate::persistence::types::Layout;
use crate::render::RenderSnapshot;
use crate::render::spatial_index::NodeSpatialIndex;
use crate::spawn::{AgentId, AgentRoster, SpawnError};

/// A user-level request against the editing session.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphIntent {
    /// Primary pointer press in canvas space. `select_modifier` is the
    /// held "select instead of connect" key (Control on desktop).
    PointerPressed {
        position: Point2D<f64>,
        select_modifier: bool,
    },
    PointerMoved {
        position: Point2D<f64>,
    },
    CreateNode {
        position: Point2D<f64>,
        select: bool,
    },
    SelectNode {
        id: NodeId,
    },
    ConnectNodes {
        a: NodeId,
        b: NodeId,
    },
    SpawnAgent,
    LoadLayout {
        layout: Layout,
    },
    LoadDefaultLayout,
    ResizeViewport {
        size: Size2D<f64>,
    },
}

pub struct EditorApp {
    registry: NodeRegistry,
    agents: AgentRoster,
    config: EditorConfig,
    viewport: Size2D<f64>,

    /// Encoded layout tagged with the registry revision it was taken at.
    layout_cache: Option<(u64, Layout)>,

    last_load_report: Option<LayoutLoadReport>,
    rng: StdRng,
}

impl EditorApp {
    pub fn new(config: EditorConfig, viewport: Size2D<f64>) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut app = Self {
            registry: NodeRegistry::new(),
            agents: AgentRoster::new(),
            config,
            viewport,
            layout_cache: None,
            last_load_report: None,
            rng,
        };
        if app.config.seed_nodes {
            app.seed_nodes();
        }
        app
    }

    /// Deterministic, unseeded session for tests.
    pub fn new_for_testing() -> Self {
        let config = EditorConfig {
            seed_nodes: false,
            rng_seed: Some(0),
            ..EditorConfig::default()
        };
        Self::new(config, Size2D::new(800.0, 600.0))
    }

    fn seed_nodes(&mut self) {
        let mut last = None;
        for [fx, fy] in self.config.seed_positions.clone() {
            let position = Point2D::new(self.viewport.width * fx, self.viewport.height * fy);
            last = Some(self.registry.create_node(position, false));
        }
        if let Some(id) = last
            && let Err(e) = self.registry.select_node(id)
        {
            debug!("Ignoring seed selection: {e}");
        }
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn agents(&self) -> &AgentRoster {
        &self.agents
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn viewport(&self) -> Size2D<f64> {
        self.viewport
    }

    pub fn last_load_report(&self) -> Option<&LayoutLoadReport> {
        self.last_load_report.as_ref()
    }

    pub fn apply_intents(&mut self, intents: impl IntoIterator<Item = GraphIntent>) {
        for intent in intents {
            self.apply_intent(intent);
        }
    }

    fn apply_intent(&mut self, intent: GraphIntent) {
        match intent {
            GraphIntent::PointerPressed {
                position,
                select_modifier,
            } => self.handle_pointer_pressed(position, select_modifier),
            GraphIntent::PointerMoved { position } => {
                self.agents
                    .update_hover(position, self.config.agent_hover_radius);
            },
            GraphIntent::CreateNode { position, select } => {
                let id = self.registry.create_node(position, select);
                debug!("Created node {id}");
            },
            GraphIntent::SelectNode { id } => {
                if let Err(e) = self.registry.select_node(id) {
                    debug!("Ignoring selection: {e}");
                }
            },
            GraphIntent::ConnectNodes { a, b } => self.connect_logged(a, b),
            GraphIntent::SpawnAgent => {
                if let Err(e) = self.spawn_agent() {
                    warn!("Failed to spawn car: {e}");
                }
            },
            GraphIntent::LoadLayout { layout } => {
                self.load_layout(&layout);
            },
            GraphIntent::LoadDefaultLayout => match default_layout() {
                Ok(layout) => {
                    self.load_layout(&layout);
                },
                Err(e) => warn!("Failed to read default layout: {e}"),
            },
            GraphIntent::ResizeViewport { size } => self.viewport = size,
        }
    }

    fn handle_pointer_pressed(&mut self, position: Point2D<f64>, select_modifier: bool) {
        let index = NodeSpatialIndex::from_registry(&self.registry);
        if let Some(hit) = index.nearest_within(position, self.config.hit_radius) {
            debug!("Clicked on node {hit}");
            if select_modifier {
                if let Err(e) = self.registry.select_node(hit) {
                    debug!("Ignoring selection: {e}");
                }
            } else if let Some(selected) = self.registry.selected()
                && selected != hit
            {
                self.connect_logged(hit, selected);
            }
            return;
        }

        if !self.viewport_contains(position) {
            return;
        }

        let previous = self.registry.selected();
        let created = self.registry.create_node(position, true);
        debug!("Created node {created} at ({}, {})", position.x, position.y);
        if let Some(previous) = previous {
            self.connect_logged(previous, created);
        }
    }

    fn connect_logged(&mut self, a: NodeId, b: NodeId) {
        match self.registry.connect(a, b) {
            Ok(true) => debug!("Connected nodes {a} and {b}"),
            Ok(false) => debug!("Nodes {a} and {b} already connected"),
            Err(e) => warn!("Failed to connect {a} to {b}: {e}"),
        }
    }

    fn viewport_contains(&self, position: Point2D<f64>) -> bool {
        position.x > 0.0
            && position.x < self.viewport.width
            && position.y > 0.0
            && position.y < self.viewport.height
    }

    /// Layout of the current graph, re-encoded only after the graph changed.
    pub fn current_layout(&mut self) -> &Layout {
        let revision = self.registry.revision();
        if self
            .layout_cache
            .as_ref()
            .is_some_and(|(cached, _)| *cached != revision)
        {
            debug!("Graph changed, re-encoding layout");
            self.layout_cache = None;
        }
        let registry = &self.registry;
        let (_, layout) = self
            .layout_cache
            .get_or_insert_with(|| (revision, registry.to_layout()));
        layout
    }

    /// Spawn an agent on a random node of the current layout.
    pub fn spawn_agent(&mut self) -> Result<AgentId, SpawnError> {
        let layout = self.current_layout().clone();
        self.agents
            .spawn_random(&self.registry, &layout, &mut self.rng)
    }

    /// Replace the whole graph with `layout`. Agents spawned on the old
    /// graph are dropped.
    pub fn load_layout(&mut self, layout: &Layout) -> &LayoutLoadReport {
        let report = codec::load_into(&mut self.registry, layout);
        self.agents.clear();
        self.layout_cache = None;
        self.last_load_report.insert(report)
    }

    pub fn render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.registry, &self.agents)
    }

    /// Highlight the nodes of a route chosen by the agent subsystem.
    pub fn highlight_route(&mut self, route: &[NodeId]) {
        for &id in route {
            self.registry.set_highlighted(id, true);
        }
    }

    /// Per-frame cleanup: route highlights only last one frame.
    pub fn end_frame(&mut self) {
        self.registry.clear_highlights();
    }
}
