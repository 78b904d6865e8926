use std::collections::HashSet;

use euclid::default::{Point2D, Size2D};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use roadgraph::VERSION;
use roadgraph::app::{EditorApp, GraphIntent};
use roadgraph::config::EditorConfig;
use roadgraph::graph::{NodeId, NodeRegistry};
use roadgraph::persistence::types::Layout;
use roadgraph::persistence::{self, LayoutLoadFailure, LayoutStore};
use roadgraph::spawn::{SpawnError, pick_spawn_target};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn scenarios_binary_smoke_runs() {
    assert!(!VERSION.is_empty());
}

#[test]
fn two_node_scenario_encodes_both_directions() {
    let mut registry = NodeRegistry::new();
    let a = registry.create_node(Point2D::new(10.0, 10.0), true);
    let b = registry.create_node(Point2D::new(20.0, 20.0), false);
    assert_eq!((a, b), (NodeId(0), NodeId(1)));
    assert_eq!(registry.selected(), Some(a));

    registry.connect(a, b).expect("both nodes exist");
    assert_eq!(registry.neighbors(a), vec![b]);
    assert_eq!(registry.neighbors(b), vec![a]);

    let literal = r#"{"0":{"x":10,"y":10,"1":true},"1":{"x":20,"y":20,"0":true}}"#;
    assert_eq!(registry.to_layout(), Layout::from_json_str(literal).unwrap());
    assert_eq!(registry.to_layout().to_json_string().unwrap(), literal);
}

#[test]
fn foreign_layout_coordinates_survive_reload_and_resave() {
    let source = Layout::from_value(json!({
        "0": {"x": 0.1, "y": 123456789, "1": true},
        "1": {"x": 1e300, "y": 7, "0": true}
    }))
    .unwrap();

    let mut app = EditorApp::new_for_testing();
    assert!(app.load_layout(&source).is_clean());
    assert_eq!(app.current_layout(), &source);
}

#[test]
fn largest_persisted_id_leaves_room_for_new_nodes() {
    let layout = Layout::from_json_str(r#"{"18446744073709551615":{"x":1,"y":1}}"#).unwrap();
    let (mut registry, report) = NodeRegistry::from_layout(&layout);
    assert!(report.is_clean());

    let created = registry.create_node(Point2D::new(2.0, 2.0), true);

    assert_ne!(created, NodeId(u64::MAX));
    assert_eq!(registry.node_count(), 2);
    assert_eq!(registry.selected(), Some(created));
}

#[test]
fn partial_load_keeps_node_and_reports_dangling_edge() {
    let layout = Layout::from_json_str(r#"{"0": {"x":1,"y":1,"5": true}}"#).unwrap();

    let (registry, report) = NodeRegistry::from_layout(&layout);

    assert_eq!(registry.node_ids().collect::<Vec<_>>(), vec![NodeId(0)]);
    assert!(registry.neighbors(NodeId(0)).is_empty());
    assert_eq!(
        report.failures,
        vec![LayoutLoadFailure::DanglingEdgeReference {
            from: NodeId(0),
            to: NodeId(5),
        }]
    );
}

#[test]
fn spawn_targets_cover_both_nodes_and_empty_layout_fails() {
    let layout = Layout::from_json_str(r#"{"0":{"x":0,"y":0},"1":{"x":1,"y":1}}"#).unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    let mut counts = [0usize; 2];
    for _ in 0..4_000 {
        let id = pick_spawn_target(&layout, &mut rng).unwrap();
        counts[id.0 as usize] += 1;
    }
    assert!(counts[0] > 1_700 && counts[1] > 1_700, "counts were {counts:?}");

    assert_eq!(
        pick_spawn_target(&Layout::from_json_str("{}").unwrap(), &mut rng),
        Err(SpawnError::EmptyGraph)
    );
}

#[test]
fn ids_stay_unique_after_load_and_further_edits() {
    let mut app = EditorApp::new_for_testing();
    let layout = Layout::from_json_str(
        r#"{"0":{"x":10,"y":10,"3":true},"3":{"x":50,"y":50,"0":true},"1":{"x":90,"y":90}}"#,
    )
    .unwrap();
    app.load_layout(&layout);

    app.apply_intents([
        GraphIntent::CreateNode {
            position: Point2D::new(200.0, 200.0),
            select: true,
        },
        GraphIntent::CreateNode {
            position: Point2D::new(300.0, 300.0),
            select: false,
        },
    ]);

    let ids: Vec<NodeId> = app.registry().node_ids().collect();
    let unique: HashSet<NodeId> = ids.iter().copied().collect();
    assert_eq!(ids.len(), 5);
    assert_eq!(unique.len(), 5);
    assert!(app.registry().are_connected(NodeId(0), NodeId(3)));
}

#[test]
fn editing_session_survives_store_roundtrip() {
    let dir = TempDir::new().unwrap();
    let config = EditorConfig {
        rng_seed: Some(5),
        layout_dir: Some(dir.path().to_path_buf()),
        ..EditorConfig::default()
    };
    let mut app = EditorApp::new(config, Size2D::new(640.0, 480.0));
    app.apply_intents([
        GraphIntent::PointerPressed {
            position: Point2D::new(320.0, 240.0),
            select_modifier: false,
        },
        GraphIntent::PointerPressed {
            position: Point2D::new(64.0, 48.0),
            select_modifier: false,
        },
    ]);
    let saved = app.current_layout().clone();

    let mut store = LayoutStore::open(dir.path().to_path_buf()).unwrap();
    store.save_layout("session", &saved).unwrap();
    let mut restored = EditorApp::new_for_testing();
    let report = restored.load_layout(&store.load_layout("session").unwrap());
    assert!(report.is_clean());

    assert_eq!(restored.current_layout(), &saved);
    assert_eq!(restored.registry().edge_count(), app.registry().edge_count());
}

#[test]
fn default_layout_supports_spawning() {
    let mut app = EditorApp::new_for_testing();
    app.load_layout(&persistence::default_layout().unwrap());

    for _ in 0..10 {
        let agent = app.spawn_agent().unwrap();
        let origin = app.agents().get(agent).unwrap().origin;
        assert!(app.registry().find_node_by_id(origin).is_some());
    }
}

#[derive(Debug, Clone)]
enum Op {
    Create { x: f64, y: f64, select: bool },
    Select(u64),
    Connect(u64, u64),
    Reload,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0.0f64..500.0, 0.0f64..500.0, any::<bool>())
            .prop_map(|(x, y, select)| Op::Create { x, y, select }),
        (0u64..12).prop_map(Op::Select),
        (0u64..12, 0u64..12).prop_map(|(a, b)| Op::Connect(a, b)),
        Just(Op::Reload),
    ]
}

proptest! {
    #[test]
    fn prop_registry_invariants_hold(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut registry = NodeRegistry::new();
        for op in ops {
            match op {
                Op::Create { x, y, select } => {
                    registry.create_node(Point2D::new(x, y), select);
                },
                Op::Select(id) => {
                    let _ = registry.select_node(NodeId(id));
                },
                Op::Connect(a, b) => {
                    if registry.connect(NodeId(a), NodeId(b)).is_ok() {
                        prop_assert!(registry.neighbors(NodeId(a)).contains(&NodeId(b)));
                        prop_assert!(registry.neighbors(NodeId(b)).contains(&NodeId(a)));
                    }
                },
                Op::Reload => {
                    let (restored, report) = NodeRegistry::from_layout(&registry.to_layout());
                    prop_assert!(report.is_clean());
                    registry = restored;
                },
            }

            let selected = registry.nodes().filter(|node| registry.is_selected(node.id)).count();
            prop_assert!(selected <= 1);
            prop_assert_eq!(selected == 1, registry.selected().is_some());

            let ids: Vec<NodeId> = registry.node_ids().collect();
            let unique: HashSet<NodeId> = ids.iter().copied().collect();
            prop_assert_eq!(ids.len(), unique.len());

            for id in &ids {
                for neighbor in registry.neighbors(*id) {
                    prop_assert!(registry.neighbors(neighbor).contains(id));
                }
            }
        }
    }
}
