/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::path::PathBuf;
use std::process;

use bpaf::Bpaf;
use euclid::default::Size2D;
use log::{error, info, warn};
use tracing_subscriber::EnvFilter;

use roadgraph::app::{EditorApp, GraphIntent};
use roadgraph::config::EditorConfig;
use roadgraph::persistence::{self, LayoutStore};

/// Road graph layout tool.
#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
struct CliOptions {
    /// TOML editor configuration
    #[bpaf(argument("PATH"))]
    config: Option<PathBuf>,
    /// Layout file to load
    #[bpaf(argument("PATH"))]
    layout: Option<PathBuf>,
    /// Load the built-in default road map
    #[bpaf(long("default-layout"), switch)]
    default_layout: bool,
    /// Named layout to load from the layout store
    #[bpaf(argument("NAME"))]
    load: Option<String>,
    /// Save the resulting layout under this name in the layout store
    #[bpaf(argument("NAME"))]
    save: Option<String>,
    /// Number of cars to spawn
    #[bpaf(argument("COUNT"), fallback(0))]
    spawn: usize,
    /// Canvas width used for seed nodes
    #[bpaf(argument("PX"), fallback(1280.0))]
    width: f64,
    /// Canvas height used for seed nodes
    #[bpaf(argument("PX"), fallback(720.0))]
    height: f64,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {e}");
    }
}

fn open_store(config: &EditorConfig) -> Option<LayoutStore> {
    let dir = config
        .layout_dir
        .clone()
        .or_else(LayoutStore::default_data_dir)?;
    match LayoutStore::open(dir) {
        Ok(store) => Some(store),
        Err(e) => {
            error!("{e}");
            None
        },
    }
}

fn run(opts: CliOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &opts.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    let layout = if let Some(path) = &opts.layout {
        Some(persistence::read_layout_file(path)?)
    } else if let Some(name) = &opts.load {
        let store = open_store(&config).ok_or("No layout store available")?;
        Some(store.load_layout(name)?)
    } else if opts.default_layout {
        Some(persistence::default_layout()?)
    } else {
        None
    };

    let mut app = EditorApp::new(config, Size2D::new(opts.width, opts.height));
    if let Some(layout) = layout {
        let report = app.load_layout(&layout);
        if !report.is_clean() {
            warn!("Layout loaded with {} skipped entries", report.failures.len());
        }
    }

    app.apply_intents(std::iter::repeat_n(GraphIntent::SpawnAgent, opts.spawn));
    for agent in app.agents().agents() {
        info!("{} spawned at node {}", agent.id, agent.origin);
    }

    let layout = app.current_layout().clone();
    if let Some(name) = &opts.save {
        let mut store = open_store(app.config()).ok_or("No layout store available")?;
        store.save_layout(name, &layout)?;
        info!("Saved layout '{name}' to {}", store.base_dir().display());
    }

    println!("{}", layout.to_json_string_pretty()?);
    Ok(())
}

fn main() {
    init_tracing();
    let opts = cli_options().run();
    if let Err(e) = run(opts) {
        error!("{e}");
        process::exit(1);
    }
}
