/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Editor configuration, read from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Pointer presses closer than this many canvas pixels hit a node.
pub const DEFAULT_HIT_RADIUS: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub hit_radius: f64,

    /// Pointer distance under which an agent counts as hovered.
    pub agent_hover_radius: f64,

    /// Create the seed nodes when a session starts.
    pub seed_nodes: bool,

    /// Seed node positions as fractions of the viewport size. The last
    /// seed node starts selected.
    pub seed_positions: Vec<[f64; 2]>,

    /// Fixed RNG seed for spawn selection; entropy when unset.
    pub rng_seed: Option<u64>,

    /// Directory for named layouts; the platform data dir when unset.
    pub layout_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hit_radius: DEFAULT_HIT_RADIUS,
            agent_hover_radius: DEFAULT_HIT_RADIUS,
            seed_nodes: true,
            seed_positions: vec![[0.1, 0.1], [0.8, 0.8]],
            rng_seed: None,
            layout_dir: None,
        }
    }
}

impl EditorConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(format!("{e}")))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {e}"),
            ConfigError::Parse(e) => write!(f, "Config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
