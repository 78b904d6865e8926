/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Layout persistence.
//!
//! - `types`: the adjacency-map wire format
//! - `codec`: registry <-> layout conversion (two-pass load)
//! - `LayoutStore`: named layout files on disk

pub mod codec;
pub mod types;

use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

pub use codec::{LayoutLoadFailure, LayoutLoadReport};
use types::Layout;

const LAYOUT_FILE_EXTENSION: &str = "json";
const DEFAULT_LAYOUT_JSON: &str = include_str!("default_layout.json");

/// The built-in road map.
pub fn default_layout() -> Result<Layout, LayoutError> {
    Layout::from_json_str(DEFAULT_LAYOUT_JSON)
}

pub fn read_layout_file(path: &Path) -> Result<Layout, LayoutError> {
    let json = fs::read_to_string(path)
        .map_err(|e| LayoutError::Io(format!("Failed to read {}: {e}", path.display())))?;
    Layout::from_json_str(&json)
}

pub fn write_layout_file(path: &Path, layout: &Layout) -> Result<(), LayoutError> {
    let json = layout.to_json_string_pretty()?;
    fs::write(path, json)
        .map_err(|e| LayoutError::Io(format!("Failed to write {}: {e}", path.display())))
}

/// Directory of named layouts, one `<name>.json` file each.
pub struct LayoutStore {
    base_dir: PathBuf,
}

impl LayoutStore {
    fn layout_file_name(name: &str) -> Result<String, LayoutError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(LayoutError::InvalidName(
                "Layout name must not be empty".to_string(),
            ));
        }
        if trimmed.starts_with('.') || trimmed.contains(['/', '\\']) {
            return Err(LayoutError::InvalidName(format!(
                "Layout name '{trimmed}' must be a plain file name"
            )));
        }
        Ok(format!("{trimmed}.{LAYOUT_FILE_EXTENSION}"))
    }

    /// Open or create a layout store at the given directory.
    pub fn open(base_dir: PathBuf) -> Result<Self, LayoutError> {
        fs::create_dir_all(&base_dir)
            .map_err(|e| LayoutError::Io(format!("Failed to create dir: {e}")))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn save_layout(&mut self, name: &str, layout: &Layout) -> Result<(), LayoutError> {
        let path = self.base_dir.join(Self::layout_file_name(name)?);
        write_layout_file(&path, layout)
    }

    pub fn load_layout(&self, name: &str) -> Result<Layout, LayoutError> {
        let path = self.base_dir.join(Self::layout_file_name(name)?);
        read_layout_file(&path)
    }

    /// Sorted names of every stored layout.
    pub fn list_layout_names(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.base_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to list layouts in {}: {e}", self.base_dir.display());
                return Vec::new();
            },
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext == LAYOUT_FILE_EXTENSION)
            })
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect();
        names.sort();
        names
    }

    pub fn delete_layout(&mut self, name: &str) -> Result<(), LayoutError> {
        let path = self.base_dir.join(Self::layout_file_name(name)?);
        fs::remove_file(&path)
            .map_err(|e| LayoutError::Io(format!("Failed to delete {}: {e}", path.display())))
    }

    /// Default storage directory for layouts, if the platform has one.
    pub fn default_data_dir() -> Option<PathBuf> {
        let mut dir = dirs::data_dir()?;
        dir.push("roadgraph");
        dir.push("layouts");
        Some(dir)
    }
}

/// Errors that reject a layout document as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    Io(String),
    Json(String),
    NotAnObject,
    InvalidName(String),
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutError::Io(e) => write!(f, "IO error: {e}"),
            LayoutError::Json(e) => write!(f, "JSON error: {e}"),
            LayoutError::NotAnObject => write!(f, "Layout document must be a JSON object"),
            LayoutError::InvalidName(e) => write!(f, "Invalid layout name: {e}"),
        }
    }
}

impl std::error::Error for LayoutError {}
