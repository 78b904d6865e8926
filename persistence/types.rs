/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Wire types for persisted layouts.
//!
//! A layout is a JSON object keyed by node id. Each record mixes two kinds
//! of keys: the reserved coordinate attributes `x` and `y`, and one entry
//! per neighbor whose key is the neighbor's id:
//!
//! ```json
//! { "0": { "x": 10, "y": 10, "1": true }, "1": { "x": 20, "y": 20, "0": true } }
//! ```
//!
//! [`LayoutRecord`] is the tagged in-memory form of one record; the key
//! classification rule lives in [`classify_key`]. Integral coordinates are
//! written as JSON integers, so the document above encodes byte for byte.

use serde_json::{Map, Value};
use std::fmt;

use super::LayoutError;
use crate::graph::NodeId;

pub const ATTR_X: &str = "x";
pub const ATTR_Y: &str = "y";

/// How a key inside a layout record is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey {
    X,
    Y,
    Edge(NodeId),
    /// An integer that can never be a node id (negative or past `u64::MAX`).
    /// Reported as a dangling edge on load.
    InvalidEdge,
    /// Neither a coordinate nor an integer. Ignored on load.
    Attribute,
}

pub fn classify_key(key: &str) -> RecordKey {
    match key {
        ATTR_X => RecordKey::X,
        ATTR_Y => RecordKey::Y,
        _ => match key.parse::<NodeId>() {
            Ok(id) => RecordKey::Edge(id),
            Err(_) if key.parse::<i128>().is_ok() => RecordKey::InvalidEdge,
            Err(_) => RecordKey::Attribute,
        },
    }
}

/// Why a single layout record could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    NotAnObject,
    MissingCoordinate(&'static str),
    NonNumericCoordinate(&'static str),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::NotAnObject => write!(f, "record is not an object"),
            RecordError::MissingCoordinate(axis) => write!(f, "missing '{axis}' coordinate"),
            RecordError::NonNumericCoordinate(axis) => {
                write!(f, "'{axis}' coordinate is not a number")
            },
        }
    }
}

/// Tagged form of one layout record: coordinates kept apart from adjacency.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRecord {
    pub x: f64,
    pub y: f64,
    /// Neighbor ids in the record's key order.
    pub connections: Vec<NodeId>,
    /// Integer neighbor keys that cannot name a node.
    pub invalid_connections: Vec<String>,
}

impl LayoutRecord {
    /// Read a record from its wire form.
    ///
    /// Unknown attributes are skipped, and so are neighbor entries whose
    /// value is `false` or `null`.
    pub fn parse(value: &Value) -> Result<Self, RecordError> {
        let fields = value.as_object().ok_or(RecordError::NotAnObject)?;
        let mut x = None;
        let mut y = None;
        let mut connections = Vec::new();
        let mut invalid_connections = Vec::new();

        for (key, field) in fields {
            match classify_key(key) {
                RecordKey::X => x = Some(coordinate(field, ATTR_X)?),
                RecordKey::Y => y = Some(coordinate(field, ATTR_Y)?),
                RecordKey::Edge(id) => match field {
                    Value::Bool(false) | Value::Null => {
                        log::debug!("Ignoring disabled edge entry '{key}'");
                    },
                    _ => connections.push(id),
                },
                RecordKey::InvalidEdge => match field {
                    Value::Bool(false) | Value::Null => {},
                    _ => invalid_connections.push(key.clone()),
                },
                RecordKey::Attribute => {
                    log::debug!("Ignoring unknown layout attribute '{key}'");
                },
            }
        }

        Ok(Self {
            x: x.ok_or(RecordError::MissingCoordinate(ATTR_X))?,
            y: y.ok_or(RecordError::MissingCoordinate(ATTR_Y))?,
            connections,
            invalid_connections,
        })
    }

    /// Wire form: `x`, `y`, then one `"<id>": true` entry per neighbor.
    pub fn to_value(&self) -> Value {
        let mut fields = Map::new();
        fields.insert(ATTR_X.to_string(), coordinate_value(self.x));
        fields.insert(ATTR_Y.to_string(), coordinate_value(self.y));
        for id in &self.connections {
            fields.insert(id.to_string(), Value::Bool(true));
        }
        Value::Object(fields)
    }
}

/// Largest magnitude below which every integral `f64` converts to `i64` exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn coordinate_value(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < MAX_EXACT_INTEGER {
        Value::from(v as i64)
    } else {
        Value::from(v)
    }
}

fn coordinate(value: &Value, axis: &'static str) -> Result<f64, RecordError> {
    value
        .as_f64()
        .ok_or(RecordError::NonNumericCoordinate(axis))
}

/// A persisted layout in wire form. Key order follows the source document.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Layout {
    entries: Map<String, Value>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a layout document. Only a non-object top level is rejected
    /// here; individual bad records are reported when the layout is loaded.
    pub fn from_json_str(json: &str) -> Result<Self, LayoutError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| LayoutError::Json(format!("{e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, LayoutError> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            _ => Err(LayoutError::NotAnObject),
        }
    }

    pub fn to_json_string(&self) -> Result<String, LayoutError> {
        serde_json::to_string(&self.entries).map_err(|e| LayoutError::Json(format!("{e}")))
    }

    pub fn to_json_string_pretty(&self) -> Result<String, LayoutError> {
        serde_json::to_string_pretty(&self.entries).map_err(|e| LayoutError::Json(format!("{e}")))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.entries
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw `(key, record)` pairs in document order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Keys that name a node, in document order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.entries
            .keys()
            .filter_map(|key| key.parse::<NodeId>().ok())
            .collect()
    }

    pub fn insert_record(&mut self, id: NodeId, record: &LayoutRecord) {
        self.entries.insert(id.to_string(), record.to_value());
    }
}
