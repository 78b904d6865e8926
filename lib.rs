/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Road graph editor core.
//!
//! Users place intersections on a canvas, join them with roads, save and
//! restore the result as an adjacency-map layout, and spawn cars on random
//! intersections. Drawing, input polling and car movement live in the host.

pub mod app;
pub mod config;
pub mod graph;
pub mod persistence;
pub mod render;
pub mod spawn;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
