/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use super::NodeId;

/// Canonical exclusive node-selection state.
///
/// At most one node is selected at a time. The selected id is tracked
/// directly so switching selection never scans the node sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    primary: Option<NodeId>,
    revision: u64,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic revision incremented whenever the selection changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The selected node, if any.
    pub fn primary(&self) -> Option<NodeId> {
        self.primary
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.primary == Some(id)
    }

    /// Make `id` the sole selected node. Returns the previously selected node.
    pub fn select(&mut self, id: NodeId) -> Option<NodeId> {
        let previous = self.primary;
        if previous != Some(id) {
            self.primary = Some(id);
            self.revision = self.revision.saturating_add(1);
        }
        previous
    }

    pub fn clear(&mut self) {
        if self.primary.is_none() {
            return;
        }
        self.primary = None;
        self.revision = self.revision.saturating_add(1);
    }
}
