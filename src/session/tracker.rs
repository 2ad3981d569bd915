//! Expansion tracking.
//!
//! A node counts as expanded once it carries a non-empty `Role` row: entity fetches
//! always describe the entity's roles, while nodes only reached through a
//! neighbour's relations do not have them yet.

use serde::Serialize;

use crate::graph::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionState {
    /// Relations not fetched yet.
    Collapsed,
    /// Relations fetched (or the node already describes itself).
    Expanded,
}

pub fn state(node: &Node) -> ExpansionState {
    if node.has_role() {
        ExpansionState::Expanded
    } else {
        ExpansionState::Collapsed
    }
}

/// Whether an expand request for `node` should hit the fetch collaborator.
pub fn needs_fetch(node: &Node) -> bool {
    state(node) == ExpansionState::Collapsed
}
