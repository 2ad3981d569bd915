//! Plain-text renderer used by the terminal explorer.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::graph::{DisplayRow, EdgeId, GraphSnapshot};
use crate::session::Renderer;

/// Keeps a text frame of the latest snapshot plus selection and search state.
#[derive(Debug, Default)]
pub struct TextRenderer {
    frame: String,
    frames: u64,
    selected_nodes: HashSet<String>,
    selected_edges: HashSet<EdgeId>,
    matches: Vec<String>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the most recent snapshot.
    pub fn frame(&self) -> &str {
        &self.frame
    }

    /// Number of snapshots received so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn matches(&self) -> &[String] {
        &self.matches
    }

    pub fn select_node(&mut self, id: impl Into<String>) {
        self.selected_nodes.insert(id.into());
    }

    pub fn select_edge(&mut self, id: EdgeId) {
        self.selected_edges.insert(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected_nodes.clear();
        self.selected_edges.clear();
    }

    fn draw(&self, snapshot: GraphSnapshot<'_>) -> String {
        let mut out = String::new();

        for node in snapshot.nodes {
            let mut marks = Vec::new();
            if self.selected_nodes.contains(&node.id) {
                marks.push("selected");
            }
            if self.matches.contains(&node.id) {
                marks.push("match");
            }
            if node.link.is_some() {
                marks.push("link");
            }
            let _ = write!(out, "({}) {}", node.shape.as_str(), node.id);
            if let Some(color) = &node.color {
                let _ = write!(out, " bg={}", color.background);
            }
            if !marks.is_empty() {
                let _ = write!(out, " [{}]", marks.join(", "));
            }
            out.push('\n');

            for row in node.rows() {
                match &row {
                    DisplayRow::Identity { text } if !text.is_empty() => {
                        let _ = writeln!(out, "    **{}**", text);
                    }
                    DisplayRow::Property { .. } => {
                        let _ = writeln!(out, "    {}", row.text());
                    }
                    _ => {}
                }
            }
        }

        for edge in snapshot.edges {
            let selected = if self.selected_edges.contains(&edge.id) {
                " [selected]"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "#{} {} --{}--> {}{}",
                edge.id.0, edge.source, edge.label, edge.target, selected
            );
        }

        out
    }
}

impl Renderer for TextRenderer {
    fn set_data(&mut self, snapshot: GraphSnapshot<'_>) {
        self.frames += 1;
        self.frame = self.draw(snapshot);
        // Selections refer to entities that may have just been removed.
        self.selected_nodes
            .retain(|id| snapshot.nodes.iter().any(|n| &n.id == id));
        self.selected_edges
            .retain(|id| snapshot.edges.iter().any(|e| &e.id == id));
    }

    fn is_node_selected(&self, id: &str) -> bool {
        self.selected_nodes.contains(id)
    }

    fn is_edge_selected(&self, id: EdgeId) -> bool {
        self.selected_edges.contains(&id)
    }

    fn show_matches(&mut self, ids: &[String]) {
        self.matches = ids.to_vec();
    }
}
