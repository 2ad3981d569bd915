//! Relation graph: node/edge records, the relation line parser, the registries
//! and the attribute merge engine.
//!
//! Nodes carry their display as structured rows (identity, spacer, properties)
//! so the rendering side decides presentation; nothing here builds markup.

pub mod literal;
pub mod merge;
pub mod parser;
pub mod registry;

pub use merge::apply_attribute;
pub use parser::{parse_line, parse_relations, Fact, ParsedRelations};
pub use registry::{EdgeRegistry, NodeRegistry};

use serde::Serialize;

/// Border color used for nodes that received an explicit background color.
pub const BORDER_COLOR: &str = "black";

/// Shapes with the label drawn outside the node body.
const POINT_SHAPES: &[&str] = &[
    "dot",
    "diamond",
    "star",
    "triangle",
    "triangleDown",
    "hexagon",
    "square",
];

/// Node shape as understood by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(into = "String")]
pub enum Shape {
    #[default]
    Box,
    Dot,
    /// Any other renderer-defined shape name, kept verbatim.
    Other(String),
}

impl Shape {
    pub fn parse(name: &str) -> Self {
        match name {
            "box" => Shape::Box,
            "dot" => Shape::Dot,
            other => Shape::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Shape::Box => "box",
            Shape::Dot => "dot",
            Shape::Other(name) => name,
        }
    }

    /// Point-style shapes render their label beside the node instead of inside it.
    pub fn is_point_style(&self) -> bool {
        POINT_SHAPES.contains(&self.as_str())
    }
}

impl From<Shape> for String {
    fn from(shape: Shape) -> Self {
        shape.as_str().to_string()
    }
}

/// Background/border pair. Present only on nodes that were explicitly colored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeColor {
    pub background: String,
    pub border: String,
}

/// A `key: value` display row. Values are ordered most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub key: String,
    pub values: Vec<String>,
}

impl Property {
    /// Scalar for a single value, `[ newest, ..., oldest ]` once a key repeats.
    pub fn render_value(&self) -> String {
        match self.values.as_slice() {
            [] => String::new(),
            [single] => single.clone(),
            many => format!("[ {} ]", many.join(", ")),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.render_value().is_empty()
    }
}

/// One line of a node's display, tagged with its semantic role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DisplayRow {
    /// Primary label, rendered emphasized.
    Identity { text: String },
    Spacer,
    Property { key: String, value: String },
}

impl DisplayRow {
    pub fn text(&self) -> String {
        match self {
            DisplayRow::Identity { text } => text.clone(),
            DisplayRow::Spacer => String::new(),
            DisplayRow::Property { key, value } => format!("{}: {}", key, value),
        }
    }
}

/// A graph node and its display record.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: String,
    /// Raw `Identity` value, kept so shape changes can re-derive the label.
    pub title: Option<String>,
    label: String,
    properties: Vec<Property>,
    pub shape: Shape,
    pub color: Option<NodeColor>,
    pub link: Option<String>,
    /// Dashed border marks nodes carrying an external link.
    pub dashed: bool,
    /// Set once an entity fetch for this node has been merged.
    pub fetched: bool,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            label: String::new(),
            properties: Vec::new(),
            shape: Shape::default(),
            color: None,
            link: None,
            dashed: false,
            fetched: false,
        }
    }

    /// Primary display label (row 0).
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }

    fn property_mut(&mut self, key: &str) -> &mut Property {
        let pos = match self.properties.iter().position(|p| p.key == key) {
            Some(pos) => pos,
            None => {
                self.properties.push(Property {
                    key: key.to_string(),
                    values: Vec::new(),
                });
                self.properties.len() - 1
            }
        };
        &mut self.properties[pos]
    }

    /// Add a value to a property: scalar on first use, newest-first list afterwards.
    pub fn push_property_value(&mut self, key: &str, value: &str) {
        let property = self.property_mut(key);
        if property.is_blank() {
            property.values = vec![value.to_string()];
        } else {
            property.values.insert(0, value.to_string());
        }
    }

    /// Replace a property with a single value.
    pub fn replace_property(&mut self, key: &str, value: &str) {
        self.property_mut(key).values = vec![value.to_string()];
    }

    /// True when the node has a non-empty `Role` row.
    pub fn has_role(&self) -> bool {
        self.property(merge::ROLE).is_some_and(|p| !p.is_blank())
    }

    /// Back to the blank two-row display. Shape, color, link and title survive.
    pub fn reset_display(&mut self) {
        self.label.clear();
        self.properties.clear();
    }

    pub fn rows(&self) -> Vec<DisplayRow> {
        let mut rows = Vec::with_capacity(self.properties.len() + 2);
        rows.push(DisplayRow::Identity {
            text: self.label.clone(),
        });
        rows.push(DisplayRow::Spacer);
        rows.extend(self.properties.iter().map(|p| DisplayRow::Property {
            key: p.key.clone(),
            value: p.render_value(),
        }));
        rows
    }

    /// All rows joined by newlines, trailing newline included.
    pub fn display_text(&self) -> String {
        let mut text = String::new();
        for row in self.rows() {
            text.push_str(&row.text());
            text.push('\n');
        }
        text
    }

    /// Case-sensitive substring match on display text or title.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return false;
        }
        self.display_text().contains(needle)
            || self.title.as_deref().is_some_and(|t| t.contains(needle))
    }
}

/// Stable identifier handed to the renderer for hit-testing and selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeId(pub u64);

/// Directed, labelled edge (arrow from source to target).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: String,
    pub target: String,
    pub label: String,
}

impl Edge {
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// The (nodes, edges) pair handed to the rendering collaborator.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GraphSnapshot<'a> {
    pub nodes: &'a [Node],
    pub edges: &'a [Edge],
}

impl<'a> GraphSnapshot<'a> {
    pub fn new(nodes: &'a NodeRegistry, edges: &'a EdgeRegistry) -> Self {
        Self {
            nodes: nodes.as_slice(),
            edges: edges.as_slice(),
        }
    }
}
