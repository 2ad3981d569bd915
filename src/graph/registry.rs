//! Node and edge registries.
//!
//! Both keep first-seen order and a hash index for lookups. Removal rebuilds the
//! index, which is fine for user-driven deletions.

use std::collections::HashMap;

use super::{Edge, EdgeId, Node};

/// Nodes keyed by identifier, in first-seen order.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing node with this id, or a freshly created blank one.
    pub fn find_or_create(&mut self, id: &str) -> &mut Node {
        let pos = match self.index.get(id) {
            Some(&pos) => pos,
            None => {
                self.nodes.push(Node::new(id));
                let pos = self.nodes.len() - 1;
                self.index.insert(id.to_string(), pos);
                pos
            }
        };
        &mut self.nodes[pos]
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&pos| &self.nodes[pos])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        match self.index.get(id) {
            Some(&pos) => Some(&mut self.nodes[pos]),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    /// Keep nodes for which `keep` returns true. Returns the removed ids.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<String>
    where
        F: FnMut(&Node) -> bool,
    {
        let mut removed = Vec::new();
        self.nodes.retain(|node| {
            let kept = keep(node);
            if !kept {
                removed.push(node.id.clone());
            }
            kept
        });
        if !removed.is_empty() {
            self.reindex();
        }
        removed
    }

    fn reindex(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(pos, node)| (node.id.clone(), pos))
            .collect();
    }
}

type EdgeKey = (String, String, String);

/// Edges in insertion order, deduplicated by (source, target, label).
#[derive(Debug, Default)]
pub struct EdgeRegistry {
    edges: Vec<Edge>,
    index: HashMap<EdgeKey, usize>,
    next_id: u64,
}

impl EdgeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing edge with the same triple, or a newly appended one.
    pub fn find_or_create(&mut self, source: &str, label: &str, target: &str) -> &Edge {
        let key = (source.to_string(), target.to_string(), label.to_string());
        let pos = match self.index.get(&key) {
            Some(&pos) => pos,
            None => {
                let id = EdgeId(self.next_id);
                self.next_id += 1;
                self.edges.push(Edge {
                    id,
                    source: key.0.clone(),
                    target: key.1.clone(),
                    label: key.2.clone(),
                });
                let pos = self.edges.len() - 1;
                self.index.insert(key, pos);
                pos
            }
        };
        &self.edges[pos]
    }

    pub fn get(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn as_slice(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges with `node_id` as source or target.
    pub fn touching<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| edge.touches(node_id))
    }

    /// Remove every edge carrying `label`; returns the remaining edges.
    pub fn remove_by_label(&mut self, label: &str) -> &[Edge] {
        self.retain(|edge| edge.label != label);
        &self.edges
    }

    /// Keep edges for which `keep` returns true. Returns how many were removed.
    pub fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&Edge) -> bool,
    {
        let before = self.edges.len();
        self.edges.retain(keep);
        let removed = before - self.edges.len();
        if removed > 0 {
            self.reindex();
        }
        removed
    }

    fn reindex(&mut self) {
        self.index = self
            .edges
            .iter()
            .enumerate()
            .map(|(pos, edge)| {
                (
                    (edge.source.clone(), edge.target.clone(), edge.label.clone()),
                    pos,
                )
            })
            .collect();
    }
}
