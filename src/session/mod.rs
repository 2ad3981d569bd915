//! Graph session: owns the node/edge registries, ingests relation text, drives
//! expansion through a fetch collaborator and keeps a renderer up to date.
//!
//! Everything runs on one logical thread. An expansion holds `&mut self` across
//! the fetch, so responses are merged one at a time.

pub mod debounce;
pub mod tracker;

pub use debounce::SearchDebouncer;
pub use tracker::ExpansionState;

use serde::Serialize;
use std::collections::HashSet;

use crate::error::{PiiGraphError, Result};
use crate::fetch::Fetcher;
use crate::graph::merge::MergeEffect;
use crate::graph::{
    apply_attribute, parse_relations, EdgeId, EdgeRegistry, Fact, GraphSnapshot, Node,
    NodeRegistry,
};

/// Pointer position as reported by the renderer. The coordinate system is opaque.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Rendering collaborator.
pub trait Renderer {
    /// Graph data changed.
    fn set_data(&mut self, snapshot: GraphSnapshot<'_>);

    /// Center the view on `position`.
    fn move_to(&mut self, _position: Position) {}

    fn is_node_selected(&self, _id: &str) -> bool {
        false
    }

    fn is_edge_selected(&self, _id: EdgeId) -> bool {
        false
    }

    /// Highlight search matches; an empty slice clears them.
    fn show_matches(&mut self, _ids: &[String]) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Click,
    DoubleClick,
}

/// A click reported by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub kind: InteractionKind,
    /// Node under the pointer, if any.
    pub node: Option<String>,
    pub pointer: Position,
}

/// Counts from one ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub attributes: usize,
    pub edges: usize,
    pub skipped: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// Relations fetched and merged.
    Fetched(IngestReport),
    /// Node already descriptive; nothing fetched.
    AlreadyExpanded,
    /// Fetch failed; node stays collapsed.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Click outside any node.
    Ignored,
    Recentered,
    Expanded(ExpandOutcome),
    /// Expanded node with an external link; the UI should open it.
    OpenLink(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    pub nodes: usize,
    pub edges: usize,
}

/// Explorer state for one graph.
pub struct GraphSession<R: Renderer> {
    nodes: NodeRegistry,
    edges: EdgeRegistry,
    renderer: R,
}

impl<R: Renderer> GraphSession<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            nodes: NodeRegistry::new(),
            edges: EdgeRegistry::new(),
            renderer,
        }
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    pub fn edges(&self) -> &EdgeRegistry {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn snapshot(&self) -> GraphSnapshot<'_> {
        GraphSnapshot::new(&self.nodes, &self.edges)
    }

    pub fn expansion_state(&self, id: &str) -> Option<ExpansionState> {
        self.nodes.get(id).map(tracker::state)
    }

    /// Merge relation text into the graph and notify the renderer.
    pub fn ingest(&mut self, text: &str) -> IngestReport {
        let parsed = parse_relations(text);
        let mut report = IngestReport {
            skipped: parsed.skipped,
            rejected: parsed.rejected,
            ..IngestReport::default()
        };

        for fact in parsed.facts {
            match fact {
                Fact::Attribute {
                    subject,
                    key,
                    value,
                } => {
                    let node = self.nodes.find_or_create(&subject);
                    if apply_attribute(node, &key, &value) != MergeEffect::Ignored {
                        report.attributes += 1;
                    }
                }
                Fact::Edge {
                    subject,
                    label,
                    object,
                } => {
                    self.nodes.find_or_create(&subject);
                    self.nodes.find_or_create(&object);
                    self.edges.find_or_create(&subject, &label, &object);
                    report.edges += 1;
                }
            }
        }

        self.notify();
        report
    }

    /// Fetch and merge a node's relations unless it is already expanded.
    pub async fn expand<F: Fetcher>(&mut self, fetcher: &F, id: &str) -> Result<ExpandOutcome> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| PiiGraphError::NodeNotFound(id.to_string()))?;

        if !tracker::needs_fetch(node) {
            log::debug!("{} already expanded", id);
            return Ok(ExpandOutcome::AlreadyExpanded);
        }

        node.reset_display();
        log::info!("expanding {}", id);

        let text = match fetcher.fetch_entity(id).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("fetch for {} failed: {}", id, e);
                return Ok(ExpandOutcome::Failed);
            }
        };

        let report = self.ingest(&text);
        if let Some(node) = self.nodes.get_mut(id) {
            node.fetched = true;
        }
        log::info!(
            "expanded {}: {} attributes, {} edges, {} skipped, {} rejected",
            id,
            report.attributes,
            report.edges,
            report.skipped,
            report.rejected
        );
        Ok(ExpandOutcome::Fetched(report))
    }

    /// Handle a click or double-click from the renderer.
    ///
    /// A click recenters. A double-click expands a collapsed node and recenters on
    /// success; on an expanded node it opens the node's link if it has one and
    /// otherwise just recenters.
    pub async fn interact<F: Fetcher>(
        &mut self,
        fetcher: &F,
        interaction: &Interaction,
    ) -> Result<InteractionOutcome> {
        let Some(id) = interaction.node.as_deref() else {
            return Ok(InteractionOutcome::Ignored);
        };
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| PiiGraphError::NodeNotFound(id.to_string()))?;

        match interaction.kind {
            InteractionKind::Click => {
                self.renderer.move_to(interaction.pointer);
                Ok(InteractionOutcome::Recentered)
            }
            InteractionKind::DoubleClick if tracker::needs_fetch(node) => {
                let outcome = self.expand(fetcher, id).await?;
                if matches!(outcome, ExpandOutcome::Fetched(_)) {
                    self.renderer.move_to(interaction.pointer);
                }
                Ok(InteractionOutcome::Expanded(outcome))
            }
            InteractionKind::DoubleClick => match node.link.clone().filter(|l| !l.is_empty()) {
                Some(link) => Ok(InteractionOutcome::OpenLink(link)),
                None => {
                    self.renderer.move_to(interaction.pointer);
                    Ok(InteractionOutcome::Recentered)
                }
            },
        }
    }

    /// Drop everything the renderer has selected, plus edges left dangling.
    pub fn remove_selected(&mut self) -> RemovalReport {
        let renderer = &self.renderer;
        let removed_nodes = self.nodes.retain(|node| !renderer.is_node_selected(&node.id));

        let dangling: HashSet<EdgeId> = removed_nodes
            .iter()
            .flat_map(|id| self.edges.touching(id))
            .map(|edge| edge.id)
            .collect();
        let removed_edges = self
            .edges
            .retain(|edge| !renderer.is_edge_selected(edge.id) && !dangling.contains(&edge.id));

        if !removed_nodes.is_empty() || removed_edges > 0 {
            log::info!(
                "removed {} nodes and {} edges",
                removed_nodes.len(),
                removed_edges
            );
        }

        self.notify();
        RemovalReport {
            nodes: removed_nodes.len(),
            edges: removed_edges,
        }
    }

    /// Remove every edge with `label`. Returns how many edges remain.
    pub fn remove_edges_by_label(&mut self, label: &str) -> usize {
        let remaining = self.edges.remove_by_label(label).len();
        self.notify();
        remaining
    }

    /// Ids of nodes whose display text or title contains `text`. Empty text matches nothing.
    pub fn search(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        self.nodes
            .iter()
            .filter(|node| node.matches(text))
            .map(|node| node.id.clone())
            .collect()
    }

    /// Run a search and hand the matches to the renderer.
    pub fn apply_search(&mut self, text: &str) -> Vec<String> {
        let matches = self.search(text);
        self.renderer.show_matches(&matches);
        matches
    }

    fn notify(&mut self) {
        self.renderer
            .set_data(GraphSnapshot::new(&self.nodes, &self.edges));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingRenderer {
        frames: usize,
        last_counts: (usize, usize),
        moves: Vec<Position>,
        selected_nodes: HashSet<String>,
        selected_edges: HashSet<EdgeId>,
        matches: Vec<String>,
    }

    impl Renderer for RecordingRenderer {
        fn set_data(&mut self, snapshot: GraphSnapshot<'_>) {
            self.frames += 1;
            self.last_counts = (snapshot.nodes.len(), snapshot.edges.len());
        }

        fn move_to(&mut self, position: Position) {
            self.moves.push(position);
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

    /// Serves canned responses and counts calls per id.
    #[derive(Default)]
    struct FakeFetcher {
        responses: HashMap<String, String>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        fn with(mut self, id: &str, text: &str) -> Self {
            self.responses.insert(id.to_string(), text.to_string());
            self
        }

        fn calls_for(&self, id: &str) -> usize {
            self.calls.borrow().iter().filter(|c| c.as_str() == id).count()
        }
    }

    impl Fetcher for FakeFetcher {
        async fn fetch_entity(&self, id: &str) -> Result<String> {
            self.calls.borrow_mut().push(id.to_string());
            self.responses
                .get(id)
                .cloned()
                .ok_or_else(|| PiiGraphError::Fetch(format!("404 for {}", id)))
        }
    }

    const WIDGET: &str =
        "A -- IdentityXX -- \"Widget\"\nA -- ownsXX -- B\nB -- IdentityXX -- \"Gadget\"";

    fn session() -> GraphSession<RecordingRenderer> {
        GraphSession::new(RecordingRenderer::default())
    }

    fn double_click(id: &str) -> Interaction {
        Interaction {
            kind: InteractionKind::DoubleClick,
            node: Some(id.to_string()),
            pointer: Position { x: 10.0, y: -4.0 },
        }
    }

    #[test]
    fn test_end_to_end_ingest() {
        let mut s = session();
        let report = s.ingest(WIDGET);
        assert_eq!(report.attributes, 2);
        assert_eq!(report.edges, 1);
        assert_eq!(s.nodes().len(), 2);
        assert_eq!(s.node("A").unwrap().label(), "Widget");
        assert_eq!(s.node("B").unwrap().label(), "Gadget");
        let edges = s.edges().as_slice();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source, "A");
        assert_eq!(edges[0].target, "B");
        assert_eq!(edges[0].label, "owns");
        assert_eq!(s.renderer().frames, 1);
        assert_eq!(s.renderer().last_counts, (2, 1));
    }

    #[test]
    fn test_ingest_is_idempotent_for_edges() {
        let mut s = session();
        s.ingest(WIDGET);
        s.ingest(WIDGET);
        assert_eq!(s.edges().len(), 1);
        assert_eq!(s.nodes().len(), 2);
    }

    #[test]
    fn test_malformed_lines_leave_registries_unchanged() {
        let mut s = session();
        s.ingest(WIDGET);
        let report = s.ingest("C\nC -- ownsXX\nD -- IdentityXX -- \"oops");
        assert_eq!(report.skipped, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(s.nodes().len(), 2);
        assert_eq!(s.edges().len(), 1);
        assert!(s.node("D").is_none());
    }

    #[test]
    fn test_repeated_attributes_across_ingests() {
        let mut s = session();
        s.ingest("A -- AliasES -- \"v1\"");
        s.ingest("A -- AliasES -- \"v2\"");
        let node = s.node("A").unwrap();
        assert_eq!(node.property("Alias").unwrap().render_value(), "[ v2, v1 ]");
    }

    #[test]
    fn test_remove_selected_node_drops_its_edges() {
        let mut s = session();
        s.ingest("A -- ownsXX -- B\nB -- usesXX -- C\nC -- ownsXX -- A\nC -- ownsXX -- D");
        s.renderer_mut().selected_nodes.insert("A".to_string());
        let report = s.remove_selected();
        assert_eq!(report, RemovalReport { nodes: 1, edges: 2 });
        assert!(s.node("A").is_none());
        assert!(s.edges().iter().all(|e| !e.touches("A")));
        assert_eq!(s.edges().len(), 2);
    }

    #[test]
    fn test_remove_selected_edge_only() {
        let mut s = session();
        s.ingest("A -- ownsXX -- B\nA -- usesXX -- B");
        let owns = s.edges().iter().find(|e| e.label == "owns").unwrap().id;
        s.renderer_mut().selected_edges.insert(owns);
        let report = s.remove_selected();
        assert_eq!(report, RemovalReport { nodes: 0, edges: 1 });
        assert_eq!(s.nodes().len(), 2);
        assert_eq!(s.edges().as_slice()[0].label, "uses");
    }

    #[test]
    fn test_remove_edges_by_label() {
        let mut s = session();
        s.ingest("A -- ownsXX -- B\nA -- usesXX -- C\nB -- ownsXX -- C");
        assert_eq!(s.remove_edges_by_label("owns"), 1);
        assert_eq!(s.nodes().len(), 3);
    }

    #[test]
    fn test_search_matches_display_and_title() {
        let mut s = session();
        s.ingest(WIDGET);
        s.ingest("B -- PathES -- \"/src/widget.rs\"");
        assert_eq!(s.search("Widget"), vec!["A".to_string()]);
        assert_eq!(s.search("widget"), vec!["B".to_string()]);
        assert!(s.search("").is_empty());
        let matches = s.apply_search("dget");
        assert_eq!(matches.len(), 2);
        assert_eq!(s.renderer().matches.len(), 2);
        s.apply_search("");
        assert!(s.renderer().matches.is_empty());
    }

    #[tokio::test]
    async fn test_expand_fetches_and_merges() {
        let fetcher = FakeFetcher::default().with(
            "B",
            "B -- IdentityXX -- \"Gadget\"\nB -- RoleES -- \"PartE\"\nB -- madeOfXX -- C",
        );
        let mut s = session();
        s.ingest(WIDGET);

        let outcome = s.expand(&fetcher, "B").await.unwrap();
        assert!(matches!(outcome, ExpandOutcome::Fetched(r) if r.edges == 1));
        let b = s.node("B").unwrap();
        assert!(b.fetched);
        assert_eq!(b.display_text(), "Gadget\n\nRole: Part\n");
        assert_eq!(s.expansion_state("B"), Some(ExpansionState::Expanded));
        assert_eq!(s.expansion_state("C"), Some(ExpansionState::Collapsed));
        assert_eq!(s.edges().len(), 2);
    }

    #[tokio::test]
    async fn test_expansion_gated_by_role() {
        let fetcher = FakeFetcher::default()
            .with("A", "A -- RoleES -- \"ArtifactE\"")
            .with("B", "B -- PathES -- \"/b\"");
        let mut s = session();
        s.ingest(WIDGET);

        s.expand(&fetcher, "A").await.unwrap();
        let second = s.expand(&fetcher, "A").await.unwrap();
        assert_eq!(second, ExpandOutcome::AlreadyExpanded);
        assert_eq!(fetcher.calls_for("A"), 1);

        s.expand(&fetcher, "B").await.unwrap();
        s.expand(&fetcher, "B").await.unwrap();
        assert_eq!(fetcher.calls_for("B"), 2);
        assert_eq!(s.node("B").unwrap().property("Path").unwrap().render_value(), "/b");
    }

    #[tokio::test]
    async fn test_expand_failure_leaves_node_collapsed() {
        let fetcher = FakeFetcher::default();
        let mut s = session();
        s.ingest(WIDGET);
        let outcome = s.expand(&fetcher, "A").await.unwrap();
        assert_eq!(outcome, ExpandOutcome::Failed);
        let a = s.node("A").unwrap();
        assert!(!a.fetched);
        assert_eq!(a.display_text(), "\n\n");
        assert_eq!(a.title.as_deref(), Some("Widget"));
        assert_eq!(s.expansion_state("A"), Some(ExpansionState::Collapsed));
    }

    #[tokio::test]
    async fn test_expand_unknown_node() {
        let fetcher = FakeFetcher::default();
        let mut s = session();
        let err = s.expand(&fetcher, "nope").await.unwrap_err();
        assert!(matches!(err, PiiGraphError::NodeNotFound(_)));
        assert_eq!(fetcher.calls_for("nope"), 0);
    }

    #[tokio::test]
    async fn test_click_recenters_without_fetch() {
        let fetcher = FakeFetcher::default();
        let mut s = session();
        s.ingest(WIDGET);
        let click = Interaction {
            kind: InteractionKind::Click,
            node: Some("A".to_string()),
            pointer: Position { x: 1.0, y: 2.0 },
        };
        let outcome = s.interact(&fetcher, &click).await.unwrap();
        assert_eq!(outcome, InteractionOutcome::Recentered);
        assert_eq!(s.renderer().moves, vec![Position { x: 1.0, y: 2.0 }]);
        assert!(fetcher.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_double_click_expands_then_opens_link() {
        let fetcher = FakeFetcher::default().with(
            "A",
            "A -- IdentityES -- \"Widget\"\nA -- RoleES -- \"ConstantE\"\nA -- ContentEB -- \"https://example.org/w\"",
        );
        let mut s = session();
        s.ingest(WIDGET);

        let first = s.interact(&fetcher, &double_click("A")).await.unwrap();
        assert!(matches!(first, InteractionOutcome::Expanded(ExpandOutcome::Fetched(_))));
        assert_eq!(s.renderer().moves.len(), 1);

        let second = s.interact(&fetcher, &double_click("A")).await.unwrap();
        assert_eq!(
            second,
            InteractionOutcome::OpenLink("https://example.org/w".to_string())
        );
        assert_eq!(fetcher.calls_for("A"), 1);
    }

    #[tokio::test]
    async fn test_double_click_expanded_without_link_recenters() {
        let fetcher = FakeFetcher::default();
        let mut s = session();
        s.ingest("A -- RoleES -- \"FileE\"");
        let outcome = s.interact(&fetcher, &double_click("A")).await.unwrap();
        assert_eq!(outcome, InteractionOutcome::Recentered);
        assert!(fetcher.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_interaction_on_empty_canvas_is_ignored() {
        let fetcher = FakeFetcher::default();
        let mut s = session();
        let outcome = s
            .interact(
                &fetcher,
                &Interaction {
                    kind: InteractionKind::DoubleClick,
                    node: None,
                    pointer: Position::default(),
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome, InteractionOutcome::Ignored);
    }
}
