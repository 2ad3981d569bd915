//! In-memory relation corpus served by the backend.

use std::collections::HashSet;

use crate::graph::merge::{COLOR, IDENTITY, LABEL, SHAPE};
use crate::graph::literal::QUOTE;
use crate::graph::parser::{split_line, strip_type_suffix, SEPARATOR};

/// Attributes of neighbouring entities that are included so they render with a label.
const PRESENTATION_KEYS: &[&str] = &[IDENTITY, LABEL, SHAPE, COLOR];

#[derive(Debug, Clone)]
struct CorpusLine {
    subject: String,
    predicate: String,
    object: String,
    raw: String,
}

impl CorpusLine {
    fn is_attribute(&self) -> bool {
        self.object.starts_with(QUOTE)
    }
}

/// Relation lines indexed for per-entity extraction.
#[derive(Debug, Clone, Default)]
pub struct RelationCorpus {
    lines: Vec<CorpusLine>,
}

impl RelationCorpus {
    /// Keep every well-formed relation line; other lines are dropped.
    pub fn parse(text: &str) -> Self {
        let lines = text
            .split('\n')
            .filter_map(|line| {
                let (subject, predicate, object) = split_line(line)?;
                Some(CorpusLine {
                    subject: subject.to_string(),
                    predicate: predicate.to_string(),
                    object: object.to_string(),
                    raw: [subject, predicate, object].join(SEPARATOR),
                })
            })
            .collect();
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains_entity(&self, id: &str) -> bool {
        self.lines
            .iter()
            .any(|l| l.subject == id || (!l.is_attribute() && l.object == id))
    }

    /// Whole corpus as relation text.
    pub fn to_text(&self) -> String {
        join_lines(self.lines.iter())
    }

    /// Relation text scoped to `id`: its own lines, edges pointing at it, and the
    /// presentation attributes of every neighbour. `None` if the entity is unknown.
    pub fn entity(&self, id: &str) -> Option<String> {
        if !self.contains_entity(id) {
            return None;
        }

        let mut neighbours = HashSet::new();
        for line in self.lines.iter().filter(|l| !l.is_attribute()) {
            if line.subject == id {
                neighbours.insert(line.object.as_str());
            } else if line.object == id {
                neighbours.insert(line.subject.as_str());
            }
        }

        let selected = self.lines.iter().filter(|line| {
            if line.subject == id {
                return true;
            }
            if line.is_attribute() {
                return neighbours.contains(line.subject.as_str())
                    && PRESENTATION_KEYS.contains(&strip_type_suffix(&line.predicate));
            }
            line.object == id
        });

        Some(join_lines(selected))
    }
}

fn join_lines<'a>(lines: impl Iterator<Item = &'a CorpusLine>) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(&line.raw);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = "\
A -- IdentityES -- \"Widget\"
A -- RoleES -- \"ArtifactE\"
A -- VersionEE -- V1
V1 -- IdentityES -- \"1.0\"
V1 -- RoleES -- \"VersionE\"
V1 -- ShapeSS -- \"dot\"
B -- IdentityES -- \"Other\"
B -- usesEE -- A
not a relation
";

    #[test]
    fn test_parse_keeps_relation_lines_only() {
        let corpus = RelationCorpus::parse(CORPUS);
        assert_eq!(corpus.len(), 8);
        assert!(!corpus.to_text().contains("not a relation"));
    }

    #[test]
    fn test_entity_includes_own_incoming_and_neighbour_presentation() {
        let corpus = RelationCorpus::parse(CORPUS);
        let text = corpus.entity("A").unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "A -- IdentityES -- \"Widget\"",
                "A -- RoleES -- \"ArtifactE\"",
                "A -- VersionEE -- V1",
                "V1 -- IdentityES -- \"1.0\"",
                "V1 -- ShapeSS -- \"dot\"",
                "B -- IdentityES -- \"Other\"",
                "B -- usesEE -- A",
            ]
        );
    }

    #[test]
    fn test_neighbour_roles_are_not_leaked() {
        let corpus = RelationCorpus::parse(CORPUS);
        let text = corpus.entity("A").unwrap();
        assert!(!text.contains("VersionE\""));
    }

    #[test]
    fn test_unknown_entity() {
        let corpus = RelationCorpus::parse(CORPUS);
        assert!(corpus.entity("Z").is_none());
        assert!(corpus.contains_entity("V1"));
    }
}
