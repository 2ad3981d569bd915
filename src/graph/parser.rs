//! Relation line parser.
//!
//! Each line of the relation protocol is `SUBJECT -- PREDICATE -- OBJECT`. A quoted
//! object makes the line an attribute assignment, a bare object makes it an edge.
//! Lines that do not split into exactly three parts are skipped silently.

use super::literal::{decode_literal, QUOTE};
use crate::error::Result;

/// Token separating the three parts of a relation line.
pub const SEPARATOR: &str = " -- ";

/// Every attribute key and edge predicate ends in a two-character type tag.
pub const TYPE_SUFFIX_LEN: usize = 2;

/// A single fact extracted from a relation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fact {
    /// `subject` gets attribute `key` (full key, type suffix still attached).
    Attribute {
        subject: String,
        key: String,
        value: String,
    },
    /// Directed edge `subject -> object`; the label has its type suffix stripped.
    Edge {
        subject: String,
        label: String,
        object: String,
    },
}

/// Result of parsing a block of relation text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRelations {
    pub facts: Vec<Fact>,
    /// Lines that were not `A -- B -- C` shaped.
    pub skipped: usize,
    /// Attribute lines whose literal failed to decode.
    pub rejected: usize,
}

/// Drop the trailing two-character type tag. Shorter inputs become empty.
pub fn strip_type_suffix(key: &str) -> &str {
    match key.char_indices().rev().nth(TYPE_SUFFIX_LEN - 1) {
        Some((idx, _)) => &key[..idx],
        None => "",
    }
}

/// Split a line into its three raw parts. Tolerates a trailing `\r`.
pub fn split_line(line: &str) -> Option<(&str, &str, &str)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut parts = line.split(SEPARATOR);
    let subject = parts.next()?;
    let predicate = parts.next()?;
    let object = parts.next()?;
    if parts.next().is_some() || subject.is_empty() || object.is_empty() {
        return None;
    }
    Some((subject, predicate, object))
}

/// Parse one line.
///
/// Returns `Ok(None)` for lines that carry no fact and an error for attribute
/// lines whose literal cannot be decoded.
pub fn parse_line(line: &str) -> Result<Option<Fact>> {
    let Some((subject, predicate, object)) = split_line(line) else {
        return Ok(None);
    };

    if object.starts_with(QUOTE) {
        let value = decode_literal(object)?;
        return Ok(Some(Fact::Attribute {
            subject: subject.to_string(),
            key: predicate.to_string(),
            value,
        }));
    }

    Ok(Some(Fact::Edge {
        subject: subject.to_string(),
        label: strip_type_suffix(predicate).to_string(),
        object: object.to_string(),
    }))
}

/// Parse a block of relation text, keeping every fact in line order.
pub fn parse_relations(text: &str) -> ParsedRelations {
    let mut parsed = ParsedRelations::default();

    for line in text.split('\n') {
        match parse_line(line) {
            Ok(Some(fact)) => parsed.facts.push(fact),
            Ok(None) => {
                if !line.trim().is_empty() {
                    log::debug!("skipping relation line: {}", line);
                    parsed.skipped += 1;
                }
            }
            Err(e) => {
                log::debug!("rejecting relation line: {}", e);
                parsed.rejected += 1;
            }
        }
    }

    parsed
}
