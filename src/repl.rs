//! Command language of the terminal explorer.
//!
//! One command per line. Node-targeted commands stand in for the pointer events a
//! graphical renderer would report.

use crate::error::{PiiGraphError, Result};
use crate::graph::EdgeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Double-click: expand, or open the link of an expanded node.
    Open(String),
    /// Expand regardless of pointer semantics.
    Expand(String),
    /// Single click: recenter.
    Click(String),
    /// Search text; goes through the debouncer.
    Search(String),
    SelectNode(String),
    SelectEdge(EdgeId),
    ClearSelection,
    /// Remove selected nodes and edges.
    Delete,
    DropLabel(String),
    Show,
    Json,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  open <id>         double-click a node (expand, or open its link)
  expand <id>       fetch a node's relations
  click <id>        recenter on a node
  search <text>     highlight matching nodes (empty clears)
  select <id>       select a node
  select-edge <n>   select an edge by number
  clear             clear the selection
  delete            remove selected nodes and edges
  drop-label <l>    remove every edge labelled <l>
  show              print the graph
  json              print the graph as JSON
  quit";

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "open" => Command::Open(required(word, rest)?),
            "expand" => Command::Expand(required(word, rest)?),
            "click" => Command::Click(required(word, rest)?),
            "search" => Command::Search(rest.to_string()),
            "select" => Command::SelectNode(required(word, rest)?),
            "select-edge" => {
                let n = required(word, rest)?;
                let n = n.trim_start_matches('#').parse::<u64>().map_err(|_| {
                    PiiGraphError::Parse(format!("select-edge expects an edge number, got {}", n))
                })?;
                Command::SelectEdge(EdgeId(n))
            }
            "clear" => Command::ClearSelection,
            "delete" => Command::Delete,
            "drop-label" => Command::DropLabel(required(word, rest)?),
            "show" => Command::Show,
            "json" => Command::Json,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(PiiGraphError::Parse(format!(
                    "unknown command: {} (try help)",
                    other
                )))
            }
        };
        Ok(Some(command))
    }
}

fn required(word: &str, rest: &str) -> Result<String> {
    if rest.is_empty() {
        return Err(PiiGraphError::Parse(format!("{} needs an argument", word)));
    }
    Ok(rest.to_string())
}
