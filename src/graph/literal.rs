//! Quoted literal decoding for attribute values.
//!
//! Attribute objects arrive as double-quoted string literals. Exactly one level of
//! quoting is removed using the JSON string grammar (`\"`, `\\`, `\/`, `\b`, `\f`,
//! `\n`, `\r`, `\t`, `\uXXXX` including surrogate pairs). Anything else fails.

use crate::error::{PiiGraphError, Result};

/// Quote character that marks an attribute literal.
pub const QUOTE: char = '"';

/// Decode a double-quoted literal into plain text.
pub fn decode_literal(raw: &str) -> Result<String> {
    if !raw.starts_with(QUOTE) {
        return Err(PiiGraphError::Literal(format!(
            "literal does not start with a quote: {}",
            raw
        )));
    }

    serde_json::from_str::<String>(raw)
        .map_err(|e| PiiGraphError::Literal(format!("{} in {}", e, raw)))
}
