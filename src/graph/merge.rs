//! Attribute merge engine.
//!
//! Folds one `(key, value)` attribute into a node's display record. Keys carry a
//! two-character type tag that is always dropped before dispatch; a handful of bare
//! keys are reserved and drive the label, shape, color or link instead of
//! producing a plain property row.

use super::parser::strip_type_suffix;
use super::{Node, NodeColor, Shape, BORDER_COLOR};

pub const IDENTITY: &str = "Identity";
pub const LABEL: &str = "Label";
pub const SHAPE: &str = "Shape";
pub const COLOR: &str = "Color";
pub const ROLE: &str = "Role";

/// Full keys ending in this character carry an external link.
pub const LINK_MARKER: char = 'B';

/// What an attribute did to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeEffect {
    Identity,
    Label,
    Shape,
    Color,
    Property,
    /// Property row plus external link.
    Link,
    /// Key was too short to name a property.
    Ignored,
}

/// Apply one attribute assignment to `node`.
pub fn apply_attribute(node: &mut Node, key: &str, value: &str) -> MergeEffect {
    let bare = strip_type_suffix(key);
    if bare.is_empty() {
        log::debug!("ignoring attribute with empty key on {}: {:?}", node.id, key);
        return MergeEffect::Ignored;
    }

    match bare {
        IDENTITY => {
            node.set_label(value);
            node.title = Some(value.to_string());
            return MergeEffect::Identity;
        }
        SHAPE => {
            node.shape = Shape::parse(value);
            if let Some(title) = node.title.clone() {
                node.set_label(title);
            }
            return MergeEffect::Shape;
        }
        COLOR => {
            node.color = Some(NodeColor {
                background: value.to_string(),
                border: BORDER_COLOR.to_string(),
            });
            return MergeEffect::Color;
        }
        _ => {}
    }

    // Everything below is row handling, which the link marker applies to.
    let (value, effect) = match bare {
        LABEL => {
            if node.shape.is_point_style() {
                node.set_label(value);
            } else {
                node.replace_property(LABEL, value);
            }
            (value, MergeEffect::Label)
        }
        ROLE => {
            let role = strip_role_terminator(value);
            node.push_property_value(ROLE, role);
            (role, MergeEffect::Property)
        }
        _ => {
            node.push_property_value(bare, value);
            (value, MergeEffect::Property)
        }
    };

    if key.ends_with(LINK_MARKER) {
        node.link = Some(value.to_string());
        node.dashed = true;
        return MergeEffect::Link;
    }
    effect
}

/// Role names arrive with a one-character terminator that is not part of the name.
fn strip_role_terminator(value: &str) -> &str {
    match value.char_indices().next_back() {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}
