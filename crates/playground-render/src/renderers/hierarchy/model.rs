//! Mind-map payload model
//!
//! Models emit trees in several shapes: `children` or `nodes` arrays, `name`
//! or `title` labels, sometimes wrapped as `{"mindmap": {...}}` and sometimes
//! surrounded by prose. All of them normalize to [`HierarchyNode`].

use crate::error::HierarchyError;
use playground_extract::parse_loose_literal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Label used for nodes without one
pub const PLACEHOLDER_LABEL: &str = "Untitled";

/// Normalized tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    /// Leaf node
    #[must_use]
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Depth of the deepest descendant; a leaf has depth 0
    #[must_use]
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Total node count
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(Self::len).sum::<usize>()
    }

    /// Always false: a tree has at least its root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Parse a mind-map payload
///
/// The object is taken from the first `{` to the last `}` so surrounding
/// prose is tolerated. A top-level array is rejected: the layout needs a
/// single root.
///
/// # Errors
/// See [`HierarchyError`].
pub fn parse_hierarchy(text: &str) -> Result<HierarchyNode, HierarchyError> {
    let trimmed = text.trim();
    if let Ok(value) = parse_loose_literal(trimmed) {
        return from_value(&value);
    }

    let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) else {
        return Err(if trimmed.starts_with('[') {
            HierarchyError::TopLevelArray
        } else {
            HierarchyError::NoObject
        });
    };
    if end < start {
        return Err(HierarchyError::NoObject);
    }

    let before = trimmed[..start].trim_end();
    let after = trimmed[end + 1..].trim_start();
    if before.ends_with('[') && after.starts_with(']') {
        return Err(HierarchyError::TopLevelArray);
    }

    let value = parse_loose_literal(&trimmed[start..=end])
        .map_err(|e| HierarchyError::Syntax(e.to_string()))?;
    from_value(&value)
}

/// Normalize an already-parsed value
///
/// # Errors
/// [`HierarchyError::TopLevelArray`] for arrays and
/// [`HierarchyError::NoObject`] for scalars.
pub fn from_value(value: &Value) -> Result<HierarchyNode, HierarchyError> {
    match value {
        Value::Object(map) => match map.get("mindmap") {
            Some(Value::Object(inner)) => Ok(normalize(inner)),
            Some(Value::Array(_)) => Err(HierarchyError::TopLevelArray),
            _ => Ok(normalize(map)),
        },
        Value::Array(_) => Err(HierarchyError::TopLevelArray),
        _ => Err(HierarchyError::NoObject),
    }
}

fn normalize(map: &Map<String, Value>) -> HierarchyNode {
    let name = ["name", "title", "label", "text"]
        .iter()
        .find_map(|key| label(map.get(*key)?))
        .unwrap_or_else(|| PLACEHOLDER_LABEL.to_owned());

    let children = ["children", "nodes"]
        .iter()
        .find_map(|key| map.get(*key)?.as_array())
        .map(|items| items.iter().filter_map(child).collect())
        .unwrap_or_default();

    HierarchyNode { name, children }
}

fn child(value: &Value) -> Option<HierarchyNode> {
    match value {
        Value::Object(map) => Some(normalize(map)),
        Value::String(s) => Some(HierarchyNode::leaf(s.clone())),
        _ => None,
    }
}

fn label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn children_and_nodes_are_equivalent() {
        let a = parse_hierarchy(r#"{"name":"Root","children":[{"name":"A"}]}"#).unwrap();
        let b = parse_hierarchy(r#"{"title":"Root","nodes":[{"title":"A"}]}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.children[0].name, "A");
    }

    #[test]
    fn mindmap_wrapper_is_unwrapped() {
        let tree = parse_hierarchy(r#"{"mindmap":{"name":"Plan","children":["x","y"]}}"#).unwrap();
        assert_eq!(tree.name, "Plan");
        assert_eq!(tree.children, vec![HierarchyNode::leaf("x"), HierarchyNode::leaf("y")]);
    }

    #[test]
    fn missing_labels_get_placeholder() {
        let tree = parse_hierarchy(r#"{"children":[{"children":[]}]}"#).unwrap();
        assert_eq!(tree.name, PLACEHOLDER_LABEL);
        assert_eq!(tree.children[0].name, PLACEHOLDER_LABEL);
    }

    #[test]
    fn surrounding_prose_is_tolerated() {
        let tree = parse_hierarchy("Here it is:\n{\"name\":\"R\"}\nEnjoy!").unwrap();
        assert_eq!(tree, HierarchyNode::leaf("R"));
    }

    #[test]
    fn top_level_arrays_are_rejected() {
        assert_eq!(
            parse_hierarchy(r#"[{"name":"x"}]"#),
            Err(HierarchyError::TopLevelArray)
        );
        assert_eq!(
            parse_hierarchy("Tree: [ {\"name\":\"x\"} ] done"),
            Err(HierarchyError::TopLevelArray)
        );
    }

    #[test]
    fn garbage_is_an_error() {
        assert_eq!(parse_hierarchy("no tree here"), Err(HierarchyError::NoObject));
        assert!(matches!(parse_hierarchy("{\"name\": }"), Err(HierarchyError::Syntax(_))));
    }

    #[test]
    fn depth_and_len() {
        let tree = parse_hierarchy(r#"{"name":"r","children":[{"name":"a","children":["b"]},"c"]}"#)
            .unwrap();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.len(), 4);
    }
}
