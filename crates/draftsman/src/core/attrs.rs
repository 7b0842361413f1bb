//! Graphviz attribute maps and the default attribute sets
//!
//! Defaults follow the look of the classic diagrams-as-code renderer:
//! rounded boxes, Sans-Serif labels and pastel cluster backgrounds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sorted key/value attribute map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from static key/value pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    /// Set an attribute, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style `set`
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Overlay `other` on top of `self`, key by key
    pub fn merge(&mut self, other: &Attributes) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Returns a copy of `self` with `other` overlaid
    pub fn merged(&self, other: &Attributes) -> Attributes {
        let mut out = self.clone();
        out.merge(other);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Background colors for clusters, cycled by nesting depth
pub const CLUSTER_BGCOLORS: [&str; 4] = ["#E5F5FD", "#EBF3E7", "#ECE8F6", "#FDF7E3"];

/// Height of an icon node before label padding
pub const ICON_NODE_HEIGHT: f64 = 1.9;

/// Extra height per additional label line on icon nodes
pub const LABEL_LINE_PADDING: f64 = 0.4;

/// Default top-level graph attributes
pub fn default_graph_attrs() -> Attributes {
    Attributes::from_pairs(&[
        ("pad", "2.0"),
        ("splines", "ortho"),
        ("nodesep", "0.60"),
        ("ranksep", "0.75"),
        ("fontname", "Sans-Serif"),
        ("fontsize", "15"),
        ("fontcolor", "#2D3436"),
    ])
}

/// Default node attributes
pub fn default_node_attrs() -> Attributes {
    Attributes::from_pairs(&[
        ("shape", "box"),
        ("style", "rounded"),
        ("fixedsize", "true"),
        ("width", "1.4"),
        ("height", "1.4"),
        ("labelloc", "b"),
        ("imagescale", "true"),
        ("fontname", "Sans-Serif"),
        ("fontsize", "13"),
        ("fontcolor", "#2D3436"),
    ])
}

/// Default diagram-wide edge attributes
pub fn default_edge_attrs() -> Attributes {
    Attributes::from_pairs(&[("color", "#7B8894")])
}

/// Font attributes applied to every individual edge
pub fn default_edge_label_attrs() -> Attributes {
    Attributes::from_pairs(&[
        ("fontcolor", "#2D3436"),
        ("fontname", "Sans-Serif"),
        ("fontsize", "13"),
    ])
}

/// Default cluster attributes
pub fn default_cluster_attrs() -> Attributes {
    Attributes::from_pairs(&[
        ("shape", "box"),
        ("style", "rounded"),
        ("labeljust", "l"),
        ("pencolor", "#AEB6BE"),
        ("fontname", "Sans-Serif"),
        ("fontsize", "12"),
    ])
}

/// Background color for a cluster at the given nesting depth
pub fn cluster_bgcolor(depth: usize) -> &'static str {
    CLUSTER_BGCOLORS[depth % CLUSTER_BGCOLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides_key_by_key() {
        let mut base = default_graph_attrs();
        let overrides = Attributes::new().with("bgcolor", "white").with("pad", "0.5");
        base.merge(&overrides);

        assert_eq!(base.get("bgcolor"), Some("white"));
        assert_eq!(base.get("pad"), Some("0.5"));
        assert_eq!(base.get("splines"), Some("ortho"));
    }

    #[test]
    fn test_iteration_is_sorted() {
        let attrs = Attributes::new().with("z", "1").with("a", "2").with("m", "3");
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "m", "z"]);
    }

    #[test]
    fn test_cluster_bgcolor_cycles() {
        assert_eq!(cluster_bgcolor(0), "#E5F5FD");
        assert_eq!(cluster_bgcolor(3), "#FDF7E3");
        assert_eq!(cluster_bgcolor(4), "#E5F5FD");
    }

    #[test]
    fn test_from_iterator() {
        let attrs: Attributes = vec![("color", "red")].into_iter().collect();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("color"), Some("red"));
    }
}
