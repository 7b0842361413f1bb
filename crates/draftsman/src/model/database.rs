//! Diagram database implementation
//!
//! Stores one diagram: its settings, nodes with kinds, clusters as an arena
//! of nested groups, and edges with direction and labels.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, trace};

use super::EdgeSpec;
use crate::core::{
    Attributes, CurveStyle, Database, DiagramError, Direction, EdgeDirection, NodeKind,
    OutputFormat,
};

/// Fallback filename when a diagram has neither a name nor a filename
pub const DEFAULT_FILENAME: &str = "diagrams_image";

/// Diagram-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramSettings {
    /// Title, also the graph label
    pub name: String,
    /// Output file stem; derived from the name when absent
    pub filename: Option<String>,
    pub direction: Direction,
    pub curvestyle: CurveStyle,
    /// Formats produced by a build; never empty
    pub outformats: Vec<OutputFormat>,
    /// Prefix node labels with their kind's class name
    pub autolabel: bool,
    /// Open rendered files after a build
    pub show: bool,
    /// Emit a `strict digraph` (merges duplicate edges)
    pub strict: bool,
    pub graph_attr: Attributes,
    pub node_attr: Attributes,
    pub edge_attr: Attributes,
}

impl Default for DiagramSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            filename: None,
            direction: Direction::default(),
            curvestyle: CurveStyle::default(),
            outformats: vec![OutputFormat::Png],
            autolabel: false,
            show: false,
            strict: false,
            graph_attr: Attributes::new(),
            node_attr: Attributes::new(),
            edge_attr: Attributes::new(),
        }
    }
}

/// A node with its kind and cluster membership
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Unique identifier, also the DOT node id
    pub id: String,
    /// Display label
    pub label: String,
    pub kind: NodeKind,
    /// Innermost cluster the node was declared in
    pub cluster: Option<usize>,
    /// Per-node Graphviz attribute overrides
    pub attrs: Attributes,
}

impl NodeData {
    /// Create a new node outside any cluster
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            cluster: None,
            attrs: Attributes::new(),
        }
    }

    /// Place the node in a cluster
    pub fn in_cluster(mut self, cluster: usize) -> Self {
        self.cluster = Some(cluster);
        self
    }

    /// Label as rendered, honoring `autolabel`
    pub fn display_label(&self, autolabel: bool) -> String {
        if !autolabel {
            return self.label.clone();
        }
        let prefix = self.kind.class_name();
        if self.label.is_empty() {
            prefix.to_string()
        } else {
            format!("{}\n{}", prefix, self.label)
        }
    }
}

/// An edge connecting two nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeData {
    pub from: String,
    pub to: String,
    pub direction: EdgeDirection,
    pub label: Option<String>,
    pub color: Option<String>,
    pub style: Option<String>,
    pub attrs: Attributes,
}

impl EdgeData {
    /// Create a new forward edge
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            direction: EdgeDirection::Forward,
            label: None,
            color: None,
            style: None,
            attrs: Attributes::new(),
        }
    }

    /// Create an edge from a chained edge spec
    pub fn from_spec(from: impl Into<String>, to: impl Into<String>, spec: &EdgeSpec) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            direction: spec.direction(),
            label: spec.label.clone(),
            color: spec.color.clone(),
            style: spec.style.clone(),
            attrs: spec.attrs.clone(),
        }
    }

    pub fn with_direction(mut self, direction: EdgeDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A named group of nodes, possibly nested in another cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterData {
    /// Position in the cluster arena
    pub index: usize,
    /// DOT subgraph name, always prefixed with `cluster_`
    pub name: String,
    pub label: String,
    pub parent: Option<usize>,
    /// Nesting depth, 0 for top-level clusters
    pub depth: usize,
    pub direction: Direction,
    pub graph_attr: Attributes,
}

/// Diagram database implementation
///
/// Maintains insertion order for nodes, clusters and edges so output is
/// deterministic.
#[derive(Debug, Default, Clone)]
pub struct DiagramDatabase {
    settings: DiagramSettings,
    /// Nodes indexed by ID
    nodes: HashMap<String, NodeData>,
    /// Node IDs in insertion order
    node_order: Vec<String>,
    clusters: Vec<ClusterData>,
    edges: Vec<EdgeData>,
}

impl DiagramDatabase {
    /// Create a new empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new database with the given settings
    pub fn with_settings(settings: DiagramSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &DiagramSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut DiagramSettings {
        &mut self.settings
    }

    pub fn set_settings(&mut self, settings: DiagramSettings) {
        self.settings = settings;
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn direction(&self) -> Direction {
        self.settings.direction
    }

    /// File stem for rendered output
    ///
    /// The explicit filename wins; otherwise the name's whitespace-separated
    /// words joined by `_` and lower-cased; `diagrams_image` when both are empty.
    pub fn output_filename(&self) -> String {
        if let Some(filename) = self.settings.filename.as_deref().filter(|f| !f.is_empty()) {
            return filename.to_string();
        }
        let name = self.settings.name.split_whitespace().collect::<Vec<_>>();
        if name.is_empty() {
            DEFAULT_FILENAME.to_string()
        } else {
            name.join("_").to_lowercase()
        }
    }

    /// Check if a node exists
    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Add a cluster and return its index
    pub fn add_cluster(
        &mut self,
        label: impl Into<String>,
        parent: Option<usize>,
        direction: Direction,
        graph_attr: Attributes,
    ) -> Result<usize, DiagramError> {
        let label = label.into();
        let depth = match parent {
            Some(p) => {
                self.clusters
                    .get(p)
                    .ok_or(DiagramError::UnknownCluster { index: p })?
                    .depth
                    + 1
            }
            None => 0,
        };

        let base = format!("cluster_{}", label);
        let mut name = base.clone();
        let mut suffix = 2;
        while self.clusters.iter().any(|c| c.name == name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        let index = self.clusters.len();
        trace!(index, name = %name, ?parent, depth, "Adding cluster");
        self.clusters.push(ClusterData {
            index,
            name,
            label,
            parent,
            depth,
            direction,
            graph_attr,
        });
        Ok(index)
    }

    pub fn get_cluster(&self, index: usize) -> Option<&ClusterData> {
        self.clusters.get(index)
    }

    /// All clusters in declaration order
    pub fn clusters(&self) -> &[ClusterData] {
        &self.clusters
    }

    /// Clusters directly inside `parent` (`None` for top level)
    pub fn child_clusters(&self, parent: Option<usize>) -> Vec<&ClusterData> {
        self.clusters
            .iter()
            .filter(|c| c.parent == parent)
            .collect()
    }

    /// Nodes declared directly in a cluster, in insertion order
    pub fn cluster_members(&self, cluster: usize) -> Vec<&NodeData> {
        self.nodes()
            .filter(|n| n.cluster == Some(cluster))
            .collect()
    }

    /// Nodes of a cluster including those of nested clusters
    pub fn cluster_members_recursive(&self, cluster: usize) -> Vec<&NodeData> {
        self.nodes()
            .filter(|n| {
                let mut current = n.cluster;
                while let Some(c) = current {
                    if c == cluster {
                        return true;
                    }
                    current = self.clusters.get(c).and_then(|c| c.parent);
                }
                false
            })
            .collect()
    }

    /// Nodes outside any cluster
    pub fn root_nodes(&self) -> Vec<&NodeData> {
        self.nodes().filter(|n| n.cluster.is_none()).collect()
    }

    /// Connect two nodes using a chained edge spec
    pub fn connect(&mut self, from: &str, to: &str, spec: &EdgeSpec) -> Result<(), DiagramError> {
        self.insert_edge(EdgeData::from_spec(from, to, spec))
    }

    fn insert_node(&mut self, node: NodeData) -> Result<(), DiagramError> {
        if self.nodes.contains_key(&node.id) {
            return Err(DiagramError::DuplicateNode { id: node.id });
        }
        if let Some(cluster) = node.cluster {
            if cluster >= self.clusters.len() {
                return Err(DiagramError::UnknownCluster { index: cluster });
            }
        }
        trace!(id = %node.id, kind = %node.kind, "Adding node");
        self.node_order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    fn insert_edge(&mut self, edge: EdgeData) -> Result<(), DiagramError> {
        for id in [&edge.from, &edge.to] {
            if !self.nodes.contains_key(id) {
                return Err(DiagramError::UnknownNode { id: id.clone() });
            }
        }
        trace!(from = %edge.from, to = %edge.to, dir = %edge.direction, "Adding edge");
        self.edges.push(edge);
        Ok(())
    }

    /// Get in-degree (number of incoming edges) for a node
    pub fn in_degree(&self, node_id: &str) -> usize {
        self.edges.iter().filter(|e| e.to == node_id).count()
    }

    /// Get out-degree (number of outgoing edges) for a node
    pub fn out_degree(&self, node_id: &str) -> usize {
        self.edges.iter().filter(|e| e.from == node_id).count()
    }

    /// Get IDs of nodes that this node points to
    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.from == node_id)
            .map(|e| e.to.as_str())
            .collect()
    }

    /// Get IDs of nodes that point to this node
    pub fn predecessors(&self, node_id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.to == node_id)
            .map(|e| e.from.as_str())
            .collect()
    }

    /// Topological sort using Kahn's algorithm
    ///
    /// Ready nodes are taken in insertion order. If the graph has cycles the
    /// remaining nodes are appended in insertion order.
    pub fn topological_sort(&self) -> Vec<&str> {
        trace!(
            node_count = self.node_count(),
            edge_count = self.edge_count(),
            "Starting topological sort"
        );
        let position: HashMap<&str, usize> = self
            .node_order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let mut in_degree = vec![0usize; self.node_order.len()];
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); self.node_order.len()];

        for edge in &self.edges {
            if let (Some(&from), Some(&to)) =
                (position.get(edge.from.as_str()), position.get(edge.to.as_str()))
            {
                if from != to {
                    in_degree[to] += 1;
                    adjacency[from].push(to);
                }
            }
        }

        let mut queue: VecDeque<usize> = (0..self.node_order.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut visited = vec![false; self.node_order.len()];
        let mut result = Vec::with_capacity(self.node_order.len());

        while let Some(node) = queue.pop_front() {
            visited[node] = true;
            result.push(self.node_order[node].as_str());
            let mut ready = Vec::new();
            for &next in &adjacency[node] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(next);
                }
            }
            ready.sort_unstable();
            queue.extend(ready);
        }

        if result.len() < self.node_order.len() {
            debug!(
                sorted_count = result.len(),
                total_nodes = self.node_order.len(),
                "Cycle detected in graph"
            );
            for (i, id) in self.node_order.iter().enumerate() {
                if !visited[i] {
                    result.push(id.as_str());
                }
            }
        }

        result
    }

    /// Check that the node and edge lists are well-formed
    pub fn validate(&self) -> Result<(), DiagramError> {
        if self.settings.outformats.is_empty() {
            return Err(DiagramError::validation_error(
                "at least one output format is required",
            ));
        }
        for (i, cluster) in self.clusters.iter().enumerate() {
            if cluster.index != i {
                return Err(DiagramError::validation_error(format!(
                    "cluster '{}' is stored at {} but claims index {}",
                    cluster.label, i, cluster.index
                )));
            }
            if let Some(parent) = cluster.parent {
                if parent >= i {
                    return Err(DiagramError::validation_error(format!(
                        "cluster '{}' must be declared after its parent",
                        cluster.label
                    )));
                }
            }
        }
        for node in self.nodes() {
            if let Some(cluster) = node.cluster {
                if cluster >= self.clusters.len() {
                    return Err(DiagramError::UnknownCluster { index: cluster });
                }
            }
        }
        for edge in &self.edges {
            for id in [&edge.from, &edge.to] {
                if !self.nodes.contains_key(id) {
                    return Err(DiagramError::UnknownNode { id: id.clone() });
                }
            }
        }
        debug!(
            nodes = self.node_count(),
            edges = self.edge_count(),
            clusters = self.clusters.len(),
            "Diagram validated"
        );
        Ok(())
    }
}

impl Database for DiagramDatabase {
    type Node = NodeData;
    type Edge = EdgeData;

    fn add_node(&mut self, node: Self::Node) -> Result<()> {
        Ok(self.insert_node(node)?)
    }

    fn add_edge(&mut self, edge: Self::Edge) -> Result<()> {
        Ok(self.insert_edge(edge)?)
    }

    fn get_node(&self, id: &str) -> Option<&Self::Node> {
        self.nodes.get(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    fn edges(&self) -> impl Iterator<Item = &Self::Edge> {
        self.edges.iter()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.node_order.clear();
        self.clusters.clear();
        self.edges.clear();
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DiagramDatabase {
        let mut db = DiagramDatabase::new();
        db.add_node(NodeData::new("a", "A", NodeKind::User)).unwrap();
        db.add_node(NodeData::new("b", "B", NodeKind::Preparation)).unwrap();
        db.add_node(NodeData::new("c", "C", NodeKind::Database)).unwrap();
        db.add_edge(EdgeData::new("a", "b")).unwrap();
        db.add_edge(EdgeData::new("b", "c")).unwrap();
        db
    }

    #[test]
    fn test_new_database_is_empty() {
        let db = DiagramDatabase::new();
        assert_eq!(db.node_count(), 0);
        assert_eq!(db.edge_count(), 0);
        assert_eq!(db.direction(), Direction::LeftRight);
        assert_eq!(db.settings().outformats, vec![OutputFormat::Png]);
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut db = sample();
        let err = db
            .add_node(NodeData::new("a", "Again", NodeKind::Generic))
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate node id: a"));
    }

    #[test]
    fn test_edge_to_unknown_node_rejected() {
        let mut db = sample();
        let err = db.add_edge(EdgeData::new("a", "zzz")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DiagramError>(),
            Some(DiagramError::UnknownNode { id }) if id == "zzz"
        ));
    }

    #[test]
    fn test_node_in_unknown_cluster_rejected() {
        let mut db = DiagramDatabase::new();
        let result = db.add_node(NodeData::new("a", "A", NodeKind::Action).in_cluster(3));
        assert!(result.is_err());
    }

    #[test]
    fn test_nodes_keep_insertion_order() {
        let db = sample();
        let ids: Vec<_> = db.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_degrees_and_neighbours() {
        let db = sample();
        assert_eq!(db.in_degree("a"), 0);
        assert_eq!(db.out_degree("a"), 1);
        assert_eq!(db.successors("b"), vec!["c"]);
        assert_eq!(db.predecessors("b"), vec!["a"]);
    }

    #[test]
    fn test_topological_sort() {
        let db = sample();
        assert_eq!(db.topological_sort(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_topological_sort_with_cycle_returns_all_nodes() {
        let mut db = sample();
        db.add_edge(EdgeData::new("c", "a")).unwrap();
        let sorted = db.topological_sort();
        assert_eq!(sorted.len(), 3);
    }

    #[test]
    fn test_output_filename() {
        let mut db = DiagramDatabase::new();
        assert_eq!(db.output_filename(), "diagrams_image");

        db.settings_mut().name = "Cli  Social Command".to_string();
        assert_eq!(db.output_filename(), "cli_social_command");

        db.settings_mut().filename = Some("daily-bugle".to_string());
        assert_eq!(db.output_filename(), "daily-bugle");
    }

    #[test]
    fn test_cluster_names_are_unique() {
        let mut db = DiagramDatabase::new();
        let a = db
            .add_cluster("Workers", None, Direction::LeftRight, Attributes::new())
            .unwrap();
        let b = db
            .add_cluster("Workers", None, Direction::LeftRight, Attributes::new())
            .unwrap();
        assert_eq!(db.get_cluster(a).unwrap().name, "cluster_Workers");
        assert_eq!(db.get_cluster(b).unwrap().name, "cluster_Workers_2");
    }

    #[test]
    fn test_nested_cluster_depth_and_members() {
        let mut db = DiagramDatabase::new();
        let outer = db
            .add_cluster("Outer", None, Direction::LeftRight, Attributes::new())
            .unwrap();
        let inner = db
            .add_cluster("Inner", Some(outer), Direction::TopBottom, Attributes::new())
            .unwrap();
        db.add_node(NodeData::new("x", "X", NodeKind::Action).in_cluster(inner))
            .unwrap();
        db.add_node(NodeData::new("y", "Y", NodeKind::Action).in_cluster(outer))
            .unwrap();
        db.add_node(NodeData::new("z", "Z", NodeKind::Action)).unwrap();

        assert_eq!(db.get_cluster(inner).unwrap().depth, 1);
        assert_eq!(db.cluster_members(outer).len(), 1);
        assert_eq!(db.cluster_members_recursive(outer).len(), 2);
        assert_eq!(db.root_nodes().len(), 1);
        assert_eq!(db.child_clusters(Some(outer)).len(), 1);
        assert_eq!(db.child_clusters(None).len(), 1);
    }

    #[test]
    fn test_display_label_autolabel() {
        let node = NodeData::new("a", "Analyzer_1", NodeKind::Action);
        assert_eq!(node.display_label(false), "Analyzer_1");
        assert_eq!(node.display_label(true), "Action\nAnalyzer_1");

        let empty = NodeData::new("b", "", NodeKind::Database);
        assert_eq!(empty.display_label(true), "Database");
    }

    #[test]
    fn test_validate_rejects_empty_outformats() {
        let mut db = sample();
        assert!(db.validate().is_ok());
        db.settings_mut().outformats.clear();
        assert!(db.validate().is_err());
    }

    #[test]
    fn test_clear() {
        let mut db = sample();
        db.clear();
        assert_eq!(db.node_count(), 0);
        assert_eq!(db.edge_count(), 0);
        assert!(db.clusters().is_empty());
    }
}
