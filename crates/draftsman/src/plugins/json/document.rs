//! Serializable diagram document

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::{Attributes, Database, Direction, EdgeDirection, NodeKind};
use crate::model::{DiagramDatabase, DiagramSettings, EdgeData, NodeData};

/// JSON form of a diagram
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagramDocument {
    #[serde(flatten)]
    pub settings: DiagramSettings,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clusters: Vec<ClusterEntry>,
    #[serde(default)]
    pub nodes: Vec<NodeEntry>,
    #[serde(default)]
    pub edges: Vec<EdgeEntry>,
}

/// A cluster; `parent` is an index into the document's cluster list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterEntry {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub graph_attr: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub id: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<usize>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attrs: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeEntry {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub direction: EdgeDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attrs: Attributes,
}

impl DiagramDocument {
    /// Export a database
    pub fn from_database(db: &DiagramDatabase) -> Self {
        Self {
            settings: db.settings().clone(),
            clusters: db
                .clusters()
                .iter()
                .map(|c| ClusterEntry {
                    label: c.label.clone(),
                    parent: c.parent,
                    direction: c.direction,
                    graph_attr: c.graph_attr.clone(),
                })
                .collect(),
            nodes: db
                .nodes()
                .map(|n| NodeEntry {
                    id: n.id.clone(),
                    kind: n.kind,
                    label: n.label.clone(),
                    cluster: n.cluster,
                    attrs: n.attrs.clone(),
                })
                .collect(),
            edges: db
                .edges()
                .map(|e| EdgeEntry {
                    from: e.from.clone(),
                    to: e.to.clone(),
                    direction: e.direction,
                    label: e.label.clone(),
                    color: e.color.clone(),
                    style: e.style.clone(),
                    attrs: e.attrs.clone(),
                })
                .collect(),
        }
    }

    /// Load the document into a database, checking every reference
    pub fn load_into(self, db: &mut DiagramDatabase) -> Result<()> {
        db.set_settings(self.settings);
        for cluster in self.clusters {
            db.add_cluster(cluster.label, cluster.parent, cluster.direction, cluster.graph_attr)?;
        }
        for node in self.nodes {
            db.add_node(NodeData {
                id: node.id,
                label: node.label,
                kind: node.kind,
                cluster: node.cluster,
                attrs: node.attrs,
            })?;
        }
        for edge in self.edges {
            db.add_edge(EdgeData {
                from: edge.from,
                to: edge.to,
                direction: edge.direction,
                label: edge.label,
                color: edge.color,
                style: edge.style,
                attrs: edge.attrs,
            })?;
        }
        Ok(())
    }

    /// Build a fresh database from the document
    pub fn into_database(self) -> Result<DiagramDatabase> {
        let mut db = DiagramDatabase::new();
        self.load_into(&mut db)?;
        Ok(db)
    }
}
