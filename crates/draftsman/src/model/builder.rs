//! Typed builder for diagrams
//!
//! ```
//! use draftsman::core::NodeKind;
//! use draftsman::model::{DiagramBuilder, EdgeSpec};
//!
//! let mut d = DiagramBuilder::new("Web Service");
//! let lb = d.node(NodeKind::Client, "lb");
//! let workers = d.cluster("Workers", |d| {
//!     (1..=3)
//!         .map(|i| d.node(NodeKind::Action, format!("worker_{}", i)))
//!         .collect::<Vec<_>>()
//! });
//! let db = d.node(NodeKind::Database, "events");
//!
//! (d.chain(&lb) >> &workers >> EdgeSpec::labeled("writes") >> &db)
//!     .end()
//!     .unwrap();
//!
//! let diagram = d.finish().unwrap();
//! assert_eq!(diagram.output_filename(), "web_service");
//! ```

use anyhow::Result;
use std::ops::{Shl, Shr, Sub};
use tracing::debug;

use super::{ChainOp, ChainState, DiagramDatabase, NodeData, Operand};
use crate::core::{
    slugify, Attributes, CurveStyle, Database, DiagramError, Direction, NodeKind, OutputFormat,
};

/// Handle to a node created by a builder
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&NodeId> for Operand {
    fn from(id: &NodeId) -> Self {
        Operand::Nodes(vec![id.0.clone()])
    }
}

impl From<NodeId> for Operand {
    fn from(id: NodeId) -> Self {
        Operand::Nodes(vec![id.0])
    }
}

impl From<&[NodeId]> for Operand {
    fn from(ids: &[NodeId]) -> Self {
        Operand::Nodes(ids.iter().map(|id| id.0.clone()).collect())
    }
}

impl From<&Vec<NodeId>> for Operand {
    fn from(ids: &Vec<NodeId>) -> Self {
        Operand::from(ids.as_slice())
    }
}

impl From<Vec<NodeId>> for Operand {
    fn from(ids: Vec<NodeId>) -> Self {
        Operand::Nodes(ids.into_iter().map(|id| id.0).collect())
    }
}

impl<const N: usize> From<&[NodeId; N]> for Operand {
    fn from(ids: &[NodeId; N]) -> Self {
        Operand::from(ids.as_slice())
    }
}

/// Builds a [`DiagramDatabase`] with nested cluster scopes
#[derive(Debug)]
pub struct DiagramBuilder {
    db: DiagramDatabase,
    cluster_stack: Vec<usize>,
}

impl DiagramBuilder {
    /// Start a diagram with the given name
    pub fn new(name: impl Into<String>) -> Self {
        let mut db = DiagramDatabase::new();
        db.settings_mut().name = name.into();
        Self {
            db,
            cluster_stack: Vec::new(),
        }
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.db.settings_mut().filename = Some(filename.into());
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.db.settings_mut().direction = direction;
        self
    }

    pub fn curvestyle(mut self, curvestyle: CurveStyle) -> Self {
        self.db.settings_mut().curvestyle = curvestyle;
        self
    }

    /// Produce a single output format
    pub fn outformat(mut self, format: OutputFormat) -> Self {
        self.db.settings_mut().outformats = vec![format];
        self
    }

    pub fn outformats(mut self, formats: impl IntoIterator<Item = OutputFormat>) -> Self {
        self.db.settings_mut().outformats = formats.into_iter().collect();
        self
    }

    pub fn autolabel(mut self, autolabel: bool) -> Self {
        self.db.settings_mut().autolabel = autolabel;
        self
    }

    pub fn show(mut self, show: bool) -> Self {
        self.db.settings_mut().show = show;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.db.settings_mut().strict = strict;
        self
    }

    pub fn graph_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.db.settings_mut().graph_attr.set(key, value);
        self
    }

    pub fn node_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.db.settings_mut().node_attr.set(key, value);
        self
    }

    pub fn edge_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.db.settings_mut().edge_attr.set(key, value);
        self
    }

    /// Add a node in the current cluster scope
    ///
    /// The id is derived from the label and made unique with a numeric suffix.
    pub fn node(&mut self, kind: NodeKind, label: impl Into<String>) -> NodeId {
        let label = label.into();
        let base = slugify(&label);
        let mut id = base.clone();
        let mut suffix = 2;
        while self.db.has_node(&id) {
            id = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        let node = NodeData {
            id: id.clone(),
            label,
            kind,
            cluster: self.current_cluster(),
            attrs: Attributes::new(),
        };
        // Unique id and a cluster from our own stack cannot be rejected
        if let Err(err) = self.db.add_node(node) {
            debug!(error = %err, "Builder node rejected");
        }
        NodeId(id)
    }

    /// Add a node with an explicit id and attributes
    pub fn node_with_id(
        &mut self,
        id: impl Into<String>,
        kind: NodeKind,
        label: impl Into<String>,
        attrs: Attributes,
    ) -> Result<NodeId> {
        let id = id.into();
        let node = NodeData {
            id: id.clone(),
            label: label.into(),
            kind,
            cluster: self.current_cluster(),
            attrs,
        };
        self.db.add_node(node)?;
        Ok(NodeId(id))
    }

    /// Open a cluster with the default direction
    pub fn cluster<R>(&mut self, label: impl Into<String>, scope: impl FnOnce(&mut Self) -> R) -> R {
        self.cluster_with(label, Direction::default(), Attributes::new(), scope)
    }

    pub fn cluster_with_direction<R>(
        &mut self,
        label: impl Into<String>,
        direction: Direction,
        scope: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.cluster_with(label, direction, Attributes::new(), scope)
    }

    /// Open a cluster; nodes and clusters created inside `scope` belong to it
    pub fn cluster_with<R>(
        &mut self,
        label: impl Into<String>,
        direction: Direction,
        graph_attr: Attributes,
        scope: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let parent = self.current_cluster();
        match self.db.add_cluster(label, parent, direction, graph_attr) {
            Ok(index) => {
                self.cluster_stack.push(index);
                let result = scope(self);
                self.cluster_stack.pop();
                result
            }
            Err(err) => {
                // The parent always comes from our own stack
                debug!(error = %err, "Builder cluster rejected");
                scope(self)
            }
        }
    }

    fn current_cluster(&self) -> Option<usize> {
        self.cluster_stack.last().copied()
    }

    /// Start a connection chain
    pub fn chain(&mut self, start: impl Into<Operand>) -> Chain<'_> {
        Chain {
            builder: self,
            state: Ok(ChainState::start(start.into())),
        }
    }

    /// Connect two operands with a single operator
    pub fn connect(
        &mut self,
        from: impl Into<Operand>,
        op: ChainOp,
        to: impl Into<Operand>,
    ) -> Result<Vec<NodeId>> {
        self.chain(from).then(op, to).end()
    }

    /// Read access to the diagram built so far
    pub fn database(&self) -> &DiagramDatabase {
        &self.db
    }

    /// Validate and return the diagram
    pub fn finish(self) -> Result<DiagramDatabase> {
        self.db.validate()?;
        debug!(
            name = %self.db.name(),
            nodes = self.db.node_count(),
            edges = self.db.edge_count(),
            "Diagram built"
        );
        Ok(self.db)
    }
}

/// A connection chain in progress
///
/// Errors are held until [`Chain::end`] so operators can be written inline.
#[must_use = "a chain does nothing until `end` is called"]
pub struct Chain<'a> {
    builder: &'a mut DiagramBuilder,
    state: Result<ChainState, DiagramError>,
}

impl<'a> Chain<'a> {
    /// Apply an operator and operand
    pub fn then(mut self, op: ChainOp, operand: impl Into<Operand>) -> Self {
        let operand = operand.into();
        if let Ok(state) = &mut self.state {
            if let Err(err) = state.apply(&mut self.builder.db, op, operand) {
                self.state = Err(err);
            }
        }
        self
    }

    /// `>>`
    pub fn forward(self, operand: impl Into<Operand>) -> Self {
        self.then(ChainOp::Forward, operand)
    }

    /// `<<`
    pub fn back(self, operand: impl Into<Operand>) -> Self {
        self.then(ChainOp::Back, operand)
    }

    /// `-`
    pub fn link(self, operand: impl Into<Operand>) -> Self {
        self.then(ChainOp::Undirected, operand)
    }

    /// Finish the chain, returning the last group of nodes
    pub fn end(self) -> Result<Vec<NodeId>> {
        let ids = self.state?.finish()?;
        Ok(ids.into_iter().map(NodeId).collect())
    }
}

impl<'a, T: Into<Operand>> Shr<T> for Chain<'a> {
    type Output = Chain<'a>;

    fn shr(self, rhs: T) -> Chain<'a> {
        self.forward(rhs)
    }
}

impl<'a, T: Into<Operand>> Shl<T> for Chain<'a> {
    type Output = Chain<'a>;

    fn shl(self, rhs: T) -> Chain<'a> {
        self.back(rhs)
    }
}

impl<'a, T: Into<Operand>> Sub<T> for Chain<'a> {
    type Output = Chain<'a>;

    fn sub(self, rhs: T) -> Chain<'a> {
        self.link(rhs)
    }
}
