//! Connection chains
//!
//! A chain is a left fold over operands joined by `>>`, `<<` or `-`.
//! Operands are groups of nodes or a pending edge carrying label and style.

use tracing::trace;

use super::DiagramDatabase;
use crate::core::{Attributes, DiagramError, EdgeDirection};

/// Label, style and direction flags for an edge placed inside a chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSpec {
    pub label: Option<String>,
    pub color: Option<String>,
    pub style: Option<String>,
    pub attrs: Attributes,
    /// Arrowhead at the target
    pub forward: bool,
    /// Arrowhead at the source
    pub reverse: bool,
}

impl EdgeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labeled(label: impl Into<String>) -> Self {
        Self::new().with_label(label)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(key, value);
        self
    }

    /// Set a field by its attribute name
    ///
    /// `label`, `color` and `style` fill the dedicated fields, `forward` and
    /// `reverse` take booleans, anything else becomes an extra attribute.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), DiagramError> {
        let value = value.into();
        match key {
            "label" => self.label = Some(value),
            "color" => self.color = Some(value),
            "style" => self.style = Some(value),
            "forward" => self.forward = parse_flag(key, &value)?,
            "reverse" => self.reverse = parse_flag(key, &value)?,
            _ => self.attrs.set(key, value),
        }
        Ok(())
    }

    /// Resolved Graphviz `dir`
    pub fn direction(&self) -> EdgeDirection {
        EdgeDirection::from_flags(self.forward, self.reverse)
    }

    fn mark(&mut self, op: ChainOp) {
        match op {
            ChainOp::Forward => self.forward = true,
            ChainOp::Back => self.reverse = true,
            ChainOp::Undirected => {}
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, DiagramError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(DiagramError::validation_error(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}

/// Chain operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOp {
    /// `>>`
    Forward,
    /// `<<`
    Back,
    /// `-`
    Undirected,
}

impl ChainOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ChainOp::Forward => ">>",
            ChainOp::Back => "<<",
            ChainOp::Undirected => "-",
        }
    }

    /// Spec for a bare node-to-node connection
    fn bare_edge(&self) -> EdgeSpec {
        let mut spec = EdgeSpec::new();
        spec.mark(*self);
        spec
    }
}

impl std::fmt::Display for ChainOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One side of a chain operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// One or more node ids
    Nodes(Vec<String>),
    /// An edge waiting for its endpoints
    Edge(EdgeSpec),
}

impl Operand {
    pub fn node(id: impl Into<String>) -> Self {
        Operand::Nodes(vec![id.into()])
    }
}

impl From<EdgeSpec> for Operand {
    fn from(spec: EdgeSpec) -> Self {
        Operand::Edge(spec)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Nodes(Vec<String>),
    Edge { spec: EdgeSpec, tails: Vec<String> },
}

/// Running state of a chain fold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainState {
    pending: Pending,
    edges_created: usize,
}

impl ChainState {
    /// Start a chain at its first operand
    pub fn start(operand: Operand) -> Self {
        let pending = match operand {
            Operand::Nodes(ids) => Pending::Nodes(ids),
            Operand::Edge(spec) => Pending::Edge {
                spec,
                tails: Vec::new(),
            },
        };
        Self {
            pending,
            edges_created: 0,
        }
    }

    /// Apply one operator and its right operand, adding edges to the database
    pub fn apply(
        &mut self,
        db: &mut DiagramDatabase,
        op: ChainOp,
        operand: Operand,
    ) -> Result<(), DiagramError> {
        let pending = std::mem::replace(&mut self.pending, Pending::Nodes(Vec::new()));
        self.pending = match (pending, operand) {
            (Pending::Nodes(left), Operand::Nodes(right)) => {
                let spec = op.bare_edge();
                self.connect_all(db, &left, &right, &spec)?;
                Pending::Nodes(right)
            }
            (Pending::Nodes(left), Operand::Edge(mut spec)) => {
                spec.mark(op);
                Pending::Edge { spec, tails: left }
            }
            (Pending::Edge { mut spec, tails }, Operand::Nodes(right)) => {
                spec.mark(op);
                if tails.is_empty() {
                    Pending::Edge { spec, tails: right }
                } else {
                    self.connect_all(db, &tails, &right, &spec)?;
                    Pending::Nodes(right)
                }
            }
            (Pending::Edge { .. }, Operand::Edge(_)) => {
                return Err(DiagramError::invalid_chain(format!(
                    "an edge cannot be followed by '{}' and another edge",
                    op
                )));
            }
        };
        Ok(())
    }

    fn connect_all(
        &mut self,
        db: &mut DiagramDatabase,
        left: &[String],
        right: &[String],
        spec: &EdgeSpec,
    ) -> Result<(), DiagramError> {
        for from in left {
            for to in right {
                trace!(from = %from, to = %to, dir = %spec.direction(), "Chain edge");
                db.connect(from, to, spec)?;
                self.edges_created += 1;
            }
        }
        Ok(())
    }

    /// Number of edges added so far
    pub fn edges_created(&self) -> usize {
        self.edges_created
    }

    /// Finish the chain, returning the last group of nodes
    pub fn finish(self) -> Result<Vec<String>, DiagramError> {
        match self.pending {
            Pending::Nodes(ids) => Ok(ids),
            Pending::Edge { .. } => Err(DiagramError::invalid_chain(
                "a chain cannot end with an edge",
            )),
        }
    }
}

/// Evaluate a whole chain in one call
pub fn evaluate(
    db: &mut DiagramDatabase,
    head: Operand,
    links: impl IntoIterator<Item = (ChainOp, Operand)>,
) -> Result<Vec<String>, DiagramError> {
    let mut state = ChainState::start(head);
    for (op, operand) in links {
        state.apply(db, op, operand)?;
    }
    state.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Database, NodeKind};
    use crate::model::NodeData;

    fn db_with(ids: &[&str]) -> DiagramDatabase {
        let mut db = DiagramDatabase::new();
        for id in ids {
            db.add_node(NodeData::new(*id, id.to_uppercase(), NodeKind::Action))
                .unwrap();
        }
        db
    }

    fn nodes(ids: &[&str]) -> Operand {
        Operand::Nodes(ids.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_forward_chain() {
        let mut db = db_with(&["a", "b", "c"]);
        let last = evaluate(
            &mut db,
            nodes(&["a"]),
            [(ChainOp::Forward, nodes(&["b"])), (ChainOp::Forward, nodes(&["c"]))],
        )
        .unwrap();
        assert_eq!(last, vec!["c"]);
        let edges: Vec<_> = db.edges().map(|e| (e.from.as_str(), e.to.as_str())).collect();
        assert_eq!(edges, vec![("a", "b"), ("b", "c")]);
        assert!(db.edges().all(|e| e.direction == EdgeDirection::Forward));
    }

    #[test]
    fn test_back_keeps_source_on_the_left() {
        let mut db = db_with(&["a", "b"]);
        evaluate(&mut db, nodes(&["a"]), [(ChainOp::Back, nodes(&["b"]))]).unwrap();
        let edge = db.edges().next().unwrap();
        assert_eq!((edge.from.as_str(), edge.to.as_str()), ("a", "b"));
        assert_eq!(edge.direction, EdgeDirection::Back);
    }

    #[test]
    fn test_undirected() {
        let mut db = db_with(&["a", "b"]);
        evaluate(&mut db, nodes(&["a"]), [(ChainOp::Undirected, nodes(&["b"]))]).unwrap();
        assert_eq!(db.edges().next().unwrap().direction, EdgeDirection::None);
    }

    #[test]
    fn test_fan_out_is_cross_product() {
        let mut db = db_with(&["src", "w1", "w2", "w3", "store"]);
        evaluate(
            &mut db,
            nodes(&["src"]),
            [
                (ChainOp::Forward, nodes(&["w1", "w2", "w3"])),
                (ChainOp::Forward, nodes(&["store"])),
            ],
        )
        .unwrap();
        assert_eq!(db.edge_count(), 6);
        assert_eq!(db.in_degree("store"), 3);
        assert_eq!(db.out_degree("src"), 3);
    }

    #[test]
    fn test_labeled_edge_both_directions() {
        let mut db = db_with(&["service", "storage"]);
        evaluate(
            &mut db,
            nodes(&["service"]),
            [
                (ChainOp::Forward, Operand::Edge(EdgeSpec::labeled("Searches"))),
                (ChainOp::Back, nodes(&["storage"])),
            ],
        )
        .unwrap();
        assert_eq!(db.edge_count(), 1);
        let edge = db.edges().next().unwrap();
        assert_eq!(edge.from, "service");
        assert_eq!(edge.to, "storage");
        assert_eq!(edge.direction, EdgeDirection::Both);
        assert_eq!(edge.label.as_deref(), Some("Searches"));
    }

    #[test]
    fn test_edge_first_binds_following_nodes() {
        let mut db = db_with(&["a", "b"]);
        evaluate(
            &mut db,
            Operand::Edge(EdgeSpec::new().with_color("red")),
            [(ChainOp::Forward, nodes(&["a"])), (ChainOp::Forward, nodes(&["b"]))],
        )
        .unwrap();
        let edge = db.edges().next().unwrap();
        assert_eq!((edge.from.as_str(), edge.to.as_str()), ("a", "b"));
        assert_eq!(edge.color.as_deref(), Some("red"));
    }

    #[test]
    fn test_edge_after_edge_is_rejected() {
        let mut db = db_with(&["a"]);
        let err = evaluate(
            &mut db,
            nodes(&["a"]),
            [
                (ChainOp::Forward, Operand::Edge(EdgeSpec::new())),
                (ChainOp::Forward, Operand::Edge(EdgeSpec::new())),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, DiagramError::InvalidChain { .. }));
    }

    #[test]
    fn test_trailing_edge_is_rejected() {
        let mut db = db_with(&["a"]);
        let err = evaluate(
            &mut db,
            nodes(&["a"]),
            [(ChainOp::Forward, Operand::Edge(EdgeSpec::new()))],
        )
        .unwrap_err();
        assert!(err.to_string().contains("cannot end with an edge"));
    }

    #[test]
    fn test_unknown_node_in_chain() {
        let mut db = db_with(&["a"]);
        let err = evaluate(&mut db, nodes(&["a"]), [(ChainOp::Forward, nodes(&["ghost"]))])
            .unwrap_err();
        assert!(matches!(err, DiagramError::UnknownNode { .. }));
    }

    #[test]
    fn test_edge_spec_set() {
        let mut spec = EdgeSpec::new();
        spec.set("label", "Feeds").unwrap();
        spec.set("penwidth", "2").unwrap();
        spec.set("forward", "true").unwrap();
        assert_eq!(spec.label.as_deref(), Some("Feeds"));
        assert_eq!(spec.attrs.get("penwidth"), Some("2"));
        assert_eq!(spec.direction(), EdgeDirection::Forward);
        assert!(spec.set("reverse", "maybe").is_err());
    }
}
