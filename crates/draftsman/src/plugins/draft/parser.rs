//! Draft parser implementation
//!
//! Parses `.draft` sources line by line, delegating each statement to the
//! chumsky statement parser and applying it to a [`DiagramDatabase`].

use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, span, trace, Level};

use super::chumsky_parser::{
    AttrList, AttrTarget, ChumskyDraftParser, NodeRange, OperandRef, Statement,
};
use crate::core::{
    slugify, Attributes, Database, DiagramError, Direction, NodeKind, OutputFormat, Parser,
};
use crate::model::{ChainState, DiagramDatabase, EdgeSpec, NodeData, Operand};

/// Placeholder replaced by the index in range declarations
const RANGE_PLACEHOLDER: &str = "{n}";

/// Upper bound on the number of nodes a single range declaration may create
pub const MAX_RANGE_LEN: usize = 1000;

/// Draft parser implementation
pub struct DraftParser;

impl DraftParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DraftParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser<DiagramDatabase> for DraftParser {
    fn parse(&self, input: &str, database: &mut DiagramDatabase) -> Result<()> {
        let parse_span = span!(Level::DEBUG, "draft_parse", input_len = input.len());
        let _enter = parse_span.enter();

        let chumsky = ChumskyDraftParser::new();
        let mut state = ParseState::default();

        for (index, line) in input.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let column = line.len() - line.trim_start().len() + 1;

            let statement = chumsky.parse_statement(line).map_err(|(message, offset)| {
                let column = line[..offset.min(line.len())].chars().count() + 1;
                DiagramError::parse_error(message, line_no, column)
            })?;
            trace!(line = line_no, ?statement, "Parsed statement");

            state
                .apply(statement, line_no, database)
                .map_err(|err| match err {
                    err @ DiagramError::ParseError { .. } => err,
                    other => DiagramError::parse_error(other.to_string(), line_no, column),
                })?;
        }

        if let Some(open) = state.cluster_stack.last() {
            return Err(DiagramError::parse_error(
                format!("cluster '{}' is never closed", open.label),
                open.line,
                1,
            )
            .into());
        }

        debug!(
            node_count = database.node_count(),
            edge_count = database.edge_count(),
            cluster_count = database.clusters().len(),
            "Draft parsing completed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "draft"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        !input.trim_start().starts_with('{')
            && (input.contains("diagram \"") || input.contains(" >> ") || input.contains(" << "))
    }
}

struct OpenCluster {
    index: usize,
    label: String,
    line: usize,
}

/// Mutable state carried across lines
#[derive(Default)]
struct ParseState {
    /// Declared names to the node ids they stand for
    symbols: HashMap<String, Vec<String>>,
    cluster_stack: Vec<OpenCluster>,
    seen_header: bool,
}

impl ParseState {
    fn current_cluster(&self) -> Option<usize> {
        self.cluster_stack.last().map(|c| c.index)
    }

    fn apply(
        &mut self,
        statement: Statement,
        line: usize,
        db: &mut DiagramDatabase,
    ) -> Result<(), DiagramError> {
        match statement {
            Statement::Diagram { name, options } => self.apply_header(name, options, db),
            Statement::Attributes { target, attrs } => {
                let settings = db.settings_mut();
                let block = match target {
                    AttrTarget::Graph => &mut settings.graph_attr,
                    AttrTarget::Node => &mut settings.node_attr,
                    AttrTarget::Edge => &mut settings.edge_attr,
                };
                for (key, value) in attrs {
                    block.set(key, value);
                }
                Ok(())
            }
            Statement::Node {
                name,
                range,
                kind,
                label,
                attrs,
            } => self.declare_nodes(name, range, &kind, &label, attrs, db),
            Statement::ClusterOpen { label, options } => {
                let mut direction = Direction::default();
                let mut graph_attr = Attributes::new();
                for (key, value) in options {
                    if key == "direction" {
                        direction = value.parse()?;
                    } else {
                        graph_attr.set(key, value);
                    }
                }
                let index =
                    db.add_cluster(label.clone(), self.current_cluster(), direction, graph_attr)?;
                self.cluster_stack.push(OpenCluster { index, label, line });
                Ok(())
            }
            Statement::ClusterClose => match self.cluster_stack.pop() {
                Some(_) => Ok(()),
                None => Err(DiagramError::validation_error(
                    "'}' without an open cluster",
                )),
            },
            Statement::Chain { head, links } => {
                let head = self.resolve(head, db)?;
                let mut chain = ChainState::start(head);
                for (op, operand) in links {
                    let operand = self.resolve(operand, db)?;
                    chain.apply(db, op, operand)?;
                }
                let created = chain.edges_created();
                chain.finish()?;
                trace!(line, created, "Chain applied");
                Ok(())
            }
        }
    }

    fn apply_header(
        &mut self,
        name: String,
        options: AttrList,
        db: &mut DiagramDatabase,
    ) -> Result<(), DiagramError> {
        if self.seen_header {
            return Err(DiagramError::validation_error(
                "the diagram header may only appear once",
            ));
        }
        self.seen_header = true;

        let settings = db.settings_mut();
        settings.name = name;
        for (key, value) in options {
            match key.as_str() {
                "filename" => settings.filename = Some(value),
                "direction" => settings.direction = value.parse()?,
                "curvestyle" => settings.curvestyle = value.parse()?,
                "outformat" => {
                    settings.outformats = value
                        .split(',')
                        .map(|f| f.trim().parse::<OutputFormat>())
                        .collect::<Result<Vec<_>, _>>()?;
                }
                "autolabel" => settings.autolabel = parse_bool(&key, &value)?,
                "show" => settings.show = parse_bool(&key, &value)?,
                "strict" => settings.strict = parse_bool(&key, &value)?,
                _ => {
                    return Err(DiagramError::validation_error(format!(
                        "unknown diagram option '{}'",
                        key
                    )))
                }
            }
        }
        Ok(())
    }

    /// First id starting at `base` not taken by a node or a declared name
    ///
    /// Inline nodes are created before later declarations are seen, so a
    /// declared name may find its id already used by one of them. The name
    /// still resolves through the symbol table either way.
    fn free_id(&self, base: &str, db: &DiagramDatabase) -> String {
        let mut id = base.to_string();
        let mut suffix = 2;
        while db.has_node(&id) || self.symbols.contains_key(&id) {
            id = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        id
    }

    fn declare_nodes(
        &mut self,
        name: String,
        range: Option<NodeRange>,
        kind: &str,
        label: &str,
        attrs: AttrList,
        db: &mut DiagramDatabase,
    ) -> Result<(), DiagramError> {
        if self.symbols.contains_key(&name) {
            return Err(DiagramError::DuplicateNode { id: name });
        }
        let kind: NodeKind = kind.parse()?;
        let attrs: Attributes = attrs.into_iter().collect();

        let ids = match range {
            None => {
                let node = NodeData {
                    id: self.free_id(&name, db),
                    label: label.to_string(),
                    kind,
                    cluster: self.current_cluster(),
                    attrs,
                };
                let id = node.id.clone();
                insert(db, node)?;
                vec![id]
            }
            Some(range) => {
                let len = range.len();
                if len == 0 {
                    return Err(DiagramError::validation_error(format!(
                        "range for '{}' is empty",
                        name
                    )));
                }
                if len > MAX_RANGE_LEN {
                    return Err(DiagramError::validation_error(format!(
                        "range for '{}' declares {} nodes, at most {} are allowed",
                        name, len, MAX_RANGE_LEN
                    )));
                }
                let mut ids = Vec::with_capacity(len);
                for n in range.values() {
                    let node = NodeData {
                        id: self.free_id(&format!("{}_{}", name, n), db),
                        label: label.replace(RANGE_PLACEHOLDER, &n.to_string()),
                        kind,
                        cluster: self.current_cluster(),
                        attrs: attrs.clone(),
                    };
                    ids.push(node.id.clone());
                    insert(db, node)?;
                }
                ids
            }
        };

        self.symbols.insert(name, ids);
        Ok(())
    }

    fn resolve(
        &mut self,
        operand: OperandRef,
        db: &mut DiagramDatabase,
    ) -> Result<Operand, DiagramError> {
        match operand {
            OperandRef::Name(name) => Ok(Operand::Nodes(self.lookup(&name)?.to_vec())),
            OperandRef::Group(names) => {
                let mut ids = Vec::new();
                for name in &names {
                    ids.extend_from_slice(self.lookup(name)?);
                }
                Ok(Operand::Nodes(ids))
            }
            OperandRef::Inline { kind, label } => {
                let kind: NodeKind = kind.parse()?;
                let id = self.free_id(&slugify(&label), db);
                let node = NodeData {
                    id: id.clone(),
                    label,
                    kind,
                    cluster: self.current_cluster(),
                    attrs: Attributes::new(),
                };
                insert(db, node)?;
                Ok(Operand::node(id))
            }
            OperandRef::Edge(attrs) => {
                let mut spec = EdgeSpec::new();
                for (key, value) in attrs {
                    spec.set(&key, value)?;
                }
                Ok(Operand::Edge(spec))
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<&[String], DiagramError> {
        self.symbols
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| DiagramError::UnknownNode {
                id: name.to_string(),
            })
    }
}

fn insert(db: &mut DiagramDatabase, node: NodeData) -> Result<(), DiagramError> {
    db.add_node(node).map_err(|err| match err.downcast::<DiagramError>() {
        Ok(typed) => typed,
        Err(other) => DiagramError::validation_error(other.to_string()),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, DiagramError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(DiagramError::validation_error(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}
