//! Graphviz DOT renderer
//!
//! Emits DOT source carrying the same default look the diagram library
//! applies: tab-indented statements, sorted attribute lists, clusters as
//! nested `subgraph cluster_*` blocks and all edges at the top level.

use anyhow::Result;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, span, trace, Level};

use crate::core::{
    cluster_bgcolor, default_cluster_attrs, default_edge_attrs, default_edge_label_attrs,
    default_graph_attrs, default_node_attrs, Attributes, Database, Renderer, ICON_NODE_HEIGHT,
    LABEL_LINE_PADDING,
};
use crate::model::{DiagramDatabase, EdgeData, NodeData};

const KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];

/// Quote a DOT identifier when it is not a plain id, a numeral or a keyword
///
/// ```
/// use draftsman::render::quote_id;
///
/// assert_eq!(quote_id("analyzer_1"), "analyzer_1");
/// assert_eq!(quote_id("0.75"), "0.75");
/// assert_eq!(quote_id("#2D3436"), "\"#2D3436\"");
/// assert_eq!(quote_id("Cli Social"), "\"Cli Social\"");
/// assert_eq!(quote_id("graph"), "\"graph\"");
/// ```
pub fn quote_id(id: &str) -> String {
    if is_plain_id(id) || is_numeral(id) {
        return id.to_string();
    }
    let mut quoted = String::with_capacity(id.len() + 2);
    quoted.push('"');
    for c in id.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => {}
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn is_plain_id(id: &str) -> bool {
    let mut chars = id.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || !first.is_ascii())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii())
        && !KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(id))
}

fn is_numeral(id: &str) -> bool {
    let digits = id.strip_prefix('-').unwrap_or(id);
    if digits.is_empty() || digits == "." {
        return false;
    }
    let mut seen_dot = false;
    digits.chars().all(|c| {
        if c == '.' && !seen_dot {
            seen_dot = true;
            true
        } else {
            c.is_ascii_digit()
        }
    })
}

/// `[k=v k=v]` or the empty string for no attributes
pub fn attr_list(attrs: &Attributes) -> String {
    if attrs.is_empty() {
        return String::new();
    }
    let body = attrs
        .iter()
        .map(|(k, v)| format!("{}={}", quote_id(k), quote_id(v)))
        .collect::<Vec<_>>()
        .join(" ");
    format!("[{}]", body)
}

/// DOT source renderer
#[derive(Debug, Default, Clone)]
pub struct DotRenderer {
    icon_root: Option<PathBuf>,
}

impl DotRenderer {
    /// Renderer that falls back to plain Graphviz shapes for icon kinds
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer that points icon nodes at images under `root`
    pub fn with_icon_root(root: impl Into<PathBuf>) -> Self {
        Self {
            icon_root: Some(root.into()),
        }
    }

    pub fn icon_root(&self) -> Option<&Path> {
        self.icon_root.as_deref()
    }

    /// Top-level `graph [...]` attributes
    pub fn graph_attrs(&self, db: &DiagramDatabase) -> Attributes {
        let settings = db.settings();
        let mut attrs = default_graph_attrs();
        attrs.set("label", settings.name.clone());
        attrs.set("rankdir", settings.direction.as_rankdir());
        attrs.set("splines", settings.curvestyle.as_str());
        attrs.merge(&settings.graph_attr);
        attrs
    }

    /// Attributes of one node statement
    pub fn node_attrs(&self, db: &DiagramDatabase, node: &NodeData) -> Attributes {
        let label = node.display_label(db.settings().autolabel);
        let mut attrs = Attributes::new().with("label", label.clone());

        if node.kind.has_icon() {
            match (&self.icon_root, node.kind.icon_path()) {
                (Some(root), Some(icon)) => {
                    let lines = label.matches('\n').count() as f64;
                    let height = ICON_NODE_HEIGHT + LABEL_LINE_PADDING * lines;
                    attrs.set("shape", "none");
                    attrs.set("height", format!("{:.1}", height));
                    attrs.set("image", root.join(icon).display().to_string());
                }
                _ => {
                    attrs.set("shape", node.kind.fallback_shape());
                    attrs.set("fixedsize", "false");
                }
            }
        }

        attrs.merge(&node.attrs);
        attrs
    }

    /// Attributes of one edge statement
    pub fn edge_attrs(&self, edge: &EdgeData) -> Attributes {
        let mut attrs = default_edge_label_attrs();
        attrs.set("dir", edge.direction.as_str());
        if let Some(label) = &edge.label {
            attrs.set("label", label.clone());
        }
        if let Some(color) = &edge.color {
            attrs.set("color", color.clone());
        }
        if let Some(style) = &edge.style {
            attrs.set("style", style.clone());
        }
        attrs.merge(&edge.attrs);
        attrs
    }

    fn write_node(&self, out: &mut String, db: &DiagramDatabase, node: &NodeData, depth: usize) {
        let indent = "\t".repeat(depth);
        let _ = writeln!(
            out,
            "{}{} {}",
            indent,
            quote_id(&node.id),
            attr_list(&self.node_attrs(db, node))
        );
    }

    fn write_cluster(&self, out: &mut String, db: &DiagramDatabase, index: usize, depth: usize) {
        let Some(cluster) = db.get_cluster(index) else {
            return;
        };
        trace!(cluster = %cluster.name, depth, "Writing cluster");
        let indent = "\t".repeat(depth);

        let mut attrs = default_cluster_attrs();
        attrs.set("label", cluster.label.clone());
        attrs.set("rankdir", cluster.direction.as_rankdir());
        attrs.set("bgcolor", cluster_bgcolor(cluster.depth));
        attrs.merge(&cluster.graph_attr);

        let _ = writeln!(out, "{}subgraph {} {{", indent, quote_id(&cluster.name));
        let _ = writeln!(out, "{}\tgraph {}", indent, attr_list(&attrs));
        for node in db.cluster_members(index) {
            self.write_node(out, db, node, depth + 1);
        }
        for child in db.child_clusters(Some(index)) {
            self.write_cluster(out, db, child.index, depth + 1);
        }
        let _ = writeln!(out, "{}}}", indent);
    }
}

impl Renderer<DiagramDatabase> for DotRenderer {
    type Output = String;

    fn render(&self, database: &DiagramDatabase) -> Result<Self::Output> {
        let render_span = span!(
            Level::INFO,
            "render_dot",
            node_count = database.node_count(),
            edge_count = database.edge_count()
        );
        let _enter = render_span.enter();

        let settings = database.settings();
        let mut out = String::new();

        let keyword = if settings.strict {
            "strict digraph"
        } else {
            "digraph"
        };
        let _ = writeln!(out, "{} {} {{", keyword, quote_id(&settings.name));
        let _ = writeln!(out, "\tgraph {}", attr_list(&self.graph_attrs(database)));
        let _ = writeln!(
            out,
            "\tnode {}",
            attr_list(&default_node_attrs().merged(&settings.node_attr))
        );
        let _ = writeln!(
            out,
            "\tedge {}",
            attr_list(&default_edge_attrs().merged(&settings.edge_attr))
        );

        for node in database.root_nodes() {
            self.write_node(&mut out, database, node, 1);
        }
        for cluster in database.child_clusters(None) {
            self.write_cluster(&mut out, database, cluster.index, 1);
        }
        for edge in database.edges() {
            let _ = writeln!(
                out,
                "\t{} -> {} {}",
                quote_id(&edge.from),
                quote_id(&edge.to),
                attr_list(&self.edge_attrs(edge))
            );
        }
        out.push_str("}\n");

        debug!(output_len = out.len(), "DOT rendering completed");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "dot"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "dot"
    }
}
