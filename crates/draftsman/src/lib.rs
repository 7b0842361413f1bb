//! Draftsman - diagrams as code
//!
//! Describe architecture diagrams with a typed builder, the `.draft` text
//! language or JSON, then render them as Graphviz DOT, image files through
//! the `dot` executable, or a terminal preview.
//!
//! # Quick Start
//!
//! ```rust
//! use draftsman::render_dot;
//!
//! let input = "diagram \"Web\"\n\
//!              lb = onprem.client.Client \"lb\"\n\
//!              web = Action \"web\"\n\
//!              lb >> web";
//! let dot = render_dot(input).unwrap();
//! assert!(dot.contains("lb -> web"));
//! ```
//!
//! # Builder API
//!
//! ```rust
//! use draftsman::prelude::*;
//!
//! let mut d = DiagramBuilder::new("Cli Technical Command").direction(Direction::TopBottom);
//! let request = d.node(NodeKind::User, "Request Prompt");
//! let workers = d.cluster("Workers", |d| {
//!     (1..=3)
//!         .map(|n| d.node(NodeKind::Action, format!("Analyzer_{}", n)))
//!         .collect::<Vec<_>>()
//! });
//! let storage = d.node(NodeKind::Database, "Technical Storage");
//! (d.chain(&request) >> &workers >> EdgeSpec::labeled("stores") >> &storage)
//!     .end()
//!     .unwrap();
//!
//! let database = d.finish().unwrap();
//! assert_eq!(database.node_count(), 5);
//! assert_eq!(database.edge_count(), 6);
//!
//! let preview = AsciiRenderer::new().render(&database).unwrap();
//! assert!(preview.contains("Workers"));
//! ```

pub mod catalog;
pub mod core;
pub mod model;
pub mod plugins;
pub mod render;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Attributes, CharacterSet, CurveStyle, Database, Detector, DiagramError, Direction,
        EdgeDirection, LayoutAlgorithm, NodeKind, OutputFormat, Parser, Renderer,
    };
    pub use crate::model::{
        ChainOp, DiagramBuilder, DiagramDatabase, DiagramSettings, EdgeData, EdgeSpec, NodeData,
        NodeId,
    };
    pub use crate::plugins::draft::{DraftDetector, DraftParser};
    pub use crate::plugins::json::{DiagramDocument, JsonDetector, JsonParser, JsonRenderer};
    pub use crate::plugins::orchestrator::{Backend, Orchestrator};
    pub use crate::render::{
        AsciiRenderer, DotRenderer, GraphvizBackend, GraphvizConfig, RenderConfig,
    };
}

/// Parse draft or JSON input into a validated database
///
/// The input format is detected automatically.
///
/// # Example
/// ```rust
/// use draftsman::parse;
/// use draftsman::prelude::Database;
///
/// let db = parse("a = User \"a\"\nb = Database \"b\"\na >> b").unwrap();
/// assert_eq!(db.node_count(), 2);
/// assert_eq!(db.edge_count(), 1);
/// ```
pub fn parse(input: &str) -> anyhow::Result<model::DiagramDatabase> {
    plugins::orchestrator::Orchestrator::with_default_detectors().load(input)
}

/// Render draft or JSON input as Graphviz DOT source
pub fn render_dot(input: &str) -> anyhow::Result<String> {
    use crate::plugins::orchestrator::{Backend, Orchestrator};

    Orchestrator::with_default_detectors().render(input, Backend::Dot)
}

/// Render draft or JSON input as a terminal preview
///
/// # Example
/// ```rust
/// use draftsman::{render_preview, CharacterSet};
///
/// let text = render_preview("a = User \"Alice\"\nb = Database \"Db\"\na >> b", CharacterSet::Ascii)
///     .unwrap();
/// assert!(text.contains("Alice"));
/// ```
pub fn render_preview(input: &str, charset: CharacterSet) -> anyhow::Result<String> {
    use crate::plugins::orchestrator::{Backend, Orchestrator};
    use crate::render::RenderConfig;

    Orchestrator::with_default_detectors()
        .with_render_config(RenderConfig {
            charset,
            ..RenderConfig::default()
        })
        .render(input, Backend::Ascii)
}
