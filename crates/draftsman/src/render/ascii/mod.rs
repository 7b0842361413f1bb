//! Terminal preview of a diagram
//!
//! A small layered layout on a character grid. It is meant for a quick look
//! at structure in the terminal; real images come from the Graphviz backend.
//!
//! # Example
//! ```
//! use draftsman::core::{CharacterSet, NodeKind, Renderer};
//! use draftsman::model::DiagramBuilder;
//! use draftsman::render::ascii::AsciiRenderer;
//!
//! let mut d = DiagramBuilder::new("Preview");
//! let a = d.node(NodeKind::User, "Request");
//! let b = d.node(NodeKind::Database, "Storage");
//! (d.chain(&a) >> &b).end().unwrap();
//!
//! let text = AsciiRenderer::with_charset(CharacterSet::Ascii)
//!     .render(&d.finish().unwrap())
//!     .unwrap();
//! assert!(text.contains("Request"));
//! ```

mod layout;
mod renderer;

pub use layout::*;
pub use renderer::*;
