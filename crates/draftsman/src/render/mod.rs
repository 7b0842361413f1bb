//! Output backends
//!
//! - [`DotRenderer`] emits Graphviz DOT source
//! - [`GraphvizBackend`] runs the `dot` executable to produce image files
//! - [`ascii::AsciiRenderer`] draws a terminal preview

pub mod ascii;
mod dot;
mod graphviz;

pub use ascii::{AsciiRenderer, RenderConfig};
pub use dot::*;
pub use graphviz::*;
