//! JSON diagram documents
//!
//! The database in a serde-friendly shape, for tooling that generates or
//! consumes diagrams programmatically.

mod detector;
mod document;
mod parser;
mod renderer;

pub use detector::*;
pub use document::*;
pub use parser::*;
pub use renderer::*;
