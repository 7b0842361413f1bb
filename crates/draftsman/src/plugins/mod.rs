//! Input plugins and the pipeline orchestrator
//!
//! Each input format implements the core detector and parser traits:
//! - [`draft`]: the line-oriented diagram language
//! - [`json`]: serialized diagram documents

pub mod draft;
pub mod json;
pub mod orchestrator;

pub use draft::*;
pub use json::*;
pub use orchestrator::*;
