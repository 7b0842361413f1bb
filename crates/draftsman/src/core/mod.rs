//! Core abstractions for diagram processing
//!
//! This module defines the fundamental traits every pipeline stage implements
//! (detect → parse → database → layout → render) and the shared types,
//! attribute defaults, text helpers and canvas they build on.

mod attrs;
mod box_drawing;
mod canvas;
pub mod chumsky_utils;
mod database;
mod detector;
mod error;
mod layout;
pub mod logging;
mod parser;
mod renderer;
mod text;
mod types;

pub use attrs::*;
pub use box_drawing::*;
pub use canvas::*;
pub use database::*;
pub use detector::*;
pub use error::*;
pub use layout::*;
pub use logging::*;
pub use parser::*;
pub use renderer::*;
pub use text::*;
pub use types::*;
