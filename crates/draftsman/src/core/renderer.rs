//! Core renderer trait for diagram output
//!
//! This trait defines the interface for rendering diagram data
//! into output formats (DOT source, terminal preview, image files).

use anyhow::Result;

use super::Database;

/// Core trait for diagram renderers
///
/// # Example
/// ```
/// use draftsman::core::Renderer;
/// use draftsman::model::DiagramDatabase;
/// use draftsman::render::DotRenderer;
///
/// let db = DiagramDatabase::new();
/// let dot = DotRenderer::new().render(&db).unwrap();
/// assert!(dot.starts_with("digraph"));
/// ```
pub trait Renderer<D: Database>: Send + Sync {
    /// The output type of this renderer
    type Output;

    /// Render the diagram database into the output format
    fn render(&self, database: &D) -> Result<Self::Output>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the version of this renderer
    fn version(&self) -> &'static str;

    /// Get the supported output format
    fn format(&self) -> &'static str;
}
