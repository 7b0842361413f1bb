//! Core layout trait for diagram positioning

use anyhow::Result;

use super::Database;

/// Core trait for layout algorithms
///
/// Arranges diagram elements in a coordinate system. Graphviz does its own
/// layout; this is used by the in-process terminal preview.
pub trait LayoutAlgorithm<D: Database>: Send + Sync {
    /// The output type of this layout algorithm
    type Output;

    /// Arrange elements in the database using this layout algorithm
    fn layout(&self, database: &D) -> Result<Self::Output>;

    /// Get the name of this layout algorithm
    fn name(&self) -> &'static str;

    /// Get the version of this layout algorithm
    fn version(&self) -> &'static str;
}
