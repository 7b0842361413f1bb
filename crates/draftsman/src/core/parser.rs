//! Core parser trait for diagram sources
//!
//! This trait defines the interface for parsing diagram source text
//! into structured data stored in a database.

use anyhow::Result;

use super::Database;

/// Core trait for diagram parsers
///
/// # Example
/// ```
/// use draftsman::core::{Database, Parser};
/// use draftsman::model::DiagramDatabase;
/// use draftsman::plugins::draft::DraftParser;
///
/// let parser = DraftParser::new();
/// let mut db = DiagramDatabase::new();
/// parser.parse("a = Node \"A\"\nb = Node \"B\"\na >> b", &mut db).unwrap();
/// assert_eq!(db.edge_count(), 1);
/// ```
pub trait Parser<D: Database>: Send + Sync {
    /// Parse diagram source into the provided database
    fn parse(&self, input: &str, database: &mut D) -> Result<()>;

    /// Get the name of this parser
    fn name(&self) -> &'static str;

    /// Get the version of this parser
    fn version(&self) -> &'static str;

    /// Check if the input can be parsed by this parser
    fn can_parse(&self, input: &str) -> bool;
}
