//! JSON document renderer

use anyhow::Result;
use tracing::debug;

use super::DiagramDocument;
use crate::core::Renderer;
use crate::model::DiagramDatabase;

/// Renders a database as a pretty-printed [`DiagramDocument`]
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer<DiagramDatabase> for JsonRenderer {
    type Output = String;

    fn render(&self, database: &DiagramDatabase) -> Result<Self::Output> {
        let document = DiagramDocument::from_database(database);
        let json = serde_json::to_string_pretty(&document)?;
        debug!(output_len = json.len(), "JSON rendering completed");
        Ok(json)
    }

    fn name(&self) -> &'static str {
        "json"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Database, NodeKind, Parser};
    use crate::model::DiagramBuilder;
    use crate::plugins::json::JsonParser;

    #[test]
    fn test_output_loads_back() {
        let mut d = DiagramBuilder::new("Loop").graph_attr("bgcolor", "white");
        let a = d.node(NodeKind::Storage, "Timeout");
        let b = d.cluster("Workers", |d| d.node(NodeKind::Action, "Analyzer_1"));
        (d.chain(&a) >> &b).end().unwrap();
        let db = d.finish().unwrap();

        let json = JsonRenderer::new().render(&db).unwrap();
        assert!(json.contains("\"bgcolor\": \"white\""));
        assert!(json.contains("\"generic.storage.Storage\""));

        let mut loaded = DiagramDatabase::new();
        JsonParser::new().parse(&json, &mut loaded).unwrap();
        assert_eq!(loaded.node_count(), 2);
        assert_eq!(loaded.get_node("analyzer_1").unwrap().cluster, Some(0));
        assert_eq!(loaded.settings(), db.settings());
    }
}
