//! JSON document parser

use anyhow::Result;
use tracing::{debug, span, Level};

use super::DiagramDocument;
use crate::core::{Database, DiagramError, Parser};
use crate::model::DiagramDatabase;

/// Parses [`DiagramDocument`] JSON into a database
pub struct JsonParser;

impl JsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser<DiagramDatabase> for JsonParser {
    fn parse(&self, input: &str, database: &mut DiagramDatabase) -> Result<()> {
        let parse_span = span!(Level::DEBUG, "json_parse", input_len = input.len());
        let _enter = parse_span.enter();

        let document: DiagramDocument = serde_json::from_str(input)
            .map_err(|e| DiagramError::parse_error(e.to_string(), e.line(), e.column()))?;
        document.load_into(database)?;

        debug!(
            node_count = database.node_count(),
            edge_count = database.edge_count(),
            "JSON parsing completed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        input.trim_start().starts_with('{')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let input = r#"{
            "name": "Json Diagram",
            "direction": "TB",
            "clusters": [{"label": "Workers"}],
            "nodes": [
                {"id": "a", "kind": "onprem.client.User", "label": "A"},
                {"id": "b", "kind": "Action", "label": "B", "cluster": 0}
            ],
            "edges": [{"from": "a", "to": "b", "direction": "both", "label": "talks"}]
        }"#;
        let mut db = DiagramDatabase::new();
        JsonParser::new().parse(input, &mut db).unwrap();
        assert_eq!(db.name(), "Json Diagram");
        assert_eq!(db.node_count(), 2);
        assert_eq!(db.cluster_members(0).len(), 1);
        assert_eq!(db.edges().next().unwrap().label.as_deref(), Some("talks"));
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let mut db = DiagramDatabase::new();
        let err = JsonParser::new()
            .parse("{\n  \"nodes\": [,]\n}", &mut db)
            .unwrap_err();
        match err.downcast_ref::<DiagramError>() {
            Some(DiagramError::ParseError { line, .. }) => assert_eq!(*line, 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bad_direction_is_rejected() {
        let mut db = DiagramDatabase::new();
        let result = JsonParser::new().parse(r#"{"direction": "up"}"#, &mut db);
        assert!(result.is_err());
    }
}
