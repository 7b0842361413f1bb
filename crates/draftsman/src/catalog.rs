//! Built-in diagrams
//!
//! The request flows of the daily-bugle `technical` and `social` commands,
//! built through [`DiagramBuilder`]. The same diagrams ship as `.draft`
//! sources under `diagrams/` in the repository.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, span, Level};

use crate::core::{Database, Direction, NodeKind};
use crate::model::{DiagramBuilder, DiagramDatabase, EdgeSpec, NodeId};

/// A named diagram in the catalog
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// `.draft` source of the same diagram
    #[serde(skip)]
    pub source: &'static str,
    #[serde(skip)]
    build: fn() -> Result<DiagramDatabase>,
}

impl CatalogEntry {
    /// Build the diagram
    pub fn build(&self) -> Result<DiagramDatabase> {
        let build_span = span!(Level::DEBUG, "build_catalog_diagram", name = self.name);
        let _enter = build_span.enter();
        let db = (self.build)()?;
        debug!(nodes = db.node_count(), "Catalog diagram built");
        Ok(db)
    }
}

const ENTRIES: [CatalogEntry; 2] = [
    CatalogEntry {
        name: "cli-technical",
        title: "Cli Technical Command",
        description: "Technical sources analyzed by workers into technical storage",
        source: include_str!("../../../diagrams/cli_technical.draft"),
        build: cli_technical,
    },
    CatalogEntry {
        name: "cli-social",
        title: "Cli Social Command",
        description: "Social content analyzed by workers, with reminder and weather feeds",
        source: include_str!("../../../diagrams/cli_social.draft"),
        build: cli_social,
    },
];

/// Every catalog entry
pub fn entries() -> &'static [CatalogEntry] {
    &ENTRIES
}

/// Catalog names in listing order
pub fn names() -> Vec<&'static str> {
    ENTRIES.iter().map(|e| e.name).collect()
}

/// Find an entry by name
pub fn lookup(name: &str) -> Option<&'static CatalogEntry> {
    ENTRIES.iter().find(|e| e.name == name)
}

/// Build a catalog diagram by name
pub fn build(name: &str) -> Result<DiagramDatabase> {
    match lookup(name) {
        Some(entry) => entry.build(),
        None => anyhow::bail!(
            "Unknown catalog diagram '{}' (available: {})",
            name,
            names().join(", ")
        ),
    }
}

/// Request prompt, intent service and the three workers shared by both commands
fn request_and_workers(d: &mut DiagramBuilder) -> (NodeId, NodeId, Vec<NodeId>) {
    let request = d.node(NodeKind::User, "Request Prompt");
    let service = d.node(NodeKind::Preparation, "Content Intent Service");
    let workers = d.cluster("Workers", |d| {
        (1..=3)
            .map(|n| d.node(NodeKind::Action, format!("Analyzer_{}", n)))
            .collect::<Vec<_>>()
    });
    (request, service, workers)
}

fn cli_technical() -> Result<DiagramDatabase> {
    let mut d = DiagramBuilder::new("Cli Technical Command")
        .filename("daily-bugle-cli-technical-command")
        .direction(Direction::TopBottom)
        .graph_attr("bgcolor", "white");

    let (request, service, workers) = request_and_workers(&mut d);
    let storage = d.node(NodeKind::Database, "Technical Storage");
    let sources = d.node(NodeKind::MultipleDocuments, "Technical Sources");
    (d.chain(&sources) >> &workers >> &storage).end()?;

    (d.chain(&request) >> &service >> EdgeSpec::labeled("Searches") << &storage).end()?;
    d.finish()
}

fn cli_social() -> Result<DiagramDatabase> {
    let mut d = DiagramBuilder::new("Cli Social Command")
        .filename("daily-bugle-cli-social-command")
        .direction(Direction::TopBottom)
        .graph_attr("bgcolor", "white");

    let (request, service, workers) = request_and_workers(&mut d);
    let timeout = d.node(NodeKind::Storage, "Timeout");
    let storage = d.node(NodeKind::Database, "Social Storage");
    (d.chain(&timeout) >> &workers >> &storage).end()?;

    let reminders = d.node(NodeKind::Display, "Reminders");
    (d.chain(&reminders) >> EdgeSpec::labeled("Feeds") << &service).end()?;
    let weather = d.node(NodeKind::Display, "Weather");
    (d.chain(&weather) >> EdgeSpec::labeled("Feeds") << &service).end()?;

    (d.chain(&request) >> &service >> EdgeSpec::labeled("Searches") << &storage).end()?;
    d.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EdgeDirection, Parser, Renderer};
    use crate::plugins::draft::DraftParser;
    use crate::render::DotRenderer;

    #[test]
    fn test_names_and_lookup() {
        assert_eq!(names(), vec!["cli-technical", "cli-social"]);
        assert!(lookup("cli-social").is_some());
        assert!(lookup("cli-weather").is_none());
        let err = build("cli-weather").unwrap_err();
        assert!(err.to_string().contains("available: cli-technical, cli-social"));
    }

    #[test]
    fn test_cli_technical() {
        let db = build("cli-technical").unwrap();
        assert_eq!(db.output_filename(), "daily-bugle-cli-technical-command");
        assert_eq!(db.direction(), Direction::TopBottom);
        assert_eq!(db.settings().graph_attr.get("bgcolor"), Some("white"));
        assert_eq!(db.node_count(), 7);
        assert_eq!(db.edge_count(), 3 + 3 + 1 + 1);
        assert_eq!(db.cluster_members(0).len(), 3);

        let searches = db.edges().last().unwrap();
        assert_eq!(searches.from, "content_intent_service");
        assert_eq!(searches.to, "technical_storage");
        assert_eq!(searches.direction, EdgeDirection::Both);
    }

    #[test]
    fn test_cli_social_feeds() {
        let db = build("cli-social").unwrap();
        assert_eq!(db.node_count(), 9);
        let feeds: Vec<_> = db
            .edges()
            .filter(|e| e.label.as_deref() == Some("Feeds"))
            .collect();
        assert_eq!(feeds.len(), 2);
        assert!(feeds.iter().all(|e| e.to == "content_intent_service"));
        assert!(feeds.iter().all(|e| e.direction == EdgeDirection::Both));
        assert_eq!(db.successors("timeout").len(), 3);
    }

    #[test]
    fn test_draft_sources_match_builders() {
        let renderer = DotRenderer::new();
        for entry in entries() {
            let built = entry.build().unwrap();
            let mut parsed = DiagramDatabase::new();
            DraftParser::new().parse(entry.source, &mut parsed).unwrap();
            assert_eq!(
                renderer.render(&built).unwrap(),
                renderer.render(&parsed).unwrap(),
                "{} diverges from its .draft source",
                entry.name
            );
        }
    }
}
