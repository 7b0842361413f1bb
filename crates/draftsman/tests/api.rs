//! Integration tests for the public API

use draftsman::prelude::*;
use draftsman::{catalog, parse, render_dot, render_preview};

const WEB: &str = "diagram \"Web Service\" direction=LR\n\
                   lb = onprem.client.Client \"lb\"\n\
                   cluster \"Workers\" {\n\
                   worker[1..=3] = Action \"worker_{n}\"\n\
                   }\n\
                   events = Database \"events\"\n\
                   lb >> worker >> edge(label=\"writes\") >> events\n";

#[test]
fn test_parse_counts() {
    let db = parse(WEB).unwrap();
    assert_eq!(db.node_count(), 5);
    // 1 x 3 fan-out then 3 x 1 fan-in
    assert_eq!(db.edge_count(), 6);
    assert_eq!(db.direction(), Direction::LeftRight);
    assert_eq!(db.output_filename(), "web_service");
}

#[test]
fn test_render_dot_structure() {
    let dot = render_dot(WEB).unwrap();
    assert!(dot.starts_with("digraph \"Web Service\" {"));
    assert!(dot.contains("subgraph cluster_Workers {"));
    assert!(dot.contains("lb -> worker_1"));
    assert!(dot.contains("worker_3 -> events"));
    assert!(dot.contains("label=writes"));
    assert!(dot.trim_end().ends_with('}'));
}

#[test]
fn test_render_preview_unicode() {
    let output = render_preview(WEB, CharacterSet::Unicode).unwrap();
    assert!(output.contains("worker_1"));
    assert!(output.contains("events"));
    assert!(output.contains("Workers"));
    assert!(output.contains('▶'));
}

#[test]
fn test_json_round_trip_through_orchestrator() {
    let orchestrator = Orchestrator::with_default_detectors();
    let db = orchestrator.load(WEB).unwrap();
    let json = orchestrator.render_database(&db, Backend::Json).unwrap();
    assert_eq!(orchestrator.detect_input_format(&json).unwrap(), "json");

    let reloaded = orchestrator.load(&json).unwrap();
    assert_eq!(
        orchestrator.render_database(&reloaded, Backend::Dot).unwrap(),
        orchestrator.render_database(&db, Backend::Dot).unwrap()
    );
}

#[test]
fn test_builder_matches_draft() {
    let mut d = DiagramBuilder::new("Web Service").direction(Direction::LeftRight);
    let lb = d.node(NodeKind::Client, "lb");
    let workers = d.cluster("Workers", |d| {
        (1..=3)
            .map(|n| d.node(NodeKind::Action, format!("worker_{}", n)))
            .collect::<Vec<_>>()
    });
    let events = d.node(NodeKind::Database, "events");
    (d.chain(&lb) >> &workers >> EdgeSpec::labeled("writes") >> &events)
        .end()
        .unwrap();
    let built = d.finish().unwrap();

    let renderer = DotRenderer::new();
    assert_eq!(
        renderer.render(&built).unwrap(),
        renderer.render(&parse(WEB).unwrap()).unwrap()
    );
}

#[test]
fn test_catalog_listing() {
    let names: Vec<_> = catalog::entries().iter().map(|e| e.name).collect();
    assert_eq!(names, catalog::names());
    for entry in catalog::entries() {
        let db = entry.build().unwrap();
        assert_eq!(db.name(), entry.title);
        assert!(entry.source.contains(entry.title));
    }
}

#[test]
fn test_catalog_serializes_without_source() {
    let json = serde_json::to_value(catalog::entries()).unwrap();
    let first = &json[0];
    assert_eq!(first["name"], "cli-technical");
    assert_eq!(first["title"], "Cli Technical Command");
    assert!(first.get("source").is_none());
}

#[test]
fn test_graphviz_dot_format_needs_no_binary() {
    let db = catalog::build("cli-technical").unwrap();
    let backend = GraphvizBackend::new(
        GraphvizConfig::default().with_dot_binary("/nonexistent/draftsman-dot"),
    );
    let bytes = backend.render_bytes(&db, OutputFormat::Dot).unwrap();
    let source = String::from_utf8(bytes).unwrap();
    assert_eq!(source, DotRenderer::new().render(&db).unwrap());
}

#[test]
fn test_graphviz_write_dot_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = catalog::build("cli-social").unwrap();
    let backend = GraphvizBackend::new(GraphvizConfig::default().with_output_dir(dir.path()));

    let path = backend.write_format(&db, OutputFormat::Dot).unwrap();
    assert_eq!(path, dir.path().join("daily-bugle-cli-social-command.dot"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("subgraph cluster_Workers"));
}

#[test]
fn test_graphviz_build_declared_formats() {
    let dir = tempfile::tempdir().unwrap();
    let mut d = DiagramBuilder::new("Two Formats").outformats([OutputFormat::Dot]);
    let a = d.node(NodeKind::User, "a");
    let b = d.node(NodeKind::Database, "b");
    (d.chain(&a) >> &b).end().unwrap();
    let db = d.finish().unwrap();

    let backend = GraphvizBackend::new(GraphvizConfig::default().with_output_dir(dir.path()));
    let written = backend.build(&db).unwrap();
    assert_eq!(written, vec![dir.path().join("two_formats.dot")]);
}

#[test]
fn test_icon_root_emits_image_paths() {
    let db = catalog::build("cli-technical").unwrap();
    let dot = DotRenderer::with_icon_root("/icons").render(&db).unwrap();
    assert!(dot.contains("/icons/onprem/client/user.png"));
    assert!(dot.contains("/icons/programming/flowchart/database.png"));
    assert!(dot.contains("height=1.9"));
}
