//! Snapshot tests for DOT output
//!
//! These tests compare generated DOT against golden files in tests/fixtures/.
//! To update fixtures after changing the generator, run the tests with UPDATE_FIXTURES=1

use draftsman::catalog;
use draftsman::prelude::*;
use std::fs;
use std::path::Path;

/// Compare generated DOT to a fixture file
fn assert_fixture(name: &str, output: &str) {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(format!("{}.dot", name));

    if std::env::var("UPDATE_FIXTURES").is_ok() {
        fs::write(&fixture_path, output).expect("failed to write fixture");
        println!("Updated fixture: {}", fixture_path.display());
        return;
    }

    let expected = fs::read_to_string(&fixture_path).unwrap_or_else(|_| {
        panic!(
            "Fixture not found: {}\nRun with UPDATE_FIXTURES=1 to create it.\n\nActual output:\n{}",
            fixture_path.display(),
            output
        )
    });

    if output != expected {
        panic!(
            "Snapshot mismatch for '{}'!\n\n=== Expected ===\n{}\n=== Actual ===\n{}\nRun with UPDATE_FIXTURES=1 to update.",
            name, expected, output
        );
    }
}

fn catalog_dot(name: &str) -> String {
    let db = catalog::build(name).expect("catalog diagram should build");
    DotRenderer::new().render(&db).expect("render should succeed")
}

#[test]
fn test_cli_technical_dot() {
    assert_fixture("cli_technical", &catalog_dot("cli-technical"));
}

#[test]
fn test_cli_social_dot() {
    assert_fixture("cli_social", &catalog_dot("cli-social"));
}

#[test]
fn test_draft_sources_match_snapshots() {
    let entry = catalog::lookup("cli-technical").unwrap();
    let dot = draftsman::render_dot(entry.source).unwrap();
    assert_fixture("cli_technical", &dot);

    let entry = catalog::lookup("cli-social").unwrap();
    let dot = draftsman::render_dot(entry.source).unwrap();
    assert_fixture("cli_social", &dot);
}
