//! Tests for logging functionality
//!
//! Only one global subscriber can be installed per process, so these tests
//! check that initialization never panics rather than what gets written.

use draftsman::core::logging::{init_logging, LogFormat};
use draftsman::core::Database;
use std::str::FromStr;

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
    assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
    assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
    assert!(LogFormat::from_str("xml").is_err());
}

#[test]
fn test_log_format_variants() {
    assert_eq!(LogFormat::variants(), &["compact", "pretty", "json"]);
}

#[test]
fn test_init_logging_with_levels() {
    for level in ["trace", "debug", "info", "warn", "error", "off"] {
        let _ = init_logging(Some(level), Some("compact"));
    }
}

#[test]
fn test_init_logging_invalid_format() {
    let result = init_logging(Some("info"), Some("xml"));
    assert!(result.is_err());
}

#[test]
fn test_pipeline_runs_with_logging_enabled() {
    let _ = init_logging(Some("trace"), Some("json"));
    let db = draftsman::catalog::build("cli-social").unwrap();
    assert_eq!(db.node_count(), 9);
    let preview = draftsman::render_preview(
        draftsman::catalog::lookup("cli-social").unwrap().source,
        draftsman::CharacterSet::Ascii,
    )
    .unwrap();
    assert!(preview.contains("Social Storage"));
}
