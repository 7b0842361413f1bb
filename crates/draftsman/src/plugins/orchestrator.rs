//! Plugin orchestrator for coordinating the diagram processing pipeline
//!
//! The orchestrator manages the flow of data through all plugins:
//! Detector → Parser → Database → validate → Renderer

use anyhow::Result;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, span, trace, warn, Level};

use crate::core::{Database, Detector, DiagramError, Parser, Renderer};
use crate::model::DiagramDatabase;
use crate::plugins::draft::{DraftDetector, DraftParser};
use crate::plugins::json::{JsonDetector, JsonParser, JsonRenderer};
use crate::render::{AsciiRenderer, DotRenderer, RenderConfig};

/// Text backends the orchestrator renders to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Dot,
    Ascii,
    Json,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Dot => "dot",
            Backend::Ascii => "ascii",
            Backend::Json => "json",
        }
    }
}

impl FromStr for Backend {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dot" | "gv" => Ok(Backend::Dot),
            "ascii" | "text" => Ok(Backend::Ascii),
            "json" => Ok(Backend::Json),
            _ => Err(DiagramError::InvalidOutputFormat {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plugin orchestrator that coordinates the entire pipeline
///
/// Detectors are registered by name; parsing and rendering use the built-in
/// draft/JSON parsers and the DOT, preview and JSON renderers.
pub struct Orchestrator {
    detectors: HashMap<String, Box<dyn Detector>>,
    draft_parser: DraftParser,
    json_parser: JsonParser,
    dot_renderer: DotRenderer,
    ascii_renderer: AsciiRenderer,
    json_renderer: JsonRenderer,
}

impl Orchestrator {
    /// Create an orchestrator with no detectors registered
    pub fn new() -> Self {
        Self {
            detectors: HashMap::new(),
            draft_parser: DraftParser::new(),
            json_parser: JsonParser::new(),
            dot_renderer: DotRenderer::new(),
            ascii_renderer: AsciiRenderer::new(),
            json_renderer: JsonRenderer::new(),
        }
    }

    /// Create an orchestrator with the draft and JSON detectors registered
    pub fn with_default_detectors() -> Self {
        let mut orchestrator = Self::new();
        orchestrator.register_default_detectors();
        orchestrator
    }

    /// Register the built-in detectors
    pub fn register_default_detectors(&mut self) {
        self.register_detector("draft".to_string(), Box::new(DraftDetector::new()));
        self.register_detector("json".to_string(), Box::new(JsonDetector::new()));
    }

    /// Use a specific preview configuration
    pub fn with_render_config(mut self, config: RenderConfig) -> Self {
        self.ascii_renderer = AsciiRenderer::with_config(config);
        self
    }

    /// Use a specific DOT renderer (for an icon root)
    pub fn with_dot_renderer(mut self, renderer: DotRenderer) -> Self {
        self.dot_renderer = renderer;
        self
    }

    /// Register a detector plugin
    pub fn register_detector(&mut self, name: String, detector: Box<dyn Detector>) {
        self.detectors.insert(name, detector);
    }

    /// Get available detector names, sorted
    pub fn get_detectors(&self) -> Vec<String> {
        let mut names: Vec<String> = self.detectors.keys().cloned().collect();
        names.sort();
        names
    }

    /// Detect the input format
    ///
    /// Every detector that accepts the input is scored; the highest
    /// confidence wins, ties going to the alphabetically first name.
    pub fn detect_input_format(&self, input: &str) -> Result<String> {
        let detect_span = span!(Level::INFO, "detect_input_format", input_len = input.len());
        let _enter = detect_span.enter();

        trace!("Starting input format detection");

        let mut best: Option<(&str, f64)> = None;
        for (name, detector) in &self.detectors {
            let confidence = detector.confidence(input);
            trace!(detector = %name, confidence, "Checking detector");
            if !detector.detect(input) {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_name, best_conf)) => {
                    confidence > best_conf
                        || (confidence == best_conf && name.as_str() < best_name)
                }
            };
            if better {
                best = Some((name.as_str(), confidence));
            }
        }

        match best {
            Some((name, confidence)) => {
                info!(detector = name, confidence, "Detected input format");
                Ok(name.to_string())
            }
            None => {
                warn!("No suitable detector found for input");
                Err(DiagramError::UnknownInputFormat.into())
            }
        }
    }

    /// Parse input of a known format into a validated database
    pub fn load_as(&self, format: &str, input: &str) -> Result<DiagramDatabase> {
        let parse_span = span!(Level::DEBUG, "pipeline_parse", format);
        let _parse_enter = parse_span.enter();

        let mut database = DiagramDatabase::new();
        match format {
            "draft" => self.draft_parser.parse(input, &mut database)?,
            "json" => self.json_parser.parse(input, &mut database)?,
            other => {
                warn!(format = other, "Unsupported input format");
                return Err(DiagramError::UnknownInputFormat.into());
            }
        }
        debug!(
            node_count = database.node_count(),
            edge_count = database.edge_count(),
            "Parsing completed"
        );
        drop(_parse_enter);

        let validate_span = span!(Level::DEBUG, "pipeline_validate");
        let _validate_enter = validate_span.enter();
        database.validate()?;
        drop(_validate_enter);

        Ok(database)
    }

    /// Detect, parse and validate input
    pub fn load(&self, input: &str) -> Result<DiagramDatabase> {
        let load_span = span!(Level::INFO, "load_diagram", input_len = input.len());
        let _enter = load_span.enter();

        let format = self.detect_input_format(input)?;
        debug!(format = %format, "Input format detected");
        self.load_as(&format, input)
    }

    /// Render an already loaded database
    pub fn render_database(&self, database: &DiagramDatabase, backend: Backend) -> Result<String> {
        let render_span = span!(Level::DEBUG, "pipeline_render", backend = %backend);
        let _enter = render_span.enter();

        let output = match backend {
            Backend::Dot => self.dot_renderer.render(database)?,
            Backend::Ascii => self.ascii_renderer.render(database)?,
            Backend::Json => self.json_renderer.render(database)?,
        };
        debug!(output_len = output.len(), "Rendering completed");
        Ok(output)
    }

    /// Process input through the complete pipeline
    pub fn render(&self, input: &str, backend: Backend) -> Result<String> {
        let process_span = span!(Level::INFO, "process_diagram", input_len = input.len());
        let _enter = process_span.enter();

        info!("Starting diagram processing pipeline");
        let database = self.load(input)?;
        let output = self.render_database(&database, backend)?;
        info!("Pipeline completed successfully");
        Ok(output)
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAFT: &str = "diagram \"Pipeline\"\n\
                         a = User \"a\"\n\
                         b = Database \"b\"\n\
                         a >> b\n";

    #[test]
    fn test_orchestrator_creation() {
        let orchestrator = Orchestrator::new();
        assert!(orchestrator.get_detectors().is_empty());
    }

    #[test]
    fn test_default_detectors() {
        let orchestrator = Orchestrator::with_default_detectors();
        assert_eq!(orchestrator.get_detectors(), vec!["draft", "json"]);
    }

    #[test]
    fn test_detect_with_no_detectors() {
        let orchestrator = Orchestrator::new();
        let err = orchestrator.detect_input_format(DRAFT).unwrap_err();
        assert_eq!(err.to_string(), "Unknown input format");
    }

    #[test]
    fn test_detect_draft_and_json() {
        let orchestrator = Orchestrator::with_default_detectors();
        assert_eq!(orchestrator.detect_input_format(DRAFT).unwrap(), "draft");
        assert_eq!(
            orchestrator
                .detect_input_format(r#"{"name": "x", "nodes": []}"#)
                .unwrap(),
            "json"
        );
    }

    #[test]
    fn test_render_each_backend() {
        let orchestrator = Orchestrator::with_default_detectors();
        let dot = orchestrator.render(DRAFT, Backend::Dot).unwrap();
        assert!(dot.contains("a -> b"));

        let preview = orchestrator.render(DRAFT, Backend::Ascii).unwrap();
        assert!(preview.contains("User"));

        let json = orchestrator.render(DRAFT, Backend::Json).unwrap();
        let reloaded = orchestrator.load(&json).unwrap();
        assert_eq!(reloaded.node_count(), 2);
        assert_eq!(reloaded.edge_count(), 1);
    }

    #[test]
    fn test_load_as_unknown_format() {
        let orchestrator = Orchestrator::new();
        assert!(orchestrator.load_as("yaml", DRAFT).is_err());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("DOT".parse::<Backend>().unwrap(), Backend::Dot);
        assert_eq!("ascii".parse::<Backend>().unwrap(), Backend::Ascii);
        assert!("png".parse::<Backend>().is_err());
    }
}
