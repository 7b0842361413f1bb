//! Draft detector implementation
//!
//! Detects the `.draft` diagram language.

use crate::core::Detector;
use tracing::{debug, info, trace};

/// Draft detector implementation
pub struct DraftDetector;

const OPERATORS: [&str; 3] = [" >> ", " << ", " - "];

impl DraftDetector {
    pub fn new() -> Self {
        Self
    }

    fn significant_lines(input: &str) -> impl Iterator<Item = &str> {
        input
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
    }
}

impl Default for DraftDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for DraftDetector {
    fn detect(&self, input: &str) -> bool {
        let input = input.trim();
        trace!(input_len = input.len(), "DraftDetector::detect called");

        if input.is_empty() || input.starts_with('{') {
            debug!("Empty or JSON-shaped input, detection failed");
            return false;
        }

        for line in Self::significant_lines(input) {
            if line.starts_with("diagram \"") {
                info!("Detected draft via diagram header");
                return true;
            }
            if line.starts_with("cluster \"") && line.ends_with('{') {
                debug!("Detected draft via cluster block");
                return true;
            }
            if OPERATORS.iter().any(|op| line.contains(op)) {
                debug!("Detected draft via chain operator");
                return true;
            }
        }

        trace!("No draft patterns detected");
        false
    }

    fn confidence(&self, input: &str) -> f64 {
        let input = input.trim();
        if input.is_empty() || input.starts_with('{') {
            return 0.0;
        }

        let mut score: f64 = 0.0;
        let mut chains = 0usize;
        for line in Self::significant_lines(input) {
            if line.starts_with("diagram \"") {
                score += 0.6;
            } else if line.starts_with("cluster \"") {
                score += 0.1;
            } else if line.starts_with("graph_attr")
                || line.starts_with("node_attr")
                || line.starts_with("edge_attr")
            {
                score += 0.1;
            } else if OPERATORS.iter().any(|op| line.contains(op)) {
                chains += 1;
            }
        }
        score += 0.15 * (chains as f64).min(3.0);

        score.min(1.0)
    }

    fn format_name(&self) -> &'static str {
        "draft"
    }

    fn patterns(&self) -> Vec<&'static str> {
        let mut patterns = vec!["diagram \"", "cluster \"", "graph_attr", "node_attr", "edge_attr"];
        patterns.extend(OPERATORS);
        patterns
    }
}
