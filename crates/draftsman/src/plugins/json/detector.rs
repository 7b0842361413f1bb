//! JSON document detector

use crate::core::Detector;
use tracing::{debug, trace};

/// Detects diagram documents serialized as JSON objects
pub struct JsonDetector;

const KEYS: [&str; 4] = ["\"nodes\"", "\"edges\"", "\"clusters\"", "\"name\""];

impl JsonDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for JsonDetector {
    fn detect(&self, input: &str) -> bool {
        let input = input.trim();
        trace!(input_len = input.len(), "JsonDetector::detect called");
        let detected = input.starts_with('{') && input.ends_with('}');
        if detected {
            debug!("Detected JSON document");
        }
        detected
    }

    fn confidence(&self, input: &str) -> f64 {
        if !self.detect(input) {
            return 0.0;
        }
        let keys = KEYS.iter().filter(|key| input.contains(*key)).count();
        (0.5 + 0.15 * keys as f64).min(1.0)
    }

    fn format_name(&self) -> &'static str {
        "json"
    }

    fn patterns(&self) -> Vec<&'static str> {
        let mut patterns = vec!["{", "}"];
        patterns.extend(KEYS);
        patterns
    }
}
