//! Core detector trait for input format identification

/// Core trait for input format detectors
///
/// Each input syntax provides a detector that recognises its patterns.
///
/// # Example
/// ```
/// use draftsman::core::Detector;
/// use draftsman::plugins::draft::DraftDetector;
///
/// let detector = DraftDetector::new();
/// assert!(detector.detect("diagram \"Web\"\nweb = Node \"web\""));
/// ```
pub trait Detector: Send + Sync {
    /// Detect if the input matches this format
    fn detect(&self, input: &str) -> bool;

    /// Get the confidence level of the detection (0.0 to 1.0)
    fn confidence(&self, input: &str) -> f64;

    /// Get the input format name
    fn format_name(&self) -> &'static str;

    /// Get key patterns that this detector looks for
    fn patterns(&self) -> Vec<&'static str>;
}
