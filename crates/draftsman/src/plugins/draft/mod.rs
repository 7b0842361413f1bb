//! Draft diagram language
//!
//! A line-oriented text format for diagrams:
//!
//! ```text
//! diagram "Web Service" direction=TB
//! lb = onprem.client.Client "lb"
//! cluster "Workers" {
//!     worker[1..=3] = Action "worker_{n}"
//! }
//! events = Database "events"
//! lb >> worker >> edge(label="writes") >> events
//! ```

mod chumsky_parser;
mod detector;
mod parser;

pub use chumsky_parser::{AttrList, AttrTarget, ChumskyDraftParser, NodeRange, OperandRef, Statement};
pub use detector::*;
pub use parser::*;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::core::{Database, Detector, Parser};
    use crate::model::DiagramDatabase;

    #[test]
    fn test_detect_then_parse() {
        let input = "diagram \"Web Service\" direction=TB\n\
                     lb = onprem.client.Client \"lb\"\n\
                     cluster \"Workers\" {\n\
                     worker[1..=3] = Action \"worker_{n}\"\n\
                     }\n\
                     events = Database \"events\"\n\
                     lb >> worker >> edge(label=\"writes\") >> events\n";

        let detector = DraftDetector::new();
        assert!(detector.detect(input));

        let parser = DraftParser::new();
        assert!(parser.can_parse(input));
        let mut database = DiagramDatabase::new();
        parser.parse(input, &mut database).unwrap();

        assert_eq!(database.node_count(), 5);
        assert_eq!(database.edge_count(), 6);
        assert!(database.validate().is_ok());
        assert_eq!(database.output_filename(), "web_service");
    }
}
