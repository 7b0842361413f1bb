//! Draft statement parser using chumsky
//!
//! Parses a single line of a `.draft` source into a [`Statement`].

use chumsky::prelude::*;
use chumsky::text::int;

use crate::core::chumsky_utils::{
    bare_value, hash_comment, identifier, inline_whitespace, inline_whitespace_required,
    quoted_string, Extra,
};
use crate::model::ChainOp;

/// `key=value` pairs in source order
pub type AttrList = Vec<(String, String)>;

/// Which default attribute block a statement updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrTarget {
    Graph,
    Node,
    Edge,
}

/// Numbered node range, `name[1..=3]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRange {
    pub start: usize,
    pub end: usize,
    pub inclusive: bool,
}

impl NodeRange {
    /// Number of indices, computed without walking the range
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else if self.inclusive {
            (self.end - self.start).saturating_add(1)
        } else {
            self.end - self.start
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> Vec<usize> {
        if self.inclusive {
            (self.start..=self.end).collect()
        } else {
            (self.start..self.end).collect()
        }
    }
}

/// One side of a chain operator as written in source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandRef {
    /// A declared name
    Name(String),
    /// `[a, b, c]`
    Group(Vec<String>),
    /// `Kind "label"` declared in place
    Inline { kind: String, label: String },
    /// `edge(key=value, ...)`
    Edge(AttrList),
}

/// Parsed statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Diagram {
        name: String,
        options: AttrList,
    },
    Attributes {
        target: AttrTarget,
        attrs: AttrList,
    },
    Node {
        name: String,
        range: Option<NodeRange>,
        kind: String,
        label: String,
        attrs: AttrList,
    },
    ClusterOpen {
        label: String,
        options: AttrList,
    },
    ClusterClose,
    Chain {
        head: OperandRef,
        links: Vec<(ChainOp, OperandRef)>,
    },
}

/// Chumsky-based draft statement parser
pub struct ChumskyDraftParser;

impl ChumskyDraftParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one line
    ///
    /// On failure returns the message and the byte offset it points at.
    pub fn parse_statement(&self, line: &str) -> Result<Statement, (String, usize)> {
        Self::statement_parser()
            .parse(line)
            .into_result()
            .map_err(|errors| match errors.into_iter().next() {
                Some(error) => (error.to_string(), error.span().start),
                None => ("invalid statement".to_string(), 0),
            })
    }

    fn statement_parser<'src>() -> impl Parser<'src, &'src str, Statement, Extra<'src>> + Clone {
        inline_whitespace().ignore_then(choice((
            Self::diagram_parser().then_ignore(Self::line_end()),
            Self::attributes_parser().then_ignore(Self::line_end()),
            Self::cluster_open_parser().then_ignore(Self::line_end()),
            just('}')
                .to(Statement::ClusterClose)
                .then_ignore(Self::line_end()),
            Self::node_parser().then_ignore(Self::line_end()),
            Self::chain_parser().then_ignore(Self::line_end()),
        )))
    }

    /// Trailing whitespace and an optional comment
    fn line_end<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
        inline_whitespace()
            .then(hash_comment().or_not())
            .then(end())
            .ignored()
    }

    /// `diagram "Name" key=value ...`
    fn diagram_parser<'src>() -> impl Parser<'src, &'src str, Statement, Extra<'src>> + Clone {
        just("diagram")
            .then(inline_whitespace_required())
            .ignore_then(quoted_string())
            .then(Self::attr_list())
            .map(|(name, options)| Statement::Diagram { name, options })
    }

    /// `graph_attr key=value ...` and friends
    fn attributes_parser<'src>() -> impl Parser<'src, &'src str, Statement, Extra<'src>> + Clone {
        choice((
            just("graph_attr").to(AttrTarget::Graph),
            just("node_attr").to(AttrTarget::Node),
            just("edge_attr").to(AttrTarget::Edge),
        ))
        .then(Self::attr_list())
        .map(|(target, attrs)| Statement::Attributes { target, attrs })
    }

    /// `cluster "Label" key=value ... {`
    fn cluster_open_parser<'src>() -> impl Parser<'src, &'src str, Statement, Extra<'src>> + Clone
    {
        just("cluster")
            .then(inline_whitespace_required())
            .ignore_then(quoted_string())
            .then(Self::attr_list())
            .then_ignore(inline_whitespace())
            .then_ignore(just('{'))
            .map(|(label, options)| Statement::ClusterOpen { label, options })
    }

    /// `name = Kind "label" key=value ...` or `name[1..=3] = Kind "label {n}"`
    fn node_parser<'src>() -> impl Parser<'src, &'src str, Statement, Extra<'src>> + Clone {
        identifier()
            .then(Self::range_parser().or_not())
            .then_ignore(inline_whitespace())
            .then_ignore(just('='))
            .then_ignore(inline_whitespace())
            .then(Self::kind_parser())
            .then_ignore(inline_whitespace_required())
            .then(quoted_string())
            .then(Self::attr_list())
            .map(|((((name, range), kind), label), attrs)| Statement::Node {
                name,
                range,
                kind,
                label,
                attrs,
            })
    }

    fn range_parser<'src>() -> impl Parser<'src, &'src str, NodeRange, Extra<'src>> + Clone {
        let number = int(10).try_map(|digits: &str, span| {
            digits
                .parse::<usize>()
                .map_err(|e| Rich::custom(span, e.to_string()))
        });

        just('[')
            .ignore_then(number.clone())
            .then(just("..=").to(true).or(just("..").to(false)))
            .then(number)
            .then_ignore(just(']'))
            .map(|((start, inclusive), end)| NodeRange {
                start,
                end,
                inclusive,
            })
            .labelled("range")
    }

    /// Dotted kind name, `programming.flowchart.Action` or `Action`
    fn kind_parser<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
        identifier()
            .separated_by(just('.'))
            .at_least(1)
            .collect::<Vec<_>>()
            .map(|parts| parts.join("."))
            .labelled("node kind")
    }

    /// `key=value` with a quoted or bare value
    fn attribute_parser<'src>() -> impl Parser<'src, &'src str, (String, String), Extra<'src>> + Clone
    {
        identifier()
            .then_ignore(inline_whitespace())
            .then_ignore(just('='))
            .then_ignore(inline_whitespace())
            .then(quoted_string().or(bare_value()))
            .labelled("attribute")
    }

    /// Whitespace-separated attributes following a statement head
    fn attr_list<'src>() -> impl Parser<'src, &'src str, AttrList, Extra<'src>> + Clone {
        inline_whitespace_required()
            .ignore_then(Self::attribute_parser())
            .repeated()
            .collect()
    }

    fn chain_parser<'src>() -> impl Parser<'src, &'src str, Statement, Extra<'src>> + Clone {
        Self::operand_parser()
            .then(
                Self::chain_op_parser()
                    .then(Self::operand_parser())
                    .repeated()
                    .at_least(1)
                    .collect::<Vec<_>>(),
            )
            .map(|(head, links)| Statement::Chain { head, links })
    }

    fn chain_op_parser<'src>() -> impl Parser<'src, &'src str, ChainOp, Extra<'src>> + Clone {
        choice((
            just(">>").to(ChainOp::Forward),
            just("<<").to(ChainOp::Back),
            just('-').to(ChainOp::Undirected),
        ))
        .padded_by(inline_whitespace())
        .labelled("chain operator")
    }

    fn operand_parser<'src>() -> impl Parser<'src, &'src str, OperandRef, Extra<'src>> + Clone {
        let comma = just(',').padded_by(inline_whitespace());

        let edge = just("edge")
            .then(inline_whitespace())
            .then(just('('))
            .then(inline_whitespace())
            .ignore_then(
                Self::attribute_parser()
                    .separated_by(comma.clone())
                    .allow_trailing()
                    .collect::<Vec<_>>(),
            )
            .then_ignore(inline_whitespace())
            .then_ignore(just(')'))
            .map(OperandRef::Edge);

        let group = just('[')
            .then(inline_whitespace())
            .ignore_then(
                identifier()
                    .separated_by(comma)
                    .at_least(1)
                    .allow_trailing()
                    .collect::<Vec<_>>(),
            )
            .then_ignore(inline_whitespace())
            .then_ignore(just(']'))
            .map(OperandRef::Group);

        let inline = Self::kind_parser()
            .then_ignore(inline_whitespace_required())
            .then(quoted_string())
            .map(|(kind, label)| OperandRef::Inline { kind, label });

        choice((edge, group, inline, identifier().map(OperandRef::Name))).labelled("operand")
    }
}

impl Default for ChumskyDraftParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Statement {
        ChumskyDraftParser::new().parse_statement(line).unwrap()
    }

    fn pairs(items: &[(&str, &str)]) -> AttrList {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_diagram_header() {
        assert_eq!(
            parse(r#"diagram "Cli Technical Command" filename="daily-bugle" direction=TB"#),
            Statement::Diagram {
                name: "Cli Technical Command".to_string(),
                options: pairs(&[("filename", "daily-bugle"), ("direction", "TB")]),
            }
        );
    }

    #[test]
    fn test_attribute_block_with_comment() {
        assert_eq!(
            parse("graph_attr bgcolor=#FFFFFF pad=\"1.0\"  # background"),
            Statement::Attributes {
                target: AttrTarget::Graph,
                attrs: pairs(&[("bgcolor", "#FFFFFF"), ("pad", "1.0")]),
            }
        );
    }

    #[test]
    fn test_node_declaration() {
        assert_eq!(
            parse(r#"  request = onprem.client.User "Request Prompt""#),
            Statement::Node {
                name: "request".to_string(),
                range: None,
                kind: "onprem.client.User".to_string(),
                label: "Request Prompt".to_string(),
                attrs: Vec::new(),
            }
        );
    }

    #[test]
    fn test_node_range() {
        match parse(r#"analyzer[1..=3] = Action "Analyzer_{n}" fontsize=11"#) {
            Statement::Node { range, attrs, .. } => {
                let range = range.unwrap();
                assert_eq!(range.values(), vec![1, 2, 3]);
                assert_eq!(attrs, pairs(&[("fontsize", "11")]));
            }
            other => panic!("expected node, got {:?}", other),
        }
        match parse(r#"w[0..2] = Action "w{n}""#) {
            Statement::Node { range, .. } => assert_eq!(range.unwrap().values(), vec![0, 1]),
            other => panic!("expected node, got {:?}", other),
        }
    }

    #[test]
    fn test_range_len() {
        let range = |start, end, inclusive| NodeRange { start, end, inclusive };
        assert_eq!(range(1, 3, true).len(), 3);
        assert_eq!(range(0, 2, false).len(), 2);
        assert!(range(3, 3, false).is_empty());
        assert!(range(5, 1, true).is_empty());
        assert_eq!(range(0, usize::MAX, true).len(), usize::MAX);
    }

    #[test]
    fn test_cluster_blocks() {
        assert_eq!(
            parse(r#"cluster "Workers" direction=TB {"#),
            Statement::ClusterOpen {
                label: "Workers".to_string(),
                options: pairs(&[("direction", "TB")]),
            }
        );
        assert_eq!(parse("    }"), Statement::ClusterClose);
    }

    #[test]
    fn test_simple_chain() {
        assert_eq!(
            parse("technical_sources >> analyzer >> technical_storage"),
            Statement::Chain {
                head: OperandRef::Name("technical_sources".to_string()),
                links: vec![
                    (ChainOp::Forward, OperandRef::Name("analyzer".to_string())),
                    (
                        ChainOp::Forward,
                        OperandRef::Name("technical_storage".to_string())
                    ),
                ],
            }
        );
    }

    #[test]
    fn test_chain_with_edge_and_inline_node() {
        assert_eq!(
            parse(r#"Display "Reminders" >> edge(label="Feeds", color=red) << service"#),
            Statement::Chain {
                head: OperandRef::Inline {
                    kind: "Display".to_string(),
                    label: "Reminders".to_string(),
                },
                links: vec![
                    (
                        ChainOp::Forward,
                        OperandRef::Edge(pairs(&[("label", "Feeds"), ("color", "red")]))
                    ),
                    (ChainOp::Back, OperandRef::Name("service".to_string())),
                ],
            }
        );
    }

    #[test]
    fn test_chain_with_group_and_undirected() {
        assert_eq!(
            parse("[a, b,c] - d<<e"),
            Statement::Chain {
                head: OperandRef::Group(vec!["a".into(), "b".into(), "c".into()]),
                links: vec![
                    (ChainOp::Undirected, OperandRef::Name("d".to_string())),
                    (ChainOp::Back, OperandRef::Name("e".to_string())),
                ],
            }
        );
    }

    #[test]
    fn test_empty_edge_operand() {
        match parse("a >> edge() >> b") {
            Statement::Chain { links, .. } => {
                assert_eq!(links[0].1, OperandRef::Edge(Vec::new()));
            }
            other => panic!("expected chain, got {:?}", other),
        }
    }

    #[test]
    fn test_keyword_prefixed_names_are_nodes() {
        match parse(r#"graph_attrs = Action "x""#) {
            Statement::Node { name, .. } => assert_eq!(name, "graph_attrs"),
            other => panic!("expected node, got {:?}", other),
        }
    }

    #[test]
    fn test_errors_report_offset() {
        let parser = ChumskyDraftParser::new();
        let (_, offset) = parser.parse_statement("a >> ").unwrap_err();
        assert!(offset >= 2);
        assert!(parser.parse_statement("a").is_err());
        assert!(parser
            .parse_statement(r#"x = Action "unterminated"#)
            .is_err());
    }
}
