//! Property-based tests for identifiers, chains and the preview layout

use draftsman::core::slugify;
use draftsman::prelude::*;
use draftsman::render::ascii::AsciiLayoutAlgorithm;
use draftsman::render::quote_id;
use proptest::prelude::*;

/// Strategy for generating a small graph: node labels plus edges by index
fn graph_strategy() -> impl Strategy<Value = (Vec<String>, Vec<(usize, usize)>, Direction)> {
    (1usize..8)
        .prop_flat_map(|n| {
            (
                prop::collection::vec("[A-Za-z][A-Za-z0-9 ]{0,14}", n),
                prop::collection::vec((0..n, 0..n), 0..12),
                prop_oneof![
                    Just(Direction::TopBottom),
                    Just(Direction::BottomTop),
                    Just(Direction::LeftRight),
                    Just(Direction::RightLeft),
                ],
            )
        })
}

fn build_graph(labels: &[String], edges: &[(usize, usize)], direction: Direction) -> DiagramDatabase {
    let mut d = DiagramBuilder::new("generated").direction(direction);
    let ids: Vec<_> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            if i % 3 == 2 {
                d.cluster("Group", |d| d.node(NodeKind::Action, label.clone()))
            } else {
                d.node(NodeKind::Database, label.clone())
            }
        })
        .collect();
    for &(from, to) in edges {
        d.connect(&ids[from], ChainOp::Forward, &ids[to]).unwrap();
    }
    d.finish().unwrap()
}

proptest! {
    #[test]
    fn slug_is_a_plain_identifier(label in "\\PC{0,30}") {
        let slug = slugify(&label);
        prop_assert!(!slug.is_empty());
        prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        prop_assert!(!slug.starts_with(|c: char| c.is_ascii_digit()));
    }

    #[test]
    fn quoted_ids_are_balanced(id in "\\PC{0,20}") {
        let quoted = quote_id(&id);
        if quoted != id {
            prop_assert!(quoted.len() >= 2);
            prop_assert!(quoted.starts_with('"') && quoted.ends_with('"'));
            prop_assert!(!quoted.contains('\n'));
        }
    }

    #[test]
    fn chain_is_cross_product(left in 1usize..5, right in 1usize..5) {
        let mut d = DiagramBuilder::new("cross");
        let l: Vec<_> = (0..left).map(|i| d.node(NodeKind::Action, format!("l{}", i))).collect();
        let r: Vec<_> = (0..right).map(|i| d.node(NodeKind::Action, format!("r{}", i))).collect();
        let last = (d.chain(&l) >> EdgeSpec::labeled("x") << &r).end().unwrap();
        prop_assert_eq!(last, r);
        let db = d.finish().unwrap();
        prop_assert_eq!(db.edge_count(), left * right);
        prop_assert!(db.edges().all(|e| e.direction == EdgeDirection::Both));
    }

    #[test]
    fn layout_stays_in_bounds((labels, edges, direction) in graph_strategy()) {
        let db = build_graph(&labels, &edges, direction);
        let layout = AsciiLayoutAlgorithm::new().layout(&db).unwrap();

        prop_assert_eq!(layout.nodes.len(), labels.len());
        for node in &layout.nodes {
            prop_assert!(node.x + node.width <= layout.width);
            prop_assert!(node.y + node.height <= layout.height);
        }
        for frame in &layout.clusters {
            prop_assert!(frame.x + frame.width <= layout.width);
            prop_assert!(frame.y + frame.height <= layout.height);
        }
        for edge in &layout.edges {
            for &(x, y) in &edge.points {
                prop_assert!(x < layout.width && y < layout.height);
            }
        }
    }

    #[test]
    fn preview_shows_every_label((labels, edges, direction) in graph_strategy()) {
        let db = build_graph(&labels, &edges, direction);
        let output = AsciiRenderer::with_charset(CharacterSet::Ascii).render(&db).unwrap();
        prop_assert!(output.is_ascii());
        for label in &labels {
            for word in label.split_whitespace() {
                prop_assert!(output.contains(word), "missing '{}' in\n{}", word, output);
            }
        }
    }

    #[test]
    fn json_round_trip_keeps_dot((labels, edges, direction) in graph_strategy()) {
        let db = build_graph(&labels, &edges, direction);
        let json = JsonRenderer::new().render(&db).unwrap();
        let mut reloaded = DiagramDatabase::new();
        JsonParser::new().parse(&json, &mut reloaded).unwrap();

        let renderer = DotRenderer::new();
        prop_assert_eq!(renderer.render(&reloaded).unwrap(), renderer.render(&db).unwrap());
    }
}
