//! Layered layout for the terminal preview
//!
//! Nodes are ranked by longest path from the sources, ordered within a rank
//! so members of a cluster stay adjacent, and edges are routed as three
//! orthogonal segments through the gap between ranks.
//!
//! Positions are computed on a main axis (along the flow) and a cross axis
//! (across it) and mapped to `x`/`y` at the end, so one pass serves all four
//! directions.

use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, info, span, trace, Level};
use unicode_width::UnicodeWidthStr;

use crate::core::{display_width, wrap_label, Database, EdgeDirection, LayoutAlgorithm, NodeKind};
use crate::model::DiagramDatabase;

/// Cells a cluster frame adds around its contents on each side (gap + border)
pub const FRAME_MARGIN: usize = 2;

/// Position data for a laid out node
#[derive(Debug, Clone)]
pub struct PositionedNode {
    pub id: String,
    pub kind: NodeKind,
    pub lines: Vec<String>,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Frame drawn around a cluster's members
#[derive(Debug, Clone)]
pub struct PositionedCluster {
    pub index: usize,
    pub label: String,
    pub depth: usize,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Orthogonal route of an edge
#[derive(Debug, Clone)]
pub struct PositionedEdge {
    pub from_id: String,
    pub to_id: String,
    /// Corner points from the source side to the target side
    pub points: Vec<(usize, usize)>,
    pub direction: EdgeDirection,
    pub label: Option<String>,
    pub label_pos: Option<(usize, usize)>,
}

/// Layout output containing positioned elements
#[derive(Debug, Default)]
pub struct AsciiLayoutResult {
    pub nodes: Vec<PositionedNode>,
    pub clusters: Vec<PositionedCluster>,
    pub edges: Vec<PositionedEdge>,
    pub width: usize,
    pub height: usize,
}

/// Layout configuration
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Gap between neighbours in the same rank
    pub node_sep: usize,
    /// Minimum gap between ranks
    pub rank_sep: usize,
    pub min_node_width: usize,
    pub padding: usize,
    /// Max label width before wrapping (0 = no wrap)
    pub max_label_width: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_sep: 2,
            rank_sep: 3,
            min_node_width: 7,
            padding: 1,
            max_label_width: 20,
        }
    }
}

/// Box of a node on the main/cross axes
#[derive(Debug, Clone, Copy)]
struct AxisBox {
    main: usize,
    main_len: usize,
    cross: usize,
    cross_len: usize,
}

impl AxisBox {
    fn main_end(&self) -> usize {
        self.main + self.main_len
    }

    fn cross_center(&self) -> usize {
        self.cross + self.cross_len / 2
    }
}

/// Layered layout algorithm for the terminal preview
pub struct AsciiLayoutAlgorithm {
    config: LayoutConfig,
}

impl AsciiLayoutAlgorithm {
    pub fn new() -> Self {
        Self {
            config: LayoutConfig::default(),
        }
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Box size for a node: the label plus a border, wide enough for the kind title
    fn node_size(&self, lines: &[String], kind: NodeKind) -> (usize, usize) {
        let title = if kind.has_icon() {
            UnicodeWidthStr::width(kind.class_name()) + 4
        } else {
            0
        };
        let width = (display_width(lines) + 4)
            .max(title)
            .max(self.config.min_node_width);
        (width, lines.len() + 2)
    }
}

impl Default for AsciiLayoutAlgorithm {
    fn default() -> Self {
        Self::new()
    }
}

/// Cluster ancestry of a node, outermost first
fn cluster_chain(db: &DiagramDatabase, cluster: Option<usize>) -> Vec<usize> {
    let mut chain = Vec::new();
    let mut current = cluster;
    while let Some(index) = current {
        chain.push(index);
        current = db.get_cluster(index).and_then(|c| c.parent);
    }
    chain.reverse();
    chain
}

fn common_prefix(a: &[usize], b: &[usize]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

impl LayoutAlgorithm<DiagramDatabase> for AsciiLayoutAlgorithm {
    type Output = AsciiLayoutResult;

    fn layout(&self, database: &DiagramDatabase) -> Result<Self::Output> {
        let direction = database.direction();
        let layout_span = span!(
            Level::INFO,
            "layout_ascii",
            node_count = database.node_count(),
            edge_count = database.edge_count(),
            direction = ?direction
        );
        let _enter = layout_span.enter();

        let nodes: Vec<_> = database.nodes().collect();
        if nodes.is_empty() {
            debug!("Empty database, returning empty layout");
            return Ok(AsciiLayoutResult::default());
        }

        let vertical = direction.is_vertical();
        let autolabel = database.settings().autolabel;

        // Sizes
        let size_span = span!(Level::DEBUG, "calculate_node_sizes");
        let _size_enter = size_span.enter();
        let order: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();
        let mut lines: HashMap<&str, Vec<String>> = HashMap::new();
        let mut sizes: HashMap<&str, (usize, usize)> = HashMap::new();
        for node in &nodes {
            let wrapped = wrap_label(&node.display_label(autolabel), self.config.max_label_width);
            sizes.insert(node.id.as_str(), self.node_size(&wrapped, node.kind));
            lines.insert(node.id.as_str(), wrapped);
        }
        drop(_size_enter);

        // Ranks by longest path
        let layer_span = span!(Level::DEBUG, "assign_layers");
        let _layer_enter = layer_span.enter();
        let mut layers: HashMap<&str, usize> = HashMap::new();
        for node_id in database.topological_sort() {
            let layer = database
                .predecessors(node_id)
                .iter()
                .filter(|&&p| p != node_id)
                .filter_map(|p| layers.get(p))
                .max()
                .map(|l| l + 1)
                .unwrap_or(0);
            layers.insert(node_id, layer);
        }
        let max_layer = layers.values().max().copied().unwrap_or(0);
        let chains: HashMap<&str, Vec<usize>> = nodes
            .iter()
            .map(|n| (n.id.as_str(), cluster_chain(database, n.cluster)))
            .collect();
        let mut layer_nodes: Vec<Vec<&str>> = vec![Vec::new(); max_layer + 1];
        for (&id, &layer) in &layers {
            layer_nodes[layer].push(id);
        }
        for layer in &mut layer_nodes {
            layer.sort_by(|a, b| chains[a].cmp(&chains[b]).then(order[a].cmp(&order[b])));
        }
        if direction.is_reversed() {
            layer_nodes.reverse();
        }
        debug!(max_layer, "Assigned nodes to layers");
        drop(_layer_enter);

        // Positions on the main/cross axes
        let position_span = span!(Level::DEBUG, "calculate_positions");
        let _position_enter = position_span.enter();
        let levels = database
            .clusters()
            .iter()
            .map(|c| c.depth + 1)
            .max()
            .unwrap_or(0);
        let frame_room = FRAME_MARGIN * levels;
        let axis_size = |id: &str| {
            let (w, h) = sizes[id];
            if vertical {
                (h, w)
            } else {
                (w, h)
            }
        };

        let label_room = if vertical {
            0
        } else {
            database
                .edges()
                .filter_map(|e| e.label.as_deref())
                .map(|l| display_width(&wrap_label(l, 0)))
                .max()
                .map(|w| w + 4)
                .unwrap_or(0)
        };
        let rank_gap = self.config.rank_sep.max(label_room) + 2 * frame_room;
        let cross_sep = if vertical {
            self.config.node_sep
        } else {
            (self.config.node_sep / 2).max(1)
        };

        // Cross offsets per layer, with room for frames opening and closing
        let mut cross_offsets: HashMap<&str, usize> = HashMap::new();
        let mut layer_extent = Vec::with_capacity(layer_nodes.len());
        for layer in &layer_nodes {
            let mut cursor = 0;
            let mut prev: Option<&[usize]> = None;
            for &id in layer {
                let chain = chains[id].as_slice();
                if let Some(prev) = prev {
                    let common = common_prefix(prev, chain);
                    let frames = (prev.len() - common) + (chain.len() - common);
                    cursor += cross_sep + FRAME_MARGIN * frames;
                }
                cross_offsets.insert(id, cursor);
                cursor += axis_size(id).1;
                prev = Some(chain);
            }
            layer_extent.push(cursor);
        }
        let widest = layer_extent.iter().copied().max().unwrap_or(0);

        let origin = self.config.padding + frame_room;
        let mut boxes: HashMap<&str, AxisBox> = HashMap::new();
        let mut main = origin;
        for (layer, extent) in layer_nodes.iter().zip(&layer_extent) {
            let shift = (widest - extent) / 2;
            let mut layer_len = 0;
            for &id in layer {
                let (main_len, cross_len) = axis_size(id);
                boxes.insert(
                    id,
                    AxisBox {
                        main,
                        main_len,
                        cross: origin + shift + cross_offsets[id],
                        cross_len,
                    },
                );
                layer_len = layer_len.max(main_len);
            }
            main += layer_len + rank_gap;
        }
        drop(_position_enter);

        let to_xy = |main: usize, cross: usize| {
            if vertical {
                (cross, main)
            } else {
                (main, cross)
            }
        };

        let mut positioned_nodes = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let b = boxes[node.id.as_str()];
            let (x, y) = to_xy(b.main, b.cross);
            let (width, height) = sizes[node.id.as_str()];
            positioned_nodes.push(PositionedNode {
                id: node.id.clone(),
                kind: node.kind,
                lines: lines.remove(node.id.as_str()).unwrap_or_default(),
                x,
                y,
                width,
                height,
            });
        }

        // Cluster frames, innermost first so parents can wrap children
        let mut frames: HashMap<usize, PositionedCluster> = HashMap::new();
        for cluster in database.clusters().iter().rev() {
            let mut bounds: Option<(usize, usize, usize, usize)> = None;
            let mut extend = |x0: usize, y0: usize, x1: usize, y1: usize| {
                bounds = Some(match bounds {
                    None => (x0, y0, x1, y1),
                    Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
                });
            };
            for member in database.cluster_members(cluster.index) {
                if let Some(n) = positioned_nodes.iter().find(|n| n.id == member.id) {
                    extend(n.x, n.y, n.x + n.width, n.y + n.height);
                }
            }
            for child in database.child_clusters(Some(cluster.index)) {
                if let Some(f) = frames.get(&child.index) {
                    extend(f.x, f.y, f.x + f.width, f.y + f.height);
                }
            }
            if let Some((x0, y0, x1, y1)) = bounds {
                let x = x0.saturating_sub(FRAME_MARGIN);
                let y = y0.saturating_sub(FRAME_MARGIN);
                frames.insert(
                    cluster.index,
                    PositionedCluster {
                        index: cluster.index,
                        label: cluster.label.clone(),
                        depth: cluster.depth,
                        x,
                        y,
                        width: x1 + FRAME_MARGIN - x,
                        height: y1 + FRAME_MARGIN - y,
                    },
                );
            }
        }
        let mut positioned_clusters: Vec<_> = frames.into_values().collect();
        positioned_clusters.sort_by_key(|c| c.index);

        // Edge routes
        let edge_span = span!(Level::DEBUG, "route_edges");
        let _edge_enter = edge_span.enter();
        let mut positioned_edges = Vec::with_capacity(database.edge_count());
        for edge in database.edges() {
            let (Some(from), Some(to)) = (boxes.get(edge.from.as_str()), boxes.get(edge.to.as_str()))
            else {
                continue;
            };
            let (mut exit_cross, mut entry_cross) = (from.cross_center(), to.cross_center());
            let (exit_main, entry_main, mid) = if edge.from == edge.to {
                exit_cross = exit_cross.saturating_sub(1);
                entry_cross += 1;
                (from.main_end(), from.main_end(), from.main_end() + 1)
            } else if to.main >= from.main_end() {
                let (exit, entry) = (from.main_end(), to.main.saturating_sub(1));
                (exit, entry, exit + (entry.saturating_sub(exit)) / 2)
            } else if to.main_end() <= from.main {
                let (exit, entry) = (from.main.saturating_sub(1), to.main_end());
                (exit, entry, entry + (exit.saturating_sub(entry)) / 2)
            } else {
                let below = from.main_end().max(to.main_end());
                (from.main_end(), to.main_end(), below + 1)
            };

            let mut points = vec![
                to_xy(exit_main, exit_cross),
                to_xy(mid, exit_cross),
                to_xy(mid, entry_cross),
                to_xy(entry_main, entry_cross),
            ];
            points.dedup();

            let label_pos = edge.label.as_ref().map(|label| {
                if vertical {
                    to_xy(entry_main, entry_cross + 2)
                } else {
                    let width = UnicodeWidthStr::width(label.as_str());
                    let start = if exit_main <= entry_main {
                        exit_main + 1
                    } else {
                        exit_main.saturating_sub(width)
                    };
                    to_xy(start, exit_cross.saturating_sub(1))
                }
            });

            trace!(from = %edge.from, to = %edge.to, ?points, "Routed edge");
            positioned_edges.push(PositionedEdge {
                from_id: edge.from.clone(),
                to_id: edge.to.clone(),
                points,
                direction: edge.direction,
                label: edge.label.clone(),
                label_pos,
            });
        }
        drop(_edge_enter);

        let mut width = 0;
        let mut height = 0;
        for n in &positioned_nodes {
            width = width.max(n.x + n.width);
            height = height.max(n.y + n.height);
        }
        for c in &positioned_clusters {
            width = width.max(c.x + c.width);
            height = height.max(c.y + c.height);
        }
        for e in &positioned_edges {
            for &(x, y) in &e.points {
                width = width.max(x + 1);
                height = height.max(y + 1);
            }
        }
        width += self.config.padding;
        height += self.config.padding;

        info!(
            node_count = positioned_nodes.len(),
            cluster_count = positioned_clusters.len(),
            edge_count = positioned_edges.len(),
            width,
            height,
            "Layout completed"
        );

        Ok(AsciiLayoutResult {
            nodes: positioned_nodes,
            clusters: positioned_clusters,
            edges: positioned_edges,
            width,
            height,
        })
    }

    fn name(&self) -> &'static str {
        "layered"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }
}
