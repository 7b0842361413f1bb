//! Character rendering for the terminal preview
//!
//! Draws a laid out diagram onto an [`AsciiCanvas`]: cluster frames first,
//! then edges, then node boxes on top.

use anyhow::Result;
use tracing::{debug, info, span, trace, Level};
use unicode_width::UnicodeWidthStr;

use super::{AsciiLayoutAlgorithm, LayoutConfig, PositionedCluster, PositionedEdge, PositionedNode};
use crate::core::{
    AsciiCanvas, BoxChars, CharacterSet, Database, LayoutAlgorithm, LineChars, NodeKind, Renderer,
};
use crate::model::DiagramDatabase;

/// Preview rendering options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub charset: CharacterSet,
    /// Max label width before wrapping (0 = no wrap)
    pub max_label_width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            charset: CharacterSet::Unicode,
            max_label_width: LayoutConfig::default().max_label_width,
        }
    }
}

/// Terminal preview renderer
pub struct AsciiRenderer {
    config: RenderConfig,
}

impl AsciiRenderer {
    pub fn new() -> Self {
        Self {
            config: RenderConfig::default(),
        }
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Create a renderer with a specific character set
    pub fn with_charset(charset: CharacterSet) -> Self {
        Self::with_config(RenderConfig {
            charset,
            ..RenderConfig::default()
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn layout_algorithm(&self) -> AsciiLayoutAlgorithm {
        AsciiLayoutAlgorithm::with_config(LayoutConfig {
            max_label_width: self.config.max_label_width,
            ..LayoutConfig::default()
        })
    }

    fn draw_frame(&self, canvas: &mut AsciiCanvas, frame: &PositionedCluster) {
        let chars = BoxChars::double(self.config.charset);
        draw_box(canvas, &chars, frame.x, frame.y, frame.width, frame.height);
    }

    fn draw_frame_title(&self, canvas: &mut AsciiCanvas, frame: &PositionedCluster) {
        let title = format!(" {} ", frame.label);
        if UnicodeWidthStr::width(title.as_str()) + 4 <= frame.width {
            canvas.draw_text(frame.x + 2, frame.y, &title);
        }
    }

    fn draw_node(&self, canvas: &mut AsciiCanvas, node: &PositionedNode) {
        let chars = match node.kind {
            NodeKind::User | NodeKind::Users | NodeKind::Client => {
                BoxChars::rounded(self.config.charset)
            }
            _ => BoxChars::rectangle(self.config.charset),
        };
        canvas.clear_rect(node.x, node.y, node.width, node.height);
        draw_box(canvas, &chars, node.x, node.y, node.width, node.height);

        if node.kind.has_icon() {
            let title = format!(" {} ", node.kind.class_name());
            if UnicodeWidthStr::width(title.as_str()) + 2 <= node.width {
                canvas.draw_text(node.x + 1, node.y, &title);
            }
        }

        for (i, line) in node.lines.iter().enumerate() {
            let width = UnicodeWidthStr::width(line.as_str());
            let offset = node.width.saturating_sub(width) / 2;
            canvas.draw_text(node.x + offset, node.y + 1 + i, line);
        }
    }

    fn draw_edge(&self, canvas: &mut AsciiCanvas, edge: &PositionedEdge) {
        let style = self.config.charset;
        let lines = LineChars::for_style(style);
        let points = &edge.points;
        if points.len() < 2 {
            trace!(from = %edge.from_id, to = %edge.to_id, "Edge too short to draw");
            return;
        }

        let headings: Vec<char> = points.windows(2).map(|w| heading(w[0], w[1])).collect();
        for (segment, &dir) in points.windows(2).zip(&headings) {
            let c = if matches!(dir, 'U' | 'D') {
                lines.vertical
            } else {
                lines.horizontal
            };
            for (x, y) in cells(segment[0], segment[1]) {
                canvas.draw_line_char(x, y, c, style);
            }
        }
        for (i, pair) in headings.windows(2).enumerate() {
            let (x, y) = points[i + 1];
            canvas.draw_line_char(x, y, lines.corner(style, pair[0], pair[1]), style);
        }

        if edge.direction.head() {
            if let (Some(&(x, y)), Some(&dir)) = (points.last(), headings.last()) {
                canvas.set_char(x, y, arrow(&lines, dir));
            }
        }
        if edge.direction.tail() {
            let (x, y) = points[0];
            canvas.set_char(x, y, arrow(&lines, opposite(headings[0])));
        }
    }

    fn draw_edge_label(&self, canvas: &mut AsciiCanvas, edge: &PositionedEdge) {
        if let (Some(label), Some((x, y))) = (&edge.label, edge.label_pos) {
            canvas.draw_text(x, y, &label.replace('\n', " "));
        }
    }
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_box(canvas: &mut AsciiCanvas, chars: &BoxChars, x: usize, y: usize, w: usize, h: usize) {
    if w < 2 || h < 2 {
        return;
    }
    let right = x + w - 1;
    let bottom = y + h - 1;
    canvas.set_char(x, y, chars.top_left);
    canvas.set_char(right, y, chars.top_right);
    canvas.set_char(x, bottom, chars.bottom_left);
    canvas.set_char(right, bottom, chars.bottom_right);
    canvas.draw_horizontal_line(x + 1, y, w - 2, chars.horizontal);
    canvas.draw_horizontal_line(x + 1, bottom, w - 2, chars.horizontal);
    canvas.draw_vertical_line(x, y + 1, h - 2, chars.vertical);
    canvas.draw_vertical_line(right, y + 1, h - 2, chars.vertical);
}

/// Direction of travel from `a` to `b` on an axis-aligned segment
fn heading(a: (usize, usize), b: (usize, usize)) -> char {
    if a.0 == b.0 {
        if b.1 < a.1 {
            'U'
        } else {
            'D'
        }
    } else if b.0 < a.0 {
        'L'
    } else {
        'R'
    }
}

fn opposite(dir: char) -> char {
    match dir {
        'U' => 'D',
        'D' => 'U',
        'L' => 'R',
        _ => 'L',
    }
}

fn arrow(lines: &LineChars, dir: char) -> char {
    match dir {
        'U' => lines.arrow_up,
        'D' => lines.arrow_down,
        'L' => lines.arrow_left,
        _ => lines.arrow_right,
    }
}

/// Cells covered by an axis-aligned segment, both ends included
fn cells(a: (usize, usize), b: (usize, usize)) -> Vec<(usize, usize)> {
    let (x0, x1) = (a.0.min(b.0), a.0.max(b.0));
    let (y0, y1) = (a.1.min(b.1), a.1.max(b.1));
    (y0..=y1)
        .flat_map(|y| (x0..=x1).map(move |x| (x, y)))
        .collect()
}

impl Renderer<DiagramDatabase> for AsciiRenderer {
    type Output = String;

    fn render(&self, database: &DiagramDatabase) -> Result<Self::Output> {
        let render_span = span!(
            Level::INFO,
            "render_ascii",
            node_count = database.node_count(),
            edge_count = database.edge_count(),
            charset = %self.config.charset
        );
        let _enter = render_span.enter();

        let layout = self.layout_algorithm().layout(database)?;
        debug!(
            width = layout.width,
            height = layout.height,
            "Layout ready for rendering"
        );

        let mut canvas = AsciiCanvas::new(layout.width, layout.height);

        let frame_span = span!(Level::DEBUG, "draw_frames", count = layout.clusters.len());
        let _frame_enter = frame_span.enter();
        for frame in &layout.clusters {
            self.draw_frame(&mut canvas, frame);
        }
        drop(_frame_enter);

        let edge_span = span!(Level::DEBUG, "draw_edges", count = layout.edges.len());
        let _edge_enter = edge_span.enter();
        for edge in &layout.edges {
            self.draw_edge(&mut canvas, edge);
        }
        drop(_edge_enter);

        // Titles and labels go over any edge passing through them
        for frame in &layout.clusters {
            self.draw_frame_title(&mut canvas, frame);
        }
        for edge in &layout.edges {
            self.draw_edge_label(&mut canvas, edge);
        }

        let node_span = span!(Level::DEBUG, "draw_nodes", count = layout.nodes.len());
        let _node_enter = node_span.enter();
        for node in &layout.nodes {
            self.draw_node(&mut canvas, node);
        }
        drop(_node_enter);

        let output = canvas.to_string();
        info!(output_len = output.len(), "Preview rendered");
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "ascii"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        match self.config.charset {
            CharacterSet::Ascii => "ascii",
            CharacterSet::Unicode => "unicode",
        }
    }
}
