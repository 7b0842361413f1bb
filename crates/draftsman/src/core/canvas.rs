//! Character canvas for the terminal preview
//!
//! Provides a grid-based canvas the preview renderer draws nodes, clusters
//! and edges on.

use unicode_width::UnicodeWidthChar;

use super::{merge_line_char, CharacterSet};

/// Placeholder stored in the cell after a double-width character
const WIDE_CONTINUATION: char = '\0';

/// Character canvas representing the final diagram
#[derive(Debug, Clone)]
pub struct AsciiCanvas {
    pub width: usize,
    pub height: usize,
    pub grid: Vec<Vec<char>>,
}

impl AsciiCanvas {
    /// Create a new canvas with the specified dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let grid = vec![vec![' '; width.max(1)]; height.max(1)];
        Self {
            width: width.max(1),
            height: height.max(1),
            grid,
        }
    }

    /// Ensure the canvas is at least the specified size, expanding if needed
    pub fn ensure_size(&mut self, min_width: usize, min_height: usize) {
        if min_width > self.width {
            for row in &mut self.grid {
                row.resize(min_width, ' ');
            }
            self.width = min_width;
        }
        if min_height > self.height {
            let extra_rows = min_height - self.height;
            self.grid
                .extend((0..extra_rows).map(|_| vec![' '; self.width]));
            self.height = min_height;
        }
    }

    /// Set a character at the specified position
    pub fn set_char(&mut self, x: usize, y: usize, c: char) {
        self.ensure_size(x + 1, y + 1);
        self.grid[y][x] = c;
    }

    /// Get the character at the specified position
    pub fn get_char(&self, x: usize, y: usize) -> char {
        if y < self.height && x < self.width {
            self.grid[y][x]
        } else {
            ' '
        }
    }

    /// Draw a line character, joining it with any line already in the cell
    pub fn draw_line_char(&mut self, x: usize, y: usize, c: char, style: CharacterSet) {
        let merged = merge_line_char(self.get_char(x, y), c, style);
        self.set_char(x, y, merged);
    }

    /// Draw text at the specified position (left-aligned)
    ///
    /// Double-width characters occupy two cells.
    pub fn draw_text(&mut self, x: usize, y: usize, text: &str) {
        let mut col = x;
        for c in text.chars() {
            let width = UnicodeWidthChar::width(c).unwrap_or(0);
            if width == 0 {
                continue;
            }
            self.set_char(col, y, c);
            if width == 2 {
                self.set_char(col + 1, y, WIDE_CONTINUATION);
            }
            col += width;
        }
    }

    /// Draw a horizontal line from `x` over `length` cells
    pub fn draw_horizontal_line(&mut self, x: usize, y: usize, length: usize, c: char) {
        for i in 0..length {
            self.set_char(x + i, y, c);
        }
    }

    /// Draw a vertical line from `y` over `length` cells
    pub fn draw_vertical_line(&mut self, x: usize, y: usize, length: usize, c: char) {
        for i in 0..length {
            self.set_char(x, y + i, c);
        }
    }

    /// Fill a rectangle with blanks
    pub fn clear_rect(&mut self, x: usize, y: usize, width: usize, height: usize) {
        for row in y..y + height {
            for col in x..x + width {
                self.set_char(col, row, ' ');
            }
        }
    }
}

impl std::fmt::Display for AsciiCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut rows: Vec<String> = self
            .grid
            .iter()
            .map(|row| {
                let s: String = row.iter().filter(|c| **c != WIDE_CONTINUATION).collect();
                s.trim_end().to_string()
            })
            .collect();

        while rows.first().is_some_and(|row| row.is_empty()) {
            rows.remove(0);
        }
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }

        if rows.is_empty() {
            return Ok(());
        }

        let min_indent = rows
            .iter()
            .filter(|row| !row.is_empty())
            .map(|row| row.chars().take_while(|c| *c == ' ').count())
            .min()
            .unwrap_or(0);

        if min_indent > 0 {
            for row in &mut rows {
                *row = row.chars().skip(min_indent).collect();
            }
        }

        write!(f, "{}", rows.join("\n"))
    }
}
