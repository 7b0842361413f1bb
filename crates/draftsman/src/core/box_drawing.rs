//! Shared box drawing characters for the terminal preview
//!
//! This module provides consistent box drawing characters across the preview
//! renderer, supporting both ASCII and Unicode modes.

use super::CharacterSet;

/// Box drawing characters for rendering rectangular shapes
#[derive(Debug, Clone, Copy)]
pub struct BoxChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BoxChars {
    /// Standard rectangle box characters
    pub fn rectangle(style: CharacterSet) -> Self {
        match style {
            CharacterSet::Ascii => Self::ascii(),
            CharacterSet::Unicode => Self::unicode(),
        }
    }

    /// Rounded rectangle box characters, used for people and clients
    pub fn rounded(style: CharacterSet) -> Self {
        match style {
            CharacterSet::Ascii => Self::ascii(),
            CharacterSet::Unicode => Self {
                top_left: '╭',
                top_right: '╮',
                bottom_left: '╰',
                bottom_right: '╯',
                horizontal: '─',
                vertical: '│',
            },
        }
    }

    /// Double-line box for clusters (visually distinct from nodes)
    pub fn double(style: CharacterSet) -> Self {
        match style {
            CharacterSet::Ascii => Self {
                top_left: '#',
                top_right: '#',
                bottom_left: '#',
                bottom_right: '#',
                horizontal: '=',
                vertical: '#',
            },
            CharacterSet::Unicode => Self {
                top_left: '╔',
                top_right: '╗',
                bottom_left: '╚',
                bottom_right: '╝',
                horizontal: '═',
                vertical: '║',
            },
        }
    }

    /// ASCII-only box characters
    pub fn ascii() -> Self {
        Self {
            top_left: '+',
            top_right: '+',
            bottom_left: '+',
            bottom_right: '+',
            horizontal: '-',
            vertical: '|',
        }
    }

    /// Unicode box-drawing characters
    pub fn unicode() -> Self {
        Self {
            top_left: '┌',
            top_right: '┐',
            bottom_left: '└',
            bottom_right: '┘',
            horizontal: '─',
            vertical: '│',
        }
    }
}

impl Default for BoxChars {
    fn default() -> Self {
        Self::unicode()
    }
}

/// Line drawing characters for edges
#[derive(Debug, Clone, Copy)]
pub struct LineChars {
    pub horizontal: char,
    pub vertical: char,
    pub arrow_up: char,
    pub arrow_down: char,
    pub arrow_left: char,
    pub arrow_right: char,
    pub crossing: char,
}

impl LineChars {
    pub fn for_style(style: CharacterSet) -> Self {
        match style {
            CharacterSet::Ascii => Self {
                horizontal: '-',
                vertical: '|',
                arrow_up: '^',
                arrow_down: 'v',
                arrow_left: '<',
                arrow_right: '>',
                crossing: '+',
            },
            CharacterSet::Unicode => Self {
                horizontal: '─',
                vertical: '│',
                arrow_up: '▲',
                arrow_down: '▼',
                arrow_left: '◀',
                arrow_right: '▶',
                crossing: '┼',
            },
        }
    }

    /// Corner joining two orthogonal segments.
    ///
    /// `from` and `to` are the directions of travel before and after the
    /// corner, each one of `U`, `D`, `L`, `R`.
    pub fn corner(&self, style: CharacterSet, from: char, to: char) -> char {
        if style.is_ascii() {
            return '+';
        }
        // Connected sides of the corner cell
        let sides = |d: char| match d {
            'U' => 'D',
            'D' => 'U',
            'L' => 'R',
            _ => 'L',
        };
        let a = sides(from);
        let b = to;
        let has = |s: char| a == s || b == s;
        match (has('U'), has('D'), has('L'), has('R')) {
            (false, true, false, true) => '┌',
            (false, true, true, false) => '┐',
            (true, false, false, true) => '└',
            (true, false, true, false) => '┘',
            (true, true, _, _) => '│',
            _ => '─',
        }
    }
}

/// Merge a line character with whatever already occupies the cell.
///
/// Crossing lines become a junction so edges that share segments stay readable.
pub fn merge_line_char(existing: char, new: char, style: CharacterSet) -> char {
    let lines = LineChars::for_style(style);
    if existing == ' ' || existing == new {
        return new;
    }
    let is_line = |c: char| {
        matches!(
            c,
            '─' | '│' | '┌' | '┐' | '└' | '┘' | '├' | '┤' | '┬' | '┴' | '┼' | '-' | '|' | '+'
        )
    };
    if !is_line(existing) || !is_line(new) {
        return new;
    }
    if style.is_ascii() {
        return lines.crossing;
    }
    let (eu, ed, el, er) = unicode_sides(existing);
    let (nu, nd, nl, nr) = unicode_sides(new);
    sides_to_char(eu || nu, ed || nd, el || nl, er || nr)
}

fn unicode_sides(c: char) -> (bool, bool, bool, bool) {
    // (up, down, left, right)
    match c {
        '─' => (false, false, true, true),
        '│' => (true, true, false, false),
        '┌' => (false, true, false, true),
        '┐' => (false, true, true, false),
        '└' => (true, false, false, true),
        '┘' => (true, false, true, false),
        '├' => (true, true, false, true),
        '┤' => (true, true, true, false),
        '┬' => (false, true, true, true),
        '┴' => (true, false, true, true),
        _ => (true, true, true, true),
    }
}

fn sides_to_char(up: bool, down: bool, left: bool, right: bool) -> char {
    match (up, down, left, right) {
        (false, false, true, true) | (false, false, true, false) | (false, false, false, true) => {
            '─'
        }
        (true, true, false, false) | (true, false, false, false) | (false, true, false, false) => {
            '│'
        }
        (false, true, false, true) => '┌',
        (false, true, true, false) => '┐',
        (true, false, false, true) => '└',
        (true, false, true, false) => '┘',
        (true, true, false, true) => '├',
        (true, true, true, false) => '┤',
        (false, true, true, true) => '┬',
        (true, false, true, true) => '┴',
        _ => '┼',
    }
}
