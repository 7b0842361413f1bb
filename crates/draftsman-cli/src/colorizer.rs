//! Terminal colorization for the diagram preview
//!
//! Applies ANSI escape codes to preview elements using crossterm.

use crossterm::style::{Color, Stylize};

/// Colorize a rendered preview
///
/// - Cluster frames: Blue
/// - Node borders: Cyan
/// - Edge lines and junctions: Dark grey
/// - Arrowheads: Yellow
/// - Labels: Default (terminal color)
///
/// Unicode output is colored exactly; ASCII output only gets its arrowheads
/// and frame characters colored when they sit next to line characters, so
/// hyphens and letters in labels stay untouched.
pub fn colorize_output(input: &str) -> String {
    let mut result = String::with_capacity(input.len() * 2);

    for line in input.lines() {
        let chars: Vec<char> = line.chars().collect();
        for (i, &c) in chars.iter().enumerate() {
            let color = match c {
                '╔' | '╗' | '╚' | '╝' | '═' | '║' => Some(Color::Blue),
                '┌' | '┐' | '└' | '┘' | '╭' | '╮' | '╰' | '╯' => Some(Color::Cyan),
                '─' | '│' | '├' | '┤' | '┬' | '┴' | '┼' => Some(Color::DarkGrey),
                '▲' | '▼' | '◀' | '▶' => Some(Color::Yellow),
                '#' | '=' if beside_line(&chars, i, &['#', '=']) => Some(Color::Blue),
                '>' | '<' if beside_line(&chars, i, &['-', '+']) => Some(Color::Yellow),
                _ => None,
            };
            match color {
                Some(color) => result.push_str(&c.to_string().with(color).to_string()),
                None => result.push(c),
            }
        }
        result.push('\n');
    }

    // Match the input's trailing newline
    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    result
}

/// Whether a neighbouring cell holds one of `line_chars`
fn beside_line(chars: &[char], i: usize, line_chars: &[char]) -> bool {
    let before = i.checked_sub(1).and_then(|j| chars.get(j));
    let after = chars.get(i + 1);
    [before, after]
        .into_iter()
        .flatten()
        .any(|c| line_chars.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut in_escape = false;
        for c in s.chars() {
            match (in_escape, c) {
                (false, '\x1b') => in_escape = true,
                (true, 'm') => in_escape = false,
                (true, _) => {}
                (false, c) => out.push(c),
            }
        }
        out
    }

    #[test]
    fn test_colorize_preserves_content() {
        let input = "╔═ Workers ══╗\n║ ┌──────┐ ║\n║ │ A-1  │ ║";
        let output = colorize_output(input);
        assert!(output.contains("\x1b["));
        assert_eq!(strip_ansi(&output), input);
    }

    #[test]
    fn test_ascii_label_hyphens_are_untouched() {
        let input = "| re-run |";
        assert_eq!(colorize_output(input), input);
    }

    #[test]
    fn test_ascii_arrow_is_colored() {
        let output = colorize_output("+---->");
        assert!(output.contains("\x1b["));
        assert_eq!(strip_ansi(&output), "+---->");
    }

    #[test]
    fn test_no_trailing_newline() {
        let output = colorize_output("test");
        assert!(!output.ends_with('\n'));
    }
}
