//! Shared text utilities for diagram processing
//!
//! This module contains common text manipulation functions used across plugins.

use unicode_width::UnicodeWidthStr;

/// Wrap text to fit within a maximum width, breaking on word boundaries.
///
/// Explicit newlines in the label are kept as line breaks. Each resulting
/// line fits within `max_width` display columns unless a single word is wider.
/// If `max_width` is 0, lines are only split on explicit newlines.
///
/// # Example
/// ```
/// use draftsman::core::wrap_label;
///
/// let lines = wrap_label("This is a long label", 10);
/// assert_eq!(lines, vec!["This is a", "long label"]);
/// ```
pub fn wrap_label(label: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw_line in label.split('\n') {
        lines.extend(wrap_line(raw_line, max_width));
    }
    lines
}

fn wrap_line(label: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 || UnicodeWidthStr::width(label) <= max_width {
        return vec![label.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in label.split_whitespace() {
        let word_width = UnicodeWidthStr::width(word);

        if current_width == 0 {
            current_line = word.to_string();
            current_width = word_width;
        } else if current_width + 1 + word_width <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
            current_width += 1 + word_width;
        } else {
            lines.push(current_line);
            current_line = word.to_string();
            current_width = word_width;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

/// Display width of the widest line
pub fn display_width(lines: &[String]) -> usize {
    lines
        .iter()
        .map(|line| UnicodeWidthStr::width(line.as_str()))
        .max()
        .unwrap_or(0)
}

/// Convert a `CamelCase` class name to `kebab-case`
///
/// ```
/// use draftsman::core::kebab_case;
///
/// assert_eq!(kebab_case("MultipleDocuments"), "multiple-documents");
/// ```
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Turn a label into an identifier: lowercase ASCII alphanumerics joined by `_`
///
/// Returns `"node"` when nothing usable is left.
///
/// ```
/// use draftsman::core::slugify;
///
/// assert_eq!(slugify("Content Intent Service"), "content_intent_service");
/// assert_eq!(slugify("Analyzer_1"), "analyzer_1");
/// ```
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_sep = false;
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        return "node".to_string();
    }
    if slug.starts_with(|c: char| c.is_ascii_digit()) {
        slug.insert(0, '_');
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_short_label() {
        assert_eq!(wrap_label("Hello", 20), vec!["Hello"]);
    }

    #[test]
    fn test_wrap_exact_fit() {
        assert_eq!(wrap_label("Hello", 5), vec!["Hello"]);
    }

    #[test]
    fn test_wrap_long_label() {
        assert_eq!(
            wrap_label("This is a long label", 10),
            vec!["This is a", "long label"]
        );
    }

    #[test]
    fn test_wrap_zero_width() {
        assert_eq!(wrap_label("Hello World", 0), vec!["Hello World"]);
    }

    #[test]
    fn test_wrap_empty_label() {
        assert_eq!(wrap_label("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_explicit_newline() {
        assert_eq!(wrap_label("Action\nAnalyzer_1", 0), vec!["Action", "Analyzer_1"]);
    }

    #[test]
    fn test_wrap_unicode() {
        let result = wrap_label("日本 語テスト", 6);
        assert_eq!(result, vec!["日本", "語テスト"]);
    }

    #[test]
    fn test_display_width() {
        let lines = vec!["ab".to_string(), "abcd".to_string()];
        assert_eq!(display_width(&lines), 4);
        assert_eq!(display_width(&[]), 0);
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("User"), "user");
        assert_eq!(kebab_case("StartEnd"), "start-end");
        assert_eq!(kebab_case("OffPageConnectorLeft"), "off-page-connector-left");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Request Prompt"), "request_prompt");
        assert_eq!(slugify("  Social -- Storage "), "social_storage");
        assert_eq!(slugify("1st"), "_1st");
        assert_eq!(slugify("!!!"), "node");
    }
}
