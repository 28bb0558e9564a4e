//! Inline emphasis detection
//!
//! `*x*` is italic and `**x**` is bold. Detection is a heuristic over the
//! raw text: markup is never nested, and when an italic and a bold span
//! collide the one starting first wins (italic on a tie).

use std::sync::OnceLock;

use gostfmt_ast::{InlineSpan, InlineStyle};
use regex::Regex;

/// Split `text` into consecutive emphasis spans covering the whole string
pub fn detect_inline_format(text: &str) -> Vec<InlineSpan> {
    static BOLD_RE: OnceLock<Regex> = OnceLock::new();
    let bold_re = BOLD_RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

    let mut found = italic_spans(text);
    found.extend(
        bold_re
            .find_iter(text)
            .map(|m| InlineSpan::new(m.start(), m.end(), InlineStyle::Bold)),
    );
    found.sort_by_key(|span| span.start);

    let mut spans = Vec::new();
    let mut cursor = 0;
    for span in found {
        if span.start < cursor {
            continue;
        }
        if span.start > cursor {
            spans.push(InlineSpan::new(cursor, span.start, InlineStyle::Normal));
        }
        spans.push(span);
        cursor = span.end;
    }
    if cursor < text.len() {
        spans.push(InlineSpan::new(cursor, text.len(), InlineStyle::Normal));
    }
    spans.retain(|span| !span.is_empty());
    spans
}

/// Run texts with their emphasis, markup asterisks removed. Spans left
/// empty after removal are skipped.
pub fn inline_runs(text: &str) -> Vec<(String, InlineStyle)> {
    detect_inline_format(text)
        .into_iter()
        .filter_map(|span| {
            let run = span.slice(text).replace('*', "");
            (!run.is_empty()).then_some((run, span.style))
        })
        .collect()
}

/// `*content*` where neither delimiter touches another asterisk and the
/// content holds no asterisk
fn italic_spans(text: &str) -> Vec<InlineSpan> {
    let bytes = text.as_bytes();
    let is_star = |i: usize| bytes.get(i) == Some(&b'*');
    let isolated = |i: usize| is_star(i) && !(i > 0 && is_star(i - 1)) && !is_star(i + 1);

    let mut spans = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        if !isolated(pos) {
            pos += 1;
            continue;
        }
        let close = bytes[pos + 1..]
            .iter()
            .position(|b| *b == b'*')
            .map(|offset| pos + 1 + offset);
        match close {
            Some(end) if end > pos + 1 && !is_star(end + 1) => {
                spans.push(InlineSpan::new(pos, end + 1, InlineStyle::Italic));
                pos = end + 1;
            }
            _ => pos += 1,
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled(text: &str) -> Vec<(String, InlineStyle)> {
        inline_runs(text)
    }

    #[test]
    fn test_plain_text() {
        let spans = detect_inline_format("plain text");
        assert_eq!(spans, vec![InlineSpan::new(0, 10, InlineStyle::Normal)]);
        assert!(detect_inline_format("").is_empty());
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            styled("a **b** c *d* e"),
            vec![
                ("a ".to_string(), InlineStyle::Normal),
                ("b".to_string(), InlineStyle::Bold),
                (" c ".to_string(), InlineStyle::Normal),
                ("d".to_string(), InlineStyle::Italic),
                (" e".to_string(), InlineStyle::Normal),
            ]
        );
    }

    #[test]
    fn test_bold_then_italic() {
        assert_eq!(
            styled("**bold** and *italic*"),
            vec![
                ("bold".to_string(), InlineStyle::Bold),
                (" and ".to_string(), InlineStyle::Normal),
                ("italic".to_string(), InlineStyle::Italic),
            ]
        );
    }

    #[test]
    fn test_spans_cover_text() {
        let text = "x *мир* **жир** y";
        let spans = detect_inline_format(text);
        assert_eq!(spans.first().map(|s| s.start), Some(0));
        assert_eq!(spans.last().map(|s| s.end), Some(text.len()));
        for pair in spans.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_triple_asterisks_yield_bold() {
        assert_eq!(styled("***x***"), vec![("x".to_string(), InlineStyle::Bold)]);
    }

    #[test]
    fn test_unclosed_markers() {
        assert_eq!(
            styled("2 * 3 = 6"),
            vec![("2  3 = 6".to_string(), InlineStyle::Normal)]
        );
        assert_eq!(styled("**"), Vec::new());
    }

    #[test]
    fn test_italic_requires_content() {
        assert!(italic_spans("a ** b").is_empty());
        assert_eq!(
            italic_spans("*a* and *b*"),
            vec![
                InlineSpan::new(0, 3, InlineStyle::Italic),
                InlineSpan::new(8, 11, InlineStyle::Italic)
            ]
        );
    }
}
