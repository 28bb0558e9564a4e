//! Markup Parser
//!
//! Splits lightweight markup into lines and classifies each line into a
//! [`Block`]. Classification is total: every line becomes exactly one
//! block, and the same line always becomes the same block.

use std::sync::OnceLock;

use gostfmt_ast::{Block, BlockKind};
use regex::Regex;

/// Line-oriented markup parser
pub struct MarkupParser<'a> {
    text: &'a str,
}

impl<'a> MarkupParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Parse every line into a block. Lines that look like markup tags
    /// (`<...>`) are dropped.
    pub fn parse(&self) -> Vec<Block> {
        static TAG_RE: OnceLock<Regex> = OnceLock::new();
        let tag_re = TAG_RE.get_or_init(|| Regex::new(r"^<.+>").unwrap());

        let normalized = self.text.replace("\r\n", "\n");
        let blocks: Vec<Block> = normalized
            .split('\n')
            .filter(|line| !tag_re.is_match(line))
            .map(parse_line)
            .collect();
        tracing::debug!(blocks = blocks.len(), "parsed markup");
        blocks
    }
}

/// Classify a single line of markup
pub fn parse_line(line: &str) -> Block {
    static PAGE_BREAK_RE: OnceLock<Regex> = OnceLock::new();
    static QUOTE_RE: OnceLock<Regex> = OnceLock::new();
    static QUOTE_MARKERS_RE: OnceLock<Regex> = OnceLock::new();
    static HEADER_RE: OnceLock<Regex> = OnceLock::new();
    static UNORDERED_RE: OnceLock<Regex> = OnceLock::new();
    static ORDERED_RE: OnceLock<Regex> = OnceLock::new();
    static DELIMITER_RE: OnceLock<Regex> = OnceLock::new();

    let page_break_re = PAGE_BREAK_RE.get_or_init(|| Regex::new(r"^-{3,}\s*$").unwrap());
    let quote_re = QUOTE_RE.get_or_init(|| Regex::new(r"^(>)+ ").unwrap());
    let quote_markers_re = QUOTE_MARKERS_RE.get_or_init(|| Regex::new(r"^(> )+").unwrap());
    let header_re = HEADER_RE.get_or_init(|| Regex::new(r"^(#{1,6}) (.+)$").unwrap());
    let unordered_re = UNORDERED_RE.get_or_init(|| Regex::new(r"^ *[-*+] (.+)$").unwrap());
    let ordered_re = ORDERED_RE.get_or_init(|| Regex::new(r"^ *\d+\. (.+)$").unwrap());
    let delimiter_re = DELIMITER_RE
        .get_or_init(|| Regex::new(r"^\s*\|?(\s*:?-+:?\s*\|)+\s*(:?-+:?\s*)?$").unwrap());

    if page_break_re.is_match(line) {
        return Block::new(BlockKind::PageBreak, "");
    }

    if quote_re.is_match(line) {
        return Block::new(BlockKind::Normal, quote_markers_re.replace(line, ""));
    }

    if let Some(rest) = line.strip_prefix("```") {
        return Block::new(BlockKind::Normal, quote_markers_re.replace(rest, ""));
    }

    if let Some(caps) = header_re.captures(line) {
        let level = caps[1].len() as u8;
        return Block::header(level, caps[2].trim());
    }

    if unordered_re.is_match(line) {
        let trimmed = line.trim();
        return Block::new(BlockKind::UnorderedListItem, &trimmed[2..]);
    }

    if ordered_re.is_match(line) {
        return Block::new(BlockKind::OrderedListItem, line.trim());
    }

    if line.matches('|').count() >= 2 {
        let kind = if delimiter_re.is_match(line) {
            BlockKind::TableSeparator
        } else {
            BlockKind::TableRow
        };
        return Block::new(kind, line);
    }

    if !line.trim().is_empty() {
        return Block::new(BlockKind::Normal, line);
    }

    Block::new(BlockKind::Empty, line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<BlockKind> {
        MarkupParser::new(text).parse().into_iter().map(|b| b.kind).collect()
    }

    #[test]
    fn test_headers() {
        assert_eq!(parse_line("# Введение"), Block::header(1, "Введение"));
        assert_eq!(parse_line("### 1.2. Обзор "), Block::header(3, "1.2. Обзор"));
        assert_eq!(parse_line("###### six"), Block::header(6, "six"));
        assert_eq!(parse_line("####### seven").kind, BlockKind::Normal);
        assert_eq!(parse_line("#no space").kind, BlockKind::Normal);
    }

    #[test]
    fn test_page_break() {
        assert_eq!(parse_line("---"), Block::new(BlockKind::PageBreak, ""));
        assert_eq!(parse_line("-----  ").kind, BlockKind::PageBreak);
        assert_eq!(parse_line("--- x").kind, BlockKind::Normal);
    }

    #[test]
    fn test_quotes_and_fences() {
        assert_eq!(parse_line("> > cited"), Block::new(BlockKind::Normal, "cited"));
        assert_eq!(parse_line("```rust"), Block::new(BlockKind::Normal, "rust"));
        assert_eq!(parse_line("```> x"), Block::new(BlockKind::Normal, "x"));
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            parse_line("  - first item"),
            Block::new(BlockKind::UnorderedListItem, "first item")
        );
        assert_eq!(
            parse_line("* starred"),
            Block::new(BlockKind::UnorderedListItem, "starred")
        );
        assert_eq!(
            parse_line(" 12. twelfth"),
            Block::new(BlockKind::OrderedListItem, "12. twelfth")
        );
        assert_eq!(parse_line("-no space").kind, BlockKind::Normal);
    }

    #[test]
    fn test_bullet_with_pipes_stays_a_list_item() {
        assert_eq!(
            parse_line("- a | b | c"),
            Block::new(BlockKind::UnorderedListItem, "a | b | c")
        );
    }

    #[test]
    fn test_table_lines() {
        assert_eq!(parse_line("| a | b |").kind, BlockKind::TableRow);
        assert_eq!(parse_line("|---|---|").kind, BlockKind::TableSeparator);
        assert_eq!(parse_line("| :-- | --: |").kind, BlockKind::TableSeparator);
        assert_eq!(parse_line("a | b | c").kind, BlockKind::TableRow);
        assert_eq!(parse_line("a | b").kind, BlockKind::Normal);
        assert_eq!(parse_line("| a | b |").text, "| a | b |");
    }

    #[test]
    fn test_normal_and_empty() {
        assert_eq!(parse_line("Text"), Block::new(BlockKind::Normal, "Text"));
        assert_eq!(parse_line("   ").kind, BlockKind::Empty);
        assert_eq!(parse_line("").kind, BlockKind::Empty);
    }

    #[test]
    fn test_parse_document() {
        let text = "# Title\r\n<!-- comment -->\r\nBody\r\n\r\n- item";
        assert_eq!(
            kinds(text),
            vec![
                BlockKind::Header,
                BlockKind::Normal,
                BlockKind::Empty,
                BlockKind::UnorderedListItem
            ]
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = "## A\n| x | y |\n|---|---|\n| 1 | 2 |\n1. one";
        assert_eq!(MarkupParser::new(text).parse(), MarkupParser::new(text).parse());
    }
}
