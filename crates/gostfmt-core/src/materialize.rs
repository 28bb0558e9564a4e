//! Materializer
//!
//! Turns parsed markup blocks into paragraphs and tables of a structural
//! document. Styling here is deliberately coarse (built-in style ids and
//! inline emphasis); the reformatter applies the GOST catalogue afterwards.
//!
//! Inline-formatted runs carry the registry body font. Heading runs and the
//! bullet prefix carry no direct formatting so the heading and list styles
//! decide their font.

use std::sync::OnceLock;

use gostfmt_ast::{
    Alignment, Block, BlockKind, DocumentEditor, InlineStyle, NodeId, ParagraphFormat, RunFormat,
};
use regex::Regex;

use crate::inline::inline_runs;
use crate::styles::StyleRegistry;

/// Built-in style for body text
pub const NORMAL_STYLE: &str = "Normal";
/// Built-in style for numbered list items
pub const LIST_NUMBER_STYLE: &str = "ListNumber";
/// Built-in style for bulleted list items
pub const LIST_BULLET_STYLE: &str = "ListBullet";
/// Literal marker written before unordered list items
pub const BULLET_PREFIX: &str = "— ";

/// Built-in heading style id for a markup heading depth (capped at 3)
pub fn heading_style(level: u8) -> String {
    format!("Heading{}", level.clamp(1, 3))
}

/// Writes blocks into a document
pub struct Materializer<'r> {
    registry: &'r StyleRegistry,
}

impl<'r> Materializer<'r> {
    pub fn new(registry: &'r StyleRegistry) -> Self {
        Self { registry }
    }

    /// Append one paragraph per non-table block and one table per run of
    /// table blocks
    pub fn materialize<D: DocumentEditor + ?Sized>(&self, blocks: &[Block], doc: &mut D) {
        let mut table: Option<NodeId> = None;

        for block in blocks {
            match block.kind {
                BlockKind::TableRow => match table {
                    Some(t) => self.append_row(doc, t, &block.text),
                    None => table = Some(self.start_table(doc, &block.text)),
                },
                BlockKind::TableSeparator => {
                    if table.is_none() {
                        tracing::debug!(text = %block.text, "dropping orphan table separator");
                    }
                }
                _ => {
                    table = None;
                    self.write_paragraph(doc, block);
                }
            }
        }
        tracing::info!(blocks = blocks.len(), "materialized markup");
    }

    fn write_paragraph<D: DocumentEditor + ?Sized>(&self, doc: &mut D, block: &Block) {
        let p = doc.append_paragraph();
        match block.kind {
            BlockKind::PageBreak => {
                doc.apply_paragraph_format(
                    p,
                    &ParagraphFormat {
                        page_break_before: Some(true),
                        ..ParagraphFormat::default()
                    },
                );
            }
            BlockKind::Header => {
                doc.set_paragraph_style(p, &heading_style(block.level.unwrap_or(1)));
                let text = block.text.replace("**", "");
                doc.add_run(p, text.trim(), &RunFormat::default());
            }
            BlockKind::Normal => {
                doc.set_paragraph_style(p, NORMAL_STYLE);
                self.add_inline_runs(doc, p, &block.text);
            }
            BlockKind::OrderedListItem => {
                doc.set_paragraph_style(p, LIST_NUMBER_STYLE);
                self.add_inline_runs(doc, p, &block.text);
            }
            BlockKind::UnorderedListItem => {
                doc.set_paragraph_style(p, LIST_BULLET_STYLE);
                doc.add_run(p, BULLET_PREFIX, &RunFormat::default());
                self.add_inline_runs(doc, p, &block.text);
            }
            BlockKind::Empty | BlockKind::TableRow | BlockKind::TableSeparator => {}
        }
    }

    fn start_table<D: DocumentEditor + ?Sized>(&self, doc: &mut D, line: &str) -> NodeId {
        let cells = split_cells(line);
        let t = doc.append_table(1, cells.len().max(1));
        for (col, text) in cells.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            if let Some(p) = doc.cell_paragraphs(t, 0, col).first().copied() {
                doc.apply_paragraph_format(p, &ParagraphFormat::aligned(Alignment::Center));
                self.add_inline_runs(doc, p, text);
            }
        }
        t
    }

    fn append_row<D: DocumentEditor + ?Sized>(&self, doc: &mut D, t: NodeId, line: &str) {
        let Some(row) = doc.add_table_row(t) else {
            return;
        };
        let columns = doc.table_cell_count(t, row);
        let cells = split_cells(line);
        if cells.len() > columns {
            tracing::warn!(
                row,
                columns,
                cells = cells.len(),
                "ignoring cells beyond the table's column count"
            );
        }
        for (col, text) in cells.iter().enumerate().take(columns) {
            if text.is_empty() {
                continue;
            }
            if let Some(p) = doc.cell_paragraphs(t, row, col).first().copied() {
                let alignment = if is_numeric(text) {
                    Alignment::Right
                } else {
                    Alignment::Left
                };
                doc.apply_paragraph_format(p, &ParagraphFormat::aligned(alignment));
                self.add_inline_runs(doc, p, text);
            }
        }
    }

    fn add_inline_runs<D: DocumentEditor + ?Sized>(&self, doc: &mut D, p: NodeId, text: &str) {
        for (run, style) in inline_runs(text) {
            let format = match style {
                InlineStyle::Normal => self.registry.body_run_format(),
                InlineStyle::Bold => self.registry.body_run_format().bold(true),
                InlineStyle::Italic => self.registry.body_run_format().italic(true),
            };
            doc.add_run(p, &run, &format);
        }
    }
}

/// Cell texts of a pipe-table line: split on `|`, empty fragments dropped
/// at either end, every fragment trimmed
pub fn split_cells(line: &str) -> Vec<String> {
    let mut fragments: Vec<&str> = line.split('|').collect();
    if fragments.first().is_some_and(|f| f.is_empty()) {
        fragments.remove(0);
    }
    if fragments.last().is_some_and(|f| f.is_empty()) {
        fragments.pop();
    }
    fragments.into_iter().map(|f| f.trim().to_string()).collect()
}

fn is_numeric(text: &str) -> bool {
    static NUMERIC_RE: OnceLock<Regex> = OnceLock::new();
    NUMERIC_RE
        .get_or_init(|| Regex::new(r"^[\d., ]+$").unwrap())
        .is_match(text)
}
