//! Table captions, borders and cell layout

use std::sync::OnceLock;

use gostfmt_ast::{
    Alignment, CellMargins, DocumentEditor, HeightRule, NodeId, NodeKind, ParagraphFormat,
    RunFormat, VerticalAlignment,
};
use regex::Regex;

use super::{Reformatter, CAPTION_DASH, EMPTY_TITLE};
use crate::styles::StyleName;

/// Title of an existing table caption, without the `Таблица` label and
/// its old number
pub fn table_title(text: &str) -> Option<String> {
    static TITLE_RE: OnceLock<Regex> = OnceLock::new();
    let title_re = TITLE_RE.get_or_init(|| {
        Regex::new(r"(?i)^Таблица\s*(?:(?:[A-ZА-Я]+\s*\.)?\d+(?:\.\d+)*)?\s*[.:\-−—–]?\s*(.*)$").unwrap()
    });
    title_re
        .captures(text.trim())
        .map(|caps| caps[1].trim().to_string())
        .filter(|title| !title.is_empty())
}

fn is_table_caption(text: &str) -> bool {
    text.to_lowercase().contains("таблица")
}

fn starts_with_digit(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_ascii_digit())
}

impl<D: DocumentEditor + ?Sized> Reformatter<'_, D> {
    /// Caption, center and lay out every table in document order
    pub(super) fn format_tables(&mut self) {
        let tables = self.doc.tables();
        for (i, table) in tables.iter().enumerate() {
            self.caption_table(*table, i + 1);
            self.layout_table(*table);
        }
        tracing::debug!(tables = tables.len(), "formatted tables");
    }

    /// An existing caption paragraph directly above or below the table
    fn existing_caption(&self, sibling: Option<NodeId>) -> Option<NodeId> {
        sibling.filter(|n| {
            self.doc.node_kind(*n) == Some(NodeKind::Paragraph)
                && !self.generated.contains(n)
                && is_table_caption(&self.doc.paragraph_text(*n))
        })
    }

    fn caption_table(&mut self, table: NodeId, number: usize) {
        let old = self
            .existing_caption(self.doc.previous_sibling(table))
            .or_else(|| self.existing_caption(self.doc.next_sibling(table)));

        let title = old
            .and_then(|p| table_title(&self.doc.paragraph_text(p)))
            .unwrap_or_else(|| EMPTY_TITLE.to_string());
        if let Some(old) = old {
            if !self.doc.remove_node(old) {
                tracing::warn!(number, "could not remove the old table caption");
            }
        }

        let Some(position) = self.doc.position_of(table) else {
            return;
        };
        let text = format!("Таблица {} {} {}", number, CAPTION_DASH, title);
        let caption = self.insert_caption(position, &text);
        self.doc.set_paragraph_style(caption, StyleName::Caption.id());
        self.doc
            .apply_paragraph_format(caption, &ParagraphFormat::aligned(Alignment::Left));
        tracing::debug!(number, caption = %text, "captioned table");
    }

    fn layout_table(&mut self, table: NodeId) {
        let settings = self.registry.table();
        self.doc.set_table_alignment(table, Alignment::Center);
        self.doc.set_table_borders(table, &settings.borders);

        let margins = CellMargins::horizontal(settings.cell_margin);
        for row in 0..self.doc.table_row_count(table) {
            self.doc
                .set_row_height(table, row, settings.row_height, HeightRule::AtLeast);
            for col in 0..self.doc.table_cell_count(table, row) {
                self.doc
                    .set_cell_vertical_alignment(table, row, col, VerticalAlignment::Center);
                self.doc.set_cell_margins(table, row, col, &margins);
                for p in self.doc.cell_paragraphs(table, row, col) {
                    self.doc.set_paragraph_style(p, StyleName::TableText.id());
                    if row == 0 {
                        let centered = ParagraphFormat::aligned(Alignment::Center);
                        self.doc.apply_paragraph_format(p, &centered);
                        self.doc.format_runs(p, &RunFormat::new().bold(true));
                    } else {
                        let alignment = if starts_with_digit(&self.doc.paragraph_text(p)) {
                            Alignment::Right
                        } else {
                            Alignment::Left
                        };
                        self.doc
                            .apply_paragraph_format(p, &ParagraphFormat::aligned(alignment));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_title() {
        assert_eq!(table_title("Таблица 1 - Результаты").as_deref(), Some("Результаты"));
        assert_eq!(table_title("Таблица 2.3. Итоги опроса").as_deref(), Some("Итоги опроса"));
        assert_eq!(table_title("Таблица А.1 – Параметры").as_deref(), Some("Параметры"));
        assert_eq!(table_title("таблица: Сводка").as_deref(), Some("Сводка"));
        assert_eq!(table_title("Таблица результатов").as_deref(), Some("результатов"));
        assert_eq!(table_title("Таблица Доходы 2020").as_deref(), Some("Доходы 2020"));
        assert_eq!(table_title("Таблица 4"), None);
        assert_eq!(table_title("См. таблицу"), None);
    }

    #[test]
    fn test_caption_detection() {
        assert!(is_table_caption("ТАБЛИЦА 1"));
        assert!(is_table_caption("Данные (таблица ниже)"));
        assert!(!is_table_caption("Рисунок 1"));
    }

    #[test]
    fn test_starts_with_digit() {
        assert!(starts_with_digit("12 шт"));
        assert!(!starts_with_digit("шт 12"));
        assert!(!starts_with_digit(""));
    }
}
