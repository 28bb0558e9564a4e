//! Figures and their captions

use std::sync::OnceLock;

use gostfmt_ast::{Alignment, DocumentEditor, Length, NodeId, NodeKind, ParagraphFormat};
use regex::Regex;

use super::{Reformatter, CAPTION_DASH, EMPTY_TITLE};
use crate::styles::StyleName;

fn is_figure_caption(text: &str) -> bool {
    static CAPTION_RE: OnceLock<Regex> = OnceLock::new();
    CAPTION_RE
        .get_or_init(|| Regex::new(r"(?i)^(рисунок|рис\.)").unwrap())
        .is_match(text.trim())
}

/// Title of an existing figure caption, without the label and its old number
pub fn figure_title(text: &str) -> Option<String> {
    static TITLE_RE: OnceLock<Regex> = OnceLock::new();
    let title_re = TITLE_RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:Рисунок|Рис\.)\s*(?:(?:[A-ZА-Я]+\s*\.)?\d+(?:\.\d+)*)?\s*[.:\-−—–]?\s*(.*)$",
        )
        .unwrap()
    });
    title_re
        .captures(text.trim())
        .map(|caps| caps[1].trim().to_string())
        .filter(|title| !title.is_empty())
}

impl<D: DocumentEditor + ?Sized> Reformatter<'_, D> {
    fn existing_figure_caption(&self, sibling: Option<NodeId>) -> Option<NodeId> {
        sibling.filter(|n| {
            self.doc.node_kind(*n) == Some(NodeKind::Paragraph)
                && !self.generated.contains(n)
                && is_figure_caption(&self.doc.paragraph_text(*n))
        })
    }

    /// Center the picture and give it a numbered caption directly below
    pub(super) fn format_image(&mut self, par: NodeId) {
        let old = self
            .existing_figure_caption(self.doc.previous_sibling(par))
            .or_else(|| self.existing_figure_caption(self.doc.next_sibling(par)));

        let title = old
            .and_then(|p| figure_title(&self.doc.paragraph_text(p)))
            .unwrap_or_else(|| EMPTY_TITLE.to_string());
        if let Some(old) = old {
            if !self.doc.remove_node(old) {
                tracing::warn!(
                    figure = self.figure_counter,
                    "could not remove the old figure caption"
                );
            }
        }

        let Some(position) = self.doc.position_of(par) else {
            return;
        };
        let text = format!("Рисунок {} {} {}", self.figure_counter, CAPTION_DASH, title);
        let caption = self.insert_caption(position + 1, &text);
        self.doc.set_paragraph_style(caption, StyleName::Caption.id());
        self.doc
            .apply_paragraph_format(caption, &ParagraphFormat::aligned(Alignment::Center));

        self.doc.apply_paragraph_format(
            par,
            &ParagraphFormat {
                alignment: Some(Alignment::Center),
                space_before: Some(Length::from_pt(12.0)),
                space_after: Some(Length::from_pt(6.0)),
                ..ParagraphFormat::default()
            },
        );
        tracing::debug!(figure = self.figure_counter, caption = %text, "captioned figure");
        self.figure_counter += 1;
    }
}
