//! Headings, lists, body text, code and blank paragraphs

use std::sync::OnceLock;

use gostfmt_ast::{Alignment, DocumentEditor, Length, NodeId, ParagraphFormat};
use regex::Regex;

use super::Reformatter;
use crate::classify::has_number_marker;
use crate::classify::Role;
use crate::styles::StyleName;

/// Marker written before every bulleted item (U+2212 and a space)
pub const BULLET_MARKER: &str = "− ";

/// First character upper case, the rest lower case
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Heading text after normalisation: `1.2. обзор` becomes `1.2 Обзор`,
/// and level 2-3 headings are capitalized
pub fn heading_text(text: &str, level: u8) -> String {
    static ORDINAL_RE: OnceLock<Regex> = OnceLock::new();
    let ordinal_re = ORDINAL_RE.get_or_init(|| Regex::new(r"^([\d.]+\.)\s(.+)").unwrap());

    match ordinal_re.captures(text) {
        Some(caps) => {
            let ordinal = &caps[1];
            format!("{} {}", &ordinal[..ordinal.len() - 1], capitalize(&caps[2]))
        }
        None if level >= 2 => capitalize(text),
        None => text.to_string(),
    }
}

/// Bullet text with any existing marker replaced by [`BULLET_MARKER`].
/// `None` when the text needs no change.
pub fn bullet_text(text: &str) -> Option<String> {
    static MARKER_RE: OnceLock<Regex> = OnceLock::new();
    let marker_re = MARKER_RE.get_or_init(|| Regex::new(r"^[-*+•—–−]\s?").unwrap());

    let text = text.trim();
    if text.is_empty() || text.starts_with(BULLET_MARKER) {
        return None;
    }
    Some(format!("{}{}", BULLET_MARKER, marker_re.replace(text, "")))
}

/// Blank paragraphs kept as deliberate spacing
fn keeps_spacing(previous: Role, next: Role) -> bool {
    matches!(
        (previous, next),
        (Role::Heading, Role::Normal) | (Role::Heading, Role::Heading)
    ) || (previous.is_caption() && next == Role::Normal)
}

impl<D: DocumentEditor + ?Sized> Reformatter<'_, D> {
    pub(super) fn format_heading(&mut self, par: NodeId, level: u8) {
        let style = StyleName::heading(level);
        self.doc.set_paragraph_style(par, style.id());
        if style == StyleName::Heading1 {
            self.doc
                .apply_paragraph_format(par, &ParagraphFormat::aligned(Alignment::Center));
        }

        let text = self.doc.paragraph_text(par);
        let normalized = heading_text(&text, level.max(1));
        if normalized != text {
            self.doc.replace_text(par, &normalized);
        }
    }

    pub(super) fn format_bullet(&mut self, par: NodeId) {
        self.doc.clear_numbering(par);
        self.doc.set_paragraph_style(par, StyleName::List.id());
        self.doc.apply_paragraph_format(
            par,
            &ParagraphFormat {
                first_line_indent: Some(Length::ZERO),
                left_indent: Some(Length::from_cm(1.25)),
                ..ParagraphFormat::default()
            },
        );
        if let Some(text) = bullet_text(&self.doc.paragraph_text(par)) {
            self.doc.replace_text(par, &text);
        }
    }

    /// Numbered items without a `1)`/`а.` style marker become bullets
    pub(super) fn format_numbered(&mut self, par: NodeId) {
        self.doc.set_paragraph_style(par, StyleName::List.id());
        if !has_number_marker(self.doc.paragraph_text(par).trim()) {
            self.format_bullet(par);
        }
    }

    pub(super) fn format_normal(&mut self, par: NodeId) {
        self.doc.set_paragraph_style(par, StyleName::Normal.id());
        self.doc
            .apply_paragraph_format(par, &ParagraphFormat::aligned(Alignment::Justify));
    }

    pub(super) fn format_code(&mut self, par: NodeId) {
        self.doc.set_paragraph_style(par, StyleName::Code.id());
    }

    /// Blank paragraphs: pictures get captioned, line breaks stay, and the
    /// rest are removed unless they separate a heading or caption from text
    pub(super) fn format_empty(&mut self, par: NodeId, index: usize) {
        if self.doc.has_picture(par) {
            self.format_image(par);
            return;
        }
        if self.doc.has_line_break(par) {
            return;
        }
        if self.keep_empty(index) {
            tracing::debug!(index, "keeping blank paragraph");
            return;
        }
        if !self.doc.remove_node(par) {
            tracing::debug!(index, "blank paragraph carries section properties; kept");
        }
    }

    fn keep_empty(&self, index: usize) -> bool {
        let last = self.classified.len().saturating_sub(1);
        if index == 0 || index >= last {
            return false;
        }
        keeps_spacing(
            self.classified[index - 1].role,
            self.classified[index + 1].role,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("оБЗОР методов"), "Обзор методов");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_heading_text() {
        assert_eq!(heading_text("1.2. обзор ЛИТЕРАТУРЫ", 2), "1.2 Обзор литературы");
        assert_eq!(heading_text("1. ВВЕДЕНИЕ", 1), "1 Введение");
        assert_eq!(heading_text("ВВЕДЕНИЕ", 1), "ВВЕДЕНИЕ");
        assert_eq!(heading_text("МЕТОДЫ анализа", 3), "Методы анализа");
        assert_eq!(heading_text("Версия 2.0. Итог", 2), "Версия 2.0. итог");
    }

    #[test]
    fn test_bullet_text() {
        assert_eq!(bullet_text("* пункт").as_deref(), Some("− пункт"));
        assert_eq!(bullet_text("•пункт").as_deref(), Some("− пункт"));
        assert_eq!(bullet_text("— пункт").as_deref(), Some("− пункт"));
        assert_eq!(bullet_text("пункт").as_deref(), Some("− пункт"));
        assert_eq!(bullet_text("  − готово"), None);
        assert_eq!(bullet_text("   "), None);
    }

    #[test]
    fn test_keeps_spacing() {
        assert!(keeps_spacing(Role::Heading, Role::Normal));
        assert!(keeps_spacing(Role::Heading, Role::Heading));
        assert!(keeps_spacing(Role::TableCaption, Role::Normal));
        assert!(keeps_spacing(Role::ImageCaption, Role::Normal));
        assert!(!keeps_spacing(Role::Normal, Role::Normal));
        assert!(!keeps_spacing(Role::Heading, Role::Empty));
    }
}
