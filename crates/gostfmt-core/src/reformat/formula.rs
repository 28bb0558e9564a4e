//! Formula numbering

use std::sync::OnceLock;

use gostfmt_ast::{
    Alignment, DocumentEditor, NodeId, ParagraphFormat, RunFormat, TabAlignment, TabStop,
};
use regex::Regex;

use super::Reformatter;
use crate::styles::StyleName;

/// `formula,\t(N)` with any trailing `(M)` number removed first
pub fn numbered_formula_text(text: &str, number: usize) -> String {
    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    let number_re = NUMBER_RE.get_or_init(|| Regex::new(r"\s*\(\d+\)\s*$").unwrap());
    format!("{},\t({})", number_re.replace(text.trim(), ""), number)
}

impl<D: DocumentEditor + ?Sized> Reformatter<'_, D> {
    pub(super) fn format_formula(&mut self, par: NodeId) {
        self.doc.set_paragraph_style(par, StyleName::Formula.id());

        let text = numbered_formula_text(&self.doc.paragraph_text(par), self.formula_counter);
        self.doc.replace_text(par, &text);
        self.doc.format_runs(par, &RunFormat::new().italic(true));

        let text_width = self.registry.page().geometry.text_width();
        self.doc.apply_paragraph_format(
            par,
            &ParagraphFormat {
                alignment: Some(Alignment::Center),
                tab_stops: vec![TabStop {
                    position: text_width,
                    alignment: TabAlignment::Right,
                }],
                ..ParagraphFormat::default()
            },
        );
        tracing::debug!(formula = self.formula_counter, "numbered formula");
        self.formula_counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_formula_text() {
        assert_eq!(numbered_formula_text("E = mc^2", 1), "E = mc^2,\t(1)");
        assert_eq!(numbered_formula_text("  a + b = c  (7) ", 3), "a + b = c,\t(3)");
        assert_eq!(numbered_formula_text("f(x) = x", 2), "f(x) = x,\t(2)");
    }
}
