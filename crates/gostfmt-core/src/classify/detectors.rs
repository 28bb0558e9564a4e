//! The detector chain
//!
//! Each detector looks at one paragraph and either claims it with a
//! `(role, level)` pair or passes. The chain order is significant.

use std::sync::OnceLock;

use gostfmt_ast::{DocumentEditor, NodeId, NodeKind};
use regex::Regex;

use super::Role;

/// A single paragraph detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detector {
    Heading,
    TableCaption,
    ImageCaption,
    Image,
    Blank,
    SpecialBlock,
    List,
}

/// Detectors in evaluation order; the first match wins
pub const DETECTOR_CHAIN: [Detector; 7] = [
    Detector::Heading,
    Detector::TableCaption,
    Detector::ImageCaption,
    Detector::Image,
    Detector::Blank,
    Detector::SpecialBlock,
    Detector::List,
];

/// More than this many matching patterns marks a formula or code line
const SCORE_THRESHOLD: usize = 3;

impl Detector {
    pub fn detect<D: DocumentEditor + ?Sized>(
        self,
        doc: &D,
        par: NodeId,
        text: &str,
    ) -> Option<(Role, u8)> {
        match self {
            Detector::Heading => detect_heading(doc, par, text),
            Detector::TableCaption => detect_table_caption(doc, par, text),
            Detector::ImageCaption => detect_image_caption(doc, par, text),
            Detector::Image => doc.has_drawing(par).then_some((Role::Image, 1)),
            Detector::Blank => text.trim().is_empty().then_some((Role::Empty, 0)),
            Detector::SpecialBlock => detect_special_block(text),
            Detector::List => detect_list(doc, par, text),
        }
    }
}

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

fn detect_heading<D: DocumentEditor + ?Sized>(
    doc: &D,
    par: NodeId,
    text: &str,
) -> Option<(Role, u8)> {
    if let Some(style) = heading_style(doc, par) {
        let level = match style.chars().last().and_then(|c| c.to_digit(10)) {
            Some(digit) => digit as u8,
            None => match doc.outline_level(par) {
                Some(outline) => outline.saturating_add(1).min(3),
                None if style.contains("subtitle") || style.contains('2') => 2,
                None if style.contains("title") || style.contains('1') => 1,
                None => 3,
            },
        };
        return Some((Role::Heading, level.max(1)));
    }

    static FALLBACK: OnceLock<Vec<Regex>> = OnceLock::new();
    let fallback = FALLBACK.get_or_init(|| {
        compile_all(&[
            r"^(РЕФЕРАТ|ВВЕДЕНИЕ|ЗАКЛЮЧЕНИЕ|СПИСОК ЛИТЕРАТУРЫ|ПРИЛОЖЕНИЯ?)$",
            r"^ГЛАВА\s+\d+[.:]?\s+[А-Я][А-Яа-яё\s\d\-]{10,}$",
            r"^РАЗДЕЛ\s+\d+[.:]?\s+[А-Я][А-Яа-яё\s\d\-]{10,}$",
            r"^ЧАСТЬ\s+[IVXLCDM]+[.:]?\s+[А-Я][А-Яа-яё\s\d\-]{10,}$",
        ])
    });
    let upper = text.trim().to_uppercase();
    fallback
        .iter()
        .any(|re| re.is_match(&upper))
        .then_some((Role::Heading, 1))
}

/// Lowercased style id, or display name, that marks a heading
fn heading_style<D: DocumentEditor + ?Sized>(doc: &D, par: NodeId) -> Option<String> {
    const MARKERS: [&str; 3] = ["heading", "заголовок", "title"];
    let is_heading = |s: &str| MARKERS.iter().any(|m| s.contains(m));

    let raw = doc.paragraph_style(par)?;
    let id = raw.to_lowercase();
    if is_heading(&id) {
        return Some(id);
    }
    doc.style_name(&raw)
        .map(|name| name.to_lowercase())
        .filter(|name| is_heading(name))
}

fn sibling_is<D: DocumentEditor + ?Sized>(
    doc: &D,
    par: NodeId,
    predicate: impl Fn(NodeId) -> bool,
) -> bool {
    [doc.previous_sibling(par), doc.next_sibling(par)]
        .into_iter()
        .flatten()
        .any(predicate)
}

fn detect_table_caption<D: DocumentEditor + ?Sized>(
    doc: &D,
    par: NodeId,
    text: &str,
) -> Option<(Role, u8)> {
    static NUMBERED: OnceLock<Vec<Regex>> = OnceLock::new();
    static LOOSE: OnceLock<Regex> = OnceLock::new();
    let numbered = NUMBERED.get_or_init(|| {
        compile_all(&[
            r"^Таблица\s+\d+[.\-—].+",
            r"^Таблица\s+[A-ZА-Я]+\s*\.\d+[.\-—].+",
        ])
    });
    let loose = LOOSE.get_or_init(|| Regex::new(r"^Таблица\s.+").unwrap());

    let text = text.trim();
    if numbered.iter().any(|re| re.is_match(text)) {
        return Some((Role::TableCaption, 1));
    }
    let near_table = || sibling_is(doc, par, |n| doc.node_kind(n) == Some(NodeKind::Table));
    (loose.is_match(text) && near_table()).then_some((Role::TableCaption, 1))
}

fn detect_image_caption<D: DocumentEditor + ?Sized>(
    doc: &D,
    par: NodeId,
    text: &str,
) -> Option<(Role, u8)> {
    static NUMBERED: OnceLock<Vec<Regex>> = OnceLock::new();
    static LOOSE: OnceLock<Regex> = OnceLock::new();
    let numbered = NUMBERED.get_or_init(|| {
        compile_all(&[
            r"^Рисунок\s+\d+[.\-].+",
            r"^Рис.\s+[A-ZА-Я]+\s*\.\d+[.\-].+",
        ])
    });
    let loose = LOOSE.get_or_init(|| Regex::new(r"^Рисунок\s.+").unwrap());

    let text = text.trim();
    if numbered.iter().any(|re| re.is_match(text)) {
        return Some((Role::ImageCaption, 1));
    }
    let near_drawing = || {
        sibling_is(doc, par, |n| {
            doc.node_kind(n) == Some(NodeKind::Paragraph) && doc.has_drawing(n)
        })
    };
    (loose.is_match(text) && near_drawing()).then_some((Role::ImageCaption, 1))
}

fn detect_special_block(text: &str) -> Option<(Role, u8)> {
    static FORMULA: OnceLock<Vec<Regex>> = OnceLock::new();
    static CODE: OnceLock<Vec<Regex>> = OnceLock::new();

    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let formula = FORMULA.get_or_init(|| {
        compile_all(&[
            r"[=≠≈<>≤≥∝→←↑↓↔]",
            r"(?i)\b(sin|cos|tan|log|ln|exp|sqrt|sum|prod|int|lim)\b",
            r"\d+/\d+",
            r"[a-zA-Z]_\{.*\}",
            r"[a-zA-Z]\^\{.*\}",
            r"(?i)\b(alpha|beta|gamma|delta|epsilon|zeta|theta|lambda|mu|nu|xi|pi|rho|sigma|tau|phi|chi|psi|omega)\b",
        ])
    });
    if score(formula, text) > SCORE_THRESHOLD {
        return Some((Role::Formula, 1));
    }

    let code = CODE.get_or_init(|| {
        compile_all(&[
            r"(?i)^\s*(if|else|for|while|def|class|function|return|import|from)\b",
            r"\{.*\}",
            r"\(.*\).*;",
            r"//|/\*.*\*/",
            r"->|=>",
        ])
    });
    (score(code, text) > SCORE_THRESHOLD).then_some((Role::Code, 1))
}

fn score(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().filter(|re| re.is_match(text)).count()
}

fn detect_list<D: DocumentEditor + ?Sized>(
    doc: &D,
    par: NodeId,
    text: &str,
) -> Option<(Role, u8)> {
    static BULLET: OnceLock<Regex> = OnceLock::new();
    let bullet = BULLET.get_or_init(|| Regex::new(r"^[-*+•—–−]\s+.+").unwrap());

    let text = text.trim();
    if bullet.is_match(text) {
        return Some((Role::ListBullet, 1));
    }
    if has_number_marker(text) {
        return Some((Role::ListNumber, 1));
    }

    let numbering = doc.numbering(par)?;
    let level = numbering
        .ilvl
        .map_or(1, |ilvl| ilvl.saturating_add(1).min(u8::MAX as u32) as u8);
    let role = match numbering.num_id {
        Some(id) if id % 2 == 0 => Role::ListNumber,
        _ => Role::ListBullet,
    };
    Some((role, level))
}

/// `1) text`, `а. text`, `b) text`
pub(crate) fn has_number_marker(text: &str) -> bool {
    static NUMBERED: OnceLock<Regex> = OnceLock::new();
    NUMBERED
        .get_or_init(|| Regex::new(r"(?i)^[\dа-яa-z]+[).]\s+.+").unwrap())
        .is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use gostfmt_ooxml::test_utils::docx_with_body;
    use gostfmt_ooxml::DocxPackage;

    fn para(style: Option<&str>, text: &str) -> String {
        let ppr = style
            .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, s))
            .unwrap_or_default();
        format!(r#"<w:p>{}<w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, ppr, text)
    }

    fn roles(body: &str) -> Vec<(Role, u8)> {
        let doc = DocxPackage::from_bytes(&docx_with_body(body)).unwrap();
        Classifier::new(&doc)
            .classify()
            .into_iter()
            .map(|c| (c.role, c.level))
            .collect()
    }

    #[test]
    fn test_chain_order() {
        assert_eq!(
            DETECTOR_CHAIN,
            [
                Detector::Heading,
                Detector::TableCaption,
                Detector::ImageCaption,
                Detector::Image,
                Detector::Blank,
                Detector::SpecialBlock,
                Detector::List,
            ]
        );
    }

    #[test]
    fn test_heading_from_style() {
        let body = [
            para(Some("Heading2"), "Обзор"),
            para(Some("1"), "Глава"),
            para(Some("Title"), "Отчёт"),
            para(Some("MyHeading"), "Без уровня"),
        ]
        .concat();
        assert_eq!(
            roles(&body),
            vec![
                (Role::Heading, 2),
                (Role::Heading, 1),
                (Role::Heading, 1),
                (Role::Heading, 3)
            ]
        );
    }

    #[test]
    fn test_heading_from_text() {
        let body = [
            para(None, " введение "),
            para(None, "Глава 1. Обзор предметной области"),
            para(None, "Глава 1. Обзор"),
            para(None, "Часть IV Методика эксперимента"),
        ]
        .concat();
        assert_eq!(
            roles(&body),
            vec![
                (Role::Heading, 1),
                (Role::Heading, 1),
                (Role::Normal, 1),
                (Role::Heading, 1)
            ]
        );
    }

    #[test]
    fn test_captions() {
        let table = r#"<w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>"#;
        let picture = r#"<w:p><w:r><w:drawing><wp:inline/></w:drawing></w:r></w:p>"#;
        let body = [
            para(None, "Таблица без соседей"),
            para(None, "Таблица 1. Результаты"),
            para(None, "Таблица результатов"),
            table.to_string(),
            picture.to_string(),
            para(None, "Рисунок схемы"),
            para(None, "Рисунок 2. Схема"),
        ]
        .concat();
        assert_eq!(
            roles(&body),
            vec![
                (Role::Normal, 1),
                (Role::TableCaption, 1),
                (Role::TableCaption, 1),
                (Role::Image, 1),
                (Role::ImageCaption, 1),
                (Role::ImageCaption, 1)
            ]
        );
    }

    #[test]
    fn test_blank() {
        let body = [para(None, "   "), "<w:p/>".to_string()].concat();
        assert_eq!(roles(&body), vec![(Role::Empty, 0), (Role::Empty, 0)]);
    }

    #[test]
    fn test_formula_and_code() {
        assert_eq!(
            detect_special_block("y = sin(x) + 1/2 + alpha"),
            Some((Role::Formula, 1))
        );
        assert_eq!(detect_special_block("y = sin(x)"), None);
        assert_eq!(
            detect_special_block("if (a) { run(); } // go => done"),
            Some((Role::Code, 1))
        );
        assert_eq!(detect_special_block("return x;"), None);
    }

    #[test]
    fn test_lists_by_text() {
        let body = [
            para(None, "– пункт"),
            para(None, "а) первый"),
            para(None, "2. второй"),
            para(None, "-слитно"),
        ]
        .concat();
        assert_eq!(
            roles(&body),
            vec![
                (Role::ListBullet, 1),
                (Role::ListNumber, 1),
                (Role::ListNumber, 1),
                (Role::Normal, 1)
            ]
        );
    }

    #[test]
    fn test_lists_by_numbering() {
        let numbered = |num_id: Option<u32>, ilvl: u32| {
            let id = num_id
                .map(|n| format!(r#"<w:numId w:val="{}"/>"#, n))
                .unwrap_or_default();
            format!(
                r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="{}"/>{}</w:numPr></w:pPr><w:r><w:t>item</w:t></w:r></w:p>"#,
                ilvl, id
            )
        };
        let body = [numbered(Some(1), 0), numbered(Some(2), 1), numbered(None, 2)].concat();
        assert_eq!(
            roles(&body),
            vec![
                (Role::ListBullet, 1),
                (Role::ListNumber, 2),
                (Role::ListBullet, 3)
            ]
        );
    }

    #[test]
    fn test_out_of_range_levels_are_clamped() {
        let outline = r#"<w:p><w:pPr><w:pStyle w:val="Title"/><w:outlineLvl w:val="255"/></w:pPr><w:r><w:t>Отчёт</w:t></w:r></w:p>"#;
        let numbered = r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="4294967295"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>item</w:t></w:r></w:p>"#;
        let body = [outline, numbered].concat();
        assert_eq!(
            roles(&body),
            vec![(Role::Heading, 3), (Role::ListBullet, u8::MAX)]
        );
    }

    #[test]
    fn test_heading_style_wins_over_bullet_text() {
        let body = para(Some("Heading2"), "- item");
        assert_eq!(roles(&body), vec![(Role::Heading, 2)]);
    }
}
