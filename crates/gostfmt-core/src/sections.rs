//! Report section detection
//!
//! Academic reports follow a fixed outline (title page, abstract, contents,
//! introduction, chapters, conclusion, bibliography, appendices). Headings
//! name the section they open; every other paragraph belongs to the
//! section of the nearest heading above it.

use std::fmt;
use std::sync::OnceLock;

use gostfmt_ast::DocumentEditor;
use regex::Regex;

use crate::classify::{ClassifiedParagraph, Classifier, Role};

/// Part of an academic report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SectionKind {
    TitlePage,
    Abstract,
    TableOfContents,
    Introduction,
    #[default]
    Content,
    Conclusion,
    Bibliography,
    Appendices,
}

impl SectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::TitlePage => "title_page",
            SectionKind::Abstract => "abstract",
            SectionKind::TableOfContents => "table_of_contents",
            SectionKind::Introduction => "introduction",
            SectionKind::Content => "content",
            SectionKind::Conclusion => "conclusion",
            SectionKind::Bibliography => "bibliography",
            SectionKind::Appendices => "appendices",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Keywords that open a section, checked in this order
const SECTION_KEYWORDS: [(SectionKind, &[&str]); 7] = [
    (
        SectionKind::TitlePage,
        &[
            "МИНИСТЕРСТВО",
            "УНИВЕРСИТЕТ",
            "КАФЕДРА",
            "КУРСОВАЯ",
            "ДИПЛОМ",
            "ВЫПУСКНАЯ",
            "ТИТУЛЬНЫЙ",
        ],
    ),
    (SectionKind::Abstract, &["РЕФЕРАТ", "АННОТАЦИЯ"]),
    (SectionKind::TableOfContents, &["СОДЕРЖАНИЕ", "ОГЛАВЛЕНИЕ"]),
    (SectionKind::Introduction, &["ВВЕДЕНИЕ"]),
    (SectionKind::Conclusion, &["ЗАКЛЮЧЕНИЕ", "ВЫВОД"]),
    (
        SectionKind::Bibliography,
        &["СПИСОК ЛИТЕРАТУРЫ", "БИБЛИОГРАФИЯ", "ЛИТЕРАТУРА"],
    ),
    (SectionKind::Appendices, &["ПРИЛОЖЕНИЕ", "ПРИЛОЖЕНИЯ"]),
];

/// Section a heading opens, if it names one
pub fn section_of_heading(text: &str) -> Option<SectionKind> {
    static CHAPTER_RE: OnceLock<Regex> = OnceLock::new();
    let chapter_re =
        CHAPTER_RE.get_or_init(|| Regex::new(r"^(ГЛАВА|РАЗДЕЛ)\s+[IVXLCDM\d]").unwrap());

    let upper = text.trim().to_uppercase();
    SECTION_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| upper.contains(k)))
        .map(|(kind, _)| *kind)
        .or_else(|| chapter_re.is_match(&upper).then_some(SectionKind::Content))
}

/// Follows the current section through a classified paragraph sequence
#[derive(Debug, Clone, Default)]
pub struct SectionTracker {
    current: SectionKind,
}

impl SectionTracker {
    /// Starts in [`SectionKind::Content`]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> SectionKind {
        self.current
    }

    /// Section of `paragraph`; headings that name a section switch to it
    pub fn observe(&mut self, paragraph: &ClassifiedParagraph) -> SectionKind {
        if paragraph.role == Role::Heading {
            if let Some(kind) = section_of_heading(&paragraph.text) {
                if kind != self.current {
                    tracing::debug!(index = paragraph.index, section = %kind, "entering section");
                }
                self.current = kind;
            }
        }
        self.current
    }
}

/// Classify `doc` and attach the section of every paragraph
pub fn classify_with_sections<D: DocumentEditor + ?Sized>(
    doc: &D,
) -> Vec<(ClassifiedParagraph, SectionKind)> {
    let mut tracker = SectionTracker::new();
    Classifier::new(doc)
        .classify()
        .into_iter()
        .map(|paragraph| {
            let section = tracker.observe(&paragraph);
            (paragraph, section)
        })
        .collect()
}
