//! Conversion entry points
//!
//! Markup input is parsed, materialized into a blank document, then
//! classified and reformatted like any other document. Nothing is written
//! until the very end, and the write itself is atomic.

use std::fmt;
use std::path::Path;

use gostfmt_ast::{DocumentEditor, Persist};

use crate::classify::{Classifier, Role};
use crate::error::{ConvertError, Result};
use crate::markup::MarkupParser;
use crate::materialize::Materializer;
use crate::reformat::{ReformatOptions, Reformatter};
use crate::sections::{classify_with_sections, SectionKind};
use crate::styles::StyleRegistry;

/// Characters of paragraph text shown in an outline line
const PREVIEW_CHARS: usize = 60;

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// `.txt` lightweight markup
    Markup,
    /// `.docx` document
    Document,
}

impl InputKind {
    /// Input kind from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("txt") => Ok(InputKind::Markup),
            Some("docx") => Ok(InputKind::Document),
            Some(other) => Err(ConvertError::UnsupportedInput(format!(
                "'.{}' files are not supported (expected .txt or .docx)",
                other
            ))),
            None => Err(ConvertError::UnsupportedInput(format!(
                "{} has no extension (expected .txt or .docx)",
                path.display()
            ))),
        }
    }
}

/// Materialize `text` into `doc` (normally a blank document), then
/// reformat it and save to `output`
pub fn convert_markup<D: DocumentEditor + Persist>(
    text: &str,
    doc: &mut D,
    registry: &StyleRegistry,
    options: ReformatOptions,
    output: &Path,
) -> Result<()> {
    let blocks = MarkupParser::new(text).parse();
    Materializer::new(registry).materialize(&blocks, &mut *doc);
    convert_document(doc, registry, options, output)
}

/// Classify and reformat an existing document, then save it to `output`
pub fn convert_document<D: DocumentEditor + Persist>(
    doc: &mut D,
    registry: &StyleRegistry,
    options: ReformatOptions,
    output: &Path,
) -> Result<()> {
    let classified = Classifier::new(&*doc).classify();
    Reformatter::new(doc, classified, registry)
        .with_options(options)
        .start(output)?;
    tracing::info!(output = %output.display(), "conversion finished");
    Ok(())
}

/// One line of a classification report
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub index: usize,
    pub role: Role,
    pub level: u8,
    pub section: SectionKind,
    /// Start of the paragraph text
    pub preview: String,
}

impl fmt::Display for OutlineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>4}  {:<12} {}  {:<18} {}",
            self.index, self.role, self.level, self.section, self.preview
        )
    }
}

/// Classification report for `doc`; the document is not modified
pub fn outline<D: DocumentEditor + ?Sized>(doc: &D) -> Vec<OutlineEntry> {
    classify_with_sections(doc)
        .into_iter()
        .map(|(paragraph, section)| OutlineEntry {
            index: paragraph.index,
            role: paragraph.role,
            level: paragraph.level,
            section,
            preview: preview(&paragraph.text),
        })
        .collect()
}

fn preview(text: &str) -> String {
    let text = text.trim();
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().nth(PREVIEW_CHARS).is_some() {
        preview.push('…');
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_kind() {
        assert_eq!(InputKind::from_path(Path::new("a.txt")).unwrap(), InputKind::Markup);
        assert_eq!(InputKind::from_path(Path::new("dir/b.DOCX")).unwrap(), InputKind::Document);
        assert!(matches!(
            InputKind::from_path(Path::new("c.pdf")),
            Err(ConvertError::UnsupportedInput(_))
        ));
        assert!(matches!(
            InputKind::from_path(Path::new("README")),
            Err(ConvertError::UnsupportedInput(_))
        ));
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("  short  "), "short");
        let long = "я".repeat(80);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 1);
        assert!(p.ends_with('…'));
    }
}
