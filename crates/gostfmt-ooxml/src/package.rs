//! An editable DOCX package
//!
//! [`DocxPackage`] ties together the parts gostfmt edits (document body,
//! styles, relationships, footers, content types) and implements
//! [`DocumentEditor`] on top of them. All other parts are written back
//! byte for byte.

use std::io::{Cursor, Write};
use std::path::Path;

use gostfmt_ast::{
    Alignment, CellMargins, DocumentEditor, FooterFormat, HeightRule, Length, NodeId, NodeKind,
    Numbering, PageGeometry, ParagraphFormat, Persist, RunFormat, RunInfo, StyleDefinition,
    TableBorders, VerticalAlignment,
};

use crate::archive::{OoxmlArchive, CONTENT_TYPES_PART, DOCUMENT_PART, STYLES_PART};
use crate::document::Document;
use crate::error::{OoxmlError, Result};
use crate::paragraph;
use crate::relationships::Relationships;
use crate::section::{self, FOOTER_CONTENT_TYPE, RELATIONSHIPS_DOC_NS};
use crate::styles::StyleSheet;
use crate::template;
use crate::xml::{self, XmlElement};

const PACKAGE_RELS_PART: &str = "_rels/.rels";
const STYLES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";

/// A DOCX document opened for editing
#[derive(Debug, Clone)]
pub struct DocxPackage {
    archive: OoxmlArchive,
    /// Path of the main document part
    document_part: String,
    document: Document,
    styles_part: String,
    styles: StyleSheet,
    relationships: Relationships,
    content_types: XmlElement,
}

impl DocxPackage {
    /// Open a DOCX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_archive(OoxmlArchive::open(path)?)
    }

    /// Load a DOCX package from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_archive(OoxmlArchive::from_reader(Cursor::new(bytes))?)
    }

    /// An empty A4 document with the built-in heading and list styles
    pub fn blank() -> Result<Self> {
        Self::from_archive(template::blank_archive())
    }

    pub fn from_archive(archive: OoxmlArchive) -> Result<Self> {
        let document_part = match archive.get(PACKAGE_RELS_PART) {
            Some(rels) => Relationships::parse(rels)?
                .first_of_type(Relationships::TYPE_OFFICE_DOCUMENT)
                .map(|r| r.target.trim_start_matches('/').to_string())
                .unwrap_or_else(|| DOCUMENT_PART.to_string()),
            None => DOCUMENT_PART.to_string(),
        };
        let document = Document::parse(archive.require(&document_part)?)?;

        let relationships = match archive.get(&rels_part_for(&document_part)) {
            Some(rels) => Relationships::parse(rels)?,
            None => Relationships::new(),
        };
        let content_types = xml::parse(archive.require(CONTENT_TYPES_PART)?)?;

        let mut package = Self {
            styles_part: STYLES_PART.to_string(),
            styles: StyleSheet::default(),
            archive,
            document_part,
            document,
            relationships,
            content_types,
        };

        let styles_target = package
            .relationships
            .first_of_type(Relationships::TYPE_STYLES)
            .map(|r| package.resolve(&r.target));
        match styles_target {
            Some(part) => {
                match package.archive.get(&part) {
                    Some(bytes) => package.styles = StyleSheet::parse(bytes)?,
                    None => package.add_override(&part, STYLES_CONTENT_TYPE),
                }
                package.styles_part = part;
            }
            None => {
                tracing::debug!("document has no styles part, creating one");
                let target = package.relative_target(STYLES_PART);
                package.relationships.add(target, Relationships::TYPE_STYLES);
                package.add_override(STYLES_PART, STYLES_CONTENT_TYPE);
            }
        }

        tracing::debug!(
            document = %package.document_part,
            styles = %package.styles_part,
            "opened package"
        );
        Ok(package)
    }

    /// The parsed body
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Directory of the main document part, e.g. `word`
    fn base_dir(&self) -> &str {
        self.document_part
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or("")
    }

    /// Package path of a relationship target of the main document
    fn resolve(&self, target: &str) -> String {
        if let Some(absolute) = target.strip_prefix('/') {
            return absolute.to_string();
        }
        let mut parts: Vec<&str> = self.base_dir().split('/').filter(|s| !s.is_empty()).collect();
        for segment in target.split('/') {
            match segment {
                ".." => {
                    parts.pop();
                }
                "." | "" => {}
                other => parts.push(other),
            }
        }
        parts.join("/")
    }

    /// Relationship target for a package path inside the document directory
    fn relative_target(&self, part: &str) -> String {
        let base = self.base_dir();
        if base.is_empty() {
            return part.to_string();
        }
        part.strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(str::to_string)
            .unwrap_or_else(|| format!("/{}", part))
    }

    fn add_override(&mut self, part: &str, content_type: &str) {
        let part_name = format!("/{}", part);
        let exists = self
            .content_types
            .children_named("Override")
            .any(|o| o.attr("PartName") == Some(part_name.as_str()));
        if !exists {
            self.content_types.push(
                XmlElement::new("Override")
                    .with_attr("PartName", part_name)
                    .with_attr("ContentType", content_type),
            );
        }
    }

    fn with_paragraph(&mut self, p: NodeId, f: impl FnOnce(&mut XmlElement)) {
        if let Some(element) = self.document.paragraph_mut(p) {
            f(element);
        }
    }

    fn read_paragraph<T: Default>(&self, p: NodeId, f: impl FnOnce(&XmlElement) -> T) -> T {
        self.document.paragraph(p).map(f).unwrap_or_default()
    }

    /// Write a footer holding the page number for `section`
    fn page_number_footer(&mut self, section: usize, format: &FooterFormat) -> Result<()> {
        let existing = self
            .document
            .section_properties(section)
            .ok_or_else(|| OoxmlError::InvalidStructure(format!("no section {}", section)))?;
        let existing_part = section::default_footer_id(existing)
            .and_then(|id| self.relationships.by_id(id))
            .filter(|r| r.rel_type == Relationships::TYPE_FOOTER)
            .map(|r| self.resolve(&r.target))
            .filter(|part| self.archive.contains(part));

        if let Some(part) = existing_part {
            let mut footer = xml::parse(self.archive.require(&part)?)?;
            footer.push(section::page_number_paragraph(format));
            self.archive.set_string(part.as_str(), footer.to_document_string());
            tracing::debug!(%part, section, "page number appended to existing footer");
            return Ok(());
        }

        let index = self.archive.next_footer_index();
        let part = match self.base_dir() {
            "" => format!("footer{}.xml", index),
            base => format!("{}/footer{}.xml", base, index),
        };
        self.archive
            .set_string(part.as_str(), section::footer_part(format).to_document_string());
        let target = self.relative_target(&part);
        let rel_id = self.relationships.add(target, Relationships::TYPE_FOOTER);
        self.add_override(&part, FOOTER_CONTENT_TYPE);
        self.document.ensure_namespace("xmlns:r", RELATIONSHIPS_DOC_NS);
        if let Some(sect_pr) = self.document.section_properties_mut(section) {
            section::set_default_footer(sect_pr, &rel_id);
        }
        tracing::debug!(%part, %rel_id, section, "page number footer created");
        Ok(())
    }

    /// Serialize the package with all edits applied
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut archive = self.archive.clone();
        archive.set_string(self.document_part.as_str(), self.document.to_xml());
        archive.set_string(self.styles_part.as_str(), self.styles.to_xml());
        archive.set_string(rels_part_for(&self.document_part), self.relationships.to_xml());
        archive.set_string(CONTENT_TYPES_PART, self.content_types.to_document_string());
        archive.to_bytes()
    }
}

/// `word/document.xml` -> `word/_rels/document.xml.rels`
fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

impl Persist for DocxPackage {
    type Error = OoxmlError;

    /// Write to a temporary file next to `path`, then move it into place
    fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| OoxmlError::Io(e.error))?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "document saved");
        Ok(())
    }
}

impl DocumentEditor for DocxPackage {
    fn body(&self) -> Vec<NodeId> {
        self.document.body().to_vec()
    }

    fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.document.node_kind(id)
    }

    fn insert_paragraph(&mut self, position: usize) -> NodeId {
        self.document.insert_paragraph(position)
    }

    fn append_table(&mut self, rows: usize, cols: usize) -> NodeId {
        self.document.append_table(rows, cols)
    }

    fn remove_node(&mut self, id: NodeId) -> bool {
        self.document.remove_node(id)
    }

    fn paragraph_text(&self, p: NodeId) -> String {
        self.read_paragraph(p, paragraph::text)
    }

    fn paragraph_style(&self, p: NodeId) -> Option<String> {
        self.document.paragraph(p).and_then(paragraph::style)
    }

    fn set_paragraph_style(&mut self, p: NodeId, style_id: &str) {
        self.with_paragraph(p, |e| paragraph::set_style(e, style_id));
    }

    fn outline_level(&self, p: NodeId) -> Option<u8> {
        let element = self.document.paragraph(p)?;
        paragraph::outline_level(element).or_else(|| {
            paragraph::style(element)
                .and_then(|id| self.styles.get(&id))
                .and_then(|s| s.outline_level)
        })
    }

    fn numbering(&self, p: NodeId) -> Option<Numbering> {
        self.document.paragraph(p).and_then(paragraph::numbering)
    }

    fn clear_numbering(&mut self, p: NodeId) {
        self.with_paragraph(p, paragraph::clear_numbering);
    }

    fn has_drawing(&self, p: NodeId) -> bool {
        self.read_paragraph(p, paragraph::has_drawing)
    }

    fn has_picture(&self, p: NodeId) -> bool {
        self.read_paragraph(p, paragraph::has_picture)
    }

    fn has_line_break(&self, p: NodeId) -> bool {
        self.read_paragraph(p, paragraph::has_line_break)
    }

    fn apply_paragraph_format(&mut self, p: NodeId, format: &ParagraphFormat) {
        self.with_paragraph(p, |e| paragraph::apply_format(e, format));
    }

    fn paragraph_format(&self, p: NodeId) -> ParagraphFormat {
        self.read_paragraph(p, paragraph::read_format)
    }

    fn runs(&self, p: NodeId) -> Vec<RunInfo> {
        self.read_paragraph(p, paragraph::runs)
    }

    fn add_run(&mut self, p: NodeId, text: &str, format: &RunFormat) {
        self.with_paragraph(p, |e| paragraph::add_run(e, text, format));
    }

    fn format_runs(&mut self, p: NodeId, format: &RunFormat) {
        self.with_paragraph(p, |e| paragraph::format_runs(e, format));
    }

    fn replace_text(&mut self, p: NodeId, text: &str) {
        self.with_paragraph(p, |e| paragraph::replace_text(e, text));
    }

    fn table_row_count(&self, t: NodeId) -> usize {
        self.document.table(t).map(|t| t.rows.len()).unwrap_or(0)
    }

    fn table_cell_count(&self, t: NodeId, row: usize) -> usize {
        self.document
            .table(t)
            .and_then(|t| t.rows.get(row))
            .map(|r| r.cells.len())
            .unwrap_or(0)
    }

    fn cell_paragraphs(&self, t: NodeId, row: usize, col: usize) -> Vec<NodeId> {
        self.document
            .table(t)
            .and_then(|t| t.cell(row, col))
            .map(|c| c.paragraphs().collect())
            .unwrap_or_default()
    }

    fn add_table_row(&mut self, t: NodeId) -> Option<usize> {
        self.document.add_table_row(t)
    }

    fn set_table_alignment(&mut self, t: NodeId, alignment: Alignment) {
        if let Some(table) = self.document.table_mut(t) {
            table.set_alignment(alignment);
        }
    }

    fn set_table_borders(&mut self, t: NodeId, borders: &TableBorders) {
        if let Some(table) = self.document.table_mut(t) {
            table.set_borders(borders);
        }
    }

    fn set_row_height(&mut self, t: NodeId, row: usize, height: Length, rule: HeightRule) {
        if let Some(row) = self.document.table_mut(t).and_then(|t| t.rows.get_mut(row)) {
            row.set_height(height, rule);
        }
    }

    fn set_cell_margins(&mut self, t: NodeId, row: usize, col: usize, margins: &CellMargins) {
        if let Some(cell) = self.document.table_mut(t).and_then(|t| t.cell_mut(row, col)) {
            cell.set_margins(margins);
        }
    }

    fn set_cell_vertical_alignment(
        &mut self,
        t: NodeId,
        row: usize,
        col: usize,
        alignment: VerticalAlignment,
    ) {
        if let Some(cell) = self.document.table_mut(t).and_then(|t| t.cell_mut(row, col)) {
            cell.set_vertical_alignment(alignment);
        }
    }

    fn section_count(&self) -> usize {
        self.document.section_count()
    }

    fn set_page_geometry(&mut self, section: usize, geometry: &PageGeometry) {
        if let Some(sect_pr) = self.document.section_properties_mut(section) {
            section::set_page_geometry(sect_pr, geometry);
        }
    }

    fn add_page_number_footer(&mut self, section: usize, format: &FooterFormat) {
        if let Err(e) = self.page_number_footer(section, format) {
            tracing::warn!(section, error = %e, "could not add page number footer");
        }
    }

    fn define_style(&mut self, style_id: &str, style: &StyleDefinition) {
        self.styles.upsert_paragraph_style(style_id, style);
    }

    fn has_style(&self, style_id: &str) -> bool {
        self.styles.contains(style_id)
    }

    fn style_name(&self, style_id: &str) -> Option<String> {
        self.styles.get(style_id).map(|s| s.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{docx_with_body, docx_without_styles};

    fn footer_format() -> FooterFormat {
        FooterFormat {
            alignment: Alignment::Center,
            style_id: None,
            run: RunFormat::new().font("Times New Roman", Length::from_pt(12.0)),
            first_line_indent: Length::ZERO,
            left_indent: Length::ZERO,
        }
    }

    #[test]
    fn test_open_and_edit_paragraphs() {
        let bytes = docx_with_body(r#"<w:p><w:r><w:t>Hello</w:t></w:r></w:p>"#);
        let mut doc = DocxPackage::from_bytes(&bytes).unwrap();

        let p = doc.paragraphs()[0];
        assert_eq!(doc.paragraph_text(p), "Hello");
        doc.set_paragraph_style(p, "Body");
        doc.replace_text(p, "World");

        let reopened = DocxPackage::from_bytes(&doc.to_bytes().unwrap()).unwrap();
        let p = reopened.paragraphs()[0];
        assert_eq!(reopened.paragraph_text(p), "World");
        assert_eq!(reopened.paragraph_style(p).as_deref(), Some("Body"));
    }

    #[test]
    fn test_outline_level_falls_back_to_style() {
        let mut doc = DocxPackage::blank().unwrap();
        let p = doc.append_paragraph();
        doc.set_paragraph_style(p, "Heading2");
        assert_eq!(doc.outline_level(p), Some(1));
        assert_eq!(doc.style_name("Heading2").as_deref(), Some("heading 2"));
    }

    #[test]
    fn test_define_style_persists() {
        let mut doc = DocxPackage::blank().unwrap();
        doc.define_style("ГОСТ_обычный", &StyleDefinition::new("ГОСТ_обычный"));
        assert!(doc.has_style("ГОСТ_обычный"));

        let reopened = DocxPackage::from_bytes(&doc.to_bytes().unwrap()).unwrap();
        assert!(reopened.has_style("ГОСТ_обычный"));
    }

    #[test]
    fn test_missing_styles_part_is_created() {
        let mut doc = DocxPackage::from_bytes(&docx_without_styles()).unwrap();
        doc.define_style("Body", &StyleDefinition::new("Body"));

        let archive = OoxmlArchive::from_reader(Cursor::new(doc.to_bytes().unwrap())).unwrap();
        assert!(archive.contains(STYLES_PART));
        let rels = archive.get_string("word/_rels/document.xml.rels").unwrap();
        assert!(rels.contains(Relationships::TYPE_STYLES));
        let types = archive.get_string(CONTENT_TYPES_PART).unwrap();
        assert!(types.contains(r#"PartName="/word/styles.xml""#));
    }

    #[test]
    fn test_page_number_footer_is_created() {
        let mut doc = DocxPackage::blank().unwrap();
        doc.add_page_number_footer(0, &footer_format());

        let archive = OoxmlArchive::from_reader(Cursor::new(doc.to_bytes().unwrap())).unwrap();
        let footer = archive.get_string("word/footer1.xml").unwrap();
        assert!(footer.contains("PAGE"));
        let types = archive.get_string(CONTENT_TYPES_PART).unwrap();
        assert!(types.contains(r#"PartName="/word/footer1.xml""#));
        let rels = archive.get_string("word/_rels/document.xml.rels").unwrap();
        assert!(rels.contains(r#"Target="footer1.xml""#));
        let body = archive.get_string(DOCUMENT_PART).unwrap();
        assert!(body.contains(r#"<w:footerReference w:type="default" r:id="rId2"/>"#));
    }

    #[test]
    fn test_page_number_appends_to_existing_footer() {
        let mut doc = DocxPackage::blank().unwrap();
        doc.add_page_number_footer(0, &footer_format());
        let mut reopened = DocxPackage::from_bytes(&doc.to_bytes().unwrap()).unwrap();
        reopened.add_page_number_footer(0, &footer_format());

        let archive =
            OoxmlArchive::from_reader(Cursor::new(reopened.to_bytes().unwrap())).unwrap();
        assert!(!archive.contains("word/footer2.xml"));
        let footer = archive.get_string("word/footer1.xml").unwrap();
        assert_eq!(footer.matches("PAGE").count(), 2);
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        let doc = DocxPackage::blank().unwrap();
        doc.save(&path).unwrap();

        let reopened = DocxPackage::open(&path).unwrap();
        assert_eq!(reopened.section_count(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_document_part() {
        let archive = OoxmlArchive::new();
        assert!(DocxPackage::from_archive(archive).is_err());
    }

    #[test]
    fn test_rels_part_for() {
        assert_eq!(rels_part_for("word/document.xml"), "word/_rels/document.xml.rels");
        assert_eq!(rels_part_for("document.xml"), "_rels/document.xml.rels");
    }
}
