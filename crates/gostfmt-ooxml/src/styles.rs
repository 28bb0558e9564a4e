//! Style definitions (word/styles.xml)
//!
//! The style sheet is kept as an XML tree so that defining the GOST
//! paragraph styles leaves every other style of the document intact.

use gostfmt_ast::StyleDefinition;

use crate::error::Result;
use crate::paragraph::{apply_format_to_properties, apply_run_format_to_properties};
use crate::section::WORDPROCESSING_NS;
use crate::xml::{self, XmlElement};

/// `w:style` child sequence
const STYLE_ORDER: &[&str] = &[
    "w:name",
    "w:aliases",
    "w:basedOn",
    "w:next",
    "w:link",
    "w:autoRedefine",
    "w:hidden",
    "w:uiPriority",
    "w:semiHidden",
    "w:unhideWhenUsed",
    "w:qFormat",
    "w:locked",
    "w:personal",
    "w:personalCompose",
    "w:personalReply",
    "w:rsid",
    "w:pPr",
    "w:rPr",
    "w:tblPr",
    "w:trPr",
    "w:tcPr",
    "w:tblStylePr",
];

/// Collection of styles from a document
#[derive(Debug, Clone)]
pub struct StyleSheet {
    root: XmlElement,
}

/// Summary of one `w:style`
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Style ID (used in document references)
    pub id: String,
    /// Display name
    pub name: String,
    /// Style type
    pub style_type: StyleType,
    /// Base style ID (for inheritance)
    pub based_on: Option<String>,
    /// Outline level (for headings, 0-8, where 0 = Heading 1)
    pub outline_level: Option<u8>,
    /// Marked as the default style of its type
    pub is_default: bool,
}

/// Type of style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
    Numbering,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            root: XmlElement::new("w:styles").with_attr("xmlns:w", WORDPROCESSING_NS),
        }
    }
}

impl StyleSheet {
    /// Parse styles from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Ok(Self {
            root: xml::parse(xml)?,
        })
    }

    /// Get a style by ID
    pub fn get(&self, id: &str) -> Option<Style> {
        self.style_elements()
            .find(|e| e.attr("w:styleId") == Some(id))
            .map(summarize)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.style_elements().any(|e| e.attr("w:styleId") == Some(id))
    }

    /// Get all styles
    pub fn all(&self) -> Vec<Style> {
        self.style_elements().map(summarize).collect()
    }

    /// Default paragraph style ID
    pub fn default_paragraph(&self) -> Option<String> {
        self.all()
            .into_iter()
            .find(|s| s.is_default && s.style_type == StyleType::Paragraph)
            .map(|s| s.id)
    }

    fn style_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.root.children_named("w:style")
    }

    /// Create or update a custom paragraph style
    ///
    /// An existing style keeps its other settings but has its paragraph and
    /// run properties replaced.
    pub fn upsert_paragraph_style(&mut self, id: &str, definition: &StyleDefinition) {
        let mut ppr = XmlElement::new("w:pPr");
        apply_format_to_properties(&mut ppr, &definition.paragraph_format());
        let mut rpr = XmlElement::new("w:rPr");
        apply_run_format_to_properties(&mut rpr, &definition.run_format());

        let existing = self
            .root
            .elements_mut()
            .find(|e| e.name == "w:style" && e.attr("w:styleId") == Some(id));
        let style = match existing {
            Some(style) => style,
            None => {
                self.root.push(
                    XmlElement::new("w:style")
                        .with_attr("w:type", "paragraph")
                        .with_attr("w:customStyle", "1")
                        .with_attr("w:styleId", id),
                );
                match self.root.elements_mut().last() {
                    Some(style) => style,
                    None => return,
                }
            }
        };

        style.set_child_ordered(
            XmlElement::new("w:name").with_attr("w:val", definition.name.as_str()),
            STYLE_ORDER,
        );
        style.set_child_ordered(XmlElement::new("w:qFormat"), STYLE_ORDER);
        style.set_child_ordered(ppr, STYLE_ORDER);
        style.set_child_ordered(rpr, STYLE_ORDER);
    }

    /// Serialize to a complete styles part
    pub fn to_xml(&self) -> String {
        self.root.to_document_string()
    }
}

fn summarize(e: &XmlElement) -> Style {
    let id = e.attr("w:styleId").unwrap_or_default().to_string();
    let val = |name: &str| {
        e.child(name)
            .and_then(|c| c.attr("w:val"))
            .map(str::to_string)
    };
    Style {
        name: val("w:name").unwrap_or_else(|| id.clone()),
        style_type: match e.attr("w:type") {
            Some("character") => StyleType::Character,
            Some("table") => StyleType::Table,
            Some("numbering") => StyleType::Numbering,
            _ => StyleType::Paragraph,
        },
        based_on: val("w:basedOn"),
        outline_level: e
            .child("w:pPr")
            .and_then(|p| p.child("w:outlineLvl"))
            .and_then(|o| o.attr("w:val"))
            .and_then(|v| v.parse().ok()),
        is_default: matches!(e.attr("w:default"), Some("1" | "true" | "on")),
        id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gostfmt_ast::{Alignment, Length};

    const STYLES: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Normal" w:default="1">
    <w:name w:val="Normal"/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="1">
    <w:name w:val="heading 1"/>
    <w:basedOn w:val="Normal"/>
    <w:pPr><w:outlineLvl w:val="0"/></w:pPr>
  </w:style>
  <w:style w:type="table" w:styleId="TableGrid">
    <w:name w:val="Table Grid"/>
  </w:style>
</w:styles>"#;

    #[test]
    fn test_parse_styles() {
        let sheet = StyleSheet::parse(STYLES).unwrap();
        assert_eq!(sheet.all().len(), 3);
        assert_eq!(sheet.default_paragraph().as_deref(), Some("Normal"));

        let heading = sheet.get("1").unwrap();
        assert_eq!(heading.name, "heading 1");
        assert_eq!(heading.based_on.as_deref(), Some("Normal"));
        assert_eq!(heading.outline_level, Some(0));
        assert_eq!(sheet.get("TableGrid").unwrap().style_type, StyleType::Table);
    }

    #[test]
    fn test_upsert_creates_custom_style() {
        let mut sheet = StyleSheet::parse(STYLES).unwrap();
        let mut def = StyleDefinition::new("ГОСТ_заголовок1");
        def.font_size = Length::from_pt(16.0);
        def.bold = true;
        def.alignment = Alignment::Center;

        sheet.upsert_paragraph_style("ГОСТ_заголовок1", &def);
        assert!(sheet.contains("ГОСТ_заголовок1"));
        assert_eq!(sheet.get("ГОСТ_заголовок1").unwrap().name, "ГОСТ_заголовок1");

        let xml = sheet.to_xml();
        assert!(xml.contains(r#"<w:style w:type="paragraph" w:customStyle="1" w:styleId="ГОСТ_заголовок1">"#));
        assert!(xml.contains(r#"<w:jc w:val="center"/>"#));
        assert!(xml.contains(r#"<w:sz w:val="32"/>"#));
        assert!(xml.contains(r#"<w:i w:val="0"/>"#));
    }

    #[test]
    fn test_upsert_replaces_properties_once() {
        let mut sheet = StyleSheet::parse(STYLES).unwrap();
        let def = StyleDefinition::new("Body");
        sheet.upsert_paragraph_style("Body", &def);
        sheet.upsert_paragraph_style("Body", &def);

        let xml = sheet.to_xml();
        assert_eq!(xml.matches(r#"w:styleId="Body""#).count(), 1);
        assert_eq!(xml.matches("<w:qFormat/>").count(), 1);
        let reparsed = StyleSheet::parse(xml.as_bytes()).unwrap();
        assert_eq!(reparsed.all().len(), 4);
    }
}
