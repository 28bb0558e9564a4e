//! Part relationships (`_rels/*.rels`)
//!
//! gostfmt only needs to follow a handful of relationship types (main
//! document, styles, footers) and to add footer relationships; everything
//! else is kept as read and written back in its original order.

use crate::error::Result;
use crate::xml::{self, XmlElement};

/// Namespace of `.rels` parts
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// One `Relationship` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    /// `External` for hyperlinks and linked files
    pub target_mode: Option<String>,
}

impl Relationship {
    fn from_element(element: &XmlElement) -> Option<Self> {
        Some(Self {
            id: element.attr("Id")?.to_string(),
            rel_type: element.attr("Type").unwrap_or_default().to_string(),
            target: element.attr("Target")?.to_string(),
            target_mode: element.attr("TargetMode").map(str::to_string),
        })
    }

    fn to_element(&self) -> XmlElement {
        let element = XmlElement::new("Relationship")
            .with_attr("Id", self.id.as_str())
            .with_attr("Type", self.rel_type.as_str())
            .with_attr("Target", self.target.as_str());
        match &self.target_mode {
            Some(mode) => element.with_attr("TargetMode", mode.as_str()),
            None => element,
        }
    }

    /// Numeric part of an `rIdN` id
    fn number(&self) -> Option<u32> {
        let digits = self.id.get(3..)?;
        self.id[..3]
            .eq_ignore_ascii_case("rid")
            .then(|| digits.parse().ok())
            .flatten()
    }
}

/// Relationships of one part, in document order
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    pub const TYPE_OFFICE_DOCUMENT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const TYPE_STYLES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const TYPE_FOOTER: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";

    pub fn new() -> Self {
        Self::default()
    }

    /// Read a `.rels` part; entries without an id or target are skipped
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let root = xml::parse(bytes)?;
        let entries = root
            .elements()
            .filter(|e| e.local_name() == "Relationship")
            .filter_map(Relationship::from_element)
            .collect();
        Ok(Self { entries })
    }

    /// Relationship with the given id
    pub fn by_id(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// First relationship of `rel_type`
    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.rel_type == rel_type)
    }

    /// Append an internal relationship and return its new `rIdN` id
    pub fn add(&mut self, target: impl Into<String>, rel_type: impl Into<String>) -> String {
        let next = self
            .entries
            .iter()
            .filter_map(Relationship::number)
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("rId{}", next);
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.into(),
            target: target.into(),
            target_mode: None,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    /// The complete `.rels` part
    pub fn to_xml(&self) -> String {
        self.entries
            .iter()
            .fold(
                XmlElement::new("Relationships").with_attr("xmlns", RELATIONSHIPS_NS),
                |root, r| root.with_child(r.to_element()),
            )
            .to_document_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>
  <Relationship Type="broken"/>
</Relationships>"#;

    #[test]
    fn test_parse_skips_incomplete_entries() {
        let rels = Relationships::parse(RELS).unwrap();
        assert_eq!(rels.len(), 3);
        assert_eq!(rels.by_id("rId2").unwrap().target, "styles.xml");
        assert_eq!(
            rels.by_id("rId1").unwrap().target_mode.as_deref(),
            Some("External")
        );
        assert_eq!(
            rels.first_of_type(Relationships::TYPE_STYLES).unwrap().id,
            "rId2"
        );
    }

    #[test]
    fn test_add_uses_next_free_id() {
        let mut rels = Relationships::parse(RELS).unwrap();
        assert_eq!(rels.add("footer1.xml", Relationships::TYPE_FOOTER), "rId10");
        assert_eq!(rels.add("footer2.xml", Relationships::TYPE_FOOTER), "rId11");

        let mut empty = Relationships::new();
        assert_eq!(empty.add("styles.xml", Relationships::TYPE_STYLES), "rId1");
    }

    #[test]
    fn test_to_xml_keeps_order_and_escapes() {
        let mut rels = Relationships::new();
        rels.add("styles.xml", Relationships::TYPE_STYLES);
        rels.add("a&b.xml", Relationships::TYPE_FOOTER);

        let xml = rels.to_xml();
        assert!(xml.contains(RELATIONSHIPS_NS));
        assert!(xml.contains("a&amp;b.xml"));

        let reparsed = Relationships::parse(xml.as_bytes()).unwrap();
        let targets: Vec<&str> = reparsed.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["styles.xml", "a&b.xml"]);
    }

    #[test]
    fn test_id_number() {
        let rel = |id: &str| Relationship {
            id: id.to_string(),
            rel_type: String::new(),
            target: String::new(),
            target_mode: None,
        };
        assert_eq!(rel("rId12").number(), Some(12));
        assert_eq!(rel("RID3").number(), Some(3));
        assert_eq!(rel("footer").number(), None);
        assert_eq!(rel("r").number(), None);
    }
}
