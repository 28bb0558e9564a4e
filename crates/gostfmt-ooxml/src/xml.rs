//! Lossless XML element tree
//!
//! WordprocessingML parts carry far more markup than gostfmt understands
//! (revision marks, bookmarks, drawings, custom XML). Parts are therefore
//! parsed into a generic tree that keeps every node it does not touch, and
//! edits are made in place. Qualified names (`w:p`, `xml:space`) are kept
//! verbatim; namespace declarations are ordinary attributes.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};

/// Standard declaration written at the top of every part
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A node in the tree
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

/// An element with its attributes and children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style element child
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder-style text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Name without its namespace prefix
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attributes.retain(|(k, _)| k != name);
    }

    /// Element children in order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First element child with the given qualified name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.name == name)
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Remove every element child with the given name; returns how many went
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, XmlNode::Element(e) if e.name == name));
        before - self.children.len()
    }

    /// Insert `child` respecting a schema sequence: it goes before the first
    /// existing child whose name appears later in `order`. Names not in
    /// `order` are treated as coming last.
    pub fn insert_ordered(&mut self, child: XmlElement, order: &[&str]) -> &mut XmlElement {
        let rank = |name: &str| order.iter().position(|o| *o == name).unwrap_or(order.len());
        let own = rank(&child.name);
        let index = self
            .children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if rank(&e.name) > own))
            .unwrap_or(self.children.len());
        self.children.insert(index, XmlNode::Element(child));
        match &mut self.children[index] {
            XmlNode::Element(e) => e,
            _ => unreachable!("element was just inserted"),
        }
    }

    /// Replace any children named like `child` with `child`, in schema order
    pub fn set_child_ordered(&mut self, child: XmlElement, order: &[&str]) -> &mut XmlElement {
        self.remove_children(&child.name);
        self.insert_ordered(child, order)
    }

    /// Existing child or a new empty one inserted in schema order
    pub fn get_or_add_child(&mut self, name: &str, order: &[&str]) -> &mut XmlElement {
        let existing = self
            .children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if e.name == name));
        match existing {
            Some(index) => match &mut self.children[index] {
                XmlNode::Element(e) => e,
                _ => unreachable!("position matched an element"),
            },
            None => self.insert_ordered(XmlElement::new(name), order),
        }
    }

    /// Depth-first search for a descendant element with the given name
    pub fn has_descendant(&self, name: &str) -> bool {
        self.elements()
            .any(|e| e.name == name || e.has_descendant(name))
    }

    /// Visit every descendant element depth-first, pre-order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a XmlElement)) {
        for e in self.elements() {
            visit(e);
            e.walk(visit);
        }
    }

    /// Concatenated character data of all descendant text nodes
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Serialize this element and its subtree
    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attributes {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            out.push_str(&escape_xml(v));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                XmlNode::Element(e) => e.write_to(out),
                XmlNode::Text(t) => out.push_str(&escape_text(t)),
                XmlNode::CData(t) => {
                    out.push_str("<![CDATA[");
                    out.push_str(t);
                    out.push_str("]]>");
                }
                XmlNode::Comment(t) => {
                    out.push_str("<!--");
                    out.push_str(t);
                    out.push_str("-->");
                }
                XmlNode::ProcessingInstruction(t) => {
                    out.push_str("<?");
                    out.push_str(t);
                    out.push_str("?>");
                }
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    /// Serialize as a standalone part with an XML declaration
    pub fn to_document_string(&self) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        self.write_to(&mut out);
        out
    }
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for child in &element.children {
        match child {
            XmlNode::Element(e) => collect_text(e, out),
            XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
            _ => {}
        }
    }
}

/// Parse a complete part into its root element
pub fn parse(xml: &[u8]) -> Result<XmlElement> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => stack.push(element_from_start(e)?),
            Ok(Event::Empty(ref e)) => {
                let element = element_from_start(e)?;
                attach(&mut stack, &mut root, XmlNode::Element(element))?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| {
                    OoxmlError::InvalidStructure("unbalanced closing tag".to_string())
                })?;
                attach(&mut stack, &mut root, XmlNode::Element(element))?;
            }
            Ok(Event::Text(ref e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = e.unescape()?.into_owned();
                    parent.children.push(XmlNode::Text(text));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    parent.children.push(XmlNode::CData(text));
                }
            }
            Ok(Event::Comment(ref e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(e).into_owned();
                    parent.children.push(XmlNode::Comment(text));
                }
            }
            Ok(Event::PI(ref e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(e).into_owned();
                    parent.children.push(XmlNode::ProcessingInstruction(text));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(OoxmlError::InvalidStructure(format!(
            "unclosed element <{}>",
            stack.last().map(|e| e.name.as_str()).unwrap_or("")
        )));
    }
    root.ok_or_else(|| OoxmlError::InvalidStructure("no root element".to_string()))
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, node: XmlNode) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => match node {
            XmlNode::Element(e) if root.is_none() => *root = Some(e),
            XmlNode::Element(e) => {
                return Err(OoxmlError::InvalidStructure(format!(
                    "second root element <{}>",
                    e.name
                )))
            }
            _ => {}
        },
    }
    Ok(())
}

fn element_from_start(e: &BytesStart) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Escape special XML characters in attribute values
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: &[&str] = &["w:pStyle", "w:numPr", "w:spacing", "w:jc"];

    #[test]
    fn test_parse_and_serialize_keeps_unknown_markup() {
        let xml = br#"<?xml version="1.0"?><w:p xmlns:w="ns"><w:bookmarkStart w:id="0"/><!-- note --><w:r><w:t xml:space="preserve"> a &amp; b </w:t></w:r></w:p>"#;
        let root = parse(xml).unwrap();

        assert_eq!(root.name, "w:p");
        assert_eq!(root.local_name(), "p");
        assert_eq!(root.attr("xmlns:w"), Some("ns"));
        assert_eq!(root.text(), " a & b ");

        let mut out = String::new();
        root.write_to(&mut out);
        assert_eq!(
            out,
            r#"<w:p xmlns:w="ns"><w:bookmarkStart w:id="0"/><!-- note --><w:r><w:t xml:space="preserve"> a &amp; b </w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_insert_ordered() {
        let mut ppr = XmlElement::new("w:pPr");
        ppr.push(XmlElement::new("w:jc"));
        ppr.insert_ordered(XmlElement::new("w:pStyle"), ORDER);
        ppr.insert_ordered(XmlElement::new("w:spacing"), ORDER);

        let names: Vec<&str> = ppr.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:pStyle", "w:spacing", "w:jc"]);
    }

    #[test]
    fn test_set_child_ordered_replaces() {
        let mut ppr = XmlElement::new("w:pPr");
        ppr.push(XmlElement::new("w:jc").with_attr("w:val", "left"));
        ppr.set_child_ordered(XmlElement::new("w:jc").with_attr("w:val", "center"), ORDER);

        assert_eq!(ppr.children_named("w:jc").count(), 1);
        assert_eq!(ppr.child("w:jc").unwrap().attr("w:val"), Some("center"));
    }

    #[test]
    fn test_get_or_add_child_reuses_existing() {
        let mut ppr = XmlElement::new("w:pPr");
        ppr.get_or_add_child("w:spacing", ORDER).set_attr("w:before", "240");
        ppr.get_or_add_child("w:spacing", ORDER).set_attr("w:after", "120");

        let spacing = ppr.child("w:spacing").unwrap();
        assert_eq!(spacing.attr("w:before"), Some("240"));
        assert_eq!(spacing.attr("w:after"), Some("120"));
        assert_eq!(ppr.elements().count(), 1);
    }

    #[test]
    fn test_has_descendant() {
        let root = parse(br#"<w:p><w:r><w:drawing><wp:inline/></w:drawing></w:r></w:p>"#).unwrap();
        assert!(root.has_descendant("w:drawing"));
        assert!(root.has_descendant("wp:inline"));
        assert!(!root.has_descendant("w:pict"));
    }

    #[test]
    fn test_attribute_escaping() {
        let element = XmlElement::new("w:t").with_attr("w:val", "a\"<b>&");
        let mut out = String::new();
        element.write_to(&mut out);
        assert_eq!(out, r#"<w:t w:val="a&quot;&lt;b&gt;&amp;"/>"#);

        let reparsed = parse(out.as_bytes()).unwrap();
        assert_eq!(reparsed.attr("w:val"), Some("a\"<b>&"));
    }

    #[test]
    fn test_unbalanced_input_is_rejected() {
        assert!(parse(b"<a><b></a>").is_err());
        assert!(parse(b"").is_err());
    }
}
