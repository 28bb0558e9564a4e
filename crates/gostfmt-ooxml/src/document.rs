//! Document content model (word/document.xml)
//!
//! The body is split into an ordered list of top-level nodes. Paragraphs,
//! both top-level and inside table cells, live in a single arena keyed by
//! [`NodeId`]; tables keep their row/cell skeleton in a [`TableModel`].
//! Everything else in the part is carried through untouched.

use std::collections::HashMap;

use gostfmt_ast::{NodeId, NodeKind};

use crate::error::{OoxmlError, Result};
use crate::paragraph;
use crate::table::{self, TableModel};
use crate::xml::{self, XmlElement, XmlNode};

#[derive(Debug, Clone)]
enum BodyNode {
    /// Content is in the paragraph arena
    Paragraph,
    Table(TableModel),
    Other(XmlNode),
}

/// A parsed Word document body
#[derive(Debug, Clone)]
pub struct Document {
    /// `w:document` with an empty `w:body`
    root: XmlElement,
    order: Vec<NodeId>,
    nodes: HashMap<NodeId, BodyNode>,
    paragraphs: HashMap<NodeId, XmlElement>,
    /// Body-level `w:sectPr`, written after every other node
    final_section: XmlElement,
    next_id: u32,
}

impl Document {
    /// Parse a document part
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut root = xml::parse(xml)?;
        if root.name != "w:document" {
            return Err(OoxmlError::InvalidStructure(format!(
                "expected <w:document>, found <{}>",
                root.name
            )));
        }
        let body = root
            .child_mut("w:body")
            .ok_or_else(|| OoxmlError::InvalidStructure("document has no <w:body>".to_string()))?;
        let children = std::mem::take(&mut body.children);

        let mut doc = Self {
            root,
            order: Vec::new(),
            nodes: HashMap::new(),
            paragraphs: HashMap::new(),
            final_section: XmlElement::new("w:sectPr"),
            next_id: 0,
        };

        for node in children {
            match node {
                XmlNode::Element(e) if e.name == "w:p" => {
                    let id = doc.register(e);
                    doc.nodes.insert(id, BodyNode::Paragraph);
                    doc.order.push(id);
                }
                XmlNode::Element(e) if e.name == "w:tbl" => {
                    let model = table::from_element(e, &mut |p| doc.register(p));
                    let id = doc.alloc_id();
                    doc.nodes.insert(id, BodyNode::Table(model));
                    doc.order.push(id);
                }
                XmlNode::Element(e) if e.name == "w:sectPr" => doc.final_section = e,
                XmlNode::Text(t) if t.trim().is_empty() => {}
                other => {
                    let id = doc.alloc_id();
                    doc.nodes.insert(id, BodyNode::Other(other));
                    doc.order.push(id);
                }
            }
        }

        tracing::debug!(
            nodes = doc.order.len(),
            paragraphs = doc.paragraphs.len(),
            "parsed document body"
        );
        Ok(doc)
    }

    /// Declare a namespace prefix on `w:document` if it is missing
    pub fn ensure_namespace(&mut self, attr: &str, uri: &str) {
        if self.root.attr(attr).is_none() {
            self.root.set_attr(attr, uri);
        }
    }

    fn alloc_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    fn register(&mut self, p: XmlElement) -> NodeId {
        let id = self.alloc_id();
        self.paragraphs.insert(id, p);
        id
    }

    /// Top-level nodes in order
    pub fn body(&self) -> &[NodeId] {
        &self.order
    }

    pub fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(&id).map(|n| match n {
            BodyNode::Paragraph => NodeKind::Paragraph,
            BodyNode::Table(_) => NodeKind::Table,
            BodyNode::Other(_) => NodeKind::Other,
        })
    }

    /// A live paragraph, top-level or inside a cell
    pub fn paragraph(&self, id: NodeId) -> Option<&XmlElement> {
        self.paragraphs.get(&id)
    }

    pub fn paragraph_mut(&mut self, id: NodeId) -> Option<&mut XmlElement> {
        self.paragraphs.get_mut(&id)
    }

    pub fn table(&self, id: NodeId) -> Option<&TableModel> {
        match self.nodes.get(&id) {
            Some(BodyNode::Table(t)) => Some(t),
            _ => None,
        }
    }

    pub fn table_mut(&mut self, id: NodeId) -> Option<&mut TableModel> {
        match self.nodes.get_mut(&id) {
            Some(BodyNode::Table(t)) => Some(t),
            _ => None,
        }
    }

    /// Insert an empty paragraph at `position` (clamped to the end)
    pub fn insert_paragraph(&mut self, position: usize) -> NodeId {
        let id = self.register(paragraph::new_paragraph());
        self.nodes.insert(id, BodyNode::Paragraph);
        let position = position.min(self.order.len());
        self.order.insert(position, id);
        id
    }

    pub fn append_table(&mut self, rows: usize, cols: usize) -> NodeId {
        let model = TableModel::new(rows, cols, || self.register(paragraph::new_paragraph()));
        let id = self.alloc_id();
        self.nodes.insert(id, BodyNode::Table(model));
        self.order.push(id);
        id
    }

    pub fn add_table_row(&mut self, t: NodeId) -> Option<usize> {
        let mut model = match self.nodes.remove(&t) {
            Some(BodyNode::Table(model)) => model,
            Some(other) => {
                self.nodes.insert(t, other);
                return None;
            }
            None => return None,
        };
        let index = model.add_row(|| self.register(paragraph::new_paragraph()));
        self.nodes.insert(t, BodyNode::Table(model));
        Some(index)
    }

    /// Remove a top-level node
    ///
    /// A paragraph that ends a section (carries `w:sectPr`) is kept, since
    /// removing it would merge two sections.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if self.node_kind(id) == Some(NodeKind::Paragraph)
            && self.paragraphs.get(&id).is_some_and(ends_section)
        {
            tracing::debug!(?id, "keeping section break paragraph");
            return false;
        }
        let Some(node) = self.nodes.remove(&id) else {
            return false;
        };
        match node {
            BodyNode::Paragraph => {
                self.paragraphs.remove(&id);
            }
            BodyNode::Table(model) => {
                for p in model.paragraph_ids() {
                    self.paragraphs.remove(&p);
                }
            }
            BodyNode::Other(_) => {}
        }
        self.order.retain(|n| *n != id);
        true
    }

    /// Paragraphs carrying section properties, in order
    fn section_break_paragraphs(&self) -> Vec<NodeId> {
        self.order
            .iter()
            .copied()
            .filter(|id| matches!(self.nodes.get(id), Some(BodyNode::Paragraph)))
            .filter(|id| self.paragraphs.get(id).is_some_and(ends_section))
            .collect()
    }

    /// Number of sections (the body-level one included)
    pub fn section_count(&self) -> usize {
        self.section_break_paragraphs().len() + 1
    }

    /// Section properties of section `index`
    pub fn section_properties(&self, index: usize) -> Option<&XmlElement> {
        let breaks = self.section_break_paragraphs();
        match breaks.get(index) {
            Some(id) => self
                .paragraphs
                .get(id)
                .and_then(paragraph::properties)
                .and_then(|ppr| ppr.child("w:sectPr")),
            None if index == breaks.len() => Some(&self.final_section),
            None => None,
        }
    }

    pub fn section_properties_mut(&mut self, index: usize) -> Option<&mut XmlElement> {
        let breaks = self.section_break_paragraphs();
        match breaks.get(index) {
            Some(id) => self
                .paragraphs
                .get_mut(id)
                .and_then(|p| p.child_mut("w:pPr"))
                .and_then(|ppr| ppr.child_mut("w:sectPr")),
            None if index == breaks.len() => Some(&mut self.final_section),
            None => None,
        }
    }

    /// Serialize back to a complete document part
    pub fn to_xml(&self) -> String {
        let mut root = self.root.clone();
        let mut children = Vec::with_capacity(self.order.len() + 1);
        for id in &self.order {
            match self.nodes.get(id) {
                Some(BodyNode::Paragraph) => {
                    if let Some(p) = self.paragraphs.get(id) {
                        children.push(XmlNode::Element(p.clone()));
                    }
                }
                Some(BodyNode::Table(model)) => {
                    let tbl = table::to_element(model, &|p| self.paragraphs.get(&p));
                    children.push(XmlNode::Element(tbl));
                }
                Some(BodyNode::Other(node)) => children.push(node.clone()),
                None => {}
            }
        }
        children.push(XmlNode::Element(self.final_section.clone()));
        if let Some(body) = root.child_mut("w:body") {
            body.children = children;
        }
        root.to_document_string()
    }
}

fn ends_section(p: &XmlElement) -> bool {
    paragraph::properties(p).is_some_and(|ppr| ppr.child("w:sectPr").is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First</w:t></w:r></w:p>
    <w:tbl>
      <w:tblGrid><w:gridCol w:w="4000"/><w:gridCol w:w="4000"/></w:tblGrid>
      <w:tr><w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>B</w:t></w:r></w:p></w:tc></w:tr>
    </w:tbl>
    <w:p><w:pPr><w:sectPr><w:pgSz w:w="16838" w:h="11906" w:orient="landscape"/></w:sectPr></w:pPr></w:p>
    <w:bookmarkStart w:id="0" w:name="end"/>
    <w:p><w:r><w:t>Last</w:t></w:r></w:p>
    <w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>
  </w:body>
</w:document>"#;

    fn doc() -> Document {
        Document::parse(DOC.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_body_nodes() {
        let doc = doc();
        let kinds: Vec<NodeKind> = doc
            .body()
            .iter()
            .map(|id| doc.node_kind(*id).unwrap())
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Paragraph,
                NodeKind::Table,
                NodeKind::Paragraph,
                NodeKind::Other,
                NodeKind::Paragraph
            ]
        );

        let table = doc.table(doc.body()[1]).unwrap();
        let cell = table.cell(0, 1).unwrap().paragraphs().next().unwrap();
        assert_eq!(doc.paragraph(cell).unwrap().text(), "B");
    }

    #[test]
    fn test_sections() {
        let mut doc = doc();
        assert_eq!(doc.section_count(), 2);
        let first = doc.section_properties(0).unwrap();
        assert_eq!(first.child("w:pgSz").unwrap().attr("w:orient"), Some("landscape"));
        assert!(doc.section_properties(2).is_none());

        doc.section_properties_mut(1)
            .unwrap()
            .push(XmlElement::new("w:titlePg"));
        assert!(doc.to_xml().contains("<w:titlePg/></w:sectPr></w:body>"));
    }

    #[test]
    fn test_section_break_paragraph_is_not_removed() {
        let mut doc = doc();
        let section_break = doc.body()[2];
        assert!(!doc.remove_node(section_break));
        assert_eq!(doc.section_count(), 2);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut doc = doc();
        let first = doc.body()[0];
        let table = doc.body()[1];
        let cell = doc.table(table).unwrap().paragraph_ids()[0];

        let inserted = doc.insert_paragraph(1);
        assert_eq!(doc.body()[1], inserted);
        assert!(doc.remove_node(first));
        assert!(!doc.remove_node(first));
        assert!(doc.paragraph(first).is_none());

        assert!(doc.remove_node(table));
        assert!(doc.paragraph(cell).is_none());
        assert_eq!(doc.body().len(), 4);
    }

    #[test]
    fn test_append_table_and_row() {
        let mut doc = doc();
        let t = doc.append_table(2, 3);
        assert_eq!(*doc.body().last().unwrap(), t);
        assert_eq!(doc.add_table_row(t), Some(2));
        assert_eq!(doc.table(t).unwrap().paragraph_ids().len(), 9);
        assert_eq!(doc.add_table_row(doc.body()[0]), None);
    }

    #[test]
    fn test_to_xml_roundtrip() {
        let doc = doc();
        let xml = doc.to_xml();
        assert!(xml.contains(r#"<w:bookmarkStart w:id="0" w:name="end"/>"#));
        assert!(xml.contains("</w:sectPr></w:body>"));

        let reparsed = Document::parse(xml.as_bytes()).unwrap();
        assert_eq!(reparsed.body().len(), doc.body().len());
        assert_eq!(reparsed.to_xml(), xml);
    }

    #[test]
    fn test_missing_body_is_an_error() {
        let result = Document::parse(br#"<w:document xmlns:w="ns"/>"#);
        assert!(matches!(result, Err(OoxmlError::InvalidStructure(_))));
    }
}
