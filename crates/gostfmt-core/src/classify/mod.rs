//! Document Classifier
//!
//! Assigns every top-level paragraph of a document exactly one semantic
//! [`Role`]. Detection runs the ordered [`DETECTOR_CHAIN`]; the first
//! detector that recognises a paragraph decides its role, and a paragraph
//! nothing recognises is [`Role::Normal`].

mod detectors;

use std::fmt;

use gostfmt_ast::{DocumentEditor, NodeId};

pub(crate) use detectors::has_number_marker;
pub use detectors::{Detector, DETECTOR_CHAIN};

/// Semantic role of a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Heading,
    ListBullet,
    ListNumber,
    Normal,
    Image,
    TableCaption,
    ImageCaption,
    Formula,
    Code,
    Empty,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Heading => "heading",
            Role::ListBullet => "list_bullet",
            Role::ListNumber => "list_number",
            Role::Normal => "normal",
            Role::Image => "image",
            Role::TableCaption => "tb_caption",
            Role::ImageCaption => "img_caption",
            Role::Formula => "formula",
            Role::Code => "code",
            Role::Empty => "empty",
        }
    }

    /// Returns true for figure and table captions
    pub fn is_caption(self) -> bool {
        matches!(self, Role::TableCaption | Role::ImageCaption)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One classified paragraph
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedParagraph {
    pub role: Role,
    /// Heading or list depth; 0 for blank paragraphs
    pub level: u8,
    /// The paragraph in the host document
    pub par: NodeId,
    /// Paragraph text at classification time
    pub text: String,
    /// Position in the document's paragraph sequence
    pub index: usize,
}

/// Classifies the top-level paragraphs of a document
pub struct Classifier<'d, D: DocumentEditor + ?Sized> {
    doc: &'d D,
}

impl<'d, D: DocumentEditor + ?Sized> Classifier<'d, D> {
    pub fn new(doc: &'d D) -> Self {
        Self { doc }
    }

    /// Classify every paragraph, in document order
    pub fn classify(&self) -> Vec<ClassifiedParagraph> {
        let classified: Vec<ClassifiedParagraph> = self
            .doc
            .paragraphs()
            .into_iter()
            .enumerate()
            .map(|(index, par)| {
                let text = self.doc.paragraph_text(par);
                let (role, level) = self.detect(par, &text);
                tracing::debug!(index, %role, level, "classified paragraph");
                ClassifiedParagraph {
                    role,
                    level,
                    par,
                    text,
                    index,
                }
            })
            .collect();
        tracing::info!(paragraphs = classified.len(), "classified document");
        classified
    }

    /// Role and level of a single paragraph
    pub fn detect(&self, par: NodeId, text: &str) -> (Role, u8) {
        DETECTOR_CHAIN
            .iter()
            .find_map(|detector| detector.detect(self.doc, par, text))
            .unwrap_or((Role::Normal, 1))
    }
}
