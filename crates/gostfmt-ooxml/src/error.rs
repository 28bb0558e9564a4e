//! Errors of the DOCX back end

use thiserror::Error;

/// Failure to read, edit or write a DOCX package
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// The file is not a readable ZIP container
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A part is not well-formed XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// A part the package needs (document, content types) is absent
    #[error("Missing package part: {0}")]
    MissingFile(String),

    /// Well-formed XML that is not a usable WordprocessingML document
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),
}

/// Result type for DOCX operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
