//! # gostfmt-ooxml
//!
//! DOCX (Office Open XML) back end for gostfmt.
//!
//! This crate provides:
//! - Lossless reading and writing of DOCX packages
//! - Paragraph, table, section and style editing on top of a generic XML tree
//! - [`DocxPackage`], the [`gostfmt_ast::DocumentEditor`] implementation used
//!   by the formatting pipeline
//!
//! ## Example
//!
//! ```no_run
//! use gostfmt_ast::{DocumentEditor, Persist};
//! use gostfmt_ooxml::DocxPackage;
//!
//! let mut doc = DocxPackage::open("thesis.docx")?;
//! for p in doc.paragraphs() {
//!     println!("{}", doc.paragraph_text(p));
//! }
//! doc.save("thesis-copy.docx".as_ref())?;
//! # Ok::<(), gostfmt_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod document;
pub mod error;
pub mod package;
pub mod paragraph;
pub mod relationships;
pub mod section;
pub mod styles;
pub mod table;
pub mod template;
#[doc(hidden)]
pub mod test_utils;
pub mod xml;

pub use archive::OoxmlArchive;
pub use document::Document;
pub use error::{OoxmlError, Result};
pub use package::DocxPackage;
pub use relationships::Relationships;
pub use styles::{Style, StyleSheet, StyleType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
