//! gostfmt-core - GOST formatting for reports
//!
//! Core library for gostfmt: markup parsing, paragraph classification and
//! reformatting per the GOST academic style guide. Everything here works
//! against [`gostfmt_ast::DocumentEditor`]; the concrete document format
//! is supplied by the caller.
//!
//! # Example
//!
//! ```
//! use gostfmt_core::markup::MarkupParser;
//! use gostfmt_ast::BlockKind;
//!
//! let blocks = MarkupParser::new("# Введение\n\nТекст").parse();
//! assert_eq!(blocks[0].kind, BlockKind::Header);
//! assert_eq!(blocks[2].kind, BlockKind::Normal);
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod inline;
pub mod markup;
pub mod materialize;
pub mod pipeline;
pub mod reformat;
pub mod sections;
pub mod styles;

// Re-export main types and functions
pub use classify::{ClassifiedParagraph, Classifier, Role};
pub use config::Settings;
pub use error::{ConvertError, Result};
pub use markup::MarkupParser;
pub use materialize::Materializer;
pub use pipeline::{convert_document, convert_markup, outline, InputKind, OutlineEntry};
pub use reformat::{ReformatOptions, Reformatter};
pub use sections::{classify_with_sections, SectionKind, SectionTracker};
pub use styles::{StyleName, StyleRegistry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
