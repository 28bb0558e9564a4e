//! gostfmt-ast - shared document vocabulary
//!
//! This crate holds the types every other gostfmt crate speaks:
//!
//! - [`Block`]: one line of lightweight markup after classification
//! - [`InlineSpan`]: bold/italic emphasis ranges inside a text
//! - formatting values ([`Length`], [`StyleDefinition`], [`PageGeometry`], ...)
//! - the [`DocumentEditor`] trait, the editing surface the core pipeline
//!   drives without knowing which word-processor back end sits below it

pub mod block;
pub mod editor;
pub mod format;
pub mod inline;

pub use block::{Block, BlockKind};
pub use editor::{DocumentEditor, NodeId, NodeKind, Numbering, Persist, RunInfo};
pub use format::{
    Alignment, CellMargins, FooterFormat, HeightRule, Length, Orientation, PageGeometry,
    ParagraphFormat, RunFormat, StyleDefinition, TabAlignment, TabStop, TableBorders,
    VerticalAlignment,
};
pub use inline::{InlineSpan, InlineStyle};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
