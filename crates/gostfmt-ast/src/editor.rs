//! Abstract document-editing surface
//!
//! The core pipeline (materializer, classifier, reformatter) is written
//! against [`DocumentEditor`] only. A back end such as `gostfmt-ooxml`
//! implements it on top of a concrete file format.
//!
//! The body is an ordered sequence of top-level nodes addressed by
//! [`NodeId`]. Ids stay valid while other nodes are inserted or removed;
//! once a node is removed its id is dead and every query on it returns
//! `None`/empty and every mutation is a no-op.

use std::path::Path;

use crate::format::{
    Alignment, CellMargins, FooterFormat, HeightRule, Length, PageGeometry, ParagraphFormat,
    RunFormat, StyleDefinition, TableBorders, VerticalAlignment,
};

/// Stable handle to a body node or a paragraph inside a table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Kind of a top-level body node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Paragraph,
    Table,
    /// Anything else (section properties, bookmarks, content controls)
    Other,
}

/// Native list numbering attached to a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Numbering {
    pub num_id: Option<u32>,
    pub ilvl: Option<u32>,
}

/// Text and direct formatting of one run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunInfo {
    pub text: String,
    pub format: RunFormat,
}

/// Editing operations the gostfmt pipeline needs from a document
pub trait DocumentEditor {
    // ---------------------------------------------------------------
    // Body sequence
    // ---------------------------------------------------------------

    /// Top-level nodes in document order
    fn body(&self) -> Vec<NodeId>;

    /// Kind of a live node
    fn node_kind(&self, id: NodeId) -> Option<NodeKind>;

    /// Position of a top-level node in [`body`](Self::body)
    fn position_of(&self, id: NodeId) -> Option<usize> {
        self.body().iter().position(|n| *n == id)
    }

    fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let body = self.body();
        let pos = body.iter().position(|n| *n == id)?;
        pos.checked_sub(1).map(|p| body[p])
    }

    fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let body = self.body();
        let pos = body.iter().position(|n| *n == id)?;
        body.get(pos + 1).copied()
    }

    /// Top-level paragraphs in document order
    fn paragraphs(&self) -> Vec<NodeId> {
        self.body()
            .into_iter()
            .filter(|id| self.node_kind(*id) == Some(NodeKind::Paragraph))
            .collect()
    }

    /// Top-level tables in document order
    fn tables(&self) -> Vec<NodeId> {
        self.body()
            .into_iter()
            .filter(|id| self.node_kind(*id) == Some(NodeKind::Table))
            .collect()
    }

    /// Insert an empty paragraph at `position` of the body (clamped to the end)
    fn insert_paragraph(&mut self, position: usize) -> NodeId;

    /// Append an empty paragraph to the body
    fn append_paragraph(&mut self) -> NodeId {
        let len = self.body().len();
        self.insert_paragraph(len)
    }

    /// Append a `rows` x `cols` table whose cells each hold one empty paragraph
    fn append_table(&mut self, rows: usize, cols: usize) -> NodeId;

    /// Remove a top-level node. Returns false if it was not live.
    fn remove_node(&mut self, id: NodeId) -> bool;

    // ---------------------------------------------------------------
    // Paragraphs (top-level or inside cells)
    // ---------------------------------------------------------------

    /// Concatenated run text; tabs as `\t`, breaks as `\n`
    fn paragraph_text(&self, p: NodeId) -> String;

    /// Style id from the paragraph properties
    fn paragraph_style(&self, p: NodeId) -> Option<String>;

    fn set_paragraph_style(&mut self, p: NodeId, style_id: &str);

    /// Outline level (0-based) set on the paragraph or, failing that, on
    /// its style
    fn outline_level(&self, p: NodeId) -> Option<u8>;

    /// Direct native numbering, `None` when the paragraph has no numbering properties
    fn numbering(&self, p: NodeId) -> Option<Numbering>;

    fn clear_numbering(&mut self, p: NodeId);

    /// A run of the paragraph embeds a drawing
    fn has_drawing(&self, p: NodeId) -> bool;

    /// The paragraph embeds a drawing or a legacy picture anywhere
    fn has_picture(&self, p: NodeId) -> bool;

    /// The paragraph carries an explicit line break
    fn has_line_break(&self, p: NodeId) -> bool;

    /// Merge direct paragraph formatting
    fn apply_paragraph_format(&mut self, p: NodeId, format: &ParagraphFormat);

    /// Direct paragraph formatting currently set
    fn paragraph_format(&self, p: NodeId) -> ParagraphFormat;

    fn runs(&self, p: NodeId) -> Vec<RunInfo>;

    /// Append a run; `\t` and `\n` become tab and break marks
    fn add_run(&mut self, p: NodeId, text: &str, format: &RunFormat);

    /// Merge direct formatting into every run of the paragraph
    fn format_runs(&mut self, p: NodeId, format: &RunFormat);

    /// Replace the paragraph content with a single unformatted run holding
    /// `text`; paragraph properties are kept
    fn replace_text(&mut self, p: NodeId, text: &str);

    // ---------------------------------------------------------------
    // Tables
    // ---------------------------------------------------------------

    fn table_row_count(&self, t: NodeId) -> usize;

    fn table_cell_count(&self, t: NodeId, row: usize) -> usize;

    /// Paragraphs of a cell, in order
    fn cell_paragraphs(&self, t: NodeId, row: usize, col: usize) -> Vec<NodeId>;

    /// Append a row with the table's column count; returns its index
    fn add_table_row(&mut self, t: NodeId) -> Option<usize>;

    fn set_table_alignment(&mut self, t: NodeId, alignment: Alignment);

    /// Replace the table borders with `borders` on every edge and inside line
    fn set_table_borders(&mut self, t: NodeId, borders: &TableBorders);

    fn set_row_height(
        &mut self,
        t: NodeId,
        row: usize,
        height: Length,
        rule: HeightRule,
    );

    /// Replace the cell margins
    fn set_cell_margins(&mut self, t: NodeId, row: usize, col: usize, margins: &CellMargins);

    fn set_cell_vertical_alignment(
        &mut self,
        t: NodeId,
        row: usize,
        col: usize,
        alignment: VerticalAlignment,
    );

    // ---------------------------------------------------------------
    // Sections
    // ---------------------------------------------------------------

    /// Number of page sections (at least 1)
    fn section_count(&self) -> usize;

    fn set_page_geometry(&mut self, section: usize, geometry: &PageGeometry);

    /// Attach a footer holding a centered `PAGE` field to a section
    fn add_page_number_footer(&mut self, section: usize, format: &FooterFormat);

    // ---------------------------------------------------------------
    // Styles
    // ---------------------------------------------------------------

    /// Create or replace a paragraph style
    fn define_style(&mut self, style_id: &str, style: &StyleDefinition);

    fn has_style(&self, style_id: &str) -> bool;

    /// Display name of a style, when the document defines it
    fn style_name(&self, style_id: &str) -> Option<String>;
}

/// Documents that can be written to disk
pub trait Persist {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write the document to `path`. Implementations must not leave a
    /// truncated file behind on failure.
    fn save(&self, path: &Path) -> Result<(), Self::Error>;
}
