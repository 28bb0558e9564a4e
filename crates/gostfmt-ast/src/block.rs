//! Line-level blocks produced by the markup parser
//!
//! A [`Block`] is one classified line of lightweight markup. Blocks are
//! produced once by the parser, consumed once by the materializer and never
//! changed in between.

use serde::{Deserialize, Serialize};

/// Kind of a parsed markup line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// `#`..`######` heading
    Header,
    /// Plain text (also quotes and flattened code fences)
    Normal,
    /// `- item`, `* item`, `+ item`
    UnorderedListItem,
    /// `1. item`
    OrderedListItem,
    /// `| a | b |`
    TableRow,
    /// `|---|---|`
    TableSeparator,
    /// `---`
    PageBreak,
    /// Whitespace-only line
    Empty,
}

impl BlockKind {
    /// Returns true for rows and delimiter rows of a pipe table
    pub fn is_table(self) -> bool {
        matches!(self, BlockKind::TableRow | BlockKind::TableSeparator)
    }
}

/// One parsed line of markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// What the line is
    pub kind: BlockKind,
    /// Heading depth (1-6) for [`BlockKind::Header`], `None` otherwise
    pub level: Option<u8>,
    /// Line text with block markers stripped but inline markup intact
    pub text: String,
}

impl Block {
    /// Create a block without a level
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            level: None,
            text: text.into(),
        }
    }

    /// Create a heading block
    pub fn header(level: u8, text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Header,
            level: Some(level),
            text: text.into(),
        }
    }

    /// Returns true if this block belongs to a pipe table
    pub fn is_table(&self) -> bool {
        self.kind.is_table()
    }
}
