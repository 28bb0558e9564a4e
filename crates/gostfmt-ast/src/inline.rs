//! Inline emphasis spans

use serde::{Deserialize, Serialize};

/// Emphasis applied to a run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineStyle {
    #[default]
    Normal,
    Bold,
    Italic,
}

/// A byte range of a source string with its emphasis
///
/// `start..end` always lies on `char` boundaries of the string it was
/// detected in, and covers the markup (`*`, `**`) as well as the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineSpan {
    pub start: usize,
    pub end: usize,
    pub style: InlineStyle,
}

impl InlineSpan {
    pub fn new(start: usize, end: usize, style: InlineStyle) -> Self {
        Self { start, end, style }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The slice of `text` this span covers
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice() {
        let text = "a **b** c";
        let span = InlineSpan::new(2, 7, InlineStyle::Bold);
        assert_eq!(span.slice(text), "**b**");
        assert_eq!(span.len(), 5);
    }

    #[test]
    fn test_out_of_range_slice_is_empty() {
        let span = InlineSpan::new(4, 10, InlineStyle::Normal);
        assert_eq!(span.slice("abc"), "");
    }
}
