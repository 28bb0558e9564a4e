//! Formatting values shared between the style registry and document back ends
//!
//! Lengths are stored in English Metric Units so that points, centimetres
//! and twips convert without accumulating rounding error.

use serde::{Deserialize, Serialize};

/// EMUs per typographic point
const EMU_PER_PT: f64 = 12_700.0;
/// EMUs per centimetre
const EMU_PER_CM: f64 = 360_000.0;
/// EMUs per twip (1/20 pt)
const EMU_PER_TWIP: i64 = 635;

/// A physical length
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Length(i64);

impl Length {
    pub const ZERO: Length = Length(0);

    pub fn from_emu(emu: i64) -> Self {
        Self(emu)
    }

    pub fn from_pt(pt: f64) -> Self {
        Self((pt * EMU_PER_PT).round() as i64)
    }

    pub fn from_cm(cm: f64) -> Self {
        Self((cm * EMU_PER_CM).round() as i64)
    }

    pub fn from_twips(twips: i64) -> Self {
        Self(twips * EMU_PER_TWIP)
    }

    pub fn emu(self) -> i64 {
        self.0
    }

    /// Length in twentieths of a point, as used by most WordprocessingML attributes
    pub fn twips(self) -> i64 {
        (self.0 as f64 / EMU_PER_TWIP as f64).round() as i64
    }

    /// Length in half-points, as used by `w:sz`
    pub fn half_points(self) -> i64 {
        (self.0 as f64 / (EMU_PER_PT / 2.0)).round() as i64
    }

    pub fn pt(self) -> f64 {
        self.0 as f64 / EMU_PER_PT
    }

    pub fn cm(self) -> f64 {
        self.0 as f64 / EMU_PER_CM
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Horizontal paragraph or table alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

/// Vertical alignment of table cell content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
}

/// Row height rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightRule {
    Auto,
    AtLeast,
    Exact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabAlignment {
    Left,
    Center,
    Right,
}

/// A custom tab stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabStop {
    pub position: Length,
    pub alignment: TabAlignment,
}

/// Character formatting. `None` leaves the existing value untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunFormat {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub all_caps: Option<bool>,
    pub font_name: Option<String>,
    pub font_size: Option<Length>,
}

impl RunFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font(mut self, name: impl Into<String>, size: Length) -> Self {
        self.font_name = Some(name.into());
        self.font_size = Some(size);
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Paragraph formatting. `None` leaves the existing value untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParagraphFormat {
    pub alignment: Option<Alignment>,
    /// Line spacing as a multiple of single spacing
    pub line_spacing: Option<f64>,
    pub space_before: Option<Length>,
    pub space_after: Option<Length>,
    pub page_break_before: Option<bool>,
    pub first_line_indent: Option<Length>,
    pub left_indent: Option<Length>,
    pub hanging_indent: Option<Length>,
    /// Replaces all custom tab stops when non-empty
    pub tab_stops: Vec<TabStop>,
}

impl ParagraphFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aligned(alignment: Alignment) -> Self {
        Self {
            alignment: Some(alignment),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A named bundle of typographic attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDefinition {
    /// Display name written into the style sheet
    pub name: String,
    pub font_name: String,
    pub font_size: Length,
    pub bold: bool,
    pub italic: bool,
    pub all_caps: bool,
    pub alignment: Alignment,
    pub line_spacing: f64,
    pub space_before: Length,
    pub space_after: Length,
    pub page_break_before: bool,
    pub first_line_indent: Length,
    pub left_indent: Length,
    pub hanging_indent: Length,
}

impl StyleDefinition {
    /// Body-text defaults: Times New Roman 14 pt, justified, 1.25 spacing
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            font_name: "Times New Roman".to_string(),
            font_size: Length::from_pt(14.0),
            bold: false,
            italic: false,
            all_caps: false,
            alignment: Alignment::Justify,
            line_spacing: 1.25,
            space_before: Length::ZERO,
            space_after: Length::ZERO,
            page_break_before: false,
            first_line_indent: Length::ZERO,
            left_indent: Length::ZERO,
            hanging_indent: Length::ZERO,
        }
    }

    /// Character properties of the style. Flags are always explicit so the
    /// style overrides whatever it is based on.
    pub fn run_format(&self) -> RunFormat {
        RunFormat {
            bold: Some(self.bold),
            italic: Some(self.italic),
            all_caps: Some(self.all_caps),
            font_name: Some(self.font_name.clone()),
            font_size: Some(self.font_size),
        }
    }

    /// Paragraph properties of the style. Zero lengths and a false
    /// page-break flag are left unset.
    pub fn paragraph_format(&self) -> ParagraphFormat {
        let non_zero = |l: Length| (!l.is_zero()).then_some(l);
        ParagraphFormat {
            alignment: Some(self.alignment),
            line_spacing: (self.line_spacing > 0.0).then_some(self.line_spacing),
            space_before: non_zero(self.space_before),
            space_after: non_zero(self.space_after),
            page_break_before: self.page_break_before.then_some(true),
            first_line_indent: non_zero(self.first_line_indent),
            left_indent: non_zero(self.left_indent),
            hanging_indent: non_zero(self.hanging_indent),
            tab_stops: Vec::new(),
        }
    }
}

/// Table border settings applied to every edge and inside line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBorders {
    /// Border style, e.g. `single`
    pub style: String,
    /// Width in eighths of a point
    pub size: u32,
    /// Hex RGB colour without `#`
    pub color: String,
}

impl Default for TableBorders {
    fn default() -> Self {
        Self {
            style: "single".to_string(),
            size: 1,
            color: "000000".to_string(),
        }
    }
}

/// Cell margins. `None` sides are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellMargins {
    pub top: Option<Length>,
    pub left: Option<Length>,
    pub bottom: Option<Length>,
    pub right: Option<Length>,
}

impl CellMargins {
    pub fn horizontal(width: Length) -> Self {
        Self {
            left: Some(width),
            right: Some(width),
            ..Self::default()
        }
    }
}

/// Page size, orientation and margins of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: Length,
    pub height: Length,
    pub orientation: Orientation,
    pub margin_top: Length,
    pub margin_bottom: Length,
    pub margin_left: Length,
    pub margin_right: Length,
}

impl PageGeometry {
    /// Width of the text area between the side margins
    pub fn text_width(&self) -> Length {
        Length::from_emu(self.width.emu() - self.margin_left.emu() - self.margin_right.emu())
    }
}

/// Layout of the running page number injected into a section footer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterFormat {
    pub alignment: Alignment,
    /// Paragraph style for the footer paragraph
    pub style_id: Option<String>,
    /// Font of the page number run
    pub run: RunFormat,
    pub first_line_indent: Length,
    pub left_indent: Length,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        assert_eq!(Length::from_pt(1.0).emu(), 12_700);
        assert_eq!(Length::from_cm(1.0).emu(), 360_000);
        assert_eq!(Length::from_pt(14.0).half_points(), 28);
        assert_eq!(Length::from_pt(12.0).twips(), 240);
        assert_eq!(Length::from_cm(21.0).twips(), 11_906);
        assert_eq!(Length::from_cm(29.7).twips(), 16_838);
        assert_eq!(Length::from_cm(3.0).twips(), 1_701);
        assert_eq!(Length::from_cm(1.5).twips(), 850);
        assert_eq!(Length::from_twips(100).twips(), 100);
    }

    #[test]
    fn test_style_paragraph_format_skips_zero() {
        let style = StyleDefinition::new("Body");
        let pf = style.paragraph_format();
        assert_eq!(pf.alignment, Some(Alignment::Justify));
        assert_eq!(pf.line_spacing, Some(1.25));
        assert_eq!(pf.space_before, None);
        assert_eq!(pf.page_break_before, None);
        assert_eq!(pf.first_line_indent, None);
    }

    #[test]
    fn test_style_run_format_is_explicit() {
        let style = StyleDefinition::new("Body");
        let rf = style.run_format();
        assert_eq!(rf.bold, Some(false));
        assert_eq!(rf.italic, Some(false));
        assert_eq!(rf.font_name.as_deref(), Some("Times New Roman"));
        assert_eq!(rf.font_size, Some(Length::from_pt(14.0)));
    }

    #[test]
    fn test_text_width() {
        let page = PageGeometry {
            width: Length::from_cm(21.0),
            height: Length::from_cm(29.7),
            orientation: Orientation::Portrait,
            margin_top: Length::from_cm(2.0),
            margin_bottom: Length::from_cm(2.0),
            margin_left: Length::from_cm(3.0),
            margin_right: Length::from_cm(1.5),
        };
        assert_eq!(page.text_width(), Length::from_cm(16.5));
    }
}
