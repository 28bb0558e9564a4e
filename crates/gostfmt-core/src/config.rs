//! Configuration settings (`gostfmt.toml`)
//!
//! Every field is optional; anything left out keeps the built-in GOST
//! value from [`StyleRegistry::gost`](crate::styles::StyleRegistry::gost).
//!
//! ```toml
//! [styles.heading1]
//! font_size_pt = 18.0
//!
//! [page]
//! margin_left_cm = 2.5
//!
//! [table]
//! border_size = 8
//! ```

use std::path::Path;

use gostfmt_ast::{Alignment, Length, StyleDefinition};
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Name of the per-directory configuration file
pub const CONFIG_FILE_NAME: &str = "gostfmt.toml";

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Overrides for the named paragraph styles
    pub styles: StyleOverrides,
    /// Page geometry and page numbers
    pub page: PageSettings,
    /// Table borders and rows
    pub table: TableSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(toml_str)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        for (name, style) in self.styles.iter() {
            if style.font_size_pt.is_some_and(|s| s <= 0.0) {
                return Err(ConvertError::InvalidSetting(format!(
                    "styles.{}.font_size_pt must be positive",
                    name
                )));
            }
            if style.line_spacing.is_some_and(|s| s <= 0.0) {
                return Err(ConvertError::InvalidSetting(format!(
                    "styles.{}.line_spacing must be positive",
                    name
                )));
            }
        }
        let page = [
            ("width_cm", self.page.width_cm),
            ("height_cm", self.page.height_cm),
        ];
        for (name, value) in page {
            if value.is_some_and(|v| v <= 0.0) {
                return Err(ConvertError::InvalidSetting(format!(
                    "page.{} must be positive",
                    name
                )));
            }
        }
        let margins = [
            ("margin_top_cm", self.page.margin_top_cm),
            ("margin_bottom_cm", self.page.margin_bottom_cm),
            ("margin_left_cm", self.page.margin_left_cm),
            ("margin_right_cm", self.page.margin_right_cm),
        ];
        for (name, value) in margins {
            if value.is_some_and(|v| v < 0.0) {
                return Err(ConvertError::InvalidSetting(format!(
                    "page.{} must not be negative",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Per-style overrides, one table per registry style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StyleOverrides {
    pub heading1: Option<StyleSettings>,
    pub heading2: Option<StyleSettings>,
    pub heading3: Option<StyleSettings>,
    pub list: Option<StyleSettings>,
    pub normal: Option<StyleSettings>,
    pub table_text: Option<StyleSettings>,
    pub caption: Option<StyleSettings>,
    pub code: Option<StyleSettings>,
    pub formula: Option<StyleSettings>,
}

impl StyleOverrides {
    /// Present overrides with their configuration key
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &StyleSettings)> {
        [
            ("heading1", &self.heading1),
            ("heading2", &self.heading2),
            ("heading3", &self.heading3),
            ("list", &self.list),
            ("normal", &self.normal),
            ("table_text", &self.table_text),
            ("caption", &self.caption),
            ("code", &self.code),
            ("formula", &self.formula),
        ]
        .into_iter()
        .filter_map(|(name, s)| s.as_ref().map(|s| (name, s)))
    }
}

/// Overrides for one style; sizes in points, indents in centimetres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StyleSettings {
    pub font_name: Option<String>,
    pub font_size_pt: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub all_caps: Option<bool>,
    pub alignment: Option<Alignment>,
    pub line_spacing: Option<f64>,
    pub space_before_pt: Option<f64>,
    pub space_after_pt: Option<f64>,
    pub page_break_before: Option<bool>,
    pub first_line_indent_cm: Option<f64>,
    pub left_indent_cm: Option<f64>,
    pub hanging_indent_cm: Option<f64>,
}

impl StyleSettings {
    /// Overlay the present fields onto `style`
    pub fn apply_to(&self, style: &mut StyleDefinition) {
        if let Some(name) = &self.font_name {
            style.font_name = name.clone();
        }
        if let Some(size) = self.font_size_pt {
            style.font_size = Length::from_pt(size);
        }
        if let Some(bold) = self.bold {
            style.bold = bold;
        }
        if let Some(italic) = self.italic {
            style.italic = italic;
        }
        if let Some(caps) = self.all_caps {
            style.all_caps = caps;
        }
        if let Some(alignment) = self.alignment {
            style.alignment = alignment;
        }
        if let Some(spacing) = self.line_spacing {
            style.line_spacing = spacing;
        }
        if let Some(before) = self.space_before_pt {
            style.space_before = Length::from_pt(before);
        }
        if let Some(after) = self.space_after_pt {
            style.space_after = Length::from_pt(after);
        }
        if let Some(page_break) = self.page_break_before {
            style.page_break_before = page_break;
        }
        if let Some(indent) = self.first_line_indent_cm {
            style.first_line_indent = Length::from_cm(indent);
        }
        if let Some(indent) = self.left_indent_cm {
            style.left_indent = Length::from_cm(indent);
        }
        if let Some(indent) = self.hanging_indent_cm {
            style.hanging_indent = Length::from_cm(indent);
        }
    }
}

/// Page settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PageSettings {
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub margin_top_cm: Option<f64>,
    pub margin_bottom_cm: Option<f64>,
    pub margin_left_cm: Option<f64>,
    pub margin_right_cm: Option<f64>,
    /// Font size of the running page number
    pub page_number_size_pt: Option<f64>,
}

/// Table settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TableSettings {
    /// Border width in eighths of a point
    pub border_size: Option<u32>,
    pub row_height_cm: Option<f64>,
    /// Left/right cell margin in twips
    pub cell_margin_twips: Option<i64>,
}
