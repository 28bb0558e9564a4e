//! Style Registry
//!
//! The GOST catalogue of paragraph styles, table settings and page
//! geometry. A registry is an immutable value built once per process and
//! passed by reference to the materializer and the reformatter.

use gostfmt_ast::{
    Alignment, DocumentEditor, FooterFormat, Length, Orientation, PageGeometry, RunFormat,
    StyleDefinition, TableBorders,
};

use crate::config::Settings;

/// Semantic style names known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleName {
    Heading1,
    Heading2,
    Heading3,
    List,
    Normal,
    TableText,
    Caption,
    Code,
    Formula,
}

impl StyleName {
    pub const ALL: [StyleName; 9] = [
        StyleName::Heading1,
        StyleName::Heading2,
        StyleName::Heading3,
        StyleName::List,
        StyleName::Normal,
        StyleName::TableText,
        StyleName::Caption,
        StyleName::Code,
        StyleName::Formula,
    ];

    /// Style id (and display name) written into documents
    pub fn id(self) -> &'static str {
        match self {
            StyleName::Heading1 => "ГОСТ_заголовок1",
            StyleName::Heading2 => "ГОСТ_заголовок2",
            StyleName::Heading3 => "ГОСТ_заголовок3",
            StyleName::List => "ГОСТ_список",
            StyleName::Normal => "ГОСТ_обычный",
            StyleName::TableText => "ГОСТ_текст_в_таблице",
            StyleName::Caption => "ГОСТ_подпись",
            StyleName::Code => "ГОСТ_код",
            StyleName::Formula => "ГОСТ_формула",
        }
    }

    /// Heading style for `level`; levels past 3 share the third style
    pub fn heading(level: u8) -> StyleName {
        match level {
            0 | 1 => StyleName::Heading1,
            2 => StyleName::Heading2,
            _ => StyleName::Heading3,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Table layout settings
#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub borders: TableBorders,
    /// Minimum row height
    pub row_height: Length,
    /// Left and right cell margin
    pub cell_margin: Length,
}

/// Page layout settings
#[derive(Debug, Clone, PartialEq)]
pub struct PageStyle {
    pub geometry: PageGeometry,
    pub page_number: FooterFormat,
}

/// The style catalogue
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRegistry {
    styles: [StyleDefinition; 9],
    table: TableStyle,
    page: PageStyle,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::gost()
    }
}

impl StyleRegistry {
    /// Built-in GOST catalogue
    pub fn gost() -> Self {
        let styles = StyleName::ALL.map(gost_style);
        Self {
            styles,
            table: TableStyle {
                borders: TableBorders::default(),
                row_height: Length::from_cm(0.8),
                cell_margin: Length::from_twips(100),
            },
            page: PageStyle {
                geometry: PageGeometry {
                    width: Length::from_cm(21.0),
                    height: Length::from_cm(29.7),
                    orientation: Orientation::Portrait,
                    margin_top: Length::from_cm(2.0),
                    margin_bottom: Length::from_cm(2.0),
                    margin_left: Length::from_cm(3.0),
                    margin_right: Length::from_cm(1.5),
                },
                page_number: FooterFormat {
                    alignment: Alignment::Center,
                    style_id: Some(StyleName::Normal.id().to_string()),
                    run: RunFormat::new().font("Times New Roman", Length::from_pt(12.0)),
                    first_line_indent: Length::ZERO,
                    left_indent: Length::ZERO,
                },
            },
        }
    }

    /// The GOST catalogue with configuration overrides applied
    pub fn from_settings(settings: &Settings) -> Self {
        let mut registry = Self::gost();
        let overrides = &settings.styles;
        let pairs = [
            (StyleName::Heading1, &overrides.heading1),
            (StyleName::Heading2, &overrides.heading2),
            (StyleName::Heading3, &overrides.heading3),
            (StyleName::List, &overrides.list),
            (StyleName::Normal, &overrides.normal),
            (StyleName::TableText, &overrides.table_text),
            (StyleName::Caption, &overrides.caption),
            (StyleName::Code, &overrides.code),
            (StyleName::Formula, &overrides.formula),
        ];
        for (name, style) in pairs {
            if let Some(style) = style {
                style.apply_to(&mut registry.styles[name.index()]);
            }
        }

        let page = &settings.page;
        let geometry = &mut registry.page.geometry;
        let cm = |value: Option<f64>, target: &mut Length| {
            if let Some(v) = value {
                *target = Length::from_cm(v);
            }
        };
        cm(page.width_cm, &mut geometry.width);
        cm(page.height_cm, &mut geometry.height);
        cm(page.margin_top_cm, &mut geometry.margin_top);
        cm(page.margin_bottom_cm, &mut geometry.margin_bottom);
        cm(page.margin_left_cm, &mut geometry.margin_left);
        cm(page.margin_right_cm, &mut geometry.margin_right);
        if geometry.width.emu() > geometry.height.emu() {
            geometry.orientation = Orientation::Landscape;
        }
        if let Some(size) = page.page_number_size_pt {
            registry.page.page_number.run.font_size = Some(Length::from_pt(size));
        }

        let table = &settings.table;
        if let Some(size) = table.border_size {
            registry.table.borders.size = size;
        }
        cm(table.row_height_cm, &mut registry.table.row_height);
        if let Some(margin) = table.cell_margin_twips {
            registry.table.cell_margin = Length::from_twips(margin);
        }
        registry
    }

    pub fn get(&self, name: StyleName) -> &StyleDefinition {
        &self.styles[name.index()]
    }

    /// Every style with its name, in catalogue order
    pub fn iter(&self) -> impl Iterator<Item = (StyleName, &StyleDefinition)> {
        StyleName::ALL.into_iter().zip(self.styles.iter())
    }

    pub fn table(&self) -> &TableStyle {
        &self.table
    }

    pub fn page(&self) -> &PageStyle {
        &self.page
    }

    /// Font applied to every materialized run
    pub fn body_run_format(&self) -> RunFormat {
        let normal = self.get(StyleName::Normal);
        RunFormat::new().font(normal.font_name.clone(), normal.font_size)
    }

    /// Define every registry style in `doc`
    pub fn install<D: DocumentEditor + ?Sized>(&self, doc: &mut D) {
        for (name, style) in self.iter() {
            doc.define_style(name.id(), style);
        }
        tracing::debug!(count = self.styles.len(), "installed registry styles");
    }
}

fn gost_style(name: StyleName) -> StyleDefinition {
    let mut style = StyleDefinition::new(name.id());
    match name {
        StyleName::Heading1 => {
            style.font_size = Length::from_pt(16.0);
            style.bold = true;
            style.all_caps = true;
            style.alignment = Alignment::Center;
            style.space_before = Length::from_pt(12.0);
            style.space_after = Length::from_pt(6.0);
            style.page_break_before = true;
        }
        StyleName::Heading2 => {
            style.bold = true;
            style.alignment = Alignment::Left;
            style.space_before = Length::from_pt(6.0);
            style.space_after = Length::from_pt(6.0);
        }
        StyleName::Heading3 => {
            style.alignment = Alignment::Left;
            style.space_before = Length::from_pt(6.0);
            style.space_after = Length::from_pt(3.0);
        }
        StyleName::List => {
            style.line_spacing = 1.5;
            style.hanging_indent = Length::from_cm(0.5);
        }
        StyleName::Normal => {
            style.line_spacing = 1.5;
            style.first_line_indent = Length::from_cm(1.25);
        }
        StyleName::TableText | StyleName::Caption => {
            style.line_spacing = 1.5;
        }
        StyleName::Code => {
            style.font_name = "Courier New".to_string();
            style.font_size = Length::from_pt(12.0);
            style.line_spacing = 1.0;
        }
        StyleName::Formula => {
            style.italic = true;
            style.alignment = Alignment::Center;
            style.space_before = Length::from_pt(12.0);
            style.space_after = Length::from_pt(6.0);
            style.line_spacing = 1.0;
        }
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleSettings;

    #[test]
    fn test_gost_catalogue() {
        let registry = StyleRegistry::gost();
        assert_eq!(registry.iter().count(), 9);

        let h1 = registry.get(StyleName::Heading1);
        assert_eq!(h1.name, "ГОСТ_заголовок1");
        assert!(h1.bold && h1.all_caps && h1.page_break_before);
        assert_eq!(h1.font_size, Length::from_pt(16.0));
        assert_eq!(h1.alignment, Alignment::Center);

        let normal = registry.get(StyleName::Normal);
        assert_eq!(normal.alignment, Alignment::Justify);
        assert_eq!(normal.first_line_indent, Length::from_cm(1.25));

        assert_eq!(registry.get(StyleName::Code).font_name, "Courier New");
        assert!(registry.get(StyleName::Formula).italic);
    }

    #[test]
    fn test_page_and_table_defaults() {
        let registry = StyleRegistry::gost();
        let geometry = registry.page().geometry;
        assert_eq!(geometry.width.twips(), 11_906);
        assert_eq!(geometry.margin_left.twips(), 1_701);
        assert_eq!(registry.table().borders.size, 1);
        assert_eq!(registry.table().row_height.twips(), 454);
        assert_eq!(
            registry.page().page_number.style_id.as_deref(),
            Some(StyleName::Normal.id())
        );
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(StyleName::heading(1), StyleName::Heading1);
        assert_eq!(StyleName::heading(2), StyleName::Heading2);
        assert_eq!(StyleName::heading(3), StyleName::Heading3);
        assert_eq!(StyleName::heading(6), StyleName::Heading3);
    }

    #[test]
    fn test_from_settings() {
        let mut settings = Settings::default();
        settings.styles.caption = Some(StyleSettings {
            italic: Some(true),
            ..StyleSettings::default()
        });
        settings.page.width_cm = Some(29.7);
        settings.page.height_cm = Some(21.0);
        settings.table.border_size = Some(12);

        let registry = StyleRegistry::from_settings(&settings);
        assert!(registry.get(StyleName::Caption).italic);
        assert!(!registry.get(StyleName::Normal).italic);
        assert_eq!(registry.page().geometry.orientation, Orientation::Landscape);
        assert_eq!(registry.table().borders.size, 12);
        assert_eq!(
            StyleRegistry::from_settings(&Settings::default()),
            StyleRegistry::gost()
        );
    }

    #[test]
    fn test_body_run_format() {
        let run = StyleRegistry::gost().body_run_format();
        assert_eq!(run.font_name.as_deref(), Some("Times New Roman"));
        assert_eq!(run.font_size, Some(Length::from_pt(14.0)));
        assert_eq!(run.bold, None);
    }
}
