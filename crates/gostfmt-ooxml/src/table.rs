//! Table (`w:tbl`) model and editing
//!
//! A table is held as its property elements plus a row/cell skeleton.
//! Paragraphs inside cells are stored in the document's paragraph arena
//! and referenced here by [`NodeId`], so the same paragraph functions work
//! for body and cell paragraphs alike.

use gostfmt_ast::{
    Alignment, CellMargins, HeightRule, Length, NodeId, TableBorders, VerticalAlignment,
};

use crate::xml::{XmlElement, XmlNode};

/// `w:tblPr` child sequence
const TBLPR_ORDER: &[&str] = &[
    "w:tblStyle",
    "w:tblpPr",
    "w:tblOverlap",
    "w:bidiVisual",
    "w:tblStyleRowBandSize",
    "w:tblStyleColBandSize",
    "w:tblW",
    "w:jc",
    "w:tblCellSpacing",
    "w:tblInd",
    "w:tblBorders",
    "w:shd",
    "w:tblLayout",
    "w:tblCellMar",
    "w:tblLook",
    "w:tblCaption",
    "w:tblDescription",
    "w:tblPrChange",
];

/// `w:tbl` children preceding the rows
const TBL_ORDER: &[&str] = &["w:tblPr", "w:tblGrid"];

/// `w:tr` children preceding the cells
const TR_ORDER: &[&str] = &["w:tblPrEx", "w:trPr"];

/// `w:trPr` child sequence
const TRPR_ORDER: &[&str] = &[
    "w:cnfStyle",
    "w:divId",
    "w:gridBefore",
    "w:gridAfter",
    "w:wBefore",
    "w:wAfter",
    "w:cantSplit",
    "w:trHeight",
    "w:tblHeader",
    "w:tblCellSpacing",
    "w:jc",
    "w:hidden",
    "w:ins",
    "w:del",
    "w:trPrChange",
];

/// `w:tcPr` child sequence
const TCPR_ORDER: &[&str] = &[
    "w:cnfStyle",
    "w:tcW",
    "w:gridSpan",
    "w:hMerge",
    "w:vMerge",
    "w:tcBorders",
    "w:shd",
    "w:noWrap",
    "w:tcMar",
    "w:textDirection",
    "w:tcFitText",
    "w:vAlign",
    "w:hideMark",
    "w:headers",
    "w:cellIns",
    "w:cellDel",
    "w:cellMerge",
    "w:tcPrChange",
];

/// Width shared out between the columns of a new table (16.5 cm text area)
pub const DEFAULT_TABLE_WIDTH_TWIPS: i64 = 9355;

/// Content of a table cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// A paragraph living in the document arena
    Paragraph(NodeId),
    /// Anything else (nested tables, bookmarks), kept verbatim
    Raw(XmlNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellModel {
    /// `w:tc` with its properties but without content
    pub element: XmlElement,
    pub content: Vec<CellContent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowModel {
    /// `w:tr` with its properties but without cells
    pub element: XmlElement,
    pub cells: Vec<CellModel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    /// `w:tbl` with its properties and grid but without rows
    pub element: XmlElement,
    pub rows: Vec<RowModel>,
}

impl CellModel {
    /// An empty cell of the given width holding paragraph `p`
    pub fn new(width_twips: i64, p: NodeId) -> Self {
        let tc_pr = XmlElement::new("w:tcPr").with_child(
            XmlElement::new("w:tcW")
                .with_attr("w:w", width_twips.to_string())
                .with_attr("w:type", "dxa"),
        );
        Self {
            element: XmlElement::new("w:tc").with_child(tc_pr),
            content: vec![CellContent::Paragraph(p)],
        }
    }

    /// Paragraph ids in order
    pub fn paragraphs(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.content.iter().filter_map(|c| match c {
            CellContent::Paragraph(id) => Some(*id),
            CellContent::Raw(_) => None,
        })
    }

    fn properties_mut(&mut self) -> &mut XmlElement {
        self.element.get_or_add_child("w:tcPr", &["w:tcPr"])
    }

    pub fn set_margins(&mut self, margins: &CellMargins) {
        let mut mar = XmlElement::new("w:tcMar");
        let sides = [
            ("w:top", margins.top),
            ("w:left", margins.left),
            ("w:bottom", margins.bottom),
            ("w:right", margins.right),
        ];
        for (side, width) in sides {
            if let Some(width) = width {
                mar.push(
                    XmlElement::new(side)
                        .with_attr("w:w", width.twips().to_string())
                        .with_attr("w:type", "dxa"),
                );
            }
        }
        self.properties_mut().set_child_ordered(mar, TCPR_ORDER);
    }

    pub fn set_vertical_alignment(&mut self, alignment: VerticalAlignment) {
        let val = match alignment {
            VerticalAlignment::Top => "top",
            VerticalAlignment::Center => "center",
            VerticalAlignment::Bottom => "bottom",
        };
        self.properties_mut()
            .set_child_ordered(XmlElement::new("w:vAlign").with_attr("w:val", val), TCPR_ORDER);
    }
}

impl RowModel {
    pub fn new(cells: Vec<CellModel>) -> Self {
        Self {
            element: XmlElement::new("w:tr"),
            cells,
        }
    }

    pub fn set_height(&mut self, height: Length, rule: HeightRule) {
        let rule = match rule {
            HeightRule::Auto => "auto",
            HeightRule::AtLeast => "atLeast",
            HeightRule::Exact => "exact",
        };
        let tr_pr = self.element.get_or_add_child("w:trPr", TR_ORDER);
        tr_pr.set_child_ordered(
            XmlElement::new("w:trHeight")
                .with_attr("w:val", height.twips().to_string())
                .with_attr("w:hRule", rule),
            TRPR_ORDER,
        );
    }
}

impl TableModel {
    /// A new table; `cell_paragraphs` yields one fresh paragraph id per cell
    /// in row-major order
    pub fn new(rows: usize, cols: usize, mut cell_paragraphs: impl FnMut() -> NodeId) -> Self {
        let cols = cols.max(1);
        let width = DEFAULT_TABLE_WIDTH_TWIPS / cols as i64;

        let tbl_pr = XmlElement::new("w:tblPr")
            .with_child(
                XmlElement::new("w:tblW")
                    .with_attr("w:w", "0")
                    .with_attr("w:type", "auto"),
            )
            .with_child(
                XmlElement::new("w:tblLook")
                    .with_attr("w:val", "04A0")
                    .with_attr("w:firstRow", "1")
                    .with_attr("w:lastRow", "0")
                    .with_attr("w:firstColumn", "1")
                    .with_attr("w:lastColumn", "0")
                    .with_attr("w:noHBand", "0")
                    .with_attr("w:noVBand", "1"),
            );
        let mut grid = XmlElement::new("w:tblGrid");
        for _ in 0..cols {
            grid.push(XmlElement::new("w:gridCol").with_attr("w:w", width.to_string()));
        }

        let rows = (0..rows)
            .map(|_| {
                RowModel::new(
                    (0..cols)
                        .map(|_| CellModel::new(width, cell_paragraphs()))
                        .collect(),
                )
            })
            .collect();

        Self {
            element: XmlElement::new("w:tbl").with_child(tbl_pr).with_child(grid),
            rows,
        }
    }

    /// Column widths from `w:tblGrid`, in twips
    pub fn grid_widths(&self) -> Vec<i64> {
        self.element
            .child("w:tblGrid")
            .map(|grid| {
                grid.children_named("w:gridCol")
                    .map(|c| c.attr("w:w").and_then(|w| w.parse().ok()).unwrap_or(0))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of columns: the grid if present, otherwise the widest row
    pub fn column_count(&self) -> usize {
        let grid = self.grid_widths().len();
        if grid > 0 {
            grid
        } else {
            self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
        }
    }

    /// Append a row with one cell per grid column
    pub fn add_row(&mut self, mut cell_paragraphs: impl FnMut() -> NodeId) -> usize {
        let mut widths = self.grid_widths();
        if widths.is_empty() {
            let cols = self.column_count().max(1);
            widths = vec![DEFAULT_TABLE_WIDTH_TWIPS / cols as i64; cols];
        }
        let cells = widths
            .into_iter()
            .map(|w| CellModel::new(w, cell_paragraphs()))
            .collect();
        self.rows.push(RowModel::new(cells));
        self.rows.len() - 1
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellModel> {
        self.rows.get(row)?.cells.get(col)
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut CellModel> {
        self.rows.get_mut(row)?.cells.get_mut(col)
    }

    /// Every paragraph id held by the table
    pub fn paragraph_ids(&self) -> Vec<NodeId> {
        self.rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .flat_map(|c| c.paragraphs())
            .collect()
    }

    fn properties_mut(&mut self) -> &mut XmlElement {
        self.element.get_or_add_child("w:tblPr", TBL_ORDER)
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        let val = match alignment {
            Alignment::Left | Alignment::Justify => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        };
        self.properties_mut()
            .set_child_ordered(XmlElement::new("w:jc").with_attr("w:val", val), TBLPR_ORDER);
    }

    pub fn set_borders(&mut self, borders: &TableBorders) {
        let mut element = XmlElement::new("w:tblBorders");
        for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
            element.push(
                XmlElement::new(edge)
                    .with_attr("w:val", borders.style.as_str())
                    .with_attr("w:sz", borders.size.to_string())
                    .with_attr("w:space", "0")
                    .with_attr("w:color", borders.color.as_str()),
            );
        }
        self.properties_mut().set_child_ordered(element, TBLPR_ORDER);
    }
}

/// Split a parsed `w:tbl` into a model; `register` stores each cell
/// paragraph and returns its id
pub fn from_element(
    mut tbl: XmlElement,
    register: &mut impl FnMut(XmlElement) -> NodeId,
) -> TableModel {
    let mut rows = Vec::new();
    let mut kept = Vec::new();
    for node in std::mem::take(&mut tbl.children) {
        match node {
            XmlNode::Element(e) if e.name == "w:tr" => rows.push(row_from_element(e, register)),
            XmlNode::Text(t) if t.trim().is_empty() => {}
            other => kept.push(other),
        }
    }
    tbl.children = kept;
    TableModel { element: tbl, rows }
}

fn row_from_element(
    mut tr: XmlElement,
    register: &mut impl FnMut(XmlElement) -> NodeId,
) -> RowModel {
    let mut cells = Vec::new();
    let mut kept = Vec::new();
    for node in std::mem::take(&mut tr.children) {
        match node {
            XmlNode::Element(e) if e.name == "w:tc" => cells.push(cell_from_element(e, register)),
            XmlNode::Text(t) if t.trim().is_empty() => {}
            other => kept.push(other),
        }
    }
    tr.children = kept;
    RowModel { element: tr, cells }
}

fn cell_from_element(
    mut tc: XmlElement,
    register: &mut impl FnMut(XmlElement) -> NodeId,
) -> CellModel {
    let mut content = Vec::new();
    let mut kept = Vec::new();
    for node in std::mem::take(&mut tc.children) {
        match node {
            XmlNode::Element(e) if e.name == "w:tcPr" => kept.push(XmlNode::Element(e)),
            XmlNode::Element(e) if e.name == "w:p" => {
                content.push(CellContent::Paragraph(register(e)))
            }
            XmlNode::Text(t) if t.trim().is_empty() => {}
            other => content.push(CellContent::Raw(other)),
        }
    }
    tc.children = kept;
    CellModel { element: tc, content }
}

/// Reassemble the full `w:tbl` element; `paragraph` resolves cell
/// paragraph ids
pub fn to_element<'a>(
    table: &TableModel,
    paragraph: &impl Fn(NodeId) -> Option<&'a XmlElement>,
) -> XmlElement {
    let mut tbl = table.element.clone();
    for row in &table.rows {
        let mut tr = row.element.clone();
        for cell in &row.cells {
            let mut tc = cell.element.clone();
            let mut has_paragraph = false;
            for content in &cell.content {
                match content {
                    CellContent::Paragraph(id) => {
                        if let Some(p) = paragraph(*id) {
                            tc.push(p.clone());
                            has_paragraph = true;
                        }
                    }
                    CellContent::Raw(node) => tc.children.push(node.clone()),
                }
            }
            // A cell must end with a paragraph
            if !has_paragraph {
                tc.push(XmlElement::new("w:p"));
            }
            tr.push(tc);
        }
        tbl.push(tr);
    }
    tbl
}
