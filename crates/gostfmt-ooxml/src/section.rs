//! Section properties (`w:sectPr`) and footer parts

use gostfmt_ast::{FooterFormat, Orientation, PageGeometry, ParagraphFormat};

use crate::paragraph;
use crate::xml::{XmlElement, XmlNode};

/// `w:sectPr` child sequence
const SECTPR_ORDER: &[&str] = &[
    "w:headerReference",
    "w:footerReference",
    "w:footnotePr",
    "w:endnotePr",
    "w:type",
    "w:pgSz",
    "w:pgMar",
    "w:paperSrc",
    "w:pgBorders",
    "w:lnNumType",
    "w:pgNumType",
    "w:cols",
    "w:formProt",
    "w:vAlign",
    "w:noEndnote",
    "w:titlePg",
    "w:textDirection",
    "w:bidi",
    "w:rtlGutter",
    "w:docGrid",
    "w:printerSettings",
    "w:sectPrChange",
];

pub const WORDPROCESSING_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const RELATIONSHIPS_DOC_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const FOOTER_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";

/// Default header/footer distance in twips (1.25 cm)
const DEFAULT_HEADER_FOOTER_DISTANCE: &str = "708";

/// Write page size, orientation and margins
pub fn set_page_geometry(sect_pr: &mut XmlElement, geometry: &PageGeometry) {
    let pg_sz = sect_pr.get_or_add_child("w:pgSz", SECTPR_ORDER);
    pg_sz.set_attr("w:w", geometry.width.twips().to_string());
    pg_sz.set_attr("w:h", geometry.height.twips().to_string());
    match geometry.orientation {
        Orientation::Portrait => pg_sz.remove_attr("w:orient"),
        Orientation::Landscape => pg_sz.set_attr("w:orient", "landscape"),
    }

    let pg_mar = sect_pr.get_or_add_child("w:pgMar", SECTPR_ORDER);
    pg_mar.set_attr("w:top", geometry.margin_top.twips().to_string());
    pg_mar.set_attr("w:right", geometry.margin_right.twips().to_string());
    pg_mar.set_attr("w:bottom", geometry.margin_bottom.twips().to_string());
    pg_mar.set_attr("w:left", geometry.margin_left.twips().to_string());
    for required in ["w:header", "w:footer"] {
        if pg_mar.attr(required).is_none() {
            pg_mar.set_attr(required, DEFAULT_HEADER_FOOTER_DISTANCE);
        }
    }
    if pg_mar.attr("w:gutter").is_none() {
        pg_mar.set_attr("w:gutter", "0");
    }
}

/// Relationship id of the section's default footer
pub fn default_footer_id(sect_pr: &XmlElement) -> Option<&str> {
    sect_pr
        .children_named("w:footerReference")
        .find(|r| matches!(r.attr("w:type"), None | Some("default")))
        .and_then(|r| r.attr("r:id"))
}

/// Point the section's default footer at relationship `rel_id`
pub fn set_default_footer(sect_pr: &mut XmlElement, rel_id: &str) {
    sect_pr.children.retain(|n| {
        !matches!(n, XmlNode::Element(e)
            if e.name == "w:footerReference" && matches!(e.attr("w:type"), None | Some("default")))
    });
    sect_pr.insert_ordered(
        XmlElement::new("w:footerReference")
            .with_attr("w:type", "default")
            .with_attr("r:id", rel_id),
        SECTPR_ORDER,
    );
}

/// Paragraph holding a `PAGE` field laid out per `format`
pub fn page_number_paragraph(format: &FooterFormat) -> XmlElement {
    let mut p = paragraph::new_paragraph();
    if let Some(style_id) = &format.style_id {
        paragraph::set_style(&mut p, style_id);
    }
    paragraph::apply_format(
        &mut p,
        &ParagraphFormat {
            alignment: Some(format.alignment),
            first_line_indent: Some(format.first_line_indent),
            left_indent: Some(format.left_indent),
            ..ParagraphFormat::default()
        },
    );

    let mut run = paragraph::new_run("", &format.run);
    run.push(XmlElement::new("w:fldChar").with_attr("w:fldCharType", "begin"));
    run.push(
        XmlElement::new("w:instrText")
            .with_attr("xml:space", "preserve")
            .with_text("PAGE"),
    );
    run.push(XmlElement::new("w:fldChar").with_attr("w:fldCharType", "end"));
    p.push(run);
    p
}

/// A complete footer part containing only the page number paragraph
pub fn footer_part(format: &FooterFormat) -> XmlElement {
    XmlElement::new("w:ftr")
        .with_attr("xmlns:w", WORDPROCESSING_NS)
        .with_attr("xmlns:r", RELATIONSHIPS_DOC_NS)
        .with_child(page_number_paragraph(format))
}
