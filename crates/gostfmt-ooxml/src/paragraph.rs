//! Paragraph (`w:p`) reading and editing
//!
//! Functions here operate on a single paragraph element. Child elements of
//! `w:pPr` and `w:rPr` are always inserted in schema order so the output
//! validates against the WordprocessingML sequence definitions.

use gostfmt_ast::{
    Alignment, Length, Numbering, ParagraphFormat, RunFormat, RunInfo, TabAlignment, TabStop,
};

use crate::xml::{XmlElement, XmlNode};

/// `w:pPr` child sequence
pub(crate) const PPR_ORDER: &[&str] = &[
    "w:pStyle",
    "w:keepNext",
    "w:keepLines",
    "w:pageBreakBefore",
    "w:framePr",
    "w:widowControl",
    "w:numPr",
    "w:suppressLineNumbers",
    "w:pBdr",
    "w:shd",
    "w:tabs",
    "w:suppressAutoHyphens",
    "w:kinsoku",
    "w:wordWrap",
    "w:overflowPunct",
    "w:topLinePunct",
    "w:autoSpaceDE",
    "w:autoSpaceDN",
    "w:bidi",
    "w:adjustRightInd",
    "w:snapToGrid",
    "w:spacing",
    "w:ind",
    "w:contextualSpacing",
    "w:mirrorIndents",
    "w:suppressOverlap",
    "w:jc",
    "w:textDirection",
    "w:textAlignment",
    "w:textboxTightWrap",
    "w:outlineLvl",
    "w:divId",
    "w:cnfStyle",
    "w:rPr",
    "w:sectPr",
    "w:pPrChange",
];

/// `w:rPr` child sequence
pub(crate) const RPR_ORDER: &[&str] = &[
    "w:rStyle",
    "w:rFonts",
    "w:b",
    "w:bCs",
    "w:i",
    "w:iCs",
    "w:caps",
    "w:smallCaps",
    "w:strike",
    "w:dstrike",
    "w:outline",
    "w:shadow",
    "w:emboss",
    "w:imprint",
    "w:noProof",
    "w:snapToGrid",
    "w:vanish",
    "w:webHidden",
    "w:color",
    "w:spacing",
    "w:w",
    "w:kern",
    "w:position",
    "w:sz",
    "w:szCs",
    "w:highlight",
    "w:u",
    "w:effect",
    "w:bdr",
    "w:shd",
    "w:fitText",
    "w:vertAlign",
    "w:rtl",
    "w:cs",
    "w:em",
    "w:lang",
    "w:eastAsianLayout",
    "w:specVanish",
    "w:oMath",
];

/// `w:p` children: properties first, content after
const P_ORDER: &[&str] = &["w:pPr"];

/// Inline containers whose runs count as paragraph content
const RUN_CONTAINERS: &[&str] = &[
    "w:hyperlink",
    "w:ins",
    "w:smartTag",
    "w:fldSimple",
    "w:customXml",
];

/// Single line spacing in `w:spacing/@w:line` units
const LINE_UNIT: f64 = 240.0;

/// A new, empty paragraph element
pub fn new_paragraph() -> XmlElement {
    XmlElement::new("w:p")
}

/// Paragraph properties, if any
pub fn properties(p: &XmlElement) -> Option<&XmlElement> {
    p.child("w:pPr")
}

fn properties_mut(p: &mut XmlElement) -> &mut XmlElement {
    p.get_or_add_child("w:pPr", P_ORDER)
}

/// Runs of the paragraph in reading order, including runs nested in
/// hyperlinks, insertions and similar inline containers
pub fn run_elements(p: &XmlElement) -> Vec<&XmlElement> {
    let mut runs = Vec::new();
    collect_runs(p, &mut runs);
    runs
}

fn collect_runs<'a>(parent: &'a XmlElement, out: &mut Vec<&'a XmlElement>) {
    for child in parent.elements() {
        if child.name == "w:r" {
            out.push(child);
        } else if RUN_CONTAINERS.contains(&child.name.as_str()) {
            collect_runs(child, out);
        }
    }
}

fn for_each_run_mut(parent: &mut XmlElement, f: &mut impl FnMut(&mut XmlElement)) {
    for child in parent.elements_mut() {
        if child.name == "w:r" {
            f(child);
        } else if RUN_CONTAINERS.contains(&child.name.as_str()) {
            for_each_run_mut(child, f);
        }
    }
}

/// Text of a single run
pub fn run_text(run: &XmlElement) -> String {
    let mut text = String::new();
    for child in run.elements() {
        match child.name.as_str() {
            "w:t" => text.push_str(&child.text()),
            "w:tab" => text.push('\t'),
            "w:cr" => text.push('\n'),
            "w:br" => match child.attr("w:type") {
                None | Some("textWrapping") => text.push('\n'),
                _ => {}
            },
            "w:noBreakHyphen" => text.push('-'),
            _ => {}
        }
    }
    text
}

/// Visible text of the paragraph
pub fn text(p: &XmlElement) -> String {
    run_elements(p).into_iter().map(run_text).collect()
}

/// Style id referenced by `w:pPr/w:pStyle`
pub fn style(p: &XmlElement) -> Option<String> {
    properties(p)?
        .child("w:pStyle")?
        .attr("w:val")
        .map(str::to_string)
}

pub fn set_style(p: &mut XmlElement, style_id: &str) {
    properties_mut(p).set_child_ordered(
        XmlElement::new("w:pStyle").with_attr("w:val", style_id),
        PPR_ORDER,
    );
}

/// Direct outline level (0-based)
pub fn outline_level(p: &XmlElement) -> Option<u8> {
    properties(p)?
        .child("w:outlineLvl")?
        .attr("w:val")?
        .parse()
        .ok()
}

/// Direct numbering properties
pub fn numbering(p: &XmlElement) -> Option<Numbering> {
    let num_pr = properties(p)?.child("w:numPr")?;
    let value = |name: &str| {
        num_pr
            .child(name)
            .and_then(|e| e.attr("w:val"))
            .and_then(|v| v.parse().ok())
    };
    Some(Numbering {
        num_id: value("w:numId"),
        ilvl: value("w:ilvl"),
    })
}

pub fn clear_numbering(p: &mut XmlElement) {
    if let Some(ppr) = p.child_mut("w:pPr") {
        ppr.remove_children("w:numPr");
    }
}

/// A run of the paragraph embeds a `w:drawing`
pub fn has_drawing(p: &XmlElement) -> bool {
    run_elements(p)
        .into_iter()
        .any(|r| r.has_descendant("w:drawing"))
}

/// The paragraph embeds a drawing or a VML picture anywhere
pub fn has_picture(p: &XmlElement) -> bool {
    p.has_descendant("w:drawing") || p.has_descendant("w:pict")
}

/// The paragraph contains a `w:br` anywhere
pub fn has_line_break(p: &XmlElement) -> bool {
    p.has_descendant("w:br")
}

fn alignment_value(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

fn parse_alignment(value: &str) -> Option<Alignment> {
    match value {
        "left" | "start" => Some(Alignment::Left),
        "center" => Some(Alignment::Center),
        "right" | "end" => Some(Alignment::Right),
        "both" | "distribute" => Some(Alignment::Justify),
        _ => None,
    }
}

/// Merge direct formatting into `w:pPr`
pub fn apply_format(p: &mut XmlElement, format: &ParagraphFormat) {
    if format.is_empty() {
        return;
    }
    let ppr = properties_mut(p);
    apply_format_to_properties(ppr, format);
}

/// Merge formatting into a `w:pPr` element (paragraph or style)
pub(crate) fn apply_format_to_properties(ppr: &mut XmlElement, format: &ParagraphFormat) {
    match format.page_break_before {
        Some(true) => {
            ppr.set_child_ordered(XmlElement::new("w:pageBreakBefore"), PPR_ORDER);
        }
        Some(false) => {
            ppr.remove_children("w:pageBreakBefore");
        }
        None => {}
    }

    if !format.tab_stops.is_empty() {
        let mut tabs = XmlElement::new("w:tabs");
        for stop in &format.tab_stops {
            let val = match stop.alignment {
                TabAlignment::Left => "left",
                TabAlignment::Center => "center",
                TabAlignment::Right => "right",
            };
            tabs.push(
                XmlElement::new("w:tab")
                    .with_attr("w:val", val)
                    .with_attr("w:pos", stop.position.twips().to_string()),
            );
        }
        ppr.set_child_ordered(tabs, PPR_ORDER);
    }

    if format.line_spacing.is_some()
        || format.space_before.is_some()
        || format.space_after.is_some()
    {
        let spacing = ppr.get_or_add_child("w:spacing", PPR_ORDER);
        if let Some(before) = format.space_before {
            spacing.set_attr("w:before", before.twips().to_string());
        }
        if let Some(after) = format.space_after {
            spacing.set_attr("w:after", after.twips().to_string());
        }
        if let Some(line) = format.line_spacing {
            spacing.set_attr("w:line", ((line * LINE_UNIT).round() as i64).to_string());
            spacing.set_attr("w:lineRule", "auto");
        }
    }

    if format.left_indent.is_some()
        || format.first_line_indent.is_some()
        || format.hanging_indent.is_some()
    {
        let ind = ppr.get_or_add_child("w:ind", PPR_ORDER);
        if let Some(left) = format.left_indent {
            ind.remove_attr("w:start");
            ind.set_attr("w:left", left.twips().to_string());
        }
        if let Some(first) = format.first_line_indent {
            ind.remove_attr("w:hanging");
            ind.set_attr("w:firstLine", first.twips().to_string());
        }
        if let Some(hanging) = format.hanging_indent {
            ind.remove_attr("w:firstLine");
            ind.set_attr("w:hanging", hanging.twips().to_string());
        }
    }

    if let Some(alignment) = format.alignment {
        ppr.set_child_ordered(
            XmlElement::new("w:jc").with_attr("w:val", alignment_value(alignment)),
            PPR_ORDER,
        );
    }
}

/// Direct paragraph formatting currently set
pub fn read_format(p: &XmlElement) -> ParagraphFormat {
    let mut format = ParagraphFormat::default();
    let Some(ppr) = properties(p) else {
        return format;
    };

    let twips = |e: &XmlElement, name: &str| {
        e.attr(name)
            .and_then(|v| v.parse::<i64>().ok())
            .map(Length::from_twips)
    };

    format.alignment = ppr
        .child("w:jc")
        .and_then(|jc| jc.attr("w:val"))
        .and_then(parse_alignment);
    format.page_break_before = ppr
        .child("w:pageBreakBefore")
        .map(|e| on_off(e.attr("w:val")));

    if let Some(spacing) = ppr.child("w:spacing") {
        format.space_before = twips(spacing, "w:before");
        format.space_after = twips(spacing, "w:after");
        format.line_spacing = spacing
            .attr("w:line")
            .and_then(|v| v.parse::<f64>().ok())
            .map(|v| v / LINE_UNIT);
    }

    if let Some(ind) = ppr.child("w:ind") {
        format.left_indent = twips(ind, "w:left").or_else(|| twips(ind, "w:start"));
        format.first_line_indent = twips(ind, "w:firstLine");
        format.hanging_indent = twips(ind, "w:hanging");
    }

    if let Some(tabs) = ppr.child("w:tabs") {
        format.tab_stops = tabs
            .children_named("w:tab")
            .filter_map(|tab| {
                let alignment = match tab.attr("w:val")? {
                    "center" => TabAlignment::Center,
                    "right" | "end" => TabAlignment::Right,
                    "left" | "start" => TabAlignment::Left,
                    _ => return None,
                };
                Some(TabStop {
                    position: twips(tab, "w:pos")?,
                    alignment,
                })
            })
            .collect();
    }

    format
}

/// Interpret an ST_OnOff value; a missing value means "on"
fn on_off(value: Option<&str>) -> bool {
    !matches!(value, Some("0" | "false" | "off"))
}

fn toggle(name: &str, on: bool) -> XmlElement {
    let element = XmlElement::new(name);
    if on {
        element
    } else {
        element.with_attr("w:val", "0")
    }
}

/// Merge character formatting into a `w:rPr` element (run or style)
pub(crate) fn apply_run_format_to_properties(rpr: &mut XmlElement, format: &RunFormat) {
    if let Some(name) = &format.font_name {
        let fonts = rpr.get_or_add_child("w:rFonts", RPR_ORDER);
        fonts.remove_attr("w:asciiTheme");
        fonts.remove_attr("w:hAnsiTheme");
        fonts.remove_attr("w:cstheme");
        fonts.set_attr("w:ascii", name.as_str());
        fonts.set_attr("w:hAnsi", name.as_str());
        fonts.set_attr("w:cs", name.as_str());
    }
    if let Some(bold) = format.bold {
        rpr.set_child_ordered(toggle("w:b", bold), RPR_ORDER);
    }
    if let Some(italic) = format.italic {
        rpr.set_child_ordered(toggle("w:i", italic), RPR_ORDER);
    }
    if let Some(caps) = format.all_caps {
        rpr.set_child_ordered(toggle("w:caps", caps), RPR_ORDER);
    }
    if let Some(size) = format.font_size {
        let half_points = size.half_points().to_string();
        rpr.set_child_ordered(
            XmlElement::new("w:sz").with_attr("w:val", half_points.clone()),
            RPR_ORDER,
        );
        rpr.set_child_ordered(
            XmlElement::new("w:szCs").with_attr("w:val", half_points),
            RPR_ORDER,
        );
    }
}

fn apply_run_format(run: &mut XmlElement, format: &RunFormat) {
    if format.is_empty() {
        return;
    }
    let rpr = run.get_or_add_child("w:rPr", &["w:rPr"]);
    apply_run_format_to_properties(rpr, format);
}

/// Direct formatting of a run
pub fn read_run_format(run: &XmlElement) -> RunFormat {
    let mut format = RunFormat::default();
    let Some(rpr) = run.child("w:rPr") else {
        return format;
    };
    let flag = |name: &str| rpr.child(name).map(|e| on_off(e.attr("w:val")));
    format.bold = flag("w:b");
    format.italic = flag("w:i");
    format.all_caps = flag("w:caps");
    format.font_name = rpr
        .child("w:rFonts")
        .and_then(|f| f.attr("w:ascii").or_else(|| f.attr("w:hAnsi")))
        .map(str::to_string);
    format.font_size = rpr
        .child("w:sz")
        .and_then(|sz| sz.attr("w:val"))
        .and_then(|v| v.parse::<f64>().ok())
        .map(|half_points| Length::from_pt(half_points / 2.0));
    format
}

pub fn runs(p: &XmlElement) -> Vec<RunInfo> {
    run_elements(p)
        .into_iter()
        .map(|r| RunInfo {
            text: run_text(r),
            format: read_run_format(r),
        })
        .collect()
}

/// Build a run element; `\t` and `\n` become `w:tab` and `w:br`
pub fn new_run(text: &str, format: &RunFormat) -> XmlElement {
    let mut run = XmlElement::new("w:r");
    apply_run_format(&mut run, format);

    let mut segment = String::new();
    let flush = |run: &mut XmlElement, segment: &mut String| {
        if !segment.is_empty() {
            run.push(
                XmlElement::new("w:t")
                    .with_attr("xml:space", "preserve")
                    .with_text(std::mem::take(segment)),
            );
        }
    };
    for ch in text.chars() {
        match ch {
            '\t' => {
                flush(&mut run, &mut segment);
                run.push(XmlElement::new("w:tab"));
            }
            '\n' => {
                flush(&mut run, &mut segment);
                run.push(XmlElement::new("w:br"));
            }
            _ => segment.push(ch),
        }
    }
    flush(&mut run, &mut segment);
    run
}

pub fn add_run(p: &mut XmlElement, text: &str, format: &RunFormat) {
    p.push(new_run(text, format));
}

/// Merge direct formatting into every run
pub fn format_runs(p: &mut XmlElement, format: &RunFormat) {
    for_each_run_mut(p, &mut |run| apply_run_format(run, format));
}

/// Drop all paragraph content except its properties and add a single
/// unformatted run holding `text`
pub fn replace_text(p: &mut XmlElement, text: &str) {
    p.children
        .retain(|n| matches!(n, XmlNode::Element(e) if e.name == "w:pPr"));
    if !text.is_empty() {
        p.push(new_run(text, &RunFormat::default()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;

    fn para(xml: &str) -> XmlElement {
        parse(xml.as_bytes()).unwrap()
    }

    fn serialize(e: &XmlElement) -> String {
        let mut out = String::new();
        e.write_to(&mut out);
        out
    }

    #[test]
    fn test_text_includes_tabs_breaks_and_hyperlinks() {
        let p = para(
            r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t></w:r><w:hyperlink><w:r><w:t>c</w:t><w:br/></w:r></w:hyperlink><w:r><w:br w:type="page"/></w:r></w:p>"#,
        );
        assert_eq!(text(&p), "a\tbc\n");
    }

    #[test]
    fn test_style_roundtrip() {
        let mut p = para(r#"<w:p><w:pPr><w:jc w:val="left"/></w:pPr></w:p>"#);
        assert_eq!(style(&p), None);
        set_style(&mut p, "Heading2");
        assert_eq!(style(&p).as_deref(), Some("Heading2"));
        // pStyle precedes jc
        let ppr = properties(&p).unwrap();
        let names: Vec<&str> = ppr.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:pStyle", "w:jc"]);
    }

    #[test]
    fn test_numbering_and_outline() {
        let mut p = para(
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="1"/><w:numId w:val="4"/></w:numPr><w:outlineLvl w:val="2"/></w:pPr></w:p>"#,
        );
        assert_eq!(
            numbering(&p),
            Some(Numbering {
                num_id: Some(4),
                ilvl: Some(1)
            })
        );
        assert_eq!(outline_level(&p), Some(2));

        clear_numbering(&mut p);
        assert_eq!(numbering(&p), None);
    }

    #[test]
    fn test_drawing_detection() {
        let image = para(r#"<w:p><w:r><w:drawing><wp:inline/></w:drawing></w:r></w:p>"#);
        assert!(has_drawing(&image));
        assert!(has_picture(&image));

        let vml = para(r#"<w:p><w:r><w:pict/></w:r></w:p>"#);
        assert!(!has_drawing(&vml));
        assert!(has_picture(&vml));
    }

    #[test]
    fn test_apply_format_writes_schema_order() {
        let mut p = new_paragraph();
        apply_format(
            &mut p,
            &ParagraphFormat {
                alignment: Some(Alignment::Justify),
                line_spacing: Some(1.5),
                space_before: Some(Length::from_pt(12.0)),
                space_after: Some(Length::from_pt(6.0)),
                page_break_before: Some(true),
                first_line_indent: Some(Length::from_cm(1.25)),
                ..ParagraphFormat::default()
            },
        );

        assert_eq!(
            serialize(&p),
            r#"<w:p><w:pPr><w:pageBreakBefore/><w:spacing w:before="240" w:after="120" w:line="360" w:lineRule="auto"/><w:ind w:firstLine="709"/><w:jc w:val="both"/></w:pPr></w:p>"#
        );

        let back = read_format(&p);
        assert_eq!(back.alignment, Some(Alignment::Justify));
        assert_eq!(back.line_spacing, Some(1.5));
        assert_eq!(back.page_break_before, Some(true));
        assert_eq!(back.space_before, Some(Length::from_pt(12.0)));
    }

    #[test]
    fn test_first_line_and_hanging_are_exclusive() {
        let mut p = new_paragraph();
        apply_format(
            &mut p,
            &ParagraphFormat {
                hanging_indent: Some(Length::from_cm(0.5)),
                ..ParagraphFormat::default()
            },
        );
        apply_format(
            &mut p,
            &ParagraphFormat {
                first_line_indent: Some(Length::ZERO),
                left_indent: Some(Length::from_cm(1.25)),
                ..ParagraphFormat::default()
            },
        );
        let format = read_format(&p);
        assert_eq!(format.hanging_indent, None);
        assert_eq!(format.first_line_indent, Some(Length::ZERO));
        assert_eq!(format.left_indent, Some(Length::from_twips(709)));
    }

    #[test]
    fn test_add_run_with_format_and_controls() {
        let mut p = new_paragraph();
        add_run(
            &mut p,
            "x\ty",
            &RunFormat::new()
                .font("Times New Roman", Length::from_pt(14.0))
                .bold(true),
        );
        assert_eq!(
            serialize(&p),
            r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman" w:cs="Times New Roman"/><w:b/><w:sz w:val="28"/><w:szCs w:val="28"/></w:rPr><w:t xml:space="preserve">x</w:t><w:tab/><w:t xml:space="preserve">y</w:t></w:r></w:p>"#
        );

        let runs = runs(&p);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "x\ty");
        assert_eq!(runs[0].format.bold, Some(true));
        assert_eq!(runs[0].format.font_size, Some(Length::from_pt(14.0)));
    }

    #[test]
    fn test_format_runs_reaches_hyperlink_runs() {
        let mut p = para(
            r#"<w:p><w:r><w:t>a</w:t></w:r><w:hyperlink><w:r><w:t>b</w:t></w:r></w:hyperlink></w:p>"#,
        );
        format_runs(&mut p, &RunFormat::new().italic(true));
        assert!(runs(&p).iter().all(|r| r.format.italic == Some(true)));
    }

    #[test]
    fn test_replace_text_keeps_properties_only() {
        let mut p = para(
            r#"<w:p><w:pPr><w:pStyle w:val="X"/></w:pPr><w:bookmarkStart w:id="1"/><w:r><w:rPr><w:b/></w:rPr><w:t>old</w:t></w:r></w:p>"#,
        );
        replace_text(&mut p, "new");
        assert_eq!(text(&p), "new");
        assert_eq!(style(&p).as_deref(), Some("X"));
        assert_eq!(runs(&p)[0].format, RunFormat::default());
        assert!(!p.has_descendant("w:bookmarkStart"));
    }
}
