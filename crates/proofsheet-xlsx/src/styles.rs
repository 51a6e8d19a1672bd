//! The styles part: turning cell styles into `cellXfs` entries and back

use std::collections::HashMap;
use std::hash::Hash;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::XlsxResult;
use crate::writer::escape_xml;
use proofsheet_core::style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, PatternType, Style, Underline, VerticalAlignment,
};
use proofsheet_core::Workbook;

/// First id available for custom number formats
const FIRST_CUSTOM_NUMFMT_ID: u32 = 164;

/// Fill slots Excel reserves ahead of any custom fill (`none`, `gray125`)
const RESERVED_FILLS: u32 = 2;

/// Every style used anywhere in a workbook, deduplicated, in `cellXfs` order.
/// Slot 0 is always the default style.
#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    styles: Vec<Style>,
    /// Per sheet: worksheet style index -> `cellXfs` index
    sheet_maps: Vec<HashMap<u32, u32>>,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut xfs = Interner::default();
        xfs.id_of(Style::default());

        let sheet_maps = workbook
            .worksheets()
            .map(|sheet| {
                let mut map = HashMap::from([(0, 0)]);
                for (_, _, cell) in sheet.iter_cells() {
                    map.entry(cell.style_index).or_insert_with(|| {
                        let style = sheet
                            .style_by_index(cell.style_index)
                            .cloned()
                            .unwrap_or_default();
                        xfs.id_of(style)
                    });
                }
                map
            })
            .collect();

        Self {
            styles: xfs.items,
            sheet_maps,
        }
    }

    /// 0, the default xf, for anything unknown
    pub(crate) fn xf_id_for(&self, sheet_index: usize, local_style_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|map| map.get(&local_style_index))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut fonts = Interner::default();
        let mut fills = Interner::default();
        let mut borders = Interner::default();
        let mut custom_formats = Interner::default();

        let xfs: Vec<String> = self
            .styles
            .iter()
            .map(|style| {
                let num_fmt_id = match &style.number_format {
                    NumberFormat::General => 0,
                    NumberFormat::BuiltIn(id) => *id,
                    NumberFormat::Custom(code) => {
                        FIRST_CUSTOM_NUMFMT_ID + custom_formats.id_of(code.as_str())
                    }
                };
                let fill_id = match &style.fill {
                    FillStyle::None => 0,
                    fill => RESERVED_FILLS + fills.id_of(fill),
                };
                write_xf(
                    style,
                    [
                        num_fmt_id,
                        fonts.id_of(&style.font),
                        fill_id,
                        borders.id_of(&style.border),
                    ],
                )
            })
            .collect();

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !custom_formats.items.is_empty() {
            let entries = custom_formats.items.iter().zip(FIRST_CUSTOM_NUMFMT_ID..);
            push_list(&mut xml, "numFmts", entries.map(|(code, id)| {
                format!("<numFmt numFmtId=\"{}\" formatCode=\"{}\"/>", id, escape_xml(code))
            }));
        }
        push_list(&mut xml, "fonts", fonts.items.iter().map(|f| write_font(f)));
        push_list(
            &mut xml,
            "fills",
            [
                "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
                "<fill><patternFill patternType=\"gray125\"/></fill>".to_string(),
            ]
            .into_iter()
            .chain(fills.items.iter().map(|f| write_fill(f))),
        );
        push_list(&mut xml, "borders", borders.items.iter().map(|b| write_border(b)));
        push_list(
            &mut xml,
            "cellStyleXfs",
            std::iter::once(r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>"#.to_string()),
        );
        push_list(&mut xml, "cellXfs", xfs.into_iter());
        push_list(
            &mut xml,
            "cellStyles",
            std::iter::once(r#"<cellStyle name="Normal" xfId="0" builtinId="0"/>"#.to_string()),
        );
        xml.push_str("\n  <dxfs count=\"0\"/>\n</styleSheet>");
        xml
    }
}

/// Hands out dense ids in first-seen order
#[derive(Debug)]
struct Interner<T> {
    items: Vec<T>,
    ids: HashMap<T, u32>,
}

impl<T> Default for Interner<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            ids: HashMap::new(),
        }
    }
}

impl<T: Hash + Eq + Clone> Interner<T> {
    fn id_of(&mut self, item: T) -> u32 {
        if let Some(&id) = self.ids.get(&item) {
            return id;
        }
        let id = self.items.len() as u32;
        self.items.push(item.clone());
        self.ids.insert(item, id);
        id
    }
}

/// `<tag count="n">` followed by one indented line per entry
fn push_list(xml: &mut String, tag: &str, entries: impl Iterator<Item = String>) {
    let entries: Vec<String> = entries.collect();
    xml.push_str(&format!("\n  <{} count=\"{}\">", tag, entries.len()));
    for entry in entries {
        xml.push_str("\n    ");
        xml.push_str(&entry);
    }
    xml.push_str(&format!("\n  </{}>", tag));
}

/// Append ` name="1"` for every set flag
fn push_flags(out: &mut String, flags: &[(&str, bool)]) {
    for (name, _) in flags.iter().filter(|(_, set)| *set) {
        out.push_str(&format!(" {}=\"1\"", name));
    }
}

fn color_attrs(color: &Color) -> String {
    match color {
        Color::Auto => " auto=\"1\"".to_string(),
        Color::Rgb { .. } | Color::Argb { .. } => {
            format!(" rgb=\"{}\"", color.to_argb_hex().unwrap_or_default())
        }
        Color::Indexed(i) => format!(" indexed=\"{}\"", i),
        Color::Theme { index, tint: 0 } => format!(" theme=\"{}\"", index),
        Color::Theme { index, tint } => {
            format!(" theme=\"{}\" tint=\"{}\"", index, f64::from(*tint) / 100.0)
        }
    }
}

fn write_font(font: &FontStyle) -> String {
    let mut out = String::from("<font>");
    for (tag, on) in [("b", font.bold), ("i", font.italic), ("strike", font.strikethrough)] {
        if on {
            out.push_str(&format!("<{}/>", tag));
        }
    }
    match font.underline {
        Underline::None => {}
        Underline::Single => out.push_str("<u/>"),
        other => out.push_str(&format!("<u val=\"{}\"/>", other.ooxml_name())),
    }
    out.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        out.push_str(&format!("<color{}/>", color_attrs(&font.color)));
    }
    out.push_str(&format!("<name val=\"{}\"/></font>", escape_xml(&font.name)));
    out
}

fn write_fill(fill: &FillStyle) -> String {
    let (pattern, colors) = match fill {
        FillStyle::None => ("none", String::new()),
        FillStyle::Solid { color } => (
            "solid",
            format!("<fgColor{}/><bgColor indexed=\"64\"/>", color_attrs(color)),
        ),
        FillStyle::Pattern {
            pattern,
            foreground,
            background,
        } => (
            pattern.ooxml_name(),
            format!(
                "<fgColor{}/><bgColor{}/>",
                color_attrs(foreground),
                color_attrs(background)
            ),
        ),
    };
    if colors.is_empty() {
        format!("<fill><patternFill patternType=\"{}\"/></fill>", pattern)
    } else {
        format!(
            "<fill><patternFill patternType=\"{}\">{}</patternFill></fill>",
            pattern, colors
        )
    }
}

fn write_border(border: &BorderStyle) -> String {
    let sides = [
        ("left", &border.left),
        ("right", &border.right),
        ("top", &border.top),
        ("bottom", &border.bottom),
    ];
    let body: String = sides
        .iter()
        .map(|(tag, edge)| match edge {
            None => format!("<{tag}/>"),
            Some(edge) => format!(
                "<{tag} style=\"{}\"><color{}/></{tag}>",
                edge.style.ooxml_name(),
                color_attrs(&edge.color)
            ),
        })
        .collect();
    format!("<border>{body}<diagonal/></border>")
}

/// Empty when the alignment is the default one
fn write_alignment(al: &Alignment) -> String {
    let default = Alignment::default();
    if *al == default {
        return String::new();
    }

    let mut out = String::from("<alignment");
    if al.horizontal != default.horizontal {
        out.push_str(&format!(" horizontal=\"{}\"", al.horizontal.ooxml_name()));
    }
    if al.vertical != default.vertical {
        out.push_str(&format!(" vertical=\"{}\"", al.vertical.ooxml_name()));
    }
    push_flags(
        &mut out,
        &[("wrapText", al.wrap_text), ("shrinkToFit", al.shrink_to_fit)],
    );
    for (name, value) in [("indent", al.indent as i32), ("textRotation", al.rotation as i32)] {
        if value != 0 {
            out.push_str(&format!(" {}=\"{}\"", name, value));
        }
    }
    out.push_str("/>");
    out
}

/// `ids` is (numFmtId, fontId, fillId, borderId)
fn write_xf(style: &Style, ids: [u32; 4]) -> String {
    let [num_fmt_id, font_id, fill_id, border_id] = ids;
    let alignment = write_alignment(&style.alignment);

    let mut out = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"",
        num_fmt_id, font_id, fill_id, border_id
    );
    push_flags(
        &mut out,
        &[
            ("applyNumberFormat", num_fmt_id != 0),
            ("applyFont", font_id != 0),
            ("applyFill", fill_id != 0),
            ("applyBorder", border_id != 0),
            ("applyAlignment", !alignment.is_empty()),
        ],
    );
    if alignment.is_empty() {
        out.push_str("/>");
    } else {
        out.push_str(&format!(">{}</xf>", alignment));
    }
    out
}

// === Reading ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    NumFmts,
    Fonts,
    Fills,
    Borders,
    CellXfs,
    Skipped,
}

#[derive(Debug, Default)]
struct XfRecord {
    num_fmt_id: u32,
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    alignment: Alignment,
}

#[derive(Debug, Default)]
struct FillRecord {
    pattern: Option<PatternType>,
    foreground: Color,
    background: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Parse styles.xml into the cell formats (cellXfs), indexed by xf id
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut section = Section::None;

    let mut numfmts: HashMap<u32, String> = HashMap::new();
    let mut fonts: Vec<FontStyle> = Vec::new();
    let mut fills: Vec<FillStyle> = Vec::new();
    let mut borders: Vec<BorderStyle> = Vec::new();
    let mut xfs: Vec<XfRecord> = Vec::new();

    let mut font: Option<FontStyle> = None;
    let mut fill: Option<FillRecord> = None;
    let mut border: Option<BorderStyle> = None;
    let mut edge: Option<Edge> = None;
    let mut xf: Option<XfRecord> = None;

    loop {
        let event = xml_reader.read_event_into(&mut buf)?;
        match &event {
            Event::Start(e) | Event::Empty(e) => {
                let empty = matches!(event, Event::Empty(_));
                match (section, e.name().as_ref()) {
                    (_, b"numFmts") if !empty => section = Section::NumFmts,
                    (_, b"fonts") if !empty => section = Section::Fonts,
                    (_, b"fills") if !empty => section = Section::Fills,
                    (_, b"borders") if !empty => section = Section::Borders,
                    (_, b"cellXfs") if !empty => section = Section::CellXfs,
                    (Section::None, _) if !empty => section = Section::Skipped,

                    (Section::NumFmts, b"numFmt") => {
                        let id = attr_value(e, b"numFmtId").and_then(|v| v.parse().ok());
                        if let (Some(id), Some(code)) = (id, attr_value(e, b"formatCode")) {
                            numfmts.insert(id, code);
                        }
                    }

                    (Section::Fonts, b"font") => {
                        if empty {
                            fonts.push(FontStyle::default());
                        } else {
                            font = Some(FontStyle::default());
                        }
                    }
                    (Section::Fonts, tag) => {
                        if let Some(font) = font.as_mut() {
                            apply_font_element(font, tag, e);
                        }
                    }

                    (Section::Fills, b"fill") => {
                        if empty {
                            fills.push(FillStyle::None);
                        } else {
                            fill = Some(FillRecord::default());
                        }
                    }
                    (Section::Fills, b"patternFill") => {
                        if let Some(fill) = fill.as_mut() {
                            fill.pattern = attr_value(e, b"patternType")
                                .and_then(|v| PatternType::from_ooxml_name(&v))
                                .or(Some(PatternType::None));
                        }
                    }
                    (Section::Fills, b"fgColor") => {
                        if let Some(fill) = fill.as_mut() {
                            fill.foreground = parse_color_attrs(e);
                        }
                    }
                    (Section::Fills, b"bgColor") => {
                        if let Some(fill) = fill.as_mut() {
                            fill.background = parse_color_attrs(e);
                        }
                    }

                    (Section::Borders, b"border") => {
                        if empty {
                            borders.push(BorderStyle::default());
                        } else {
                            border = Some(BorderStyle::default());
                        }
                    }
                    (Section::Borders, tag @ (b"left" | b"start" | b"right" | b"end" | b"top" | b"bottom")) => {
                        let which = match tag {
                            b"left" | b"start" => Edge::Left,
                            b"right" | b"end" => Edge::Right,
                            b"top" => Edge::Top,
                            _ => Edge::Bottom,
                        };
                        let line = attr_value(e, b"style").and_then(|v| BorderLineStyle::from_ooxml_name(&v));
                        if let (Some(border), Some(style)) = (border.as_mut(), line) {
                            *edge_slot(border, which) = Some(BorderEdge {
                                style,
                                color: Color::Auto,
                            });
                        }
                        edge = if empty { None } else { Some(which) };
                    }
                    (Section::Borders, b"color") => {
                        if let (Some(border), Some(which)) = (border.as_mut(), edge) {
                            if let Some(slot) = edge_slot(border, which).as_mut() {
                                slot.color = parse_color_attrs(e);
                            }
                        }
                    }

                    (Section::CellXfs, b"xf") => {
                        let id = |key: &[u8]| {
                            attr_value(e, key)
                                .and_then(|v| v.parse::<u32>().ok())
                                .unwrap_or(0)
                        };
                        let record = XfRecord {
                            num_fmt_id: id(b"numFmtId"),
                            font_id: id(b"fontId"),
                            fill_id: id(b"fillId"),
                            border_id: id(b"borderId"),
                            alignment: Alignment::default(),
                        };
                        if empty {
                            xfs.push(record);
                        } else {
                            xf = Some(record);
                        }
                    }
                    (Section::CellXfs, b"alignment") => {
                        if let Some(xf) = xf.as_mut() {
                            xf.alignment = parse_alignment(e);
                        }
                    }

                    _ => {}
                }
            }

            Event::End(e) => match (section, e.name().as_ref()) {
                (Section::Fonts, b"font") => fonts.extend(font.take()),
                (Section::Fills, b"fill") => {
                    if let Some(record) = fill.take() {
                        fills.push(finalize_fill(record));
                    }
                }
                (Section::Borders, b"border") => borders.extend(border.take()),
                (Section::Borders, b"left" | b"start" | b"right" | b"end" | b"top" | b"bottom") => {
                    edge = None
                }
                (Section::CellXfs, b"xf") => xfs.extend(xf.take()),
                (
                    _,
                    b"numFmts" | b"fonts" | b"fills" | b"borders" | b"cellXfs" | b"cellStyleXfs"
                    | b"cellStyles" | b"dxfs" | b"tableStyles" | b"colors" | b"extLst",
                ) => section = Section::None,
                _ => {}
            },

            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if xfs.is_empty() {
        return Ok(vec![Style::default()]);
    }

    Ok(xfs
        .into_iter()
        .map(|xf| resolve_style(xf, &numfmts, &fonts, &fills, &borders))
        .collect())
}

fn resolve_style(
    xf: XfRecord,
    numfmts: &HashMap<u32, String>,
    fonts: &[FontStyle],
    fills: &[FillStyle],
    borders: &[BorderStyle],
) -> Style {
    let number_format = match (xf.num_fmt_id, numfmts.get(&xf.num_fmt_id)) {
        (_, Some(code)) => NumberFormat::Custom(code.clone()),
        (0, None) => NumberFormat::General,
        (id, None) => NumberFormat::BuiltIn(id),
    };

    Style {
        font: fonts.get(xf.font_id as usize).cloned().unwrap_or_default(),
        fill: fills.get(xf.fill_id as usize).cloned().unwrap_or_default(),
        border: borders.get(xf.border_id as usize).cloned().unwrap_or_default(),
        alignment: xf.alignment,
        number_format,
    }
}

fn finalize_fill(record: FillRecord) -> FillStyle {
    match record.pattern.unwrap_or(PatternType::None) {
        PatternType::None | PatternType::Gray125 => FillStyle::None,
        PatternType::Solid => FillStyle::Solid {
            color: record.foreground,
        },
        pattern => FillStyle::Pattern {
            pattern,
            foreground: record.foreground,
            background: record.background,
        },
    }
}

fn edge_slot(border: &mut BorderStyle, edge: Edge) -> &mut Option<BorderEdge> {
    match edge {
        Edge::Left => &mut border.left,
        Edge::Right => &mut border.right,
        Edge::Top => &mut border.top,
        Edge::Bottom => &mut border.bottom,
    }
}

fn apply_font_element(font: &mut FontStyle, tag: &[u8], e: &BytesStart<'_>) {
    // Boolean font properties may carry val="0"
    let flag = || {
        attr_value(e, b"val").map_or(true, |v| v != "0" && !v.eq_ignore_ascii_case("false"))
    };
    match tag {
        b"b" => font.bold = flag(),
        b"i" => font.italic = flag(),
        b"strike" => font.strikethrough = flag(),
        b"u" => {
            font.underline = attr_value(e, b"val")
                .map(|v| Underline::from_ooxml_name(&v))
                .unwrap_or(Underline::Single)
        }
        b"sz" => {
            if let Some(size) = attr_value(e, b"val").and_then(|v| v.parse().ok()) {
                font.size = size;
            }
        }
        b"name" => {
            if let Some(name) = attr_value(e, b"val") {
                font.name = name;
            }
        }
        b"color" => font.color = parse_color_attrs(e),
        _ => {}
    }
}

fn parse_alignment(e: &BytesStart<'_>) -> Alignment {
    let mut align = Alignment::default();
    for attr in e.attributes().flatten() {
        let Ok(val) = attr.unescape_value() else {
            continue;
        };
        match attr.key.as_ref() {
            b"horizontal" => {
                if let Some(h) = HorizontalAlignment::from_ooxml_name(&val) {
                    align.horizontal = h;
                }
            }
            b"vertical" => {
                if let Some(v) = VerticalAlignment::from_ooxml_name(&val) {
                    align.vertical = v;
                }
            }
            b"wrapText" => align.wrap_text = val == "1" || val == "true",
            b"shrinkToFit" => align.shrink_to_fit = val == "1" || val == "true",
            b"indent" => align.indent = val.parse().unwrap_or(0),
            b"textRotation" => align.rotation = val.parse().unwrap_or(0),
            _ => {}
        }
    }
    align
}

/// Read an unescaped attribute value by key
pub(crate) fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    if let Some(rgb) = attr_value(e, b"rgb") {
        // Opaque ARGB is how RGB colors are stored
        return match Color::from_hex(&rgb) {
            Some(Color::Argb { a: 0xFF, r, g, b }) => Color::rgb(r, g, b),
            other => other.unwrap_or_default(),
        };
    }
    if let Some(index) = attr_value(e, b"theme").and_then(|v| v.parse::<u8>().ok()) {
        let tint = attr_value(e, b"tint")
            .and_then(|v| v.parse::<f64>().ok())
            .map_or(0, |t| (t * 100.0).round().clamp(-100.0, 100.0) as i8);
        return Color::theme(index, tint);
    }
    if let Some(index) = attr_value(e, b"indexed").and_then(|v| v.parse::<u8>().ok()) {
        return Color::Indexed(index);
    }
    Color::Auto
}
