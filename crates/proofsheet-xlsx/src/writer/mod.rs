//! Serializing a workbook as an XLSX package
//!
//! Every part is built as a string first; the zip archive is written in one
//! pass afterwards. Cells go out as inline strings, so no shared-string
//! table is produced.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::XlsxStyleTable;
use proofsheet_core::{CellAddress, CellValue, Workbook, Worksheet};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_DOC_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CT_PREFIX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.";
const CT_WORKBOOK: &str = "sheet.main+xml";
const CT_STYLES: &str = "styles+xml";
const CT_WORKSHEET: &str = "worksheet+xml";
const CT_COMMENTS: &str = "comments+xml";

/// Escape text for XML content and attribute values
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Encode characters XML 1.0 cannot carry as Excel `_xHHHH_` escapes.
///
/// A literal underscore that would otherwise read back as an escape is
/// itself escaped as `_x005F_`.
fn encode_excel_escapes(s: &str) -> String {
    let looks_like_escape = |rest: &str| {
        let bytes = rest.as_bytes();
        bytes.len() >= 7
            && bytes[1] == b'x'
            && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
            && bytes[6] == b'_'
    };

    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            '_' if looks_like_escape(&s[i..]) => out.push_str("_x005F_"),
            '\r' => out.push_str("_x000D_"),
            '\t' | '\n' => out.push(c),
            c if c.is_control() && (c as u32) < 0x20 => {
                out.push_str(&format!("_x{:04X}_", c as u32))
            }
            c => out.push(c),
        }
    }
    out
}

/// Text node content for a cell or note
fn text_content(s: &str) -> String {
    escape_xml(&encode_excel_escapes(s))
}

/// Part numbering for sheets that carry notes
#[derive(Debug, Default)]
struct CommentParts {
    /// sheet index -> 1-based comments/vmlDrawing part number
    numbers: HashMap<usize, usize>,
}

impl CommentParts {
    fn for_workbook(workbook: &Workbook) -> Self {
        let numbers = workbook
            .worksheets()
            .enumerate()
            .filter(|(_, sheet)| sheet.comment_count() > 0)
            .enumerate()
            .map(|(n, (i, _))| (i, n + 1))
            .collect();
        Self { numbers }
    }

    fn number(&self, sheet_index: usize) -> Option<usize> {
        self.numbers.get(&sheet_index).copied()
    }
}

/// A `.rels` part; relationship ids are `rId1`, `rId2`... in list order
fn relationships(rels: &[(&str, String)]) -> String {
    let mut xml = format!(
        "{}\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
        XML_DECL
    );
    for (i, (kind, target)) in rels.iter().enumerate() {
        xml.push_str(&format!(
            "\n    <Relationship Id=\"rId{}\" Type=\"{}/{}\" Target=\"{}\"/>",
            i + 1,
            NS_DOC_REL,
            kind,
            target
        ));
    }
    xml.push_str("\n</Relationships>");
    xml
}

/// `[Content_Types].xml`, given (part name, content type suffix) overrides
fn content_types(overrides: &[(String, &str)]) -> String {
    let mut xml = format!(
        r#"{}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Default Extension="vml" ContentType="application/vnd.openxmlformats-officedocument.vmlDrawing"/>"#,
        XML_DECL
    );
    for (part, kind) in overrides {
        xml.push_str(&format!(
            "\n    <Override PartName=\"{}\" ContentType=\"{}{}\"/>",
            part, CT_PREFIX, kind
        ));
    }
    xml.push_str("\n</Types>");
    xml
}

fn workbook_xml(workbook: &Workbook) -> String {
    let sheets: String = workbook
        .worksheets()
        .enumerate()
        .map(|(i, sheet)| {
            format!(
                "\n        <sheet name=\"{}\" sheetId=\"{id}\"{} r:id=\"rId{id}\"/>",
                escape_xml(sheet.name()),
                if sheet.is_visible() { "" } else { " state=\"hidden\"" },
                id = i + 1
            )
        })
        .collect();
    format!(
        "{}\n<workbook xmlns=\"{}\" xmlns:r=\"{}\">\n    <sheets>{}\n    </sheets>\n</workbook>",
        XML_DECL, NS_MAIN, NS_DOC_REL, sheets
    )
}

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), sheets = workbook.sheet_count(), "writing xlsx");
        let mut out = BufWriter::new(File::create(path)?);
        Self::write(workbook, &mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Write the package to any seekable sink
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::NotAWorkbook(
                "A workbook needs at least one worksheet".into(),
            ));
        }

        let mut zip = zip::ZipWriter::new(writer);
        for (name, content) in Self::parts(workbook) {
            zip.start_file(name, zip::write::SimpleFileOptions::default())?;
            zip.write_all(content.as_bytes())?;
        }
        zip.finish()?;
        Ok(())
    }

    /// Every part of the package as (path inside the archive, content)
    fn parts(workbook: &Workbook) -> Vec<(String, String)> {
        let style_table = XlsxStyleTable::build(workbook);
        let comment_parts = CommentParts::for_workbook(workbook);

        let mut overrides = vec![
            ("/xl/workbook.xml".to_string(), CT_WORKBOOK),
            ("/xl/styles.xml".to_string(), CT_STYLES),
        ];
        let mut workbook_rels = Vec::new();
        let mut parts = vec![
            (
                "_rels/.rels".to_string(),
                relationships(&[("officeDocument", "xl/workbook.xml".to_string())]),
            ),
            ("xl/workbook.xml".to_string(), workbook_xml(workbook)),
            ("xl/styles.xml".to_string(), style_table.to_styles_xml()),
        ];

        for (i, sheet) in workbook.worksheets().enumerate() {
            let sheet_part = format!("xl/worksheets/sheet{}.xml", i + 1);
            let notes = comment_parts.number(i);
            overrides.push((format!("/{}", sheet_part), CT_WORKSHEET));
            workbook_rels.push(("worksheet", format!("worksheets/sheet{}.xml", i + 1)));
            parts.push((
                sheet_part,
                Self::worksheet_xml(sheet, i, &style_table, notes.is_some()),
            ));

            // The worksheet's legacyDrawing points at rId2
            if let Some(n) = notes {
                overrides.push((format!("/xl/comments{}.xml", n), CT_COMMENTS));
                parts.push((
                    format!("xl/worksheets/_rels/sheet{}.xml.rels", i + 1),
                    relationships(&[
                        ("comments", format!("../comments{}.xml", n)),
                        ("vmlDrawing", format!("../drawings/vmlDrawing{}.vml", n)),
                    ]),
                ));
                parts.push((format!("xl/comments{}.xml", n), comments_xml(sheet)));
                parts.push((
                    format!("xl/drawings/vmlDrawing{}.vml", n),
                    vml_drawing(sheet, n),
                ));
            }
        }

        workbook_rels.push(("styles", "styles.xml".to_string()));
        parts.push((
            "xl/_rels/workbook.xml.rels".to_string(),
            relationships(&workbook_rels),
        ));
        parts.insert(
            0,
            ("[Content_Types].xml".to_string(), content_types(&overrides)),
        );
        parts
    }

    fn worksheet_xml(
        sheet: &Worksheet,
        index: usize,
        style_table: &XlsxStyleTable,
        has_comments: bool,
    ) -> String {
        let mut content = format!(
            "{}\n<worksheet xmlns=\"{}\" xmlns:r=\"{}\">",
            XML_DECL, NS_MAIN, NS_DOC_REL
        );

        let widths = sheet.custom_column_widths();
        if !widths.is_empty() {
            content.push_str("\n    <cols>");
            for (col, width) in widths {
                content.push_str(&format!(
                    "\n        <col min=\"{0}\" max=\"{0}\" width=\"{1}\" customWidth=\"1\"/>",
                    col + 1,
                    width
                ));
            }
            content.push_str("\n    </cols>");
        }

        content.push_str("\n    <sheetData>");

        // Sparse and row-major. A row with a custom height is written even
        // when it holds no cells.
        let heights = sheet.custom_row_heights();
        let mut cells = sheet.iter_cells().peekable();
        let mut height_rows = heights.keys().copied().peekable();
        loop {
            let row = match (cells.peek().map(|&(r, _, _)| r), height_rows.peek().copied()) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => break,
            };
            height_rows.next_if_eq(&row);

            let mut row_attrs = format!(" r=\"{}\"", row + 1);
            if let Some(height) = heights.get(&row) {
                row_attrs.push_str(&format!(" ht=\"{}\" customHeight=\"1\"", height));
            }
            if cells.peek().map(|&(r, _, _)| r) != Some(row) {
                content.push_str(&format!("\n        <row{}/>", row_attrs));
                continue;
            }

            content.push_str(&format!("\n        <row{}>", row_attrs));
            while let Some((_, col, cell)) = cells.next_if(|&(r, _, _)| r == row) {
                let cell_ref = CellAddress::new(row, col).to_a1_string();
                let xf_id = style_table.xf_id_for(index, cell.style_index);
                let style_attr = if xf_id != 0 {
                    format!(" s=\"{}\"", xf_id)
                } else {
                    String::new()
                };

                content.push_str("\n            ");
                content.push_str(&cell_xml(&cell_ref, &style_attr, &cell.value));
            }
            content.push_str("\n        </row>");
        }
        content.push_str("\n    </sheetData>");

        let merged = sheet.merged_ranges();
        if !merged.is_empty() {
            content.push_str(&format!("\n    <mergeCells count=\"{}\">", merged.len()));
            for range in merged {
                content.push_str(&format!("\n        <mergeCell ref=\"{}\"/>", range));
            }
            content.push_str("\n    </mergeCells>");
        }

        if has_comments {
            content.push_str("\n    <legacyDrawing r:id=\"rId2\"/>");
        }

        content.push_str("\n</worksheet>");
        content
    }
}

fn cell_xml(cell_ref: &str, style_attr: &str, value: &CellValue) -> String {
    match value {
        CellValue::Empty => format!("<c r=\"{}\"{}/>", cell_ref, style_attr),
        CellValue::Number(n) if n.is_finite() => {
            format!("<c r=\"{}\"{}><v>{}</v></c>", cell_ref, style_attr, n)
        }
        CellValue::Number(_) => {
            format!("<c r=\"{}\"{} t=\"e\"><v>#NUM!</v></c>", cell_ref, style_attr)
        }
        CellValue::String(s) => format!(
            "<c r=\"{}\"{} t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
            cell_ref,
            style_attr,
            text_content(s.as_str())
        ),
        CellValue::Boolean(b) => format!(
            "<c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
            cell_ref,
            style_attr,
            u8::from(*b)
        ),
        CellValue::Error(e) => format!(
            "<c r=\"{}\"{} t=\"e\"><v>{}</v></c>",
            cell_ref,
            style_attr,
            escape_xml(e.as_str())
        ),
        CellValue::Formula { text, cached_value } => {
            let formula = escape_xml(text.trim_start_matches('='));
            let (type_attr, cached) = match cached_value.as_deref() {
                Some(CellValue::Number(n)) if n.is_finite() => ("", format!("<v>{}</v>", n)),
                Some(CellValue::String(s)) => (" t=\"str\"", format!("<v>{}</v>", text_content(s.as_str()))),
                Some(CellValue::Boolean(b)) => (" t=\"b\"", format!("<v>{}</v>", u8::from(*b))),
                Some(CellValue::Error(e)) => (" t=\"e\"", format!("<v>{}</v>", escape_xml(e.as_str()))),
                _ => ("", String::new()),
            };
            format!(
                "<c r=\"{}\"{}{}><f>{}</f>{}</c>",
                cell_ref, style_attr, type_attr, formula, cached
            )
        }
    }
}

/// The comments part for a worksheet
fn comments_xml(sheet: &Worksheet) -> String {
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <authors>"#,
    );

    let authors = sheet.comment_authors();
    for author in &authors {
        content.push_str(&format!("\n        <author>{}</author>", escape_xml(author)));
    }

    content.push_str(
        r#"
    </authors>
    <commentList>"#,
    );

    let author_index: HashMap<&str, usize> =
        authors.iter().enumerate().map(|(i, a)| (*a, i)).collect();

    for (addr, comment) in sheet.comments() {
        let author_id = author_index
            .get(comment.author.as_str())
            .copied()
            .unwrap_or(0);
        content.push_str(&format!(
            "\n        <comment ref=\"{}\" authorId=\"{}\"><text><t xml:space=\"preserve\">{}</t></text></comment>",
            addr,
            author_id,
            text_content(&comment.text)
        ));
    }

    content.push_str(
        r#"
    </commentList>
</comments>"#,
    );
    content
}

/// Legacy VML drawing that anchors each note's popup next to its cell
fn vml_drawing(sheet: &Worksheet, part_number: usize) -> String {
    let mut content = format!(
        r##"<xml xmlns:v="urn:schemas-microsoft-com:vml" xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:x="urn:schemas-microsoft-com:office:excel">
 <o:shapelayout v:ext="edit"><o:idmap v:ext="edit" data="{}"/></o:shapelayout>
 <v:shapetype id="_x0000_t202" coordsize="21600,21600" o:spt="202" path="m,l,21600r21600,l21600,xe">
  <v:stroke joinstyle="miter"/>
  <v:path gradientshapeok="t" o:connecttype="rect"/>
 </v:shapetype>"##,
        part_number
    );

    for (i, (addr, _)) in sheet.comments().enumerate() {
        let shape_id = 1024 * part_number + 1 + i;
        // Anchor: left col, dx, top row, dy, right col, dx, bottom row, dy
        let anchor = format!(
            "{}, 15, {}, 10, {}, 15, {}, 4",
            addr.col + 1,
            addr.row.saturating_sub(1),
            addr.col + 3,
            addr.row + 3
        );
        content.push_str(&format!(
            r##"
 <v:shape id="_x0000_s{}" type="#_x0000_t202" style="position:absolute;margin-left:59.25pt;margin-top:1.5pt;width:144pt;height:79pt;z-index:{};visibility:hidden" fillcolor="#ffffe1" o:insetmode="auto">
  <v:fill color2="#ffffe1"/>
  <v:shadow on="t" color="black" obscured="t"/>
  <v:path o:connecttype="none"/>
  <v:textbox style="mso-direction-alt:auto"><div style="text-align:left"></div></v:textbox>
  <x:ClientData ObjectType="Note">
   <x:MoveWithCells/>
   <x:SizeWithCells/>
   <x:Anchor>{}</x:Anchor>
   <x:AutoFill>False</x:AutoFill>
   <x:Row>{}</x:Row>
   <x:Column>{}</x:Column>
  </x:ClientData>
 </v:shape>"##,
            shape_id,
            i + 1,
            anchor,
            addr.row,
            addr.col
        ));
    }

    content.push_str("\n</xml>");
    content
}
