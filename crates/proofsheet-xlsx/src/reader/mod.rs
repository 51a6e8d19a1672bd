//! Reading an XLSX package into a [`Workbook`]

mod shared_formula;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::{debug, warn};

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{attr_value, read_styles_xml};
use shared_formula::SharedFormulas;
use proofsheet_core::style::Style;
use proofsheet_core::{
    CellAddress, CellComment, CellError, CellRange, CellValue, Workbook, Worksheet,
};

/// Undo the `_xHHHH_` escapes Excel uses for characters XML cannot carry
/// (`_x000D_` for CR, `_x005F_` for a literal underscore). Anything that only
/// looks similar is kept as written.
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let escaped_char = |rest: &str| -> Option<char> {
        let hex = rest.strip_prefix("_x")?.get(..5)?.strip_suffix('_')?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    };

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('_') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match escaped_char(rest) {
            Some(c) => {
                out.push(c);
                rest = &rest[7..];
            }
            None => {
                out.push('_');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// An XML reader over one part of the archive, `None` when the part is absent.
/// Text is trimmed only when `trim` is set; cell and note text keep their
/// surrounding spaces.
fn open_part<'a, R: Read + Seek + 'a>(
    archive: &'a mut zip::ZipArchive<R>,
    path: &str,
    trim: bool,
) -> Option<Reader<BufReader<impl Read + 'a>>> {
    let file = archive.by_name(path).ok()?;
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(trim);
    Some(xml)
}

/// Resolve a relationship target against the directory of the part that owns it
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

/// A relationship entry from a `.rels` part
#[derive(Debug, Clone)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

/// Sheet entry from workbook.xml
#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    r_id: String,
    hidden: bool,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading xlsx");
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Every worksheet with its values, styles, notes, merges and row heights.
    /// Chart sheets are skipped.
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Any OOXML package has a content-types part; plain zips do not
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::NotAWorkbook(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_styles = Self::read_styles(&mut archive)?;
        let sheets = Self::read_workbook_xml(&mut archive)?;
        let rels = Self::read_rels(&mut archive, "xl/_rels/workbook.xml.rels")?
            .ok_or_else(|| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let sheet_paths: HashMap<&str, String> = rels
            .iter()
            .filter(|rel| rel.rel_type.ends_with("/worksheet"))
            .map(|rel| (rel.id.as_str(), resolve_target("xl", &rel.target)))
            .collect();

        let mut workbook = Workbook::empty();

        for entry in &sheets {
            let Some(path) = sheet_paths.get(entry.r_id.as_str()) else {
                // Chart sheets and dialog sheets have no cell grid
                warn!(sheet = %entry.name, "skipping sheet without worksheet part");
                continue;
            };

            let mut worksheet = Worksheet::new(entry.name.as_str());
            worksheet.set_visible(!entry.hidden);

            Self::read_worksheet(
                &mut archive,
                path,
                &mut worksheet,
                &shared_strings,
                &cell_styles,
            )?;
            Self::read_worksheet_comments(&mut archive, path, &mut worksheet)?;

            debug!(
                sheet = %entry.name,
                cells = worksheet.cell_count(),
                comments = worksheet.comment_count(),
                "read worksheet"
            );
            workbook.add_existing_worksheet(worksheet)?;
        }

        if workbook.is_empty() {
            return Err(XlsxError::NotAWorkbook("Workbook has no worksheets".into()));
        }

        Ok(workbook)
    }

    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        // Workbooks with only inline strings have no table
        let Some(mut xml_reader) = open_part(archive, "xl/sharedStrings.xml", false) else {
            return Ok(strings);
        };

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Event::Empty(e) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Event::End(e) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Event::Text(e) if in_t => current_string.push_str(&e.unescape()?),
                Event::CData(e) if in_t => {
                    current_string.push_str(&String::from_utf8_lossy(&e.into_inner()))
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<Style>> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file),
            Err(_) => Ok(vec![Style::default()]),
        }
    }

    /// Read workbook.xml to get sheet names, rIds and visibility
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<SheetEntry>> {
        let mut xml_reader = open_part(archive, "xl/workbook.xml", true)
            .ok_or_else(|| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut r_id = None;
                    let mut hidden = false;

                    for attr in e.attributes().flatten() {
                        let Ok(value) = attr.unescape_value() else {
                            continue;
                        };
                        match attr.key.as_ref() {
                            b"name" => name = Some(value.into_owned()),
                            b"r:id" => r_id = Some(value.into_owned()),
                            // "hidden" and "veryHidden" both keep the sheet out of view
                            b"state" => hidden = value != "visible",
                            _ => {}
                        }
                    }

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push(SheetEntry { name, r_id, hidden });
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read a relationships part; `None` when the part does not exist
    fn read_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        rels_path: &str,
    ) -> XlsxResult<Option<Vec<Relationship>>> {
        let Some(mut xml_reader) = open_part(archive, rels_path, true) else {
            return Ok(None);
        };

        let mut buf = Vec::new();
        let mut rels = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"Relationship" => {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");
                    let external = attr_value(&e, b"TargetMode").as_deref() == Some("External");

                    if let (Some(id), Some(target), Some(rel_type), false) =
                        (id, target, rel_type, external)
                    {
                        rels.push(Relationship {
                            id,
                            rel_type,
                            target,
                        });
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Some(rels))
    }

    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        cell_styles: &[Style],
    ) -> XlsxResult<()> {
        let mut xml_reader = open_part(archive, path, false)
            .ok_or_else(|| XlsxError::MissingPart(path.to_string()))?;

        let mut buf = Vec::new();
        let mut cell: Option<PendingCell> = None;
        let mut shared = SharedFormulas::default();
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"row" => Self::read_row(&e, worksheet),
                    b"c" => cell = Some(PendingCell::from_element(&e)),
                    b"v" => in_value = cell.is_some(),
                    b"f" => {
                        if let Some(pending) = cell.as_mut() {
                            pending.read_formula_attrs(&e);
                            in_formula = true;
                        }
                    }
                    b"t" => in_inline_text = cell.is_some(),
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    // A value-less cell may still carry a style
                    b"c" => {
                        PendingCell::from_element(&e).apply(
                            worksheet,
                            shared_strings,
                            cell_styles,
                            &mut shared,
                        )?;
                    }
                    // Shared formula follower: attributes only, text lives on the master
                    b"f" => {
                        if let Some(pending) = cell.as_mut() {
                            pending.read_formula_attrs(&e);
                        }
                    }
                    b"col" => Self::read_column(&e, worksheet),
                    b"row" => Self::read_row(&e, worksheet),
                    b"mergeCell" => Self::read_merge(&e, worksheet),
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            pending.apply(worksheet, shared_strings, cell_styles, &mut shared)?;
                        }
                    }
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"t" => in_inline_text = false,
                    b"col" => {}
                    _ => {}
                },
                Event::Text(e) => {
                    if let Some(pending) = cell.as_mut() {
                        if in_value {
                            pending.value.get_or_insert_with(String::new).push_str(&e.unescape()?);
                        } else if in_formula {
                            pending
                                .formula
                                .get_or_insert_with(String::new)
                                .push_str(&e.unescape()?);
                        } else if in_inline_text {
                            pending
                                .inline_text
                                .get_or_insert_with(String::new)
                                .push_str(&e.unescape()?);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Apply a `<col>` width entry
    fn read_column(e: &BytesStart<'_>, worksheet: &mut Worksheet) {
        let number = |key: &[u8]| attr_value(e, key).and_then(|v| v.parse::<u16>().ok());
        let custom = attr_value(e, b"customWidth").map_or(false, |v| is_truthy(&v));
        let width = attr_value(e, b"width").and_then(|v| v.parse::<f64>().ok());

        if let (Some(min), Some(max), Some(width), true) = (number(b"min"), number(b"max"), width, custom) {
            // min/max are 1-based; a trailing catch-all range can reach the column limit
            let max = max.min(proofsheet_core::MAX_COLS);
            for col in min..=max {
                worksheet.set_column_width(col.saturating_sub(1), width);
            }
        }
    }

    /// Apply a `<row>` height; only heights marked `customHeight` are kept
    fn read_row(e: &BytesStart<'_>, worksheet: &mut Worksheet) {
        let row = attr_value(e, b"r").and_then(|v| v.parse::<u32>().ok());
        let custom = attr_value(e, b"customHeight").map_or(false, |v| is_truthy(&v));
        let height = attr_value(e, b"ht").and_then(|v| v.parse::<f64>().ok());

        if let (Some(row), Some(height), true) = (row, height, custom) {
            if (1..=proofsheet_core::MAX_ROWS).contains(&row) {
                worksheet.set_row_height(row - 1, height);
            }
        }
    }

    fn read_merge(e: &BytesStart<'_>, worksheet: &mut Worksheet) {
        let Some(reference) = attr_value(e, b"ref") else {
            return;
        };
        let merged = CellRange::parse(&reference).and_then(|range| worksheet.merge_cells(&range));
        if let Err(e) = merged {
            warn!(sheet = worksheet.name(), range = %reference, error = %e, "merge skipped");
        }
    }

    /// Read the notes attached to a worksheet through its relationships
    fn read_worksheet_comments<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        sheet_path: &str,
        worksheet: &mut Worksheet,
    ) -> XlsxResult<()> {
        let (dir, file_name) = sheet_path.rsplit_once('/').unwrap_or(("", sheet_path));
        let rels_path = format!("{}/_rels/{}.rels", dir, file_name);

        let Some(rels) = Self::read_rels(archive, &rels_path)? else {
            return Ok(());
        };

        let comment_paths: Vec<String> = rels
            .iter()
            .filter(|rel| rel.rel_type.ends_with("/comments"))
            .map(|rel| resolve_target(dir, &rel.target))
            .collect();

        for path in comment_paths {
            let file = match archive.by_name(&path) {
                Ok(f) => f,
                Err(_) => {
                    warn!(%path, "comments part referenced but missing");
                    continue;
                }
            };

            for (address, comment) in parse_comments(BufReader::new(file))? {
                worksheet.set_comment_at(address.row, address.col, comment);
            }
        }

        Ok(())
    }
}

/// Cell state collected between `<c>` and `</c>`
#[derive(Debug, Default)]
struct PendingCell {
    reference: Option<String>,
    cell_type: Option<String>,
    style: Option<u32>,
    value: Option<String>,
    formula: Option<String>,
    /// `si` of a `t="shared"` formula
    shared_index: Option<u32>,
    inline_text: Option<String>,
}

impl PendingCell {
    fn from_element(e: &BytesStart<'_>) -> Self {
        Self {
            reference: attr_value(e, b"r"),
            cell_type: attr_value(e, b"t"),
            style: attr_value(e, b"s").and_then(|v| v.parse().ok()),
            ..Self::default()
        }
    }

    fn read_formula_attrs(&mut self, e: &BytesStart<'_>) {
        if attr_value(e, b"t").as_deref() == Some("shared") {
            self.shared_index = attr_value(e, b"si").and_then(|v| v.parse().ok());
        }
    }

    /// Decode the raw `<v>` text according to the cell type
    fn decode_value(&self, raw: &str, shared_strings: &[String]) -> XlsxResult<CellValue> {
        Ok(match self.cell_type.as_deref() {
            Some("s") => {
                let idx: usize = raw.trim().parse().map_err(|_| {
                    XlsxError::Malformed(format!("Invalid shared string index: {}", raw))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Malformed(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::string(s.as_str())
            }
            Some("b") => CellValue::Boolean(is_truthy(raw.trim())),
            Some("e") => CellError::parse(raw.trim())
                .map(CellValue::Error)
                .unwrap_or_else(|| CellValue::string(raw)),
            Some("str") | Some("inlineStr") => CellValue::string(decode_excel_escapes(raw)),
            // ISO 8601 date cells keep their text
            Some("d") => CellValue::string(raw),
            None | Some("n") => match raw.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::string(raw),
            },
            Some(_) => CellValue::string(raw),
        })
    }

    fn apply(
        self,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        styles: &[Style],
        shared: &mut SharedFormulas,
    ) -> XlsxResult<()> {
        let Some(reference) = self.reference.as_deref() else {
            return Err(XlsxError::Malformed("Cell without a reference".into()));
        };
        let addr = CellAddress::parse(reference).map_err(|e| {
            XlsxError::Malformed(format!("Invalid cell reference '{}': {}", reference, e))
        })?;

        let value = match (&self.inline_text, &self.value) {
            (Some(text), _) => Some(CellValue::string(decode_excel_escapes(text))),
            (None, Some(raw)) => Some(self.decode_value(raw, shared_strings)?),
            (None, None) => None,
        };

        let formula = self
            .formula
            .as_deref()
            .map(|f| f.trim().trim_start_matches('='))
            .filter(|f| !f.is_empty());
        let formula = match (formula, self.shared_index) {
            (Some(text), Some(si)) => {
                shared.register(si, addr, text);
                Some(text.to_string())
            }
            (Some(text), None) => Some(text.to_string()),
            (None, Some(si)) => {
                let expanded = shared.follower(si, addr);
                if expanded.is_none() {
                    warn!(cell = %reference, si, "shared formula without a master, keeping cached value");
                }
                expanded
            }
            (None, None) => None,
        };

        let value = match formula {
            Some(text) => Some(CellValue::Formula {
                text,
                cached_value: value.map(Box::new),
            }),
            None => value,
        };

        if let Some(value) = value {
            worksheet.set_cell_value_at(addr.row, addr.col, value)?;
        }

        if let Some(s) = self.style.filter(|&s| s != 0) {
            let style = styles
                .get(s as usize)
                .ok_or_else(|| XlsxError::Malformed(format!("Style index {} out of bounds", s)))?;
            worksheet.set_cell_style_at(addr.row, addr.col, style)?;
        }

        Ok(())
    }
}

/// Parse a comments part into (address, comment) pairs
fn parse_comments<R: std::io::BufRead>(reader: R) -> XlsxResult<Vec<(CellAddress, CellComment)>> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.trim_text(false);

    let mut buf = Vec::new();
    let mut authors: Vec<String> = Vec::new();
    let mut comments = Vec::new();

    let mut in_author = false;
    let mut in_text = false;
    let mut in_t = false;
    let mut in_phonetic = false;
    let mut current_author = String::new();
    let mut current: Option<(Option<String>, Option<usize>)> = None;
    let mut current_text = String::new();

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"author" => {
                    in_author = true;
                    current_author.clear();
                }
                b"comment" => {
                    current = Some((
                        attr_value(&e, b"ref"),
                        attr_value(&e, b"authorId").and_then(|v| v.parse().ok()),
                    ));
                    current_text.clear();
                }
                b"text" if current.is_some() => in_text = true,
                b"rPh" => in_phonetic = true,
                b"t" if in_text && !in_phonetic => in_t = true,
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"author" => authors.push(String::new()),
            Event::End(e) => match e.name().as_ref() {
                b"author" => {
                    authors.push(std::mem::take(&mut current_author));
                    in_author = false;
                }
                b"comment" => {
                    if let Some((Some(reference), author_id)) = current.take() {
                        match CellAddress::parse(&reference) {
                            Ok(addr) => {
                                let author = author_id
                                    .and_then(|id| authors.get(id))
                                    .cloned()
                                    .unwrap_or_default();
                                comments.push((
                                    addr,
                                    CellComment::new(author, decode_excel_escapes(&current_text)),
                                ));
                            }
                            Err(e) => warn!(%reference, error = %e, "skipping comment"),
                        }
                    }
                    current_text.clear();
                }
                b"text" => in_text = false,
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Event::Text(e) => {
                if in_author {
                    current_author.push_str(&e.unescape()?);
                } else if in_t {
                    // Rich text runs are concatenated as-is
                    current_text.push_str(&e.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(comments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("line1_x000d__x000A_line2"), "line1\r\nline2");
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
        assert_eq!(decode_excel_escapes("tab_x0009_"), "tab\t");
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_xZZZZ_ snake_case"), "_xZZZZ_ snake_case");
        assert_eq!(decode_excel_escapes("café_x0041_"), "caféA");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("xl", "worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(
            resolve_target("xl/worksheets", "../comments1.xml"),
            "xl/comments1.xml"
        );
        assert_eq!(resolve_target("xl", "/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn test_parse_comments_concatenates_runs() {
        let xml = r#"<?xml version="1.0"?>
<comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <authors><author>Reviewer</author><author>Spell Checker</author></authors>
  <commentList>
    <comment ref="B3" authorId="1"><text><r><rPr><b/></rPr><t xml:space="preserve">Spelling: </t></r><r><t>teh</t></r></text></comment>
    <comment ref="A1" authorId="0"><text><t>Plain note</t></text></comment>
  </commentList>
</comments>"#;

        let comments = parse_comments(xml.as_bytes()).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].0, CellAddress::new(2, 1));
        assert_eq!(comments[0].1, CellComment::new("Spell Checker", "Spelling: teh"));
        assert_eq!(comments[1].1.author, "Reviewer");
    }

    fn minimal_xlsx(sheet_xml: &str, extra: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();

            let parts = [
                ("[Content_Types].xml", r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#),
                ("xl/workbook.xml", r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/><sheet name="Hidden" sheetId="2" state="hidden" r:id="rId2"/></sheets></workbook>"#),
                ("xl/_rels/workbook.xml.rels", r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/></Relationships>"#),
                ("xl/worksheets/sheet1.xml", sheet_xml),
                ("xl/worksheets/sheet2.xml", r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData/></worksheet>"#),
            ];

            for (name, content) in parts.iter().chain(extra) {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_read_empty_xlsx() {
        let data = minimal_xlsx(
            r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData></sheetData></worksheet>"#,
            &[],
        );
        let workbook = XlsxReader::read(Cursor::new(data)).unwrap();

        assert_eq!(workbook.sheet_names(), vec!["Sheet1", "Hidden"]);
        assert!(workbook.worksheet(0).unwrap().is_visible());
        assert!(!workbook.worksheet(1).unwrap().is_visible());
    }

    #[test]
    fn test_read_cell_types() {
        let sheet = r#"<?xml version="1.0"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <cols><col min="2" max="3" width="30.5" customWidth="1"/></cols>
  <sheetData>
    <row r="1">
      <c r="A1" t="s"><v>0</v></c>
      <c r="B1" t="inlineStr"><is><r><t xml:space="preserve">Hello </t></r><r><t>wrld</t></r></is></c>
      <c r="C1"><v>42.5</v></c>
      <c r="D1" t="b"><v>1</v></c>
      <c r="E1" t="e"><v>#DIV/0!</v></c>
      <c r="F1" t="str"><f>UPPER(A1)</f><v>ALPHA  BETA</v></c>
      <c r="G1"><f>SUM(C1:C2)</f></c>
    </row>
  </sheetData>
</worksheet>"#;
        let shared = r#"<?xml version="1.0"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="1" uniqueCount="1"><si><t xml:space="preserve"> alpha  beta</t><rPh sb="0" eb="1"><t>ignored</t></rPh></si></sst>"#;

        let data = minimal_xlsx(sheet, &[("xl/sharedStrings.xml", shared)]);
        let workbook = XlsxReader::read(Cursor::new(data)).unwrap();
        let ws = workbook.worksheet(0).unwrap();

        assert_eq!(ws.get_value("A1").unwrap(), CellValue::string(" alpha  beta"));
        assert_eq!(ws.get_value("B1").unwrap(), CellValue::string("Hello wrld"));
        assert_eq!(ws.get_value("C1").unwrap(), CellValue::Number(42.5));
        assert_eq!(ws.get_value("D1").unwrap(), CellValue::Boolean(true));
        assert_eq!(ws.get_value("E1").unwrap(), CellValue::Error(CellError::Div0));
        assert_eq!(
            ws.get_value("F1").unwrap(),
            CellValue::Formula {
                text: "UPPER(A1)".into(),
                cached_value: Some(Box::new(CellValue::string("ALPHA  BETA"))),
            }
        );
        assert_eq!(ws.get_value("G1").unwrap(), CellValue::formula("SUM(C1:C2)"));
        assert_eq!(ws.column_width(1), 30.5);
        assert_eq!(ws.column_width(2), 30.5);
    }

    #[test]
    fn test_read_comments_through_sheet_rels() {
        let sheet = r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="2"><c r="B2" t="inlineStr"><is><t>note me</t></is></c></row></sheetData></worksheet>"#;
        let rels = r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="../notes/first.xml"/></Relationships>"#;
        let comments = r#"<?xml version="1.0"?><comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><authors><author>QA</author></authors><commentList><comment ref="B2" authorId="0"><text><t>Check wording</t></text></comment></commentList></comments>"#;

        let data = minimal_xlsx(
            sheet,
            &[
                ("xl/worksheets/_rels/sheet1.xml.rels", rels),
                ("xl/notes/first.xml", comments),
            ],
        );
        let workbook = XlsxReader::read(Cursor::new(data)).unwrap();
        let ws = workbook.worksheet(0).unwrap();

        assert_eq!(
            ws.comment_at(1, 1),
            Some(&CellComment::new("QA", "Check wording"))
        );
        assert_eq!(workbook.worksheet(1).unwrap().comment_count(), 0);
    }

    #[test]
    fn test_not_a_zip_is_an_error() {
        let result = XlsxReader::read(Cursor::new(b"name,value\nx,1\n".to_vec()));
        assert!(matches!(result, Err(XlsxError::Zip(_))));
    }
}
