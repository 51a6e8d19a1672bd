//! Input formats and file dispatch

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use proofsheet_core::{Workbook, FORBIDDEN_SHEET_NAME_CHARS, MAX_SHEET_NAME_LEN};
use proofsheet_csv::{CsvError, CsvReadOptions, CsvReader};
use proofsheet_xlsx::{XlsxError, XlsxReader};
use thiserror::Error;

/// Why an input could not be turned into a workbook
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Xlsx(#[from] XlsxError),

    #[error(transparent)]
    Csv(#[from] CsvError),

    #[error(transparent)]
    Core(#[from] proofsheet_core::Error),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Formats a workbook can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// `.xlsx` and `.xlsm`
    Xlsx,
    Csv,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" => Some(InputFormat::Xlsx),
            "csv" => Some(InputFormat::Csv),
            _ => None,
        }
    }
}

/// Open a workbook, picking the reader by extension.
///
/// A CSV file becomes one worksheet named after the file stem.
pub fn open_workbook(path: &Path) -> Result<Workbook, InputError> {
    let format = InputFormat::from_path(path)
        .ok_or_else(|| InputError::UnsupportedFormat(path.display().to_string()))?;
    match format {
        InputFormat::Xlsx => Ok(XlsxReader::read_file(path)?),
        InputFormat::Csv => {
            let sheet = CsvReader::read_file(path, &csv_options(&file_stem(path)))?;
            single_sheet(sheet)
        }
    }
}

/// Read a workbook from a stream; `name` names the sheet of a CSV input
pub fn read_workbook<R: Read + Seek>(
    reader: R,
    format: InputFormat,
    name: &str,
) -> Result<Workbook, InputError> {
    match format {
        InputFormat::Xlsx => Ok(XlsxReader::read(reader)?),
        InputFormat::Csv => single_sheet(CsvReader::read(reader, &csv_options(name))?),
    }
}

/// Read a workbook from uploaded bytes
pub fn read_workbook_bytes(
    bytes: &[u8],
    format: InputFormat,
    name: &str,
) -> Result<Workbook, InputError> {
    read_workbook(Cursor::new(bytes), format, name)
}

fn csv_options(name: &str) -> CsvReadOptions {
    CsvReadOptions::default().with_sheet_name(sheet_name_for(name))
}

fn single_sheet(sheet: proofsheet_core::Worksheet) -> Result<Workbook, InputError> {
    let mut workbook = Workbook::empty();
    workbook.add_existing_worksheet(sheet)?;
    Ok(workbook)
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A valid worksheet name derived from free text
pub fn sheet_name_for(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .trim_matches('\'')
        .chars()
        .map(|c| if FORBIDDEN_SHEET_NAME_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned.to_string()
    }
}
