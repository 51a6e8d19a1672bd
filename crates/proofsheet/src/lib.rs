//! # proofsheet
//!
//! Proof-reads the text cells of spreadsheets and produces annotated copies.
//!
//! Cells with spelling or grammar issues get a highlight fill (one colour per
//! kind, a third when both apply) and a note listing what was found. Values,
//! formulas and all other formatting are left as they were.
//!
//! ## Features
//!
//! - Read XLSX/XLSM and CSV, write XLSX
//! - Dictionary spelling and rule-based English grammar checks, swappable
//!   behind traits
//! - Optional LanguageTool server backend (`languagetool` feature)
//! - Parallel, cancellable scanning with progress counters
//! - Batch checking with per-file error isolation
//! - CSV/JSON issue reports
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use proofsheet::prelude::*;
//! use proofsheet::check::detect::{DictionarySpeller, Lexicon, RuleGrammarChecker};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", "Teh invoice is overdue").unwrap();
//! sheet.set_cell_value("A2", 1250.0).unwrap();
//!
//! let checkers = Checkers::new(
//!     Arc::new(DictionarySpeller::new(Lexicon::from_words(["the", "invoice", "is", "overdue"]))),
//!     Arc::new(RuleGrammarChecker::english()),
//!     3,
//! );
//! let proofreader = Proofreader::with_checkers(CheckConfig::default(), Arc::new(checkers));
//!
//! let result = proofreader.check_workbook(&workbook, &ScanControl::default());
//! assert_eq!(result.summary.spelling_issues, 1);
//!
//! // result.annotated.unwrap().save("invoice_checked.xlsx").unwrap();
//! ```

pub mod format;
pub mod prelude;
pub mod proofread;

/// The checking engine
pub use proofsheet_check as check;

pub use proofread::{
    checked_file_name, output_path, BatchEntry, BatchReport, CheckError, FileCheck, Proofreader,
    WorkbookCheck,
};
pub use format::{open_workbook, read_workbook, read_workbook_bytes, InputError, InputFormat};

// Re-export core types
pub use proofsheet_core::{
    Alignment, CellAddress, CellComment, CellData, CellError, CellRange, CellValue, Color, Error,
    FillStyle,
    FontStyle, HorizontalAlignment, NumberFormat, Result, Style, VerticalAlignment, Workbook,
    Worksheet, MAX_COLS, MAX_ROWS, MAX_SHEET_NAME_LEN,
};

// Re-export checking types
pub use proofsheet_check::{
    CancellationToken, CellIssue, CellRef, CheckConfig, CheckerPool, Checkers, GrammarBackend,
    HighlightCategory, HighlightPalette, IssueIndex, IssueKind, ReportFormat, ReportRecord,
    ScanControl, SpellingBackend, Summary,
};

// Re-export I/O types
pub use proofsheet_csv::{CsvError, CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};
pub use proofsheet_xlsx::{XlsxError, XlsxReader, XlsxWriter};

use std::path::Path;

/// Extension trait for Workbook to add file I/O
pub trait WorkbookExt {
    /// Open a workbook from a file
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook>;

    /// Save the workbook to a file
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        open_workbook(path.as_ref()).map_err(|e| Error::other(e.to_string()))
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        match InputFormat::from_path(path) {
            Some(InputFormat::Xlsx) => {
                XlsxWriter::write_file(self, path).map_err(|e| Error::other(e.to_string()))
            }
            Some(InputFormat::Csv) => {
                if let Some(sheet) = self.worksheet(0) {
                    CsvWriter::write_file(sheet, path, &CsvWriteOptions::default())
                        .map_err(|e| Error::other(e.to_string()))
                } else {
                    Err(Error::other("No worksheets to save"))
                }
            }
            None => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }
}
