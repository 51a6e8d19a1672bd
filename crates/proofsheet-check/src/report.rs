//! Flat reports and summary metrics

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use proofsheet_core::Workbook;
use serde::Serialize;
use thiserror::Error;

use crate::index::{IssueIndex, SheetIssues};
use crate::issue::IssueKind;
use crate::render::HighlightCategory;

/// Errors raised while writing reports
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for reporting
pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// One flagged cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    pub sheet: String,
    /// A1 reference, e.g. `C4`
    pub cell_reference: String,
    /// 1-based
    pub row: u32,
    /// 1-based
    pub column: u32,
    pub category: HighlightCategory,
    pub original_text: String,
    /// One entry per kind, e.g. `Spelling: ths, tset`
    pub issue_messages: Vec<String>,
}

/// One record per flagged cell, in index order
pub fn build_report(workbook: &Workbook, index: &IssueIndex) -> Vec<ReportRecord> {
    let mut records = Vec::with_capacity(index.flagged_cell_count());
    for sheet_issues in index.sheets() {
        let sheet = workbook.worksheet_by_name(sheet_issues.name());
        for (addr, issues) in sheet_issues.cells() {
            let original_text = sheet
                .map(|s| s.get_value_at(addr.row, addr.col).to_string())
                .unwrap_or_default();
            records.push(ReportRecord {
                sheet: sheet_issues.name().to_string(),
                cell_reference: addr.to_a1_string(),
                row: addr.display_row(),
                column: addr.display_col(),
                category: HighlightCategory::from_issues(issues),
                original_text,
                issue_messages: issues.iter().map(|issue| issue.note_line()).collect(),
            });
        }
    }
    records
}

/// Issue counts for one checked workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub sheets_processed: usize,
    /// Cells with spelling findings
    pub spelling_issues: usize,
    /// Cells with grammar findings
    pub grammar_issues: usize,
    pub flagged_cells: usize,
}

impl Summary {
    /// Counts taken from a finished scan
    pub fn from_index(index: &IssueIndex) -> Self {
        Self {
            sheets_processed: index.sheet_count(),
            spelling_issues: index.count(IssueKind::Spelling),
            grammar_issues: index.count(IssueKind::Grammar),
            flagged_cells: index.flagged_cell_count(),
        }
    }

    /// Whether any cell was flagged
    pub fn has_issues(&self) -> bool {
        self.spelling_issues > 0 || self.grammar_issues > 0
    }

    pub fn issues(&self, kind: IssueKind) -> usize {
        match kind {
            IssueKind::Spelling => self.spelling_issues,
            IssueKind::Grammar => self.grammar_issues,
        }
    }

    /// Add another file's counts
    pub fn add(&mut self, other: &Summary) {
        self.sheets_processed += other.sheets_processed;
        self.spelling_issues += other.spelling_issues;
        self.grammar_issues += other.grammar_issues;
        self.flagged_cells += other.flagged_cells;
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sheets Processed: {}", self.sheets_processed)?;
        writeln!(f, "Spelling Issues: {}", self.spelling_issues)?;
        write!(f, "Grammar Issues: {}", self.grammar_issues)?;
        if !self.has_issues() {
            write!(f, "\nNo issues found")?;
        }
        Ok(())
    }
}

/// Detail lines for one sheet and kind: `Row 2, Column 3: ths, tset`
pub fn listing(sheet: &SheetIssues, kind: IssueKind) -> Vec<String> {
    sheet
        .cells()
        .filter_map(|(addr, issues)| {
            issues.get(kind).map(|issue| {
                format!(
                    "Row {}, Column {}: {}",
                    addr.display_row(),
                    addr.display_col(),
                    issue.joined()
                )
            })
        })
        .collect()
}

/// Report file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }

    /// Guess from a file extension; `None` for anything but csv or json
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(ReportFormat::Csv),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Write records as CSV with a header row.
///
/// Issue messages of a cell are joined with `" | "`.
pub fn write_csv<W: Write>(records: &[ReportRecord], writer: W) -> ReportResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "sheet",
        "cell_reference",
        "row",
        "column",
        "category",
        "original_text",
        "issue_messages",
    ])?;
    for record in records {
        csv.write_record([
            record.sheet.as_str(),
            record.cell_reference.as_str(),
            record.row.to_string().as_str(),
            record.column.to_string().as_str(),
            record.category.label(),
            record.original_text.as_str(),
            record.issue_messages.join(" | ").as_str(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write records as a pretty-printed JSON array
pub fn write_json<W: Write>(records: &[ReportRecord], writer: W) -> ReportResult<()> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

/// Write `records` to `path` in `format`, replacing any existing file
pub fn write_report_file<P: AsRef<Path>>(
    records: &[ReportRecord],
    path: P,
    format: ReportFormat,
) -> ReportResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        ReportFormat::Csv => write_csv(records, &mut writer)?,
        ReportFormat::Json => write_json(records, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}
