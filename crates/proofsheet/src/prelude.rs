//! Prelude module - common imports for proofsheet users
//!
//! ```rust
//! use proofsheet::prelude::*;
//! ```

pub use crate::{
    // Checking
    BatchReport,
    CancellationToken,
    CellAddress,
    CellComment,
    CellIssue,
    CellRange,
    CellRef,
    // Cell types
    CellValue,
    CheckConfig,
    CheckError,
    CheckerPool,
    Checkers,
    Color,
    // Error types
    Error,
    FileCheck,
    FillStyle,
    HighlightCategory,
    HighlightPalette,
    IssueIndex,
    IssueKind,
    Proofreader,
    ReportRecord,
    Result,
    ScanControl,
    Style,
    Summary,
    // Main types
    Workbook,
    // Extension traits
    WorkbookExt,
    Worksheet,
    // I/O types
    XlsxReader,
    XlsxWriter,
};
