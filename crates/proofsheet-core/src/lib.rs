//! # proofsheet-core
//!
//! Core data structures shared by the proofsheet crates.
//!
//! This crate provides the spreadsheet model the checker reads from and the
//! renderer writes to:
//! - [`CellValue`] - Cell values (strings, numbers, booleans, errors, formulas)
//! - [`CellAddress`] - 0-based cell coordinates with A1 conversion at the edges
//! - [`Style`] - Cell formatting (font, fill, number format, alignment)
//! - [`CellComment`] - Notes attached to cells
//! - [`SheetLayout`] - Column widths, row heights and merged ranges
//! - [`Workbook`], [`Worksheet`] - The document structures
//!
//! ## Example
//!
//! ```rust
//! use proofsheet_core::{Workbook, CellValue};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! // Using string addresses
//! sheet.set_cell_value("A1", "Product description").unwrap();
//! sheet.set_cell_value("B1", 42.0).unwrap();
//!
//! // Or using row/column indices (0-based)
//! sheet.set_cell_value_at(1, 0, CellValue::string("Teh quick fox")).unwrap();
//! ```

pub mod cell;
pub mod comment;
pub mod error;
pub mod layout;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellData, CellError, CellRange, CellValue, SharedString};
pub use comment::CellComment;
pub use error::{Error, Result};
pub use layout::{SheetLayout, DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

pub use style::{
    Alignment, Color, FillStyle, FontStyle, HorizontalAlignment, NumberFormat, PatternType, Style,
    StylePool, Underline, VerticalAlignment,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name, in characters
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters Excel refuses in a sheet name
pub const FORBIDDEN_SHEET_NAME_CHARS: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];
