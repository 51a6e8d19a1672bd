//! # proofsheet-xlsx
//!
//! XLSX (Office Open XML) reader and writer for proofsheet.
//!
//! The reader keeps what an annotated copy has to carry forward: cell
//! values, cached formula results, fonts, fills, borders, alignment,
//! number formats, column widths, sheet visibility and notes. The writer
//! emits notes together with the legacy VML drawing spreadsheet
//! applications need to display them.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
