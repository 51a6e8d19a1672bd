//! # proofsheet-csv
//!
//! CSV reader and writer for proofsheet. A CSV file becomes a single
//! worksheet, named by [`CsvReadOptions::sheet_name`].

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvDialect, CsvReadOptions, CsvWriteOptions};
pub use reader::CsvReader;
pub use writer::CsvWriter;
