//! CSV read and write failures

use thiserror::Error;

pub type CsvResult<T> = std::result::Result<T, CsvError>;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Bad quoting or invalid UTF-8 in a record
    #[error("unreadable CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The file has more rows or columns than a worksheet can hold.
    /// `row` and `column` are 1-based positions in the file.
    #[error("record {row}, field {column}: {message}")]
    TooLarge {
        row: usize,
        column: usize,
        message: String,
    },

    #[error(transparent)]
    Core(#[from] proofsheet_core::Error),
}
