//! Errors raised while addressing or assembling a workbook

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Text that is not an A1 reference (or `A1:B2` range)
    #[error("invalid cell reference: {0}")]
    InvalidAddress(String),

    /// Row past the last worksheet row; carries the row and the largest valid index
    #[error("row {0} is outside the sheet (last row index is {1})")]
    RowOutOfBounds(u32, u32),

    #[error("column {0} is outside the sheet (last column index is {1})")]
    ColumnOutOfBounds(u16, u16),

    #[error("invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Sheet names are unique ignoring case
    #[error("a worksheet named {0:?} already exists")]
    DuplicateSheetName(String),

    /// A merge that would share cells with one already on the sheet
    #[error("{new} overlaps merged range {existing}")]
    OverlappingMerge { new: String, existing: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
