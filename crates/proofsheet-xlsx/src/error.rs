//! Why a package could not be read or written

use thiserror::Error;

pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

#[derive(Debug, Error)]
pub enum XlsxError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The file is not a zip archive, or the archive is damaged
    #[error("not a readable zip package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A zip archive that does not hold a spreadsheet, or a workbook with
    /// nothing to write
    #[error("not an XLSX workbook: {0}")]
    NotAWorkbook(String),

    /// A part the workbook references is absent from the package
    #[error("package has no {0} part")]
    MissingPart(String),

    /// A part is present but its content makes no sense, such as a shared
    /// string index past the end of the table
    #[error("{0}")]
    Malformed(String),

    #[error(transparent)]
    Core(#[from] proofsheet_core::Error),
}
