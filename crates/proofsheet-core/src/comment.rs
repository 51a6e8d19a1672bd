//! Cell notes
//!
//! Notes are how the renderer explains a highlight. Notes already in the
//! input are read too, so the ones on unflagged cells survive.
//!
//! ```rust
//! use proofsheet_core::{CellComment, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_comment("A1", CellComment::new("proofsheet", "Spelling: teh")).unwrap();
//! assert_eq!(sheet.comment("A1").unwrap().unwrap().text, "Spelling: teh");
//! ```

/// A note on one cell. `text` may span several lines joined by `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellComment {
    pub author: String,
    pub text: String,
}

impl CellComment {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
        }
    }
}
