//! # proofsheet-check
//!
//! Finds spelling and grammar issues in the text cells of a workbook and
//! renders them as highlights and notes.
//!
//! The flow is one way:
//!
//! ```text
//! Workbook -> Scanner (classify + detectors) -> IssueIndex -> Renderer -> annotated Workbook
//!                                                    \-> report
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use proofsheet_check::prelude::*;
//! use proofsheet_check::detect::{Lexicon, DictionarySpeller, RuleGrammarChecker};
//! use proofsheet_core::Workbook;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", "Ths is a test").unwrap();
//! sheet.set_cell_value("A2", "42.50").unwrap();
//!
//! let lexicon = Lexicon::from_words(["this", "is", "a", "test"]);
//! let checkers = Checkers::new(
//!     Arc::new(DictionarySpeller::new(lexicon)),
//!     Arc::new(RuleGrammarChecker::english()),
//!     3,
//! );
//!
//! let index = Scanner::new(1).scan(&workbook, &checkers);
//! assert_eq!(index.count(IssueKind::Spelling), 1);
//!
//! let annotated = Renderer::new(&HighlightPalette::default(), RenderOptions::default())
//!     .render(&workbook, &index);
//! assert!(annotated.worksheet(0).unwrap().cell_style_at(0, 0).is_some());
//! ```

pub mod checkers;
pub mod classify;
pub mod config;
pub mod detect;
pub mod index;
pub mod issue;
pub mod render;
pub mod report;
pub mod scan;

pub use checkers::{CheckerPool, Checkers};
pub use config::{
    CheckConfig, ConfigError, DetectorConfig, GrammarBackend, HighlightPalette, SpellingBackend,
};
pub use detect::{DetectorError, GrammarDetector, SpellingDetector};
pub use index::{CellIssues, IssueIndex, IssueIndexBuilder, SheetIssues};
pub use issue::{CellIssue, CellRef, IssueKind};
pub use render::{HighlightCategory, RenderOptions, Renderer};
pub use report::{ReportError, ReportFormat, ReportRecord, Summary};
pub use scan::{
    CancellationToken, ProgressSnapshot, ScanControl, ScanOutcome, ScanProgress, Scanner,
};

/// Commonly used types
pub mod prelude {
    pub use crate::checkers::{CheckerPool, Checkers};
    pub use crate::config::{CheckConfig, HighlightPalette};
    pub use crate::index::IssueIndex;
    pub use crate::issue::{CellIssue, CellRef, IssueKind};
    pub use crate::render::{HighlightCategory, RenderOptions, Renderer};
    pub use crate::report::{ReportRecord, Summary};
    pub use crate::scan::{CancellationToken, ScanControl, Scanner};
}
