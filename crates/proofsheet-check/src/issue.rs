//! Issue records

use std::fmt;

use proofsheet_core::CellAddress;
use serde::Serialize;

/// A cell inside a named worksheet
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CellRef {
    pub sheet: String,
    /// 0-based position
    pub cell: CellAddress,
}

impl CellRef {
    /// A reference to `cell` on the sheet named `sheet`
    pub fn new(sheet: impl Into<String>, cell: CellAddress) -> Self {
        Self {
            sheet: sheet.into(),
            cell,
        }
    }

    /// The cell part in A1 notation, e.g. "C4"
    pub fn a1(&self) -> String {
        self.cell.to_a1_string()
    }
}

impl fmt::Display for CellRef {
    /// `Sheet1!B2`, quoting sheet names that are not plain identifiers
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = !self.sheet.is_empty()
            && self
                .sheet
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_');
        if plain {
            write!(f, "{}!{}", self.sheet, self.cell)
        } else {
            write!(f, "'{}'!{}", self.sheet.replace('\'', "''"), self.cell)
        }
    }
}

/// The kind of problem a detector reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Spelling,
    Grammar,
}

impl IssueKind {
    pub const ALL: [IssueKind; 2] = [IssueKind::Spelling, IssueKind::Grammar];

    /// Capitalised name, as used in notes and reports
    pub fn label(self) -> &'static str {
        match self {
            IssueKind::Spelling => "Spelling",
            IssueKind::Grammar => "Grammar",
        }
    }

    /// How messages of this kind are joined on one line.
    ///
    /// Spelling findings are single words, grammar findings are sentences.
    pub fn separator(self) -> &'static str {
        match self {
            IssueKind::Spelling => ", ",
            IssueKind::Grammar => "; ",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// All findings of one kind for one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellIssue {
    pub location: CellRef,
    pub kind: IssueKind,
    pub messages: Vec<String>,
}

impl CellIssue {
    /// Duplicate messages are dropped, first occurrence kept
    pub fn new(location: CellRef, kind: IssueKind, messages: Vec<String>) -> Self {
        let mut issue = Self {
            location,
            kind,
            messages: Vec::with_capacity(messages.len()),
        };
        issue.merge(messages);
        issue
    }

    /// Append messages, skipping ones already present
    pub fn merge(&mut self, messages: impl IntoIterator<Item = String>) {
        for message in messages {
            if !self.messages.contains(&message) {
                self.messages.push(message);
            }
        }
    }

    /// Messages joined with the separator of this kind
    pub fn joined(&self) -> String {
        self.messages.join(self.kind.separator())
    }

    /// One note line, e.g. `Spelling: ths, tset`
    pub fn note_line(&self) -> String {
        format!("{}: {}", self.kind.label(), self.joined())
    }
}
