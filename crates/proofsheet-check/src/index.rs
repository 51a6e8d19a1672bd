//! Per-scan index of cell issues

use std::collections::BTreeMap;

use ahash::AHashMap;
use proofsheet_core::CellAddress;

use crate::issue::{CellIssue, CellRef, IssueKind};

/// At most one issue per kind for a single cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellIssues {
    spelling: Option<CellIssue>,
    grammar: Option<CellIssue>,
}

impl CellIssues {
    /// The issue of `kind`, if the cell has one
    pub fn get(&self, kind: IssueKind) -> Option<&CellIssue> {
        match kind {
            IssueKind::Spelling => self.spelling.as_ref(),
            IssueKind::Grammar => self.grammar.as_ref(),
        }
    }

    /// Shorthand for `get(kind).is_some()`
    pub fn has(&self, kind: IssueKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.spelling.is_none() && self.grammar.is_none()
    }

    /// Issues in kind order: spelling, then grammar
    pub fn iter(&self) -> impl Iterator<Item = &CellIssue> {
        self.spelling.iter().chain(self.grammar.iter())
    }

    fn slot(&mut self, kind: IssueKind) -> &mut Option<CellIssue> {
        match kind {
            IssueKind::Spelling => &mut self.spelling,
            IssueKind::Grammar => &mut self.grammar,
        }
    }
}

/// Issues of one worksheet, row-major
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetIssues {
    name: String,
    cells: BTreeMap<CellAddress, CellIssues>,
}

impl SheetIssues {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` for cells without findings
    pub fn get(&self, cell: CellAddress) -> Option<&CellIssues> {
        self.cells.get(&cell)
    }

    /// Flagged cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &CellIssues)> {
        self.cells.iter().map(|(&addr, issues)| (addr, issues))
    }

    /// Cells with at least one issue of any kind
    pub fn flagged_cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cells with an issue of `kind`. A cell with both kinds counts once
    /// for each.
    pub fn count(&self, kind: IssueKind) -> usize {
        self.cells.values().filter(|c| c.has(kind)).count()
    }
}

/// All issues found by one scan.
///
/// Sheets keep workbook order and include scanned sheets without findings.
/// The index is read-only once built; a new scan builds a new index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueIndex {
    sheets: Vec<SheetIssues>,
}

impl IssueIndex {
    /// Scanned sheet names in workbook order
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    /// Per-sheet issues in workbook order
    pub fn sheets(&self) -> impl Iterator<Item = &SheetIssues> {
        self.sheets.iter()
    }

    /// Issues of the sheet called `name`; `None` if it was not scanned
    pub fn sheet(&self, name: &str) -> Option<&SheetIssues> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Number of scanned sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Look up one cell by sheet name and address
    ///
    /// ```
    /// use proofsheet_check::{CellRef, IssueIndex};
    /// use proofsheet_core::CellAddress;
    ///
    /// let index = IssueIndex::default();
    /// assert!(index.get(&CellRef::new("Sheet1", CellAddress::new(0, 0))).is_none());
    /// ```
    pub fn get(&self, location: &CellRef) -> Option<&CellIssues> {
        self.sheet(&location.sheet)?.get(location.cell)
    }

    /// Every issue: sheet order, then row-major, then kind
    pub fn issues(&self) -> impl Iterator<Item = &CellIssue> {
        self.sheets
            .iter()
            .flat_map(|s| s.cells.values())
            .flat_map(CellIssues::iter)
    }

    /// Number of cells with an issue of `kind`
    pub fn count(&self, kind: IssueKind) -> usize {
        self.sheets.iter().map(|s| s.count(kind)).sum()
    }

    /// Flagged cells over all sheets
    pub fn flagged_cell_count(&self) -> usize {
        self.sheets.iter().map(SheetIssues::flagged_cell_count).sum()
    }

    /// True when no cell has any issue
    pub fn is_clean(&self) -> bool {
        self.sheets.iter().all(|s| s.cells.is_empty())
    }
}

/// Collects issues during a scan
#[derive(Debug, Default)]
pub struct IssueIndexBuilder {
    sheets: Vec<SheetIssues>,
    positions: AHashMap<String, usize>,
}

impl IssueIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sheet so it appears in the index even without findings
    pub fn begin_sheet(&mut self, name: &str) -> &mut SheetIssues {
        let idx = match self.positions.get(name) {
            Some(&idx) => idx,
            None => {
                self.sheets.push(SheetIssues {
                    name: name.to_string(),
                    cells: BTreeMap::new(),
                });
                self.positions.insert(name.to_string(), self.sheets.len() - 1);
                self.sheets.len() - 1
            }
        };
        &mut self.sheets[idx]
    }

    /// Record an issue, merging with an existing one of the same kind.
    ///
    /// Issues without messages are ignored.
    pub fn record(&mut self, issue: CellIssue) {
        if issue.messages.is_empty() {
            return;
        }
        let cell = issue.location.cell;
        let kind = issue.kind;
        let sheet = self.begin_sheet(&issue.location.sheet);
        let slot = sheet.cells.entry(cell).or_default().slot(kind);
        match slot {
            Some(existing) => existing.merge(issue.messages),
            None => *slot = Some(issue),
        }
    }

    /// Record a completed sheet's issues
    pub fn extend_sheet(&mut self, name: &str, issues: impl IntoIterator<Item = CellIssue>) {
        self.begin_sheet(name);
        for issue in issues {
            self.record(issue);
        }
    }

    /// Freeze the collected issues
    pub fn build(self) -> IssueIndex {
        IssueIndex {
            sheets: self.sheets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn issue(sheet: &str, row: u32, col: u16, kind: IssueKind, msgs: &[&str]) -> CellIssue {
        CellIssue::new(
            CellRef::new(sheet, CellAddress::new(row, col)),
            kind,
            msgs.iter().map(|m| m.to_string()).collect(),
        )
    }

    #[test]
    fn test_one_issue_per_kind_per_cell() {
        let mut builder = IssueIndexBuilder::new();
        builder.record(issue("S", 0, 0, IssueKind::Spelling, &["ths"]));
        builder.record(issue("S", 0, 0, IssueKind::Spelling, &["tset", "ths"]));
        builder.record(issue("S", 0, 0, IssueKind::Grammar, &["Lowercase start"]));
        let index = builder.build();

        let cell = index
            .get(&CellRef::new("S", CellAddress::new(0, 0)))
            .unwrap();
        assert_eq!(cell.get(IssueKind::Spelling).unwrap().messages, vec!["ths", "tset"]);
        assert!(cell.has(IssueKind::Grammar));
        assert_eq!(index.count(IssueKind::Spelling), 1);
        assert_eq!(index.issues().count(), 2);
    }

    #[test]
    fn test_order_is_sheet_then_row_major() {
        let mut builder = IssueIndexBuilder::new();
        builder.begin_sheet("First");
        builder.record(issue("Second", 2, 0, IssueKind::Spelling, &["c"]));
        builder.record(issue("Second", 0, 5, IssueKind::Grammar, &["b"]));
        builder.record(issue("First", 1, 1, IssueKind::Spelling, &["a"]));
        builder.record(issue("Second", 0, 5, IssueKind::Spelling, &["b0"]));
        let index = builder.build();

        assert_eq!(index.sheet_names().collect::<Vec<_>>(), vec!["First", "Second"]);
        let order: Vec<_> = index
            .issues()
            .map(|i| (i.location.to_string(), i.kind))
            .collect();
        assert_eq!(
            order,
            vec![
                ("First!B2".to_string(), IssueKind::Spelling),
                ("Second!F1".to_string(), IssueKind::Spelling),
                ("Second!F1".to_string(), IssueKind::Grammar),
                ("Second!A3".to_string(), IssueKind::Spelling),
            ]
        );
    }

    #[test]
    fn test_empty_results_are_not_recorded() {
        let mut builder = IssueIndexBuilder::new();
        builder.extend_sheet("S", vec![issue("S", 0, 0, IssueKind::Grammar, &[])]);
        let index = builder.build();

        assert_eq!(index.sheet_count(), 1);
        assert!(index.is_clean());
        assert_eq!(index.flagged_cell_count(), 0);
    }
}
