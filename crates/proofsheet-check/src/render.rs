//! Turns an [`IssueIndex`] into highlights and notes on a workbook copy

use std::fmt;

use proofsheet_core::{CellComment, FillStyle, Workbook};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::HighlightPalette;
use crate::index::{CellIssues, IssueIndex};
use crate::issue::IssueKind;

/// Highlight category of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightCategory {
    None,
    Spelling,
    Grammar,
    Both,
}

impl HighlightCategory {
    /// Category for a cell with the given kinds of findings
    pub fn from_flags(spelling: bool, grammar: bool) -> Self {
        match (spelling, grammar) {
            (false, false) => HighlightCategory::None,
            (true, false) => HighlightCategory::Spelling,
            (false, true) => HighlightCategory::Grammar,
            (true, true) => HighlightCategory::Both,
        }
    }

    /// Category of a flagged cell
    pub fn from_issues(issues: &CellIssues) -> Self {
        Self::from_flags(
            issues.has(IssueKind::Spelling),
            issues.has(IssueKind::Grammar),
        )
    }

    /// Lowercase name, as written to reports
    pub fn label(self) -> &'static str {
        match self {
            HighlightCategory::None => "none",
            HighlightCategory::Spelling => "spelling",
            HighlightCategory::Grammar => "grammar",
            HighlightCategory::Both => "both",
        }
    }

    /// Legend text
    pub fn description(self) -> &'static str {
        match self {
            HighlightCategory::None => "No issues",
            HighlightCategory::Spelling => "Spelling issues",
            HighlightCategory::Grammar => "Grammar issues",
            HighlightCategory::Both => "Both spelling and grammar issues",
        }
    }
}

impl fmt::Display for HighlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Options for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Attach a note to each flagged cell, replacing any existing note
    pub notes: bool,
    pub note_author: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            notes: true,
            note_author: "proofsheet".to_string(),
        }
    }
}

/// Text of the note for a flagged cell, one line per kind
pub fn note_text(issues: &CellIssues) -> String {
    issues
        .iter()
        .map(|issue| issue.note_line())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Applies highlight fills and notes
#[derive(Debug, Clone)]
pub struct Renderer {
    palette: HighlightPalette,
    options: RenderOptions,
}

impl Renderer {
    /// A renderer using `palette` for fills and `options` for notes
    pub fn new(palette: &HighlightPalette, options: RenderOptions) -> Self {
        Self {
            palette: *palette,
            options,
        }
    }

    /// Annotated copy of `workbook`; the input is left untouched
    pub fn render(&self, workbook: &Workbook, index: &IssueIndex) -> Workbook {
        let mut annotated = workbook.clone();
        self.apply(&mut annotated, index);
        annotated
    }

    /// Annotate `workbook` in place, returning the number of cells changed.
    ///
    /// Only the fill of a flagged cell changes; font, borders, alignment and
    /// number format stay as they were. Values are never touched.
    pub fn apply(&self, workbook: &mut Workbook, index: &IssueIndex) -> usize {
        let mut changed = 0;

        for sheet_issues in index.sheets() {
            let Some(sheet) = workbook.worksheet_by_name_mut(sheet_issues.name()) else {
                warn!(sheet = sheet_issues.name(), "sheet not found, skipping highlights");
                continue;
            };

            for (addr, issues) in sheet_issues.cells() {
                let category = HighlightCategory::from_issues(issues);
                let Some(color) = self.palette.color_for(category) else {
                    continue;
                };
                if sheet.cell_at(addr.row, addr.col).is_none() {
                    warn!(sheet = sheet.name(), cell = %addr, "flagged cell does not exist");
                    continue;
                }

                let style = sheet
                    .effective_style_at(addr.row, addr.col)
                    .with_fill(FillStyle::solid(color));
                if let Err(e) = sheet.set_cell_style_at(addr.row, addr.col, &style) {
                    warn!(sheet = sheet.name(), cell = %addr, error = %e, "cannot highlight cell");
                    continue;
                }
                if self.options.notes {
                    sheet.set_comment_at(
                        addr.row,
                        addr.col,
                        CellComment::new(&self.options.note_author, note_text(issues)),
                    );
                }
                changed += 1;
            }
            debug!(sheet = sheet_issues.name(), "highlights applied");
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IssueIndexBuilder;
    use crate::issue::{CellIssue, CellRef};
    use pretty_assertions::assert_eq;
    use proofsheet_core::{CellAddress, Color, Style};

    fn issue(row: u32, col: u16, kind: IssueKind, msgs: &[&str]) -> CellIssue {
        CellIssue::new(
            CellRef::new("Sheet1", CellAddress::new(row, col)),
            kind,
            msgs.iter().map(|m| m.to_string()).collect(),
        )
    }

    fn sample() -> (Workbook, IssueIndex) {
        let mut workbook = Workbook::new();
        let sheet = workbook.worksheet_mut(0).unwrap();
        sheet.set_cell_value("A1", "Ths is a tset").unwrap();
        sheet.set_cell_value("A2", "this is is fine").unwrap();
        sheet.set_cell_value("A3", "teh end of of it").unwrap();
        sheet.set_cell_value("A4", "Clean text here").unwrap();
        sheet.set_cell_value("B1", 42.5).unwrap();

        let mut builder = IssueIndexBuilder::new();
        builder.record(issue(0, 0, IssueKind::Spelling, &["ths", "tset"]));
        builder.record(issue(1, 0, IssueKind::Grammar, &["Repeated word: \"is is\""]));
        builder.record(issue(2, 0, IssueKind::Spelling, &["teh"]));
        builder.record(issue(2, 0, IssueKind::Grammar, &["Repeated word: \"of of\""]));
        (workbook, builder.build())
    }

    fn fill_at(workbook: &Workbook, row: u32, col: u16) -> Option<Color> {
        workbook
            .worksheet(0)
            .unwrap()
            .cell_style_at(row, col)
            .and_then(|s| s.fill.solid_color())
    }

    #[test]
    fn test_category_table() {
        assert_eq!(HighlightCategory::from_flags(false, false), HighlightCategory::None);
        assert_eq!(HighlightCategory::from_flags(true, false), HighlightCategory::Spelling);
        assert_eq!(HighlightCategory::from_flags(false, true), HighlightCategory::Grammar);
        assert_eq!(HighlightCategory::from_flags(true, true), HighlightCategory::Both);
    }

    #[test]
    fn test_fills_follow_palette() {
        let (workbook, index) = sample();
        let palette = HighlightPalette::default();
        let annotated = Renderer::new(&palette, RenderOptions::default()).render(&workbook, &index);

        assert_eq!(fill_at(&annotated, 0, 0), Some(palette.spelling));
        assert_eq!(fill_at(&annotated, 1, 0), Some(palette.grammar));
        assert_eq!(fill_at(&annotated, 2, 0), Some(palette.both));
        assert_eq!(fill_at(&annotated, 3, 0), None);

        // the input is not modified
        assert_eq!(fill_at(&workbook, 0, 0), None);
    }

    #[test]
    fn test_unflagged_cells_are_unchanged() {
        let (workbook, index) = sample();
        let annotated =
            Renderer::new(&HighlightPalette::default(), RenderOptions::default()).render(&workbook, &index);

        let before = workbook.worksheet(0).unwrap();
        let after = annotated.worksheet(0).unwrap();
        for (row, col) in [(3, 0), (0, 1)] {
            assert_eq!(before.get_value_at(row, col), after.get_value_at(row, col));
            assert_eq!(
                before.cell_style_index_at(row, col),
                after.cell_style_index_at(row, col)
            );
            assert!(after.comment_at(row, col).is_none());
        }
        assert_eq!(after.get_value_at(0, 0), before.get_value_at(0, 0));
    }

    #[test]
    fn test_existing_style_is_kept() {
        let (mut workbook, index) = sample();
        let sheet = workbook.worksheet_mut(0).unwrap();
        sheet
            .set_cell_style("A1", &Style::new().bold(true).fill_color(Color::rgb(0, 255, 0)))
            .unwrap();

        let annotated =
            Renderer::new(&HighlightPalette::default(), RenderOptions::default()).render(&workbook, &index);
        let style = annotated.worksheet(0).unwrap().cell_style_at(0, 0).unwrap();
        assert!(style.font.bold);
        assert_eq!(style.fill, FillStyle::solid(Color::rgb(0xFF, 0xCC, 0xCC)));
    }

    #[test]
    fn test_notes_replace_existing() {
        let (mut workbook, index) = sample();
        workbook
            .worksheet_mut(0)
            .unwrap()
            .set_comment("A3", CellComment::new("someone", "old note"))
            .unwrap();

        let annotated =
            Renderer::new(&HighlightPalette::default(), RenderOptions::default()).render(&workbook, &index);
        let note = annotated.worksheet(0).unwrap().comment_at(2, 0).unwrap();
        assert_eq!(note.author, "proofsheet");
        assert_eq!(note.text, "Spelling: teh\nGrammar: Repeated word: \"of of\"");

        // rendering the annotated copy again yields the same notes
        let twice =
            Renderer::new(&HighlightPalette::default(), RenderOptions::default()).render(&annotated, &index);
        assert_eq!(twice.worksheet(0).unwrap().comment_count(), 3);
        assert_eq!(twice.worksheet(0).unwrap().comment_at(2, 0), Some(note));
    }

    #[test]
    fn test_notes_can_be_disabled() {
        let (workbook, index) = sample();
        let options = RenderOptions {
            notes: false,
            ..RenderOptions::default()
        };
        let mut annotated = workbook.clone();
        let changed = Renderer::new(&HighlightPalette::default(), options).apply(&mut annotated, &index);

        assert_eq!(changed, 3);
        assert_eq!(annotated.worksheet(0).unwrap().comment_count(), 0);
    }

    #[test]
    fn test_missing_sheet_is_skipped() {
        let (_, index) = sample();
        let mut other = Workbook::empty();
        other.add_worksheet_with_name("Other").unwrap();

        let changed = Renderer::new(&HighlightPalette::default(), RenderOptions::default())
            .apply(&mut other, &index);
        assert_eq!(changed, 0);
    }
}
