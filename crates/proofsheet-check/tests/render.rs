//! Scan then render, checking what the annotated workbook looks like

use std::sync::Arc;

use pretty_assertions::assert_eq;
use proofsheet_check::detect::{DictionarySpeller, Lexicon, RuleGrammarChecker};
use proofsheet_check::prelude::*;
use proofsheet_check::report::{build_report, listing};
use proofsheet_core::{Color, FillStyle, NumberFormat, Style, Workbook};

fn checkers() -> Checkers {
    Checkers::new(
        Arc::new(DictionarySpeller::new(Lexicon::from_words([
            "this", "is", "a", "test", "the", "quick", "fox", "total", "sales", "were", "up",
        ]))),
        Arc::new(RuleGrammarChecker::english()),
        3,
    )
}

fn workbook() -> Workbook {
    let mut workbook = Workbook::new();
    let sheet = workbook.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", "Ths is a test").unwrap();
    sheet.set_cell_value("A2", "the quick fox").unwrap();
    sheet.set_cell_value("A3", "teh quick quick fox").unwrap();
    sheet.set_cell_value("A4", "Total sales were up").unwrap();
    sheet.set_cell_value("B1", 45_658.0).unwrap();
    sheet
        .set_cell_style("B1", &Style::new().number_format(NumberFormat::date_short()))
        .unwrap();
    sheet
        .set_cell_style("A1", &Style::new().bold(true))
        .unwrap();
    workbook
}

#[test]
fn categories_and_notes() {
    let workbook = workbook();
    let index = Scanner::new(1).scan(&workbook, &checkers());
    let palette = HighlightPalette::default();
    let annotated = Renderer::new(&palette, RenderOptions::default()).render(&workbook, &index);
    let sheet = annotated.worksheet(0).unwrap();

    let fill = |row, col| sheet.cell_style_at(row, col).map(|s| s.fill.clone());
    assert_eq!(fill(0, 0), Some(FillStyle::solid(palette.spelling)));
    assert_eq!(fill(1, 0), Some(FillStyle::solid(palette.grammar)));
    assert_eq!(fill(2, 0), Some(FillStyle::solid(palette.both)));
    assert_eq!(fill(3, 0), None);
    assert!(sheet.cell_style_at(0, 0).unwrap().font.bold);

    assert_eq!(sheet.comment_at(0, 0).unwrap().text, "Spelling: ths");
    assert_eq!(
        sheet.comment_at(2, 0).unwrap().text,
        "Spelling: teh\nGrammar: Repeated word: \"quick quick\"; Sentence starts with a lowercase letter: \"teh\""
    );
    assert!(sheet.comment_at(3, 0).is_none());
}

#[test]
fn dates_and_values_are_untouched() {
    let workbook = workbook();
    let index = Scanner::new(2).scan(&workbook, &checkers());
    let annotated = Renderer::new(&HighlightPalette::default(), RenderOptions::default())
        .render(&workbook, &index);

    let before = workbook.worksheet(0).unwrap();
    let after = annotated.worksheet(0).unwrap();
    assert_eq!(after.get_value_at(0, 1), before.get_value_at(0, 1));
    assert_eq!(after.cell_style_at(0, 1), before.cell_style_at(0, 1));
    for row in 0..4 {
        assert_eq!(after.get_value_at(row, 0), before.get_value_at(row, 0));
    }
}

#[test]
fn custom_palette() {
    let palette = HighlightPalette {
        spelling: Color::rgb(1, 2, 3),
        ..HighlightPalette::default()
    };
    let workbook = workbook();
    let index = Scanner::new(1).scan(&workbook, &checkers());
    let annotated = Renderer::new(&palette, RenderOptions::default()).render(&workbook, &index);

    let style = annotated.worksheet(0).unwrap().cell_style_at(0, 0).unwrap();
    assert_eq!(style.fill.solid_color(), Some(Color::rgb(1, 2, 3)));
}

#[test]
fn report_and_summary() {
    let workbook = workbook();
    let index = Scanner::new(1).scan(&workbook, &checkers());

    let summary = Summary::from_index(&index);
    assert_eq!(summary.sheets_processed, 1);
    assert_eq!(summary.spelling_issues, 2);
    assert_eq!(summary.grammar_issues, 2);
    assert_eq!(summary.flagged_cells, 3);

    let records = build_report(&workbook, &index);
    let refs: Vec<_> = records.iter().map(|r| r.cell_reference.as_str()).collect();
    assert_eq!(refs, vec!["A1", "A2", "A3"]);
    assert_eq!(records[2].category, HighlightCategory::Both);
    assert_eq!(records[1].original_text, "the quick fox");

    let sheet = index.sheet("Sheet1").unwrap();
    assert_eq!(
        listing(sheet, IssueKind::Spelling),
        vec!["Row 1, Column 1: ths", "Row 3, Column 1: teh"]
    );
}
