//! Example: check a small workbook and save the annotated copy

use std::sync::Arc;

use proofsheet::check::detect::{DictionarySpeller, Lexicon, RuleGrammarChecker};
use proofsheet::prelude::*;

fn main() -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.worksheet_mut(0).unwrap();

    sheet.set_cell_value("A1", "Product")?;
    sheet.set_cell_value("B1", "Description")?;
    sheet.set_cell_value("A2", "Widget")?;
    sheet.set_cell_value("B2", "Teh best widget in town")?;
    sheet.set_cell_value("A3", "Gadget")?;
    sheet.set_cell_value("B3", "works with with every widget")?;
    sheet.set_cell_value("C3", 19.99)?;

    let lexicon = Lexicon::from_words([
        "product", "description", "widget", "gadget", "the", "best", "in", "town", "works",
        "with", "every",
    ]);
    let checkers = Checkers::new(
        Arc::new(DictionarySpeller::new(lexicon)),
        Arc::new(RuleGrammarChecker::english()),
        3,
    );
    let proofreader = Proofreader::with_checkers(CheckConfig::default(), Arc::new(checkers));

    let result = proofreader.check_workbook(&workbook, &ScanControl::default());
    println!("{}", result.summary);

    if let Some(annotated) = result.annotated {
        annotated.save("/tmp/products_checked.xlsx")?;
        println!("Saved /tmp/products_checked.xlsx");
    }
    Ok(())
}
