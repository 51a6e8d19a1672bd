//! End-to-end scanning behaviour

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use proofsheet_check::detect::{
    DisabledDetector, DictionarySpeller, Lexicon, LexiconSource, RuleGrammarChecker,
};
use proofsheet_check::prelude::*;
use proofsheet_check::{
    DetectorConfig, DetectorError, GrammarBackend, GrammarDetector, SpellingBackend,
    SpellingDetector,
};
use proofsheet_core::{CellAddress, CellValue, Workbook};

const WORDS: &[&str] = &[
    "this", "is", "a", "test", "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog",
    "order", "number", "total", "ok", "report", "done", "next", "step", "review",
];

fn checkers() -> Checkers {
    Checkers::new(
        Arc::new(DictionarySpeller::new(Lexicon::from_words(WORDS))),
        Arc::new(RuleGrammarChecker::english()),
        3,
    )
}

/// Records every text handed to it
#[derive(Default)]
struct Recording(Mutex<Vec<String>>);

impl Recording {
    fn seen(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl SpellingDetector for Recording {
    fn name(&self) -> &str {
        "recording"
    }

    fn check(&self, text: &str) -> Result<Vec<String>, DetectorError> {
        self.0.lock().unwrap().push(text.to_string());
        Ok(Vec::new())
    }
}

impl GrammarDetector for Recording {
    fn name(&self) -> &str {
        "recording"
    }

    fn check(&self, text: &str) -> Result<Vec<String>, DetectorError> {
        self.0.lock().unwrap().push(text.to_string());
        Ok(Vec::new())
    }
}

/// Cancels the scan once it has been called `after` times
struct CancelAfter {
    calls: AtomicUsize,
    after: usize,
    token: CancellationToken,
}

impl SpellingDetector for CancelAfter {
    fn name(&self) -> &str {
        "cancel-after"
    }

    fn check(&self, _text: &str) -> Result<Vec<String>, DetectorError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 >= self.after {
            self.token.cancel();
        }
        Ok(vec!["flagged".to_string()])
    }
}

fn large_workbook() -> Workbook {
    let texts = [
        "Ths is a tset",
        "the quick brown fox",
        "The quick brown fox jumps over the the lazy dog.",
        "42.50",
        "ok",
        "Order nmber 7",
        "12/31/2024",
        "report done.next step",
    ];
    let mut workbook = Workbook::new();
    workbook.add_worksheet_with_name("Second").unwrap();
    for (s, sheet) in workbook.worksheets_mut().enumerate() {
        for row in 0..60u32 {
            for col in 0..4u16 {
                let text = texts[(row as usize * 3 + col as usize + s) % texts.len()];
                sheet.set_cell_value_at(row, col, text).unwrap();
            }
        }
        sheet.set_cell_value_at(0, 5, 3.5).unwrap();
    }
    workbook
}

#[test]
fn scan_is_deterministic_across_thread_counts() {
    let workbook = large_workbook();
    let checkers = checkers();

    let sequential = Scanner::new(1).scan(&workbook, &checkers);
    for threads in [2, 4, 8] {
        let parallel = Scanner::new(threads).scan(&workbook, &checkers);
        assert_eq!(parallel, sequential, "threads = {}", threads);
    }
    assert_eq!(Scanner::new(1).scan(&workbook, &checkers), sequential);
    assert!(!sequential.is_clean());
    assert_eq!(
        sequential.sheet_names().collect::<Vec<_>>(),
        vec!["Sheet1", "Second"]
    );
}

#[test]
fn ths_is_a_test_is_spell_and_grammar_checked() {
    let speller = Arc::new(Recording::default());
    let grammar = Arc::new(Recording::default());
    let recording = Checkers::new(speller.clone(), grammar.clone(), 3);

    let mut workbook = Workbook::new();
    let sheet = workbook.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", "Ths is a test").unwrap();
    sheet.set_cell_value("A2", "42.50").unwrap();
    sheet.set_cell_value("A3", "ok").unwrap();
    sheet.set_cell_value("A4", "12/31/2024").unwrap();
    sheet.set_cell_value("A5", 17.0).unwrap();
    sheet.set_cell_value("A6", true).unwrap();
    sheet
        .set_cell_value_at(6, 0, CellValue::formula("UPPER(\"teh\")"))
        .unwrap();

    Scanner::new(1).scan(&workbook, &recording);

    assert_eq!(speller.seen(), vec!["Ths is a test", "ok"]);
    assert_eq!(grammar.seen(), vec!["Ths is a test"]);

    let index = Scanner::new(1).scan(&workbook, &checkers());
    let a1 = index.get(&CellRef::new("Sheet1", CellAddress::new(0, 0))).unwrap();
    assert_eq!(a1.get(IssueKind::Spelling).unwrap().messages, vec!["ths"]);
}

#[test]
fn failed_backend_leaves_other_kind_intact() {
    let config = DetectorConfig {
        language: "en-US".into(),
        spelling: SpellingBackend::Dictionary {
            lexicons: vec![LexiconSource::Hunspell {
                path: "/nonexistent/en_US.dic".into(),
            }],
            extra_words: vec![],
        },
        grammar: GrammarBackend::Rules,
        grammar_min_word_count: 3,
    };
    let degraded = Checkers::acquire(&config);
    assert!(degraded.is_disabled(IssueKind::Spelling));

    let workbook = large_workbook();
    let full = Scanner::new(2).scan(&workbook, &checkers());
    let index = Scanner::new(2).scan(&workbook, &degraded);

    assert_eq!(index.count(IssueKind::Spelling), 0);
    assert!(index.count(IssueKind::Grammar) > 0);
    assert_eq!(index.count(IssueKind::Grammar), full.count(IssueKind::Grammar));
    for issue in full.issues().filter(|i| i.kind == IssueKind::Grammar) {
        let cell = index.get(&issue.location).unwrap();
        assert_eq!(cell.get(IssueKind::Grammar), Some(issue));
    }
}

#[test]
fn cancellation_keeps_completed_cells() {
    let workbook = large_workbook();
    let control = ScanControl::new();
    let checkers = Checkers::new(
        Arc::new(CancelAfter {
            calls: AtomicUsize::new(0),
            after: 10,
            token: control.cancel.clone(),
        }),
        Arc::new(DisabledDetector::new()),
        3,
    );

    let outcome = Scanner::new(1).scan_with(&workbook, &checkers, &control);
    assert!(outcome.cancelled);

    // every completed check is recorded, nothing after the cancel point
    let progress = control.progress.snapshot();
    assert_eq!(progress.cells_visited, 10);
    assert_eq!(outcome.index.count(IssueKind::Spelling), 10);
    assert_eq!(progress.sheets_completed, 0);
    assert!(progress.cells_total > progress.cells_visited);
}

#[test]
fn pool_hands_out_shared_checkers() {
    let pool = CheckerPool::new();
    let config = DetectorConfig {
        spelling: SpellingBackend::Disabled,
        ..CheckConfig::default().detector_config()
    };

    let workbook = large_workbook();
    let first = Scanner::new(1).scan(&workbook, &pool.get_or_init(&config));
    let second = Scanner::new(1).scan(&workbook, &pool.get_or_init(&config));
    assert_eq!(first, second);
    assert_eq!(pool.len(), 1);
    assert_eq!(first.count(IssueKind::Spelling), 0);
}
