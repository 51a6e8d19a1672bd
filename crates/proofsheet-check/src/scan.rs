//! Sheet scanning
//!
//! The scanner walks every worksheet in workbook order, hands checkable
//! text cells to the detectors and collects the findings into an
//! [`IssueIndex`]. Cells of one sheet are checked in parallel on a
//! scanner-owned rayon pool; results are gathered in row-major order before
//! they reach the index, so the index never depends on scheduling.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use proofsheet_core::{CellAddress, Workbook, Worksheet};
use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{debug, info, warn};

use crate::checkers::Checkers;
use crate::classify;
use crate::index::{IssueIndex, IssueIndexBuilder};
use crate::issue::{CellIssue, CellRef, IssueKind};

/// Cooperative cancellation flag shared with a running scan
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the scan to stop. Cells already being checked finish first.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`cancel`](Self::cancel) was called on this token or a clone
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters a caller can poll while a scan runs
#[derive(Debug, Default)]
pub struct ScanProgress {
    sheets_total: AtomicUsize,
    sheets_completed: AtomicUsize,
    cells_total: AtomicUsize,
    cells_visited: AtomicUsize,
}

/// Point-in-time copy of [`ScanProgress`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub sheets_total: usize,
    pub sheets_completed: usize,
    pub cells_total: usize,
    pub cells_visited: usize,
}

impl ProgressSnapshot {
    /// Completed share of checkable cells, 1.0 when there is nothing to check
    pub fn fraction(&self) -> f64 {
        if self.cells_total == 0 {
            1.0
        } else {
            self.cells_visited as f64 / self.cells_total as f64
        }
    }
}

impl ScanProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counters. Each is read on its own, so a snapshot taken
    /// mid-scan may mix two moments.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            sheets_total: self.sheets_total.load(Ordering::Relaxed),
            sheets_completed: self.sheets_completed.load(Ordering::Relaxed),
            cells_total: self.cells_total.load(Ordering::Relaxed),
            cells_visited: self.cells_visited.load(Ordering::Relaxed),
        }
    }

    fn start(&self, sheets: usize, cells: usize) {
        self.sheets_total.store(sheets, Ordering::Relaxed);
        self.sheets_completed.store(0, Ordering::Relaxed);
        self.cells_total.store(cells, Ordering::Relaxed);
        self.cells_visited.store(0, Ordering::Relaxed);
    }
}

/// Cancellation and progress for one scan
#[derive(Debug, Clone, Default)]
pub struct ScanControl {
    pub cancel: CancellationToken,
    pub progress: Arc<ScanProgress>,
}

impl ScanControl {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of [`Scanner::scan_with`]
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Findings for every cell whose checks completed
    pub index: IssueIndex,
    pub cancelled: bool,
}

/// Builds an [`IssueIndex`] from a workbook
#[derive(Debug, Clone)]
pub struct Scanner {
    pool: Option<Arc<ThreadPool>>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Scanner {
    /// Scanner with its own pool of `threads` workers.
    ///
    /// `0` uses every available core and `1` scans on the calling thread.
    /// When no pool can be built the scanner also runs on the calling thread.
    pub fn new(threads: usize) -> Self {
        let pool = if threads == 1 {
            None
        } else {
            build_pool(threads).map(Arc::new)
        };
        Self { pool }
    }

    /// Share an existing pool
    pub fn with_thread_pool(pool: Arc<ThreadPool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// False when every scan runs on the calling thread
    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Scan to completion without progress reporting
    pub fn scan(&self, workbook: &Workbook, checkers: &Checkers) -> IssueIndex {
        self.scan_with(workbook, checkers, &ScanControl::default())
            .index
    }

    /// Scan with cancellation and progress reporting.
    ///
    /// Cancellation is checked between cells. A cancelled scan still returns
    /// the findings of every cell that was fully checked.
    pub fn scan_with(
        &self,
        workbook: &Workbook,
        checkers: &Checkers,
        control: &ScanControl,
    ) -> ScanOutcome {
        let sheets: Vec<(&Worksheet, Vec<(CellAddress, &str)>)> = workbook
            .worksheets()
            .map(|sheet| (sheet, checkable_cells(sheet)))
            .collect();
        let total_cells = sheets.iter().map(|(_, cells)| cells.len()).sum();
        control.progress.start(sheets.len(), total_cells);

        let mut builder = IssueIndexBuilder::new();
        let mut cancelled = false;

        for (sheet, cells) in &sheets {
            if control.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let name = sheet.name();
            debug!(sheet = name, cells = cells.len(), "scanning sheet");

            let check = |&(cell, text): &(CellAddress, &str)| check_cell(name, cell, text, checkers, control);
            let results: Vec<Option<Vec<CellIssue>>> = match &self.pool {
                Some(pool) => pool.install(|| cells.par_iter().map(check).collect()),
                None => cells.iter().map(check).collect(),
            };

            let finished = results.iter().all(Option::is_some);
            builder.extend_sheet(name, results.into_iter().flatten().flatten());

            if !finished {
                cancelled = true;
                debug!(sheet = name, "scan cancelled mid-sheet");
                break;
            }
            control.progress.sheets_completed.fetch_add(1, Ordering::Relaxed);
            debug!(sheet = name, "sheet scanned");
        }

        let index = builder.build();
        if cancelled {
            warn!(
                sheets = index.sheet_count(),
                flagged = index.flagged_cell_count(),
                "scan cancelled"
            );
        } else {
            info!(
                sheets = index.sheet_count(),
                spelling = index.count(IssueKind::Spelling),
                grammar = index.count(IssueKind::Grammar),
                "scan finished"
            );
        }
        ScanOutcome { index, cancelled }
    }
}

/// Checkable text cells in row-major order
fn checkable_cells(sheet: &Worksheet) -> Vec<(CellAddress, &str)> {
    sheet
        .iter_cells()
        .filter(|(_, _, data)| classify::is_checkable(&data.value))
        .filter_map(|(row, col, data)| {
            data.value
                .as_text()
                .map(|text| (CellAddress::new(row, col), text))
        })
        .collect()
}

/// `None` when the scan was cancelled before this cell was checked
fn check_cell(
    sheet: &str,
    cell: CellAddress,
    text: &str,
    checkers: &Checkers,
    control: &ScanControl,
) -> Option<Vec<CellIssue>> {
    if control.cancel.is_cancelled() {
        return None;
    }

    let spelling = checkers.spelling(text);
    let grammar = checkers.grammar(text);
    control.progress.cells_visited.fetch_add(1, Ordering::Relaxed);

    let location = CellRef::new(sheet, cell);
    let mut issues = Vec::with_capacity(2);
    if !spelling.is_empty() {
        issues.push(CellIssue::new(location.clone(), IssueKind::Spelling, spelling));
    }
    if !grammar.is_empty() {
        issues.push(CellIssue::new(location, IssueKind::Grammar, grammar));
    }
    Some(issues)
}

fn build_pool(threads: usize) -> Option<ThreadPool> {
    let requested = if threads == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        threads
    };
    let try_build = |n| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .thread_name(|i| format!("proofsheet-scan-{}", i))
            .build()
    };

    match try_build(requested) {
        Ok(pool) => Some(pool),
        Err(e) if requested > 1 => {
            warn!(error = %e, threads = requested, "cannot build scan pool, retrying with one thread");
            try_build(1).ok()
        }
        Err(e) => {
            warn!(error = %e, "cannot build scan pool, scanning on the calling thread");
            None
        }
    }
}
