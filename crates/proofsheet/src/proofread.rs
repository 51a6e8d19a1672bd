//! Checking files end to end: open, scan, annotate, save

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use proofsheet_check::report::build_report;
use proofsheet_check::{
    CheckConfig, CheckerPool, Checkers, ConfigError, IssueIndex, Renderer, ReportRecord,
    ScanControl, Scanner, Summary,
};
use proofsheet_core::Workbook;
use proofsheet_xlsx::{XlsxError, XlsxWriter};
use thiserror::Error;
use tracing::{info, warn};

use crate::format::{file_stem, open_workbook, InputError};

/// Errors raised while checking a file
#[derive(Debug, Error)]
pub enum CheckError {
    /// The input could not be parsed
    #[error("cannot read {}: {source}", path.display())]
    MalformedInput {
        path: PathBuf,
        #[source]
        source: InputError,
    },

    /// The annotated workbook could not be written
    #[error("cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },

    #[error("cannot create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// `report.xlsx` -> `report_checked.xlsx`; every input format yields XLSX
pub fn checked_file_name(input: &Path) -> String {
    let stem = file_stem(input);
    let stem = if stem.is_empty() { "workbook" } else { stem.as_str() };
    format!("{}_checked.xlsx", stem)
}

/// Where the annotated copy of `input` is written
pub fn output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let dir = out_dir
        .or_else(|| input.parent())
        .unwrap_or_else(|| Path::new(""));
    dir.join(checked_file_name(input))
}

/// [`output_path`], numbered `<stem>_checked (2).xlsx`, `(3)`... when an
/// earlier file of the same batch already claimed the name
fn claim_output_path(
    input: &Path,
    out_dir: Option<&Path>,
    claimed: &mut HashSet<PathBuf>,
) -> PathBuf {
    let first = output_path(input, out_dir);
    let mut path = first.clone();
    let mut n = 2;
    while claimed.contains(&path) {
        let name = checked_file_name(input);
        let stem = name.trim_end_matches(".xlsx");
        path = first.with_file_name(format!("{} ({}).xlsx", stem, n));
        n += 1;
    }
    claimed.insert(path.clone());
    path
}

/// Outcome of checking one in-memory workbook
#[derive(Debug, Clone)]
pub struct WorkbookCheck {
    pub index: IssueIndex,
    pub summary: Summary,
    pub cancelled: bool,
    /// Present only when issues were found and the scan ran to completion
    pub annotated: Option<Workbook>,
}

/// Outcome of checking one file
#[derive(Debug, Clone)]
pub struct FileCheck {
    pub input: PathBuf,
    /// The annotated workbook, written only when issues were found
    pub output: Option<PathBuf>,
    pub summary: Summary,
    pub index: IssueIndex,
    pub records: Vec<ReportRecord>,
    pub cancelled: bool,
}

/// One file of a batch
#[derive(Debug)]
pub struct BatchEntry {
    pub input: PathBuf,
    pub result: Result<FileCheck, CheckError>,
}

/// Results of a batch, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    /// Set when the batch stopped before every file was checked
    pub cancelled: bool,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &FileCheck> {
        self.entries.iter().filter_map(|e| e.result.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Path, &CheckError)> {
        self.entries
            .iter()
            .filter_map(|e| e.result.as_ref().err().map(|err| (e.input.as_path(), err)))
    }

    /// Counts summed over every successful file
    pub fn total(&self) -> Summary {
        let mut total = Summary::default();
        for check in self.succeeded() {
            total.add(&check.summary);
        }
        total
    }
}

/// Checks workbooks with one configuration
#[derive(Debug)]
pub struct Proofreader {
    config: CheckConfig,
    checkers: Arc<Checkers>,
    scanner: Scanner,
    renderer: Renderer,
}

impl Proofreader {
    /// Validate `config` and take its detectors from `pool`
    pub fn new(config: CheckConfig, pool: &CheckerPool) -> Result<Self, CheckError> {
        config.validate()?;
        let checkers = pool.get_or_init(&config.detector_config());
        Ok(Self::with_checkers(config, checkers))
    }

    /// Use already initialised detectors
    pub fn with_checkers(config: CheckConfig, checkers: Arc<Checkers>) -> Self {
        let scanner = Scanner::new(config.threads);
        let renderer = Renderer::new(&config.palette, config.render_options());
        Self {
            config,
            checkers,
            scanner,
            renderer,
        }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    pub fn checkers(&self) -> &Checkers {
        &self.checkers
    }

    pub fn check_workbook(&self, workbook: &Workbook, control: &ScanControl) -> WorkbookCheck {
        let outcome = self.scanner.scan_with(workbook, &self.checkers, control);
        let summary = Summary::from_index(&outcome.index);
        let annotated = (summary.has_issues() && !outcome.cancelled)
            .then(|| self.renderer.render(workbook, &outcome.index));
        WorkbookCheck {
            index: outcome.index,
            summary,
            cancelled: outcome.cancelled,
            annotated,
        }
    }

    pub fn check_file(&self, input: &Path, out_dir: Option<&Path>) -> Result<FileCheck, CheckError> {
        self.check_file_with(input, out_dir, &ScanControl::default())
    }

    /// Check one file, writing `<stem>_checked.xlsx` next to it or into
    /// `out_dir` when issues are found
    pub fn check_file_with(
        &self,
        input: &Path,
        out_dir: Option<&Path>,
        control: &ScanControl,
    ) -> Result<FileCheck, CheckError> {
        self.check_file_claiming(input, out_dir, control, &mut HashSet::new())
    }

    fn check_file_claiming(
        &self,
        input: &Path,
        out_dir: Option<&Path>,
        control: &ScanControl,
        claimed: &mut HashSet<PathBuf>,
    ) -> Result<FileCheck, CheckError> {
        let workbook = open_workbook(input).map_err(|source| CheckError::MalformedInput {
            path: input.to_path_buf(),
            source,
        })?;
        let check = self.check_workbook(&workbook, control);
        let records = build_report(&workbook, &check.index);

        let output = match &check.annotated {
            Some(annotated) => {
                let path = claim_output_path(input, out_dir, claimed);
                if let Some(dir) = out_dir {
                    fs::create_dir_all(dir).map_err(|source| CheckError::Io {
                        path: dir.to_path_buf(),
                        source,
                    })?;
                }
                XlsxWriter::write_file(annotated, &path).map_err(|source| CheckError::Output {
                    path: path.clone(),
                    source,
                })?;
                Some(path)
            }
            None => None,
        };

        info!(
            input = %input.display(),
            spelling = check.summary.spelling_issues,
            grammar = check.summary.grammar_issues,
            output = output.as_ref().map(|p| p.display().to_string()).unwrap_or_default(),
            "file checked"
        );

        Ok(FileCheck {
            input: input.to_path_buf(),
            output,
            summary: check.summary,
            index: check.index,
            records,
            cancelled: check.cancelled,
        })
    }

    /// Check several files; a failing file is recorded and the rest still run.
    ///
    /// Inputs sharing a stem (`data.xlsx`, `data.csv`) get distinct outputs,
    /// so no file of the batch overwrites another's annotations.
    pub fn check_batch<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        out_dir: Option<&Path>,
        control: &ScanControl,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let mut claimed = HashSet::new();
        for input in inputs {
            if control.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            let input = input.as_ref();
            let result = self.check_file_claiming(input, out_dir, control, &mut claimed);
            match &result {
                Ok(check) if check.cancelled => report.cancelled = true,
                Ok(_) => {}
                Err(e) => warn!(input = %input.display(), error = %e, "file skipped"),
            }
            report.entries.push(BatchEntry {
                input: input.to_path_buf(),
                result,
            });
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_file_name() {
        assert_eq!(checked_file_name(Path::new("dir/report.xlsx")), "report_checked.xlsx");
        assert_eq!(checked_file_name(Path::new("data.csv")), "data_checked.xlsx");
        assert_eq!(checked_file_name(Path::new("old.xls")), "old_checked.xlsx");
        assert_eq!(checked_file_name(Path::new("")), "workbook_checked.xlsx");
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("in/report.xlsx"), None),
            PathBuf::from("in/report_checked.xlsx")
        );
        assert_eq!(
            output_path(Path::new("in/report.xlsx"), Some(Path::new("out"))),
            PathBuf::from("out/report_checked.xlsx")
        );
        assert_eq!(
            output_path(Path::new("report.xlsx"), None),
            PathBuf::from("report_checked.xlsx")
        );
    }

    #[test]
    fn test_claim_output_path_numbers_repeated_stems() {
        let mut claimed = HashSet::new();
        let out = Some(Path::new("out"));
        assert_eq!(
            claim_output_path(Path::new("a/data.xlsx"), out, &mut claimed),
            PathBuf::from("out/data_checked.xlsx")
        );
        assert_eq!(
            claim_output_path(Path::new("b/data.csv"), out, &mut claimed),
            PathBuf::from("out/data_checked (2).xlsx")
        );
        assert_eq!(
            claim_output_path(Path::new("data.tsv"), out, &mut claimed),
            PathBuf::from("out/data_checked (3).xlsx")
        );
        assert_eq!(
            claim_output_path(Path::new("other.csv"), out, &mut claimed),
            PathBuf::from("out/other_checked.xlsx")
        );
    }
}
