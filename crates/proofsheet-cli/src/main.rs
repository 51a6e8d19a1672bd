//! proofsheet CLI - spelling and grammar highlighting for spreadsheets

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use proofsheet::check::classify;
use proofsheet::check::detect::LexiconSource;
use proofsheet::check::report::{listing, write_report_file};
use proofsheet::prelude::*;
use proofsheet::{open_workbook, GrammarBackend, ReportFormat, SpellingBackend};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "proofsheet")]
#[command(
    author,
    version,
    about = "Highlight spelling and grammar issues in spreadsheets"
)]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check spreadsheets and write annotated copies
    Check(CheckArgs),

    /// Show information about a spreadsheet
    Info {
        /// Input spreadsheet file (xlsx, xlsm, csv)
        input: PathBuf,
    },

    /// List all sheets in a workbook
    Sheets {
        /// Input spreadsheet file
        input: PathBuf,
    },
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Input spreadsheet files (xlsx, xlsm, csv)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for annotated copies (default: next to each input)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Language tag, e.g. en-US
    #[arg(short, long)]
    language: Option<String>,

    /// Worker threads (0 = one per core)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Word list to check spelling against (repeatable, replaces the system dictionary)
    #[arg(short = 'w', long = "words")]
    word_lists: Vec<PathBuf>,

    /// Hunspell .dic file to check spelling against (repeatable)
    #[arg(long = "hunspell")]
    hunspell: Vec<PathBuf>,

    /// Extra accepted word (repeatable)
    #[arg(short = 'a', long = "accept")]
    accept: Vec<String>,

    /// Skip spelling checks
    #[arg(long)]
    no_spelling: bool,

    /// Grammar backend
    #[arg(short, long, value_enum)]
    grammar: Option<GrammarChoice>,

    /// LanguageTool server URL, implies --grammar languagetool
    #[arg(long)]
    languagetool_url: Option<String>,

    /// Highlight cells without adding notes
    #[arg(long)]
    no_notes: bool,

    /// Also write an issue report per file (<stem>_issues.<ext>)
    #[arg(short, long, value_enum)]
    report: Option<ReportChoice>,

    /// Print only the per-file summaries
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum GrammarChoice {
    Rules,
    Languagetool,
    Off,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportChoice {
    Csv,
    Json,
}

impl From<ReportChoice> for ReportFormat {
    fn from(choice: ReportChoice) -> Self {
        match choice {
            ReportChoice::Csv => ReportFormat::Csv,
            ReportChoice::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check(args) => check(&args),
        Commands::Info { input } => show_info(&input),
        Commands::Sheets { input } => list_sheets(&input),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Layer command-line flags over the config file (or defaults)
fn load_config(args: &CheckArgs) -> Result<CheckConfig> {
    let mut config = match &args.config {
        Some(path) => CheckConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => CheckConfig::default(),
    };

    if let Some(language) = &args.language {
        config.language = language.clone();
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if args.no_notes {
        config.notes = false;
    }

    if args.no_spelling {
        config.spelling = SpellingBackend::Disabled;
    } else if !args.word_lists.is_empty() || !args.hunspell.is_empty() || !args.accept.is_empty()
    {
        let (mut lexicons, mut extra_words) = match std::mem::take(&mut config.spelling) {
            SpellingBackend::Dictionary {
                lexicons,
                extra_words,
            } => (lexicons, extra_words),
            SpellingBackend::Disabled => (Vec::new(), Vec::new()),
        };
        lexicons.extend(
            args.word_lists
                .iter()
                .map(|path| LexiconSource::WordList { path: path.clone() }),
        );
        lexicons.extend(
            args.hunspell
                .iter()
                .map(|path| LexiconSource::Hunspell { path: path.clone() }),
        );
        extra_words.extend(args.accept.iter().cloned());
        config.spelling = SpellingBackend::Dictionary {
            lexicons,
            extra_words,
        };
    }

    match (args.grammar, &args.languagetool_url) {
        (Some(GrammarChoice::Off), _) => config.grammar = GrammarBackend::Disabled,
        (Some(GrammarChoice::Rules), _) => config.grammar = GrammarBackend::Rules,
        (_, Some(url)) => config.grammar = GrammarBackend::LanguageTool { url: url.clone() },
        (Some(GrammarChoice::Languagetool), None) => match &config.grammar {
            GrammarBackend::LanguageTool { .. } => {}
            _ => bail!("--grammar languagetool needs --languagetool-url or a config entry"),
        },
        (None, None) => {}
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn check(args: &CheckArgs) -> Result<()> {
    let config = load_config(args)?;
    let pool = CheckerPool::new();
    let proofreader =
        Proofreader::new(config, &pool).context("Failed to set up spelling and grammar checks")?;

    for kind in [IssueKind::Spelling, IssueKind::Grammar] {
        if proofreader.checkers().is_disabled(kind) {
            eprintln!("Note: {} checks are disabled", kind);
        }
    }

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create '{}'", dir.display()))?;
    }

    let control = ScanControl::new();
    let batch = run_with_progress(&control, !args.quiet, || {
        proofreader.check_batch(&args.inputs, args.out_dir.as_deref(), &control)
    });

    let mut wrote_any = false;
    for entry in &batch.entries {
        println!("== {} ==", entry.input.display());
        match &entry.result {
            Ok(file) => {
                print_file(file, args.quiet);
                if let Some(choice) = args.report {
                    let path = write_report(file, choice.into(), args.out_dir.as_deref())?;
                    println!("Report: {}", path.display());
                }
                wrote_any |= file.output.is_some();
            }
            Err(e) => println!("Error: {}", e),
        }
        println!();
    }

    if wrote_any && !args.quiet {
        println!("Legend:");
        for (category, color) in proofreader.config().palette.legend() {
            println!("  {}  {}", color, category.description());
        }
    }

    pool.shutdown();

    if batch.cancelled {
        bail!("Check cancelled");
    }
    let failed = batch.failed().count();
    if failed > 0 {
        bail!(
            "{} of {} files could not be checked",
            failed,
            batch.entries.len()
        );
    }
    Ok(())
}

fn print_file(file: &FileCheck, quiet: bool) {
    println!("{}", file.summary);
    if quiet {
        return;
    }

    for sheet in file.index.sheets() {
        let spelling = listing(sheet, IssueKind::Spelling);
        let grammar = listing(sheet, IssueKind::Grammar);
        if spelling.is_empty() && grammar.is_empty() {
            continue;
        }
        println!("Sheet '{}':", sheet.name());
        for (label, lines) in [("Spelling", spelling), ("Grammar", grammar)] {
            if lines.is_empty() {
                continue;
            }
            println!("  {}:", label);
            for line in lines {
                println!("    {}", line);
            }
        }
    }

    match &file.output {
        Some(output) => println!("Annotated copy: {}", output.display()),
        None if file.summary.has_issues() => println!("No annotated copy (check was cancelled)"),
        None => {}
    }
}

fn write_report(file: &FileCheck, format: ReportFormat, out_dir: Option<&Path>) -> Result<PathBuf> {
    let stem = file
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("workbook");
    let name = format!("{}_issues.{}", stem, format.extension());
    let path = match out_dir.or_else(|| file.input.parent()) {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    };
    write_report_file(&file.records, &path, format)
        .with_context(|| format!("Failed to write report '{}'", path.display()))?;
    Ok(path)
}

/// Run `work` while redrawing a progress line on stderr when it is a terminal
fn run_with_progress<T>(control: &ScanControl, show: bool, work: impl FnOnce() -> T) -> T {
    if !show || !std::io::stderr().is_terminal() {
        return work();
    }

    let done = AtomicBool::new(false);
    std::thread::scope(|scope| {
        scope.spawn(|| {
            let mut stderr = std::io::stderr();
            while !done.load(Ordering::Relaxed) {
                let snapshot = control.progress.snapshot();
                let _ = write!(
                    stderr,
                    "\rScanning sheet {}/{}  {:>3.0}%",
                    (snapshot.sheets_completed + 1).min(snapshot.sheets_total.max(1)),
                    snapshot.sheets_total.max(1),
                    snapshot.fraction() * 100.0
                );
                let _ = stderr.flush();
                std::thread::sleep(Duration::from_millis(100));
            }
            let _ = write!(stderr, "\r{:40}\r", "");
        });

        let result = work();
        done.store(true, Ordering::Relaxed);
        result
    })
}

fn show_info(input: &Path) -> Result<()> {
    let workbook =
        open_workbook(input).with_context(|| format!("Failed to open '{}'", input.display()))?;

    println!("File: {}", input.display());
    println!("Sheets: {}", workbook.sheet_count());

    for (i, sheet) in workbook.worksheets().enumerate() {
        let text_cells = sheet
            .iter_cells()
            .filter(|(_, _, cell)| classify::is_checkable(&cell.value))
            .count();

        println!();
        print!("  Sheet {}: \"{}\"", i, sheet.name());
        if !sheet.is_visible() {
            print!(" (hidden)");
        }
        println!();
        match sheet.used_bounds() {
            Some((start, end)) => println!(
                "    Used range: {}:{}",
                start.to_a1_string(),
                end.to_a1_string()
            ),
            None => println!("    Used range: empty"),
        }
        println!("    Cells: {}", sheet.cell_count());
        println!("    Checkable text cells: {}", text_cells);
        println!("    Notes: {}", sheet.comment_count());
    }

    Ok(())
}

fn list_sheets(input: &Path) -> Result<()> {
    let workbook =
        open_workbook(input).with_context(|| format!("Failed to open '{}'", input.display()))?;

    for (i, sheet) in workbook.worksheets().enumerate() {
        println!("{}\t{}", i, sheet.name());
    }

    Ok(())
}
