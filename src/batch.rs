use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{error, info, warn};

use crate::export;
use crate::grid;
use crate::import::{self, SkipReason};
use crate::operations;

/// Extensions picked up from the input folder.
const INPUT_EXTENSIONS: &[&str] = &["xls", "xlsx", "csv"];

/// Suffix of the entries tables written next to their inputs. A later run
/// over the same folder must not ingest its own artifacts.
const ENTRIES_SUFFIX: &str = "_entries";

/// Per-file outcome of the pipeline.
#[derive(Debug)]
pub enum FileOutcome {
    Processed {
        report_path: PathBuf,
        entries_path: PathBuf,
        records: usize,
        invoices: usize,
    },
    Skipped(SkipReason),
}

/// Counts for one batch run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Process every export file in `input_dir`, writing reports into
/// `report_dir` and entries tables beside their inputs.
///
/// Files are handled strictly sequentially and in isolation: a skipped or
/// failing file is logged and the batch moves on. Nothing a single file does
/// aborts the run.
pub fn run(input_dir: &Path, report_dir: &Path) -> Result<RunSummary> {
    let files = spreadsheet_files(input_dir)?;
    if files.is_empty() {
        warn!("no spreadsheet files found in {}", input_dir.display());
    }
    std::fs::create_dir_all(report_dir)
        .with_context(|| format!("failed to create report folder {}", report_dir.display()))?;

    let mut summary = RunSummary::default();
    for file in &files {
        match process_file(file, report_dir) {
            Ok(FileOutcome::Processed {
                records,
                invoices,
                report_path,
                ..
            }) => {
                info!(
                    "{}: {} record(s), {} invoice(s), report at {}",
                    file.display(),
                    records,
                    invoices,
                    report_path.display()
                );
                summary.processed += 1;
            }
            Ok(FileOutcome::Skipped(reason)) => {
                warn!("skipping {}: {}", file.display(), reason);
                summary.skipped += 1;
            }
            Err(err) => {
                error!("failed to process {}: {:#}", file.display(), err);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// Run the whole pipeline for one file: load the grid, extract, aggregate,
/// classify and write both artifacts. Structural problems surface as a
/// [`FileOutcome::Skipped`]; anything else is an error for the caller to log.
pub fn process_file(path: &Path, report_dir: &Path) -> Result<FileOutcome> {
    let grid = grid::load_grid(path)?;
    let extraction = match import::extract(&grid) {
        Ok(extraction) => extraction,
        Err(reason) => return Ok(FileOutcome::Skipped(reason)),
    };
    let aggregates = operations::aggregate_by_invoice(&extraction.records);
    let reconciliation = operations::reconcile(aggregates, extraction.prior_balance);

    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("spreadsheet");
    let report_path = report_dir.join(format!("{stem}_report.txt"));
    let entries_path = path.with_file_name(format!("{stem}{ENTRIES_SUFFIX}.csv"));

    export::write_report(&report_path, &export::report_lines(&reconciliation))?;
    export::write_entries(&entries_path, &extraction.records)?;

    Ok(FileOutcome::Processed {
        report_path,
        entries_path,
        records: extraction.records.len(),
        invoices: reconciliation.lines.len(),
    })
}

fn spreadsheet_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(input_dir)
        .with_context(|| format!("failed to read input folder {}", input_dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let known_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                INPUT_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });
        if !known_extension {
            continue;
        }
        let own_artifact = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| stem.ends_with(ENTRIES_SUFFIX));
        if own_artifact {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}
