//! High-level pipeline: deliver a file or directory under one key prefix.
//!
//! A delivery runs in fixed phases on the calling task:
//!   - Resolve the input path to a single file or a directory
//!   - For a directory, collect every regular file beneath it and split the
//!     set into spreadsheets and plain files by extension
//!   - Expand each spreadsheet in turn, uploading one CSV per non-empty sheet
//!   - Upload plain files concurrently, at most `processes` in flight, keyed by
//!     their path relative to the supplied directory
//!
//! # Error Handling
//! Nothing here returns an error. Per-object failures are logged where they
//! happen and counted in the [`DeliveryReport`]; the remaining objects are
//! still attempted. A supplied directory that cannot be listed is logged and
//! nothing under it is uploaded; unreadable subdirectories are skipped.
//!
//! Walking the directory and parsing workbooks are blocking, so both run on
//! tokio's blocking pool.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::contract::ObjectStore;
use crate::discover::{collect_files, is_spreadsheet, partition_spreadsheets, relative_object_name};
use crate::prefix::KeyPrefix;
use crate::uploader::{upload_file, upload_sheet, UploadOutcome, UploadTarget};
use crate::workbook::{SheetExport, Workbook, WorkbookError};

pub const DEFAULT_PROCESSES: usize = 3;

/// Options shared by every upload of one invocation.
#[derive(Debug, Clone)]
pub struct DeliveryOptions {
    /// Maximum number of plain-file uploads in flight.
    pub processes: usize,
    pub dry_run: bool,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        DeliveryOptions {
            processes: DEFAULT_PROCESSES,
            dry_run: false,
        }
    }
}

/// Tally of what a delivery attempted.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub uploaded: usize,
    pub dry_run: usize,
    pub failed: usize,
    pub empty_sheets: usize,
    pub unreadable_sheets: usize,
    pub unreadable_workbooks: usize,
    pub missing_sources: usize,
}

impl DeliveryReport {
    pub fn record(&mut self, outcome: UploadOutcome) {
        match outcome {
            UploadOutcome::Uploaded => self.uploaded += 1,
            UploadOutcome::DryRun => self.dry_run += 1,
            UploadOutcome::Failed => self.failed += 1,
        }
    }

    pub fn merge(&mut self, other: DeliveryReport) {
        self.uploaded += other.uploaded;
        self.dry_run += other.dry_run;
        self.failed += other.failed;
        self.empty_sheets += other.empty_sheets;
        self.unreadable_sheets += other.unreadable_sheets;
        self.unreadable_workbooks += other.unreadable_workbooks;
        self.missing_sources += other.missing_sources;
    }

    /// Objects the store was asked for, or would have been in dry-run mode.
    pub fn attempted(&self) -> usize {
        self.uploaded + self.dry_run + self.failed
    }

    pub fn trace(&self) {
        match serde_json::to_string(self) {
            Ok(json) => debug!(report = %json, "Delivery report"),
            Err(e) => debug!(error = ?e, report = ?self, "Failed to serialize delivery report"),
        }
    }
}

/// Delivers `path`, a file or a directory, under `prefix`.
pub async fn deliver_path<S>(
    store: &S,
    prefix: &KeyPrefix,
    path: &Path,
    options: &DeliveryOptions,
) -> DeliveryReport
where
    S: ObjectStore + ?Sized,
{
    let report = match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => deliver_directory(store, prefix, path, options).await,
        Ok(_) => deliver_file(store, prefix, path, options.dry_run).await,
        Err(e) => {
            error!(path = %path.display(), error = ?e, "Cannot access delivery path");
            DeliveryReport::default()
        }
    };
    report.trace();
    report
}

/// Delivers every file beneath `root`. Spreadsheets are expanded one at a
/// time, then plain files are uploaded through a bounded pool.
pub async fn deliver_directory<S>(
    store: &S,
    prefix: &KeyPrefix,
    root: &Path,
    options: &DeliveryOptions,
) -> DeliveryReport
where
    S: ObjectStore + ?Sized,
{
    let mut report = DeliveryReport::default();

    let walk_root = root.to_path_buf();
    let listed = tokio::task::spawn_blocking(move || collect_files(&walk_root))
        .await
        .map_err(anyhow::Error::new)
        .and_then(|res| res.map_err(anyhow::Error::new));
    let files = match listed {
        Ok(files) => files,
        Err(err) => {
            error!(root = %root.display(), error = ?err, "Failed to list files for delivery");
            return report;
        }
    };
    info!(root = %root.display(), prefix = %prefix, count = files.len(), "Uploading files from directory");

    let (workbooks, plain) = partition_spreadsheets(files);
    info!(
        workbooks = workbooks.len(),
        plain = plain.len(),
        "Found Excel files and regular files"
    );

    for workbook in &workbooks {
        report.merge(expand_workbook(store, prefix, workbook, options.dry_run).await);
    }

    if plain.is_empty() {
        return report;
    }

    let processes = options.processes.max(1);
    debug!(processes, files = plain.len(), "Starting upload pool");
    let targets = plain.into_iter().map(|file| UploadTarget {
        key: prefix.key_for(&relative_object_name(root, &file)),
        local_path: file,
        dry_run: options.dry_run,
    });
    let outcomes: Vec<UploadOutcome> = stream::iter(targets)
        .map(|target| upload_file(store, target))
        .buffer_unordered(processes)
        .collect()
        .await;

    for outcome in outcomes {
        report.record(outcome);
    }
    report
}

/// Delivers one file: expanded when it is a spreadsheet, otherwise uploaded
/// as is under its file name.
pub async fn deliver_file<S>(
    store: &S,
    prefix: &KeyPrefix,
    file: &Path,
    dry_run: bool,
) -> DeliveryReport
where
    S: ObjectStore + ?Sized,
{
    if is_spreadsheet(file) {
        return expand_workbook(store, prefix, file, dry_run).await;
    }

    info!(path = %file.display(), prefix = %prefix, "Uploading single file");
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let target = UploadTarget {
        local_path: file.to_path_buf(),
        key: prefix.key_for(&name),
        dry_run,
    };

    let mut report = DeliveryReport::default();
    report.record(upload_file(store, target).await);
    report
}

/// Uploads one CSV per non-empty sheet of the workbook at `path`.
///
/// Failure to open the workbook abandons this file only; failure on one
/// sheet is logged and the next sheet is tried.
pub async fn expand_workbook<S>(
    store: &S,
    prefix: &KeyPrefix,
    path: &Path,
    dry_run: bool,
) -> DeliveryReport
where
    S: ObjectStore + ?Sized,
{
    let mut report = DeliveryReport::default();
    info!(path = %path.display(), "Processing Excel file and uploading individual sheets");

    let workbook_path = path.to_path_buf();
    let rendered = tokio::task::spawn_blocking(move || render_sheets(&workbook_path))
        .await
        .map_err(anyhow::Error::new)
        .and_then(|res| res.map_err(anyhow::Error::new));
    let sheets = match rendered {
        Ok(sheets) => sheets,
        Err(err) => {
            error!(path = %path.display(), error = ?err, "Error processing Excel file");
            report.unreadable_workbooks += 1;
            return report;
        }
    };

    if sheets.is_empty() {
        warn!(path = %path.display(), "No sheets found in workbook");
        return report;
    }
    let names: Vec<&str> = sheets.iter().map(|(name, _)| name.as_str()).collect();
    info!(count = sheets.len(), sheets = %names.join(", "), "Found sheets");

    for (sheet, export) in sheets {
        match export {
            Ok(Some(export)) => {
                report.record(upload_sheet(store, prefix, export, dry_run).await);
            }
            Ok(None) => {
                warn!(sheet = %sheet, path = %path.display(), "Sheet is empty. Skipping");
                report.empty_sheets += 1;
            }
            Err(e) => {
                let err = anyhow::Error::new(e);
                error!(sheet = %sheet, path = %path.display(), error = ?err, "Error processing sheet");
                report.unreadable_sheets += 1;
            }
        }
    }
    report
}

type SheetResult = Result<Option<SheetExport>, WorkbookError>;

/// Opens the workbook and renders every sheet in workbook order.
fn render_sheets(path: &Path) -> Result<Vec<(String, SheetResult)>, WorkbookError> {
    let mut workbook = Workbook::open(path)?;
    Ok(workbook
        .sheet_names()
        .into_iter()
        .map(|sheet| {
            let export = workbook.export_sheet(&sheet);
            (sheet, export)
        })
        .collect())
}
