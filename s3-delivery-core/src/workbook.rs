//! Expands a spreadsheet into one CSV export per non-empty sheet.
//!
//! The first row of every sheet is treated as its header. A sheet with no rows
//! below the header has no data and produces no export.
//!
//! Values are rendered per column, the way a dataframe round-trip of the sheet
//! writes them. Each column gets a [`ColumnKind`] from its data rows:
//!   - integral numbers only: integer text (`42`)
//!   - numbers with a fraction or a blank: float text keeping `.0` (`42.0`)
//!   - dates only, all at midnight: `YYYY-MM-DD`
//!   - anything else: cell by cell, with date-times as `YYYY-MM-DD HH:MM:SS`
//!
//! Booleans are `True`/`False` and blank header cells become `Unnamed: <column>`.

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use chrono::NaiveTime;
use regex::Regex;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

static UNSAFE_SHEET_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/\\ ]").expect("static pattern compiles"));

#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error("failed to open workbook {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("failed to read sheet '{sheet}'")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },
    #[error("failed to render sheet '{sheet}' as CSV")]
    Csv {
        sheet: String,
        #[source]
        source: csv::Error,
    },
}

/// CSV content of one sheet, held in memory until it has been uploaded.
#[derive(Debug, Clone)]
pub struct SheetExport {
    /// File name of the workbook the sheet came from, e.g. `q.xlsx`.
    pub source_file: String,
    pub sheet_name: String,
    pub csv: Vec<u8>,
}

impl SheetExport {
    /// Object name under the key prefix: `<workbook stem>_<sanitized sheet>.csv`.
    pub fn object_name(&self) -> String {
        let stem = Path::new(&self.source_file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_file.clone());
        format!("{}_{}.csv", stem, sanitize_sheet_name(&self.sheet_name))
    }
}

/// Replaces `/`, `\` and space with `_`. Every other character is kept as is,
/// so two sheets differing only in those characters map to the same name.
pub fn sanitize_sheet_name(name: &str) -> String {
    UNSAFE_SHEET_CHARS.replace_all(name, "_").into_owned()
}

/// An opened workbook.
pub struct Workbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    pub fn open(path: &Path) -> Result<Self, WorkbookError> {
        let sheets = open_workbook_auto(path).map_err(|source| WorkbookError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Workbook {
            path: path.to_path_buf(),
            sheets,
        })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// Renders one sheet to CSV. Returns `Ok(None)` when the sheet has no data rows.
    pub fn export_sheet(&mut self, sheet: &str) -> Result<Option<SheetExport>, WorkbookError> {
        let range = self
            .sheets
            .worksheet_range(sheet)
            .map_err(|source| WorkbookError::Sheet {
                sheet: sheet.to_string(),
                source,
            })?;

        if range.height() <= 1 {
            debug!(sheet, rows = range.height(), "Sheet has no data rows");
            return Ok(None);
        }

        let csv = render_csv(&range).map_err(|source| WorkbookError::Csv {
            sheet: sheet.to_string(),
            source,
        })?;
        debug!(sheet, bytes = csv.len(), rows = range.height() - 1, "Rendered sheet to CSV");

        let source_file = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Some(SheetExport {
            source_file,
            sheet_name: sheet.to_string(),
            csv,
        }))
    }
}

/// How a column's values are written, decided over its data rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Date,
    Mixed,
}

fn column_kind<'a>(cells: impl IntoIterator<Item = &'a Data>) -> ColumnKind {
    let mut blank = false;
    let mut numbers = false;
    let mut fractional = false;
    let mut dates = false;
    let mut midnight_only = true;

    for cell in cells {
        match cell {
            Data::Empty | Data::Error(_) => blank = true,
            Data::Int(_) => numbers = true,
            Data::Float(f) => {
                numbers = true;
                fractional |= !is_integral(*f);
            }
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(naive) => {
                    dates = true;
                    midnight_only &= naive.time() == NaiveTime::MIN;
                }
                None => return ColumnKind::Mixed,
            },
            Data::String(_) | Data::DateTimeIso(_) | Data::DurationIso(_) | Data::Bool(_) => {
                return ColumnKind::Mixed
            }
        }
    }

    match (numbers, dates) {
        (true, false) if fractional || blank => ColumnKind::Float,
        (true, false) => ColumnKind::Integer,
        (false, true) if midnight_only => ColumnKind::Date,
        _ => ColumnKind::Mixed,
    }
}

fn render_csv(range: &Range<Data>) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let width = range.width();
    let kinds: Vec<ColumnKind> = (0..width)
        .map(|col| column_kind(range.rows().skip(1).filter_map(|row| row.get(col))))
        .collect();

    let mut rows = range.rows();
    if let Some(header) = rows.next() {
        let header: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(idx, cell)| match render_cell(cell) {
                name if name.is_empty() => format!("Unnamed: {idx}"),
                name => name,
            })
            .collect();
        writer.write_record(&header)?;
    }
    for row in rows {
        writer.write_record(row.iter().zip(&kinds).map(|(cell, kind)| render_typed(cell, *kind)))?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

fn render_typed(cell: &Data, kind: ColumnKind) -> String {
    match (kind, cell) {
        (ColumnKind::Float, Data::Float(f)) => render_float_keeping_point(*f),
        (ColumnKind::Float, Data::Int(i)) => render_float_keeping_point(*i as f64),
        (ColumnKind::Date, Data::DateTime(dt)) => match dt.as_datetime() {
            Some(naive) => naive.format("%Y-%m-%d").to_string(),
            None => render_cell(cell),
        },
        _ => render_cell(cell),
    }
}

fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => render_float(*f),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => naive.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => render_float(dt.as_f64()),
        },
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15
}

fn render_float(f: f64) -> String {
    if is_integral(f) {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// `42.0` stays `42.0`; fractional values use the shortest round-trip text.
fn render_float_keeping_point(f: f64) -> String {
    if is_integral(f) {
        format!("{}.0", f as i64)
    } else {
        f.to_string()
    }
}
