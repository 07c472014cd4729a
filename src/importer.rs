// 📥 Importer - raw tabular rows → validated SwiftCode records
//
// Sources: CSV text or the first worksheet of a spreadsheet workbook
// (.xlsx and friends), picked by file extension.
//
// Column layout (header row skipped):
//   0 country ISO2 | 1 swift code | 2 code type (unused) | 3 bank name
//   4 address      | 5 city       | 6 country name       | 7 time zone
//
// A bad row never aborts the batch: it is logged and skipped.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ImportError, RowError};
use crate::model::{SwiftCode, ISO2_LEN, MIN_CODE_LEN};
use crate::repository::SwiftCodeRepository;

/// Number of columns a data row is expected to carry
pub const COLUMN_COUNT: usize = 8;

const COL_COUNTRY_ISO2: usize = 0;
const COL_SWIFT_CODE: usize = 1;
const COL_BANK_NAME: usize = 3;
const COL_ADDRESS: usize = 4;
const COL_CITY: usize = 5;
const COL_COUNTRY_NAME: usize = 6;
const COL_TIME_ZONE: usize = 7;

/// One data row: trimmed cell text, `None` where a cell is blank, missing,
/// or not text
pub type RawRow = Vec<Option<String>>;

// ============================================================================
// IMPORT REPORT
// ============================================================================

/// Per-run counts, logged and printed by the CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Data rows read (header excluded)
    pub rows_read: usize,
    /// Records handed to storage
    pub imported: usize,
    /// Rows whose first 8 columns were all blank
    pub skipped_blank: usize,
    /// Rows with a missing or too-short code
    pub rejected_code: usize,
    /// Rows that failed to parse or validate
    pub failed: usize,
    /// Rows repeating a code seen earlier in the file
    pub duplicates: usize,
}

/// Outcome of the startup load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Storage already held records; nothing was read
    AlreadyLoaded,
    Loaded(ImportReport),
}

/// Source file layout, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    /// Spreadsheet extensions select `Workbook`; anything else is read as CSV
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => SourceFormat::Workbook,
            _ => SourceFormat::Csv,
        }
    }
}

// ============================================================================
// ROW NORMALIZATION
// ============================================================================

/// Trimmed text, or `None` when blank
fn text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn cell(row: &[Option<String>], col: usize) -> Option<&str> {
    row.get(col).and_then(|c| c.as_deref())
}

/// True when every one of the first 8 columns is blank
fn is_blank_row(row: &[Option<String>]) -> bool {
    (0..COLUMN_COUNT).all(|col| cell(row, col).is_none())
}

/// Normalize one data row.
///
/// `Ok(None)` means the row was rejected for its code (absent or shorter than
/// 8 characters); that is a silent skip, not an error.
pub fn parse_row(row: &[Option<String>], line: u64) -> Result<Option<SwiftCode>, RowError> {
    let country_iso2 = cell(row, COL_COUNTRY_ISO2)
        .ok_or(RowError::MissingCountryCode { line })?
        .to_uppercase();

    if country_iso2.chars().count() != ISO2_LEN {
        return Err(RowError::InvalidCountryCode {
            line,
            value: country_iso2,
        });
    }

    let swift_code = match cell(row, COL_SWIFT_CODE) {
        Some(code) if code.chars().count() >= MIN_CODE_LEN => code.to_string(),
        _ => return Ok(None),
    };

    let owned = |col| cell(row, col).map(str::to_string);

    let mut record = SwiftCode::new(swift_code, country_iso2);
    record.bank_name = owned(COL_BANK_NAME);
    record.address = owned(COL_ADDRESS);
    record.city = owned(COL_CITY);
    record.country_name = cell(row, COL_COUNTRY_NAME).map(str::to_uppercase);
    record.time_zone = owned(COL_TIME_ZONE);

    Ok(Some(record))
}

/// Classify, deduplicate and count rows. Each item carries its 1-based
/// source line.
fn collect_rows<I>(rows: I) -> (Vec<SwiftCode>, ImportReport)
where
    I: IntoIterator<Item = (u64, Result<RawRow, RowError>)>,
{
    let mut report = ImportReport::default();
    let mut records = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (line, result) in rows {
        report.rows_read += 1;

        let row = match result {
            Ok(row) => row,
            Err(err) => {
                warn!(error = %err, "Error parsing row");
                report.failed += 1;
                continue;
            }
        };

        if is_blank_row(&row) {
            report.skipped_blank += 1;
            continue;
        }

        match parse_row(&row, line) {
            Ok(Some(record)) => {
                if !seen.insert(record.swift_code.clone()) {
                    debug!(line, swift_code = %record.swift_code, "duplicate code in source, keeping first");
                    report.duplicates += 1;
                    continue;
                }
                records.push(record);
            }
            Ok(None) => {
                debug!(line, "row skipped: missing or short swift code");
                report.rejected_code += 1;
            }
            Err(err) => {
                warn!(error = %err, "Error parsing row");
                report.failed += 1;
            }
        }
    }

    report.imported = records.len();
    (records, report)
}

/// Parse every data row of a CSV source into deduplicated records.
///
/// Row-level failures are logged and counted; only a failure to read the
/// header aborts.
pub fn parse_records<R: Read>(source: R) -> Result<(Vec<SwiftCode>, ImportReport), ImportError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    // Forces the header to be consumed up front; an empty source has none
    rdr.headers()?;

    let rows = rdr.records().enumerate().map(|(idx, result)| {
        // Line 1 is the header
        let line = idx as u64 + 2;
        let row = result
            .map(|record| record.iter().map(text).collect())
            .map_err(|source| RowError::Csv { line, source });
        (line, row)
    });

    Ok(collect_rows(rows))
}

/// Parse the first worksheet of a workbook into deduplicated records.
///
/// Only text cells carry values; numbers, dates, booleans and error cells
/// read as "no value". A workbook without worksheets yields nothing.
pub fn parse_workbook(path: &Path) -> Result<(Vec<SwiftCode>, ImportReport), ImportError> {
    let mut workbook = open_workbook_auto(path)?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok((Vec::new(), ImportReport::default())),
    };

    // The used range starts at the first non-empty cell, not necessarily A1
    let (first_row, first_col) = range.start().unwrap_or((0, 0));

    let rows = range.rows().enumerate().skip(1).map(|(idx, cells)| {
        let line = u64::from(first_row) + idx as u64 + 1;
        let mut row: RawRow = vec![None; first_col as usize];
        row.extend(cells.iter().map(|c| match c {
            Data::String(s) => text(s),
            _ => None,
        }));
        (line, Ok(row))
    });

    Ok(collect_rows(rows))
}

// ============================================================================
// STORAGE LOADING
// ============================================================================

fn store_parsed(
    repo: &dyn SwiftCodeRepository,
    records: Vec<SwiftCode>,
    report: ImportReport,
) -> Result<LoadOutcome, ImportError> {
    match repo.store_all_if_empty(&records)? {
        Some(_) => {
            info!(
                rows_read = report.rows_read,
                imported = report.imported,
                skipped_blank = report.skipped_blank,
                rejected_code = report.rejected_code,
                failed = report.failed,
                duplicates = report.duplicates,
                "Data loaded successfully"
            );
            Ok(LoadOutcome::Loaded(report))
        }
        None => {
            info!("Data already loaded");
            Ok(LoadOutcome::AlreadyLoaded)
        }
    }
}

/// Parse a CSV source and bulk-load it, unless storage already has records.
pub fn import_from_reader<R: Read>(
    repo: &dyn SwiftCodeRepository,
    source: R,
) -> Result<LoadOutcome, ImportError> {
    let (records, report) = parse_records(source)?;
    store_parsed(repo, records, report)
}

/// Parse a workbook and bulk-load it, unless storage already has records.
pub fn import_workbook(
    repo: &dyn SwiftCodeRepository,
    path: &Path,
) -> Result<LoadOutcome, ImportError> {
    let (records, report) = parse_workbook(path)?;
    store_parsed(repo, records, report)
}

/// Startup load: skip entirely if storage is populated, else import `path`.
///
/// The file handle is dropped on every return path.
pub fn load_if_empty(
    repo: &dyn SwiftCodeRepository,
    path: &Path,
) -> Result<LoadOutcome, ImportError> {
    if repo.count_all()? > 0 {
        info!("Data already loaded");
        return Ok(LoadOutcome::AlreadyLoaded);
    }

    let format = SourceFormat::from_path(path);
    info!(path = %path.display(), ?format, "loading swift codes");

    match format {
        SourceFormat::Workbook => import_workbook(repo, path),
        SourceFormat::Csv => {
            let file = File::open(path)?;
            import_from_reader(repo, file)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
