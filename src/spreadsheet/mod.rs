//! Spreadsheet import and export.
//!
//! Reads `.csv` with the `csv` crate and `.xlsx`/`.xlsm`/`.xls`/`.ods` with
//! calamine (first sheet only). Exports are always CSV.

pub mod columns;
pub mod export;
pub mod import;

use std::path::{Path, PathBuf};

use crate::error::ConsoleError;

pub use export::export_csv;
pub use import::{import_file, ImportSummary};

/// A parsed sheet: header row plus data rows tagged with their 1-based row
/// number in the source file. Fully blank rows are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<(usize, Vec<String>)>,
}

impl Sheet {
    /// Build from `(row number, cells)` pairs; the first pair is the header.
    fn from_rows(mut rows: impl Iterator<Item = (usize, Vec<String>)>) -> Self {
        let headers = rows.next().map(|(_, cells)| cells).unwrap_or_default();
        let rows = rows
            .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
            .collect();
        Sheet { headers, rows }
    }
}

fn sheet_error(path: &Path, message: impl std::fmt::Display) -> ConsoleError {
    ConsoleError::Spreadsheet {
        path: PathBuf::from(path),
        message: message.to_string(),
    }
}

/// Read the first sheet of `path`, choosing the reader by extension.
pub fn read_sheet(path: &Path) -> Result<Sheet, ConsoleError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let sheet = match ext.as_str() {
        "csv" => read_csv(path)?,
        "xlsx" | "xlsm" | "xls" | "ods" => read_workbook(path)?,
        other => {
            return Err(sheet_error(
                path,
                format!("unsupported file type '.{}' (expected csv, xlsx, xls or ods)", other),
            ))
        }
    };
    if sheet.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(sheet_error(path, "missing header row"));
    }
    log::debug!(
        "Read {} data rows and {} columns from {}",
        sheet.rows.len(),
        sheet.headers.len(),
        path.display()
    );
    Ok(sheet)
}

fn read_csv(path: &Path) -> Result<Sheet, ConsoleError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| sheet_error(path, e))?;
    // The reader skips empty lines, so row numbers come from its position.
    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| sheet_error(path, e))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 1);
        rows.push((line, record.iter().map(str::to_string).collect()));
    }
    Ok(Sheet::from_rows(rows.into_iter()))
}

fn read_workbook(path: &Path) -> Result<Sheet, ConsoleError> {
    use calamine::{open_workbook_auto, Reader};

    let mut workbook = open_workbook_auto(path).map_err(|e| sheet_error(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| sheet_error(path, "workbook has no sheets"))?
        .map_err(|e| sheet_error(path, e))?;
    // The range begins at the first non-empty cell, not at A1.
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let rows = range
        .rows()
        .enumerate()
        .map(|(i, row)| {
            let cells = row.iter().map(cell_to_string).collect::<Vec<_>>();
            (first_row + i + 1, cells)
        })
        .collect::<Vec<_>>();
    Ok(Sheet::from_rows(rows.into_iter()))
}

fn cell_to_string(cell: &calamine::Data) -> String {
    use calamine::Data;
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) => format!("{}", f),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR({:?})", e),
        // Serial day number; the date validator understands it.
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
