//! Spreadsheet loading and row deduplication.
//!
//! Only the first worksheet is read. Its first row is the header; the three
//! columns below are located by name and every other column is ignored.

use std::collections::HashSet;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use uamap_core::InputRecord;

use crate::error::SheetError;

pub const AREA_COLUMN: &str = "Area";
pub const CITY_COLUMN: &str = "City";
pub const DELIVERY_COLUMN: &str = "Доставка";

/// Reads `(Area, City, Доставка)` from every data row of the first worksheet.
///
/// Rows whose three cells are all empty are skipped. Other columns may be
/// present in any order.
///
/// # Errors
///
/// - [`SheetError::Open`] if the file is not a readable workbook.
/// - [`SheetError::NoSheets`] / [`SheetError::EmptySheet`] if there is no
///   worksheet or no header row.
/// - [`SheetError::MissingColumn`] naming the first required header absent.
pub fn read_records(path: &Path) -> Result<Vec<InputRecord>, SheetError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SheetError::NoSheets)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoSheets)?
        .map_err(|source| SheetError::Range {
            sheet: sheet.clone(),
            source,
        })?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| SheetError::EmptySheet {
        sheet: sheet.clone(),
    })?;

    let area_idx = column_index(header, AREA_COLUMN)?;
    let city_idx = column_index(header, CITY_COLUMN)?;
    let delivery_idx = column_index(header, DELIVERY_COLUMN)?;

    let records: Vec<InputRecord> = rows
        .map(|row| {
            InputRecord::new(
                cell_text(row.get(area_idx)),
                cell_text(row.get(city_idx)),
                cell_text(row.get(delivery_idx)),
            )
        })
        .filter(|r| !(r.area.is_empty() && r.city.is_empty() && r.delivery_status.is_empty()))
        .collect();

    tracing::debug!(%sheet, rows = records.len(), "read worksheet");
    Ok(records)
}

/// Drops records equal on all three fields, keeping the first occurrence and
/// the original order.
#[must_use]
pub fn dedup_records(records: Vec<InputRecord>) -> Vec<InputRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(r.clone()))
        .collect()
}

fn column_index(header: &[Data], name: &str) -> Result<usize, SheetError> {
    header
        .iter()
        .position(|cell| matches!(cell, Data::String(s) if s.trim() == name))
        .ok_or_else(|| SheetError::MissingColumn {
            column: name.to_owned(),
        })
}

/// Renders a cell as text. Whole floats drop their `.0` so numeric
/// identifiers read the way they look in the spreadsheet.
fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(Data::Float(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
#[path = "sheet_test.rs"]
mod tests;
