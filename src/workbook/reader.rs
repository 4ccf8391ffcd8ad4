use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use tracing::debug;

use super::errors::WorkbookError;
use super::Sheet;
use crate::frame::Cell;

/// Load every sheet of an `.xlsx` file, in workbook order
pub fn read_sheets(path: &Path) -> Result<Vec<Sheet>, WorkbookError> {
    let read_error = |source| WorkbookError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(read_error)?;
    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name).map_err(read_error)?;
        let sheet = sheet_from_range(name, &range);
        debug!(sheet = %sheet.name, origin = ?sheet.origin, rows = sheet.cells.len(), "loaded sheet");
        sheets.push(sheet);
    }
    Ok(sheets)
}

/// Datetimes go through calamine so the workbook's date system (1900 or
/// 1904) is honoured; they come back rounded to the millisecond.
fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) if dt.is_datetime() => dt
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or(Cell::Number(dt.as_f64())),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}

/// The used range as read, blank rows included, anchored where it starts
fn sheet_from_range(name: String, range: &Range<Data>) -> Sheet {
    let origin = range.start().unwrap_or((0, 0));
    let cells = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Sheet {
        name,
        origin,
        cells,
    }
}
