use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::debug;

use super::errors::WorkbookError;
use super::Sheet;
use crate::frame::Cell;

const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const DATETIME_COLUMN_WIDTH: f64 = 20.0;

/// Write `sheets` as a fresh workbook at `path`, replacing any existing file.
/// Each sheet lands at its own origin with its first row in bold.
pub fn write_sheets(path: &Path, sheets: &[Sheet]) -> Result<(), WorkbookError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);

    for sheet in sheets {
        let (first_row, first_col) = sheet.origin;
        let rows = sheet.cells.len();
        let width = sheet.cells.iter().map(Vec::len).max().unwrap_or(0);
        if first_row as usize + rows > MAX_ROWS || first_col as usize + width > MAX_COLUMNS {
            return Err(WorkbookError::TooLarge {
                sheet: sheet.name.clone(),
                rows,
                columns: width,
            });
        }

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        let mut datetime_columns = vec![false; width];
        for (idx, row) in sheet.cells.iter().enumerate() {
            let row_num = first_row + idx as u32;
            let format = (idx == 0).then_some(&header_format);
            for (col, cell) in row.iter().enumerate() {
                let col_num = (first_col as usize + col) as u16;
                if let Cell::DateTime(dt) = cell {
                    worksheet.write_datetime_with_format(row_num, col_num, dt, &datetime_format)?;
                    datetime_columns[col] = true;
                } else {
                    write_cell(worksheet, row_num, col_num, cell, format)?;
                }
            }
        }

        for (col, _) in datetime_columns.iter().enumerate().filter(|(_, is_dt)| **is_dt) {
            worksheet.set_column_width((first_col as usize + col) as u16, DATETIME_COLUMN_WIDTH)?;
        }
        debug!(sheet = %sheet.name, origin = ?sheet.origin, rows, "wrote sheet");
    }

    workbook.save(path)?;
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    match (cell, format) {
        (Cell::Empty | Cell::DateTime(_), _) => {}
        // NaN and infinities have no cell representation
        (Cell::Number(n), _) if !n.is_finite() => {}
        (Cell::Number(n), Some(format)) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        (Cell::Number(n), None) => {
            worksheet.write_number(row, col, *n)?;
        }
        (Cell::Bool(b), Some(format)) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
        }
        (Cell::Bool(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        (Cell::Text(s), Some(format)) => {
            worksheet.write_string_with_format(row, col, s, format)?;
        }
        (Cell::Text(s), None) => {
            worksheet.write_string(row, col, s)?;
        }
    }
    Ok(())
}
