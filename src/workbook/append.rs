use std::path::Path;

use tracing::{debug, info};

use super::errors::WorkbookError;
use super::reader::read_sheets;
use super::writer::write_sheets;
use super::{sheet_name_for, Sheet};
use crate::frame::Frame;
use crate::merge::append_new_rows;

/// What writing one symbol's bars did to the workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The workbook did not exist and was created with this symbol's sheet
    CreatedWorkbook { rows: usize },
    /// The workbook existed, the symbol's sheet was added at the end
    CreatedSheet { rows: usize },
    /// Rows newer than the sheet's latest timestamp were appended
    Appended { rows: usize },
    /// Nothing newer than what the sheet already holds
    NoNewData,
}

/// Merge `frame` into the symbol's sheet of the workbook at `path`.
///
/// Other sheets are carried over cell for cell and keep their position and
/// origin. The file is only rewritten when something changed.
pub fn append_to_workbook(
    path: &Path,
    symbol: &str,
    frame: Frame,
) -> Result<AppendOutcome, WorkbookError> {
    let sheet_name = sheet_name_for(symbol);

    if !path.exists() {
        let rows = frame.len();
        write_sheets(path, &[Sheet::new(sheet_name, frame)])?;
        info!(path = %path.display(), symbol, rows, "created workbook");
        return Ok(AppendOutcome::CreatedWorkbook { rows });
    }

    let mut sheets = read_sheets(path)?;
    let Some(idx) = sheets
        .iter()
        .position(|s| s.name.eq_ignore_ascii_case(&sheet_name))
    else {
        let rows = frame.len();
        sheets.push(Sheet::new(sheet_name, frame));
        write_sheets(path, &sheets)?;
        info!(path = %path.display(), symbol, rows, "added sheet");
        return Ok(AppendOutcome::CreatedSheet { rows });
    };

    let sheet = &mut sheets[idx];
    let merged = append_new_rows(sheet.frame(), frame).map_err(|source| WorkbookError::Merge {
        sheet: sheet.name.clone(),
        source,
    })?;

    if merged.appended == 0 {
        debug!(symbol, high_water_mark = ?merged.high_water_mark, "sheet already up to date");
        return Ok(AppendOutcome::NoNewData);
    }

    let rows = merged.appended;
    sheet.replace_frame(merged.frame);
    write_sheets(path, &sheets)?;
    info!(path = %path.display(), symbol, rows, "appended rows");
    Ok(AppendOutcome::Appended { rows })
}
