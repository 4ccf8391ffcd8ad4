//! Workbook persistence: one sheet per symbol inside a single `.xlsx` file.

pub mod append;
pub mod errors;
pub mod reader;
pub mod writer;

pub use append::{append_to_workbook, AppendOutcome};
pub use errors::WorkbookError;
pub use reader::read_sheets;
pub use writer::write_sheets;

use crate::frame::{Cell, Frame};

/// Longest sheet name Excel accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// One worksheet as a block of cells. `origin` is the zero-based
/// `(row, column)` of the top-left cell and the first row is the header.
/// Sheets are written back exactly where they were read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub origin: (u32, u32),
    pub cells: Vec<Vec<Cell>>,
}

impl Sheet {
    /// A sheet anchored at A1 holding `frame` under a header of its column names
    pub fn new(name: impl Into<String>, frame: Frame) -> Self {
        let mut sheet = Self {
            name: name.into(),
            origin: (0, 0),
            cells: Vec::new(),
        };
        sheet.replace_frame(frame);
        sheet
    }

    /// Rows below the header as a frame. Header cells that are not text
    /// become their display form, blank ones `Unnamed: <i>`.
    pub fn frame(&self) -> Frame {
        let Some((header, rows)) = self.cells.split_first() else {
            return Frame::default();
        };
        let columns = header
            .iter()
            .enumerate()
            .map(|(idx, cell)| header_name(cell, idx))
            .collect();
        let mut frame = Frame::new(columns);
        for row in rows {
            frame.push_row(row.clone());
        }
        frame
    }

    /// Swap in new content at the same origin. Header cells whose name is
    /// unchanged are kept as they were.
    pub fn replace_frame(&mut self, frame: Frame) {
        let old_header = self.cells.first();
        let header: Vec<Cell> = frame
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, name)| match old_header.and_then(|h| h.get(idx)) {
                Some(cell) if header_name(cell, idx) == *name => cell.clone(),
                _ => Cell::Text(name.clone()),
            })
            .collect();

        let mut cells = Vec::with_capacity(frame.len() + 1);
        cells.push(header);
        cells.extend(frame.rows().iter().cloned());
        self.cells = cells;
    }
}

fn header_name(cell: &Cell, idx: usize) -> String {
    match cell {
        Cell::Empty => format!("Unnamed: {}", idx),
        Cell::Text(s) => s.clone(),
        Cell::Bool(b) => b.to_string(),
        Cell::Number(n) => n.to_string(),
        Cell::DateTime(dt) => dt.to_string(),
    }
}

/// Sheet name for a symbol. Characters Excel rejects become `_`, as does an
/// apostrophe at either end, and the result is cut to 31 characters, so
/// `X:BTCUSD` lands in `X_BTCUSD`.
pub fn sheet_name_for(symbol: &str) -> String {
    let mut chars: Vec<char> = symbol
        .trim()
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    if chars.is_empty() {
        return "_".to_string();
    }
    for idx in [0, chars.len() - 1] {
        if chars[idx] == '\'' {
            chars[idx] = '_';
        }
    }
    chars.into_iter().collect()
}
