//! Column-named rows of cells, the shape in which bars travel between the API,
//! the merge step and the workbook.

use calamine::{ExcelDateTime, ExcelDateTimeType};
use chrono::NaiveDateTime;

use crate::utils::parse_timestamp_text;

/// Serial of 9999-12-31, the last day Excel can display
const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

/// A single sheet cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Interpret the cell as a timestamp. Numbers are read as Excel serials
    /// in the 1900 date system, text is parsed with the formats a sheet is
    /// likely to contain.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::DateTime(dt) => Some(*dt),
            Cell::Number(serial) if (0.0..MAX_EXCEL_SERIAL).contains(serial) => {
                ExcelDateTime::new(*serial, ExcelDateTimeType::DateTime, false).as_datetime()
            }
            Cell::Number(_) => None,
            Cell::Text(text) => parse_timestamp_text(text),
            Cell::Empty | Cell::Bool(_) => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(value: NaiveDateTime) -> Self {
        Cell::DateTime(value)
    }
}

/// Ordered columns plus rows that always hold exactly one cell per column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Frame {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column called `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Cell> + 'a> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Append a row, padding with empty cells or dropping extras to fit the columns
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    /// Keep the rows for which `keep` returns true, preserving their order
    pub fn filter_rows<F>(self, mut keep: F) -> Frame
    where
        F: FnMut(&[Cell]) -> bool,
    {
        let rows = self.rows.into_iter().filter(|row| keep(row)).collect();
        Frame {
            columns: self.columns,
            rows,
        }
    }

    /// Stack `other` under `self`. Columns are the union of both, existing
    /// order first; cells a side does not have are left empty.
    pub fn concat(mut self, other: Frame) -> Frame {
        let mut mapping = Vec::with_capacity(other.columns.len());
        for name in &other.columns {
            let idx = match self.column_index(name) {
                Some(idx) => idx,
                None => {
                    self.columns.push(name.clone());
                    self.columns.len() - 1
                }
            };
            mapping.push(idx);
        }

        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, Cell::Empty);
        }
        for row in other.rows {
            let mut aligned = vec![Cell::Empty; width];
            for (cell, &idx) in row.into_iter().zip(&mapping) {
                aligned[idx] = cell;
            }
            self.rows.push(aligned);
        }
        self
    }

    /// Latest readable timestamp in `column`; `None` when the column is
    /// missing or holds nothing that parses as a timestamp
    pub fn max_datetime(&self, column: &str) -> Option<NaiveDateTime> {
        self.column(column)?.filter_map(Cell::as_datetime).max()
    }
}
