use std::path::PathBuf;

use crate::merge::MergeError;

#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error("failed to read workbook {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },
    #[error("failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
    #[error("sheet '{sheet}': {source}")]
    Merge {
        sheet: String,
        #[source]
        source: MergeError,
    },
    #[error("sheet '{sheet}' has {rows} rows and {columns} columns, more than a worksheet holds")]
    TooLarge {
        sheet: String,
        rows: usize,
        columns: usize,
    },
}
