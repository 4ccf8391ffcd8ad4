//! Download Polygon aggregate bars and keep them in per-symbol sheets of a
//! single workbook, appending only rows newer than what is already stored.

pub mod api;
pub mod data_collector;
pub mod frame;
pub mod merge;
pub mod models;
pub mod reshape;
pub mod utils;
pub mod workbook;

pub use data_collector::{DataCollector, RunSummary, SymbolOutcome};
pub use models::Config;
