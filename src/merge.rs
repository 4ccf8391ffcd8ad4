use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::debug;

use crate::frame::{Cell, Frame};
use crate::reshape::TIMESTAMP_COLUMN;
use crate::utils::truncate_to_millis;

#[derive(Debug, Error, PartialEq)]
pub enum MergeError {
    #[error("existing rows have no '{0}' column")]
    MissingColumn(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    /// Existing rows followed by the accepted incoming rows
    pub frame: Frame,
    pub appended: usize,
    pub high_water_mark: Option<NaiveDateTime>,
}

/// Append the incoming rows that are strictly newer than the latest stored
/// timestamp. Incoming rows without a readable timestamp are dropped.
pub fn append_new_rows(existing: Frame, incoming: Frame) -> Result<MergeResult, MergeError> {
    if existing.column_index(TIMESTAMP_COLUMN).is_none() {
        return Err(MergeError::MissingColumn(TIMESTAMP_COLUMN.to_string()));
    }
    let high_water_mark = existing.max_datetime(TIMESTAMP_COLUMN).map(truncate_to_millis);

    let Some(ts_idx) = incoming.column_index(TIMESTAMP_COLUMN) else {
        debug!("incoming rows carry no timestamp column, nothing to append");
        return Ok(MergeResult {
            frame: existing,
            appended: 0,
            high_water_mark,
        });
    };

    let fresh = incoming.filter_rows(|row| {
        let Some(ts) = row[ts_idx].as_datetime().map(truncate_to_millis) else {
            return false;
        };
        match high_water_mark {
            Some(mark) => ts > mark,
            None => true,
        }
    });

    let appended = fresh.len();
    debug!(appended, ?high_water_mark, "filtered incoming rows");
    let frame = if appended == 0 {
        existing
    } else {
        existing.concat(fresh)
    };

    Ok(MergeResult {
        frame,
        appended,
        high_water_mark,
    })
}

/// Earliest and latest readable timestamp, for reporting
pub fn timestamp_span(frame: &Frame) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let mut stamps = frame.column(TIMESTAMP_COLUMN)?.filter_map(Cell::as_datetime);
    let first = stamps.next()?;
    Some(stamps.fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts))))
}
