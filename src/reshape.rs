use serde_json::Value;

use crate::frame::{Cell, Frame};
use crate::models::RawBar;
use crate::utils::datetime_from_millis;

pub const SYMBOL_COLUMN: &str = "symbol";
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Polygon's single-letter bar keys and the sheet headers they become
const RENAMES: &[(&str, &str)] = &[
    ("o", "open"),
    ("c", "close"),
    ("h", "high"),
    ("l", "low"),
    ("v", "volume"),
    ("vw", "vwap"),
    ("n", "no. of trades"),
];

const RAW_TIMESTAMP_KEY: &str = "t";

fn header_for(key: &str) -> &str {
    RENAMES
        .iter()
        .find(|(raw, _)| *raw == key)
        .map(|(_, header)| *header)
        .unwrap_or(key)
}

fn cell_from_json(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Bool(b) => Cell::Bool(*b),
        Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
        Value::String(s) => Cell::Text(s.clone()),
        nested => Cell::Text(nested.to_string()),
    }
}

fn timestamp_cell(value: Option<&Value>) -> Cell {
    let millis = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        _ => None,
    };
    millis
        .and_then(datetime_from_millis)
        .map(Cell::DateTime)
        .unwrap_or(Cell::Empty)
}

/// Turn raw aggregate bars into a frame: `symbol`, `timestamp`, then the
/// remaining bar keys in first-seen order with their readable names.
pub fn bars_to_frame(symbol: &str, bars: &[RawBar]) -> Frame {
    let mut keys: Vec<&str> = Vec::new();
    for bar in bars {
        for key in bar.keys() {
            if key != RAW_TIMESTAMP_KEY && !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
    }

    let mut columns = vec![SYMBOL_COLUMN.to_string(), TIMESTAMP_COLUMN.to_string()];
    columns.extend(keys.iter().map(|k| header_for(k).to_string()));

    let mut frame = Frame::new(columns);
    for bar in bars {
        let mut row = Vec::with_capacity(keys.len() + 2);
        row.push(Cell::Text(symbol.to_string()));
        row.push(timestamp_cell(bar.get(RAW_TIMESTAMP_KEY)));
        row.extend(
            keys.iter()
                .map(|k| bar.get(*k).map(cell_from_json).unwrap_or(Cell::Empty)),
        );
        frame.push_row(row);
    }
    frame
}
