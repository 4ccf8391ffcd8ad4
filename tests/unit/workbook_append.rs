//! Step-by-step behaviour of appending symbol frames to a workbook file

use assert_matches::assert_matches;
use polygon_sheets::frame::{Cell, Frame};
use polygon_sheets::reshape::bars_to_frame;
use polygon_sheets::workbook::{
    append_to_workbook, read_sheets, write_sheets, AppendOutcome, Sheet, WorkbookError,
};
use pretty_assertions::assert_eq;

use crate::common::fixtures::{raw_bars, JAN_02, JAN_03, JAN_04, JAN_05};

#[test_log::test]
fn test_create_add_append_and_skip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prices_day.xlsx");

    let aapl = bars_to_frame("AAPL", &raw_bars(&[(JAN_02, 185.64), (JAN_03, 184.25)]));
    assert_eq!(
        append_to_workbook(&path, "AAPL", aapl).unwrap(),
        AppendOutcome::CreatedWorkbook { rows: 2 }
    );

    let msft = bars_to_frame("MSFT", &raw_bars(&[(JAN_02, 370.87)]));
    assert_eq!(
        append_to_workbook(&path, "MSFT", msft).unwrap(),
        AppendOutcome::CreatedSheet { rows: 1 }
    );

    // Overlapping window: JAN_03 is already stored, JAN_04 and JAN_05 are new
    let aapl = bars_to_frame(
        "AAPL",
        &raw_bars(&[(JAN_03, 184.25), (JAN_04, 181.91), (JAN_05, 181.18)]),
    );
    assert_eq!(
        append_to_workbook(&path, "AAPL", aapl).unwrap(),
        AppendOutcome::Appended { rows: 2 }
    );

    let aapl = bars_to_frame("AAPL", &raw_bars(&[(JAN_04, 181.91)]));
    assert_eq!(
        append_to_workbook(&path, "AAPL", aapl).unwrap(),
        AppendOutcome::NoNewData
    );

    let sheets = read_sheets(&path).unwrap();
    let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["AAPL", "MSFT"]);
    assert_eq!(sheets[0].frame().len(), 4);
    assert_eq!(sheets[1].frame().len(), 1);
    assert_eq!(
        sheets[0].frame().columns(),
        &["symbol", "timestamp", "volume", "vwap", "open", "close", "high", "low", "no. of trades"]
    );

    let aapl = sheets[0].frame();
    let closes: Vec<&Cell> = aapl.column("close").unwrap().collect();
    assert_eq!(
        closes,
        vec![
            &Cell::Number(185.64),
            &Cell::Number(184.25),
            &Cell::Number(181.91),
            &Cell::Number(181.18)
        ]
    );
}

#[test_log::test]
fn test_crypto_symbol_gets_a_legal_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crypto.xlsx");

    let frame = bars_to_frame("X:BTCUSD", &raw_bars(&[(JAN_02, 45_000.0)]));
    append_to_workbook(&path, "X:BTCUSD", frame).unwrap();
    let frame = bars_to_frame("X:BTCUSD", &raw_bars(&[(JAN_03, 44_100.0)]));
    assert_eq!(
        append_to_workbook(&path, "X:BTCUSD", frame).unwrap(),
        AppendOutcome::Appended { rows: 1 }
    );

    let sheets = read_sheets(&path).unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].name, "X_BTCUSD");
    assert_eq!(sheets[0].frame().rows()[0][0], Cell::Text("X:BTCUSD".into()));
}

#[test_log::test]
fn test_sheet_without_timestamp_column_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manual.xlsx");

    let mut manual = Frame::new(vec!["symbol".into(), "comment".into()]);
    manual.push_row(vec!["AAPL".into(), "hand edited".into()]);
    write_sheets(&path, &[Sheet::new("AAPL", manual.clone())]).unwrap();

    let frame = bars_to_frame("AAPL", &raw_bars(&[(JAN_02, 185.64)]));
    assert_matches!(
        append_to_workbook(&path, "AAPL", frame),
        Err(WorkbookError::Merge { sheet, .. }) if sheet == "AAPL"
    );

    let sheets = read_sheets(&path).unwrap();
    assert_eq!(sheets, vec![Sheet::new("AAPL", manual)]);
}

#[test_log::test]
fn test_existing_sheet_is_matched_ignoring_case() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lower.xlsx");

    let stored = bars_to_frame("AAPL", &raw_bars(&[(JAN_02, 185.64)]));
    write_sheets(&path, &[Sheet::new("aapl", stored)]).unwrap();

    let frame = bars_to_frame("AAPL", &raw_bars(&[(JAN_02, 185.64), (JAN_03, 184.25)]));
    assert_eq!(
        append_to_workbook(&path, "AAPL", frame).unwrap(),
        AppendOutcome::Appended { rows: 1 }
    );

    let sheets = read_sheets(&path).unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].name, "aapl");
    assert_eq!(sheets[0].frame().len(), 2);
}

#[test_log::test]
fn test_symbol_sheet_keeps_its_origin_when_appended() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("offset.xlsx");

    let mut stored = Sheet::new("AAPL", bars_to_frame("AAPL", &raw_bars(&[(JAN_02, 185.64)])));
    stored.origin = (1, 1);
    write_sheets(&path, &[stored]).unwrap();

    let frame = bars_to_frame("AAPL", &raw_bars(&[(JAN_03, 184.25)]));
    assert_eq!(
        append_to_workbook(&path, "AAPL", frame).unwrap(),
        AppendOutcome::Appended { rows: 1 }
    );

    let sheets = read_sheets(&path).unwrap();
    assert_eq!(sheets[0].origin, (1, 1));
    assert_eq!(sheets[0].frame().len(), 2);
}
