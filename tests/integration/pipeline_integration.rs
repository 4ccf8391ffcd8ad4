//! End-to-end runs: mock Polygon endpoint, real workbook on disk

use polygon_sheets::api::PolygonClient;
use polygon_sheets::frame::Cell;
use polygon_sheets::workbook::{read_sheets, write_sheets, AppendOutcome, Sheet};
use polygon_sheets::{DataCollector, SymbolOutcome};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::fixtures::{
    aggregates_body, aggregates_path, test_config, JAN_02, JAN_03, JAN_04, JAN_05, JAN_08,
};
use crate::common::logging::{log_test_data, log_test_step};

async fn mount_bars(server: &MockServer, symbol: &str, bars: &[(i64, f64)]) {
    Mock::given(method("GET"))
        .and(path(aggregates_path(symbol)))
        .respond_with(ResponseTemplate::new(200).set_body_json(aggregates_body(symbol, bars, None)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_incremental_runs_append_only_new_rows() {
    log_test_step("Testing two incremental pipeline runs");
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("data");
    let config = test_config(
        &server.uri(),
        &output_dir.to_string_lossy(),
        &["AAPL", "MSFT", "NOPE", "DOWN"],
    );

    // First run
    mount_bars(&server, "AAPL", &[(JAN_02, 185.64), (JAN_03, 184.25), (JAN_04, 181.91)]).await;
    mount_bars(&server, "MSFT", &[(JAN_02, 370.87), (JAN_03, 370.60)]).await;
    Mock::given(method("GET"))
        .and(path(aggregates_path("NOPE")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ERROR", "error": "Unknown ticker"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(aggregates_path("DOWN")))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let collector = DataCollector::new(PolygonClient::new(&config).unwrap(), config.clone());
    let first = collector.run().await;
    log_test_data("first run", &first);

    assert_eq!(
        first.outcomes.iter().map(|(s, o)| (s.as_str(), o.clone())).collect::<Vec<_>>(),
        vec![
            ("AAPL", SymbolOutcome::Written(AppendOutcome::CreatedWorkbook { rows: 3 })),
            ("MSFT", SymbolOutcome::Written(AppendOutcome::CreatedSheet { rows: 2 })),
            ("NOPE", SymbolOutcome::NoData { message: "Unknown ticker".into() }),
            (
                "DOWN",
                SymbolOutcome::FetchFailed {
                    message: "API request failed with status 502 Bad Gateway: ".into()
                }
            ),
        ]
    );
    assert_eq!(first.output_path, output_dir.join("prices_day.xlsx"));
    assert_eq!(first.rows_written(), 5);
    assert_eq!(first.failed(), 1);

    // Someone adds a sheet of their own between runs, starting at C3 with a
    // numeric header and a blank row in the middle
    let mut sheets = read_sheets(&first.output_path).unwrap();
    let notes = Sheet {
        name: "notes".into(),
        origin: (2, 2),
        cells: vec![
            vec![Cell::Number(2024.0), Cell::Text("b".into())],
            vec![Cell::Number(1.0), Cell::Empty],
            vec![Cell::Empty, Cell::Empty],
            vec![Cell::Number(3.0), Cell::Text("watchlist".into())],
        ],
    };
    sheets.push(notes.clone());
    write_sheets(&first.output_path, &sheets).unwrap();

    // Second run: AAPL has two new bars, MSFT nothing new
    server.reset().await;
    mount_bars(
        &server,
        "AAPL",
        &[(JAN_04, 181.91), (JAN_05, 181.18), (JAN_08, 185.56)],
    )
    .await;
    mount_bars(&server, "MSFT", &[(JAN_02, 370.87), (JAN_03, 370.60)]).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let second = collector.run().await;
    log_test_data("second run", &second);

    assert_eq!(
        second.outcomes[0].1,
        SymbolOutcome::Written(AppendOutcome::Appended { rows: 2 })
    );
    assert_eq!(
        second.outcomes[1].1,
        SymbolOutcome::Written(AppendOutcome::NoNewData)
    );
    assert_eq!(second.updated(), 1);
    assert_eq!(second.unchanged(), 1);
    assert_eq!(second.skipped(), 2);

    let sheets = read_sheets(&second.output_path).unwrap();
    let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["AAPL", "MSFT", "notes"]);
    assert_eq!(sheets[0].frame().len(), 5);
    assert_eq!(sheets[1].frame().len(), 2);
    assert_eq!(sheets[2], notes);
}
