use anyhow::Result;
use clap::Parser;
use polygon_sheets::api::{PolygonClient, PriceBarProvider};
use polygon_sheets::frame::Cell;
use polygon_sheets::reshape::{bars_to_frame, TIMESTAMP_COLUMN};
use polygon_sheets::Config;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Download one symbol with the configured range and print it, without touching the workbook
#[derive(Debug, Parser)]
struct Args {
    symbol: String,

    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,
}

fn close_of(row: &[Cell], idx: Option<usize>) -> Option<f64> {
    match idx.and_then(|i| row.get(i)) {
        Some(Cell::Number(n)) => Some(*n),
        _ => None,
    }
}

fn timestamp_of(row: &[Cell], idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i))
        .and_then(Cell::as_datetime)
        .map(|dt| dt.to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging, RUST_LOG wins over the default
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("polygon_sheets=info,fetch_aggregates=info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    let client = PolygonClient::new(&config)?;
    let request = config.bar_request();

    info!(
        "📈 Fetching {} {} x {} bars from {} to {}",
        args.symbol, request.multiplier, request.timeframe, request.from, request.to
    );

    let bars = client.get_aggregates(&args.symbol, &request).await?;
    let frame = bars_to_frame(&args.symbol, &bars);
    info!("✅ Successfully fetched {} bars for {}", frame.len(), args.symbol);

    let ts_idx = frame.column_index(TIMESTAMP_COLUMN);
    let close_idx = frame.column_index("close");

    println!("\n📊 {} bars:", args.symbol);
    println!("{:<24}| Close", "Timestamp");
    println!("{:-<24}|------------", "");

    let display_count = std::cmp::min(5, frame.len());
    for row in frame.rows().iter().take(display_count) {
        println!("{:<24}| {:.4}", timestamp_of(row, ts_idx), close_of(row, close_idx).unwrap_or(f64::NAN));
    }
    if frame.len() > display_count * 2 {
        println!("{:<24}| ...", "...");
    }
    if frame.len() > display_count {
        let skip_count = frame.len().saturating_sub(5).max(display_count);
        for row in frame.rows().iter().skip(skip_count) {
            println!("{:<24}| {:.4}", timestamp_of(row, ts_idx), close_of(row, close_idx).unwrap_or(f64::NAN));
        }
    }

    let closes: Vec<f64> = frame
        .rows()
        .iter()
        .filter_map(|row| close_of(row, close_idx))
        .collect();
    if let (Some(first), Some(last)) = (closes.first(), closes.last()) {
        let max_price = closes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min_price = closes.iter().cloned().fold(f64::INFINITY, f64::min);

        println!("\n📈 Statistics:");
        println!("First Close:    {:.4}", first);
        println!("Last Close:     {:.4}", last);
        if *first != 0.0 {
            println!("Total Return:   {:.1}%", (last - first) / first * 100.0);
        }
        println!("Highest Close:  {:.4}", max_price);
        println!("Lowest Close:   {:.4}", min_price);
        println!("Total Bars:     {}", frame.len());
    }

    Ok(())
}
