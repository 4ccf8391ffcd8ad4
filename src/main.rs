use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use polygon_sheets::api::PolygonClient;
use polygon_sheets::{Config, DataCollector, SymbolOutcome};

/// Download historical bars from Polygon into a workbook, one sheet per symbol
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Only process these symbols instead of the configured list (repeatable)
    #[arg(short, long = "symbol")]
    symbols: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("polygon_sheets=info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let mut config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("❌ Configuration Error: {}", e);
            eprintln!(
                "Make sure {} exists and has an API_KEY (or set POLYGON_API_KEY).",
                cli.config.display()
            );
            std::process::exit(1);
        }
    };
    if !cli.symbols.is_empty() {
        config = config.with_symbols(cli.symbols);
    }
    info!("📋 Configuration loaded from {}", cli.config.display());

    let client = PolygonClient::new(&config)?;
    let collector = DataCollector::new(client, config);
    let summary = collector.run().await;

    println!();
    println!("📊 {}", summary.output_path.display());
    for (symbol, outcome) in &summary.outcomes {
        let line = match outcome {
            SymbolOutcome::Written(written) => format!("✅ {:?}", written),
            SymbolOutcome::NoData { message } => format!("⚪ no data: {}", message),
            SymbolOutcome::FetchFailed { message } => format!("❌ fetch failed: {}", message),
            SymbolOutcome::WriteFailed { message } => format!("❌ write failed: {}", message),
        };
        println!("  {:<12} {}", symbol, line);
    }
    println!(
        "{} updated, {} unchanged, {} skipped ({} failed), {} rows written",
        summary.updated(),
        summary.unchanged(),
        summary.skipped(),
        summary.failed(),
        summary.rows_written()
    );

    Ok(())
}
