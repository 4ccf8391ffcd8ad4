use anyhow::Result;
use clap::Parser;
use polygon_sheets::merge::timestamp_span;
use polygon_sheets::workbook::read_sheets;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Show what a workbook holds: rows, columns and timestamp range per sheet
#[derive(Debug, Parser)]
struct Args {
    workbook: PathBuf,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("polygon_sheets=info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let sheets = read_sheets(&args.workbook)?;

    println!("📒 {} ({} sheets)", args.workbook.display(), sheets.len());
    for sheet in &sheets {
        println!();
        let frame = sheet.frame();
        let (row, col) = sheet.origin;
        println!("  {}: {} rows from R{}C{}", sheet.name, frame.len(), row + 1, col + 1);
        println!("    columns: {}", frame.columns().join(", "));
        match timestamp_span(&frame) {
            Some((first, last)) => println!("    range:   {} .. {} (high-water mark)", first, last),
            None => println!("    range:   no readable timestamps"),
        }
    }

    Ok(())
}
