use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::api::{ApiError, PriceBarProvider};
use crate::models::Config;
use crate::reshape::bars_to_frame;
use crate::workbook::{append_to_workbook, AppendOutcome};

/// Result of processing one symbol
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    Written(AppendOutcome),
    /// The API had no bars for the symbol
    NoData { message: String },
    FetchFailed { message: String },
    WriteFailed { message: String },
}

impl SymbolOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SymbolOutcome::FetchFailed { .. } | SymbolOutcome::WriteFailed { .. }
        )
    }
}

/// Per-symbol outcomes of one run, in processing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub outcomes: Vec<(String, SymbolOutcome)>,
}

impl RunSummary {
    /// Rows added to the workbook across all symbols
    pub fn rows_written(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, outcome)| match outcome {
                SymbolOutcome::Written(AppendOutcome::CreatedWorkbook { rows })
                | SymbolOutcome::Written(AppendOutcome::CreatedSheet { rows })
                | SymbolOutcome::Written(AppendOutcome::Appended { rows }) => *rows,
                _ => 0,
            })
            .sum()
    }

    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, SymbolOutcome::Written(w) if *w != AppendOutcome::NoNewData))
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == SymbolOutcome::Written(AppendOutcome::NoNewData))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| !matches!(o, SymbolOutcome::Written(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }
}

/// Downloads bars symbol by symbol and appends them to the workbook
pub struct DataCollector<P> {
    provider: P,
    config: Config,
}

impl<P: PriceBarProvider> DataCollector<P> {
    pub fn new(provider: P, config: Config) -> Self {
        Self { provider, config }
    }

    /// Run the whole download-merge-append pipeline. Errors for a single
    /// symbol are logged and recorded, never propagated.
    pub async fn run(&self) -> RunSummary {
        let output_path = self.config.output_path();
        info!(
            "📈 {} symbol(s), {} x {} bars from {} to {} → {}",
            self.config.symbols.len(),
            self.config.multiplier,
            self.config.timeframe,
            self.config.start_date,
            self.config.end_date,
            output_path.display()
        );

        let mut outcomes = Vec::with_capacity(self.config.symbols.len());
        for symbol in &self.config.symbols {
            let outcome = self.collect_symbol(symbol, &output_path).await;
            outcomes.push((symbol.clone(), outcome));
        }

        let summary = RunSummary {
            output_path,
            outcomes,
        };
        info!(
            "✅ Run finished: {} updated, {} unchanged, {} skipped, {} rows written",
            summary.updated(),
            summary.unchanged(),
            summary.skipped(),
            summary.rows_written()
        );
        summary
    }

    /// Fetch one symbol and merge it into the workbook at `output_path`
    pub async fn collect_symbol(&self, symbol: &str, output_path: &Path) -> SymbolOutcome {
        info!("Downloading data for {}...", symbol);

        let request = self.config.bar_request();
        let bars = match self.provider.get_aggregates(symbol, &request).await {
            Ok(bars) => bars,
            Err(ApiError::NoData { message }) => {
                warn!("No data found for {} or error: {}", symbol, message);
                return SymbolOutcome::NoData { message };
            }
            Err(e) => {
                error!("An error occurred while fetching data for {}: {}", symbol, e);
                return SymbolOutcome::FetchFailed {
                    message: e.to_string(),
                };
            }
        };

        let frame = bars_to_frame(symbol, &bars);

        if let Some(dir) = output_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(dir) {
                error!("Failed to create {}: {}", dir.display(), e);
                return SymbolOutcome::WriteFailed {
                    message: e.to_string(),
                };
            }
        }

        match append_to_workbook(output_path, symbol, frame) {
            Ok(outcome) => {
                match outcome {
                    AppendOutcome::CreatedWorkbook { .. } => {
                        info!("Excel file created and data for {} added.", symbol)
                    }
                    AppendOutcome::CreatedSheet { .. } => {
                        info!("New sheet created for {} and data added.", symbol)
                    }
                    AppendOutcome::Appended { .. } => {
                        info!("Data for {} appended successfully.", symbol)
                    }
                    AppendOutcome::NoNewData => info!("No new data for {} to append.", symbol),
                }
                SymbolOutcome::Written(outcome)
            }
            Err(e) => {
                error!("❌ Failed to write {} to {}: {}", symbol, output_path.display(), e);
                SymbolOutcome::WriteFailed {
                    message: e.to_string(),
                }
            }
        }
    }
}
