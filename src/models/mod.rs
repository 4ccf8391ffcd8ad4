use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default Polygon REST root
pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io";

/// Environment variable that overrides the configured API key
pub const API_KEY_ENV: &str = "POLYGON_API_KEY";

/// A single aggregate bar as returned in the `results` array, key order preserved
pub type RawBar = Map<String, Value>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Aggregate timespan understood by the Polygon aggregates endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Second => "second",
            Timeframe::Minute => "minute",
            Timeframe::Hour => "hour",
            Timeframe::Day => "day",
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::Quarter => "quarter",
            Timeframe::Year => "year",
        }
    }

    /// Short label used in the workbook file name
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Minute => "min",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one aggregates download, shared by every symbol in a run
#[derive(Debug, Clone, PartialEq)]
pub struct BarRequest {
    pub multiplier: u32,
    pub timeframe: Timeframe,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub adjusted: Option<bool>,
    pub limit: Option<u32>,
}

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub timeframe: Timeframe,
    #[serde(default = "default_multiplier", deserialize_with = "deserialize_multiplier")]
    pub multiplier: u32,
    pub output_file: String,
    #[serde(default)]
    pub output_dir: String,
    #[serde(rename = "API_KEY", alias = "api_key", default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub adjusted: Option<bool>,
    #[serde(default)]
    pub limit: Option<u32>,
}

fn default_multiplier() -> u32 {
    1
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Config files in the wild carry the multiplier either as a number or as a string
fn deserialize_multiplier<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid multiplier '{}'", s))),
    }
}

impl Config {
    /// Parse a config file without touching the environment
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.normalize_symbols();
        Ok(config)
    }

    /// Load the config file, apply the `.env` / environment API key override and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let mut config = Self::from_file(path)?;
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.api_key = key.trim().to_string();
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.end_date < self.start_date {
            return Err(ConfigError::Invalid(format!(
                "end_date {} is before start_date {}",
                self.end_date, self.start_date
            )));
        }
        if self.multiplier == 0 {
            return Err(ConfigError::Invalid("multiplier must be at least 1".into()));
        }
        if self.output_file.trim().is_empty() {
            return Err(ConfigError::Invalid("output_file must not be empty".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "no API key: set API_KEY in the config or {}",
                API_KEY_ENV
            )));
        }
        Ok(())
    }

    /// Replace the configured symbols, e.g. from the command line
    pub fn with_symbols(mut self, symbols: Vec<String>) -> Self {
        self.symbols = symbols;
        self.normalize_symbols();
        self
    }

    fn normalize_symbols(&mut self) {
        self.symbols = self
            .symbols
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    /// `<output_dir>/<output_file>[_<multiplier>]_<label>.xlsx`
    pub fn output_path(&self) -> PathBuf {
        let file_name = if self.multiplier == 1 {
            format!("{}_{}.xlsx", self.output_file, self.timeframe.label())
        } else {
            format!(
                "{}_{}_{}.xlsx",
                self.output_file,
                self.multiplier,
                self.timeframe.label()
            )
        };
        Path::new(&self.output_dir).join(file_name)
    }

    pub fn bar_request(&self) -> BarRequest {
        BarRequest {
            multiplier: self.multiplier,
            timeframe: self.timeframe,
            from: self.start_date,
            to: self.end_date,
            adjusted: self.adjusted,
            limit: self.limit,
        }
    }
}

/// Polygon aggregates response envelope
#[derive(Debug, Deserialize)]
pub struct AggregatesResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(rename = "resultsCount", default)]
    pub results_count: Option<u64>,
    #[serde(default)]
    pub results: Option<Vec<RawBar>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub next_url: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl AggregatesResponse {
    /// `DELAYED` is what entitlement-limited keys get back, the bars are still valid
    pub fn is_ok(&self) -> bool {
        matches!(self.status.as_str(), "OK" | "DELAYED")
    }

    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}
