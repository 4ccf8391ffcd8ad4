use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BarRequest, RawBar};

pub mod polygon_client;
pub use polygon_client::PolygonClient;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered but had no bars to give (bad status or empty `results`)
    #[error("{message}")]
    NoData { message: String },
    #[error("API request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Source of historical aggregate bars
#[async_trait]
pub trait PriceBarProvider {
    /// All bars for `symbol` over the requested range, oldest first
    async fn get_aggregates(
        &self,
        symbol: &str,
        request: &BarRequest,
    ) -> Result<Vec<RawBar>, ApiError>;
}
