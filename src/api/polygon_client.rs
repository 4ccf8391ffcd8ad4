use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use tracing::{debug, warn};
use url::Url;

use super::{ApiError, PriceBarProvider};
use crate::models::{AggregatesResponse, BarRequest, Config, RawBar};

const API_KEY_PARAM: &str = "apiKey";

/// Polygon.io REST client for the aggregates (bars) endpoint
pub struct PolygonClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PolygonClient {
    /// Create a new Polygon client
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_base_url(&config.api_key, &config.base_url)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(concat!("polygon-sheets/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
        })
    }

    /// `{base}/v2/aggs/ticker/{symbol}/range/{multiplier}/{timespan}/{from}/{to}`
    /// without the API key, so it can be logged.
    pub fn aggregates_url(&self, symbol: &str, request: &BarRequest) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["v2", "aggs", "ticker"])
            .push(symbol)
            .push("range")
            .push(&request.multiplier.to_string())
            .push(request.timeframe.as_str())
            .push(&request.from.format("%Y-%m-%d").to_string())
            .push(&request.to.format("%Y-%m-%d").to_string());

        {
            let mut query = url.query_pairs_mut();
            if let Some(adjusted) = request.adjusted {
                query.append_pair("adjusted", if adjusted { "true" } else { "false" });
            }
            query.append_pair("sort", "asc");
            if let Some(limit) = request.limit {
                query.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }

    /// Copy of `url` carrying exactly one `apiKey` parameter
    fn signed(&self, url: &Url) -> Url {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != API_KEY_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut signed = url.clone();
        signed
            .query_pairs_mut()
            .clear()
            .extend_pairs(pairs)
            .append_pair(API_KEY_PARAM, &self.api_key);
        signed
    }

    async fn fetch_page(&self, url: &Url) -> Result<AggregatesResponse, ApiError> {
        debug!("Making request to: {}", url);

        let response = self
            .client
            .get(self.signed(url))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let body = response.text().await?;
        debug!("API response received: {} bytes", body.len());
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl PriceBarProvider for PolygonClient {
    async fn get_aggregates(
        &self,
        symbol: &str,
        request: &BarRequest,
    ) -> Result<Vec<RawBar>, ApiError> {
        let first_url = self.aggregates_url(symbol, request)?;
        let first = self.fetch_page(&first_url).await?;
        if !first.is_ok() {
            return Err(ApiError::NoData {
                message: first.error_message(),
            });
        }

        let message = first.error_message();
        let mut bars = first.results.unwrap_or_default();
        if bars.is_empty() {
            return Err(ApiError::NoData { message });
        }

        let mut pages = 1;
        let mut current = first_url.to_string();
        let mut next = first.next_url;
        while let Some(next_url) = next.take() {
            if next_url == current {
                warn!(symbol, url = %next_url, "next_url repeats the previous page, stopping");
                break;
            }
            let page = self.fetch_page(&Url::parse(&next_url)?).await?;
            if !page.is_ok() {
                warn!(symbol, status = %page.status, "stopping pagination: {}", page.error_message());
                break;
            }
            pages += 1;
            bars.extend(page.results.unwrap_or_default());
            current = next_url;
            next = page.next_url;
        }

        debug!(
            "Retrieved {} bars for {} from {} to {} in {} page(s)",
            bars.len(),
            symbol,
            request.from,
            request.to,
            pages
        );
        Ok(bars)
    }
}
