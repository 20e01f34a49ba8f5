use crate::config::Settings;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const HISTORY_PERIOD: &str = "1y";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceHistoryResponse {
    pub points: Vec<PricePoint>,
}

/// USD quote ticker for a listing symbol, e.g. `BTC` -> `BTC-USD`.
pub fn usd_ticker(symbol: &str) -> String {
    format!("{}-USD", symbol.trim())
}

/// External provider of one year of daily open/close prices.
#[async_trait::async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn fetch_history(&self, ticker: &str) -> Result<Vec<PricePoint>>;
}

#[derive(Debug, Clone)]
pub struct HttpPriceHistory {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPriceHistory {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_price_history_base_url()?.to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build price history http client")?;

        Ok(Self { http, base_url })
    }

    fn url(&self, ticker: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), ticker)
    }
}

#[async_trait::async_trait]
impl PriceHistoryProvider for HttpPriceHistory {
    async fn fetch_history(&self, ticker: &str) -> Result<Vec<PricePoint>> {
        let res = self
            .http
            .get(self.url(ticker))
            .query(&[("period", HISTORY_PERIOD)])
            .send()
            .await
            .with_context(|| format!("price history request for {ticker} failed"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read price history response")?;

        if !status.is_success() {
            anyhow::bail!("price history HTTP {status} for {ticker}: {text}");
        }

        let parsed = serde_json::from_str::<PriceHistoryResponse>(&text)
            .with_context(|| format!("price history for {ticker} is not valid JSON: {text}"))?;
        Ok(parsed.points)
    }
}
