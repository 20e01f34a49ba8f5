use crate::config::Settings;
use crate::domain::contract::{RawRow, RawSnapshot};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_RETRIES: u32 = 3;
const MAX_RETRIES: u32 = 10;
const MAX_BACKOFF_SECS: u64 = 60;

/// Capture collaborator: hands over the listing table rows, in ranking order.
#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Returns at most `limit` rows. Fewer (or none) is not an error.
    async fn fetch_rows(&self, limit: usize) -> Result<Vec<RawRow>>;
}

/// Reads a captured table that another process dumped to disk as JSON.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl SnapshotSource for JsonFileSource {
    fn source_name(&self) -> &'static str {
        "json_file"
    }

    async fn fetch_rows(&self, limit: usize) -> Result<Vec<RawRow>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read snapshot file {}", self.path.display()))?;
        let snapshot = serde_json::from_str::<RawSnapshot>(&text)
            .with_context(|| format!("snapshot file {} is not a valid table", self.path.display()))?;
        Ok(take_rows(snapshot, limit))
    }
}

/// Fetches the captured table from an HTTP endpoint that serves the same JSON
/// shape as [`JsonFileSource`].
#[derive(Debug, Clone)]
pub struct HttpJsonSource {
    http: reqwest::Client,
    url: String,
    retries: u32,
}

impl HttpJsonSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let url = settings.require_snapshot_source_url()?.to_string();

        let timeout_secs = std::env::var("SNAPSHOT_SOURCE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = parse_retries(std::env::var("SNAPSHOT_SOURCE_RETRIES").ok().as_deref());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build snapshot source http client")?;

        Ok(Self { http, url, retries })
    }

    async fn fetch_once(&self) -> Result<RawSnapshot> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("snapshot source request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read snapshot source response")?;

        if !status.is_success() {
            anyhow::bail!("snapshot source HTTP {status}: {text}");
        }

        serde_json::from_str::<RawSnapshot>(&text)
            .context("failed to parse snapshot source response into RawSnapshot")
    }
}

#[async_trait::async_trait]
impl SnapshotSource for HttpJsonSource {
    fn source_name(&self) -> &'static str {
        "http_json"
    }

    async fn fetch_rows(&self, limit: usize) -> Result<Vec<RawRow>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once().await {
                Ok(snapshot) => return Ok(take_rows(snapshot, limit)),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = retry_backoff(attempt);
                    tracing::warn!(attempt, ?backoff, error = %err, "snapshot fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

/// Attempt count clamped to `1..=MAX_RETRIES`.
fn parse_retries(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_RETRIES)
        .clamp(1, MAX_RETRIES)
}

/// 1s, 2s, 4s, ... capped at `MAX_BACKOFF_SECS`.
fn retry_backoff(attempt: u32) -> Duration {
    let secs = 1u64
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(MAX_BACKOFF_SECS)
        .min(MAX_BACKOFF_SECS);
    Duration::from_secs(secs)
}

fn take_rows(snapshot: RawSnapshot, limit: usize) -> Vec<RawRow> {
    let mut rows = snapshot.rows;
    rows.truncate(limit);
    rows
}

/// Picks the configured source: a file wins over a URL.
pub fn source_from_settings(settings: &Settings) -> Result<Box<dyn SnapshotSource>> {
    if let Some(path) = settings.snapshot_source_file.as_deref() {
        return Ok(Box::new(JsonFileSource::new(path)));
    }
    Ok(Box::new(HttpJsonSource::from_settings(settings)?))
}
