pub mod history;
pub mod render;

use anyhow::Context;
use history::{usd_ticker, PriceHistoryProvider};
use std::path::PathBuf;

/// Renders a one-year price chart for a recommended symbol.
pub struct HistoryChart<P> {
    provider: P,
    output_path: PathBuf,
}

impl<P: PriceHistoryProvider> HistoryChart<P> {
    pub fn new(provider: P, output_path: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            output_path: output_path.into(),
        }
    }

    /// Fetches history for `{symbol}-USD` and writes the PNG. Returns the
    /// written path.
    pub async fn render(&self, symbol: &str) -> anyhow::Result<PathBuf> {
        let ticker = usd_ticker(symbol);
        let points = self.provider.fetch_history(&ticker).await?;
        anyhow::ensure!(
            !points.is_empty(),
            "no historical data for {ticker}; the ticker may be incorrect or delisted"
        );

        let path = self.output_path.clone();
        let n = points.len();
        tokio::task::spawn_blocking(move || -> anyhow::Result<PathBuf> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            render::draw_history(&points)
                .save(&path)
                .with_context(|| format!("failed to write chart {}", path.display()))?;
            Ok(path)
        })
        .await
        .context("chart render task panicked")?
        .inspect(|path| tracing::info!(%ticker, points = n, path = %path.display(), "chart saved"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::history::PricePoint;
    use chrono::NaiveDate;

    struct Fixed(Vec<PricePoint>);

    #[async_trait::async_trait]
    impl PriceHistoryProvider for Fixed {
        async fn fetch_history(&self, ticker: &str) -> anyhow::Result<Vec<PricePoint>> {
            assert!(ticker.ends_with("-USD"));
            Ok(self.0.clone())
        }
    }

    fn out_path(test: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("coinpulse-chart-{}-{test}", std::process::id()))
            .join("historical_growth_chart.png")
    }

    #[tokio::test]
    async fn writes_png_for_history() {
        let points = (1..=30)
            .map(|d| PricePoint {
                date: NaiveDate::from_ymd_opt(2026, 1, d).unwrap(),
                open: 100.0 + d as f64,
                close: 101.0 + d as f64,
            })
            .collect();
        let chart = HistoryChart::new(Fixed(points), out_path("png"));
        let path = chart.render("BTC").await.unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!(img.width(), render::WIDTH);
        assert_eq!(img.height(), render::HEIGHT);
    }

    #[tokio::test]
    async fn empty_history_is_reported() {
        let chart = HistoryChart::new(Fixed(Vec::new()), out_path("empty"));
        let err = chart.render("NOPE").await.unwrap_err();
        assert!(err.to_string().contains("NOPE-USD"));
    }
}
