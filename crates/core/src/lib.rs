pub mod analysis;
pub mod chart;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod storage;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;

    pub const DEFAULT_TOP_N: usize = 20;
    pub const DEFAULT_OUTPUT_PATH: &str = "data/crypto_market_data.csv";
    pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 10;
    pub const DEFAULT_CHART_OUTPUT_PATH: &str = "historical_growth_chart.png";
    pub const DEFAULT_COLUMN_LAYOUT: &str = "tracker";

    /// Explicit knobs passed into every pipeline call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PipelineConfig {
        pub top_n: usize,
        pub output_path: PathBuf,
        pub poll_interval_seconds: u64,
    }

    impl PipelineConfig {
        pub fn validate(&self) -> anyhow::Result<()> {
            anyhow::ensure!(self.top_n >= 1, "top_n must be >= 1 (got {})", self.top_n);
            anyhow::ensure!(
                self.poll_interval_seconds >= 1,
                "poll_interval_seconds must be >= 1 (got {})",
                self.poll_interval_seconds
            );
            anyhow::ensure!(
                !self.output_path.as_os_str().is_empty(),
                "output_path must be non-empty"
            );
            Ok(())
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub top_n: Option<usize>,
        pub output_path: Option<String>,
        pub poll_interval_seconds: Option<u64>,
        pub column_layout: Option<String>,
        pub snapshot_source_url: Option<String>,
        pub snapshot_source_file: Option<String>,
        pub price_history_base_url: Option<String>,
        pub chart_output_path: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                top_n: parse_env("TOP_N")?,
                output_path: non_empty_env("OUTPUT_PATH"),
                poll_interval_seconds: parse_env("POLL_INTERVAL_SECONDS")?,
                column_layout: non_empty_env("COLUMN_LAYOUT"),
                snapshot_source_url: non_empty_env("SNAPSHOT_SOURCE_URL"),
                snapshot_source_file: non_empty_env("SNAPSHOT_SOURCE_FILE"),
                price_history_base_url: non_empty_env("PRICE_HISTORY_BASE_URL"),
                chart_output_path: non_empty_env("CHART_OUTPUT_PATH"),
                sentry_dsn: non_empty_env("SENTRY_DSN"),
            })
        }

        pub fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
            let cfg = PipelineConfig {
                top_n: self.top_n.unwrap_or(DEFAULT_TOP_N),
                output_path: PathBuf::from(
                    self.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH),
                ),
                poll_interval_seconds: self
                    .poll_interval_seconds
                    .unwrap_or(DEFAULT_POLL_INTERVAL_SECONDS),
            };
            cfg.validate()?;
            Ok(cfg)
        }

        pub fn column_layout(&self) -> &str {
            self.column_layout
                .as_deref()
                .unwrap_or(DEFAULT_COLUMN_LAYOUT)
        }

        pub fn chart_output_path(&self) -> &str {
            self.chart_output_path
                .as_deref()
                .unwrap_or(DEFAULT_CHART_OUTPUT_PATH)
        }

        pub fn require_snapshot_source_url(&self) -> anyhow::Result<&str> {
            self.snapshot_source_url
                .as_deref()
                .context("SNAPSHOT_SOURCE_URL (or SNAPSHOT_SOURCE_FILE) is required")
        }

        pub fn require_price_history_base_url(&self) -> anyhow::Result<&str> {
            self.price_history_base_url
                .as_deref()
                .context("PRICE_HISTORY_BASE_URL is required")
        }
    }

    fn non_empty_env(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    fn parse_env<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        non_empty_env(key)
            .map(|s| s.trim().parse::<T>())
            .transpose()
            .with_context(|| format!("{key} is not a valid number"))
    }

}
