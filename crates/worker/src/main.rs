use clap::Parser;
use coinpulse_core::chart::history::HttpPriceHistory;
use coinpulse_core::chart::HistoryChart;
use coinpulse_core::config::{PipelineConfig, Settings};
use coinpulse_core::domain::columns::ColumnMap;
use coinpulse_core::domain::contract::RawRow;
use coinpulse_core::ingest::provider::source_from_settings;
use coinpulse_core::pipeline;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod report;

#[derive(Debug, Parser)]
#[command(name = "coinpulse_worker")]
struct Args {
    /// Number of listing rows to capture per cycle (TOP_N).
    #[arg(long)]
    top_n: Option<usize>,

    /// CSV log to append snapshots to (OUTPUT_PATH).
    #[arg(long)]
    output_path: Option<String>,

    /// Seconds to wait between cycles (POLL_INTERVAL_SECONDS).
    #[arg(long)]
    poll_interval_seconds: Option<u64>,

    /// Read the captured table from a JSON file instead of SNAPSHOT_SOURCE_URL.
    #[arg(long)]
    source_file: Option<String>,

    /// Column layout of the captured table: tracker or logger.
    #[arg(long)]
    layout: Option<String>,

    /// Run a single cycle and exit.
    #[arg(long)]
    once: bool,

    /// Also print each cycle report as one JSON line on stdout.
    #[arg(long)]
    json: bool,

    /// Skip the historical chart for the recommended asset.
    #[arg(long)]
    no_chart: bool,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if self.top_n.is_some() {
            settings.top_n = self.top_n;
        }
        if self.output_path.is_some() {
            settings.output_path = self.output_path.clone();
        }
        if self.poll_interval_seconds.is_some() {
            settings.poll_interval_seconds = self.poll_interval_seconds;
        }
        if self.source_file.is_some() {
            settings.snapshot_source_file = self.source_file.clone();
        }
        if self.layout.is_some() {
            settings.column_layout = self.layout.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    args.apply(&mut settings);

    let config = settings.pipeline_config()?;
    let columns = ColumnMap::from_layout(settings.column_layout())?;
    let source = source_from_settings(&settings)?;
    let chart = if args.no_chart {
        None
    } else {
        match HttpPriceHistory::from_settings(&settings) {
            Ok(provider) => Some(HistoryChart::new(provider, settings.chart_output_path())),
            Err(err) => {
                tracing::warn!(error = %err, "price history provider not configured; charts disabled");
                None
            }
        }
    };

    let mut shutdown = shutdown_signal();

    tracing::info!(
        source = source.source_name(),
        top_n = config.top_n,
        output_path = %config.output_path.display(),
        poll_interval_seconds = config.poll_interval_seconds,
        "worker started"
    );

    loop {
        let fetched = tokio::select! {
            res = source.fetch_rows(config.top_n) => res,
            _ = shutdown.changed() => break,
        };

        match fetched {
            Ok(rows) => run_cycle(&rows, &columns, &config, &args, chart.as_ref()).await,
            Err(err) => {
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %format!("{err:#}"), "capture failed; no data this cycle");
            }
        }

        if args.once || *shutdown.borrow() {
            break;
        }

        tracing::info!(
            seconds = config.poll_interval_seconds,
            "waiting for the next update (Ctrl+C to stop)"
        );
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(config.poll_interval_seconds)) => {}
            _ = shutdown.changed() => break,
        }
    }

    tracing::info!("auto-updating stopped; exiting");
    Ok(())
}

async fn run_cycle(
    rows: &[RawRow],
    columns: &ColumnMap,
    config: &PipelineConfig,
    args: &Args,
    chart: Option<&HistoryChart<HttpPriceHistory>>,
) {
    let captured_at = chrono::Local::now().naive_local();

    let report = match pipeline::run_cycle(rows, columns, config, captured_at) {
        Ok(report) => report,
        Err(err) => {
            let err = anyhow::Error::new(err);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(%captured_at, error = %err, "snapshot cycle failed");
            return;
        }
    };

    report::log_cycle(&report);
    if args.json {
        match serde_json::to_string(&report) {
            Ok(line) => println!("{line}"),
            Err(err) => tracing::warn!(error = %err, "failed to serialize cycle report"),
        }
    }

    if let (Some(chart), Some(symbol)) = (chart, report.recommended_symbol()) {
        if let Err(err) = chart.render(symbol).await {
            tracing::warn!(%symbol, error = %format!("{err:#}"), "historical chart not generated");
        }
    }
}

/// Flips to `true` on Ctrl+C. Observed only between cycles so an append is
/// never cut short.
fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(true);
            }
            Err(err) => tracing::error!(error = %err, "failed to listen for Ctrl+C"),
        }
        // A dropped sender would look like a shutdown to `changed()`.
        tx.closed().await;
    });
    rx
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
