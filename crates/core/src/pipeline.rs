use crate::analysis::batch::AnalysisBatch;
use crate::analysis::recommend::recommend;
use crate::analysis::stats::{self, SnapshotStats, TopMovers};
use crate::config::PipelineConfig;
use crate::domain::asset::AssetRecord;
use crate::domain::columns::ColumnMap;
use crate::domain::contract::RawRow;
use crate::domain::recommendation::Recommendation;
use crate::error::PersistenceError;
use crate::ingest::extract::extract_batch;
use crate::storage::SnapshotStore;
use chrono::NaiveDateTime;
use serde::Serialize;

pub const TOP_MOVERS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub stats: SnapshotStats,
    pub movers: TopMovers,
    pub recommendation: Recommendation,
}

/// Everything one polling cycle produced.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub captured_at: NaiveDateTime,
    pub requested: usize,
    pub batch: Vec<AssetRecord>,
    pub skipped_rows: usize,
    /// Fewer usable records than `top_n`, or none survived the null filter.
    pub incomplete: bool,
    /// `None` when the analysis batch was empty.
    pub analysis: Option<Analysis>,
    pub persisted: usize,
}

impl CycleReport {
    pub fn recommended_symbol(&self) -> Option<&str> {
        self.analysis.as_ref().map(|a| a.recommendation.symbol())
    }
}

/// Runs analysis only; nothing is persisted.
pub fn analyze(records: &[AssetRecord]) -> Option<Analysis> {
    let batch = match AnalysisBatch::from_records(records) {
        Ok(b) => b,
        Err(err) => {
            tracing::warn!(records = records.len(), error = %err, "skipping analysis this cycle");
            return None;
        }
    };

    Some(Analysis {
        stats: stats::compute(&batch),
        movers: stats::top_movers(&batch, TOP_MOVERS),
        recommendation: recommend(&batch),
    })
}

/// Extracts, analyses and persists one captured table.
///
/// Only persistence can fail; every other problem degrades the report.
pub fn run_cycle(
    rows: &[RawRow],
    columns: &ColumnMap,
    config: &PipelineConfig,
    captured_at: NaiveDateTime,
) -> Result<CycleReport, PersistenceError> {
    let rows = &rows[..rows.len().min(config.top_n)];
    let extraction = extract_batch(rows, columns);
    let batch = extraction.records;

    let analysis = analyze(&batch);
    let analyzed = analysis.as_ref().map_or(0, |a| a.stats.size);
    let incomplete = batch.len() < config.top_n || analysis.is_none();
    if incomplete {
        tracing::warn!(
            requested = config.top_n,
            extracted = batch.len(),
            analyzed,
            skipped = extraction.skipped.len(),
            "cycle finished with incomplete data"
        );
    }

    let persisted = SnapshotStore::new(&config.output_path).append(&batch, captured_at)?;

    Ok(CycleReport {
        captured_at,
        requested: config.top_n,
        batch,
        skipped_rows: extraction.skipped.len(),
        incomplete,
        analysis,
        persisted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stats::SentimentLabel;
    use crate::domain::columns::SYMBOL_SELECTOR;
    use crate::domain::contract::RawCell;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn row(symbol: &str, price: &str, change: &str, mcap: &str) -> RawRow {
        RawRow::new(vec![
            RawCell::default(),
            RawCell::text("1"),
            RawCell::named(SYMBOL_SELECTOR, symbol),
            RawCell::text(price),
            RawCell::text("0.1%"),
            RawCell::text(change),
            RawCell::text("1.0%"),
            RawCell::text(mcap),
            RawCell::text("$1B"),
        ])
    }

    fn config(test: &str, top_n: usize) -> PipelineConfig {
        let dir: PathBuf = std::env::temp_dir().join(format!(
            "coinpulse-pipeline-{}-{test}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        PipelineConfig {
            top_n,
            output_path: dir.join("crypto_market_data.csv"),
            poll_interval_seconds: 10,
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn full_cycle_analyzes_and_persists() {
        let cfg = config("full", 2);
        let rows = vec![
            row("A", "$100", "5%", "$5B"),
            row("B", "$1", "-2%", "$20B"),
            row("C", "$3", "9%", "$1T"),
        ];
        let report = run_cycle(&rows, &ColumnMap::tracker(), &cfg, now()).unwrap();

        assert_eq!(report.batch.len(), 2);
        assert!(!report.incomplete);
        assert_eq!(report.persisted, 2);

        let a = report.analysis.as_ref().unwrap();
        assert_eq!(a.stats.tiers.large, 1);
        assert_eq!(a.stats.tiers.mid, 1);
        assert_eq!(a.stats.sentiment.label, SentimentLabel::Bullish);
        assert_eq!(
            a.stats.weighted_sentiment.unwrap().label,
            SentimentLabel::Bearish
        );
        assert_eq!(a.movers.gainers[0].name, "A");
        // A: mc 0, ch 1 -> 0.5; B: mc 1, ch 0 -> 0.5; tie keeps A.
        assert_eq!(report.recommended_symbol(), Some("A"));

        let text = std::fs::read_to_string(&cfg.output_path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn all_null_batch_is_incomplete_but_still_logged() {
        let cfg = config("nulls", 2);
        let rows = vec![row("A", "--", "5%", "$5B"), row("B", "$1", "n/a", "$2B")];
        let report = run_cycle(&rows, &ColumnMap::tracker(), &cfg, now()).unwrap();

        assert!(report.analysis.is_none());
        assert!(report.incomplete);
        assert_eq!(report.recommended_symbol(), None);
        assert_eq!(report.persisted, 2);
    }

    #[test]
    fn empty_capture_writes_nothing() {
        let cfg = config("empty", 20);
        let report = run_cycle(&[], &ColumnMap::tracker(), &cfg, now()).unwrap();
        assert!(report.incomplete);
        assert_eq!(report.persisted, 0);
        assert!(!cfg.output_path.exists());
    }

    #[test]
    fn skipped_rows_are_counted() {
        let cfg = config("skips", 3);
        let rows = vec![
            row("A", "$100", "5%", "$5B"),
            RawRow::new(vec![RawCell::text("sponsored")]),
            row("B", "$1", "-2%", "$20B"),
        ];
        let report = run_cycle(&rows, &ColumnMap::tracker(), &cfg, now()).unwrap();
        assert_eq!(report.skipped_rows, 1);
        assert!(report.incomplete);
        assert!(report.analysis.is_some());
    }

    #[test]
    fn demo_listing_runs_end_to_end() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/listing.json");
        let text = std::fs::read_to_string(path).unwrap();
        let snapshot: crate::domain::contract::RawSnapshot = serde_json::from_str(&text).unwrap();

        let cfg = config("demo", 20);
        let report = run_cycle(&snapshot.rows, &ColumnMap::logger(), &cfg, now()).unwrap();

        assert_eq!(report.skipped_rows, 1);
        assert_eq!(report.batch.len(), 5);
        assert!(report.incomplete);

        // DOGE has no 24h change and drops out of the analysis batch.
        let a = report.analysis.as_ref().unwrap();
        assert_eq!(a.stats.size, 4);
        assert_eq!(a.stats.tiers.large, 3);
        assert_eq!(a.stats.tiers.mid, 1);
        assert_eq!(a.movers.gainers[0].name, "SOL");
        assert_eq!(a.movers.losers[0].name, "LINK");
        assert_eq!(report.recommended_symbol(), Some("BTC"));

        let doge = report.batch.iter().find(|r| r.name == "DOGE").unwrap();
        assert_eq!(doge.change_24h_percent, None);
        assert_eq!(doge.change_7d_percent, Some(3.3));
    }

    #[test]
    fn persistence_failure_surfaces() {
        let cfg = config("drift", 1);
        std::fs::create_dir_all(cfg.output_path.parent().unwrap()).unwrap();
        std::fs::write(&cfg.output_path, "Name,PriceUSD\n").unwrap();

        let rows = vec![row("A", "$100", "5%", "$5B")];
        let err = run_cycle(&rows, &ColumnMap::tracker(), &cfg, now()).unwrap_err();
        assert!(matches!(err, PersistenceError::HeaderMismatch { .. }));
    }
}
