use crate::analysis::batch::AnalysisBatch;
use crate::analysis::summary::{describe_all, sample_std_dev, MetricSummary};
use crate::domain::asset::{AnalysisRecord, Metric};
use serde::Serialize;
use statrs::statistics::Statistics;

pub const LARGE_CAP_MIN_USD: f64 = 10_000_000_000.0;
pub const MID_CAP_MIN_USD: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentLabel {
    Bullish,
    Bearish,
}

impl SentimentLabel {
    /// Zero counts as bearish; there is no neutral state.
    pub fn from_change(change_percent: f64) -> Self {
        if change_percent > 0.0 {
            SentimentLabel::Bullish
        } else {
            SentimentLabel::Bearish
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sentiment {
    pub change_percent: f64,
    pub label: SentimentLabel,
}

impl Sentiment {
    fn new(change_percent: f64) -> Self {
        Self {
            change_percent,
            label: SentimentLabel::from_change(change_percent),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CapTier {
    Large,
    Mid,
    Small,
}

impl CapTier {
    pub fn of(market_cap_usd: f64) -> Self {
        if market_cap_usd >= LARGE_CAP_MIN_USD {
            CapTier::Large
        } else if market_cap_usd >= MID_CAP_MIN_USD {
            CapTier::Mid
        } else {
            CapTier::Small
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub large: usize,
    pub mid: usize,
    pub small: usize,
}

impl TierCounts {
    pub fn total(&self) -> usize {
        self.large + self.mid + self.small
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extreme {
    pub name: String,
    pub value: f64,
}

impl Extreme {
    fn of(record: &AnalysisRecord, metric: Metric) -> Self {
        Self {
            name: record.name.clone(),
            value: metric.of(record),
        }
    }
}

/// Aggregates over one analysis batch. Built fresh each cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotStats {
    pub size: usize,
    pub sentiment: Sentiment,
    pub highest_price: Extreme,
    pub lowest_price: Extreme,
    /// Sample standard deviation of the 24h change; `None` with one record.
    pub volatility: Option<f64>,
    /// Market-cap weighted 24h change; `None` when the total cap is zero.
    pub weighted_sentiment: Option<Sentiment>,
    pub tiers: TierCounts,
    pub summary: Vec<MetricSummary>,
}

pub fn compute(batch: &AnalysisBatch) -> SnapshotStats {
    let changes = batch.values(Metric::Change24hPercent);

    SnapshotStats {
        size: batch.len(),
        sentiment: Sentiment::new(changes.iter().mean()),
        highest_price: Extreme::of(batch.first_max(Metric::PriceUsd), Metric::PriceUsd),
        lowest_price: Extreme::of(batch.first_min(Metric::PriceUsd), Metric::PriceUsd),
        volatility: sample_std_dev(&changes),
        weighted_sentiment: weighted_change(batch).map(Sentiment::new),
        tiers: tier_counts(batch),
        summary: describe_all(batch),
    }
}

pub fn weighted_change(batch: &AnalysisBatch) -> Option<f64> {
    let (weighted, total) = batch
        .records()
        .iter()
        .fold((0.0, 0.0), |(w, t), r| {
            (w + r.change_24h_percent * r.market_cap_usd, t + r.market_cap_usd)
        });
    (total != 0.0).then(|| weighted / total)
}

pub fn tier_counts(batch: &AnalysisBatch) -> TierCounts {
    let mut counts = TierCounts::default();
    for r in batch.records() {
        match CapTier::of(r.market_cap_usd) {
            CapTier::Large => counts.large += 1,
            CapTier::Mid => counts.mid += 1,
            CapTier::Small => counts.small += 1,
        }
    }
    counts
}

/// Biggest gainers and losers by 24h change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopMovers {
    pub gainers: Vec<AnalysisRecord>,
    pub losers: Vec<AnalysisRecord>,
}

/// Stable sorts, so equal changes keep batch order.
pub fn top_movers(batch: &AnalysisBatch, n: usize) -> TopMovers {
    let mut gainers = batch.records().to_vec();
    gainers.sort_by(|a, b| b.change_24h_percent.total_cmp(&a.change_24h_percent));
    gainers.truncate(n);

    let mut losers = batch.records().to_vec();
    losers.sort_by(|a, b| a.change_24h_percent.total_cmp(&b.change_24h_percent));
    losers.truncate(n);

    TopMovers { gainers, losers }
}
