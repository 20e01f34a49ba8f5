use crate::analysis::batch::AnalysisBatch;
use crate::domain::asset::Metric;
use serde::Serialize;
use statrs::statistics::Statistics;

/// count / mean / std / min / quartiles / max for one metric, with the asset
/// that owns each extreme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub metric: Metric,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` for a single record.
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
    pub min_name: String,
    pub max_name: String,
}

pub fn describe(batch: &AnalysisBatch, metric: Metric) -> MetricSummary {
    let values = batch.values(metric);
    let mut sorted = values.clone();
    sorted.sort_by(f64::total_cmp);

    MetricSummary {
        metric,
        count: values.len(),
        mean: values.iter().mean(),
        std: sample_std_dev(&values),
        min: sorted[0],
        p25: percentile(&sorted, 0.25),
        p50: percentile(&sorted, 0.50),
        p75: percentile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
        min_name: batch.first_min(metric).name.clone(),
        max_name: batch.first_max(metric).name.clone(),
    }
}

pub fn describe_all(batch: &AnalysisBatch) -> Vec<MetricSummary> {
    Metric::ALL.iter().map(|m| describe(batch, *m)).collect()
}

pub(crate) fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let sd = values.iter().std_dev();
    (!sd.is_nan()).then_some(sd)
}

/// Linear interpolation between the closest ranks of an ascending slice.
pub(crate) fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
