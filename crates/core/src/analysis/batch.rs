use crate::domain::asset::{AnalysisRecord, AssetRecord, Metric};
use crate::error::EmptyAnalysisBatch;
use std::cmp::Ordering;

/// Records that survived the null filter, in batch order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisBatch {
    records: Vec<AnalysisRecord>,
}

impl AnalysisBatch {
    pub fn from_records(records: &[AssetRecord]) -> Result<Self, EmptyAnalysisBatch> {
        let records: Vec<AnalysisRecord> =
            records.iter().filter_map(AssetRecord::to_analysis).collect();
        Self::new(records)
    }

    pub fn new(records: Vec<AnalysisRecord>) -> Result<Self, EmptyAnalysisBatch> {
        if records.is_empty() {
            return Err(EmptyAnalysisBatch);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn values(&self, metric: Metric) -> Vec<f64> {
        self.records.iter().map(|r| metric.of(r)).collect()
    }

    /// Record with the largest value; ties go to the earliest record.
    pub fn first_max(&self, metric: Metric) -> &AnalysisRecord {
        self.first_by(metric, Ordering::Greater)
    }

    /// Record with the smallest value; ties go to the earliest record.
    pub fn first_min(&self, metric: Metric) -> &AnalysisRecord {
        self.first_by(metric, Ordering::Less)
    }

    fn first_by(&self, metric: Metric, wanted: Ordering) -> &AnalysisRecord {
        let mut best = &self.records[0];
        for r in &self.records[1..] {
            if metric.of(r).partial_cmp(&metric.of(best)) == Some(wanted) {
                best = r;
            }
        }
        best
    }
}
