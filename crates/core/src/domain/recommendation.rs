use crate::domain::asset::{AnalysisRecord, Metric};
use serde::{Deserialize, Serialize};

pub const DISCLAIMER: &str = "This is not financial advice. All analysis is for educational purposes \
based on a simplified model and scraped data. Do your own research.";

pub const PROJECTION_NOTE: &str = "Projections are based on hypothetical annual growth rates and do \
not represent actual predictions.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub record: AnalysisRecord,
    pub mc_norm: f64,
    pub ch_norm: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub pick: ScoredCandidate,
    pub reason: String,
    /// Metrics whose min == max across the batch; their sub-score fell back
    /// to a uniform value.
    pub degenerate: Vec<Metric>,
    pub projections: Vec<ProjectionRow>,
    pub disclaimer: &'static str,
    pub projection_note: &'static str,
}

impl Recommendation {
    pub fn symbol(&self) -> &str {
        &self.pick.record.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Conservative,
    Moderate,
    Aggressive,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::Conservative,
        Scenario::Moderate,
        Scenario::Aggressive,
    ];

    pub fn annual_rate(self) -> f64 {
        match self {
            Scenario::Conservative => 0.20,
            Scenario::Moderate => 0.50,
            Scenario::Aggressive => 1.20,
        }
    }
}

/// Growth for one horizon under each scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub years: u32,
    pub scenarios: Vec<ScenarioGrowth>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioGrowth {
    pub scenario: Scenario,
    pub future_price_usd: f64,
    pub growth_percent: f64,
}
