use serde::{Deserialize, Serialize};

/// One asset's structured row from a single capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub name: String,
    pub price_usd: Option<f64>,
    pub change_24h_percent: Option<f64>,
    pub market_cap_usd: Option<f64>,
    #[serde(default)]
    pub change_1h_percent: Option<f64>,
    #[serde(default)]
    pub change_7d_percent: Option<f64>,
}

impl AssetRecord {
    /// Returns the record as an analysis row when every required numeric field
    /// is present.
    pub fn to_analysis(&self) -> Option<AnalysisRecord> {
        Some(AnalysisRecord {
            name: self.name.clone(),
            price_usd: self.price_usd?,
            change_24h_percent: self.change_24h_percent?,
            market_cap_usd: self.market_cap_usd?,
        })
    }
}

/// An [`AssetRecord`] that passed the null filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub name: String,
    pub price_usd: f64,
    pub change_24h_percent: f64,
    pub market_cap_usd: f64,
}

/// Which numeric column a statistic is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    PriceUsd,
    Change24hPercent,
    MarketCapUsd,
}

impl Metric {
    pub const ALL: [Metric; 3] = [
        Metric::PriceUsd,
        Metric::Change24hPercent,
        Metric::MarketCapUsd,
    ];

    pub fn of(self, record: &AnalysisRecord) -> f64 {
        match self {
            Metric::PriceUsd => record.price_usd,
            Metric::Change24hPercent => record.change_24h_percent,
            Metric::MarketCapUsd => record.market_cap_usd,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Metric::PriceUsd => "price_usd",
            Metric::Change24hPercent => "change_24h_percent",
            Metric::MarketCapUsd => "market_cap_usd",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(price: Option<f64>, change: Option<f64>, mcap: Option<f64>) -> AssetRecord {
        AssetRecord {
            name: "BTC".to_string(),
            price_usd: price,
            change_24h_percent: change,
            market_cap_usd: mcap,
            change_1h_percent: None,
            change_7d_percent: None,
        }
    }

    #[test]
    fn analysis_requires_all_three_numeric_fields() {
        assert!(record(Some(1.0), Some(2.0), Some(3.0)).to_analysis().is_some());
        assert!(record(None, Some(2.0), Some(3.0)).to_analysis().is_none());
        assert!(record(Some(1.0), None, Some(3.0)).to_analysis().is_none());
        assert!(record(Some(1.0), Some(2.0), None).to_analysis().is_none());
    }

    #[test]
    fn optional_windows_do_not_affect_the_null_filter() {
        let mut r = record(Some(1.0), Some(-2.0), Some(3.0));
        r.change_7d_percent = None;
        let a = r.to_analysis().unwrap();
        assert_eq!(Metric::Change24hPercent.of(&a), -2.0);
        assert_eq!(Metric::MarketCapUsd.column(), "market_cap_usd");
    }
}
