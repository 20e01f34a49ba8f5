use crate::analysis::batch::AnalysisBatch;
use crate::domain::asset::Metric;
use crate::domain::recommendation::{
    ProjectionRow, Recommendation, Scenario, ScenarioGrowth, ScoredCandidate, DISCLAIMER,
    PROJECTION_NOTE,
};

pub const MARKET_CAP_WEIGHT: f64 = 0.5;
pub const CHANGE_WEIGHT: f64 = 0.5;

/// Sub-score given to every record when a metric has no spread.
pub const DEGENERATE_NORM: f64 = 0.5;

pub const PROJECTION_YEARS: [u32; 3] = [1, 5, 10];

/// Min-max scaling into [0, 1]. Returns `None` when max == min.
fn min_max(values: &[f64]) -> Option<Vec<f64>> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range == 0.0 || !range.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| (v - min) / range).collect())
}

/// Scores every record of the batch, in batch order.
pub fn score(batch: &AnalysisBatch) -> (Vec<ScoredCandidate>, Vec<Metric>) {
    let mut degenerate = Vec::new();
    let mut normalized = |metric: Metric| match min_max(&batch.values(metric)) {
        Some(v) => v,
        None => {
            tracing::warn!(
                metric = metric.column(),
                "no spread across batch; using uniform sub-score"
            );
            degenerate.push(metric);
            vec![DEGENERATE_NORM; batch.len()]
        }
    };

    let mc = normalized(Metric::MarketCapUsd);
    let ch = normalized(Metric::Change24hPercent);

    let scored = batch
        .records()
        .iter()
        .zip(mc.into_iter().zip(ch))
        .map(|(record, (mc_norm, ch_norm))| ScoredCandidate {
            record: record.clone(),
            mc_norm,
            ch_norm,
            score: MARKET_CAP_WEIGHT * mc_norm + CHANGE_WEIGHT * ch_norm,
        })
        .collect();

    (scored, degenerate)
}

/// Picks the highest composite score (earliest record on ties) and attaches
/// the hypothetical growth table.
pub fn recommend(batch: &AnalysisBatch) -> Recommendation {
    let (mut scored, degenerate) = score(batch);

    let mut best = 0;
    for (idx, c) in scored.iter().enumerate().skip(1) {
        if c.score > scored[best].score {
            best = idx;
        }
    }
    let pick = scored.swap_remove(best);

    let reason = format!(
        "Recommended due to a strong combination of high market capitalization (indicating \
         stability) and recent momentum ({:.2}% over 24h). Its market position suggests a lower \
         risk profile compared to other assets in the list.",
        pick.record.change_24h_percent
    );

    Recommendation {
        projections: project(pick.record.price_usd),
        pick,
        reason,
        degenerate,
        disclaimer: DISCLAIMER,
        projection_note: PROJECTION_NOTE,
    }
}

/// Compounded growth under each scenario for each horizon.
pub fn project(price_usd: f64) -> Vec<ProjectionRow> {
    PROJECTION_YEARS
        .iter()
        .map(|&years| ProjectionRow {
            years,
            scenarios: Scenario::ALL
                .iter()
                .map(|&scenario| {
                    let factor = (1.0 + scenario.annual_rate()).powi(years as i32);
                    ScenarioGrowth {
                        scenario,
                        future_price_usd: price_usd * factor,
                        growth_percent: (factor - 1.0) * 100.0,
                    }
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::batch::fixtures::{batch, rec};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn composite_blends_both_norms_equally() {
        let b = batch(vec![
            rec("BTC", 60_000.0, 1.0, 1.2e12),
            rec("ETH", 3_000.0, 3.0, 4.0e11),
            rec("DOGE", 0.1, 9.0, 2.0e10),
        ]);
        let (scored, degenerate) = score(&b);
        assert!(degenerate.is_empty());

        assert_eq!(scored[0].mc_norm, 1.0);
        assert_eq!(scored[0].ch_norm, 0.0);
        assert_eq!(scored[2].mc_norm, 0.0);
        assert_eq!(scored[2].ch_norm, 1.0);
        for c in &scored {
            assert!((0.0..=1.0).contains(&c.mc_norm));
            assert!((0.0..=1.0).contains(&c.ch_norm));
            assert!(approx(c.score, 0.5 * c.mc_norm + 0.5 * c.ch_norm));
        }

        // ETH: mc (4e11-2e10)/(1.18e12), ch 2/8
        let eth = &scored[1];
        assert!(approx(eth.score, 0.5 * (3.8e11 / 1.18e12) + 0.5 * 0.25));
    }

    #[test]
    fn pick_is_order_invariant_without_ties() {
        let rows = vec![
            rec("BTC", 60_000.0, 2.0, 1.2e12),
            rec("ETH", 3_000.0, -1.0, 4.0e11),
            rec("SOL", 150.0, 6.0, 7.0e10),
            rec("DOGE", 0.1, 0.5, 2.0e10),
        ];
        let forward = recommend(&batch(rows.clone()));
        let mut rev = rows;
        rev.reverse();
        let backward = recommend(&batch(rev));
        assert_eq!(forward.symbol(), backward.symbol());
        assert_eq!(forward.symbol(), "BTC");
    }

    #[test]
    fn ties_go_to_first_occurrence() {
        let b = batch(vec![
            rec("A", 1.0, 10.0, 1.0e9),
            rec("B", 1.0, 0.0, 2.0e9),
            rec("C", 1.0, 10.0, 1.0e9),
        ]);
        // A and B both score 0.5.
        assert_eq!(recommend(&b).symbol(), "A");
    }

    #[test]
    fn degenerate_metrics_fall_back_to_uniform() {
        let b = batch(vec![rec("A", 1.0, 2.0, 5e9), rec("B", 2.0, 2.0, 5e9)]);
        let r = recommend(&b);
        assert_eq!(r.degenerate, vec![Metric::MarketCapUsd, Metric::Change24hPercent]);
        assert_eq!(r.pick.mc_norm, 0.5);
        assert_eq!(r.pick.ch_norm, 0.5);
        assert_eq!(r.pick.score, 0.5);
        assert_eq!(r.symbol(), "A");
    }

    #[test]
    fn single_record_is_recommended() {
        let b = batch(vec![rec("BTC", 100.0, -3.0, 1e12)]);
        let r = recommend(&b);
        assert_eq!(r.symbol(), "BTC");
        assert_eq!(r.degenerate.len(), 2);
        assert!(r.reason.contains("-3.00%"));
        assert!(!r.disclaimer.is_empty());
    }

    #[test]
    fn projection_table_compounds_annually() {
        let rows = project(100.0);
        assert_eq!(rows.iter().map(|r| r.years).collect::<Vec<_>>(), vec![1, 5, 10]);

        let one = &rows[0].scenarios;
        assert_eq!(one[0].scenario, Scenario::Conservative);
        assert!(approx(one[0].growth_percent, 20.0));
        assert!(approx(one[1].growth_percent, 50.0));
        assert!(approx(one[2].growth_percent, 120.0));
        assert!(approx(one[2].future_price_usd, 220.0));

        let five = &rows[1].scenarios;
        assert!(approx(five[0].growth_percent, 148.832));
        assert!(approx(five[1].growth_percent, 659.375));

        let ten = &rows[2].scenarios;
        assert!(approx(ten[0].growth_percent, 519.173_642_24));
    }

    #[test]
    fn growth_is_defined_for_zero_price() {
        let rows = project(0.0);
        assert!(approx(rows[0].scenarios[0].growth_percent, 20.0));
        assert_eq!(rows[0].scenarios[0].future_price_usd, 0.0);
    }
}
