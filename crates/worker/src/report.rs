use coinpulse_core::analysis::stats::Sentiment;
use coinpulse_core::pipeline::{Analysis, CycleReport};

/// Logs a cycle report as structured events.
pub fn log_cycle(report: &CycleReport) {
    tracing::info!(
        captured_at = %report.captured_at,
        requested = report.requested,
        extracted = report.batch.len(),
        skipped = report.skipped_rows,
        persisted = report.persisted,
        incomplete = report.incomplete,
        "market snapshot captured"
    );

    if let Some(analysis) = &report.analysis {
        log_analysis(analysis);
    }
}

fn log_analysis(a: &Analysis) {
    let s = &a.stats;
    tracing::info!(
        records = s.size,
        sentiment = ?s.sentiment.label,
        avg_change_pct = format_args!("{:.2}", s.sentiment.change_percent),
        weighted = %describe_sentiment(s.weighted_sentiment.as_ref()),
        volatility_pct = %s.volatility.map_or("undefined".to_string(), |v| format!("{v:.2}")),
        "market sentiment"
    );
    tracing::info!(
        highest = %s.highest_price.name,
        highest_usd = s.highest_price.value,
        lowest = %s.lowest_price.name,
        lowest_usd = s.lowest_price.value,
        "price extremes"
    );
    tracing::info!(
        large_cap = s.tiers.large,
        mid_cap = s.tiers.mid,
        small_cap = s.tiers.small,
        "market structure by cap tier"
    );
    for m in &s.summary {
        tracing::info!(
            metric = m.metric.column(),
            count = m.count,
            mean = m.mean,
            std = ?m.std,
            min = m.min,
            p25 = m.p25,
            p50 = m.p50,
            p75 = m.p75,
            max = m.max,
            min_name = %m.min_name,
            max_name = %m.max_name,
            "metric summary"
        );
    }

    let names = |rs: &[coinpulse_core::domain::asset::AnalysisRecord]| {
        rs.iter()
            .map(|r| format!("{} ({:+.2}%)", r.name, r.change_24h_percent))
            .collect::<Vec<_>>()
            .join(", ")
    };
    tracing::info!(gainers = %names(&a.movers.gainers), "top gainers (24h)");
    tracing::info!(losers = %names(&a.movers.losers), "top losers (24h)");

    let r = &a.recommendation;
    tracing::info!(disclaimer = r.disclaimer, "recommendation assistant");
    tracing::info!(
        symbol = %r.symbol(),
        score = format_args!("{:.3}", r.pick.score),
        mc_norm = format_args!("{:.3}", r.pick.mc_norm),
        ch_norm = format_args!("{:.3}", r.pick.ch_norm),
        degenerate = ?r.degenerate,
        reason = %r.reason,
        "consider researching"
    );
    for row in &r.projections {
        let growth = row
            .scenarios
            .iter()
            .map(|g| format!("{:?} {:.2}%", g.scenario, g.growth_percent))
            .collect::<Vec<_>>()
            .join(" / ");
        tracing::info!(years = row.years, %growth, "speculative growth scenario");
    }
    tracing::info!(note = r.projection_note, "projection note");
}

fn describe_sentiment(s: Option<&Sentiment>) -> String {
    match s {
        Some(s) => format!("{:?} ({:.2}%)", s.label, s.change_percent),
        None => "undefined".to_string(),
    }
}
