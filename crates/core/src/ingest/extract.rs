use crate::domain::asset::AssetRecord;
use crate::domain::columns::ColumnMap;
use crate::domain::contract::RawRow;
use crate::error::RowSkip;
use crate::ingest::normalize::normalize_cell;

/// Maps one captured row onto an [`AssetRecord`].
///
/// Structural defects skip the row. Numeric cells that fail to parse become
/// null fields, as do negative prices and market caps; the null filter downstream decides whether the record is usable
/// for analysis.
pub fn extract(row: &RawRow, columns: &ColumnMap) -> Result<AssetRecord, RowSkip> {
    if row.len() < columns.min_columns {
        return Err(RowSkip::TooFewColumns {
            found: row.len(),
            required: columns.min_columns,
        });
    }

    let name = row
        .cells
        .get(columns.name)
        .and_then(|cell| cell.find(&columns.name_selector))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| RowSkip::MissingName {
            column: columns.name,
            selector: columns.name_selector.clone(),
        })?;

    let num = |idx: usize| normalize_cell(idx, row.cell_text(idx));
    let non_negative = |idx: usize| {
        num(idx).filter(|v| {
            let ok = *v >= 0.0;
            if !ok {
                tracing::debug!(column = idx, value = *v, "negative amount; recording null");
            }
            ok
        })
    };

    Ok(AssetRecord {
        name: name.to_string(),
        price_usd: non_negative(columns.price),
        change_24h_percent: num(columns.change_24h),
        market_cap_usd: non_negative(columns.market_cap),
        change_1h_percent: columns.change_1h.and_then(num),
        change_7d_percent: columns.change_7d.and_then(num),
    })
}

/// Outcome of extracting a whole capture.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<AssetRecord>,
    pub skipped: Vec<(usize, RowSkip)>,
}

/// Extracts every row in order, keeping the successful ones and recording why
/// the rest were dropped.
pub fn extract_batch(rows: &[RawRow], columns: &ColumnMap) -> Extraction {
    let mut out = Extraction {
        records: Vec::with_capacity(rows.len()),
        skipped: Vec::new(),
    };

    for (idx, row) in rows.iter().enumerate() {
        match extract(row, columns) {
            Ok(record) => out.records.push(record),
            Err(reason) => {
                tracing::warn!(row = idx, error = %reason, "could not parse row; skipping");
                out.skipped.push((idx, reason));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::columns::SYMBOL_SELECTOR;
    use crate::domain::contract::RawCell;

    fn listing_row(symbol: Option<&str>, price: &str, change: &str, mcap: &str) -> RawRow {
        let name_cell = match symbol {
            Some(s) => RawCell::named(SYMBOL_SELECTOR, s),
            None => RawCell::text("Bitcoin"),
        };
        RawRow::new(vec![
            RawCell::default(),
            RawCell::text("1"),
            name_cell,
            RawCell::text(price),
            RawCell::text("0.10%"),
            RawCell::text(change),
            RawCell::text("-3.20%"),
            RawCell::text(mcap),
            RawCell::text("$30.1B"),
        ])
    }

    #[test]
    fn extracts_tracker_layout() {
        let row = listing_row(Some("BTC"), "$64,000.50", "1.25%", "$1.26T");
        let r = extract(&row, &ColumnMap::tracker()).unwrap();
        assert_eq!(r.name, "BTC");
        assert_eq!(r.price_usd, Some(64_000.5));
        assert_eq!(r.change_24h_percent, Some(1.25));
        assert_eq!(r.market_cap_usd, Some(1.26e12));
        assert_eq!(r.change_1h_percent, None);
        assert_eq!(r.change_7d_percent, None);
    }

    #[test]
    fn logger_layout_reads_extra_windows() {
        let row = listing_row(Some("ETH"), "$3,100", "-2%", "$372B");
        let r = extract(&row, &ColumnMap::logger()).unwrap();
        assert_eq!(r.change_1h_percent, Some(0.10));
        assert_eq!(r.change_7d_percent, Some(-3.20));
    }

    #[test]
    fn short_rows_are_skipped() {
        let row = RawRow::new(vec![RawCell::text("x"); 4]);
        assert_eq!(
            extract(&row, &ColumnMap::tracker()),
            Err(RowSkip::TooFewColumns { found: 4, required: 9 })
        );
    }

    #[test]
    fn missing_or_blank_symbol_skips_row() {
        let row = listing_row(None, "$1", "1%", "$1B");
        assert!(matches!(
            extract(&row, &ColumnMap::tracker()),
            Err(RowSkip::MissingName { column: 2, .. })
        ));

        let row = listing_row(Some("   "), "$1", "1%", "$1B");
        assert!(extract(&row, &ColumnMap::tracker()).is_err());
    }

    #[test]
    fn bad_numeric_cell_becomes_null_not_skip() {
        let row = listing_row(Some("ADS"), "--", "1%", "$1B");
        let r = extract(&row, &ColumnMap::tracker()).unwrap();
        assert_eq!(r.price_usd, None);
        assert!(r.to_analysis().is_none());
    }

    #[test]
    fn negative_price_or_cap_becomes_null() {
        let row = listing_row(Some("NEG"), "-$5", "-4.5%", "$-1.2B");
        let r = extract(&row, &ColumnMap::tracker()).unwrap();
        assert_eq!(r.price_usd, None);
        assert_eq!(r.market_cap_usd, None);
        assert_eq!(r.change_24h_percent, Some(-4.5));
        assert!(r.to_analysis().is_none());

        let row = listing_row(Some("ZERO"), "$0", "1%", "$0");
        let r = extract(&row, &ColumnMap::tracker()).unwrap();
        assert_eq!(r.price_usd, Some(0.0));
        assert_eq!(r.market_cap_usd, Some(0.0));
    }

    #[test]
    fn eight_cell_row_fits_logger_but_not_tracker() {
        let mut row = listing_row(Some("SOL"), "$150", "4%", "$70B");
        row.cells.truncate(8);

        let r = extract(&row, &ColumnMap::logger()).unwrap();
        assert_eq!(r.name, "SOL");
        assert_eq!(r.market_cap_usd, Some(70e9));
        assert_eq!(r.change_7d_percent, Some(-3.20));

        assert_eq!(
            extract(&row, &ColumnMap::tracker()),
            Err(RowSkip::TooFewColumns { found: 8, required: 9 })
        );

        row.cells.truncate(7);
        assert_eq!(
            extract(&row, &ColumnMap::logger()),
            Err(RowSkip::TooFewColumns { found: 7, required: 8 })
        );
    }

    #[test]
    fn batch_keeps_order_and_reports_skips() {
        let rows = vec![
            listing_row(Some("BTC"), "$1", "1%", "$1T"),
            RawRow::new(vec![RawCell::text("ad")]),
            listing_row(Some("ETH"), "$2", "2%", "$1B"),
        ];
        let out = extract_batch(&rows, &ColumnMap::tracker());
        let names: Vec<_> = out.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["BTC", "ETH"]);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].0, 1);
    }
}
