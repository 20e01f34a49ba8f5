use anyhow::bail;
use serde::{Deserialize, Serialize};

pub const SYMBOL_SELECTOR: &str = "coin-item-symbol";

/// Where each field lives in a captured listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub name: usize,
    pub name_selector: String,
    pub price: usize,
    pub change_1h: Option<usize>,
    pub change_24h: usize,
    pub change_7d: Option<usize>,
    pub market_cap: usize,
    /// Rows with fewer cells than this are skipped.
    pub min_columns: usize,
}

impl ColumnMap {
    /// Analysis layout: price, 24h change and market cap only.
    pub fn tracker() -> Self {
        Self {
            name: 2,
            name_selector: SYMBOL_SELECTOR.to_string(),
            price: 3,
            change_1h: None,
            change_24h: 5,
            change_7d: None,
            market_cap: 7,
            min_columns: 9,
        }
    }

    /// Logging layout: also captures the 1h and 7d change windows.
    pub fn logger() -> Self {
        Self {
            name: 2,
            name_selector: SYMBOL_SELECTOR.to_string(),
            price: 3,
            change_1h: Some(4),
            change_24h: 5,
            change_7d: Some(6),
            market_cap: 7,
            min_columns: 8,
        }
    }

    pub fn from_layout(layout: &str) -> anyhow::Result<Self> {
        match layout.trim().to_ascii_lowercase().as_str() {
            "tracker" => Ok(Self::tracker()),
            "logger" => Ok(Self::logger()),
            other => bail!("unknown column layout {other:?} (expected tracker or logger)"),
        }
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self::tracker()
    }
}
