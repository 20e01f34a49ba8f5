use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Document handed over by a capture collaborator: the listing table rows in
/// source ranking order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRow {
    pub cells: Vec<RawCell>,
}

/// Text content of one table cell, plus the text of any named sub-elements the
/// capture step resolved inside it (e.g. `coin-item-symbol`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCell {
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub named: BTreeMap<String, String>,
}

impl RawCell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            named: BTreeMap::new(),
        }
    }

    pub fn named(selector: impl Into<String>, text: impl Into<String>) -> Self {
        let mut named = BTreeMap::new();
        named.insert(selector.into(), text.into());
        Self { text: None, named }
    }

    /// Looks up a named sub-element's text.
    pub fn find(&self, selector: &str) -> Option<&str> {
        self.named.get(selector).map(String::as_str)
    }
}

impl RawRow {
    pub fn new(cells: Vec<RawCell>) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell_text(&self, idx: usize) -> Option<&str> {
        self.cells.get(idx).and_then(|c| c.text.as_deref())
    }
}
