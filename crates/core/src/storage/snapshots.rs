use crate::domain::asset::AssetRecord;
use crate::error::PersistenceError;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column order of the log. Fixed at first write; appends never rewrite it.
pub const COLUMNS: [&str; 7] = [
    "timestamp",
    "name",
    "price_usd",
    "change_24h_percent",
    "market_cap_usd",
    "change_1h_percent",
    "change_7d_percent",
];

// Field order must match COLUMNS.
#[derive(Debug, Serialize)]
struct PersistedRow<'a> {
    timestamp: &'a str,
    name: &'a str,
    price_usd: Option<f64>,
    change_24h_percent: Option<f64>,
    market_cap_usd: Option<f64>,
    change_1h_percent: Option<f64>,
    change_7d_percent: Option<f64>,
}

impl<'a> PersistedRow<'a> {
    fn new(timestamp: &'a str, r: &'a AssetRecord) -> Self {
        Self {
            timestamp,
            name: &r.name,
            price_usd: r.price_usd,
            change_24h_percent: r.change_24h_percent,
            market_cap_usd: r.market_cap_usd,
            change_1h_percent: r.change_1h_percent,
            change_7d_percent: r.change_7d_percent,
        }
    }
}

/// Append-only CSV log of captured batches.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Appends one row per record, stamped with `captured_at`.
    ///
    /// The header is written only when the file is new or empty. If the file
    /// already has a header that differs from [`COLUMNS`], nothing is written.
    /// Header and rows go out in a single write.
    pub fn append(
        &self,
        records: &[AssetRecord],
        captured_at: NaiveDateTime,
    ) -> Result<usize, PersistenceError> {
        self.ensure_parent_dir()?;
        if records.is_empty() {
            return Ok(0);
        }

        let write_header = !self.check_existing_header()?;
        let timestamp = captured_at.format(TIMESTAMP_FORMAT).to_string();

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(Vec::new());
        for r in records {
            wtr.serialize(PersistedRow::new(&timestamp, r))?;
        }
        let buf = wtr.into_inner().map_err(|e| self.io_err(e.into_error()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        file.write_all(&buf).map_err(|e| self.io_err(e))?;
        file.sync_data().map_err(|e| self.io_err(e))?;

        tracing::info!(
            path = %self.path.display(),
            rows = records.len(),
            header_written = write_header,
            "snapshot rows appended"
        );
        Ok(records.len())
    }

    fn ensure_parent_dir(&self) -> Result<(), PersistenceError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| self.io_err(e))
            }
            _ => Ok(()),
        }
    }

    /// `Ok(true)` when a matching header is already on disk, `Ok(false)` when
    /// the file is missing or empty.
    fn check_existing_header(&self) -> Result<bool, PersistenceError> {
        let file = match fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(self.io_err(e)),
        };

        let mut first = String::new();
        BufReader::new(file)
            .read_line(&mut first)
            .map_err(|e| self.io_err(e))?;
        let found = first.trim_end_matches(&['\r', '\n'][..]);
        if found.is_empty() {
            return Ok(false);
        }

        let expected = COLUMNS.join(",");
        if found != expected {
            return Err(PersistenceError::HeaderMismatch {
                expected,
                found: found.to_string(),
            });
        }
        Ok(true)
    }

    fn io_err(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}
