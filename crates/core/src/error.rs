use thiserror::Error;

/// A single cell could not be turned into a number. Recoverable: the field
/// becomes null.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("cell is missing")]
    Missing,

    #[error("not a number: {0:?}")]
    Invalid(String),
}

/// A raw row is structurally unusable and is dropped from the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowSkip {
    #[error("row has {found} columns, at least {required} required")]
    TooFewColumns { found: usize, required: usize },

    #[error("name lookup for {selector:?} in column {column} failed")]
    MissingName { column: usize, selector: String },
}

/// Every record was excluded by the null filter; nothing to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("analysis batch is empty")]
pub struct EmptyAnalysisBatch;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("snapshot store io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot row serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("existing header {found:?} does not match expected {expected:?}")]
    HeaderMismatch { expected: String, found: String },
}
