//! Error type shared by the loader and the report generators.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::dataset::DatasetId;

/// Failures surfaced by loading a dataset or summarizing it.
///
/// Every variant names the dataset it concerns so the caller can report a
/// diagnosable cause without extra bookkeeping.
#[derive(Debug, Error)]
pub enum BikeshareError {
    #[error("source for '{dataset}' not found at {}: {source}", path.display())]
    SourceNotFound {
        dataset: DatasetId,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("source for '{dataset}' is malformed: {reason}")]
    MalformedSource { dataset: DatasetId, reason: String },
    #[error("row {row} of '{dataset}' is malformed ({field}): {reason}")]
    MalformedRow {
        dataset: DatasetId,
        row: u64,
        field: &'static str,
        reason: String,
    },
    #[error("'{dataset}' has no '{field}' column")]
    MissingField {
        dataset: DatasetId,
        field: &'static str,
    },
    #[error("no records to summarize for the {report} report of '{dataset}'")]
    EmptyInput {
        dataset: DatasetId,
        report: &'static str,
    },
    #[error("catalog {}: {reason}", path.display())]
    Catalog { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, BikeshareError>;
