use std::path::PathBuf;

use thiserror::Error;

use crate::sanity::Verdict;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between reading an edge list and writing
/// the community artifacts. All variants are fatal for the run; the only
/// tolerated anomaly (a delimiter mismatch) is reported as a warning and
/// never becomes an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Input file is missing or cannot be opened/read.
    #[error("can not read input file '{path}': {source}")]
    UnreadableInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sample did not allow a confident delimiter/header inference.
    /// Guessing is not an option: a wrong delimiter mis-segments every row.
    #[error("can not detect delimiter or headers in '{path}': {reason}")]
    AmbiguousFormat { path: PathBuf, reason: String },

    /// One or more sanity sub-checks failed.
    #[error("sanity check failed: {0}")]
    Validation(Verdict),

    /// A row could not be turned into an edge.
    #[error("can not build graph: {reason}{}", fmt_row(.row))]
    GraphLoad { row: Option<usize>, reason: String },

    /// The selected backend failed internally. No retry, no fallback.
    #[error("community detection with {backend} failed: {reason}")]
    CommunityDetection {
        backend: &'static str,
        reason: String,
    },

    /// An output artifact could not be written. Partially written
    /// artifacts have already been removed when this surfaces.
    #[error("can not write output file '{path}': {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A user-supplied argument was malformed (weighting token,
    /// delimiter, column index).
    #[error("invalid {name} argument: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: String,
    },
}

fn fmt_row(row: &Option<usize>) -> String {
    match row {
        Some(n) => format!(" (row {n})"),
        None => String::new(),
    }
}
