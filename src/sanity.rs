//! Sanity validation: combine the sniffed format with the user-declared
//! delimiter and weighting into a single go/no-go verdict.

use std::fmt;

use crate::error::{Error, Result};
use crate::sniff::FormatInference;

/// Whether the edge list carries a weight column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    Unweighted,
    Weighted,
}

impl Weighting {
    /// Parse the yes/no token (`yes|y|no|n`, any capitalization).
    pub fn parse(token: &str) -> Result<Self> {
        let t = token.trim();
        if t.eq_ignore_ascii_case("yes") || t.eq_ignore_ascii_case("y") {
            Ok(Weighting::Weighted)
        } else if t.eq_ignore_ascii_case("no") || t.eq_ignore_ascii_case("n") {
            Ok(Weighting::Unweighted)
        } else {
            Err(Error::InvalidArgument {
                name: "weighted",
                reason: format!("expected yes/no, y/n, got '{token}'"),
            })
        }
    }

    /// Column count a conforming file must have.
    pub fn expected_columns(self) -> usize {
        match self {
            Weighting::Unweighted => 2,
            Weighting::Weighted => 3,
        }
    }

    pub fn is_weighted(self) -> bool {
        matches!(self, Weighting::Weighted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStatus {
    /// No header, or a header whose first field is commented out.
    Ok,
    /// An active header row that the loader would misparse as data.
    NotOk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterStatus {
    Match,
    /// Detected and declared delimiters disagree. Tolerated: downstream
    /// parsers fall back to whitespace splitting, so this only warns.
    Tolerated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnStatus {
    Ok,
    NotOk,
}

/// Composite validation verdict. `proceed()` requires the header and
/// column checks to pass; the delimiter check can only warn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub header: HeaderStatus,
    pub delimiter: DelimiterStatus,
    pub columns: ColumnStatus,
}

impl Verdict {
    pub fn proceed(&self) -> bool {
        self.header == HeaderStatus::Ok && self.columns == ColumnStatus::Ok
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut failed = Vec::new();
        if self.header == HeaderStatus::NotOk {
            failed.push("header is active (comment it with '#' or delete it)");
        }
        if self.columns == ColumnStatus::NotOk {
            failed.push("column count does not match the weighted argument");
        }
        if failed.is_empty() {
            write!(f, "ok")
        } else {
            write!(f, "{}", failed.join("; "))
        }
    }
}

/// Run the three sub-checks and log a summary in one pass.
pub fn validate(
    inference: &FormatInference,
    declared_delimiter: Option<char>,
    weighting: Weighting,
) -> Verdict {
    let header = check_header(inference);
    let delimiter = check_delimiter(inference.delimiter, declared_delimiter);
    let columns = check_columns(inference.columns, weighting);

    let verdict = Verdict {
        header,
        delimiter,
        columns,
    };
    report(&verdict);
    verdict
}

fn check_header(inference: &FormatInference) -> HeaderStatus {
    match &inference.headers {
        Some(fields) => {
            log::warn!("headers detected");
            if fields.first().is_some_and(|f| f.starts_with('#')) {
                log::info!("found commented header");
                HeaderStatus::Ok
            } else {
                log::warn!("please comment [#] or delete the header row");
                HeaderStatus::NotOk
            }
        }
        None => {
            log::info!("no headers detected");
            HeaderStatus::Ok
        }
    }
}

fn check_delimiter(detected: char, declared: Option<char>) -> DelimiterStatus {
    match declared {
        // No declaration means the whitespace default; only a
        // non-whitespace detection is worth a warning then.
        None => {
            if detected.is_whitespace() {
                DelimiterStatus::Match
            } else {
                DelimiterStatus::Tolerated
            }
        }
        Some(d) => {
            log::info!("provided delimiter: {d:?}, detected delimiter: {detected:?}");
            if d == detected {
                DelimiterStatus::Match
            } else {
                DelimiterStatus::Tolerated
            }
        }
    }
}

fn check_columns(columns: usize, weighting: Weighting) -> ColumnStatus {
    log::info!("detected columns: {columns}");
    if columns == weighting.expected_columns() {
        ColumnStatus::Ok
    } else {
        ColumnStatus::NotOk
    }
}

fn report(verdict: &Verdict) {
    match verdict.header {
        HeaderStatus::Ok => log::info!("headers..... OK"),
        HeaderStatus::NotOk => log::error!("headers..... NOT OK"),
    }
    match verdict.delimiter {
        DelimiterStatus::Match => log::info!("delimiter..... OK"),
        DelimiterStatus::Tolerated => log::warn!(
            "delimiter..... [!] OK — nodes may not be extracted correctly \
             if the file does not use the default (whitespace) delimiter"
        ),
    }
    match verdict.columns {
        ColumnStatus::Ok => log::info!("columns..... OK"),
        ColumnStatus::NotOk => log::error!("columns..... NOT OK"),
    }
}
