//! Format sniffing: infer delimiter, header presence and column count
//! from the first few lines of an edge-list file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

/// Number of lines sampled from the head of the file.
pub const SAMPLE_LINES: usize = 5;

/// Candidate delimiters, tried in order of preference.
const CANDIDATES: [char; 6] = [',', '\t', ';', '|', ' ', ':'];

/// What was inferred from the file head. Produced once per file and
/// immutable afterwards; the sampled lines themselves are not kept.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatInference {
    /// Detected column separator.
    pub delimiter: char,
    /// First-line fields, present only when a header was detected.
    pub headers: Option<Vec<String>>,
    /// Field count of the first line under the detected delimiter.
    pub columns: usize,
    /// Rows the loader has to skip (1 with a header, else 0).
    pub skip_rows: usize,
}

/// Inspect the head of `path` and infer its dialect.
///
/// Fails with [`Error::UnreadableInput`] when the file cannot be opened
/// and with [`Error::AmbiguousFormat`] when no candidate delimiter splits
/// the sample consistently. Ambiguity is never resolved by guessing.
pub fn sniff(path: &Path) -> Result<FormatInference> {
    let file = File::open(path).map_err(|source| Error::UnreadableInput {
        path: path.to_path_buf(),
        source,
    })?;

    let mut sample = Vec::with_capacity(SAMPLE_LINES);
    for line in BufReader::new(file).lines().take(SAMPLE_LINES) {
        let line = line.map_err(|source| Error::UnreadableInput {
            path: path.to_path_buf(),
            source,
        })?;
        sample.push(line);
    }

    let ambiguous = |reason: &str| Error::AmbiguousFormat {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    // Blank lines carry no dialect information; drop them up front.
    let sample: Vec<String> = sample
        .into_iter()
        .filter(|l| !l.trim().is_empty())
        .collect();
    if sample.is_empty() {
        return Err(ambiguous("file sample is empty"));
    }

    let delimiter = detect_delimiter(&sample).ok_or_else(|| {
        ambiguous("no delimiter splits the sample into a consistent number of columns")
    })?;

    let first_fields: Vec<String> = sample[0].split(delimiter).map(str::to_string).collect();
    let columns = first_fields.len();

    let (headers, skip_rows) = if has_header(&sample, delimiter) {
        (Some(first_fields), 1)
    } else {
        (None, 0)
    };

    log::debug!(
        "sniffed '{}': delimiter {:?}, {} column(s), header: {}",
        path.display(),
        delimiter,
        columns,
        headers.is_some()
    );

    Ok(FormatInference {
        delimiter,
        headers,
        columns,
        skip_rows,
    })
}

/// A candidate wins when every non-blank sample line splits into the
/// same number of fields, and that number is at least two.
fn detect_delimiter(sample: &[String]) -> Option<char> {
    CANDIDATES.into_iter().find(|&candidate| {
        let mut counts = sample.iter().map(|l| l.split(candidate).count());
        match counts.next() {
            Some(first) if first >= 2 => counts.all(|c| c == first),
            _ => false,
        }
    })
}

/// Vote-based header heuristic over the sample: per column, the first
/// row's field is compared against the rest. When the rest is uniformly
/// numeric, a non-numeric first field votes for a header; when the rest
/// shares one field length, a diverging first-field length votes for a
/// header. Matching fields vote against. Needs a positive tally overall,
/// so a single-line sample never reports a header.
fn has_header(sample: &[String], delimiter: char) -> bool {
    if sample.len() < 2 {
        return false;
    }

    let rows: Vec<Vec<&str>> = sample.iter().map(|l| l.split(delimiter).collect()).collect();
    let columns = rows[0].len();
    let mut votes = 0i32;

    for col in 0..columns {
        let rest: Vec<&str> = rows[1..].iter().filter_map(|r| r.get(col).copied()).collect();
        if rest.is_empty() {
            continue;
        }
        let first = rows[0][col];

        if rest.iter().all(|f| f.trim().parse::<f64>().is_ok()) {
            if first.trim().parse::<f64>().is_ok() {
                votes -= 1;
            } else {
                votes += 1;
            }
        } else {
            let len = rest[0].len();
            if rest.iter().all(|f| f.len() == len) {
                if first.len() == len {
                    votes -= 1;
                } else {
                    votes += 1;
                }
            }
        }
    }

    votes > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn detects_comma_and_header() {
        let file = sample_file("source,target\n1,2\n2,3\n");
        let inference = sniff(file.path()).unwrap();
        assert_eq!(inference.delimiter, ',');
        assert_eq!(inference.columns, 2);
        assert_eq!(
            inference.headers,
            Some(vec!["source".to_string(), "target".to_string()])
        );
        assert_eq!(inference.skip_rows, 1);
    }

    #[test]
    fn detects_commented_header() {
        let file = sample_file("#source,target\n1,2\n2,3\n");
        let inference = sniff(file.path()).unwrap();
        assert_eq!(inference.delimiter, ',');
        let headers = inference.headers.unwrap();
        assert!(headers[0].starts_with('#'));
    }

    #[test]
    fn space_delimited_without_header() {
        let file = sample_file("a b\nc d\na c\n");
        let inference = sniff(file.path()).unwrap();
        assert_eq!(inference.delimiter, ' ');
        assert_eq!(inference.columns, 2);
        assert_eq!(inference.headers, None);
        assert_eq!(inference.skip_rows, 0);
    }

    #[test]
    fn tab_delimited_weighted() {
        let file = sample_file("1\t2\t10\n2\t3\t4\n3\t1\t7\n");
        let inference = sniff(file.path()).unwrap();
        assert_eq!(inference.delimiter, '\t');
        assert_eq!(inference.columns, 3);
        assert_eq!(inference.headers, None);
    }

    #[test]
    fn numeric_rows_do_not_vote_header() {
        let file = sample_file("1,2\n2,3\n3,4\n");
        let inference = sniff(file.path()).unwrap();
        assert_eq!(inference.headers, None);
    }

    #[test]
    fn single_column_is_ambiguous() {
        let file = sample_file("alpha\nbeta\ngamma\n");
        let err = sniff(file.path()).unwrap_err();
        assert!(matches!(err, Error::AmbiguousFormat { .. }));
    }

    #[test]
    fn empty_file_is_ambiguous() {
        let file = sample_file("");
        let err = sniff(file.path()).unwrap_err();
        assert!(matches!(err, Error::AmbiguousFormat { .. }));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = sniff(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, Error::UnreadableInput { .. }));
    }

    #[test]
    fn column_count_comes_from_first_line() {
        // Header line drives the reported column count even when present.
        let file = sample_file("id,peer\n10,20\n30,40\n");
        let inference = sniff(file.path()).unwrap();
        assert_eq!(inference.columns, 2);
        assert_eq!(inference.skip_rows, 1);
    }
}
