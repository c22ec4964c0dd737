//! Numeric relabeling: rewrite a string-labelled edge list into one
//! whose endpoints are dense integers, ready for the detect pipeline.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};

use crate::error::{Error, Result};
use crate::sanity::Weighting;

#[derive(Debug)]
pub struct RelabelReport {
    /// Distinct node labels seen.
    pub nodes: usize,
    pub rows_written: usize,
    pub rows_dropped: usize,
    pub output: PathBuf,
}

/// Rewrite `input` with every endpoint label replaced by a dense integer
/// id, assigned in first-occurrence order (source before target, row by
/// row).
///
/// Rows with a missing or empty endpoint are dropped, as are rows whose
/// endpoint labels are shorter than `min_label_len` when one is given.
/// In weighted mode the weight field is stripped of blanks, parsed as an
/// integer and normalized as `ln(1 + w)` rounded to 6 decimals; an
/// unparsable weight aborts the rewrite. Output lands next to the input
/// as `<stem>_numeric<ext>`, comma-separated, no header.
pub fn run(
    input: &Path,
    separator: char,
    weighting: Weighting,
    min_label_len: Option<usize>,
) -> Result<RelabelReport> {
    if !separator.is_ascii() {
        return Err(Error::InvalidArgument {
            name: "separator",
            reason: format!("'{separator}' is not a single-byte separator"),
        });
    }

    let reader = ReaderBuilder::new()
        .delimiter(separator as u8)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(input)
        .map_err(|e| Error::UnreadableInput {
            path: input.to_path_buf(),
            source: std::io::Error::other(e),
        })?;

    let output = numeric_output_path(input)?;
    let file = File::create(&output).map_err(|source| Error::Persist {
        path: output.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    log::info!("loading input dataset.....");

    let mut ids: HashMap<String, usize> = HashMap::new();
    let mut rows_written = 0usize;
    let mut rows_dropped = 0usize;

    for (row, record) in reader.into_records().enumerate() {
        let row = row + 1;
        let record = record.map_err(|e| Error::GraphLoad {
            row: Some(row),
            reason: e.to_string(),
        })?;

        let source = record.get(0).unwrap_or("");
        let target = record.get(1).unwrap_or("");
        if source.is_empty() || target.is_empty() {
            rows_dropped += 1;
            continue;
        }
        if let Some(min) = min_label_len {
            if source.len() < min || target.len() < min {
                rows_dropped += 1;
                continue;
            }
        }

        let weight = if weighting.is_weighted() {
            match record.get(2).map(str::trim).filter(|w| !w.is_empty()) {
                Some(raw) => Some(normalized_weight(raw, row)?),
                None => {
                    rows_dropped += 1;
                    continue;
                }
            }
        } else {
            None
        };

        let source_id = intern(&mut ids, source);
        let target_id = intern(&mut ids, target);

        let line = match weight {
            Some(w) => writeln!(writer, "{source_id},{target_id},{w}"),
            None => writeln!(writer, "{source_id},{target_id}"),
        };
        line.map_err(|source| persist_and_discard(&output, source))?;
        rows_written += 1;
    }

    writer
        .flush()
        .map_err(|source| persist_and_discard(&output, source))?;

    log::info!(
        "numeric mapping complete: {} nodes, {} rows written, {} rows dropped",
        ids.len(),
        rows_written,
        rows_dropped
    );

    Ok(RelabelReport {
        nodes: ids.len(),
        rows_written,
        rows_dropped,
        output,
    })
}

fn intern(ids: &mut HashMap<String, usize>, label: &str) -> usize {
    match ids.get(label) {
        Some(&id) => id,
        None => {
            let id = ids.len();
            ids.insert(label.to_string(), id);
            id
        }
    }
}

/// Strip blanks, parse as integer, squash with `ln(1 + w)` to tame the
/// spread, round to 6 decimals.
fn normalized_weight(raw: &str, row: usize) -> Result<f64> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let value: i64 = cleaned.parse().map_err(|_| Error::GraphLoad {
        row: Some(row),
        reason: format!("can not parse weight '{raw}'"),
    })?;
    if value < 0 {
        return Err(Error::GraphLoad {
            row: Some(row),
            reason: format!("negative weight '{raw}' can not be log-normalized"),
        });
    }
    let log = (1.0 + value as f64).ln();
    Ok((log * 1e6).round() / 1e6)
}

fn numeric_output_path(input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| Error::InvalidArgument {
            name: "input-file",
            reason: format!("'{}' has no file name", input.display()),
        })?
        .to_string_lossy();
    let name = match input.extension() {
        Some(ext) => format!("{stem}_numeric.{}", ext.to_string_lossy()),
        None => format!("{stem}_numeric"),
    };
    Ok(input.parent().unwrap_or_else(|| Path::new("")).join(name))
}

fn persist_and_discard(output: &Path, source: std::io::Error) -> Error {
    let _ = std::fs::remove_file(output);
    Error::Persist {
        path: output.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write as _;
    use tempfile::tempdir;

    fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn assigns_ids_in_first_occurrence_order() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "edges.csv", "alice,bob\ncarol,alice\n");
        let report = run(&input, ',', Weighting::Unweighted, None).unwrap();
        assert_eq!(report.nodes, 3);
        assert_eq!(report.rows_written, 2);
        let contents = fs::read_to_string(&report.output).unwrap();
        // alice=0, bob=1, carol=2
        assert_eq!(contents, "0,1\n2,0\n");
    }

    #[test]
    fn output_name_carries_numeric_suffix() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "edges.csv", "a,b\n");
        let report = run(&input, ',', Weighting::Unweighted, None).unwrap();
        assert_eq!(report.output, dir.path().join("edges_numeric.csv"));
    }

    #[test]
    fn log_normalizes_weights() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "edges.csv", "a,b,1\nb,c,0\n");
        let report = run(&input, ',', Weighting::Weighted, None).unwrap();
        let contents = fs::read_to_string(&report.output).unwrap();
        assert_eq!(contents, "0,1,0.693147\n1,2,0\n");
    }

    #[test]
    fn drops_rows_with_missing_endpoint() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "edges.csv", "a,b\nc,\nd,e\n");
        let report = run(&input, ',', Weighting::Unweighted, None).unwrap();
        assert_eq!(report.rows_written, 2);
        assert_eq!(report.rows_dropped, 1);
    }

    #[test]
    fn drops_short_labels_when_asked() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "edges.csv", "abcd,efgh\nx,efgh\n");
        let report = run(&input, ',', Weighting::Unweighted, Some(4)).unwrap();
        assert_eq!(report.rows_written, 1);
        assert_eq!(report.rows_dropped, 1);
    }

    #[test]
    fn unparsable_weight_names_the_row() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "edges.csv", "a,b,3\nb,c,heavy\n");
        let err = run(&input, ',', Weighting::Weighted, None).unwrap_err();
        assert!(matches!(err, Error::GraphLoad { row: Some(2), .. }));
    }
}
