//! Column projection over a raw delimited file, in the manner of
//! `awk '{print $a","$b}'`: selected columns joined with commas, one
//! output line per input line.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug)]
pub struct FilterReport {
    pub lines: usize,
    pub output: PathBuf,
}

/// Project `columns` (1-based indexes) out of `input` into `output`.
///
/// `separator` None splits on whitespace, awk's default. A column index
/// past the end of a line yields an empty field rather than an error,
/// matching awk's `$n` semantics.
pub fn run(
    input: &Path,
    columns: &[usize],
    separator: Option<char>,
    output: &Path,
) -> Result<FilterReport> {
    if columns.is_empty() {
        return Err(Error::InvalidArgument {
            name: "columns",
            reason: "at least one column index is required".to_string(),
        });
    }
    if columns.contains(&0) {
        return Err(Error::InvalidArgument {
            name: "columns",
            reason: "column indexes are 1-based".to_string(),
        });
    }

    let file = File::open(input).map_err(|source| Error::UnreadableInput {
        path: input.to_path_buf(),
        source,
    })?;

    log::info!("reading input file.....");
    let out_file = File::create(output).map_err(|source| Error::Persist {
        path: output.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(out_file);

    let mut lines = 0usize;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| Error::UnreadableInput {
            path: input.to_path_buf(),
            source,
        })?;
        let fields: Vec<&str> = match separator {
            Some(sep) => line.split(sep).collect(),
            None => line.split_whitespace().collect(),
        };
        let projected: Vec<&str> = columns
            .iter()
            .map(|&c| fields.get(c - 1).copied().unwrap_or(""))
            .collect();
        writeln!(writer, "{}", projected.join(",")).map_err(|source| {
            let _ = std::fs::remove_file(output);
            Error::Persist {
                path: output.to_path_buf(),
                source,
            }
        })?;
        lines += 1;
    }

    writer.flush().map_err(|source| {
        let _ = std::fs::remove_file(output);
        Error::Persist {
            path: output.to_path_buf(),
            source,
        }
    })?;

    log::info!("output file creation complete: {} line(s)", lines);
    Ok(FilterReport {
        lines,
        output: output.to_path_buf(),
    })
}
