use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use env_logger::Env;

use netcomm::generate::{self, GenerateConfig};
use netcomm::pipeline::{self, RunConfig};
use netcomm::{filter, relabel};
use netcomm::{Backend, BackendOptions, Error, Result, Weighting};

#[derive(Parser)]
#[command(
    name = "netcomm",
    version,
    about = "Network analysis and community detection over edge-list files"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect communities in an edge-list file
    Detect {
        /// Input file path, e.g. /home/user/data/input/file_name.txt
        #[arg(short, long = "input-file")]
        input: PathBuf,
        /// Column separator: a single character, or "tab"/"space".
        /// Default is whitespace
        #[arg(short, long)]
        delimiter: Option<String>,
        /// yes/no - whether the file has a weight column
        #[arg(short, long)]
        weighted: Option<String>,
        /// Detection algorithm
        #[arg(short, long, value_enum, default_value_t = Backend::Louvain)]
        algorithm: Backend,
        /// Number of trials (infomap)
        #[arg(short, long)]
        trials: Option<u32>,
        /// yes/no - whether to create the output files
        #[arg(short, long)]
        output: Option<String>,
        /// Backend-specific options, passed through untouched
        #[arg(long)]
        backend_options: Option<String>,
    },
    /// Rewrite string node labels as dense integers
    Relabel {
        /// Input file path
        #[arg(short, long = "input-file")]
        input: PathBuf,
        /// Column separator, default is comma (,)
        #[arg(short, long)]
        separator: Option<String>,
        /// yes/no - whether the file has a weight column
        #[arg(short, long)]
        weighted: String,
        /// Drop rows whose endpoint labels are shorter than this
        #[arg(long)]
        min_label_len: Option<usize>,
    },
    /// Project selected columns out of a raw delimited file
    Filter {
        /// Input file path
        #[arg(short, long = "input-file")]
        input: PathBuf,
        /// 1-based column indexes, comma separated, e.g. "1,2"
        #[arg(short, long)]
        columns: String,
        /// Column separator, default is whitespace
        #[arg(short, long)]
        separator: Option<String>,
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Generate a synthetic edge list with planted communities
    Generate {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, default_value_t = 140)]
        nodes: usize,
        #[arg(short, long, default_value_t = 500)]
        edges: usize,
        /// Number of planted blocks
        #[arg(short, long, default_value_t = 4)]
        blocks: usize,
        /// Probability that an edge stays inside its block
        #[arg(long, default_value_t = 0.9)]
        intra: f64,
        /// Add a random weight column
        #[arg(short, long)]
        weighted: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli.command) {
        log::error!("{err}");
        process::exit(1);
    }
}

fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Detect {
            input,
            delimiter,
            weighted,
            algorithm,
            trials,
            output,
            backend_options,
        } => {
            log::info!("network analysis and community detection with {algorithm}");
            if delimiter.is_none() {
                log::info!("no delimiter provided! using default (whitespace).....");
            }
            let config = RunConfig {
                input,
                delimiter: parse_delimiter(delimiter.as_deref())?,
                weighting: parse_weighted(weighted.as_deref())?,
                backend: algorithm,
                options: BackendOptions {
                    trials: parse_trials(trials),
                    raw: backend_options,
                },
                write_output: parse_output(output.as_deref()),
            };
            let report = pipeline::run(&config)?;
            log::info!(
                "run complete: {} nodes, {} edges, {} communities",
                report.nodes,
                report.edges,
                report.communities
            );
            if let Some((snapshot, grouped)) = report.artifacts {
                log::info!(
                    "artifacts: '{}', '{}'",
                    snapshot.display(),
                    grouped.display()
                );
            }
            Ok(())
        }
        Command::Relabel {
            input,
            separator,
            weighted,
            min_label_len,
        } => {
            let separator = match parse_delimiter(separator.as_deref())? {
                Some(c) => c,
                None => {
                    log::info!("no separator provided! using default (,).....");
                    ','
                }
            };
            let weighting = Weighting::parse(&weighted)?;
            let report = relabel::run(&input, separator, weighting, min_label_len)?;
            log::info!(
                "relabeled {} node(s) into '{}'",
                report.nodes,
                report.output.display()
            );
            Ok(())
        }
        Command::Filter {
            input,
            columns,
            separator,
            output,
        } => {
            let columns = parse_columns(&columns)?;
            let separator = parse_delimiter(separator.as_deref())?;
            let report = filter::run(&input, &columns, separator, &output)?;
            log::info!(
                "filtered {} line(s) into '{}'",
                report.lines,
                report.output.display()
            );
            Ok(())
        }
        Command::Generate {
            output,
            nodes,
            edges,
            blocks,
            intra,
            weighted,
        } => {
            let config = GenerateConfig {
                nodes,
                edges,
                blocks,
                intra_probability: intra,
                weighting: if weighted {
                    Weighting::Weighted
                } else {
                    Weighting::Unweighted
                },
                ..GenerateConfig::default()
            };
            generate::generate(&config, &output)?;
            Ok(())
        }
    }
}

fn parse_delimiter(raw: Option<&str>) -> Result<Option<char>> {
    match raw {
        None => Ok(None),
        Some("tab") => Ok(Some('\t')),
        Some("space") => Ok(Some(' ')),
        Some(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Some(c)),
                _ => Err(Error::InvalidArgument {
                    name: "delimiter",
                    reason: format!("expected a single character or tab/space, got '{s}'"),
                }),
            }
        }
    }
}

fn parse_weighted(raw: Option<&str>) -> Result<Weighting> {
    match raw {
        Some(token) => Weighting::parse(token),
        None => {
            log::info!("no weighted parameter provided! using default (no).....");
            Ok(Weighting::Unweighted)
        }
    }
}

fn parse_trials(raw: Option<u32>) -> u32 {
    raw.unwrap_or_else(|| {
        log::info!("no number of trials provided! using default (1).....");
        1
    })
}

/// Output defaults to yes; any non-yes token disables it, mirroring the
/// lenient historical behavior of the flag.
fn parse_output(raw: Option<&str>) -> bool {
    match raw {
        None => {
            log::info!("no output parameter provided! using default (yes).....");
            true
        }
        Some(token) => {
            let t = token.trim();
            t.eq_ignore_ascii_case("yes") || t.eq_ignore_ascii_case("y")
        }
    }
}

fn parse_columns(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(|part| {
            part.trim().parse::<usize>().map_err(|_| Error::InvalidArgument {
                name: "columns",
                reason: format!("'{part}' is not a column index"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_words_map_to_characters() {
        assert_eq!(parse_delimiter(Some("tab")).unwrap(), Some('\t'));
        assert_eq!(parse_delimiter(Some("space")).unwrap(), Some(' '));
        assert_eq!(parse_delimiter(Some(";")).unwrap(), Some(';'));
        assert_eq!(parse_delimiter(None).unwrap(), None);
        assert!(parse_delimiter(Some("--")).is_err());
    }

    #[test]
    fn output_token_is_lenient() {
        assert!(parse_output(None));
        assert!(parse_output(Some("Yes")));
        assert!(parse_output(Some("y")));
        assert!(!parse_output(Some("no")));
        assert!(!parse_output(Some("banana")));
    }

    #[test]
    fn columns_parse_as_indexes() {
        assert_eq!(parse_columns("1,2,5").unwrap(), vec![1, 2, 5]);
        assert!(parse_columns("1,x").is_err());
    }
}
