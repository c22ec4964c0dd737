//! End-to-end run: sniff → validate → build → detect → persist.
//!
//! Strictly sequential; no stage starts before the previous one
//! finished, and a failed validation halts before any graph is built.
//! The pipeline only returns values — deciding what a failure means for
//! the process is the caller's business.

use std::path::PathBuf;

use crate::backend::{self, Backend, BackendOptions, Quality};
use crate::error::{Error, Result};
use crate::graph;
use crate::mapping::CommunityMapping;
use crate::output;
use crate::sanity::{self, Weighting};
use crate::sniff;

/// Everything one run needs, passed explicitly — no ambient state.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    /// Declared column separator; `None` means whitespace.
    pub delimiter: Option<char>,
    pub weighting: Weighting,
    pub backend: Backend,
    pub options: BackendOptions,
    /// When false the mapping is computed and reported but not written.
    pub write_output: bool,
}

/// What a completed run reports back.
#[derive(Debug)]
pub struct RunReport {
    pub nodes: usize,
    pub edges: usize,
    pub communities: usize,
    pub quality: Option<Quality>,
    /// `(snapshot, grouped)` when artifacts were written.
    pub artifacts: Option<(PathBuf, PathBuf)>,
    pub mapping: CommunityMapping,
}

/// Execute one pipeline run.
pub fn run(config: &RunConfig) -> Result<RunReport> {
    log::info!("initializing.....");

    let inference = sniff::sniff(&config.input)?;
    let verdict = sanity::validate(&inference, config.delimiter, config.weighting);
    if !verdict.proceed() {
        return Err(Error::Validation(verdict));
    }
    log::info!("sanity check..... COMPLETE");

    let graph = graph::build(
        &config.input,
        config.delimiter,
        config.weighting,
        inference.skip_rows,
    )?;
    let nodes = graph.node_count();
    let edges = graph.edge_count();

    let (mapping, quality) = backend::detect_communities(&graph, config.backend, &config.options)?;

    let artifacts = if config.write_output {
        let prefix = output::output_prefix(&config.input, config.backend.label())?;
        Some(output::write(&mapping, &prefix)?)
    } else {
        None
    };

    Ok(RunReport {
        nodes,
        edges,
        communities: mapping.community_count(),
        quality,
        artifacts,
        mapping,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_input(dir: &std::path::Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn config(input: PathBuf) -> RunConfig {
        RunConfig {
            input,
            delimiter: None,
            weighting: Weighting::Unweighted,
            backend: Backend::Louvain,
            options: BackendOptions::default(),
            write_output: false,
        }
    }

    #[test]
    fn runs_simple_unweighted_input() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "edges.txt", "a b\nc d\na c\n");
        let report = run(&config(input)).unwrap();
        assert_eq!(report.nodes, 4);
        assert_eq!(report.edges, 3);
        assert_eq!(report.mapping.len(), 4);
        assert!(report.artifacts.is_none());
    }

    #[test]
    fn active_header_halts_before_graph_build() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "edges.csv", "source,target\n1,2\n2,3\n");
        let mut cfg = config(input);
        cfg.delimiter = Some(',');
        cfg.write_output = true;
        let err = run(&cfg).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        // Nothing may have been written.
        assert!(!dir.path().join("louvain_edges.snap").exists());
        assert!(!dir.path().join("louvain_edges.grp").exists());
    }

    #[test]
    fn weighted_declaration_against_two_columns_halts() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "edges.txt", "1 2\n2 3\n");
        let mut cfg = config(input);
        cfg.weighting = Weighting::Weighted;
        let err = run(&cfg).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn writes_artifacts_when_asked() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "edges.txt", "1 2\n2 3\n3 1\n7 8\n8 9\n9 7\n");
        let mut cfg = config(input);
        cfg.write_output = true;
        let report = run(&cfg).unwrap();
        let (snapshot, grouped) = report.artifacts.unwrap();
        assert!(snapshot.ends_with("louvain_edges.snap"));
        assert!(grouped.ends_with("louvain_edges.grp"));
        assert!(snapshot.exists());
        assert!(grouped.exists());
    }
}
