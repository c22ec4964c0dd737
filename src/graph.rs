//! Graph construction from a validated edge-list file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::error::{Error, Result};
use crate::sanity::Weighting;

/// Undirected graph with opaque string node labels and f64 edge weights.
/// Unweighted input produces unit weights. Parallel edges are collapsed
/// by summing their weights; self-loops are kept as-is.
#[derive(Debug, Default)]
pub struct EdgeGraph {
    graph: UnGraph<String, f64>,
    indices: HashMap<String, NodeIndex>,
}

impl EdgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Label of the node at dense index `idx` (insertion order).
    pub fn label(&self, idx: usize) -> &str {
        &self.graph[NodeIndex::new(idx)]
    }

    /// Node labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// Edges as `(source, target, weight)` over dense node indices.
    /// Self-loops appear with source == target.
    pub fn edges(&self) -> Vec<(usize, usize, f64)> {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), *e.weight()))
            .collect()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.indices.contains_key(label)
    }

    fn intern(&mut self, label: &str) -> NodeIndex {
        match self.indices.get(label) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.add_node(label.to_string());
                self.indices.insert(label.to_string(), idx);
                idx
            }
        }
    }

    /// Insert an edge, merging a parallel edge by summing weights.
    pub fn add_edge(&mut self, source: &str, target: &str, weight: f64) {
        let a = self.intern(source);
        let b = self.intern(target);
        if let Some(edge) = self.graph.find_edge(a, b) {
            self.graph[edge] += weight;
        } else {
            self.graph.add_edge(a, b, weight);
        }
    }
}

/// Stream `path` into an [`EdgeGraph`].
///
/// Must only be called after a passing sanity verdict; `skip_rows` is the
/// count the sniffer reported. Blank lines and `#`-commented lines are
/// skipped, which is what lets a commented header through. In unweighted
/// mode only the first two fields are read and any extras are ignored —
/// a deliberate leniency, not an accident of indexing. Weighted mode
/// requires exactly three fields with a numeric third.
pub fn build(
    path: &Path,
    delimiter: Option<char>,
    weighting: Weighting,
    skip_rows: usize,
) -> Result<EdgeGraph> {
    let file = File::open(path).map_err(|source| Error::UnreadableInput {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!(
        "creating {} graph from '{}'",
        if weighting.is_weighted() {
            "weighted"
        } else {
            "unweighted"
        },
        path.display()
    );

    let mut graph = EdgeGraph::new();
    for (row, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| Error::UnreadableInput {
            path: path.to_path_buf(),
            source,
        })?;
        let row = row + 1;
        if row <= skip_rows {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = match delimiter {
            Some(d) => trimmed.split(d).collect(),
            None => trimmed.split_whitespace().collect(),
        };

        match weighting {
            Weighting::Unweighted => {
                if fields.len() < 2 {
                    return Err(Error::GraphLoad {
                        row: Some(row),
                        reason: format!("expected at least 2 columns, found {}", fields.len()),
                    });
                }
                graph.add_edge(fields[0].trim(), fields[1].trim(), 1.0);
            }
            Weighting::Weighted => {
                if fields.len() != 3 {
                    return Err(Error::GraphLoad {
                        row: Some(row),
                        reason: format!("expected 3 columns, found {}", fields.len()),
                    });
                }
                let weight: f64 = fields[2].trim().parse().map_err(|_| Error::GraphLoad {
                    row: Some(row),
                    reason: format!("can not parse weight '{}'", fields[2].trim()),
                })?;
                graph.add_edge(fields[0].trim(), fields[1].trim(), weight);
            }
        }
    }

    log::info!(
        "total nodes in graph: {}, total edges in graph: {}",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}
