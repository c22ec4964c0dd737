//! Community-detection backends behind one uniform contract.
//!
//! Each backend consumes the built graph and returns one community
//! identifier per node, plus a quality score when its method measures
//! one (modularity for the greedy/Louvain family, codelength for the map
//! equation). Identifiers from different backends, or from different
//! runs, are never comparable; the adapter renumbers them densely for
//! output readability only.

mod cnm;
mod fast_greedy;
mod infomap;
mod louvain;

use std::fmt;

use clap::ValueEnum;

use crate::error::{Error, Result};
use crate::graph::EdgeGraph;
use crate::mapping::CommunityMapping;

pub use cnm::Cnm;
pub use fast_greedy::FastGreedy;
pub use infomap::Infomap;
pub use louvain::Louvain;

/// Optional per-run quality measure. Absence is a valid outcome, not a
/// failure: some methods simply do not score their partition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quality {
    Modularity(f64),
    Codelength(f64),
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Modularity(q) => write!(f, "modularity {q:.6}"),
            Quality::Codelength(l) => write!(f, "codelength {l:.6}"),
        }
    }
}

/// Backend-specific options. Opaque pass-through values: the adapter
/// checks types, never meaning. `trials` is consumed by infomap; `raw`
/// carries method-specific switches and is ignored by backends that take
/// none.
#[derive(Debug, Clone)]
pub struct BackendOptions {
    pub trials: u32,
    pub raw: Option<String>,
}

impl Default for BackendOptions {
    fn default() -> Self {
        BackendOptions {
            trials: 1,
            raw: None,
        }
    }
}

/// What a backend hands back: one community label per graph node index,
/// and optionally a score.
#[derive(Debug, Clone)]
pub struct Detection {
    pub membership: Vec<usize>,
    pub quality: Option<Quality>,
}

/// The uniform capability every backend implements.
pub trait CommunityBackend {
    fn name(&self) -> &'static str;

    /// Partition the graph. `membership[i]` is the community of node `i`.
    fn detect(&self, graph: &EdgeGraph, options: &BackendOptions) -> Result<Detection>;
}

/// The closed set of selectable backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Greedy modularity agglomeration, weight-blind.
    FastGreedy,
    /// Louvain multi-level modularity optimization.
    Louvain,
    /// Two-level map-equation minimization.
    Infomap,
    /// Clauset-Newman-Moore agglomeration over edge weights.
    Cnm,
}

impl Backend {
    pub fn label(self) -> &'static str {
        match self {
            Backend::FastGreedy => "fast-greedy",
            Backend::Louvain => "louvain",
            Backend::Infomap => "infomap",
            Backend::Cnm => "cnm",
        }
    }

    /// Registry lookup: backend identifier → implementation. The single
    /// place where the identifier is interpreted.
    fn implementation(self) -> Box<dyn CommunityBackend> {
        match self {
            Backend::FastGreedy => Box::new(FastGreedy::new()),
            Backend::Louvain => Box::new(Louvain::new()),
            Backend::Infomap => Box::new(Infomap::new()),
            Backend::Cnm => Box::new(Cnm::new()),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Invoke `backend` once on `graph` and normalize its result.
///
/// Selection happens exactly once per run: a failing backend surfaces as
/// [`Error::CommunityDetection`] naming it, with no retry and no
/// fallback to another method. A membership that is not total over the
/// graph's nodes is treated as a backend failure too.
pub fn detect_communities(
    graph: &EdgeGraph,
    backend: Backend,
    options: &BackendOptions,
) -> Result<(CommunityMapping, Option<Quality>)> {
    if graph.node_count() == 0 {
        return Ok((CommunityMapping::default(), None));
    }

    let implementation = backend.implementation();
    log::info!("finding communities with {}.....", implementation.name());

    let detection = implementation.detect(graph, options)?;
    if detection.membership.len() != graph.node_count() {
        return Err(Error::CommunityDetection {
            backend: implementation.name(),
            reason: format!(
                "returned {} assignments for {} nodes",
                detection.membership.len(),
                graph.node_count()
            ),
        });
    }

    let mapping = CommunityMapping::from_membership(graph, &detection.membership);
    log::info!(
        "total communities found with {}: {}",
        implementation.name(),
        mapping.community_count()
    );
    if let Some(quality) = detection.quality {
        log::info!("partition quality: {quality}");
    }

    Ok((mapping, detection.quality))
}

/// Modularity of a partition over an undirected weighted edge list.
/// Self-loops count once toward total weight and twice toward degree.
pub(crate) fn modularity(n: usize, edges: &[(usize, usize, f64)], membership: &[usize]) -> f64 {
    let m: f64 = edges.iter().map(|&(_, _, w)| w).sum();
    if m == 0.0 {
        return 0.0;
    }

    let mut degree = vec![0.0; n];
    for &(u, v, w) in edges {
        if u == v {
            degree[u] += 2.0 * w;
        } else {
            degree[u] += w;
            degree[v] += w;
        }
    }

    let communities = membership.iter().copied().max().unwrap_or(0) + 1;
    let mut intra = vec![0.0; communities];
    let mut community_degree = vec![0.0; communities];
    for &(u, v, w) in edges {
        if membership[u] == membership[v] {
            intra[membership[u]] += w;
        }
    }
    for (node, &c) in membership.iter().enumerate() {
        community_degree[c] += degree[node];
    }

    (0..communities)
        .map(|c| intra[c] / m - (community_degree[c] / (2.0 * m)).powi(2))
        .sum()
}
