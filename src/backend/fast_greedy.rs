//! Greedy modularity agglomeration (Clauset-Newman-Moore).
//!
//! Starts from singleton communities and repeatedly merges the pair with
//! the largest modularity gain until no merge improves the partition.
//! This module holds the shared agglomerative core; [`FastGreedy`] runs
//! it blind to edge weights and reports no score, while the weighted,
//! modularity-reporting variant lives in [`super::cnm`].

use std::collections::BTreeMap;

use crate::backend::{BackendOptions, CommunityBackend, Detection};
use crate::error::Result;
use crate::graph::EdgeGraph;

/// Merge gain below this is treated as "no improvement".
const MIN_GAIN: f64 = 1e-12;

/// Agglomerate `n` nodes under the given edge list. Returns one raw
/// community label per node (labels are community seeds, not dense).
///
/// Bookkeeping follows the usual normalized form: `a[c]` is the fraction
/// of edge ends attached to community `c`, `between[c][d]` the fraction
/// of edge weight joining `c` and `d` (each as w/2m), and the gain of
/// merging is `2 * (between - a_c * a_d)`. Ordered maps keep merge
/// selection deterministic when gains tie.
pub(crate) fn agglomerate(n: usize, edges: &[(usize, usize, f64)]) -> Vec<usize> {
    let m: f64 = edges.iter().map(|&(_, _, w)| w).sum();
    if m == 0.0 {
        return (0..n).collect();
    }

    let mut a: BTreeMap<usize, f64> = (0..n).map(|i| (i, 0.0)).collect();
    let mut between: BTreeMap<usize, BTreeMap<usize, f64>> = BTreeMap::new();
    for &(u, v, w) in edges {
        if u == v {
            // Self-loops weigh on the degree but never join two
            // communities, so they produce no merge candidate.
            *a.entry(u).or_insert(0.0) += w / m;
            continue;
        }
        *a.entry(u).or_insert(0.0) += w / (2.0 * m);
        *a.entry(v).or_insert(0.0) += w / (2.0 * m);
        *between.entry(u).or_default().entry(v).or_insert(0.0) += w / (2.0 * m);
        *between.entry(v).or_default().entry(u).or_insert(0.0) += w / (2.0 * m);
    }

    let mut members: BTreeMap<usize, Vec<usize>> = (0..n).map(|i| (i, vec![i])).collect();

    loop {
        let mut best: Option<(f64, usize, usize)> = None;
        for (&c, neighbors) in &between {
            let a_c = a[&c];
            for (&d, &e_cd) in neighbors {
                if d <= c {
                    continue;
                }
                let gain = 2.0 * (e_cd - a_c * a[&d]);
                if best.is_none_or(|(g, _, _)| gain > g) {
                    best = Some((gain, c, d));
                }
            }
        }

        let Some((gain, keep, merge)) = best else {
            break;
        };
        if gain <= MIN_GAIN {
            break;
        }

        // Fold `merge` into `keep`.
        let merged_neighbors = between.remove(&merge).unwrap_or_default();
        for (d, w) in merged_neighbors {
            if d == keep {
                continue;
            }
            if let Some(row) = between.get_mut(&d) {
                row.remove(&merge);
            }
            *between.entry(keep).or_default().entry(d).or_insert(0.0) += w;
            *between.entry(d).or_default().entry(keep).or_insert(0.0) += w;
        }
        if let Some(row) = between.get_mut(&keep) {
            row.remove(&merge);
        }

        let a_merge = a.remove(&merge).unwrap_or(0.0);
        *a.entry(keep).or_insert(0.0) += a_merge;

        let moved = members.remove(&merge).unwrap_or_default();
        members.entry(keep).or_default().extend(moved);
    }

    let mut membership = vec![0; n];
    for (&community, nodes) in &members {
        for &node in nodes {
            membership[node] = community;
        }
    }
    membership
}

/// The weight-blind flavor: every edge counts as one, and no quality
/// score is reported.
#[derive(Debug, Default)]
pub struct FastGreedy;

impl FastGreedy {
    pub fn new() -> Self {
        FastGreedy
    }
}

impl CommunityBackend for FastGreedy {
    fn name(&self) -> &'static str {
        "fast-greedy"
    }

    fn detect(&self, graph: &EdgeGraph, _options: &BackendOptions) -> Result<Detection> {
        let edges: Vec<(usize, usize, f64)> = graph
            .edges()
            .into_iter()
            .map(|(u, v, _)| (u, v, 1.0))
            .collect();
        let membership = agglomerate(graph.node_count(), &edges);
        Ok(Detection {
            membership,
            quality: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testutil::two_cliques;

    #[test]
    fn splits_two_cliques() {
        let graph = two_cliques();
        let detection = FastGreedy::new()
            .detect(&graph, &BackendOptions::default())
            .unwrap();
        let m = &detection.membership;
        assert_eq!(m.len(), 6);
        assert_eq!(m[0], m[1]);
        assert_eq!(m[1], m[2]);
        assert_eq!(m[3], m[4]);
        assert_eq!(m[4], m[5]);
        assert_ne!(m[0], m[3]);
        assert!(detection.quality.is_none());
    }

    #[test]
    fn ignores_weights() {
        // A heavy bridge must not pull the cliques together, because
        // this flavor never looks at weights.
        let mut graph = two_cliques();
        graph.add_edge("a2", "b0", 99.0);
        let detection = FastGreedy::new()
            .detect(&graph, &BackendOptions::default())
            .unwrap();
        assert_ne!(detection.membership[0], detection.membership[3]);
    }

    #[test]
    fn edgeless_nodes_stay_singletons() {
        let membership = agglomerate(3, &[]);
        assert_eq!(membership, vec![0, 1, 2]);
    }

    #[test]
    fn deterministic_across_runs() {
        let graph = two_cliques();
        let first = agglomerate(graph.node_count(), &graph.edges());
        let second = agglomerate(graph.node_count(), &graph.edges());
        assert_eq!(first, second);
    }
}
