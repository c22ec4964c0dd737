//! Louvain multi-level modularity optimization (Blondel et al. 2008).
//!
//! Alternates two phases: greedy local moving of single nodes between
//! neighboring communities, then aggregation of each community into one
//! node of a coarser graph, until modularity stops improving. Node order
//! is fixed and tie-breaks are resolved by ascending community id, so a
//! rerun over the same graph reproduces the same partition.

use std::collections::BTreeMap;

use crate::backend::{modularity, BackendOptions, CommunityBackend, Detection, Quality};
use crate::error::Result;
use crate::graph::EdgeGraph;

#[derive(Debug, Clone)]
pub struct Louvain {
    resolution: f64,
    max_passes: usize,
    max_levels: usize,
    min_gain: f64,
}

impl Louvain {
    pub fn new() -> Self {
        Louvain {
            resolution: 1.0,
            max_passes: 100,
            max_levels: 10,
            min_gain: 1e-7,
        }
    }

    /// Resolution parameter; higher values favor smaller communities.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new()
    }
}

/// One level of the aggregation hierarchy.
struct Level {
    n: usize,
    /// Adjacency without self entries: (neighbor, weight).
    adj: Vec<Vec<(usize, f64)>>,
    /// Self-loop weight per node, counted once.
    self_w: Vec<f64>,
    /// Weighted degree, self-loops counted twice.
    strength: Vec<f64>,
    /// Total edge weight, self-loops counted once.
    total: f64,
}

impl Level {
    fn from_edges(n: usize, edges: &[(usize, usize, f64)]) -> Self {
        let mut adj = vec![Vec::new(); n];
        let mut self_w = vec![0.0; n];
        let mut strength = vec![0.0; n];
        let mut total = 0.0;
        for &(u, v, w) in edges {
            total += w;
            if u == v {
                self_w[u] += w;
                strength[u] += 2.0 * w;
            } else {
                adj[u].push((v, w));
                adj[v].push((u, w));
                strength[u] += w;
                strength[v] += w;
            }
        }
        Level {
            n,
            adj,
            self_w,
            strength,
            total,
        }
    }

    /// Phase 1: move nodes between communities while modularity grows.
    /// Returns the (non-dense) community per node and whether any move
    /// happened at all.
    fn local_moving(&self, resolution: f64, max_passes: usize) -> (Vec<usize>, bool) {
        let m = self.total;
        if m == 0.0 {
            return ((0..self.n).collect(), false);
        }

        let mut community: Vec<usize> = (0..self.n).collect();
        let mut community_strength = self.strength.clone();
        let mut moved_any = false;

        for _pass in 0..max_passes {
            let mut moved = false;

            for node in 0..self.n {
                let home = community[node];
                let ki = self.strength[node];
                community_strength[home] -= ki;

                // Weight from `node` into each neighboring community.
                // Ordered map: ties go to the lowest community id.
                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for &(neighbor, w) in &self.adj[node] {
                    *links.entry(community[neighbor]).or_insert(0.0) += w;
                }

                let mut best = home;
                let mut best_gain = 0.0;
                for (&target, &ki_in) in &links {
                    let gain =
                        ki_in / m - resolution * community_strength[target] * ki / (2.0 * m * m);
                    if gain > best_gain {
                        best_gain = gain;
                        best = target;
                    }
                }

                community[node] = best;
                community_strength[best] += ki;
                if best != home {
                    moved = true;
                    moved_any = true;
                }
            }

            if !moved {
                break;
            }
        }

        (community, moved_any)
    }

    /// Phase 2: contract communities into single nodes. Returns the
    /// coarser level and the dense community id assigned to each node.
    fn aggregate(&self, community: &[usize]) -> (Level, Vec<usize>) {
        let mut dense: BTreeMap<usize, usize> = BTreeMap::new();
        for &c in community {
            let next = dense.len();
            dense.entry(c).or_insert(next);
        }
        let renumbered: Vec<usize> = community.iter().map(|c| dense[c]).collect();
        let coarse_n = dense.len();

        let mut coarse_edges: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for node in 0..self.n {
            let cu = renumbered[node];
            if self.self_w[node] > 0.0 {
                *coarse_edges.entry((cu, cu)).or_insert(0.0) += self.self_w[node];
            }
            for &(neighbor, w) in &self.adj[node] {
                if neighbor < node {
                    continue; // each undirected edge once
                }
                let cv = renumbered[neighbor];
                let key = if cu <= cv { (cu, cv) } else { (cv, cu) };
                *coarse_edges.entry(key).or_insert(0.0) += w;
            }
        }

        let edges: Vec<(usize, usize, f64)> = coarse_edges
            .into_iter()
            .map(|((u, v), w)| (u, v, w))
            .collect();
        (Level::from_edges(coarse_n, &edges), renumbered)
    }
}

impl CommunityBackend for Louvain {
    fn name(&self) -> &'static str {
        "louvain"
    }

    fn detect(&self, graph: &EdgeGraph, _options: &BackendOptions) -> Result<Detection> {
        let n = graph.node_count();
        let edges = graph.edges();

        // node → node of the current level; starts as the identity.
        let mut assignment: Vec<usize> = (0..n).collect();
        let mut level = Level::from_edges(n, &edges);
        let mut best_q = f64::NEG_INFINITY;

        for _ in 0..self.max_levels {
            let (community, improved) = level.local_moving(self.resolution, self.max_passes);
            if !improved {
                break;
            }

            let (coarse, renumbered) = level.aggregate(&community);
            for slot in assignment.iter_mut() {
                *slot = renumbered[*slot];
            }

            let q = modularity(n, &edges, &assignment);
            if q - best_q < self.min_gain {
                break;
            }
            best_q = q;

            if coarse.n == level.n {
                break;
            }
            level = coarse;
        }

        let quality = modularity(n, &edges, &assignment);
        Ok(Detection {
            membership: assignment,
            quality: Some(Quality::Modularity(quality)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testutil::{same_partition, two_cliques};

    #[test]
    fn triangle_is_one_community() {
        let mut graph = EdgeGraph::new();
        graph.add_edge("0", "1", 1.0);
        graph.add_edge("1", "2", 1.0);
        graph.add_edge("0", "2", 1.0);
        let detection = Louvain::new()
            .detect(&graph, &BackendOptions::default())
            .unwrap();
        let m = &detection.membership;
        assert_eq!(m[0], m[1]);
        assert_eq!(m[1], m[2]);
    }

    #[test]
    fn splits_two_cliques() {
        let graph = two_cliques();
        let detection = Louvain::new()
            .detect(&graph, &BackendOptions::default())
            .unwrap();
        let m = &detection.membership;
        assert_eq!(m[0], m[1]);
        assert_eq!(m[1], m[2]);
        assert_eq!(m[3], m[4]);
        assert_eq!(m[4], m[5]);
        assert_ne!(m[0], m[3]);
        match detection.quality {
            Some(Quality::Modularity(q)) => assert!(q > 0.3),
            other => panic!("expected modularity, got {other:?}"),
        }
    }

    #[test]
    fn isolated_nodes_stay_apart() {
        let mut graph = EdgeGraph::new();
        graph.add_edge("a", "b", 1.0);
        graph.add_edge("c", "d", 1.0);
        let detection = Louvain::new()
            .detect(&graph, &BackendOptions::default())
            .unwrap();
        let m = &detection.membership;
        assert_eq!(m[0], m[1]);
        assert_eq!(m[2], m[3]);
        assert_ne!(m[0], m[2]);
    }

    #[test]
    fn rerun_reproduces_partition() {
        let graph = two_cliques();
        let options = BackendOptions::default();
        let first = Louvain::new().detect(&graph, &options).unwrap();
        let second = Louvain::new().detect(&graph, &options).unwrap();
        assert!(same_partition(&first.membership, &second.membership));
    }

    #[test]
    fn honors_self_loops() {
        let mut graph = two_cliques();
        graph.add_edge("a0", "a0", 4.0);
        let detection = Louvain::new()
            .detect(&graph, &BackendOptions::default())
            .unwrap();
        assert_eq!(detection.membership.len(), 6);
    }
}
