//! Two-level map-equation minimization (the Infomap objective).
//!
//! The map equation scores a partition by the expected description
//! length, in bits, of a random walk on the graph: an index codebook
//! over module entries plus one codebook per module. Minimizing it
//! favors modules a walker stays inside for a long time.
//!
//! Optimization is greedy local moving from singleton modules, visiting
//! nodes in a shuffled order. Several independent trials run with
//! distinct fixed seeds (in parallel); the lowest codelength wins, ties
//! going to the lowest trial index so a rerun reproduces its partition.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::backend::{BackendOptions, CommunityBackend, Detection, Quality};
use crate::error::Result;
use crate::graph::EdgeGraph;

const MAX_PASSES: usize = 100;
const MIN_IMPROVEMENT: f64 = 1e-10;
const SEED_BASE: u64 = 0x6d61_7065; // arbitrary fixed base, one seed per trial

#[derive(Debug, Default)]
pub struct Infomap;

impl Infomap {
    pub fn new() -> Self {
        Infomap
    }
}

impl CommunityBackend for Infomap {
    fn name(&self) -> &'static str {
        "infomap"
    }

    fn detect(&self, graph: &EdgeGraph, options: &BackendOptions) -> Result<Detection> {
        let trials = options.trials.max(1);
        log::info!("number of trials: {trials}");
        if let Some(raw) = &options.raw {
            log::debug!("pass-through backend options: {raw}");
        }

        let flow = Flow::from_graph(graph);

        let mut results: Vec<(u32, f64, Vec<usize>)> = (0..trials)
            .into_par_iter()
            .map(|trial| {
                let mut order: Vec<usize> = (0..flow.n).collect();
                let mut rng = StdRng::seed_from_u64(SEED_BASE.wrapping_add(trial as u64));
                order.shuffle(&mut rng);
                let (membership, codelength) = flow.optimize(&order);
                (trial, codelength, membership)
            })
            .collect();
        results.sort_by_key(|&(trial, _, _)| trial);

        let mut best: Option<(f64, Vec<usize>)> = None;
        for (_, codelength, membership) in results {
            if best.as_ref().is_none_or(|&(l, _)| codelength < l) {
                best = Some((codelength, membership));
            }
        }
        // trials >= 1, so best is always populated
        let (codelength, membership) = best.unwrap_or((0.0, (0..flow.n).collect()));

        Ok(Detection {
            membership,
            quality: Some(Quality::Codelength(codelength)),
        })
    }
}

fn plogp(x: f64) -> f64 {
    if x > 0.0 {
        x * x.log2()
    } else {
        0.0
    }
}

/// Stationary flow quantities of the graph, shared by all trials.
struct Flow {
    n: usize,
    /// External links only; self-loops never cross a module boundary.
    adj: Vec<Vec<(usize, f64)>>,
    /// Node visit rates, summing to 1.
    p: Vec<f64>,
    /// External strength per node, in normalized units.
    k_ext: Vec<f64>,
    /// Σ plogp(p_i); constant across partitions.
    plogp_p: f64,
}

impl Flow {
    fn from_graph(graph: &EdgeGraph) -> Self {
        let n = graph.node_count();
        let mut adj = vec![Vec::new(); n];
        let mut strength = vec![0.0; n];
        let mut total = 0.0;
        for (u, v, w) in graph.edges() {
            total += w;
            if u == v {
                strength[u] += 2.0 * w;
            } else {
                adj[u].push((v, w));
                adj[v].push((u, w));
                strength[u] += w;
                strength[v] += w;
            }
        }

        let two_m = 2.0 * total;
        let (p, k_ext): (Vec<f64>, Vec<f64>) = if two_m == 0.0 {
            (vec![0.0; n], vec![0.0; n])
        } else {
            let p = strength.iter().map(|s| s / two_m).collect();
            let k_ext = (0..n)
                .map(|i| adj[i].iter().map(|&(_, w)| w).sum::<f64>() / two_m)
                .collect();
            // Normalize link weights once so the move math stays in
            // probability units.
            for links in adj.iter_mut() {
                for (_, w) in links.iter_mut() {
                    *w /= two_m;
                }
            }
            (p, k_ext)
        };

        let plogp_p = p.iter().map(|&x| plogp(x)).sum();
        Flow {
            n,
            adj,
            p,
            k_ext,
            plogp_p,
        }
    }

    /// Greedy local moving over the given visit order. Returns the raw
    /// module per node and the final codelength.
    fn optimize(&self, order: &[usize]) -> (Vec<usize>, f64) {
        let mut state = State::singletons(self);
        if self.p.iter().sum::<f64>() == 0.0 {
            return (state.module_of, 0.0);
        }

        for _pass in 0..MAX_PASSES {
            let mut improved = false;

            for &node in order {
                let from = state.module_of[node];

                // Link weight from `node` into each neighboring module,
                // ordered so ties break on the lowest module id.
                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for &(neighbor, w) in &self.adj[node] {
                    *links.entry(state.module_of[neighbor]).or_insert(0.0) += w;
                }
                let to_home = links.get(&from).copied().unwrap_or(0.0);

                let current = state.codelength();
                let mut best: Option<(f64, usize, f64)> = None;
                for (&target, &to_target) in &links {
                    if target == from {
                        continue;
                    }
                    let candidate = state.moved_codelength(self, node, from, target, to_home, to_target);
                    if best.is_none_or(|(l, _, _)| candidate < l) {
                        best = Some((candidate, target, to_target));
                    }
                }

                if let Some((candidate, target, to_target)) = best {
                    if candidate + MIN_IMPROVEMENT < current {
                        state.apply_move(self, node, from, target, to_home, to_target);
                        improved = true;
                    }
                }
            }

            if !improved {
                break;
            }
        }

        let codelength = state.codelength();
        (state.module_of, codelength)
    }
}

/// Per-trial partition state with the running sums the map equation
/// needs: module exit rates q and module visit rates pm.
struct State {
    module_of: Vec<usize>,
    q: Vec<f64>,
    pm: Vec<f64>,
    sum_q: f64,
    sum_plogp_q: f64,
    sum_plogp_qp: f64,
    plogp_p: f64,
}

impl State {
    fn singletons(flow: &Flow) -> State {
        let q = flow.k_ext.clone();
        let pm = flow.p.clone();
        let sum_q = q.iter().sum();
        let sum_plogp_q = q.iter().map(|&x| plogp(x)).sum();
        let sum_plogp_qp = q
            .iter()
            .zip(&pm)
            .map(|(&qi, &pi)| plogp(qi + pi))
            .sum();
        State {
            module_of: (0..flow.n).collect(),
            q,
            pm,
            sum_q,
            sum_plogp_q,
            sum_plogp_qp,
            plogp_p: flow.plogp_p,
        }
    }

    fn codelength(&self) -> f64 {
        plogp(self.sum_q) - 2.0 * self.sum_plogp_q - self.plogp_p + self.sum_plogp_qp
    }

    /// Exit/visit rates of `from` and `to` after moving `node`, without
    /// committing anything.
    fn shifted(
        &self,
        flow: &Flow,
        node: usize,
        from: usize,
        to: usize,
        to_home: f64,
        to_target: f64,
    ) -> (f64, f64, f64, f64) {
        let k = flow.k_ext[node];
        let q_from = self.q[from] - (k - 2.0 * to_home);
        let q_to = self.q[to] + (k - 2.0 * to_target);
        let pm_from = self.pm[from] - flow.p[node];
        let pm_to = self.pm[to] + flow.p[node];
        (q_from, q_to, pm_from, pm_to)
    }

    fn moved_codelength(
        &self,
        flow: &Flow,
        node: usize,
        from: usize,
        to: usize,
        to_home: f64,
        to_target: f64,
    ) -> f64 {
        let (q_from, q_to, pm_from, pm_to) = self.shifted(flow, node, from, to, to_home, to_target);

        let sum_q = self.sum_q - self.q[from] - self.q[to] + q_from + q_to;
        let sum_plogp_q = self.sum_plogp_q - plogp(self.q[from]) - plogp(self.q[to])
            + plogp(q_from)
            + plogp(q_to);
        let sum_plogp_qp = self.sum_plogp_qp
            - plogp(self.q[from] + self.pm[from])
            - plogp(self.q[to] + self.pm[to])
            + plogp(q_from + pm_from)
            + plogp(q_to + pm_to);

        plogp(sum_q) - 2.0 * sum_plogp_q - self.plogp_p + sum_plogp_qp
    }

    fn apply_move(
        &mut self,
        flow: &Flow,
        node: usize,
        from: usize,
        to: usize,
        to_home: f64,
        to_target: f64,
    ) {
        let (q_from, q_to, pm_from, pm_to) = self.shifted(flow, node, from, to, to_home, to_target);

        self.sum_q += q_from + q_to - self.q[from] - self.q[to];
        self.sum_plogp_q +=
            plogp(q_from) + plogp(q_to) - plogp(self.q[from]) - plogp(self.q[to]);
        self.sum_plogp_qp += plogp(q_from + pm_from) + plogp(q_to + pm_to)
            - plogp(self.q[from] + self.pm[from])
            - plogp(self.q[to] + self.pm[to]);

        self.q[from] = q_from;
        self.q[to] = q_to;
        self.pm[from] = pm_from;
        self.pm[to] = pm_to;
        self.module_of[node] = to;
    }
}
