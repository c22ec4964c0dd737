//! The canonical node→community assignment produced by a detection run.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::graph::EdgeGraph;

/// Node→community assignment, kept in graph node-index order so that
/// traversal (and therefore the grouped artifact) is deterministic.
/// Community identifiers are dense `0..k-1`, assigned in first-encounter
/// order; they carry no meaning beyond one run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommunityMapping {
    entries: Vec<(String, usize)>,
}

impl CommunityMapping {
    /// Build from a raw per-node membership vector (indexed like the
    /// graph's nodes), renumbering communities densely in the order they
    /// are first seen. Purely cosmetic renumbering — backend labels are
    /// not comparable across runs anyway.
    pub fn from_membership(graph: &EdgeGraph, membership: &[usize]) -> Self {
        let mut dense: HashMap<usize, usize> = HashMap::new();
        let mut entries = Vec::with_capacity(membership.len());
        for (idx, &raw) in membership.iter().enumerate() {
            let next = dense.len();
            let community = *dense.entry(raw).or_insert(next);
            entries.push((graph.label(idx).to_string(), community));
        }
        CommunityMapping { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in traversal (node-index) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(label, c)| (label.as_str(), *c))
    }

    pub fn get(&self, node: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(label, _)| label == node)
            .map(|&(_, c)| c)
    }

    pub fn community_count(&self) -> usize {
        let mut seen: Vec<usize> = self.entries.iter().map(|&(_, c)| c).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    /// Members per community, keyed ascending. Member order within a
    /// community is first-occurrence order of the traversal, not sorted.
    pub fn grouped(&self) -> BTreeMap<usize, Vec<&str>> {
        let mut groups: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for (label, community) in self.iter() {
            groups.entry(community).or_default().push(label);
        }
        groups
    }
}
