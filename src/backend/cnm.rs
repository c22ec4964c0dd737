//! Weighted Clauset-Newman-Moore agglomeration.

use crate::backend::fast_greedy::agglomerate;
use crate::backend::{modularity, BackendOptions, CommunityBackend, Detection, Quality};
use crate::error::Result;
use crate::graph::EdgeGraph;

/// Runs the agglomerative core over the actual edge weights and reports
/// the modularity of the final partition.
#[derive(Debug, Default)]
pub struct Cnm;

impl Cnm {
    pub fn new() -> Self {
        Cnm
    }
}

impl CommunityBackend for Cnm {
    fn name(&self) -> &'static str {
        "cnm"
    }

    fn detect(&self, graph: &EdgeGraph, _options: &BackendOptions) -> Result<Detection> {
        let edges = graph.edges();
        let membership = agglomerate(graph.node_count(), &edges);
        let quality = modularity(graph.node_count(), &edges, &membership);
        Ok(Detection {
            membership,
            quality: Some(Quality::Modularity(quality)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testutil::two_cliques;

    #[test]
    fn splits_two_cliques_and_reports_modularity() {
        let graph = two_cliques();
        let detection = Cnm::new().detect(&graph, &BackendOptions::default()).unwrap();
        let m = &detection.membership;
        assert_eq!(m[0], m[1]);
        assert_eq!(m[3], m[5]);
        assert_ne!(m[0], m[3]);
        match detection.quality {
            Some(Quality::Modularity(q)) => assert!(q > 0.3, "q = {q}"),
            other => panic!("expected modularity, got {other:?}"),
        }
    }

    #[test]
    fn heavy_weights_bind_communities() {
        // Two light triangles with a heavy pair: the heavy pair must
        // end up together.
        let mut graph = EdgeGraph::new();
        graph.add_edge("x", "y", 100.0);
        graph.add_edge("x", "p", 1.0);
        graph.add_edge("y", "q", 1.0);
        let detection = Cnm::new().detect(&graph, &BackendOptions::default()).unwrap();
        let x = detection.membership[0];
        let y = detection.membership[1];
        assert_eq!(x, y);
    }
}
