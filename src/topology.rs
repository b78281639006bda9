// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - Neighbour Graph

//! Undirected random graph over the fleet.
//!
//! Each joining node links to every existing node with a fixed probability,
//! which grows the same distribution as a G(n, p) random graph. Rogue
//! contagion travels along these edges; the renderer draws them.

use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

use crate::types::NodeId;

#[derive(Debug, Clone, Default)]
pub struct Topology {
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `id`, linking it to each existing node with `edge_probability`.
    /// Existing nodes are visited in sorted order so the result only depends
    /// on the rng state.
    pub fn attach<R: Rng + ?Sized>(&mut self, id: &NodeId, edge_probability: f64, rng: &mut R) {
        let existing: Vec<NodeId> = self.adjacency.keys().cloned().collect();
        self.adjacency.entry(id.clone()).or_default();
        if edge_probability <= 0.0 {
            return;
        }
        for other in existing {
            if rng.gen::<f64>() < edge_probability {
                self.link(id, &other);
            }
        }
    }

    pub fn link(&mut self, a: &NodeId, b: &NodeId) {
        if a == b {
            return;
        }
        self.adjacency.entry(a.clone()).or_default().insert(b.clone());
        self.adjacency.entry(b.clone()).or_default().insert(a.clone());
    }

    /// Remove `id` and every edge touching it.
    pub fn detach(&mut self, id: &NodeId) {
        if let Some(neighbours) = self.adjacency.remove(id) {
            for n in neighbours {
                if let Some(set) = self.adjacency.get_mut(&n) {
                    set.remove(id);
                }
            }
        }
    }

    pub fn neighbours(&self, id: &NodeId) -> Vec<NodeId> {
        self.adjacency
            .get(id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Each edge once, as a sorted pair, in sorted order.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut out = Vec::new();
        for (a, set) in &self.adjacency {
            for b in set.range(a.clone()..) {
                if b != a {
                    out.push((a.clone(), b.clone()));
                }
            }
        }
        out
    }

    pub fn degree(&self, id: &NodeId) -> usize {
        self.adjacency.get(id).map_or(0, |s| s.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    #[test]
    fn test_full_probability_builds_complete_graph() {
        let mut topo = Topology::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for name in ["a", "b", "c", "d"] {
            topo.attach(&id(name), 1.0, &mut rng);
        }
        assert_eq!(topo.edges().len(), 6);
        assert_eq!(topo.degree(&id("a")), 3);
    }

    #[test]
    fn test_zero_probability_builds_no_edges() {
        let mut topo = Topology::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for name in ["a", "b", "c"] {
            topo.attach(&id(name), 0.0, &mut rng);
        }
        assert!(topo.edges().is_empty());
        assert!(topo.neighbours(&id("a")).is_empty());
    }

    #[test]
    fn test_detach_removes_incident_edges() {
        let mut topo = Topology::new();
        topo.link(&id("a"), &id("b"));
        topo.link(&id("b"), &id("c"));
        topo.link(&id("a"), &id("c"));
        topo.detach(&id("b"));
        assert_eq!(topo.edges(), vec![(id("a"), id("c"))]);
        assert!(topo.neighbours(&id("b")).is_empty());
    }

    #[test]
    fn test_same_seed_same_graph() {
        let build = || {
            let mut topo = Topology::new();
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            for i in 0..12 {
                topo.attach(&NodeId(format!("node-{i}")), 0.3, &mut rng);
            }
            topo.edges()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_self_link_ignored() {
        let mut topo = Topology::new();
        topo.link(&id("a"), &id("a"));
        assert!(topo.edges().is_empty());
    }
}
