//! Per-agent hazard memory.

use evac_core::EdgeId;
use evac_network::{BeliefView, EdgeObservation, Observation};

#[cfg(not(feature = "fx-hash"))]
type EdgeMap = std::collections::HashMap<EdgeId, EdgeObservation>;
#[cfg(feature = "fx-hash")]
type EdgeMap = rustc_hash::FxHashMap<EdgeId, EdgeObservation>;

/// Last observed state of every edge an agent has seen.
///
/// Last write wins: a later noisy observation overwrites an earlier correct
/// one.  Edges never observed have no entry and count as open.
#[derive(Clone, Debug, Default)]
pub struct Belief {
    edges: EdgeMap,
}

impl Belief {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite every entry present in `obs`.
    pub fn merge(&mut self, obs: Observation) {
        self.edges.extend(obs);
    }

    /// Record a single edge, e.g. to seed prior knowledge in a scenario.
    pub fn insert(&mut self, edge: EdgeId, obs: EdgeObservation) {
        self.edges.insert(edge, obs);
    }

    pub fn get(&self, edge: EdgeId) -> Option<&EdgeObservation> {
        self.edges.get(&edge)
    }

    /// `true` if the agent currently believes `edge` is blocked.
    #[inline]
    pub fn believes_blocked(&self, edge: EdgeId) -> bool {
        self.edges.get(&edge).is_some_and(|o| o.blocked)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl BeliefView for Belief {
    fn lookup(&self, edge: EdgeId) -> Option<&EdgeObservation> {
        self.edges.get(&edge)
    }
}
