//! Ground-truth hazard state and the observation record agents store.

use evac_core::{EdgeId, HazardConfig, SimRng};

/// What an agent records about one edge when it observes it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeObservation {
    /// Observed blocked flag; may be inverted by observation noise.
    pub blocked:    bool,
    pub snow_depth: f64,
    pub slope:      f64,
}

/// One `observe()` result: every edge in range with its observed state,
/// ordered by `EdgeId`.
pub type Observation = Vec<(EdgeId, EdgeObservation)>;

/// Read access to an agent's belief, as needed by blocking queries.
///
/// Implemented by the agent crate's belief store; the network model never
/// owns or mutates beliefs.
pub trait BeliefView {
    fn lookup(&self, edge: EdgeId) -> Option<&EdgeObservation>;
}

// ── HazardOverlay ─────────────────────────────────────────────────────────────

/// Fixed ground-truth hazards for every edge of one mode graph, indexed by
/// `EdgeId`.
#[derive(Clone, Debug, Default)]
pub struct HazardOverlay {
    blocked:    Vec<bool>,
    snow_depth: Vec<f64>,
}

impl HazardOverlay {
    /// No blocked edges and zero snow everywhere.
    pub fn clear(edge_count: usize) -> Self {
        Self { blocked: vec![false; edge_count], snow_depth: vec![0.0; edge_count] }
    }

    /// Draw an independent blocked flag (Bernoulli) and snow depth (uniform)
    /// for every edge, in edge order.
    pub fn generate(edge_count: usize, cfg: &HazardConfig, rng: &mut SimRng) -> Self {
        let mut overlay = Self::clear(edge_count);
        for i in 0..edge_count {
            overlay.blocked[i] = rng.gen_bool(cfg.block_probability);
            overlay.snow_depth[i] = rng.uniform(cfg.snow_min, cfg.snow_max);
        }
        overlay
    }

    pub fn edge_count(&self) -> usize {
        self.blocked.len()
    }

    #[inline]
    pub fn is_blocked(&self, edge: EdgeId) -> bool {
        self.blocked[edge.index()]
    }

    #[inline]
    pub fn snow_depth(&self, edge: EdgeId) -> f64 {
        self.snow_depth[edge.index()]
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|&&b| b).count()
    }

    /// Setup-time override; see `NetworkModel::set_ground_truth`.
    pub(crate) fn set(&mut self, edge: EdgeId, blocked: bool, snow_depth: f64) {
        self.blocked[edge.index()] = blocked;
        self.snow_depth[edge.index()] = snow_depth;
    }
}
