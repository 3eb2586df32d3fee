//! Shelter selection.

use evac_core::{NodeId, SimRng};

/// Sample `min(count, nodes.len())` distinct shelter nodes uniformly without
/// replacement.  Returned in ascending id order; empty input gives an empty
/// set.
pub fn select_shelters(nodes: &[NodeId], count: usize, rng: &mut SimRng) -> Vec<NodeId> {
    let mut shelters = rng.sample(nodes, count);
    shelters.sort_unstable();
    shelters
}
