//! Per-agent movement state.

use evac_core::{EdgeId, NodeId};

/// Where an agent is on the network.
///
/// An agent is either **at a node** (`edge = None`) or **in transit** along
/// `edge`, `progress` metres from `node`, its departure node.  The node
/// only changes when an edge is completed; a visualisation can interpolate
/// the position in between with
/// [`NetworkModel::interpolate`](evac_network::NetworkModel::interpolate).
///
/// `progress` carries over between edges: when an edge completes, the
/// remainder beyond its length becomes the starting progress on the next
/// edge.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementState {
    pub node:     NodeId,
    pub edge:     Option<EdgeId>,
    pub progress: f64,
}

impl MovementState {
    /// Standing at `node` with no progress.
    #[inline]
    pub fn at(node: NodeId) -> Self {
        Self { node, edge: None, progress: 0.0 }
    }

    #[inline]
    pub fn in_transit(&self) -> bool {
        self.edge.is_some()
    }

    /// Start or continue traversing `edge`.
    ///
    /// Switching away from a different in-transit edge abandons it and
    /// resets progress; starting from a node keeps the carried overflow.
    pub fn enter(&mut self, edge: EdgeId) {
        match self.edge {
            Some(current) if current != edge => self.progress = 0.0,
            _ => {}
        }
        self.edge = Some(edge);
    }

    /// Add `distance` along the current edge of length `length`.
    ///
    /// Returns `true` once the edge is complete; the caller then calls
    /// [`arrive`](Self::arrive).
    pub fn advance(&mut self, distance: f64, length: f64) -> bool {
        self.progress += distance;
        self.progress >= length
    }

    /// Snap to `node` after completing an edge of length `length`, keeping
    /// the overflow for the next edge.
    pub fn arrive(&mut self, node: NodeId, length: f64) {
        self.node = node;
        self.edge = None;
        self.progress = (self.progress - length).max(0.0);
    }
}
