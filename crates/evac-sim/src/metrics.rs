//! Per-tick aggregates and per-agent snapshots handed to observers.

use evac_core::{AgentId, AgentKind, AgentRole};

/// Population state after one tick, over pedestrians and vehicles
/// (shuttles are not evacuees).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickMetrics {
    /// Zero-based index of the tick just completed.
    pub step:             u64,
    pub alive_count:      usize,
    pub reached_count:    usize,
    /// Mean exposure; the divisor is at least 1.
    pub average_exposure: f64,
}

/// One agent's interpolated position.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentPosition {
    pub agent:    AgentId,
    pub kind:     AgentKind,
    pub role:     AgentRole,
    pub x:        f64,
    pub y:        f64,
    pub reached:  bool,
    pub exposure: f64,
}
