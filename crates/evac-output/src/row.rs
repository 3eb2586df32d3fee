//! Plain data row types written by output backends.

use evac_sim::{AgentPosition, TickMetrics};

/// Population aggregates for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsRow {
    pub step:         u64,
    pub alive:        u64,
    pub reached:      u64,
    pub avg_exposure: f64,
}

impl From<&TickMetrics> for MetricsRow {
    fn from(m: &TickMetrics) -> Self {
        Self {
            step:         m.step,
            alive:        m.alive_count as u64,
            reached:      m.reached_count as u64,
            avg_exposure: m.average_exposure,
        }
    }
}

/// One agent's interpolated position at a snapshot tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRow {
    pub tick:     u64,
    pub agent_id: u32,
    /// `pedestrian`, `vehicle` or `shuttle`.
    pub kind:     &'static str,
    /// `staff` or `faculty`.
    pub role:     &'static str,
    pub x:        f64,
    pub y:        f64,
    pub reached:  bool,
    pub exposure: f64,
}

impl PositionRow {
    pub fn new(tick: u64, p: &AgentPosition) -> Self {
        Self {
            tick,
            agent_id: p.agent.0,
            kind:     p.kind.as_str(),
            role:     p.role.as_str(),
            x:        p.x,
            y:        p.y,
            reached:  p.reached,
            exposure: p.exposure,
        }
    }
}
