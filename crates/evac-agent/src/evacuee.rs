//! The observe / plan / move state machine shared by pedestrians and
//! vehicles.
//!
//! # Per-tick procedure
//!
//! 1. Terminal agents (reached, or not alive) do nothing.
//! 2. Count the step and merge a fresh observation into the belief.
//! 3. At the goal: mark reached and stop.
//! 4. Without a usable cached path, plan one around every edge believed
//!    blocked.  No route means an empty path.
//! 5. A path with fewer than two remaining nodes costs the stuck penalty.
//! 6. If the next edge is believed blocked, drop the path (replan next
//!    tick) and pay the stuck penalty.
//! 7. Otherwise accrue the edge's snow depth as exposure and advance by
//!    the mode speed.  Completing the edge snaps to the next node and
//!    carries the overflow.
//!
//! Replanning is lazy: only a missing/invalid path or a newly discovered
//! block on the very next edge triggers it.

use evac_core::{AgentId, AgentRng, AgentRole, EdgeId, NodeId, Point2, TravelMode};
use evac_network::{NetworkModel, Router};

use crate::{Belief, MovementState};

/// Exposure added on every tick an agent cannot move.
pub const STUCK_PENALTY: f64 = 1.0;

/// Outcome of one tick, for logging and tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Terminal agent, nothing happened.
    Idle,
    /// Reached the goal this tick.
    Arrived,
    /// No usable path; stuck penalty applied.
    NoPath,
    /// Next edge believed blocked; path dropped, stuck penalty applied.
    Blocked,
    /// Moved along an edge (possibly completing it).
    Moved,
}

/// State and behaviour common to pedestrian and vehicle agents.
#[derive(Clone, Debug)]
pub struct AgentCore {
    pub id:       AgentId,
    pub mode:     TravelMode,
    pub role:     AgentRole,
    /// Metres advanced per tick.
    pub speed:    f64,
    pub goal:     NodeId,
    /// Carried for future hazard-lethality rules; never cleared here.
    pub alive:    bool,
    /// Monotonic: once `true`, stays `true`.
    pub reached:  bool,
    pub exposure: f64,
    pub steps:    u64,
    pub movement: MovementState,
    pub belief:   Belief,
    path:         Vec<NodeId>,
    /// Index of `movement.node` within `path`.
    cursor:       usize,
    rng:          AgentRng,
}

impl AgentCore {
    pub fn new(
        id:    AgentId,
        mode:  TravelMode,
        role:  AgentRole,
        speed: f64,
        start: NodeId,
        goal:  NodeId,
        seed:  u64,
    ) -> Self {
        Self {
            id,
            mode,
            role,
            speed,
            goal,
            alive:    true,
            reached:  false,
            exposure: 0.0,
            steps:    0,
            movement: MovementState::at(start),
            belief:   Belief::new(),
            path:     Vec::new(),
            cursor:   0,
            rng:      AgentRng::new(seed, id),
        }
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.movement.node
    }

    /// Remaining cached path, starting at the current node.  Empty when no
    /// path is cached.
    pub fn remaining_path(&self) -> &[NodeId] {
        self.path.get(self.cursor..).unwrap_or(&[])
    }

    pub fn is_terminal(&self) -> bool {
        self.reached || !self.alive
    }

    /// Advance one tick.  See the module docs for the procedure.
    pub fn step(&mut self, net: &NetworkModel, router: &dyn Router) -> StepOutcome {
        if self.is_terminal() {
            return StepOutcome::Idle;
        }
        self.steps += 1;

        let obs = net.observe(self.node(), self.mode, &mut self.rng);
        self.belief.merge(obs);

        if self.node() == self.goal {
            self.reached = true;
            return StepOutcome::Arrived;
        }

        if !self.sync_cursor() {
            self.plan(net, router);
        }
        let Some(&next) = self.remaining_path().get(1) else {
            self.stuck("no path");
            return StepOutcome::NoPath;
        };

        let node = self.node();
        if net.is_blocked(node, next, self.mode, &self.belief) {
            self.clear_path();
            self.stuck("next edge believed blocked");
            return StepOutcome::Blocked;
        }
        let Some(edge) = net.edge(self.mode, node, next) else {
            // Only reachable if the path was planned on another graph.
            self.clear_path();
            self.stuck("path edge missing");
            return StepOutcome::NoPath;
        };

        self.exposure += net.hazards(self.mode).snow_depth(edge);
        self.movement.enter(edge);

        let length = net.graph(self.mode).length(edge);
        if self.movement.advance(self.speed, length) {
            self.movement.arrive(next, length);
            self.cursor += 1;
            if next == self.goal {
                self.reached = true;
                return StepOutcome::Arrived;
            }
        }
        StepOutcome::Moved
    }

    /// Recompute the path from the current node to the goal, skipping every
    /// edge the agent believes is blocked.  Leaves an empty path when the
    /// goal is unreachable.
    pub fn plan(&mut self, net: &NetworkModel, router: &dyn Router) {
        let belief = &self.belief;
        let exclude = |e: EdgeId| belief.believes_blocked(e);
        self.cursor = 0;
        self.path = match net.least_cost_route(router, self.mode, self.node(), self.goal, &exclude) {
            Ok(route) => route.nodes,
            Err(e) => {
                tracing::debug!(agent = %self.id, "replan failed: {e}");
                Vec::new()
            }
        };
    }

    /// Interpolated planar position.
    pub fn position(&self, net: &NetworkModel) -> Point2 {
        net.interpolate(self.mode, self.movement.node, self.movement.edge, self.movement.progress)
    }

    /// Point the cursor at the current node.  `false` if the node is not on
    /// the cached path (or there is none).
    fn sync_cursor(&mut self) -> bool {
        let node = self.node();
        if self.path.get(self.cursor) == Some(&node) {
            return true;
        }
        match self.path.iter().position(|&n| n == node) {
            Some(i) => {
                self.cursor = i;
                true
            }
            None => false,
        }
    }

    fn clear_path(&mut self) {
        self.path.clear();
        self.cursor = 0;
    }

    fn stuck(&mut self, reason: &str) {
        self.exposure += STUCK_PENALTY;
        tracing::debug!(agent = %self.id, node = %self.node(), "stuck: {reason}");
    }
}
