//! Fixed-route shuttles.

use evac_core::{AgentId, AgentKind, AgentRole, EvacConfig, NodeId, Point2, TravelMode};
use evac_network::{NetworkModel, Router};

use crate::{Agent, MovementState};

/// A shuttle looping over a precomputed drive-graph route.
///
/// Shuttles ignore hazards and beliefs entirely: each tick they head for
/// the route node under the cursor.  Route nodes that are the current node,
/// or that are not adjacent to it in the drive graph, are skipped (at most
/// one full pass per tick).  Arriving at a stop node starts a dwell of
/// `dwell_ticks` ticks; the cursor moves past the stop once the dwell ends.
#[derive(Clone, Debug)]
pub struct ShuttleAgent {
    pub id:          AgentId,
    pub speed:       f64,
    pub dwell_ticks: u32,
    pub movement:    MovementState,
    route:           Vec<NodeId>,
    /// Sorted, deduplicated stop nodes.
    stops:           Vec<NodeId>,
    cursor:          usize,
    dwell:           u32,
    /// Total ticks spent dwelling so far.
    dwelt:           u64,
}

impl ShuttleAgent {
    /// A shuttle starting at `route[0]` (or parked at `NodeId::INVALID` for
    /// an empty route, which keeps it idle forever).
    pub fn new(id: AgentId, route: Vec<NodeId>, stops: Vec<NodeId>, config: &EvacConfig) -> Self {
        Self::with_params(id, route, stops, config.shuttle_speed, config.shuttle_dwell_ticks)
    }

    pub fn with_params(
        id:          AgentId,
        route:       Vec<NodeId>,
        mut stops:   Vec<NodeId>,
        speed:       f64,
        dwell_ticks: u32,
    ) -> Self {
        stops.sort_unstable();
        stops.dedup();
        let start = route.first().copied().unwrap_or(NodeId::INVALID);
        Self {
            id,
            speed,
            dwell_ticks,
            movement: MovementState::at(start),
            route,
            stops,
            cursor: 0,
            dwell: 0,
            dwelt: 0,
        }
    }

    pub fn route(&self) -> &[NodeId] {
        &self.route
    }

    pub fn stops(&self) -> &[NodeId] {
        &self.stops
    }

    /// Index of the route node currently being approached.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn dwell_remaining(&self) -> u32 {
        self.dwell
    }

    pub fn total_dwell_ticks(&self) -> u64 {
        self.dwelt
    }

    pub fn is_stop(&self, node: NodeId) -> bool {
        self.stops.binary_search(&node).is_ok()
    }

    /// Advance one tick.
    pub fn advance(&mut self, net: &NetworkModel) {
        if self.dwell > 0 {
            self.dwell -= 1;
            self.dwelt += 1;
            return;
        }
        if self.route.is_empty() {
            return;
        }

        let graph = net.graph(TravelMode::Drive);
        let len = self.route.len();
        let node = self.movement.node;

        // Skip route nodes we are already at or cannot reach directly.
        let mut target = None;
        for _ in 0..len {
            let candidate = self.route[self.cursor];
            if candidate != node {
                if let Some(edge) = graph.find_edge(node, candidate) {
                    target = Some((candidate, edge));
                    break;
                }
            }
            self.cursor = (self.cursor + 1) % len;
        }
        let Some((next, edge)) = target else {
            return;
        };

        self.movement.enter(edge);
        let length = graph.length(edge);
        if self.movement.advance(self.speed, length) {
            self.movement.arrive(next, length);
            if self.is_stop(next) {
                self.dwell = self.dwell_ticks;
            } else {
                self.cursor = (self.cursor + 1) % len;
            }
        }
    }
}

impl Agent for ShuttleAgent {
    fn id(&self) -> AgentId {
        self.id
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Shuttle
    }

    fn role(&self) -> AgentRole {
        AgentRole::default()
    }

    fn step(&mut self, net: &NetworkModel, _router: &dyn Router) {
        self.advance(net);
    }

    fn position(&self, net: &NetworkModel) -> Point2 {
        if self.route.is_empty() {
            return Point2::default();
        }
        net.interpolate(TravelMode::Drive, self.movement.node, self.movement.edge, self.movement.progress)
    }
}
