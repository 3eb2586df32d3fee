//! The `NetworkModel`: topology, ground-truth hazards, shelters, and the
//! cost / observation / blocking queries agents make every tick.

use evac_core::{
    AgentRng, EdgeId, EvacConfig, GeoPoint, ModeTable, NodeId, Point2, SimRng, TravelMode,
};

use crate::geocode::{GeoIndex, PlanarIndex};
use crate::graph::ModeGraph;
use crate::hazard::{BeliefView, EdgeObservation, HazardOverlay, Observation};
use crate::router::{Route, Router};
use crate::shelter::select_shelters;
use crate::topology::{GraphProvider, Topology, synthetic_grid};
use crate::{Geocoder, NetworkError, NetworkResult, Snap};

/// Where the topology of a model came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TopologyOrigin {
    Provider,
    SyntheticGrid,
}

/// Cost-function coefficients.
#[derive(Copy, Clone, Debug)]
struct CostParams {
    snow_alpha:  f64,
    slope_alpha: f64,
}

/// Partial-observability parameters.
#[derive(Copy, Clone, Debug)]
struct ObservationParams {
    radius_m: f64,
    error:    ModeTable<f64>,
}

// ── NetworkModel ──────────────────────────────────────────────────────────────

/// Mode graphs plus the fixed hazard state of a run.
///
/// Built once at setup (see [`NetworkModel::build`]); afterwards it is only
/// read.  Agents receive `&NetworkModel` each tick and never mutate it, so
/// concurrent readers need no synchronisation.
pub struct NetworkModel {
    positions:   Vec<Point2>,
    graphs:      ModeTable<ModeGraph>,
    hazards:     ModeTable<HazardOverlay>,
    shelters:    Vec<NodeId>,
    cost:        CostParams,
    observation: ObservationParams,
    planar_idx:  PlanarIndex,
    geo_idx:     Option<GeoIndex>,
    geocoder:    Option<Box<dyn Geocoder>>,
    origin:      TopologyOrigin,
}

impl NetworkModel {
    // ── Construction ──────────────────────────────────────────────────────

    /// Build topology, hazards, and shelters, in that order.
    ///
    /// Topology comes from `provider` when one is given and succeeds;
    /// otherwise the synthetic grid from `config.grid` is used.  Never
    /// fails: every degradation has a deterministic substitute.
    pub fn build(
        provider: Option<&dyn GraphProvider>,
        config:   &EvacConfig,
        rng:      &mut SimRng,
    ) -> NetworkModel {
        let provided = match provider.map(|p| p.provide().and_then(Topology::from_provided)) {
            Some(Ok(topology)) => Some(topology),
            Some(Err(e)) => {
                tracing::warn!("topology provider failed, using synthetic grid: {e}");
                None
            }
            None => {
                tracing::info!("no topology provider configured, using synthetic grid");
                None
            }
        };
        let (topology, origin) = match provided {
            Some(t) => (t, TopologyOrigin::Provider),
            None => (Self::grid_topology(config), TopologyOrigin::SyntheticGrid),
        };
        Self::from_topology(topology, origin, config, rng)
    }

    /// Build from an already validated topology.
    pub fn from_topology(
        topology: Topology,
        origin:   TopologyOrigin,
        config:   &EvacConfig,
        rng:      &mut SimRng,
    ) -> NetworkModel {
        let Topology { positions, geo, graphs } = topology;

        // Walk hazards are drawn before drive hazards.
        let hazards = ModeTable::new(
            HazardOverlay::generate(graphs.walk.edge_count(), &config.hazards, rng),
            HazardOverlay::generate(graphs.drive.edge_count(), &config.hazards, rng),
        );

        let walk_nodes: Vec<NodeId> = graphs.walk.nodes().collect();
        let shelters = select_shelters(&walk_nodes, config.shelter_count, rng);

        let planar_idx = PlanarIndex::new(&positions);
        let geo_idx = geo.map(|g| GeoIndex::new(&g, |n| graphs.drive.contains(n)));

        tracing::info!(
            nodes         = positions.len(),
            walk_edges    = graphs.walk.edge_count(),
            drive_edges   = graphs.drive.edge_count(),
            walk_blocked  = hazards.walk.blocked_count(),
            drive_blocked = hazards.drive.blocked_count(),
            shelters      = shelters.len(),
            metric_geocoding = geo_idx.is_some(),
            "network model ready ({origin:?})"
        );

        NetworkModel {
            positions,
            graphs,
            hazards,
            shelters,
            cost: CostParams {
                snow_alpha:  config.hazards.snow_alpha,
                slope_alpha: config.hazards.slope_alpha,
            },
            observation: ObservationParams {
                radius_m: config.observation_radius_m,
                error:    config.observation_error,
            },
            planar_idx,
            geo_idx,
            geocoder: None,
            origin,
        }
    }

    fn grid_topology(config: &EvacConfig) -> Topology {
        // A validated grid config always yields at least one node, so the
        // conversion cannot fail; fall back to an empty grid all the same.
        Topology::from_provided(synthetic_grid(&config.grid)).unwrap_or_else(|_| Topology {
            positions: vec![Point2::default()],
            geo:       None,
            graphs:    ModeTable::new(ModeGraph::empty(1), ModeGraph::empty(1)),
        })
    }

    /// Install an external geocoder.  It takes precedence over the built-in
    /// indexes.
    pub fn with_geocoder(mut self, geocoder: Box<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    // ── Setup-time overrides ──────────────────────────────────────────────
    //
    // These take `&mut self`, so they can only run while setup code owns the
    // model exclusively, i.e. before it is handed to the simulation.

    /// Replace the ground-truth hazard of the edge `from → to`.
    pub fn set_ground_truth(
        &mut self,
        mode:       TravelMode,
        from:       NodeId,
        to:         NodeId,
        blocked:    bool,
        snow_depth: f64,
    ) -> NetworkResult<()> {
        let edge = self.require_edge(mode, from, to)?;
        self.hazards[mode].set(edge, blocked, snow_depth);
        Ok(())
    }

    /// Replace the shelter set.  Every shelter must be a walk-graph node.
    pub fn set_shelters(&mut self, mut shelters: Vec<NodeId>) -> NetworkResult<()> {
        if let Some(&bad) = shelters.iter().find(|&&s| !self.graphs.walk.contains(s)) {
            return Err(NetworkError::NodeNotFound(bad));
        }
        shelters.sort_unstable();
        shelters.dedup();
        self.shelters = shelters;
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn origin(&self) -> TopologyOrigin {
        self.origin
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn position(&self, node: NodeId) -> Point2 {
        self.positions[node.index()]
    }

    #[inline]
    pub fn graph(&self, mode: TravelMode) -> &ModeGraph {
        &self.graphs[mode]
    }

    #[inline]
    pub fn hazards(&self, mode: TravelMode) -> &HazardOverlay {
        &self.hazards[mode]
    }

    /// Shelter nodes in ascending id order.
    pub fn shelters(&self) -> &[NodeId] {
        &self.shelters
    }

    pub fn is_shelter(&self, node: NodeId) -> bool {
        self.shelters.binary_search(&node).is_ok()
    }

    #[inline]
    pub fn edge(&self, mode: TravelMode, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.graphs[mode].find_edge(from, to)
    }

    fn require_edge(&self, mode: TravelMode, from: NodeId, to: NodeId) -> NetworkResult<EdgeId> {
        self.edge(mode, from, to)
            .ok_or(NetworkError::EdgeNotFound { mode, from, to })
    }

    // ── Cost ──────────────────────────────────────────────────────────────

    /// Hazard-weighted traversal cost of `edge`:
    /// `length * (1 + snow_alpha * snow + slope_alpha * slope)`.
    #[inline]
    pub fn edge_cost(&self, mode: TravelMode, edge: EdgeId) -> f64 {
        let g = &self.graphs[mode];
        let snow = self.hazards[mode].snow_depth(edge);
        g.length(edge) * (1.0 + self.cost.snow_alpha * snow + self.cost.slope_alpha * g.slope(edge))
    }

    /// [`edge_cost`](Self::edge_cost) of `from → to`; `None` if the edge is
    /// not in the mode graph.
    pub fn cost(&self, from: NodeId, to: NodeId, mode: TravelMode) -> Option<f64> {
        self.edge(mode, from, to).map(|e| self.edge_cost(mode, e))
    }

    // ── Observation ───────────────────────────────────────────────────────

    /// Every edge of the mode graph whose source lies within the
    /// observation radius of `node`, with its hazard state.
    ///
    /// Each `blocked` flag is independently inverted with the mode's
    /// observation-error probability, drawn fresh from `rng` per call.
    pub fn observe(&self, node: NodeId, mode: TravelMode, rng: &mut AgentRng) -> Observation {
        if node.index() >= self.positions.len() {
            return Vec::new();
        }
        let graph = &self.graphs[mode];
        let hazards = &self.hazards[mode];
        let error = self.observation.error[mode];

        let mut obs = Vec::new();
        for source in self.planar_idx.within(self.position(node), self.observation.radius_m) {
            for edge in graph.out_edges(source) {
                let mut blocked = hazards.is_blocked(edge);
                if rng.gen_bool(error) {
                    blocked = !blocked;
                }
                obs.push((edge, EdgeObservation {
                    blocked,
                    snow_depth: hazards.snow_depth(edge),
                    slope:      graph.slope(edge),
                }));
            }
        }
        obs
    }

    // ── Blocking ──────────────────────────────────────────────────────────

    /// Blocked status of `from → to` according to `belief`.
    ///
    /// An edge the belief has no entry for is treated as open, whatever the
    /// ground truth says.
    pub fn is_blocked(
        &self,
        from:   NodeId,
        to:     NodeId,
        mode:   TravelMode,
        belief: &dyn BeliefView,
    ) -> bool {
        self.edge(mode, from, to)
            .and_then(|e| belief.lookup(e))
            .is_some_and(|o| o.blocked)
    }

    /// Authoritative ground-truth blocked status.  Not used by agent
    /// movement.
    pub fn is_blocked_truth(&self, from: NodeId, to: NodeId, mode: TravelMode) -> bool {
        self.edge(mode, from, to)
            .is_some_and(|e| self.hazards[mode].is_blocked(e))
    }

    // ── Routing ───────────────────────────────────────────────────────────

    /// Least-cost route weighted by [`edge_cost`](Self::edge_cost), skipping
    /// every edge for which `exclude` returns `true`.
    pub fn least_cost_route(
        &self,
        router:  &dyn Router,
        mode:    TravelMode,
        from:    NodeId,
        to:      NodeId,
        exclude: &dyn Fn(EdgeId) -> bool,
    ) -> NetworkResult<Route> {
        let weight = |e: EdgeId| (!exclude(e)).then(|| self.edge_cost(mode, e));
        router.route(&self.graphs[mode], from, to, &weight)
    }

    /// Shortest route by plain edge length (no hazard weighting).
    pub fn shortest_route(
        &self,
        router: &dyn Router,
        mode:   TravelMode,
        from:   NodeId,
        to:     NodeId,
    ) -> NetworkResult<Route> {
        let graph = &self.graphs[mode];
        router.route(graph, from, to, &|e| Some(graph.length(e)))
    }

    // ── Geocoding ─────────────────────────────────────────────────────────

    /// Nearest drive node to a geographic coordinate.
    pub fn nearest_node(&self, point: GeoPoint) -> Option<NodeId> {
        self.nearest_node_with_distance(point).map(|s| s.node)
    }

    /// Nearest drive node with its distance.
    ///
    /// Order of precedence: injected geocoder, metric geographic index,
    /// then the projected fallback, which compares `(lon, lat)` against
    /// planar `(x, y)` and reports `is_metric = false`.
    pub fn nearest_node_with_distance(&self, point: GeoPoint) -> Option<Snap> {
        if let Some(g) = &self.geocoder {
            if let Some(snap) = g.nearest_node_with_distance(point) {
                return Some(snap);
            }
            tracing::debug!("external geocoder returned nothing for {point}, falling back");
        }
        if let Some(idx) = &self.geo_idx {
            if let Some(snap) = idx.nearest_node_with_distance(point) {
                return Some(snap);
            }
        }
        let drive = &self.graphs.drive;
        self.planar_idx
            .nearest_where([point.lon, point.lat], |n| drive.contains(n))
            .map(|(node, distance)| Snap { node, distance, is_metric: false })
    }

    // ── Visualisation ─────────────────────────────────────────────────────

    /// Planar position of an agent at `node`, `progress` metres along
    /// `edge` (if in transit).
    pub fn interpolate(
        &self,
        mode:     TravelMode,
        node:     NodeId,
        edge:     Option<EdgeId>,
        progress: f64,
    ) -> Point2 {
        let Some(edge) = edge else {
            return self.position(node);
        };
        let graph = &self.graphs[mode];
        let (from, to) = graph.endpoints(edge);
        let len = graph.length(edge);
        let ratio = if len > 0.0 { progress / len } else { 0.0 };
        self.position(from).lerp(self.position(to), ratio)
    }
}
