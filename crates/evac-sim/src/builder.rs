//! Fluent builder for constructing a [`Sim`], plus the one-call [`setup`].

use std::collections::HashSet;

use evac_agent::{Agent, PedestrianAgent, ShuttleAgent, VehicleAgent};
use evac_core::{AgentId, AgentRole, EvacConfig, NodeId, SimRng, Tick, TravelMode};
use evac_network::{DijkstraRouter, GraphProvider, NetworkModel, Router};
use evac_transit::{FeedData, FeedSource, RouteBuilder, ShuttleRoute};

use crate::{Sim, SimError, SimResult};

/// Offset for the population RNG stream derived from the master seed.
const POPULATION_STREAM: u64 = 1;

/// Validate `config`, build the network (from `provider`, or the synthetic
/// grid), fetch the transit feed once, and populate a ready-to-run [`Sim`].
///
/// All setup randomness comes from one [`SimRng`] seeded with
/// `config.seed`, consumed in order: hazards, shelters, pedestrians,
/// vehicles, shuttle routes.
pub fn setup(
    config:   EvacConfig,
    provider: Option<&dyn GraphProvider>,
    feed:     &dyn FeedSource,
) -> SimResult<Sim> {
    config.validate()?;
    let mut rng = SimRng::new(config.seed);
    let network = NetworkModel::build(provider, &config, &mut rng);
    let feed = FeedData::load(feed, &config.feed);
    SimBuilder::new(config, network, DijkstraRouter)
        .feed(feed)
        .setup_rng(rng)
        .build()
}

/// Fluent builder for [`Sim<R>`].
///
/// # Required inputs
///
/// - [`EvacConfig`]: population, speeds, step limit, …
/// - [`NetworkModel`]: built and hazard-initialised
/// - `R: Router`: the routing algorithm (e.g. [`DijkstraRouter`])
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                                       |
/// |-------------------------|-----------------------------------------------|
/// | `.feed(d)`              | Empty feed (synthetic shuttle loops)          |
/// | `.setup_rng(r)`         | Stream derived from `config.seed`             |
/// | `.pedestrians(v)`       | `population.pedestrians` random walkers       |
/// | `.vehicles(v)`          | `population.vehicles` random drivers          |
/// | `.shuttle_routes(v)`    | `population.shuttles` routes from the feed    |
///
/// # Example
///
/// ```rust,ignore
/// let mut rng = SimRng::new(config.seed);
/// let network = NetworkModel::build(None, &config, &mut rng);
/// let mut sim = SimBuilder::new(config, network, DijkstraRouter)
///     .setup_rng(rng)
///     .build()?;
/// sim.run(&mut NoopObserver);
/// ```
pub struct SimBuilder<R: Router = DijkstraRouter> {
    config:      EvacConfig,
    network:     NetworkModel,
    router:      R,
    feed:        FeedData,
    rng:         Option<SimRng>,
    pedestrians: Option<Vec<PedestrianAgent>>,
    vehicles:    Option<Vec<VehicleAgent>>,
    routes:      Option<Vec<ShuttleRoute>>,
}

impl<R: Router> SimBuilder<R> {
    /// Create a builder with all required inputs.
    pub fn new(config: EvacConfig, network: NetworkModel, router: R) -> Self {
        Self {
            config,
            network,
            router,
            feed:        FeedData::default(),
            rng:         None,
            pedestrians: None,
            vehicles:    None,
            routes:      None,
        }
    }

    /// Feed data shuttle routes are built from.  Fetched once; every
    /// shuttle reads the same payload.
    pub fn feed(mut self, feed: FeedData) -> Self {
        self.feed = feed;
        self
    }

    /// Continue an existing setup RNG (typically the one the network was
    /// built with) instead of deriving a fresh stream.
    pub fn setup_rng(mut self, rng: SimRng) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Use these pedestrians instead of generating them.
    pub fn pedestrians(mut self, agents: Vec<PedestrianAgent>) -> Self {
        self.pedestrians = Some(agents);
        self
    }

    /// Use these vehicles instead of generating them.
    pub fn vehicles(mut self, agents: Vec<VehicleAgent>) -> Self {
        self.vehicles = Some(agents);
        self
    }

    /// Use these shuttle routes instead of building them from the feed.
    /// Empty routes are skipped.
    pub fn shuttle_routes(mut self, routes: Vec<ShuttleRoute>) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Validate inputs, generate whatever population was not supplied, and
    /// return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<R>> {
        let config = self.config;
        config.validate()?;
        let network = self.network;
        let mut rng = self.rng.unwrap_or_else(|| SimRng::new(config.seed).child(POPULATION_STREAM));

        // ── Evacuees ──────────────────────────────────────────────────────
        let pedestrians = match self.pedestrians {
            Some(agents) => agents,
            None => generate_pedestrians(&config, &network, &mut rng),
        };
        let vehicles = match self.vehicles {
            Some(agents) => agents,
            None => generate_vehicles(&config, &network, &mut rng, pedestrians.len()),
        };
        for a in &pedestrians {
            check_endpoints(&network, a.id(), TravelMode::Walk, a.core().node(), a.core().goal)?;
        }
        for a in &vehicles {
            check_endpoints(&network, a.id(), TravelMode::Drive, a.core().node(), a.core().goal)?;
        }

        // ── Shuttles ──────────────────────────────────────────────────────
        let routes = match self.routes {
            Some(routes) => routes,
            None => {
                let builder = RouteBuilder::new(&config.feed);
                (0..config.population.shuttles)
                    .map(|_| builder.build(&self.feed, &network, &self.router, &mut rng))
                    .collect()
            }
        };
        let first_id = pedestrians.len() + vehicles.len();
        let shuttles: Vec<ShuttleAgent> = routes
            .into_iter()
            .filter(|r| !r.is_empty())
            .enumerate()
            .map(|(i, r)| ShuttleAgent::new(AgentId((first_id + i) as u32), r.nodes, r.stops, &config))
            .collect();
        for s in &shuttles {
            check_route(&network, s)?;
        }

        check_unique_ids(
            pedestrians.iter().map(Agent::id)
                .chain(vehicles.iter().map(Agent::id))
                .chain(shuttles.iter().map(Agent::id)),
        )?;

        tracing::info!(
            pedestrians = pedestrians.len(),
            vehicles    = vehicles.len(),
            shuttles    = shuttles.len(),
            step_limit  = config.step_limit,
            "simulation ready"
        );

        Ok(Sim {
            config,
            network,
            router: self.router,
            pedestrians,
            vehicles,
            shuttles,
            current_tick: Tick::ZERO,
        })
    }
}

// ── Population generation ─────────────────────────────────────────────────────

fn draw_role(rng: &mut SimRng, faculty_ratio: f64) -> AgentRole {
    if rng.gen_bool(faculty_ratio) { AgentRole::Faculty } else { AgentRole::Staff }
}

/// Random walk-graph starts; the `k`-th pedestrian (1-based) heads for
/// shelter `k mod n`.
fn generate_pedestrians(
    config:  &EvacConfig,
    network: &NetworkModel,
    rng:     &mut SimRng,
) -> Vec<PedestrianAgent> {
    let count = config.population.pedestrians;
    let starts: Vec<NodeId> = network.graph(TravelMode::Walk).nodes().collect();
    let shelters = network.shelters();
    if count > 0 && (starts.is_empty() || shelters.is_empty()) {
        tracing::warn!("no walk nodes or shelters, skipping {count} pedestrians");
        return Vec::new();
    }
    (0..count)
        .map(|i| {
            let start = starts[rng.gen_range(0..starts.len())];
            let role = draw_role(rng, config.population.faculty_ratio);
            let goal = shelters[(i + 1) % shelters.len()];
            PedestrianAgent::new(AgentId(i as u32), role, start, goal, config)
        })
        .collect()
}

/// Random drive-graph starts; the `k`-th vehicle (1-based) heads for the
/// `k mod n`-th shelter reachable by road, or any drive node if no shelter is.
fn generate_vehicles(
    config:   &EvacConfig,
    network:  &NetworkModel,
    rng:      &mut SimRng,
    first_id: usize,
) -> Vec<VehicleAgent> {
    let count = config.population.vehicles;
    let drive = network.graph(TravelMode::Drive);
    let starts: Vec<NodeId> = drive.nodes().collect();
    let mut targets: Vec<NodeId> =
        network.shelters().iter().copied().filter(|&s| drive.contains(s)).collect();
    if targets.is_empty() {
        targets = starts.clone();
    }
    if count > 0 && starts.is_empty() {
        tracing::warn!("drive graph is empty, skipping {count} vehicles");
        return Vec::new();
    }
    (0..count)
        .map(|i| {
            let start = starts[rng.gen_range(0..starts.len())];
            let role = draw_role(rng, config.population.faculty_ratio);
            let goal = targets[(i + 1) % targets.len()];
            VehicleAgent::new(AgentId((first_id + i) as u32), role, start, goal, config)
        })
        .collect()
}

// ── Validation ────────────────────────────────────────────────────────────────

fn check_endpoints(
    network: &NetworkModel,
    agent:   AgentId,
    mode:    TravelMode,
    start:   NodeId,
    goal:    NodeId,
) -> SimResult<()> {
    for node in [start, goal] {
        if !network.graph(mode).contains(node) {
            return Err(SimError::NodeNotInGraph { agent, node, mode });
        }
    }
    Ok(())
}

/// Every route and stop node must be on the drive graph.
fn check_route(network: &NetworkModel, shuttle: &ShuttleAgent) -> SimResult<()> {
    let drive = network.graph(TravelMode::Drive);
    match shuttle.route().iter().chain(shuttle.stops()).find(|&&n| !drive.contains(n)) {
        Some(&node) => Err(SimError::NodeNotInGraph { agent: shuttle.id, node, mode: TravelMode::Drive }),
        None => Ok(()),
    }
}

fn check_unique_ids(ids: impl Iterator<Item = AgentId>) -> SimResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SimError::DuplicateAgent(id));
        }
    }
    Ok(())
}
