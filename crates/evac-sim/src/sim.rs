//! The `Sim` struct and its tick loop.

use evac_agent::{Agent, PedestrianAgent, ShuttleAgent, VehicleAgent};
use evac_core::{EvacConfig, Tick};
use evac_network::{DijkstraRouter, NetworkModel, Router};

use crate::{AgentPosition, SimObserver, TickMetrics};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// Holds the network (read-only after setup) and the three agent groups.
/// Every tick advances each agent exactly once: pedestrians, then vehicles,
/// then shuttles.
///
/// Create via [`SimBuilder`][crate::SimBuilder] or [`setup`][crate::setup].
pub struct Sim<R: Router = DijkstraRouter> {
    pub config:      EvacConfig,
    pub network:     NetworkModel,
    pub router:      R,
    pub pedestrians: Vec<PedestrianAgent>,
    pub vehicles:    Vec<VehicleAgent>,
    pub shuttles:    Vec<ShuttleAgent>,
    /// The next tick to be simulated.
    pub current_tick: Tick,
}

impl<R: Router> Sim<R> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick until `config.step_limit`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        while self.current_tick.0 < self.config.step_limit {
            self.tick(observer);
        }
        tracing::info!(
            ticks   = self.current_tick.0,
            reached = self.metrics(self.current_tick.0.saturating_sub(1)).reached_count,
            "simulation finished"
        );
        observer.on_sim_end(self.current_tick);
    }

    /// Run exactly `n` ticks from the current position (ignores
    /// `step_limit`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.tick(observer);
        }
    }

    /// Advance one tick without observer callbacks and return its metrics.
    pub fn step(&mut self) -> TickMetrics {
        let now = self.current_tick;
        let net = &self.network;
        let router: &dyn Router = &self.router;

        step_group(&mut self.pedestrians, net, router);
        step_group(&mut self.vehicles, net, router);
        step_group(&mut self.shuttles, net, router);

        let metrics = self.metrics(now.0);
        tracing::trace!(
            tick     = now.0,
            reached  = metrics.reached_count,
            exposure = metrics.average_exposure,
            "tick complete"
        );
        self.current_tick = now + 1;
        metrics
    }

    /// Aggregates over pedestrians and vehicles, labelled with `step`.
    pub fn metrics(&self, step: u64) -> TickMetrics {
        let evacuees = self
            .pedestrians
            .iter()
            .map(PedestrianAgent::core)
            .chain(self.vehicles.iter().map(VehicleAgent::core));

        let (mut count, mut alive, mut reached, mut exposure) = (0usize, 0usize, 0usize, 0.0);
        for core in evacuees {
            count += 1;
            alive += usize::from(core.alive);
            reached += usize::from(core.reached);
            exposure += core.exposure;
        }
        TickMetrics {
            step,
            alive_count:      alive,
            reached_count:    reached,
            average_exposure: exposure / count.max(1) as f64,
        }
    }

    /// Interpolated position of every agent, in stepping order.
    pub fn positions(&self) -> Vec<AgentPosition> {
        let net = &self.network;
        let mut out = Vec::with_capacity(self.agent_count());
        extend_positions(&mut out, &self.pedestrians, net);
        extend_positions(&mut out, &self.vehicles, net);
        extend_positions(&mut out, &self.shuttles, net);
        out
    }

    pub fn agent_count(&self) -> usize {
        self.pedestrians.len() + self.vehicles.len() + self.shuttles.len()
    }

    // ── Tick processing ───────────────────────────────────────────────────

    fn tick<O: SimObserver>(&mut self, observer: &mut O) {
        let now = self.current_tick;
        observer.on_tick_start(now);
        let metrics = self.step();
        observer.on_tick_end(now, &metrics);
        if now.is_multiple_of(self.config.output_interval_ticks) {
            observer.on_snapshot(now, &self.positions());
        }
    }
}

/// Step every agent of one group.
fn step_group<A: Agent>(agents: &mut [A], net: &NetworkModel, router: &dyn Router) {
    #[cfg(not(feature = "parallel"))]
    for agent in agents.iter_mut() {
        agent.step(net, router);
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        agents.par_iter_mut().for_each(|agent| agent.step(net, router));
    }
}

fn extend_positions<A: Agent>(out: &mut Vec<AgentPosition>, agents: &[A], net: &NetworkModel) {
    out.extend(agents.iter().map(|a| {
        let p = a.position(net);
        AgentPosition {
            agent:    a.id(),
            kind:     a.kind(),
            role:     a.role(),
            x:        p.x,
            y:        p.y,
            reached:  a.reached(),
            exposure: a.exposure(),
        }
    }));
}
