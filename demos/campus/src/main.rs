//! campus — hazard-aware evacuation of a university campus.
//!
//! Pedestrians and private vehicles route to shelters over a snowy road
//! network they only partially observe, while shuttles loop a route built
//! from the live transit feed.  Without a street-network provider the run
//! uses the synthetic grid; with `--offline` (or a failed fetch) shuttles
//! drive synthetic loops.
//!
//! ```text
//! RUST_LOG=debug cargo run -p campus -- --config campus.json --steps 300
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use evac_core::{EvacConfig, Tick};
use evac_output::{CsvWriter, OutputWriter, SimOutputObserver};
use evac_sim::{AgentPosition, SimObserver, TickMetrics, setup};
use evac_transit::{FeedSource, StaticFeedSource, fetch_shuttle_stops};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "campus", about = "Run the campus evacuation simulation")]
struct Cli {
    /// JSON file with `EvacConfig` overrides (missing keys keep defaults).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of ticks to simulate.
    #[arg(short, long)]
    steps: Option<u64>,

    /// Override the master seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for metrics and position output.
    #[arg(short, long, default_value = "logs")]
    output: PathBuf,

    /// Write `output.db` instead of CSV files.
    #[cfg(feature = "sqlite")]
    #[arg(long)]
    sqlite: bool,

    /// Skip the transit feed fetch.
    #[arg(long)]
    offline: bool,

    /// Print a progress line every N ticks (0 disables).
    #[arg(long, default_value_t = 50)]
    progress: u64,
}

fn load_config(cli: &Cli) -> Result<EvacConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => EvacConfig::default(),
    };
    if let Some(steps) = cli.steps {
        config.step_limit = steps;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn feed_source(offline: bool) -> Box<dyn FeedSource> {
    #[cfg(feature = "http")]
    if !offline {
        return Box::new(evac_transit::HttpFeedSource);
    }
    #[cfg(not(feature = "http"))]
    if !offline {
        tracing::warn!("built without the `http` feature, running offline");
    }
    Box::new(StaticFeedSource(None))
}

// ── Progress observer ─────────────────────────────────────────────────────────

struct ProgressObserver<W: OutputWriter> {
    inner:     SimOutputObserver<W>,
    interval:  u64,
    total:     u64,
    snapshots: usize,
    last:      Option<TickMetrics>,
}

impl<W: OutputWriter> ProgressObserver<W> {
    fn new(inner: SimOutputObserver<W>, interval: u64, total: u64) -> Self {
        Self { inner, interval, total, snapshots: 0, last: None }
    }
}

impl<W: OutputWriter> SimObserver for ProgressObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, metrics: &TickMetrics) {
        if self.interval > 0 && tick.is_multiple_of(self.interval) {
            println!(
                "  step {:>5}/{}  reached {:>4}  avg exposure {:>8.3}",
                metrics.step, self.total, metrics.reached_count, metrics.average_exposure
            );
        }
        self.last = Some(*metrics);
        self.inner.on_tick_end(tick, metrics);
    }

    fn on_snapshot(&mut self, tick: Tick, positions: &[AgentPosition]) {
        self.snapshots += positions.len();
        self.inner.on_snapshot(tick, positions);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

fn run_with<W: OutputWriter>(
    sim:    &mut evac_sim::Sim,
    writer: W,
    cli:    &Cli,
) -> ProgressObserver<W> {
    let total = sim.config.step_limit;
    let mut obs = ProgressObserver::new(SimOutputObserver::new(writer), cli.progress, total);
    sim.run(&mut obs);
    if let Some(e) = obs.inner.take_error() {
        tracing::error!("output error: {e}");
    }
    obs
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let source = feed_source(cli.offline);

    println!("=== campus — hazard-aware evacuation ===");
    println!(
        "Pedestrians: {}  |  Vehicles: {}  |  Shuttles: {}  |  Steps: {}  |  Seed: {}",
        config.population.pedestrians,
        config.population.vehicles,
        config.population.shuttles,
        config.step_limit,
        config.seed,
    );

    let stops = fetch_shuttle_stops(source.as_ref(), &config.feed, config.feed.center, config.feed.radius_m);
    println!("Shuttle stops within {:.0} m of campus: {}", config.feed.radius_m, stops.len());
    for stop in stops.iter().take(10) {
        println!("  {:<32} {}", stop.name, stop.position);
    }

    let t0 = Instant::now();
    let mut sim = setup(config, None, source.as_ref())?;
    println!(
        "Network: {} nodes, {} walk edges, {} drive edges, {} shelters",
        sim.network.node_count(),
        sim.network.graph(evac_core::TravelMode::Walk).edge_count(),
        sim.network.graph(evac_core::TravelMode::Drive).edge_count(),
        sim.network.shelters().len(),
    );
    println!("Setup in {:.3} s", t0.elapsed().as_secs_f64());
    println!();

    let t1 = Instant::now();
    let (snapshots, last) = run(&mut sim, &cli)?;
    println!();
    println!("Simulation complete in {:.3} s", t1.elapsed().as_secs_f64());
    if let Some(m) = last {
        println!(
            "  reached {}/{} evacuees, alive {}, avg exposure {:.3}",
            m.reached_count,
            sim.pedestrians.len() + sim.vehicles.len(),
            m.alive_count,
            m.average_exposure,
        );
    }
    println!("  position rows written: {snapshots}  ->  {}", cli.output.display());

    Ok(())
}

fn run(sim: &mut evac_sim::Sim, cli: &Cli) -> Result<(usize, Option<TickMetrics>)> {
    let dir: &Path = &cli.output;

    #[cfg(feature = "sqlite")]
    if cli.sqlite {
        let obs = run_with(sim, evac_output::SqliteWriter::new(dir)?, cli);
        return Ok((obs.snapshots, obs.last));
    }

    let obs = run_with(sim, CsvWriter::new(dir)?, cli);
    Ok((obs.snapshots, obs.last))
}
