//! Simulation observer trait for progress reporting and data collection.

use evac_core::Tick;

use crate::{AgentPosition, TickMetrics};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, m: &TickMetrics) {
///         if tick.is_multiple_of(self.interval) {
///             println!("{tick}: {} reached", m.reached_count);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any agent moves.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick with that tick's aggregates.
    fn on_tick_end(&mut self, _tick: Tick, _metrics: &TickMetrics) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with the interpolated position of every agent.
    fn on_snapshot(&mut self, _tick: Tick, _positions: &[AgentPosition]) {}

    /// Called once after the final tick of [`Sim::run`][crate::Sim::run].
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
