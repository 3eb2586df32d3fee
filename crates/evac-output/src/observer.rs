//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use evac_core::Tick;
use evac_sim::{AgentPosition, SimObserver, TickMetrics};

use crate::row::{MetricsRow, PositionRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes per-tick metrics and position snapshots
/// to any [`OutputWriter`] backend.
///
/// `SimObserver` methods have no return value, so writer errors are stored
/// and the run continues.  After `sim.run()` returns, check with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // First error wins.
            if self.last_error.is_none() {
                tracing::warn!("output write failed: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, _tick: Tick, metrics: &TickMetrics) {
        let result = self.writer.write_metrics(&MetricsRow::from(metrics));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, positions: &[AgentPosition]) {
        if positions.is_empty() {
            return;
        }
        let rows: Vec<PositionRow> = positions.iter().map(|p| PositionRow::new(tick.0, p)).collect();
        let result = self.writer.write_positions(&rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
