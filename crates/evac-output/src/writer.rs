//! The `OutputWriter` trait implemented by all backend writers.

use crate::{MetricsRow, OutputResult, PositionRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors are returned here but never abort a run: the observer stores
/// them and hands them out through
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write one per-tick metrics row.
    fn write_metrics(&mut self, row: &MetricsRow) -> OutputResult<()>;

    /// Write a batch of agent positions.
    fn write_positions(&mut self, rows: &[PositionRow]) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
