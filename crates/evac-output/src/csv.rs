//! CSV output backend.
//!
//! Creates two files in the output directory:
//! - `metrics.csv`: `step, alive, reached, avg_exposure`
//! - `agent_positions.csv`

use std::fs::{self, File};
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{MetricsRow, OutputResult, PositionRow};

pub const METRICS_FILE: &str = "metrics.csv";
pub const POSITIONS_FILE: &str = "agent_positions.csv";

/// Writes run output to two CSV files.
pub struct CsvWriter {
    metrics:   Writer<File>,
    positions: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open both files, and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;

        let mut metrics = Writer::from_path(dir.join(METRICS_FILE))?;
        metrics.write_record(["step", "alive", "reached", "avg_exposure"])?;

        let mut positions = Writer::from_path(dir.join(POSITIONS_FILE))?;
        positions.write_record(["tick", "agent_id", "kind", "role", "x", "y", "reached", "exposure"])?;

        Ok(Self { metrics, positions, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_metrics(&mut self, row: &MetricsRow) -> OutputResult<()> {
        self.metrics.write_record(&[
            row.step.to_string(),
            row.alive.to_string(),
            row.reached.to_string(),
            format!("{:.3}", row.avg_exposure),
        ])?;
        Ok(())
    }

    fn write_positions(&mut self, rows: &[PositionRow]) -> OutputResult<()> {
        for row in rows {
            self.positions.write_record(&[
                row.tick.to_string(),
                row.agent_id.to_string(),
                row.kind.to_owned(),
                row.role.to_owned(),
                format!("{:.3}", row.x),
                format!("{:.3}", row.y),
                (row.reached as u8).to_string(),
                format!("{:.3}", row.exposure),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.metrics.flush()?;
        self.positions.flush()?;
        Ok(())
    }
}
