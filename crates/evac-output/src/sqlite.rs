//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` in the output directory with two tables:
//! `metrics` and `agent_positions`.

use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{MetricsRow, OutputResult, PositionRow};

/// Writes run output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS metrics (
                 step         INTEGER PRIMARY KEY,
                 alive        INTEGER NOT NULL,
                 reached      INTEGER NOT NULL,
                 avg_exposure REAL    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS agent_positions (
                 tick     INTEGER NOT NULL,
                 agent_id INTEGER NOT NULL,
                 kind     TEXT    NOT NULL,
                 role     TEXT    NOT NULL,
                 x        REAL    NOT NULL,
                 y        REAL    NOT NULL,
                 reached  INTEGER NOT NULL,
                 exposure REAL    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_metrics(&mut self, row: &MetricsRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO metrics (step, alive, reached, avg_exposure) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![row.step as i64, row.alive as i64, row.reached as i64, row.avg_exposure],
        )?;
        Ok(())
    }

    fn write_positions(&mut self, rows: &[PositionRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_positions \
                 (tick, agent_id, kind, role, x, y, reached, exposure) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick as i64,
                    row.agent_id,
                    row.kind,
                    row.role,
                    row.x,
                    row.y,
                    row.reached as i64,
                    row.exposure,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
