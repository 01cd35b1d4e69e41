//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory
//! with two tables: `agent_snapshots` and `tick_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::OutputResult;

pub struct SqliteWriter {
    conn: Connection,
    finished: bool,
}

impl SqliteWriter {
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS agent_snapshots (
                 agent_id                 TEXT    NOT NULL,
                 tick                     INTEGER NOT NULL,
                 kind                     TEXT    NOT NULL,
                 x                        REAL    NOT NULL,
                 y                        REAL    NOT NULL,
                 connected_neighbor_count INTEGER NOT NULL,
                 num_stored_bundles       INTEGER NOT NULL,
                 num_payloads_received    INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick                             INTEGER PRIMARY KEY,
                 total_bundles_stored_cumulative INTEGER NOT NULL,
                 num_drops_picked_up              INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_snapshots \
                 (agent_id, tick, kind, x, y, connected_neighbor_count, num_stored_bundles, num_payloads_received) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.agent_id,
                    row.tick,
                    row.kind,
                    row.x,
                    row.y,
                    row.connected_neighbor_count,
                    row.num_stored_bundles,
                    row.num_payloads_received,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries (tick, total_bundles_stored_cumulative, num_drops_picked_up) \
             VALUES (?1, ?2, ?3)",
            rusqlite::params![row.tick, row.total_bundles_stored_cumulative, row.num_drops_picked_up],
        )?;
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
