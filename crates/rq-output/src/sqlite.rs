//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `route_segments` and `allocations`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{AllocationRow, OutputResult, RouteSegmentRow};

/// Writes routes and allocations to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS route_segments (
                 route_id         INTEGER NOT NULL,
                 seq              INTEGER NOT NULL,
                 from_node        TEXT    NOT NULL,
                 to_node          TEXT    NOT NULL,
                 street           TEXT    NOT NULL,
                 length_m         REAL    NOT NULL,
                 traffic          TEXT    NOT NULL,
                 estimated_time_s REAL    NOT NULL,
                 PRIMARY KEY (route_id, seq)
             );
             CREATE TABLE IF NOT EXISTS allocations (
                 source_street TEXT    NOT NULL,
                 dest_street   TEXT    NOT NULL,
                 quantity      REAL    NOT NULL,
                 integral      INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_route(&mut self, rows: &[RouteSegmentRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO route_segments \
                 (route_id, seq, from_node, to_node, street, length_m, traffic, estimated_time_s) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.route_id,
                    row.seq,
                    row.from_node,
                    row.to_node,
                    row.street,
                    row.length_m,
                    row.traffic.as_str(),
                    row.estimated_time_s,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_allocations(&mut self, rows: &[AllocationRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO allocations (source_street, dest_street, quantity, integral) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.source_street,
                    row.dest_street,
                    row.quantity,
                    row.integral as i64,
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
