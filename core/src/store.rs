//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine reaches it through the StateLogger trait and never
//! executes SQL directly.

use crate::{
    error::SimResult,
    types::{Money, SimulationId},
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};

/// Append-only sink for (simulation id, simulated time, balance) rows.
/// A failure is surfaced to the caller and never retried.
pub trait StateLogger {
    fn log_state(
        &mut self,
        simulation_id: &str,
        timestamp: DateTime<Utc>,
        balance: Money,
    ) -> SimResult<()>;
}

/// One persisted row of the balance history.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredState {
    pub id:            i64,
    pub simulation_id: SimulationId,
    pub timestamp:     DateTime<Utc>,
    pub balance:       Money,
}

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the simulation database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        // WAL is ignored for :memory: databases, so don't fail on it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_state_log.sql"))?;
        Ok(())
    }

    /// Release the connection. Close errors are reported rather than
    /// swallowed by Drop.
    pub fn close(self) -> SimResult<()> {
        self.conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }

    // ── Simulation ─────────────────────────────────────────────

    pub fn insert_simulation(
        &self,
        simulation_id: &str,
        starting_balance: Money,
        daily_fee: Money,
        started_at: DateTime<Utc>,
    ) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO simulation (simulation_id, starting_balance, daily_fee, started_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![simulation_id, starting_balance, daily_fee, rfc3339(started_at)],
        )?;
        Ok(())
    }

    // ── State log ──────────────────────────────────────────────

    pub fn states_for(&self, simulation_id: &str) -> SimResult<Vec<StoredState>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, simulation_id, timestamp, balance
             FROM state_log WHERE simulation_id = ?1
             ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![simulation_id], |row| {
                let raw: String = row.get(2)?;
                let timestamp = DateTime::parse_from_rfc3339(&raw)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            2,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?
                    .with_timezone(&Utc);
                Ok(StoredState {
                    id: row.get(0)?,
                    simulation_id: row.get(1)?,
                    timestamp,
                    balance: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn state_count(&self, simulation_id: &str) -> SimResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM state_log WHERE simulation_id = ?1",
            params![simulation_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl StateLogger for SimStore {
    fn log_state(
        &mut self,
        simulation_id: &str,
        timestamp: DateTime<Utc>,
        balance: Money,
    ) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO state_log (simulation_id, timestamp, balance) VALUES (?1, ?2, ?3)",
            params![simulation_id, rfc3339(timestamp), balance],
        )?;
        Ok(())
    }
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
