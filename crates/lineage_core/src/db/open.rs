//! Connection bootstrap for the members database.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::{DbError, DbResult, DbTarget};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating when missing) a members database file.
///
/// Emits `db_open` events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_target(DbTarget::File(path.as_ref().to_path_buf()))
}

/// Opens a throwaway in-memory members database.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_target(DbTarget::Memory)
}

fn open_target(target: DbTarget) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = target.mode();
    info!("event=db_open module=db status=start mode={mode}");

    let result = connect(&target).and_then(|mut conn| {
        apply_migrations(&mut conn)?;
        Ok(conn)
    });
    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}

fn connect(target: &DbTarget) -> DbResult<Connection> {
    let configured = match target {
        DbTarget::File(path) => Connection::open(path),
        DbTarget::Memory => Connection::open_in_memory(),
    }
    .and_then(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    });
    configured.map_err(|source| DbError::Open {
        target: target.clone(),
        source,
    })
}
