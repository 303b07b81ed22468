//! Schema versions, tracked in `PRAGMA user_version`.

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

const CURRENT_VERSION: u32 = 1;

/// Bring the schema up to [`CURRENT_VERSION`].
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if found > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "schema version {found} is newer than this build supports ({CURRENT_VERSION})"
        )));
    }
    if found == CURRENT_VERSION {
        return Ok(());
    }

    tracing::info!(from = found, to = CURRENT_VERSION, "Upgrading local store");

    if found < 1 {
        v001_initial::up(conn).map_err(|e| StoreError::Migration(format!("v001: {e}")))?;
        conn.pragma_update(None, "user_version", 1)?;
    }

    Ok(())
}
