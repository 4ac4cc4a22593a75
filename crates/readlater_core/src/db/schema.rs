//! Layout of the `kv_entries` table.
//!
//! The table is the whole schema: one row per storage key. Item records live
//! inside the JSON value and are not versioned here.

use super::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Value of `PRAGMA user_version` for a file created by this build.
pub const SCHEMA_VERSION: u32 = 1;

const CREATE_KV_ENTRIES: &str = "
CREATE TABLE IF NOT EXISTS kv_entries (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
);";

/// Creates the table on a fresh file and refuses files from newer builds.
pub(super) fn ensure(conn: &Connection) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if found > SCHEMA_VERSION {
        return Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    if found == SCHEMA_VERSION {
        return Ok(());
    }

    conn.execute_batch(&format!(
        "BEGIN;{CREATE_KV_ENTRIES}PRAGMA user_version = {SCHEMA_VERSION};COMMIT;"
    ))?;
    info!("event=db_schema module=db status=ok from_version={found} to_version={SCHEMA_VERSION}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure, SCHEMA_VERSION};
    use rusqlite::Connection;

    #[test]
    fn ensure_is_a_no_op_on_current_files() {
        let conn = Connection::open_in_memory().unwrap();
        ensure(&conn).unwrap();
        conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES ('items', '[]');",
            [],
        )
        .unwrap();

        ensure(&conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
