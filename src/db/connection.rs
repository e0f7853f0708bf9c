//! SQLite connection management for msgstore.db.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::error::{Error, Result};

/// Tables the rest of the pipeline depends on.
const REQUIRED_TABLES: [&str; 3] = ["chat", "message", "jid"];

/// Open a read-only connection to a message store and verify its schema.
///
/// Read-only open flags guarantee no writes are ever issued against the
/// source database. A missing file, a non-SQLite file or a database without
/// the expected tables all fail up front, before any model is built.
pub fn open_store(path: &Path) -> Result<Connection> {
    if !path.exists() {
        return Err(Error::StoreMissing {
            path: path.to_path_buf(),
        });
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|source| Error::StoreUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    verify_schema(&conn, path)?;
    Ok(conn)
}

fn verify_schema(conn: &Connection, path: &Path) -> Result<()> {
    for table in REQUIRED_TABLES {
        let found: std::result::Result<i64, rusqlite::Error> = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        );
        match found {
            Ok(n) if n > 0 => {}
            Ok(_) => {
                return Err(Error::SchemaMismatch {
                    path: path.to_path_buf(),
                    table: table.to_string(),
                })
            }
            // A corrupt or non-SQLite file surfaces here on the first query.
            Err(source) => {
                return Err(Error::StoreUnreadable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
    Ok(())
}
