//! Database connection management
//!
//! Provides utilities for opening connections and bootstrapping the
//! record table schema

use std::path::Path;

use rusqlite::Connection;

use crate::errors::{from_rusqlite, Result};

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection with optimal settings
pub fn configure(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .map_err(from_rusqlite)?;

    // WAL mode for better concurrency
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(from_rusqlite)?;

    Ok(())
}

/// Create the record table and its indexes when absent
///
/// One row per record; namespace, attributes, and child/parent links are
/// stored as JSON documents. Rowid order is the stable storage order the
/// accessor contract requires (upserts keep the original rowid).
pub fn bootstrap(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS records (
            id          TEXT PRIMARY KEY,
            tag_name    TEXT NOT NULL,
            namespace   TEXT,
            attributes  TEXT NOT NULL DEFAULT '[]',
            value       TEXT NOT NULL DEFAULT '',
            parent      TEXT,
            children    TEXT NOT NULL DEFAULT '[]'
        );
        CREATE INDEX IF NOT EXISTS idx_records_tag ON records (tag_name);",
    )
    .map_err(from_rusqlite)
}
