//! SQLite-backed implementation of the core store accessor

use rusqlite::{Connection, OptionalExtension, Row};
use tracing::error;

use scldoc_core::{AttrFilter, Record, StoreAccessor};

use crate::db;
use crate::errors::{from_rusqlite, Result};

/// A document record table persisted in SQLite
///
/// Owns its connection. `transaction` maps directly onto BEGIN IMMEDIATE /
/// COMMIT / ROLLBACK, so every commit the engine performs is a real
/// database transaction.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (and bootstrap) a store at the given path
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::from_connection(db::open(path)?)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        db::configure(&conn)?;
        db::bootstrap(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Total number of persisted records
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .map_err(from_rusqlite)?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn upsert(&self, record: &Record) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO records (id, tag_name, namespace, attributes, value, parent, children)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                    tag_name = excluded.tag_name,
                    namespace = excluded.namespace,
                    attributes = excluded.attributes,
                    value = excluded.value,
                    parent = excluded.parent,
                    children = excluded.children",
                record_params(record)?,
            )
            .map_err(from_rusqlite)?;
        Ok(())
    }
}

/// Hydrate a record from its row
///
/// Column order must match the SELECT lists below.
fn record_from_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    let namespace: Option<String> = row.get(2)?;
    let attributes: String = row.get(3)?;
    let parent: Option<String> = row.get(5)?;
    let children: String = row.get(6)?;

    let parse = |idx: usize, e: serde_json::Error| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    };

    Ok(Record {
        id: row.get(0)?,
        tag_name: row.get(1)?,
        namespace: namespace
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| parse(2, e))?,
        attributes: serde_json::from_str(&attributes).map_err(|e| parse(3, e))?,
        value: row.get(4)?,
        parent: parent
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| parse(5, e))?,
        children: serde_json::from_str(&children).map_err(|e| parse(6, e))?,
    })
}

fn record_params(record: &Record) -> Result<[rusqlite::types::Value; 7]> {
    use rusqlite::types::Value;
    Ok([
        Value::Text(record.id.clone()),
        Value::Text(record.tag_name.clone()),
        match &record.namespace {
            Some(ns) => Value::Text(serde_json::to_string(ns)?),
            None => Value::Null,
        },
        Value::Text(serde_json::to_string(&record.attributes)?),
        Value::Text(record.value.clone()),
        match &record.parent {
            Some(rel) => Value::Text(serde_json::to_string(rel)?),
            None => Value::Null,
        },
        Value::Text(serde_json::to_string(&record.children)?),
    ])
}

const COLUMNS: &str = "id, tag_name, namespace, attributes, value, parent, children";

impl StoreAccessor for SqliteStore {
    fn get(&self, tag_name: &str, id: &str) -> Result<Option<Record>> {
        self.conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM records WHERE id = ?1 AND tag_name = ?2"),
                rusqlite::params![id, tag_name],
                record_from_row,
            )
            .optional()
            .map_err(from_rusqlite)
    }

    fn scan(&self, tag_name: &str, equals: Option<&AttrFilter>) -> Result<Vec<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM records WHERE tag_name = ?1 ORDER BY rowid"
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([tag_name], record_from_row)
            .map_err(from_rusqlite)?;

        let mut out = Vec::new();
        for row in rows {
            let record = row.map_err(from_rusqlite)?;
            if equals.map(|f| f.matches(&record)).unwrap_or(true) {
                out.push(record);
            }
        }
        Ok(out)
    }

    fn bulk_add(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            self.conn
                .execute(
                    &format!(
                        "INSERT INTO records ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                    ),
                    record_params(record)?,
                )
                .map_err(from_rusqlite)?;
        }
        Ok(())
    }

    fn bulk_put(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            self.upsert(record)?;
        }
        Ok(())
    }

    fn bulk_delete(&mut self, ids: &[String]) -> Result<()> {
        for id in ids {
            self.conn
                .execute("DELETE FROM records WHERE id = ?1", [id])
                .map_err(from_rusqlite)?;
        }
        Ok(())
    }

    fn transaction(
        &mut self,
        f: &mut dyn FnMut(&mut dyn StoreAccessor) -> Result<()>,
    ) -> Result<()> {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(from_rusqlite)?;
        match f(self) {
            Ok(()) => self.conn.execute_batch("COMMIT").map_err(from_rusqlite),
            Err(err) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    error!(error = %rollback, "rollback failed after write error");
                }
                Err(err)
            }
        }
    }
}
