//! # gridstore-db: relational store for the entity graph
//!
//! A thin layer over one SQLite connection. Each operation is a single
//! autocommitted statement (or a pair of dependent statements), so a run that
//! fails halfway leaves every row written before the failure in place.
//!
//! - [`schema`]: create, clear and apply DDL scripts ([`SchemaStore`])
//! - [`writer`]: typed inserts, one per record kind
//! - [`resolver`]: natural-key to entity-id lookups
//! - [`attributes`]: attribute and supplemental-attribute binding
//! - [`timeseries`]: time-series headers, associations and points
//!
//! ```
//! use gridstore_core::{EntityType, NaturalKey, PlanningRegion};
//! use gridstore_db::{SchemaStore, Store};
//!
//! let store = Store::open_in_memory().unwrap();
//! store.apply_default().unwrap();
//!
//! let region = store.insert_planning_region(&PlanningRegion::for_area(1)).unwrap();
//! let found = store.resolve(EntityType::PlanningRegions, &NaturalKey::from(1)).unwrap();
//! assert_eq!(found, Some(region.entity));
//! ```

use std::path::Path;

use gridstore_core::{GridError, GridResult, NaturalKey};
use rusqlite::types::Value;
use rusqlite::Connection;

pub mod attributes;
pub mod resolver;
pub mod schema;
pub mod timeseries;
pub mod writer;

pub use schema::{SchemaStore, DEFAULT_SCHEMA};
pub use writer::Inserted;

/// Handle to an ingestion database.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> GridResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> GridResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> GridResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Underlying connection, for read-back queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Number of rows in `table`.
    ///
    /// The name is checked against the tables present in the database.
    pub fn row_count(&self, table: &str) -> GridResult<i64> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            [table],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(GridError::Store(format!("no such table: {}", table)));
        }
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", table);
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }
}

pub(crate) fn key_value(key: &NaturalKey) -> Value {
    match key {
        NaturalKey::Int(v) => Value::Integer(*v),
        NaturalKey::Text(s) => Value::Text(s.clone()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store.apply_default().unwrap();
        store
    }
}
