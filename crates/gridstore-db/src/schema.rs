//! Database lifecycle: create the file, drop everything, apply DDL.

use std::fs;
use std::path::{Path, PathBuf};

use gridstore_core::{GridError, GridResult};
use tracing::{debug, info};

use crate::Store;

/// DDL bundled with the crate.
pub const DEFAULT_SCHEMA: &str = include_str!("../sql/schema.sql");

/// Schema management for a store.
pub trait SchemaStore: Sized {
    /// Create the database at `path`, creating missing parent directories.
    fn create(path: &Path) -> GridResult<Self>;

    /// Drop every table, index, trigger and view.
    fn clear(&self) -> GridResult<()>;

    /// Execute one DDL script.
    fn apply(&self, ddl: &str) -> GridResult<()>;

    /// Execute DDL scripts in order.
    fn apply_files(&self, paths: &[PathBuf]) -> GridResult<()> {
        for path in paths {
            let ddl = fs::read_to_string(path).map_err(|err| {
                GridError::Config(format!("reading DDL script {}: {}", path.display(), err))
            })?;
            self.apply(&ddl)?;
            info!(script = %path.display(), "applied DDL script");
        }
        Ok(())
    }

    fn apply_default(&self) -> GridResult<()> {
        self.apply(DEFAULT_SCHEMA)
    }
}

impl SchemaStore for Store {
    fn create(path: &Path) -> GridResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Store::open(path)
    }

    fn clear(&self) -> GridResult<()> {
        let objects: Vec<(String, String)> = {
            let mut stmt = self.conn.prepare(
                "SELECT type, name FROM sqlite_master
                 WHERE type IN ('table', 'view', 'trigger') AND name NOT LIKE 'sqlite_%'",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect::<Result<_, _>>()?
        };

        self.conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        for (kind, name) in &objects {
            debug!(kind = %kind, name = %name, "dropping");
            self.conn
                .execute_batch(&format!("DROP {} IF EXISTS \"{}\";", kind.to_uppercase(), name))?;
        }
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }

    fn apply(&self, ddl: &str) -> GridResult<()> {
        self.conn.execute_batch(ddl)?;
        Ok(())
    }
}
