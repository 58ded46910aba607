//! Dataset importers.
//!
//! Each dataset family runs a fixed sequence of phases against one store:
//! regions, buses, branches, interchanges, then generation, loads and
//! investment options where the family has them. A phase reads its source
//! tables through the [`DirectoryTree`], transforms rows in memory and writes
//! them one statement at a time.
//!
//! Errors stop the run at the failing row. Rows committed before it stay in
//! the store.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gridstore_core::{Diagnostics, PhaseCounts};
use gridstore_db::{SchemaStore, Store};
use serde::Serialize;
use tracing::info;

use crate::config::IngestConfig;
use crate::locate::DirectoryTree;
use crate::table::CsvTable;

mod common;
pub mod five_bus;
pub mod rts;
mod supply_curves;

/// What one ingestion run wrote.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Rows written per phase
    pub counts: PhaseCounts,
    /// Skipped rows and other non-fatal findings
    pub diagnostics: Diagnostics,
}

impl IngestReport {
    pub fn rows(&self, phase: &str) -> usize {
        self.counts.get(phase)
    }
}

/// Phase names used in [`IngestReport::counts`].
pub mod phase {
    pub const REGIONS: &str = "regions";
    pub const BUSES: &str = "buses";
    pub const BRANCHES: &str = "branches";
    pub const INTERCHANGES: &str = "interchanges";
    pub const REFERENCE: &str = "reference";
    pub const GENERATION: &str = "generation";
    pub const LOADS: &str = "loads";
    pub const INVESTMENT: &str = "investment";
    pub const TIME_SERIES: &str = "time_series";
}

/// Create the database at `db_path`, clear it and apply the DDL scripts.
///
/// An empty `ddl_paths` applies the bundled schema.
pub fn prepare_store(db_path: &Path, ddl_paths: &[PathBuf]) -> Result<Store> {
    let store = Store::create(db_path)
        .with_context(|| format!("creating database {}", db_path.display()))?;
    store.clear().context("clearing database")?;
    if ddl_paths.is_empty() {
        store.apply_default().context("applying bundled schema")?;
    } else {
        store.apply_files(ddl_paths).context("applying schema files")?;
    }
    Ok(store)
}

/// Ingest an RTS-style dataset found under `source_root` into a fresh database.
pub fn ingest_rts(
    db_path: &Path,
    source_root: &Path,
    ddl_paths: &[PathBuf],
    config: &IngestConfig,
) -> Result<IngestReport> {
    let store = prepare_store(db_path, ddl_paths)?;
    let tree = DirectoryTree::scan(source_root)
        .with_context(|| format!("scanning {}", source_root.display()))?;
    rts::ingest(&store, &tree, config)
}

/// Ingest a 5-bus-style dataset found under `source_root` into a fresh database.
pub fn ingest_five_bus(
    db_path: &Path,
    source_root: &Path,
    ddl_paths: &[PathBuf],
    config: &IngestConfig,
) -> Result<IngestReport> {
    let store = prepare_store(db_path, ddl_paths)?;
    let tree = DirectoryTree::scan(source_root)
        .with_context(|| format!("scanning {}", source_root.display()))?;
    five_bus::ingest(&store, &tree, config)
}

/// State shared by the phases of one run.
pub(crate) struct Ingest<'a> {
    pub store: &'a Store,
    pub tree: &'a DirectoryTree,
    pub config: &'a IngestConfig,
    pub report: IngestReport,
}

impl<'a> Ingest<'a> {
    pub fn new(store: &'a Store, tree: &'a DirectoryTree, config: &'a IngestConfig) -> Self {
        Self {
            store,
            tree,
            config,
            report: IngestReport::default(),
        }
    }

    /// Locate and read a source table.
    pub fn table(&self, name: &str) -> Result<CsvTable> {
        let path = self.tree.require(name)?;
        CsvTable::read(&path).with_context(|| format!("reading {}", path.display()))
    }

    /// Like [`table`](Self::table), `None` when the file is absent.
    pub fn optional_table(&self, name: &str) -> Result<Option<CsvTable>> {
        match self.tree.locate(name) {
            Some(path) => CsvTable::read(path)
                .map(Some)
                .with_context(|| format!("reading {}", path.display())),
            None => Ok(None),
        }
    }

    pub fn record(&mut self, phase: &str, rows: usize) {
        info!(phase, rows, "phase complete");
        self.report.counts.record(phase, rows);
    }

    pub fn skip(&mut self, category: &str, message: &str, entity: &str) {
        tracing::warn!(category, entity, "{}", message);
        self.report
            .diagnostics
            .add_warning_with_entity(category, message, entity);
    }

    pub fn finish(self) -> IngestReport {
        info!(
            rows = self.report.counts.total(),
            diagnostics = %self.report.diagnostics.summary(),
            "ingestion finished"
        );
        self.report
    }
}
