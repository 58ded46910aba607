//! # gridstore-io: dataset ingestion
//!
//! Reads power system datasets from a directory tree of CSV files and writes
//! them into a gridstore database.
//!
//! ## Dataset families
//!
//! | Family | Network | Generation | Loads | Investment |
//! |--------|---------|------------|-------|------------|
//! | RTS-GMLC | buses, branches, interchanges | thermal, renewable, hydro, storage | per region | solar and wind supply curves |
//! | 5-bus | buses, branches, interchanges | none | per bus | none |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use gridstore_io::{ingest_rts, IngestConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::load(None)?;
//!     let report = ingest_rts(Path::new("rts.db"), Path::new("RTS-GMLC"), &[], &config)?;
//!     println!("{} rows, {}", report.counts.total(), report.diagnostics.summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`locate`]: finds source files by name under a root directory
//! - [`table`]: header-indexed CSV tables with blank-aware numeric cells
//! - [`columns`]: column names of the supported source tables
//! - [`config`]: file names, series options and investment settings
//! - [`importers`]: the per-family phase sequences

pub mod columns;
pub mod config;
pub mod importers;
pub mod locate;
pub mod table;

pub use config::IngestConfig;
pub use importers::{ingest_five_bus, ingest_rts, prepare_store, IngestReport};
pub use locate::DirectoryTree;
pub use table::CsvTable;
