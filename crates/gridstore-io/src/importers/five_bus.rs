//! 5-bus style datasets.
//!
//! Network tables use space-separated headers and a single continuous
//! branch rating. Load tables carry a `DateTime` column and one column per
//! bus name after the marker column. This family has no generator or
//! investment tables.

use anyhow::{Context, Result};
use gridstore_core::{EntityId, GridError, GridResult};
use gridstore_db::Store;
use gridstore_ts::{SeriesSpec, TimeAxis};
use tracing::info;

use super::common::{self, BranchRatings};
use super::{phase, Ingest, IngestReport};
use crate::columns::BusColumns;
use crate::config::IngestConfig;
use crate::locate::DirectoryTree;
use crate::table::CsvTable;

/// Run every 5-bus phase against a prepared store.
pub fn ingest(store: &Store, tree: &DirectoryTree, config: &IngestConfig) -> Result<IngestReport> {
    let mut ingest = Ingest::new(store, tree, config);
    let files = &config.five_bus;

    let buses = ingest.table(&files.bus_file)?;
    let branches = ingest.table(&files.branch_file)?;

    common::insert_regions(&mut ingest, &buses, &BusColumns::FIVE_BUS).context("regions phase")?;
    common::insert_buses(&mut ingest, &buses, &BusColumns::FIVE_BUS).context("buses phase")?;
    common::insert_branches(&mut ingest, &branches, BranchRatings::ContinuousOnly)
        .context("branches phase")?;
    common::insert_interchanges(&mut ingest, &buses, &BusColumns::FIVE_BUS, &branches)
        .context("interchanges phase")?;

    if files.include_loads {
        insert_loads(&mut ingest).context("loads phase")?;
    } else {
        info!("load ingestion disabled");
    }

    Ok(ingest.finish())
}

fn datetime_axis(table: &CsvTable, column: &str) -> Result<TimeAxis> {
    let cells = table.text_column(column)?;
    TimeAxis::from_datetimes(&cells).with_context(|| format!("time axis of {}", table.name()))
}

/// Bus load series, owned by the bus named in each column header.
fn insert_loads(ingest: &mut Ingest<'_>) -> Result<()> {
    let config = ingest.config;
    let files = &config.five_bus;
    let store = ingest.store;
    let bus_owner = |name: &str| -> GridResult<EntityId> {
        store
            .bus_entity_by_name(name)?
            .ok_or_else(|| GridError::unresolved("balancing_topologies", name))
    };

    let day_ahead = ingest.table(&files.day_ahead_load_file)?;
    let axis = datetime_axis(&day_ahead, &files.datetime_column)?;
    let spec = SeriesSpec::day_ahead("DA Load")
        .with_length_rule(config.series.day_ahead_length)
        .with_unit(&config.series.unit);
    let mut written = common::insert_load_series(
        ingest,
        &day_ahead,
        &axis,
        &spec,
        &files.marker_column,
        bus_owner,
    )?;

    let real_time = ingest.table(&files.real_time_load_file)?;
    let axis = datetime_axis(&real_time, &files.datetime_column)?;
    let spec = SeriesSpec::real_time("RT Load").with_unit(&config.series.unit);
    written += common::insert_load_series(
        ingest,
        &real_time,
        &axis,
        &spec,
        &files.marker_column,
        bus_owner,
    )?;

    info!(series = written, "bus loads materialized");
    ingest.record(phase::LOADS, written);
    Ok(())
}
