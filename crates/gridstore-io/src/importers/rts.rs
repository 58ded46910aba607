//! RTS-GMLC style datasets.
//!
//! Source files are found by name anywhere under the source root. Wide
//! profile tables use `Year, Month, Day, Period` time axes: hourly for
//! day-ahead, five-minute for real-time.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use gridstore_core::{
    generator, AttributeValue, EntityId, EntityType, GeneratorKind, GenerationUnit, GigawattHours,
    GridError, GridResult, NaturalKey, OperationalData, Percent, PiecewiseLinear, PrimeMover,
    ProfileSource, StorageParams, StorageUnit, ThermalParams,
};
use gridstore_db::Store;
use gridstore_ts::{materialize_column, SeriesSpec, TimeAxis};
use tracing::{debug, info};

use super::common::{self, BranchRatings};
use super::{phase, supply_curves, Ingest, IngestReport};
use crate::columns::{generator as col, storage, BusColumns};
use crate::config::IngestConfig;
use crate::locate::DirectoryTree;
use crate::table::{CsvTable, Row};

const DAY_AHEAD_MINUTES: i64 = 60;
const REAL_TIME_MINUTES: i64 = 5;

/// Run every RTS phase against a prepared store.
pub fn ingest(store: &Store, tree: &DirectoryTree, config: &IngestConfig) -> Result<IngestReport> {
    let mut ingest = Ingest::new(store, tree, config);
    let files = &config.rts;

    let buses = ingest.table(&files.bus_file)?;
    let branches = ingest.table(&files.branch_file)?;

    common::insert_regions(&mut ingest, &buses, &BusColumns::RTS).context("regions phase")?;
    common::insert_buses(&mut ingest, &buses, &BusColumns::RTS).context("buses phase")?;
    common::insert_branches(&mut ingest, &branches, BranchRatings::Separate)
        .context("branches phase")?;
    common::insert_interchanges(&mut ingest, &buses, &BusColumns::RTS, &branches)
        .context("interchanges phase")?;
    insert_generation(&mut ingest).context("generation phase")?;
    insert_loads(&mut ingest).context("loads phase")?;
    supply_curves::insert_investment_options(&mut ingest, &buses).context("investment phase")?;

    Ok(ingest.finish())
}

/// Day-ahead and real-time tables of one profile source.
struct Profiles {
    day_ahead: CsvTable,
    day_ahead_axis: TimeAxis,
    real_time: CsvTable,
    real_time_axis: TimeAxis,
}

/// Profile tables read on first use.
#[derive(Default)]
struct ProfileCache {
    loaded: HashMap<ProfileSource, Profiles>,
}

impl ProfileCache {
    fn get(&mut self, ingest: &Ingest<'_>, source: ProfileSource) -> Result<&Profiles> {
        if !self.loaded.contains_key(&source) {
            let day_ahead = ingest.table(&source.day_ahead_file())?;
            let real_time = ingest.table(&source.real_time_file())?;
            let profiles = Profiles {
                day_ahead_axis: common::period_axis(&day_ahead, DAY_AHEAD_MINUTES)
                    .with_context(|| format!("time axis of {}", day_ahead.name()))?,
                real_time_axis: common::period_axis(&real_time, REAL_TIME_MINUTES)
                    .with_context(|| format!("time axis of {}", real_time.name()))?,
                day_ahead,
                real_time,
            };
            self.loaded.insert(source, profiles);
        }
        self.loaded
            .get(&source)
            .ok_or_else(|| anyhow::anyhow!("profile {:?} not loaded", source))
    }
}

/// Write the `DA Generation` and `RT Generation` series of unit `uid`.
fn insert_generation_series(
    ingest: &mut Ingest<'_>,
    profiles: &Profiles,
    uid: &str,
    owner: EntityId,
) -> Result<()> {
    let config = ingest.config;
    let unit = &config.series.unit;
    let marker = &config.rts.marker_column;

    for (table, axis, spec) in [
        (
            &profiles.day_ahead,
            &profiles.day_ahead_axis,
            SeriesSpec::day_ahead("DA Generation").with_unit(unit),
        ),
        (
            &profiles.real_time,
            &profiles.real_time_axis,
            SeriesSpec::real_time("RT Generation").with_unit(unit),
        ),
    ] {
        let index = table.column_index(uid)?;
        if index <= table.column_index(marker)? {
            return Err(GridError::missing_column(table.name(), uid).into());
        }
        let values = table.numeric_column(index)?;
        materialize_column(ingest.store, &spec, axis, &values, owner)
            .with_context(|| format!("'{}' of {}", spec.name, uid))?;
    }
    ingest.record(phase::TIME_SERIES, 2);
    Ok(())
}

/// Fuels and mapped prime movers, each once in first-seen order.
fn insert_reference_tables(ingest: &mut Ingest<'_>, capacity: &CsvTable) -> Result<()> {
    let mut fuels = Vec::new();
    let mut movers = Vec::new();
    let mut seen_fuels = HashSet::new();
    let mut seen_movers = HashSet::new();
    for row in capacity.rows() {
        let fuel = row.text(col::FUEL)?;
        if seen_fuels.insert(fuel) {
            fuels.push(fuel);
        }
        let mover = PrimeMover::from_unit_type(row.text(col::UNIT_TYPE)?);
        if seen_movers.insert(mover) {
            movers.push(mover);
        }
    }

    for fuel in &fuels {
        ingest.store.insert_fuel(fuel, None)?;
    }
    for mover in &movers {
        ingest.store.insert_prime_mover(&mover.code(), None)?;
    }
    ingest.record(phase::REFERENCE, fuels.len() + movers.len());
    Ok(())
}

fn thermal_params(row: &Row<'_>, cap: f64) -> GridResult<ThermalParams> {
    let mut params = ThermalParams {
        pmin: row.maybe_f64(col::PMIN)?.unwrap_or(0.0),
        min_up_hours: row.maybe_f64(col::MIN_UP)?.unwrap_or(0.0),
        min_down_hours: row.maybe_f64(col::MIN_DOWN)?.unwrap_or(0.0),
        ramp_rate: row.maybe_f64(col::RAMP_RATE)?.unwrap_or(0.0),
        start_cost: row.maybe_f64(col::START_COST)?,
        start_heat: row.maybe_f64(col::START_HEAT)?,
        forced_outage_rate: row.maybe_f64(col::FOR)?,
        mttr_hours: row.maybe_f64(col::MTTR)?,
        co2_lbs_per_mmbtu: row.maybe_f64(col::CO2)?,
        ..Default::default()
    };
    params.heat_rate.cap = cap;
    params.heat_rate.heat_rate = row.maybe_f64(col::HEAT_RATE)?;
    for (slot, column) in params.heat_rate.output_pct.iter_mut().zip(col::OUTPUT_PCT) {
        *slot = row.maybe_f64(column)?;
    }
    for (slot, column) in params.heat_rate.incremental.iter_mut().zip(col::HR_INCR) {
        *slot = row.maybe_f64(column)?;
    }
    Ok(params)
}

/// Per-row fields every generator kind needs.
struct UnitRow<'a> {
    uid: &'a str,
    fuel: &'a str,
    unit_type: &'a str,
    bus_name: String,
    cap: f64,
    rating: f64,
}

impl UnitRow<'_> {
    fn generation_unit(&self) -> GenerationUnit {
        GenerationUnit {
            name: self.uid.to_string(),
            prime_mover: PrimeMover::from_unit_type(self.unit_type).code(),
            fuel: Some(self.fuel.to_string()),
            balancing_topology: self.bus_name.clone(),
            rating: self.rating,
            base_power: self.cap,
        }
    }
}

fn insert_thermal(
    ingest: &mut Ingest<'_>,
    unit: &UnitRow<'_>,
    params: &ThermalParams,
) -> Result<EntityId> {
    let store = ingest.store;
    let inserted = store.insert_generation_unit(&unit.generation_unit())?;

    store.insert_operational_data(&OperationalData {
        entity: inserted.entity,
        active_power_limit_min: params.pmin,
        must_run: generator::must_run(unit.fuel),
        uptime: params.min_up_hours,
        downtime: params.min_down_hours,
        ramp_up: params.ramp_rate,
        ramp_down: params.ramp_rate,
        operational_cost: Some(generator::operational_cost(unit.fuel, params)),
    })?;

    if let Some(curve) = PiecewiseLinear::heat_rate(&params.heat_rate) {
        store.bind(
            EntityType::GenerationUnits,
            "Heat Rate",
            &curve.to_attribute()?,
            inserted.entity,
        )?;
    }
    store.bind(
        EntityType::GenerationUnits,
        "Outage Rate",
        &AttributeValue::from(params.forced_outage_rate),
        inserted.entity,
    )?;
    store.bind(
        EntityType::GenerationUnits,
        "MTTR",
        &AttributeValue::from(params.mttr_hours),
        inserted.entity,
    )?;
    store.bind_supplemental(
        "CO2 Emissions",
        &AttributeValue::from(params.co2_lbs_per_mmbtu),
        inserted.entity,
    )?;
    Ok(inserted.entity)
}

fn insert_storage(
    ingest: &mut Ingest<'_>,
    unit: &UnitRow<'_>,
    params: &StorageParams,
) -> Result<EntityId> {
    let efficiency = params.efficiency();
    let inserted = ingest.store.insert_storage_unit(&StorageUnit {
        name: unit.uid.to_string(),
        prime_mover: PrimeMover::from_unit_type(unit.unit_type).code(),
        max_capacity: params.max_capacity().0,
        balancing_topology: unit.bus_name.clone(),
        efficiency_up: efficiency,
        efficiency_down: efficiency,
        rating: unit.rating,
        base_power: unit.cap,
    })?;
    Ok(inserted.entity)
}

fn insert_generation(ingest: &mut Ingest<'_>) -> Result<()> {
    let capacity = ingest.table(&ingest.config.rts.generator_file)?;
    let storage_table = ingest.table(&ingest.config.rts.storage_file)?;
    capacity.require_columns(&[
        col::GEN_UID,
        col::BUS_ID,
        col::FUEL,
        col::UNIT_TYPE,
        col::CAP,
        col::MVAR_INJ,
    ])?;

    let storage_volumes = storage_table
        .rows()
        .map(|row| Ok((row.text(storage::GEN_UID)?, row.f64(storage::MAX_VOLUME)?)))
        .collect::<GridResult<HashMap<_, _>>>()?;

    insert_reference_tables(ingest, &capacity)?;

    let mut profiles = ProfileCache::default();
    let mut written = 0;
    for row in capacity.rows() {
        let uid = row.text(col::GEN_UID)?;
        let fuel = row.text(col::FUEL)?;
        let unit_type = row.text(col::UNIT_TYPE)?;
        let cap = row.f64(col::CAP)?;
        let bus_id = row.i64(col::BUS_ID)?;

        let storage = match storage_volumes.get(uid) {
            Some(&volume) => Some(StorageParams {
                max_volume: GigawattHours(volume),
                roundtrip_efficiency: Percent(row.f64(col::ROUNDTRIP_EFFICIENCY)?),
                profile: None,
            }),
            None => None,
        };
        let kind = GeneratorKind::classify(fuel, unit_type, storage, || thermal_params(&row, cap))
            .with_context(|| format!("classifying {}", uid))?;

        if let GeneratorKind::Unsupported { unit_type } = &kind {
            ingest.skip(
                "unsupported",
                &format!("solar unit type '{}' has no profile source, unit skipped", unit_type),
                uid,
            );
            continue;
        }

        let bus_name = ingest
            .store
            .bus_name(bus_id)?
            .ok_or_else(|| GridError::unresolved(EntityType::BalancingTopologies.table_name(), bus_id))
            .with_context(|| format!("bus of generator {}", uid))?;
        let unit = UnitRow {
            uid,
            fuel,
            unit_type,
            bus_name,
            cap,
            rating: generator::unit_rating(cap, row.f64(col::MVAR_INJ)?),
        };

        let owner = match &kind {
            GeneratorKind::Storage(params) => insert_storage(ingest, &unit, params),
            GeneratorKind::Thermal(params) => insert_thermal(ingest, &unit, params),
            GeneratorKind::Hydro => {
                let inserted = ingest.store.insert_generation_unit(&unit.generation_unit())?;
                let reservoir = ingest.store.insert_hydro_reservoir(uid)?;
                ingest.store.connect_hydro_reservoir(inserted.id, reservoir)?;
                Ok(inserted.entity)
            }
            _ => Ok(ingest.store.insert_generation_unit(&unit.generation_unit())?.entity),
        }
        .with_context(|| format!("inserting {} unit {}", kind.label(), uid))?;

        if let Some(source) = kind.profile() {
            let tables = profiles.get(ingest, source)?;
            insert_generation_series(ingest, tables, uid, owner)?;
        }
        debug!(uid, kind = kind.label(), "inserted generator");
        written += 1;
    }
    ingest.record(phase::GENERATION, written);
    Ok(())
}

fn insert_loads(ingest: &mut Ingest<'_>) -> Result<()> {
    let config = ingest.config;
    let store = ingest.store;
    let region_owner = |key: &str| -> GridResult<EntityId> {
        let area: i64 = key
            .parse()
            .map_err(|_| GridError::Parse(format!("load column '{}' is not an area code", key)))?;
        store.require(EntityType::PlanningRegions, &NaturalKey::Int(area))
    };

    let day_ahead = ingest.table(&config.rts.day_ahead_load_file)?;
    let axis = common::period_axis(&day_ahead, DAY_AHEAD_MINUTES)?;
    let spec = SeriesSpec::day_ahead("DA Load")
        .with_length_rule(config.series.day_ahead_length)
        .with_unit(&config.series.unit);
    let mut written = common::insert_load_series(
        ingest,
        &day_ahead,
        &axis,
        &spec,
        &config.rts.marker_column,
        region_owner,
    )?;

    let real_time = ingest.table(&config.rts.real_time_load_file)?;
    let axis = common::period_axis(&real_time, REAL_TIME_MINUTES)?;
    let spec = SeriesSpec::real_time("RT Load").with_unit(&config.series.unit);
    written += common::insert_load_series(
        ingest,
        &real_time,
        &axis,
        &spec,
        &config.rts.marker_column,
        region_owner,
    )?;

    info!(series = written, "region loads materialized");
    ingest.record(phase::LOADS, written);
    Ok(())
}
