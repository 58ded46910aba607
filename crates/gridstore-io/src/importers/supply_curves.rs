//! Investment options from reV-style supply curve tables.
//!
//! Each technology gets one supply technology record. Supply curve rows are
//! grouped by `(region, class)`; groups whose region is a balancing
//! authority listed in the bus table produce, for every bus of that
//! authority, a supply curve, a reinforcement curve and an availability
//! series bound to the technology.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use gridstore_core::{EntityType, GridResult, PiecewiseLinear, PrimeMover, SupplyTechnology};
use gridstore_ts::{materialize_column, SeriesSpec, TimeAxis};
use tracing::debug;

use super::{phase, Ingest};
use crate::columns::{bus, supply_curve as col, BusColumns};
use crate::table::CsvTable;

/// A technology with its own supply curve and availability files.
struct Technology<'a> {
    /// Label used in series names
    label: &'static str,
    unit_type: &'static str,
    fuel: &'static str,
    curve_file: &'a str,
    availability_file: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CurveRow {
    capacity: f64,
    cost: f64,
    distance: f64,
    reinforcement: f64,
}

/// Buses of each balancing authority, in bus table order.
fn buses_by_authority(buses: &CsvTable) -> GridResult<BTreeMap<String, Vec<i64>>> {
    let id_column = BusColumns::RTS.id;
    let mut authorities: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for row in buses.rows() {
        if let Some(ba) = row.opt_text(bus::BA) {
            authorities
                .entry(ba.to_string())
                .or_default()
                .push(row.i64(id_column)?);
        }
    }
    Ok(authorities)
}

/// Curve rows grouped by `(region, class)`, known regions only, each group
/// sorted by capacity.
fn grouped_curves(
    table: &CsvTable,
    authorities: &BTreeMap<String, Vec<i64>>,
) -> GridResult<BTreeMap<(String, String), Vec<CurveRow>>> {
    table.require_columns(&[
        col::REGION,
        col::CLASS,
        col::CAPACITY,
        col::COST,
        col::DISTANCE,
        col::REINFORCEMENT,
    ])?;

    let mut groups: BTreeMap<(String, String), Vec<CurveRow>> = BTreeMap::new();
    for row in table.rows() {
        let region = row.text(col::REGION)?;
        if !authorities.contains_key(region) {
            continue;
        }
        groups
            .entry((region.to_string(), row.text(col::CLASS)?.to_string()))
            .or_default()
            .push(CurveRow {
                capacity: row.f64(col::CAPACITY)?,
                cost: row.f64(col::COST)?,
                distance: row.f64(col::DISTANCE)?,
                reinforcement: row.f64(col::REINFORCEMENT)?,
            });
    }
    for rows in groups.values_mut() {
        rows.sort_by(|a, b| a.capacity.total_cmp(&b.capacity));
    }
    Ok(groups)
}

fn insert_technology(
    ingest: &mut Ingest<'_>,
    tech: &Technology<'_>,
    authorities: &BTreeMap<String, Vec<i64>>,
) -> Result<usize> {
    let Some(curves) = ingest.optional_table(tech.curve_file)? else {
        ingest.skip(
            "investment",
            "supply curve file not found, technology skipped",
            tech.curve_file,
        );
        return Ok(0);
    };
    let groups = grouped_curves(&curves, authorities)
        .with_context(|| format!("grouping {}", curves.name()))?;

    let config = ingest.config;
    let availability = ingest.table(tech.availability_file)?;
    let timestamps = availability.text_column(&config.investment.timestamp_column)?;
    let axis = TimeAxis::from_datetimes(&timestamps)
        .with_context(|| format!("time axis of {}", availability.name()))?;

    let prime_mover = PrimeMover::from_unit_type(tech.unit_type).code();
    let technology = ingest.store.insert_supply_technology(&SupplyTechnology {
        prime_mover: prime_mover.clone(),
        fuel: Some(tech.fuel.to_string()),
        area: None,
        balancing_topology: None,
        scenario: Some(config.investment.scenario.clone()),
    })?;

    let mut series = 0;
    for ((region, class), rows) in &groups {
        let supply = PiecewiseLinear::from_samples(
            &rows.iter().map(|r| (r.capacity, r.cost)).collect::<Vec<_>>(),
        );
        let reinforcement = PiecewiseLinear::from_samples(
            &rows.iter().map(|r| (r.distance, r.reinforcement)).collect::<Vec<_>>(),
        );
        let supply_blob = supply.to_attribute()?;
        let reinforcement_blob = reinforcement.to_attribute()?;

        for bus_id in authorities.get(region).into_iter().flatten() {
            let store = ingest.store;
            store.bind(
                EntityType::SupplyTechnologies,
                &format!("supply curve for {} and {} at {}", prime_mover, tech.fuel, bus_id),
                &supply_blob,
                technology.entity,
            )?;
            store.bind(
                EntityType::SupplyTechnologies,
                &format!("reinforcement curve for {} and {} at {}", prime_mover, tech.fuel, bus_id),
                &reinforcement_blob,
                technology.entity,
            )?;

            let column = availability.column_index(&bus_id.to_string())?;
            let values = availability.numeric_column(column)?;
            let spec = SeriesSpec::real_time(format!("{} Time Series for {}", tech.label, bus_id))
                .with_unit(&config.series.unit);
            materialize_column(store, &spec, &axis, &values, technology.entity)
                .with_context(|| format!("availability of bus {}", bus_id))?;
            series += 1;
        }
        debug!(region = %region, class = %class, points = rows.len(), "inserted supply curves");
    }
    ingest.record(phase::TIME_SERIES, series);
    Ok(1)
}

/// Supply technologies, curves and availability series for solar and wind.
pub fn insert_investment_options(ingest: &mut Ingest<'_>, buses: &CsvTable) -> Result<()> {
    let authorities = buses_by_authority(buses)?;
    let config = ingest.config;
    let technologies = [
        Technology {
            label: "PV",
            unit_type: "PV",
            fuel: "Solar",
            curve_file: &config.investment.solar_supply_curve_file,
            availability_file: &config.investment.solar_availability_file,
        },
        Technology {
            label: "Wind",
            unit_type: "WIND",
            fuel: "Wind",
            curve_file: &config.investment.wind_supply_curve_file,
            availability_file: &config.investment.wind_availability_file,
        },
    ];

    let mut written = 0;
    for tech in &technologies {
        written += insert_technology(ingest, tech, &authorities)
            .with_context(|| format!("{} supply technology", tech.fuel))?;
    }
    ingest.record(phase::INVESTMENT, written);
    Ok(())
}
