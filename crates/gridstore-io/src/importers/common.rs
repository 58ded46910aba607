//! Phases shared by the dataset families.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use gridstore_core::{
    aggregate_interchanges, participation_factors, AttributeValue, BranchRating, EntityId,
    EntityType, GridError, GridResult, NaturalKey, PlanningRegion, TopologyNode,
    TransmissionInterchange, TransmissionLine,
};
use gridstore_ts::{materialize_wide, PeriodRow, SeriesSpec, TimeAxis};
use serde_json::json;
use tracing::debug;

use super::{phase, Ingest};
use crate::columns::{branch, bus, period, BusColumns};
use crate::table::CsvTable;

/// How a branch table carries its ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRatings {
    /// `Cont`, `STE` and `LTE` ratings plus `Length` columns
    Separate,
    /// Only a continuous rating, reused for STE and LTE with unit length
    ContinuousOnly,
}

pub fn insert_regions(ingest: &mut Ingest<'_>, buses: &CsvTable, cols: &BusColumns) -> Result<()> {
    let mut seen = HashSet::new();
    let mut written = 0;
    for row in buses.rows() {
        let area = row.i64(cols.area)?;
        if !seen.insert(area) {
            continue;
        }
        ingest
            .store
            .insert_planning_region(&PlanningRegion::for_area(area))
            .with_context(|| format!("inserting region {}", area))?;
        written += 1;
    }
    ingest.record(phase::REGIONS, written);
    Ok(())
}

pub fn insert_buses(ingest: &mut Ingest<'_>, buses: &CsvTable, cols: &BusColumns) -> Result<()> {
    buses.require_columns(&cols.required())?;

    let loads = buses
        .rows()
        .map(|row| Ok((row.i64(cols.area)?, row.opt_f64(cols.load)?.unwrap_or(0.0))))
        .collect::<GridResult<Vec<_>>>()?;
    let factors = participation_factors(&loads);

    for (row, factor) in buses.rows().zip(factors) {
        let node = TopologyNode {
            id: row.i64(cols.id)?,
            name: row.text(cols.name)?.to_string(),
            area: Some(gridstore_core::region_label(row.i64(cols.area)?)),
            description: row.opt_text(cols.kind).map(str::to_string),
        };
        let inserted = ingest
            .store
            .insert_topology_node(&node)
            .with_context(|| format!("inserting bus {} ({})", node.id, node.name))?;

        if let (Some(lat), Some(lon)) = (row.maybe_f64(bus::LAT)?, row.maybe_f64(bus::LON)?) {
            let geolocation = AttributeValue::json(&json!({ "lat": lat, "lon": lon }))?;
            ingest
                .store
                .bind_supplemental("geolocation", &geolocation, inserted.entity)?;
        }
        ingest.store.bind(
            EntityType::BalancingTopologies,
            "Participation Factor",
            &AttributeValue::Real(factor),
            inserted.entity,
        )?;
        debug!(bus = node.id, name = %node.name, factor, "inserted bus");
    }
    ingest.record(phase::BUSES, buses.len());
    Ok(())
}

fn bus_entity(ingest: &Ingest<'_>, bus_id: i64) -> GridResult<Option<EntityId>> {
    ingest
        .store
        .resolve(EntityType::BalancingTopologies, &NaturalKey::Int(bus_id))
}

fn region_entity(ingest: &Ingest<'_>, area: i64) -> GridResult<Option<EntityId>> {
    ingest
        .store
        .resolve(EntityType::PlanningRegions, &NaturalKey::Int(area))
}

/// One line per branch row; rows whose buses are unknown are skipped.
pub fn insert_branches(
    ingest: &mut Ingest<'_>,
    branches: &CsvTable,
    ratings: BranchRatings,
) -> Result<()> {
    let mut written = 0;
    for row in branches.rows() {
        let from_bus = row.i64(branch::FROM)?;
        let to_bus = row.i64(branch::TO)?;
        let (from, to) = match (bus_entity(ingest, from_bus)?, bus_entity(ingest, to_bus)?) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                ingest.skip(
                    "reference",
                    "branch endpoint not found, branch skipped",
                    &format!("{}-{}", from_bus, to_bus),
                );
                continue;
            }
        };

        let arc = ingest.store.ensure_arc(from, to)?;
        let continuous = row.f64(branch::CONT_RATING)?;
        let line = match ratings {
            BranchRatings::Separate => TransmissionLine {
                arc,
                continuous_rating: continuous,
                ste_rating: row.f64(branch::STE_RATING)?,
                lte_rating: row.f64(branch::LTE_RATING)?,
                line_length: row.f64(branch::LENGTH)?,
            },
            BranchRatings::ContinuousOnly => TransmissionLine {
                arc,
                continuous_rating: continuous,
                ste_rating: continuous,
                lte_rating: continuous,
                line_length: 1.0,
            },
        };
        let inserted = ingest
            .store
            .insert_transmission_line(&line)
            .with_context(|| format!("inserting branch {}-{}", from_bus, to_bus))?;

        for (name, column) in [
            ("Reactance", branch::REACTANCE),
            ("Susceptance", branch::SUSCEPTANCE),
            ("Resistance", branch::RESISTANCE),
        ] {
            let value = AttributeValue::from(row.maybe_f64(column)?);
            ingest
                .store
                .bind(EntityType::TransmissionLines, name, &value, inserted.entity)?;
        }
        written += 1;
    }
    ingest.record(phase::BRANCHES, written);
    Ok(())
}

/// Aggregate cross-region branches and write one interchange per region pair.
pub fn insert_interchanges(
    ingest: &mut Ingest<'_>,
    buses: &CsvTable,
    cols: &BusColumns,
    branches: &CsvTable,
) -> Result<()> {
    let bus_region = buses
        .rows()
        .map(|row| Ok((row.i64(cols.id)?, row.i64(cols.area)?)))
        .collect::<GridResult<HashMap<_, _>>>()?;
    let ratings = branches
        .rows()
        .map(|row| {
            Ok(BranchRating {
                from_bus: row.i64(branch::FROM)?,
                to_bus: row.i64(branch::TO)?,
                continuous_rating: row.f64(branch::CONT_RATING)?,
            })
        })
        .collect::<GridResult<Vec<_>>>()?;

    let groups = aggregate_interchanges(&ratings, &bus_region)
        .context("grouping branches by region pair")?;

    let mut written = 0;
    for group in &groups {
        let from = region_entity(ingest, group.from_region)?;
        let to = region_entity(ingest, group.to_region)?;
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                ingest.skip("reference", "interchange region not found, skipped", &group.name());
                continue;
            }
        };
        let arc = ingest.store.ensure_arc(from, to)?;
        ingest.store.insert_transmission_interchange(&TransmissionInterchange {
            arc,
            name: group.name(),
            max_flow_from: group.total_rating,
            max_flow_to: group.total_rating,
        })?;
        debug!(
            name = %group.name(),
            total = group.total_rating,
            branches = group.branch_count,
            "inserted interchange"
        );
        written += 1;
    }
    ingest.record(phase::INTERCHANGES, written);
    Ok(())
}

/// Time axis of a `Year, Month, Day, Period` table.
pub fn period_axis(table: &CsvTable, resolution_minutes: i64) -> GridResult<TimeAxis> {
    table.require_columns(&[period::YEAR, period::MONTH, period::DAY, period::PERIOD])?;
    let rows = table
        .rows()
        .map(|row| {
            let month = u32::try_from(row.i64(period::MONTH)?)
                .map_err(|_| GridError::Parse(format!("{}: negative month", table.name())))?;
            let day = u32::try_from(row.i64(period::DAY)?)
                .map_err(|_| GridError::Parse(format!("{}: negative day", table.name())))?;
            let year = i32::try_from(row.i64(period::YEAR)?)
                .map_err(|_| GridError::Parse(format!("{}: year out of range", table.name())))?;
            Ok(PeriodRow {
                year,
                month,
                day,
                period: row.i64(period::PERIOD)?,
            })
        })
        .collect::<GridResult<Vec<_>>>()?;
    TimeAxis::from_periods(&rows, resolution_minutes)
}

/// Value columns after `marker`, keyed by header.
pub fn wide_columns(table: &CsvTable, marker: &str) -> GridResult<Vec<(String, Vec<f64>)>> {
    table
        .columns_after(marker)?
        .into_iter()
        .map(|(index, header)| Ok((header.to_string(), table.numeric_column(index)?)))
        .collect()
}

/// Materialize every value column of a load table; returns the series written.
pub fn insert_load_series<F>(
    ingest: &mut Ingest<'_>,
    table: &CsvTable,
    axis: &TimeAxis,
    spec: &SeriesSpec,
    marker: &str,
    resolve_owner: F,
) -> Result<usize>
where
    F: FnMut(&str) -> GridResult<EntityId>,
{
    let columns = wide_columns(table, marker)?;
    let ids = materialize_wide(ingest.store, spec, axis, &columns, resolve_owner)
        .with_context(|| format!("materializing '{}' from {}", spec.name, table.name()))?;
    ingest.record(phase::TIME_SERIES, ids.len());
    Ok(ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngestConfig;
    use crate::locate::DirectoryTree;
    use gridstore_db::{SchemaStore, Store};

    const BUSES: &str = "\
Bus ID,Bus Name,Bus Type,MW Load,Area
1,nodeA,PV,30,1
2,nodeB,PQ,70,1
3,nodeC,PQ,0,2
";

    const BRANCHES: &str = "\
From Bus,To Bus,Cont Rating,X,B,R
1,2,100,0.01,0.02,0.003
1,2,100,0.01,0.02,0.003
2,3,250,0.05,,0.004
3,9,50,0.05,0.01,0.004
";

    fn run<T>(f: impl FnOnce(&mut Ingest<'_>) -> T) -> (Store, T) {
        let store = Store::open_in_memory().unwrap();
        store.apply_default().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let tree = DirectoryTree::scan(dir.path()).unwrap();
        let config = IngestConfig::default();
        let out = {
            let mut ingest = Ingest::new(&store, &tree, &config);
            f(&mut ingest)
        };
        (store, out)
    }

    fn table(name: &str, body: &str) -> CsvTable {
        CsvTable::from_reader(name, body.as_bytes()).unwrap()
    }

    #[test]
    fn regions_then_buses_with_factors() {
        let buses = table("bus.csv", BUSES);
        let (store, _) = run(|ingest| {
            insert_regions(ingest, &buses, &BusColumns::FIVE_BUS).unwrap();
            insert_buses(ingest, &buses, &BusColumns::FIVE_BUS).unwrap();
            assert_eq!(ingest.report.rows(phase::REGIONS), 2);
        });

        let bus = store
            .require(EntityType::BalancingTopologies, &NaturalKey::Int(2))
            .unwrap();
        let attrs = store.attributes_of(bus).unwrap();
        assert_eq!(attrs, vec![("Participation Factor".to_string(), AttributeValue::Real(0.7))]);
        // no lat/lng columns, no geolocation
        assert!(store.supplemental_of(bus).unwrap().is_empty());
    }

    #[test]
    fn parallel_branches_share_an_arc_and_unknown_buses_are_skipped() {
        let buses = table("bus.csv", BUSES);
        let branches = table("branch.csv", BRANCHES);
        let (store, warnings) = run(|ingest| {
            insert_regions(ingest, &buses, &BusColumns::FIVE_BUS).unwrap();
            insert_buses(ingest, &buses, &BusColumns::FIVE_BUS).unwrap();
            insert_branches(ingest, &branches, BranchRatings::ContinuousOnly).unwrap();
            assert_eq!(ingest.report.rows(phase::BRANCHES), 3);
            ingest.report.diagnostics.warning_count()
        });

        assert_eq!(warnings, 1);
        assert_eq!(store.row_count("transmission_lines").unwrap(), 3);
        assert_eq!(store.row_count("arcs").unwrap(), 2);
        let (ste, length): (f64, f64) = store
            .conn()
            .query_row(
                "SELECT ste_rating, line_length FROM transmission_lines ORDER BY id LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!((ste, length), (100.0, 1.0));
        // the blank susceptance is stored as NULL, not zero
        let nulls: i64 = store
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM attributes WHERE name = 'Susceptance' AND value IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn interchange_per_region_pair() {
        let buses = table("bus.csv", BUSES);
        let branches = table("branch.csv", &BRANCHES.replace("3,9,50", "3,2,50"));
        let (store, _) = run(|ingest| {
            insert_regions(ingest, &buses, &BusColumns::FIVE_BUS).unwrap();
            insert_interchanges(ingest, &buses, &BusColumns::FIVE_BUS, &branches).unwrap();
        });

        let mut stmt = store
            .conn()
            .prepare("SELECT name, max_flow_from, max_flow_to FROM transmission_interchanges ORDER BY name")
            .unwrap();
        let rows: Vec<(String, f64, f64)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            rows,
            vec![
                ("1_2".to_string(), 250.0, 250.0),
                ("2_1".to_string(), 50.0, 50.0),
            ]
        );
    }

    #[test]
    fn interchange_with_unmapped_bus_fails() {
        let buses = table("bus.csv", BUSES);
        let branches = table("branch.csv", BRANCHES);
        let (_, result) = run(|ingest| {
            insert_regions(ingest, &buses, &BusColumns::FIVE_BUS).unwrap();
            insert_interchanges(ingest, &buses, &BusColumns::FIVE_BUS, &branches)
        });
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GridError>(),
            Some(GridError::UnresolvedReference { key, .. }) if key == "9"
        ));
    }

    #[test]
    fn period_axis_steps_by_resolution() {
        let loads = table(
            "REAL_TIME_regional_Load.csv",
            "Year,Month,Day,Period,1\n2020,1,1,1,5\n2020,1,1,2,6\n2020,1,1,3,7\n",
        );
        let axis = period_axis(&loads, 5).unwrap();
        assert_eq!(axis.iso().last().as_deref(), Some("2020-01-01T00:10:00"));
        assert_eq!(
            wide_columns(&loads, "Period").unwrap(),
            vec![("1".to_string(), vec![5.0, 6.0, 7.0])]
        );
    }
}
