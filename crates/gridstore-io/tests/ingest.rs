use std::fs;
use std::path::Path;

use gridstore_core::{AttributeValue, EntityType, GridError, NaturalKey, PiecewiseLinear};
use gridstore_db::Store;
use gridstore_io::importers::phase;
use gridstore_io::{ingest_five_bus, ingest_rts, IngestConfig};
use tempfile::{tempdir, TempDir};

fn write(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

fn count(store: &Store, sql: &str) -> i64 {
    store.conn().query_row(sql, [], |row| row.get(0)).unwrap()
}

fn rts_source() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "network/bus_mod_updatedwithBA.csv",
        "\
Bus_ID,Bus_Name,Bus_Type,MW_Load,Area,lat,lng,BA
101,Abel,PV,108,1,33.39,-113.49,p1
102,Adams,PV,92,1,33.36,-113.48,p1
201,Bach,PQ,0,2,34.0,-114.0,p2
",
    );
    write(
        root,
        "network/branch.csv",
        "\
UID,From Bus,To Bus,R,X,B,Cont Rating,LTE Rating,STE Rating,Length
A1,101,102,0.003,0.014,0.461,175,193,200,3
A2,102,201,0.055,0.211,0.057,175,208,220,55
",
    );
    write(
        root,
        "ReEDS_generator_database_final_RTS-GMLC_updated_nodal.csv",
        "\
GEN UID,Bus ID,Unit Type,Fuel,cap,MVAR Inj,PMin MW,Min Up Time Hr,Min Down Time Hr,Ramp Rate MW/Min,Non Fuel Start Cost $,Start Heat Warm MBTU,HeatRate,Output_pct_0,Output_pct_1,Output_pct_2,Output_pct_3,Output_pct_4,HR_incr_1,HR_incr_2,HR_incr_3,HR_incr_4,FOR,MTTR Hr,Emissions CO2 Lbs/MMBTU,Storage Roundtrip Efficiency
101_CT_1,101,CT,NG,20,10,8,1,1,3.7,51.75,5,13114,0.4,0.6,0.8,1,,12000,12500,13000,,0.1,50,117,
102_PV_1,102,PV,Solar,50,0,,,,,,,,,,,,,,,,,,,,
201_HYDRO_1,201,HYDRO,Hydro,50,15,,,,,,,,,,,,,,,,,,,,
102_STORAGE_1,102,STORAGE,Storage,50,0,,,,,,,,,,,,,,,,,,,,81
101_UPV_1,101,UPV,Solar,10,0,,,,,,,,,,,,,,,,,,,,
",
    );
    write(root, "storage.csv", "GEN UID,Max Volume GWh\n102_STORAGE_1,0.15\n");

    let hourly = "Year,Month,Day,Period,{uid}\n2020,1,1,1,1\n2020,1,1,2,2\n2020,1,1,3,3\n";
    let five_minute = "Year,Month,Day,Period,{uid}\n2020,1,1,1,4\n2020,1,1,2,5\n";
    write(root, "timeseries/DAY_AHEAD_pv.csv", &hourly.replace("{uid}", "102_PV_1"));
    write(root, "timeseries/REAL_TIME_pv.csv", &five_minute.replace("{uid}", "102_PV_1"));
    write(root, "timeseries/DAY_AHEAD_hydro.csv", &hourly.replace("{uid}", "201_HYDRO_1"));
    write(root, "timeseries/REAL_TIME_hydro.csv", &five_minute.replace("{uid}", "201_HYDRO_1"));
    write(
        root,
        "timeseries/DAY_AHEAD_regional_Load.csv",
        "Year,Month,Day,Period,1,2\n2020,1,1,1,100,50\n2020,1,1,2,110,55\n2020,1,1,3,120,60\n",
    );
    write(
        root,
        "timeseries/REAL_TIME_regional_Load.csv",
        "Year,Month,Day,Period,1,2\n2020,1,1,1,100,50\n2020,1,1,2,101,51\n",
    );

    write(
        root,
        "reV/upv_supply_curve-reference_ba.csv",
        "\
region,class,capacity,supply_curve_cost_per_mw,dist_km,reinforcement_dist_km
p1,1,200,12000,20,2
p1,1,100,10000,10,1
p9,1,100,9000,5,1
",
    );
    write(
        root,
        "reV/pv_availability.csv",
        "Timestamps,101,102\n2020-01-01 00:00:00,0.0,0.1\n2020-01-01 00:05:00,0.2,0.3\n",
    );
    dir
}

fn run_rts(source: &Path, config: &IngestConfig) -> (TempDir, Store, gridstore_io::IngestReport) {
    let out = tempdir().unwrap();
    let db = out.path().join("rts.db");
    let report = ingest_rts(&db, source, &[], config).unwrap();
    let store = Store::open(&db).unwrap();
    (out, store, report)
}

#[test]
fn rts_dataset_end_to_end() {
    let source = rts_source();
    let (_out, store, report) = run_rts(source.path(), &IngestConfig::default());

    assert_eq!(report.rows(phase::REGIONS), 2);
    assert_eq!(report.rows(phase::BUSES), 3);
    assert_eq!(report.rows(phase::BRANCHES), 2);
    assert_eq!(report.rows(phase::INTERCHANGES), 1);
    assert_eq!(report.rows(phase::GENERATION), 4);
    assert_eq!(report.rows(phase::INVESTMENT), 1);
    // upv unit skipped, wind supply curve absent
    assert_eq!(report.diagnostics.warning_count(), 2);

    assert_eq!(store.row_count("generation_units").unwrap(), 3);
    assert_eq!(store.row_count("storage_units").unwrap(), 1);
    assert_eq!(store.row_count("hydro_reservoir_connections").unwrap(), 1);
    assert_eq!(store.row_count("fuels").unwrap(), 4);
    assert_eq!(store.row_count("prime_mover_types").unwrap(), 5);
    assert_eq!(store.row_count("supply_technologies").unwrap(), 1);
    // pv and hydro generation, two loads per family, two availability series
    assert_eq!(store.row_count("time_series").unwrap(), 10);

    let interchange: String = store
        .conn()
        .query_row("SELECT name FROM transmission_interchanges", [], |row| row.get(0))
        .unwrap();
    assert_eq!(interchange, "1_2");

    let (resolution, length): (i64, i64) = store
        .conn()
        .query_row(
            "SELECT resolution_ms, length FROM time_series WHERE name = 'DA Load' LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!((resolution, length), (3_600_000, 3));
    assert_eq!(
        count(&store, "SELECT COUNT(*) FROM time_series WHERE name = 'RT Load' AND resolution_ms = 300000"),
        2
    );
}

#[test]
fn thermal_unit_carries_heat_rate_curve() {
    let source = rts_source();
    let (_out, store, _) = run_rts(source.path(), &IngestConfig::default());

    let row_id = count(&store, "SELECT id FROM generation_units WHERE name = '101_CT_1'");
    let unit = store
        .require(EntityType::GenerationUnits, &NaturalKey::Int(row_id))
        .unwrap();
    let attrs = store.attributes_of(unit).unwrap();
    let blob = attrs
        .iter()
        .find_map(|(name, value)| match (name.as_str(), value) {
            ("Heat Rate", AttributeValue::Blob(bytes)) => Some(bytes.clone()),
            _ => None,
        })
        .unwrap();
    let curve = PiecewiseLinear::from_blob(&blob).unwrap();
    assert_eq!(curve.len(), 3);
    assert!(curve.is_continuous());
    assert_eq!(curve.segments()[0].from_x, 8.0);
    assert_eq!(curve.segments()[2].to_x, 20.0);

    assert_eq!(count(&store, "SELECT COUNT(*) FROM operational_data"), 1);
}

#[test]
fn availability_series_belong_to_the_supply_technology() {
    let source = rts_source();
    let (_out, store, _) = run_rts(source.path(), &IngestConfig::default());

    let technology: i64 = store
        .conn()
        .query_row(
            "SELECT e.id FROM entities e WHERE e.entity_type = 'supply_technologies'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    let owned = count(
        &store,
        &format!(
            "SELECT COUNT(*) FROM time_series_associations a
             JOIN time_series t ON t.id = a.time_series_id
             WHERE a.owner_id = {} AND t.name LIKE 'PV Time Series for %'",
            technology
        ),
    );
    assert_eq!(owned, 2);
    // one supply and one reinforcement curve per bus of p1
    assert_eq!(
        count(&store, "SELECT COUNT(*) FROM attributes WHERE entity_type = 'supply_technologies'"),
        4
    );
}

#[test]
fn missing_bus_table_is_reported_by_name() {
    let source = rts_source();
    fs::remove_file(source.path().join("network/bus_mod_updatedwithBA.csv")).unwrap();
    let out = tempdir().unwrap();

    let err = ingest_rts(&out.path().join("rts.db"), source.path(), &[], &IngestConfig::default())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GridError>(),
        Some(GridError::MissingFile(name)) if name == "bus_mod_updatedwithBA.csv"
    ));
}

#[test]
fn rerun_replaces_previous_contents() {
    let source = rts_source();
    let out = tempdir().unwrap();
    let db = out.path().join("rts.db");
    let config = IngestConfig::default();

    ingest_rts(&db, source.path(), &[], &config).unwrap();
    ingest_rts(&db, source.path(), &[], &config).unwrap();

    let store = Store::open(&db).unwrap();
    assert_eq!(store.row_count("balancing_topologies").unwrap(), 3);
    assert_eq!(store.row_count("time_series").unwrap(), 10);
}

fn five_bus_source(day_ahead_header: &str) -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "bus.csv",
        "\
Bus ID,Bus Name,Bus Type,MW Load,Area
1,node_a,PV,0,1
2,node_b,PQ,300,1
3,node_c,PQ,300,1
4,node_d,REF,400,2
5,node_e,PV,0,2
",
    );
    write(
        root,
        "branch.csv",
        "\
From Bus,To Bus,Cont Rating,X,B,R
1,2,400,0.0281,0.00712,0.00281
1,4,200,0.0304,0.00658,0.00304
1,5,200,0.0064,0.03126,0.00064
2,3,400,0.0108,0.01852,0.00108
3,4,200,0.0297,0.00674,0.00297
4,5,240,0.0297,0.00674,0.00297
",
    );
    write(
        root,
        "loads/da_load.csv",
        &format!(
            "{}\n2020-01-01 00:00:00,0,300,400\n2020-01-01 01:00:00,0,310,410\n",
            day_ahead_header
        ),
    );
    write(
        root,
        "loads/rt_load.csv",
        "DateTime,values,node_b,node_d\n2020-01-01 00:00:00,0,300,400\n2020-01-01 00:05:00,0,301,401\n",
    );
    dir
}

#[test]
fn five_bus_loads_are_owned_by_buses() {
    let source = five_bus_source("DateTime,values,node_b,node_d");
    let out = tempdir().unwrap();
    let db = out.path().join("5bus.db");

    let report = ingest_five_bus(&db, source.path(), &[], &IngestConfig::default()).unwrap();
    assert_eq!(report.rows(phase::BRANCHES), 6);
    assert_eq!(report.rows(phase::LOADS), 4);
    assert_eq!(report.rows(phase::GENERATION), 0);

    let store = Store::open(&db).unwrap();
    let node_d = store.bus_entity_by_name("node_d").unwrap().unwrap();
    let names: Vec<String> = store
        .time_series_of(node_d)
        .unwrap()
        .into_iter()
        .map(|(_, name, _, _)| name)
        .collect();
    assert_eq!(names, vec!["DA Load".to_string(), "RT Load".to_string()]);

    // three branches cross from area 1 to area 2
    let rating: f64 = store
        .conn()
        .query_row("SELECT max_flow_from FROM transmission_interchanges", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rating, 600.0);
}

#[test]
fn five_bus_unknown_load_column_stops_the_run() {
    let source = five_bus_source("DateTime,values,node_b,node_z");
    let out = tempdir().unwrap();
    let db = out.path().join("5bus.db");

    let err = ingest_five_bus(&db, source.path(), &[], &IngestConfig::default()).unwrap_err();
    assert!(format!("{:#}", err).contains("node_z"));
    assert!(matches!(
        err.downcast_ref::<GridError>(),
        Some(GridError::UnresolvedReference { key, .. }) if key == "node_z"
    ));

    // the series before the bad column stays committed
    let store = Store::open(&db).unwrap();
    assert_eq!(store.row_count("time_series").unwrap(), 1);
    assert_eq!(store.row_count("transmission_lines").unwrap(), 6);
}

#[test]
fn five_bus_loads_can_be_disabled() {
    let source = five_bus_source("DateTime,values,node_b,node_z");
    let out = tempdir().unwrap();
    let db = out.path().join("5bus.db");
    let mut config = IngestConfig::default();
    config.five_bus.include_loads = false;

    let report = ingest_five_bus(&db, source.path(), &[], &config).unwrap();
    assert_eq!(report.rows(phase::LOADS), 0);
    let store = Store::open(&db).unwrap();
    assert_eq!(store.row_count("time_series").unwrap(), 0);
}
